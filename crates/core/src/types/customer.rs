//! The signed-in customer's profile.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// Profile returned by `/customer/profile`. Fetched per request and never
/// cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "customer_id")]
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    /// Billing address.
    #[serde(default)]
    pub address: String,
}

impl UserProfile {
    /// First word of the name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

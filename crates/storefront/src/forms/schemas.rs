//! Login, registration and review forms with their validation schemas.

use std::sync::LazyLock;

use orfarm_core::Email;
use secrecy::SecretString;
use serde::Deserialize;

use super::{FieldErrors, FieldSpec, FormSchema, FormValues, Rule};
use crate::api::{Credentials, SignupDetails};

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const REVIEW_MIN_LENGTH: usize = 10;

static LOGIN_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        FieldSpec::new("email")
            .rule(Rule::Required("Email is required."))
            .rule(Rule::Email("Invalid email format.")),
        FieldSpec::new("password")
            .rule(Rule::Required("Password is required."))
            .rule(Rule::MinLength(
                PASSWORD_MIN_LENGTH,
                "Password must be at least 6 characters.",
            )),
    ])
});

static REGISTER_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        FieldSpec::new("name").rule(Rule::Required("Name is required.")),
        FieldSpec::new("email")
            .rule(Rule::Required("Email is required."))
            .rule(Rule::Email("Invalid email format.")),
        FieldSpec::new("phone_number").rule(Rule::Required("Phone number is required.")),
        FieldSpec::new("address").rule(Rule::Required("Address is required.")),
        FieldSpec::new("password")
            .rule(Rule::Required("Password is required."))
            .rule(Rule::MinLength(
                PASSWORD_MIN_LENGTH,
                "Password must be at least 6 characters.",
            )),
        FieldSpec::new("confirm_password")
            .rule(Rule::Required("Confirm password is required."))
            .rule(Rule::MatchesField("password", "Passwords must match.")),
    ])
});

static REVIEW_SCHEMA: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        FieldSpec::new("name").rule(Rule::Required("Name is required.")),
        FieldSpec::new("email")
            .rule(Rule::Required("Email is required."))
            .rule(Rule::Email("Invalid email format.")),
        FieldSpec::new("rating")
            .rule(Rule::Required("Please choose a rating."))
            .rule(Rule::Range {
                min: 1,
                max: 5,
                message: "Rating must be between 1 and 5.",
            }),
        FieldSpec::new("comment")
            .rule(Rule::Required("Review is required."))
            .rule(Rule::MinLength(
                REVIEW_MIN_LENGTH,
                "Review must be at least 10 characters.",
            )),
    ])
});

// =============================================================================
// Login
// =============================================================================

/// Login form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FormValues for LoginForm {
    fn value(&self, key: &str) -> Option<&str> {
        match key {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl LoginForm {
    /// Validate and convert into API credentials.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when validation fails.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        LOGIN_SCHEMA.validate(self)?;
        Ok(Credentials {
            email: parsed_email(&self.email)?,
            password: SecretString::from(self.password.clone()),
        })
    }

    /// Copy to re-render after a failure. The password is never echoed.
    #[must_use]
    pub fn draft(&self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: String::new(),
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl FormValues for RegisterForm {
    fn value(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "phone_number" => Some(&self.phone_number),
            "address" => Some(&self.address),
            "password" => Some(&self.password),
            "confirm_password" => Some(&self.confirm_password),
            _ => None,
        }
    }
}

impl RegisterForm {
    /// Validate and convert into signup details.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when validation fails.
    pub fn validate(&self) -> Result<SignupDetails, FieldErrors> {
        REGISTER_SCHEMA.validate(self)?;
        Ok(SignupDetails {
            name: self.name.trim().to_string(),
            email: parsed_email(&self.email)?,
            phone_number: self.phone_number.trim().to_string(),
            address: self.address.trim().to_string(),
            password: SecretString::from(self.password.clone()),
        })
    }

    /// Copy to re-render after a failure. Passwords are never echoed.
    #[must_use]
    pub fn draft(&self) -> Self {
        Self {
            name: self.name.clone(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// Product review form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

impl FormValues for ReviewForm {
    fn value(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "rating" => Some(&self.rating),
            "comment" => Some(&self.comment),
            _ => None,
        }
    }
}

impl ReviewForm {
    /// Validate the review.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when validation fails.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        REVIEW_SCHEMA.validate(self)
    }

    /// Star rating as a number, 0 when missing or invalid.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.trim().parse().unwrap_or(0)
    }
}

/// Schema validation already checked the format, so this only fails if the
/// two email parsers disagree.
fn parsed_email(raw: &str) -> Result<Email, FieldErrors> {
    Email::parse(raw).map_err(|_| {
        let mut errors = FieldErrors::default();
        errors.0.insert("email", "Invalid email format.".to_string());
        errors
    })
}

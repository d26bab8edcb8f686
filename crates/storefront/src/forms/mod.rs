//! Declarative form validation.
//!
//! A [`FormSchema`] is an ordered list of [`FieldSpec`]s, each with ordered
//! [`Rule`]s. Validation is synchronous and runs before any network call;
//! for each field only the first failing rule is reported.
//!
//! ```ignore
//! let schema = FormSchema::new(vec![
//!     FieldSpec::new("email")
//!         .rule(Rule::Required("Email is required."))
//!         .rule(Rule::Email("Invalid email format.")),
//! ]);
//! schema.validate(&form)?;
//! ```

pub mod schemas;

use std::collections::BTreeMap;

use orfarm_core::Email;

pub use schemas::{LoginForm, RegisterForm, ReviewForm};

/// Read access to submitted form values by field key.
pub trait FormValues {
    /// The raw submitted value, or `None` for an unknown key.
    fn value(&self, key: &str) -> Option<&str>;
}

/// A custom check: `Ok(())` accepts, `Err(message)` rejects.
pub type Check = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// One validation rule. Rules other than `Required` accept a blank value,
/// so optional fields only get checked when filled in.
pub enum Rule {
    Required(&'static str),
    Email(&'static str),
    MinLength(usize, &'static str),
    MaxLength(usize, &'static str),
    /// Value must equal the value of another field.
    MatchesField(&'static str, &'static str),
    /// Value must parse as an integer within `min..=max`.
    Range {
        min: i64,
        max: i64,
        message: &'static str,
    },
    Custom(Check),
}

impl Rule {
    fn check(&self, value: &str, values: &dyn FormValues) -> Result<(), String> {
        let blank = value.trim().is_empty();
        match self {
            Self::Required(message) => fail_if(blank, message),
            _ if blank => Ok(()),
            Self::Email(message) => fail_if(Email::parse(value).is_err(), message),
            Self::MinLength(min, message) => fail_if(value.chars().count() < *min, message),
            Self::MaxLength(max, message) => fail_if(value.chars().count() > *max, message),
            Self::MatchesField(other, message) => {
                fail_if(values.value(other).unwrap_or_default() != value, message)
            }
            Self::Range { min, max, message } => {
                let in_range = value
                    .trim()
                    .parse::<i64>()
                    .is_ok_and(|n| (*min..=*max).contains(&n));
                fail_if(!in_range, message)
            }
            Self::Custom(check) => check(value),
        }
    }
}

fn fail_if(failed: bool, message: &str) -> Result<(), String> {
    if failed {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// A field key plus its ordered rules.
pub struct FieldSpec {
    pub key: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            rules: Vec::new(),
        }
    }

    /// Append a rule. Rules run in insertion order.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a custom check closure.
    #[must_use]
    pub fn check(
        self,
        f: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.rule(Rule::Custom(Box::new(f)))
    }

    fn first_error(&self, values: &dyn FormValues) -> Option<String> {
        let value = values.value(self.key).unwrap_or_default();
        self.rules
            .iter()
            .find_map(|rule| rule.check(value, values).err())
    }
}

/// Ordered collection of field specs.
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
}

impl FormSchema {
    #[must_use]
    pub const fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field fails.
    pub fn validate(&self, values: &dyn FormValues) -> Result<(), FieldErrors> {
        let errors = FieldErrors(
            self.fields
                .iter()
                .filter_map(|field| field.first_error(values).map(|msg| (field.key, msg)))
                .collect(),
        );

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Field-scoped validation messages, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Keys of the failing fields, for logging without the submitted values.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.iter().map(|(key, _)| key).collect()
    }
}

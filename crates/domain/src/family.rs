use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback used wherever a child was registered without a name
pub const DEFAULT_CHILD_NAME: &str = "Child";

/// Guardian responsible for one or more children
///
/// The phone number is the natural deduplication key: registering with a
/// known phone overwrites name and email with the latest values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Parent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Digits of the phone number only
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }

    /// `(555) 123-4567` for 10 digits, `+1 (555) 123-4567` for 11 digits
    /// starting with 1, the raw value otherwise
    pub fn formatted_phone(&self) -> String {
        let digits = self.phone_digits();
        match digits.len() {
            10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10]),
            11 if digits.starts_with('1') => format!(
                "+1 ({}) {}-{}",
                &digits[1..4],
                &digits[4..7],
                &digits[7..11]
            ),
            _ => self.phone.clone(),
        }
    }
}

/// A child attending the play area; created fresh on every registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub parent_id: String,
    pub created_at: DateTime<Utc>,
}

impl Child {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            parent_id: parent_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CHILD_NAME)
    }
}

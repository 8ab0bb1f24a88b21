use crate::error::{DomainError, Result};
use crate::validation::is_word_char;
use serde::{Deserialize, Serialize};

/// Value object for a human-entered bracelet code
///
/// Rules:
/// - Surrounding whitespace is trimmed
/// - Must be non-empty
/// - Max length 64 characters
///
/// Length rules for registration forms live in `validation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BraceletCode(String);

impl BraceletCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let code = code.trim();

        if code.is_empty() {
            return Err(DomainError::InvalidBraceletCode(
                "Bracelet code cannot be empty".to_string(),
            ));
        }

        if code.chars().count() > 64 {
            return Err(DomainError::InvalidBraceletCode(format!(
                "Bracelet code too long: {} chars (max 64)",
                code.chars().count()
            )));
        }

        if code.chars().any(char::is_control) {
            return Err(DomainError::InvalidBraceletCode(format!(
                "Bracelet code {code:?} contains control characters"
            )));
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased code with every non-word character removed
    pub fn normalized(&self) -> String {
        self.0
            .chars()
            .filter(|c| is_word_char(*c))
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Normalized code grouped in pairs, e.g. `br001` -> `BR-00-1`
    pub fn formatted(&self) -> String {
        let normalized: Vec<char> = self.normalized().chars().collect();
        normalized
            .chunks(2)
            .map(|pair| pair.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl TryFrom<String> for BraceletCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<BraceletCode> for String {
    fn from(code: BraceletCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for BraceletCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code_is_trimmed() {
        let code = BraceletCode::new("  BR-001 ").unwrap();
        assert_eq!(code.as_str(), "BR-001");
    }

    #[test]
    fn test_empty_code() {
        let result = BraceletCode::new("   ");
        assert_eq!(
            result.unwrap_err(),
            DomainError::InvalidBraceletCode("Bracelet code cannot be empty".to_string())
        );
    }

    #[test]
    fn test_code_too_long() {
        assert!(BraceletCode::new("A".repeat(65)).is_err());
    }

    #[test]
    fn test_normalized_and_formatted() {
        let code = BraceletCode::new("br-001").unwrap();
        assert_eq!(code.normalized(), "BR001");
        assert_eq!(code.formatted(), "BR-00-1");
    }

    #[test]
    fn test_normalized_drops_non_ascii_letters() {
        let code = BraceletCode::new("Ș-br_7").unwrap();
        assert_eq!(code.normalized(), "BR_7");
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let code: BraceletCode = serde_json::from_str("\"BR-42\"").unwrap();
        assert_eq!(code.as_str(), "BR-42");
        assert!(serde_json::from_str::<BraceletCode>("\"\"").is_err());
    }
}

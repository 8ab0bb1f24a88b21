//! Form-field and business-rule validation
//!
//! Everything here is synchronous and local: a failing validation blocks
//! submission and never reaches the gateway.

use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FormErrors};
use crate::session::{SessionStatus, SessionWithDetails};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_PHONE_LENGTH: usize = 10;
pub const MAX_PHONE_LENGTH: usize = 15;
pub const MIN_BRACELET_CODE_LENGTH: usize = 4;
pub const MAX_BRACELET_CODE_LENGTH: usize = 20;
pub const MIN_SEARCH_LENGTH: usize = 2;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[\d\s\-()]+$").expect("valid phone pattern"));

/// Outcome of validating a single field or rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> &str {
        self.errors.first().map(String::as_str).unwrap_or("")
    }

    pub fn all_errors(&self) -> String {
        self.errors.join(", ")
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Convert into a gateway-blocking error for `field`
    pub fn into_result(self, field: &str) -> Result<(), DomainError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DomainError::invalid(field, self.errors))
        }
    }
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

pub fn validate_name(name: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let len = char_len(name);

    if len == 0 {
        result.push("Name is required");
        return result;
    }
    if len < MIN_NAME_LENGTH {
        result.push(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters"
        ));
    }
    if len > MAX_NAME_LENGTH {
        result.push(format!(
            "Name must be less than {MAX_NAME_LENGTH} characters"
        ));
    }
    result
}

pub fn validate_phone(phone: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if char_len(phone) == 0 {
        result.push("Phone number is required");
        return result;
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_LENGTH {
        result.push(format!(
            "Phone number must be at least {MIN_PHONE_LENGTH} digits"
        ));
    }
    if digits > MAX_PHONE_LENGTH {
        result.push(format!(
            "Phone number must be less than {MAX_PHONE_LENGTH} digits"
        ));
    }
    if !PHONE_PATTERN.is_match(phone) {
        result.push("Phone number format is invalid");
    }
    result
}

/// Email is optional; only a non-empty value is checked
pub fn validate_email(email: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();
    if char_len(email) > 0 && !EMAIL_PATTERN.is_match(email) {
        result.push("Email format is invalid");
    }
    result
}

/// ASCII letters, digits and underscore
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn validate_bracelet_code(code: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if char_len(code) == 0 {
        result.push("Bracelet code is required");
        return result;
    }

    let word_chars = code
        .chars()
        .filter(|c| is_word_char(*c))
        .count();
    if word_chars < MIN_BRACELET_CODE_LENGTH {
        result.push(format!(
            "Bracelet code must be at least {MIN_BRACELET_CODE_LENGTH} characters"
        ));
    }
    if word_chars > MAX_BRACELET_CODE_LENGTH {
        result.push(format!(
            "Bracelet code must be less than {MAX_BRACELET_CODE_LENGTH} characters"
        ));
    }
    result
}

pub fn validate_tariff_plan(tariff_plan_id: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();
    if char_len(tariff_plan_id) == 0 {
        result.push("Please select a tariff plan");
    }
    result
}

pub fn validate_search_query(query: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let len = char_len(query);
    if len > 0 && len < MIN_SEARCH_LENGTH {
        result.push(format!(
            "Search query must be at least {MIN_SEARCH_LENGTH} characters"
        ));
    }
    result
}

/// Raw registration form as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub bracelet_code: String,
    pub parent_name: String,
    pub parent_phone: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub child_name: String,
    pub tariff_plan_id: String,
}

/// Validate every field; the child name is only checked when provided
pub fn validate_registration_form(form: &RegistrationForm) -> FormErrors {
    let mut errors = FormErrors::new();

    errors.insert(
        "braceletCode",
        validate_bracelet_code(&form.bracelet_code).errors,
    );
    errors.insert("parentName", validate_name(&form.parent_name).errors);
    errors.insert("parentPhone", validate_phone(&form.parent_phone).errors);
    errors.insert("parentEmail", validate_email(&form.parent_email).errors);
    if char_len(&form.child_name) > 0 {
        errors.insert("childName", validate_name(&form.child_name).errors);
    }
    errors.insert(
        "tariffPlanId",
        validate_tariff_plan(&form.tariff_plan_id).errors,
    );

    errors
}

/// A session can be ended only while active and with the child inside
pub fn can_end_session(session: &SessionWithDetails) -> ValidationResult {
    let mut result = ValidationResult::ok();
    if !session.is_active() {
        result.push("Session is already ended");
    }
    if session.status() == SessionStatus::Outside {
        result.push("Child must be inside to end session");
    }
    result
}

pub fn can_toggle_entry(session: &SessionWithDetails) -> ValidationResult {
    let mut result = ValidationResult::ok();
    if !session.is_active() {
        result.push("Cannot toggle entry for inactive session");
    }
    result
}

/// At most one active session per bracelet code
pub fn can_register_bracelet(code: &str, sessions: &[SessionWithDetails]) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let code = code.trim();
    if sessions
        .iter()
        .any(|s| s.is_active() && s.bracelet_code().as_str() == code)
    {
        result.push("This bracelet is already registered and active");
    }
    result
}

/// Ask an external checker whether the code is free; a failing checker is
/// reported as a validation error rather than propagated
pub async fn validate_bracelet_code_uniqueness<F, Fut, E>(code: &str, check: F) -> ValidationResult
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut result = ValidationResult::ok();
    match check(code.to_string()).await {
        Ok(true) => {}
        Ok(false) => result.push("This bracelet code is already in use"),
        Err(_) => result.push("Unable to verify bracelet code uniqueness"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracelet::{Bracelet, BraceletCode};
    use crate::family::{Child, Parent};
    use crate::session::BraceletSession;
    use chrono::Utc;

    fn session(code: &str, active: bool, status: SessionStatus) -> SessionWithDetails {
        let mut session = BraceletSession::start("s1", "b1", "c1", "p1", "t1", Utc::now());
        session.is_active = active;
        session.status = status;
        SessionWithDetails {
            session,
            bracelet: Bracelet::new("b1", BraceletCode::new(code).unwrap()),
            child: Child::new("c1", "p1", None),
            parent: Parent::new("p1", "Maria", "0721234567"),
            tariff_plan: None,
            entry_logs: vec![],
        }
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            bracelet_code: "BR-001".into(),
            parent_name: "Maria Popescu".into(),
            parent_phone: "+40 721 234 567".into(),
            parent_email: String::new(),
            child_name: String::new(),
            tariff_plan_id: "1".into(),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ana").is_valid());
        assert_eq!(validate_name("  ").first_error(), "Name is required");
        assert_eq!(
            validate_name("A").first_error(),
            "Name must be at least 2 characters"
        );
        assert!(!validate_name(&"x".repeat(51)).is_valid());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+40 (721) 234-567").is_valid());
        assert_eq!(validate_phone("").first_error(), "Phone number is required");
        assert_eq!(
            validate_phone("12345").first_error(),
            "Phone number must be at least 10 digits"
        );
        let bad = validate_phone("0721abc234567");
        assert!(bad.errors.contains(&"Phone number format is invalid".to_string()));
    }

    #[test]
    fn test_validate_email_optional() {
        assert!(validate_email("").is_valid());
        assert!(validate_email("maria@example.com").is_valid());
        assert!(!validate_email("maria@example").is_valid());
    }

    #[test]
    fn test_validate_bracelet_code_counts_word_chars() {
        assert!(validate_bracelet_code("BR-001").is_valid());
        assert!(!validate_bracelet_code("B-1-").is_valid());
        assert!(!validate_bracelet_code(&"A".repeat(21)).is_valid());
        // Non-ASCII letters are not word characters
        assert!(!validate_bracelet_code("ĂÎȘ-1").is_valid());
        assert!(validate_bracelet_code("ĂÎȘ-1234").is_valid());
        assert_eq!(
            validate_bracelet_code("").first_error(),
            "Bracelet code is required"
        );
    }

    #[test]
    fn test_search_query() {
        assert!(validate_search_query("").is_valid());
        assert!(!validate_search_query("a").is_valid());
        assert!(validate_search_query("ab").is_valid());
    }

    #[test]
    fn test_registration_form_valid() {
        assert!(validate_registration_form(&form()).is_empty());
    }

    #[test]
    fn test_registration_form_collects_per_field() {
        let mut f = form();
        f.parent_phone = String::new();
        f.child_name = "A".into();
        f.tariff_plan_id = String::new();

        let errors = validate_registration_form(&f);
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["childName", "parentPhone", "tariffPlanId"]);
        assert_eq!(errors.first("tariffPlanId"), "Please select a tariff plan");
    }

    #[test]
    fn test_can_toggle_entry_rejects_inactive() {
        let ended = session("BR-001", false, SessionStatus::Outside);
        let result = can_toggle_entry(&ended);
        assert!(!result.is_valid());
        assert_eq!(
            result.first_error(),
            "Cannot toggle entry for inactive session"
        );
        assert!(can_toggle_entry(&session("BR-001", true, SessionStatus::Outside)).is_valid());
    }

    #[test]
    fn test_can_end_session() {
        assert!(can_end_session(&session("BR-001", true, SessionStatus::Inside)).is_valid());
        assert_eq!(
            can_end_session(&session("BR-001", true, SessionStatus::Outside)).first_error(),
            "Child must be inside to end session"
        );
        assert_eq!(
            can_end_session(&session("BR-001", false, SessionStatus::Outside))
                .errors
                .len(),
            2
        );
    }

    #[test]
    fn test_can_register_bracelet() {
        let sessions = vec![session("BR-001", true, SessionStatus::Inside)];
        assert!(!can_register_bracelet("BR-001", &sessions).is_valid());
        assert!(can_register_bracelet("BR-002", &sessions).is_valid());

        let ended = vec![session("BR-001", false, SessionStatus::Outside)];
        assert!(can_register_bracelet("BR-001", &ended).is_valid());
    }

    #[test]
    fn test_into_result() {
        let err = validate_name("").into_result("parentName").unwrap_err();
        assert!(err.is_validation());
        assert!(validate_name("Ana").into_result("parentName").is_ok());
    }

    #[tokio::test]
    async fn test_uniqueness_checker() {
        let free = validate_bracelet_code_uniqueness("BR-1", |_| async { Ok::<_, ()>(true) }).await;
        assert!(free.is_valid());

        let taken =
            validate_bracelet_code_uniqueness("BR-1", |_| async { Ok::<_, ()>(false) }).await;
        assert_eq!(taken.first_error(), "This bracelet code is already in use");

        let broken =
            validate_bracelet_code_uniqueness("BR-1", |_| async { Err::<bool, _>("down") }).await;
        assert_eq!(
            broken.first_error(),
            "Unable to verify bracelet code uniqueness"
        );
    }

    #[tokio::test]
    async fn test_uniqueness_against_gateway() {
        use crate::session::{MockSessionGateway, SessionGateway};

        let mut gateway = MockSessionGateway::new();
        gateway
            .expect_find_active_session_by_code()
            .withf(|code| code.as_str() == "BR-7")
            .times(1)
            .returning(|_| Ok(Some(session("BR-7", true, SessionStatus::Inside))));

        let result = validate_bracelet_code_uniqueness("BR-7", |code| async move {
            let code = BraceletCode::new(code)?;
            Ok::<_, DomainError>(gateway.find_active_session_by_code(&code).await?.is_none())
        })
        .await;

        assert_eq!(result.first_error(), "This bracelet code is already in use");
    }
}

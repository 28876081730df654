//! Field validation rules and password strength scoring.
//!
//! Validation is a pure function of the step and the candidate record.
//! Every failing field of the step is reported, one message per field, in
//! field declaration order.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::Display;
use thiserror::Error;

use crate::record::RegistrationRecord;
use crate::steps::Step;
use crate::types::{ContactMethod, Field, Gender, Interest};

/// Rule set attached to a step definition.
pub type RuleSet = fn(&RegistrationRecord, &mut ValidationErrors);

/// Outcome of validating a step.
pub type ValidationResult = Result<(), ValidationErrors>;

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 8;

// Same grammar browsers use for <input type="email">.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field name → message mapping, ordered by field declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`. A field keeps its first message.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        if self.contains(field) {
            return;
        }
        let error = FieldError {
            field,
            message: message.into(),
        };
        let at = self
            .errors
            .iter()
            .position(|e| e.field > field)
            .unwrap_or(self.errors.len());
        self.errors.insert(at, error);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[inline]
    pub fn contains(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn fields(&self) -> Vec<Field> {
        self.errors.iter().map(|e| e.field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> ValidationResult {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Validate `candidate` against the rules of `step`.
///
/// Steps without a rule set always pass.
pub fn validate(step: Step, candidate: &RegistrationRecord) -> ValidationResult {
    let Some(rules) = step.definition().validator else {
        return Ok(());
    };
    let mut errors = ValidationErrors::new();
    rules(candidate, &mut errors);
    errors.into_result()
}

/// Validate a whole record against every step that has rules.
///
/// Returns the first failing step with its errors.
pub fn validate_all(record: &RegistrationRecord) -> Result<(), (Step, ValidationErrors)> {
    for step in Step::all() {
        validate(step, record).map_err(|errors| (step, errors))?;
    }
    Ok(())
}

/// Rules for the personal info step.
pub fn personal_info_rules(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    check_name(record, Field::FirstName, errors);
    check_name(record, Field::LastName, errors);
    check_email(record, errors);
    check_password(record, errors);
    check_confirm_password(record, errors);
    check_choice::<Gender>(
        record,
        Field::Gender,
        "Please select your gender",
        "Please select a valid gender option",
        errors,
    );
}

/// Rules for the preferences step. `newsletter` is optional and unchecked.
pub fn preferences_rules(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    check_choice::<ContactMethod>(
        record,
        Field::ContactMethod,
        "Please select your preferred contact method",
        "Please select a valid contact method",
        errors,
    );
    check_interests(record, errors);
}

/// Non-empty text value, or `None`.
fn required_text(record: &RegistrationRecord, field: Field) -> Option<&str> {
    record.text(field).filter(|s| !s.is_empty())
}

fn check_name(record: &RegistrationRecord, field: Field, errors: &mut ValidationErrors) {
    match required_text(record, field) {
        None => errors.add(field, format!("{} is required", field.label())),
        Some(name) if name.chars().count() < MIN_NAME_LEN => errors.add(
            field,
            format!(
                "{} must be at least {} characters",
                field.label(),
                MIN_NAME_LEN
            ),
        ),
        Some(_) => {}
    }
}

fn check_email(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    match required_text(record, Field::Email) {
        None => errors.add(Field::Email, "Email is required"),
        Some(email) if !EMAIL_RE.is_match(email) => {
            errors.add(Field::Email, "Please enter a valid email")
        }
        Some(_) => {}
    }
}

fn check_password(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    let Some(password) = required_text(record, Field::Password) else {
        errors.add(Field::Password, "Password is required");
        return;
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            Field::Password,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    } else if !(has_upper(password) && has_lower(password) && has_digit(password)) {
        errors.add(
            Field::Password,
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        );
    }
}

// A missing password is reported on its own field, not as a mismatch here.
fn check_confirm_password(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    let password = required_text(record, Field::Password);
    match required_text(record, Field::ConfirmPassword) {
        None => errors.add(Field::ConfirmPassword, "Please confirm your password"),
        Some(confirm) if password.is_some_and(|p| p != confirm) => {
            errors.add(Field::ConfirmPassword, "Passwords must match")
        }
        Some(_) => {}
    }
}

fn check_choice<T: FromStr>(
    record: &RegistrationRecord,
    field: Field,
    missing: &str,
    invalid: &str,
    errors: &mut ValidationErrors,
) {
    match required_text(record, field) {
        None => errors.add(field, missing),
        Some(value) if T::from_str(value).is_err() => errors.add(field, invalid),
        Some(_) => {}
    }
}

fn check_interests(record: &RegistrationRecord, errors: &mut ValidationErrors) {
    let interests = record.list(Field::Interests).unwrap_or_default();
    if interests.is_empty() {
        errors.add(Field::Interests, "Please select at least one interest");
        return;
    }
    if let Some(unknown) = interests.iter().find(|i| Interest::from_str(i).is_err()) {
        errors.add(Field::Interests, format!("Unknown interest: {}", unknown));
    }
}

fn has_upper(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lower(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn has_symbol(s: &str) -> bool {
    s.chars().any(|c| !c.is_ascii_alphanumeric())
}

// ============================================================================
// Password strength
// ============================================================================

/// Advisory strength label. Never gates a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum StrengthLabel {
    #[strum(serialize = "Very weak")]
    VeryWeak,
    #[strum(serialize = "Weak")]
    Weak,
    #[strum(serialize = "Fair")]
    Fair,
    #[strum(serialize = "Good")]
    Good,
    #[strum(serialize = "Strong")]
    Strong,
}

/// Score (0-5) and label for a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub label: StrengthLabel,
}

impl PasswordStrength {
    /// Fill of a strength meter, 0-100.
    pub fn percent(&self) -> u8 {
        self.score * 20
    }
}

/// Score a password on five independent checks.
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = [
        password.chars().count() >= MIN_PASSWORD_LEN,
        has_upper(password),
        has_lower(password),
        has_digit(password),
        has_symbol(password),
    ];
    let score = checks.iter().filter(|ok| **ok).count() as u8;
    let label = match score {
        0 | 1 => StrengthLabel::VeryWeak,
        2 => StrengthLabel::Weak,
        3 => StrengthLabel::Fair,
        4 => StrengthLabel::Good,
        _ => StrengthLabel::Strong,
    };
    PasswordStrength { score, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_personal_info() -> RegistrationRecord {
        RegistrationRecord::new()
            .with(Field::FirstName, "Ada")
            .with(Field::LastName, "Lovelace")
            .with(Field::Email, "ada@example.com")
            .with(Field::Password, "Passw0rd")
            .with(Field::ConfirmPassword, "Passw0rd")
            .with(Field::Gender, "Female")
    }

    fn valid_preferences() -> RegistrationRecord {
        RegistrationRecord::new()
            .with(Field::Newsletter, true)
            .with(Field::ContactMethod, "email")
            .with(Field::Interests, vec!["Music"])
    }

    #[test]
    fn test_valid_steps_pass() {
        assert!(validate(Step::PersonalInfo, &valid_personal_info()).is_ok());
        assert!(validate(Step::Preferences, &valid_preferences()).is_ok());
    }

    #[test]
    fn test_steps_without_rules_always_pass() {
        let empty = RegistrationRecord::new();
        assert!(validate(Step::Confirmation, &empty).is_ok());
        assert!(validate(Step::Success, &empty).is_ok());
    }

    #[test]
    fn test_each_missing_field_is_reported_alone() {
        for field in Field::for_step(Step::PersonalInfo) {
            let mut record = valid_personal_info();
            record.remove(field);
            let errors = validate(Step::PersonalInfo, &record).unwrap_err();
            assert_eq!(errors.fields(), vec![field], "removed {}", field);
        }
        for field in [Field::ContactMethod, Field::Interests] {
            let mut record = valid_preferences();
            record.remove(field);
            let errors = validate(Step::Preferences, &record).unwrap_err();
            assert_eq!(errors.fields(), vec![field], "removed {}", field);
        }
    }

    #[test]
    fn test_newsletter_is_optional() {
        let mut record = valid_preferences();
        record.remove(Field::Newsletter);
        assert!(validate(Step::Preferences, &record).is_ok());
    }

    #[test]
    fn test_all_failures_reported_in_declaration_order() {
        let errors = validate(Step::PersonalInfo, &RegistrationRecord::new()).unwrap_err();
        assert_eq!(errors.fields(), Field::for_step(Step::PersonalInfo));
        assert_eq!(errors.get(Field::FirstName), Some("First name is required"));
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Please confirm your password"));
    }

    #[test]
    fn test_short_first_name_only() {
        let record = RegistrationRecord::new().with(Field::FirstName, "Al");
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert!(errors.contains(Field::LastName));
        assert!(!errors.contains(Field::FirstName));

        let record = RegistrationRecord::new().with(Field::FirstName, "A");
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert_eq!(
            errors.get(Field::FirstName),
            Some("First name must be at least 2 characters")
        );
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let record = valid_personal_info().with(Field::LastName, "");
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert_eq!(errors.get(Field::LastName), Some("Last name is required"));
    }

    #[test]
    fn test_wrong_kind_counts_as_missing() {
        let record = valid_personal_info().with(Field::Email, true);
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
    }

    #[test]
    fn test_email_syntax() {
        for good in ["a@b", "first.last+tag@example.co.uk", "x_y@sub-domain.org"] {
            let record = valid_personal_info().with(Field::Email, good);
            assert!(validate(Step::PersonalInfo, &record).is_ok(), "{}", good);
        }
        for bad in ["plain", "@example.com", "a@", "a b@example.com", "a@-example.com"] {
            let record = valid_personal_info().with(Field::Email, bad);
            let errors = validate(Step::PersonalInfo, &record).unwrap_err();
            assert_eq!(errors.get(Field::Email), Some("Please enter a valid email"), "{}", bad);
        }
    }

    #[test]
    fn test_password_rules() {
        let short = valid_personal_info()
            .with(Field::Password, "Pa1")
            .with(Field::ConfirmPassword, "Pa1");
        let errors = validate(Step::PersonalInfo, &short).unwrap_err();
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 8 characters")
        );

        let no_digit = valid_personal_info()
            .with(Field::Password, "Password")
            .with(Field::ConfirmPassword, "Password");
        let errors = validate(Step::PersonalInfo, &no_digit).unwrap_err();
        assert!(errors.get(Field::Password).unwrap().contains("one number"));
        assert_eq!(errors.fields(), vec![Field::Password]);
    }

    #[test]
    fn test_confirm_password_must_match_exactly() {
        let record = valid_personal_info().with(Field::ConfirmPassword, "password");
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert_eq!(errors.fields(), vec![Field::ConfirmPassword]);
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Passwords must match"));
    }

    #[test]
    fn test_gender_must_come_from_catalog() {
        let record = valid_personal_info().with(Field::Gender, "Robot");
        let errors = validate(Step::PersonalInfo, &record).unwrap_err();
        assert_eq!(
            errors.get(Field::Gender),
            Some("Please select a valid gender option")
        );
    }

    #[test]
    fn test_interests_rules() {
        let empty = valid_preferences().with(Field::Interests, Vec::<String>::new());
        let errors = validate(Step::Preferences, &empty).unwrap_err();
        assert_eq!(errors.fields(), vec![Field::Interests]);

        let unknown = valid_preferences().with(Field::Interests, vec!["Music", "Knitting"]);
        let errors = validate(Step::Preferences, &unknown).unwrap_err();
        assert_eq!(errors.get(Field::Interests), Some("Unknown interest: Knitting"));
    }

    #[test]
    fn test_contact_method_catalog() {
        let record = valid_preferences().with(Field::ContactMethod, "pigeon");
        let errors = validate(Step::Preferences, &record).unwrap_err();
        assert_eq!(
            errors.get(Field::ContactMethod),
            Some("Please select a valid contact method")
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let record = RegistrationRecord::new().with(Field::Email, "nope");
        let first = validate(Step::PersonalInfo, &record);
        let second = validate(Step::PersonalInfo, &record);
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_all_reports_first_failing_step() {
        let mut record = valid_personal_info();
        record.merge(&valid_preferences());
        assert!(validate_all(&record).is_ok());

        record.remove(Field::Interests);
        let (step, errors) = validate_all(&record).unwrap_err();
        assert_eq!(step, Step::Preferences);
        assert_eq!(errors.fields(), vec![Field::Interests]);
    }

    #[test]
    fn test_errors_keep_declaration_order_when_added_out_of_order() {
        let mut errors = ValidationErrors::new();
        errors.add(Field::Gender, "g");
        errors.add(Field::FirstName, "f");
        errors.add(Field::FirstName, "ignored");
        assert_eq!(errors.fields(), vec![Field::FirstName, Field::Gender]);
        assert_eq!(errors.get(Field::FirstName), Some("f"));
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_strength("").score, 0);
        assert_eq!(password_strength("").label, StrengthLabel::VeryWeak);
        assert_eq!(password_strength("a").label, StrengthLabel::VeryWeak);
        assert_eq!(password_strength("aA").label, StrengthLabel::Weak);
        assert_eq!(password_strength("aA1").label, StrengthLabel::Fair);
        assert_eq!(password_strength("Passw0rd").label, StrengthLabel::Good);
        let strong = password_strength("Passw0rd!");
        assert_eq!(strong.score, 5);
        assert_eq!(strong.label, StrengthLabel::Strong);
        assert_eq!(strong.percent(), 100);
        assert_eq!(StrengthLabel::VeryWeak.to_string(), "Very weak");
    }
}

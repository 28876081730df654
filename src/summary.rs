//! Review text for the confirmation and success steps.
//!
//! Turns a `RegistrationRecord` into labelled rows with the same fallbacks
//! a reviewer sees ("Not provided", "None selected"). Secrets are never
//! included.

use std::fmt;
use std::str::FromStr;

use crate::record::RegistrationRecord;
use crate::types::{ContactMethod, Field};

/// Follow-up actions listed on the success step.
pub const NEXT_STEPS: [&str; 3] = [
    "Verify your email address",
    "Complete your profile",
    "Start exploring our platform",
];

/// One labelled line of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

/// Confirmation summary, split into the two review sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSummary {
    pub personal: Vec<SummaryRow>,
    pub preferences: Vec<SummaryRow>,
}

impl ConfirmationSummary {
    pub fn from_record(record: &RegistrationRecord) -> Self {
        let text_or = |field: Field| {
            record
                .text(field)
                .filter(|s| !s.is_empty())
                .unwrap_or("Not provided")
                .to_string()
        };

        let personal = vec![
            SummaryRow {
                label: "First Name",
                value: text_or(Field::FirstName),
            },
            SummaryRow {
                label: "Last Name",
                value: text_or(Field::LastName),
            },
            SummaryRow {
                label: "Email",
                value: text_or(Field::Email),
            },
            SummaryRow {
                label: "Gender",
                value: text_or(Field::Gender),
            },
        ];

        let preferences = vec![
            SummaryRow {
                label: "Newsletter Subscription",
                value: format_newsletter(record.flag(Field::Newsletter)),
            },
            SummaryRow {
                label: "Contact Method",
                value: format_contact_method(record.text(Field::ContactMethod)),
            },
            SummaryRow {
                label: "Interests",
                value: format_interests(record.list(Field::Interests)),
            },
        ];

        Self {
            personal,
            preferences,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.personal.iter().chain(self.preferences.iter())
    }
}

impl fmt::Display for ConfirmationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Personal Information")?;
        for row in &self.personal {
            writeln!(f, "  {}: {}", row.label, row.value)?;
        }
        writeln!(f, "Preferences")?;
        for row in &self.preferences {
            writeln!(f, "  {}: {}", row.label, row.value)?;
        }
        Ok(())
    }
}

pub fn format_newsletter(subscribed: Option<bool>) -> String {
    if subscribed.unwrap_or(false) {
        "Subscribed".to_string()
    } else {
        "Not subscribed".to_string()
    }
}

/// Display label for a stored contact method; unknown values pass through.
pub fn format_contact_method(method: Option<&str>) -> String {
    match method.filter(|m| !m.is_empty()) {
        None => "Not selected".to_string(),
        Some(raw) => ContactMethod::from_str(raw)
            .map(|m| m.label().to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

pub fn format_interests(interests: Option<&[String]>) -> String {
    match interests {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => "None selected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_uses_fallbacks() {
        let summary = ConfirmationSummary::from_record(&RegistrationRecord::new());
        let values: Vec<&str> = summary.rows().map(|r| r.value.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "Not provided",
                "Not provided",
                "Not provided",
                "Not provided",
                "Not subscribed",
                "Not selected",
                "None selected",
            ]
        );
    }

    #[test]
    fn test_full_record() {
        let record = RegistrationRecord::new()
            .with(Field::FirstName, "Ada")
            .with(Field::Password, "Passw0rd")
            .with(Field::Newsletter, true)
            .with(Field::ContactMethod, "sms")
            .with(Field::Interests, vec!["Music", "Art"]);
        let summary = ConfirmationSummary::from_record(&record);

        assert_eq!(summary.personal[0].value, "Ada");
        assert_eq!(summary.preferences[0].value, "Subscribed");
        assert_eq!(summary.preferences[1].value, "SMS");
        assert_eq!(summary.preferences[2].value, "Music, Art");
        assert!(!summary.to_string().contains("Passw0rd"));
    }

    #[test]
    fn test_unknown_contact_method_passes_through() {
        assert_eq!(format_contact_method(Some("fax")), "fax");
        assert_eq!(format_contact_method(Some("")), "Not selected");
    }

    #[test]
    fn test_display_layout() {
        let summary = ConfirmationSummary::from_record(
            &RegistrationRecord::new().with(Field::Email, "ada@example.com"),
        );
        let text = summary.to_string();
        assert!(text.starts_with("Personal Information\n"));
        assert!(text.contains("  Email: ada@example.com\n"));
        assert!(text.contains("Preferences\n"));
    }
}

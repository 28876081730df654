//! Type-safe field names and choice catalogs for the registration wizard
//!
//! Every field the wizard knows about is a `Field` variant, and every
//! fixed-choice field has an enum whose string form is exactly what the
//! persisted record stores. Parsing those strings is how the validator
//! checks membership in a catalog.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::steps::Step;

/// Registration record field names, in declaration order.
///
/// The order of the variants is the order in which validation errors are
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    Gender,
    Newsletter,
    ContactMethod,
    Interests,
}

impl Field {
    /// Key under which this field is stored in a `RegistrationRecord`.
    pub fn key(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Gender => "gender",
            Self::Newsletter => "newsletter",
            Self::ContactMethod => "contactMethod",
            Self::Interests => "interests",
        }
    }

    /// Human-readable label used in summaries and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm password",
            Self::Gender => "Gender",
            Self::Newsletter => "Newsletter subscription",
            Self::ContactMethod => "Contact method",
            Self::Interests => "Interests",
        }
    }

    /// The step whose form collects this field.
    pub fn step(self) -> Step {
        match self {
            Self::FirstName
            | Self::LastName
            | Self::Email
            | Self::Password
            | Self::ConfirmPassword
            | Self::Gender => Step::PersonalInfo,
            Self::Newsletter | Self::ContactMethod | Self::Interests => Step::Preferences,
        }
    }

    /// Fields holding secrets that must never be displayed.
    #[inline]
    pub fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }

    /// All fields collected by `step`, in declaration order.
    pub fn for_step(step: Step) -> Vec<Field> {
        Self::iter().filter(|f| f.step() == step).collect()
    }
}

/// Gender choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
pub enum Gender {
    #[strum(serialize = "Male")]
    Male,
    #[strum(serialize = "Female")]
    Female,
    #[strum(serialize = "Other")]
    Other,
    #[strum(serialize = "Prefer not to say")]
    PreferNotToSay,
}

/// Preferred contact method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ContactMethod {
    Email,
    Phone,
    Sms,
}

impl ContactMethod {
    /// Display label (the stored value is lowercase).
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Sms => "SMS",
        }
    }
}

/// Interest catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
pub enum Interest {
    Technology,
    Sports,
    Music,
    Travel,
    Cooking,
    Reading,
    Gaming,
    Fitness,
    Art,
    Photography,
}

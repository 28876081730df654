//! Step registry
//!
//! The wizard moves through these steps linearly:
//!
//! ```text
//! PersonalInfo -> Preferences -> Confirmation -> Success
//! ```
//!
//! Each step has a static `StepDefinition` carrying its title, display role
//! and the rule set that gates leaving it. Confirmation and Success carry no
//! rules and always pass.

use std::fmt;

use crate::validation::{self, RuleSet};

/// Wizard steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Step {
    /// Name, email, password and gender.
    #[default]
    PersonalInfo = 1,
    /// Newsletter, contact method and interests.
    Preferences = 2,
    /// Read-only review of the cumulative record.
    Confirmation = 3,
    /// Terminal step, only reachable through submit.
    Success = 4,
}

/// How a front end should present a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRole {
    /// Editable form gated by a rule set
    Form,
    /// Read-only review with a submit action
    Review,
    /// Completion screen; only reset leaves it
    Terminal,
}

/// Static description of a step.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub step: Step,
    pub title: &'static str,
    pub role: StepRole,
    /// Rules checked before leaving the step; `None` always passes.
    pub validator: Option<RuleSet>,
}

/// The registry, ordered by step number.
pub static STEPS: [StepDefinition; Step::TOTAL_STEPS] = [
    StepDefinition {
        step: Step::PersonalInfo,
        title: "Personal Info",
        role: StepRole::Form,
        validator: Some(validation::personal_info_rules),
    },
    StepDefinition {
        step: Step::Preferences,
        title: "Preferences",
        role: StepRole::Form,
        validator: Some(validation::preferences_rules),
    },
    StepDefinition {
        step: Step::Confirmation,
        title: "Confirmation",
        role: StepRole::Review,
        validator: None,
    },
    StepDefinition {
        step: Step::Success,
        title: "Success",
        role: StepRole::Terminal,
        validator: None,
    },
];

/// Progress indicator status of a step relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

impl Step {
    /// Total number of steps.
    pub const TOTAL_STEPS: usize = 4;

    /// Get the step number (1-indexed).
    #[inline]
    pub const fn number(self) -> usize {
        self as usize
    }

    /// Look up a step by its 1-indexed number.
    pub const fn from_number(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::PersonalInfo),
            2 => Some(Self::Preferences),
            3 => Some(Self::Confirmation),
            4 => Some(Self::Success),
            _ => None,
        }
    }

    /// The first step.
    pub const fn first() -> Self {
        Self::PersonalInfo
    }

    /// The terminal step.
    pub const fn last() -> Self {
        Self::Success
    }

    /// The step submit is allowed from (the one before the terminal step).
    pub const fn last_content() -> Self {
        Self::Confirmation
    }

    /// Get the next step in the sequence.
    ///
    /// Returns `None` at the terminal step.
    pub const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Get the previous step in the sequence.
    ///
    /// Returns `None` at the first step.
    pub const fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success)
    }

    /// The static definition for this step.
    pub fn definition(self) -> &'static StepDefinition {
        &STEPS[self.number() - 1]
    }

    pub fn title(self) -> &'static str {
        self.definition().title
    }

    pub fn role(self) -> StepRole {
        self.definition().role
    }

    /// All steps in order.
    pub fn all() -> impl Iterator<Item = Step> {
        STEPS.iter().map(|d| d.step)
    }

    /// Progress bar fill for this step as the current one (0-100).
    pub fn progress_percent(self) -> u8 {
        let done = (self.number() - 1) * 100;
        (done / (Self::TOTAL_STEPS - 1)).min(100) as u8
    }

    /// Status of `self` in a progress indicator when `current` is active.
    pub fn status_relative_to(self, current: Step) -> StepStatus {
        match self.cmp(&current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }

    /// "Step i of N" counter text.
    pub fn counter(self) -> String {
        format!("Step {} of {}", self.number(), Self::TOTAL_STEPS)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

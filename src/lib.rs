//! Registration Wizard Library
//!
//! Core of a multi-step registration wizard: step registry, field
//! validation, cumulative record, draft persistence and the controller that
//! ties them together.

pub mod cli;
pub mod config;
pub mod error;
pub mod record;
pub mod script;
pub mod steps;
pub mod storage;
pub mod summary;
pub mod types;
pub mod validation;
pub mod wizard;

// Re-export main types for convenience
pub use config::AppConfig;
pub use error::WizardError;
pub use record::{FieldValue, RegistrationRecord};
pub use script::ScriptOutcome;
pub use steps::{STEPS, Step, StepDefinition, StepRole, StepStatus};
pub use storage::{DraftStore, FileStore, KeyValueStore, LocalDraftStore, MemoryStore, StorageError};
pub use summary::ConfirmationSummary;
pub use types::{ContactMethod, Field, Gender, Interest};
pub use validation::{
    FieldError, PasswordStrength, StrengthLabel, ValidationErrors, ValidationResult,
    password_strength, validate,
};
pub use wizard::{PersistEvent, TransitionError, WizardController, WizardState};

//! Wizard controller
//!
//! The `WizardController` is the single owner of wizard progress. It holds
//! the current step, the cumulative record and the submitted flag, and only
//! changes them through four operations:
//!
//! - `advance`: validate the working values, merge, persist, move forward
//! - `retreat`: move back one step, no validation
//! - `submit`: validate, merge, mark submitted, jump to the terminal step,
//!   delete the persisted draft
//! - `reset`: back to an empty step 1, delete the persisted draft
//!
//! # State Transitions
//!
//! ```text
//! PersonalInfo <-> Preferences <-> Confirmation --submit--> Success
//!       ^                                                      |
//!       +----------------------- reset -----------------------+
//! ```
//!
//! Validation failures come back as `TransitionError::Invalid` and leave the
//! state untouched. Storage write failures never block a transition; they
//! are logged and reported to the persistence listener.

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::RegistrationRecord;
use crate::steps::Step;
use crate::storage::DraftStore;
use crate::types::Field;
use crate::validation::{self, ValidationErrors};

/// Snapshot of wizard progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    current_step: Step,
    record: RegistrationRecord,
    submitted: bool,
}

impl WizardState {
    /// Fresh state at step 1 holding `record`.
    pub fn with_record(record: RegistrationRecord) -> Self {
        Self {
            current_step: Step::first(),
            record,
            submitted: false,
        }
    }

    #[inline]
    pub fn current_step(&self) -> Step {
        self.current_step
    }

    #[inline]
    pub fn record(&self) -> &RegistrationRecord {
        &self.record
    }

    #[inline]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

/// Why a transition was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Working values (or the merged record) failed the rules of `step`
    #[error("{step} has invalid fields: {}", format_errors(.errors))]
    Invalid {
        step: Step,
        errors: ValidationErrors,
    },

    /// Submit is only allowed from the step before the terminal step
    #[error("Cannot submit from {step} (submission is only allowed from {})", Step::last_content())]
    SubmitNotAllowed { step: Step },

    /// The wizard is in its terminal state
    #[error("Registration already submitted (reset to start over)")]
    AlreadySubmitted,
}

impl TransitionError {
    /// Field errors, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Notification sent after every persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEvent {
    /// The merged record was written
    Saved,
    /// The stored draft was deleted
    Cleared,
    /// A write or delete failed; the in-memory transition still happened
    Failed(String),
}

type PersistListener = Box<dyn FnMut(&PersistEvent)>;

/// Drives the wizard over an injected `DraftStore`.
///
/// # Example
///
/// ```
/// use regwizard::storage::{LocalDraftStore, MemoryStore};
/// use regwizard::{Field, RegistrationRecord, Step, WizardController};
///
/// let mut wizard = WizardController::new(LocalDraftStore::new(MemoryStore::new()));
/// assert_eq!(wizard.current_step(), Step::PersonalInfo);
///
/// // Missing fields are reported, the step does not change
/// let working = RegistrationRecord::new().with(Field::FirstName, "Ada");
/// let err = wizard.advance(working).unwrap_err();
/// assert!(err.validation_errors().unwrap().contains(Field::LastName));
/// assert_eq!(wizard.current_step(), Step::PersonalInfo);
///
/// // Going back from the first step is a no-op
/// assert_eq!(wizard.retreat(), None);
/// ```
pub struct WizardController<S: DraftStore> {
    state: WizardState,
    store: S,
    listener: Option<PersistListener>,
}

impl<S: DraftStore> WizardController<S> {
    /// Create a controller, restoring any persisted draft into the record.
    ///
    /// The wizard always starts at step 1, even when the draft covers later
    /// steps.
    pub fn new(store: S) -> Self {
        let record = match store.load() {
            Some(record) => {
                info!(fields = record.len(), "Restored registration draft");
                record
            }
            None => RegistrationRecord::new(),
        };
        Self {
            state: WizardState::with_record(record),
            store,
            listener: None,
        }
    }

    /// Register the callback told about every persistence attempt.
    pub fn on_persist(&mut self, listener: impl FnMut(&PersistEvent) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    #[inline]
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    #[inline]
    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    #[inline]
    pub fn record(&self) -> &RegistrationRecord {
        &self.state.record
    }

    #[inline]
    pub fn is_submitted(&self) -> bool {
        self.state.submitted
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether `retreat` would move.
    pub fn can_go_back(&self) -> bool {
        !self.state.submitted && self.state.current_step.previous().is_some()
    }

    /// Committed values belonging to `step`, for pre-filling its form.
    pub fn prefill(&self, step: Step) -> RegistrationRecord {
        self.state.record.subset(&Field::for_step(step))
    }

    /// Validate `working` against the active step and commit it.
    ///
    /// On success the values are merged and persisted, and the wizard moves
    /// to the next step unless it is already on the last content step.
    /// Returns the step the wizard is now on.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the working values fail the active step's rules
    /// - `AlreadySubmitted` if the wizard is in its terminal state
    pub fn advance(&mut self, working: RegistrationRecord) -> Result<Step, TransitionError> {
        if self.state.submitted {
            return Err(TransitionError::AlreadySubmitted);
        }

        let step = self.state.current_step;
        self.check(step, &working)?;
        self.commit(&working);

        if let Some(next) = step.next().filter(|_| step < Step::last_content()) {
            self.state.current_step = next;
        }
        debug!(from = %step, to = %self.state.current_step, "Advanced");

        Ok(self.state.current_step)
    }

    /// Move back one step without validating.
    ///
    /// Returns the new step, or `None` if the wizard is on the first step or
    /// already submitted. Committed values are kept.
    pub fn retreat(&mut self) -> Option<Step> {
        if !self.can_go_back() {
            return None;
        }
        let previous = self.state.current_step.previous()?;
        debug!(from = %self.state.current_step, to = %previous, "Retreated");
        self.state.current_step = previous;
        Some(previous)
    }

    /// Validate and commit the final working values, then finish.
    ///
    /// The record stays in memory for the success step while the persisted
    /// draft is deleted.
    ///
    /// # Errors
    ///
    /// - `AlreadySubmitted` if the wizard is in its terminal state
    /// - `SubmitNotAllowed` if not on the last content step
    /// - `Invalid` if the working values fail the active step's rules, or
    ///   the merged record fails any earlier step's rules
    pub fn submit(&mut self, working: RegistrationRecord) -> Result<Step, TransitionError> {
        if self.state.submitted {
            return Err(TransitionError::AlreadySubmitted);
        }

        let step = self.state.current_step;
        if step != Step::last_content() {
            return Err(TransitionError::SubmitNotAllowed { step });
        }
        self.check(step, &working)?;

        let mut merged = self.state.record.clone();
        merged.merge(&working);
        validation::validate_all(&merged)
            .map_err(|(step, errors)| TransitionError::Invalid { step, errors })?;

        self.state.record = merged;
        self.state.submitted = true;
        self.state.current_step = Step::last();
        self.clear_draft();
        info!(fields = self.state.record.len(), "Registration submitted");

        Ok(self.state.current_step)
    }

    /// Return to an empty step 1 and delete the persisted draft.
    pub fn reset(&mut self) {
        self.state = WizardState::default();
        self.clear_draft();
        info!("Wizard reset");
    }

    fn check(&self, step: Step, working: &RegistrationRecord) -> Result<(), TransitionError> {
        validation::validate(step, working).map_err(|errors| {
            debug!(step = %step, failed = errors.len(), "Validation failed");
            TransitionError::Invalid { step, errors }
        })
    }

    fn commit(&mut self, working: &RegistrationRecord) {
        self.state.record.merge(working);
        let event = match self.store.save(&self.state.record) {
            Ok(()) => PersistEvent::Saved,
            Err(e) => {
                warn!("Failed to persist draft: {}", e);
                PersistEvent::Failed(e.to_string())
            }
        };
        self.notify(event);
    }

    fn clear_draft(&mut self) {
        let event = match self.store.clear() {
            Ok(()) => PersistEvent::Cleared,
            Err(e) => {
                warn!("Failed to clear draft: {}", e);
                PersistEvent::Failed(e.to_string())
            }
        };
        self.notify(event);
    }

    fn notify(&mut self, event: PersistEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }
}

impl<S: DraftStore + fmt::Debug> fmt::Debug for WizardController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("state", &self.state)
            .field("store", &self.store)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalDraftStore, MemoryStore, StorageError};
    use std::cell::RefCell;
    use std::rc::Rc;

    type MemWizard = WizardController<LocalDraftStore<MemoryStore>>;

    fn wizard() -> MemWizard {
        WizardController::new(LocalDraftStore::new(MemoryStore::new()))
    }

    fn personal_info() -> RegistrationRecord {
        RegistrationRecord::new()
            .with(Field::FirstName, "Ada")
            .with(Field::LastName, "Lovelace")
            .with(Field::Email, "ada@example.com")
            .with(Field::Password, "Passw0rd")
            .with(Field::ConfirmPassword, "Passw0rd")
            .with(Field::Gender, "Female")
    }

    fn preferences() -> RegistrationRecord {
        RegistrationRecord::new()
            .with(Field::Newsletter, false)
            .with(Field::ContactMethod, "sms")
            .with(Field::Interests, vec!["Music"])
    }

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    struct BrokenStore;

    impl DraftStore for BrokenStore {
        fn save(&mut self, _record: &RegistrationRecord) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }

        fn load(&self) -> Option<RegistrationRecord> {
            None
        }

        fn clear(&mut self) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn test_starts_at_first_step() {
        let w = wizard();
        assert_eq!(w.current_step(), Step::PersonalInfo);
        assert!(w.record().is_empty());
        assert!(!w.is_submitted());
        assert!(!w.can_go_back());
    }

    #[test]
    fn test_advance_commits_and_persists() {
        let mut w = wizard();
        assert_eq!(w.advance(personal_info()).unwrap(), Step::Preferences);
        assert_eq!(w.record().text(Field::FirstName), Some("Ada"));
        assert_eq!(w.store().load(), Some(personal_info()));
    }

    #[test]
    fn test_failed_advance_changes_nothing() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        let before = w.state().clone();

        let err = w.advance(RegistrationRecord::new()).unwrap_err();
        assert!(matches!(err, TransitionError::Invalid { step: Step::Preferences, .. }));
        assert_eq!(w.state(), &before);
        assert_eq!(w.store().load(), Some(personal_info()));
    }

    #[test]
    fn test_advance_stops_at_last_content_step() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.advance(preferences()).unwrap();
        assert_eq!(w.current_step(), Step::Confirmation);

        assert_eq!(w.advance(RegistrationRecord::new()).unwrap(), Step::Confirmation);
        assert!(!w.is_submitted());
    }

    #[test]
    fn test_retreat_keeps_record() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.advance(preferences()).unwrap();

        assert_eq!(w.retreat(), Some(Step::Preferences));
        assert_eq!(w.retreat(), Some(Step::PersonalInfo));
        assert_eq!(w.retreat(), None);
        assert_eq!(w.record().text(Field::ContactMethod), Some("sms"));
    }

    #[test]
    fn test_submit_only_from_confirmation() {
        let mut w = wizard();
        let err = w.submit(personal_info()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::SubmitNotAllowed {
                step: Step::PersonalInfo
            }
        );
        assert_eq!(w.current_step(), Step::PersonalInfo);
    }

    #[test]
    fn test_submit_finishes_and_clears_draft() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.advance(preferences()).unwrap();

        assert_eq!(w.submit(RegistrationRecord::new()).unwrap(), Step::Success);
        assert!(w.is_submitted());
        assert_eq!(w.record().text(Field::Email), Some("ada@example.com"));
        assert!(w.store().load().is_none());
    }

    #[test]
    fn test_submit_rejects_values_that_break_earlier_steps() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.advance(preferences()).unwrap();

        let working = RegistrationRecord::new().with(Field::Email, "not-an-email");
        let err = w.submit(working).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.fields(), vec![Field::Email]);
        assert!(matches!(err, TransitionError::Invalid { step: Step::PersonalInfo, .. }));
        assert!(!w.is_submitted());
        assert_eq!(w.record().text(Field::Email), Some("ada@example.com"));
    }

    #[test]
    fn test_terminal_state_only_leaves_through_reset() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.advance(preferences()).unwrap();
        w.submit(RegistrationRecord::new()).unwrap();

        assert_eq!(w.advance(personal_info()), Err(TransitionError::AlreadySubmitted));
        assert_eq!(
            w.submit(RegistrationRecord::new()),
            Err(TransitionError::AlreadySubmitted)
        );
        assert_eq!(w.retreat(), None);
        assert_eq!(w.current_step(), Step::Success);

        w.reset();
        assert_eq!(w.state(), &WizardState::default());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut w = wizard();
        w.advance(personal_info()).unwrap();
        w.reset();
        let once = w.state().clone();
        w.reset();
        assert_eq!(w.state(), &once);
        assert!(w.store().load().is_none());
    }

    #[test]
    fn test_restores_draft_at_first_step() {
        let mut store = LocalDraftStore::new(MemoryStore::new());
        let mut draft = personal_info();
        draft.merge(&preferences());
        store.save(&draft).unwrap();

        let w = WizardController::new(store);
        assert_eq!(w.current_step(), Step::PersonalInfo);
        assert_eq!(w.record(), &draft);
        assert_eq!(w.prefill(Step::Preferences), preferences());
    }

    #[test]
    fn test_persist_events_are_reported() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut w = wizard();
        w.on_persist(move |e| sink.borrow_mut().push(e.clone()));
        w.advance(personal_info()).unwrap();
        let _ = w.advance(RegistrationRecord::new());
        w.reset();

        assert_eq!(
            *events.borrow(),
            vec![PersistEvent::Saved, PersistEvent::Cleared]
        );
    }

    #[test]
    fn test_write_failures_do_not_block() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut w = WizardController::new(BrokenStore);
        w.on_persist(move |e| sink.borrow_mut().push(e.clone()));

        assert_eq!(w.advance(personal_info()).unwrap(), Step::Preferences);
        w.reset();

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, PersistEvent::Failed(_))));
    }

    #[test]
    fn test_error_display_lists_fields() {
        let mut w = wizard();
        let err = w
            .advance(personal_info().with(Field::ConfirmPassword, "password"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Personal Info has invalid fields: confirmPassword: Passwords must match"
        );
    }
}

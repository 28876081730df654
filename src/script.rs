//! Scripted registrations
//!
//! A script is a JSON array of per-step working values, one object per page,
//! fed to a `WizardController` in order. Each page is layered over the
//! step's pre-filled draft values, so a rerun after a restart can pass `{}`
//! for every step the saved draft already covers.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::record::RegistrationRecord;
use crate::steps::Step;
use crate::storage::DraftStore;
use crate::validation::ValidationErrors;
use crate::wizard::{TransitionError, WizardController};

/// How a scripted run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The registration was submitted.
    Submitted,
    /// The pages ran out before submission; the draft holds the progress.
    Paused(Step),
    /// A page failed validation on `step`.
    Rejected { step: Step, errors: ValidationErrors },
}

/// Read and parse the script at `path`.
pub fn load_pages(path: &Path) -> Result<Vec<RegistrationRecord>> {
    let content = fs::read_to_string(path)?;
    parse_pages(&content)
}

/// Parse a script: a JSON array of objects.
pub fn parse_pages(content: &str) -> Result<Vec<RegistrationRecord>> {
    Ok(serde_json::from_str(content)?)
}

/// Feed `pages` to `wizard` until it submits, a page is rejected or the
/// pages run out.
///
/// `on_step` is called with the active step before each page is applied.
/// Pages left over after submission are ignored.
///
/// # Errors
///
/// Transitions refused for reasons other than validation, such as a wizard
/// that was already submitted.
pub fn run_pages<S, I>(
    wizard: &mut WizardController<S>,
    pages: I,
    mut on_step: impl FnMut(Step),
) -> Result<ScriptOutcome>
where
    S: DraftStore,
    I: IntoIterator<Item = RegistrationRecord>,
{
    for page in pages {
        let step = wizard.current_step();
        on_step(step);

        let mut working = wizard.prefill(step);
        working.merge(&page);
        debug!(step = %step, given = page.len(), fields = working.len(), "Applying page");

        let outcome = if step == Step::last_content() {
            wizard.submit(working)
        } else {
            wizard.advance(working)
        };

        match outcome {
            Ok(_) if wizard.is_submitted() => return Ok(ScriptOutcome::Submitted),
            Ok(_) => {}
            Err(TransitionError::Invalid { step, errors }) => {
                return Ok(ScriptOutcome::Rejected { step, errors });
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ScriptOutcome::Paused(wizard.current_step()))
}

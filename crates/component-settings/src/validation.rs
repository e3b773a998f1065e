//! Submit-time checks. These block a submission; they never repair it.

use crate::component::ComponentDraft;
use crate::error::ValidationError;
use crate::settings::ComponentSettings;

const CRON_MACROS: [&str; 7] = [
    "@yearly",
    "@annually",
    "@monthly",
    "@weekly",
    "@daily",
    "@midnight",
    "@hourly",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

pub fn validate_submission(draft: &ComponentDraft, mode: SubmitMode) -> Result<(), ValidationError> {
    match draft.name.as_deref().map(str::trim) {
        Some(name) if name.contains(' ') => {
            return Err(ValidationError::NameContainsSpaces(name.to_string()));
        }
        None | Some("") if mode == SubmitMode::Create => return Err(ValidationError::MissingName),
        _ => {}
    }

    match &draft.settings {
        ComponentSettings::Webapp(s) => {
            if s.exposure.takes_url() && s.exposure.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                return Err(ValidationError::MissingUrl {
                    visibility: s.exposure.visibility,
                });
            }
        }
        ComponentSettings::Cron(s) => validate_schedule(&s.schedule)?,
        ComponentSettings::Worker(_) => {}
    }
    Ok(())
}

fn validate_schedule(schedule: &str) -> Result<(), ValidationError> {
    let schedule = schedule.trim();
    if schedule.is_empty() {
        return Err(ValidationError::MissingSchedule);
    }
    if schedule.starts_with('@') {
        if CRON_MACROS.contains(&schedule) {
            return Ok(());
        }
    } else if schedule.split_whitespace().count() == 5 {
        return Ok(());
    }
    Err(ValidationError::InvalidSchedule(schedule.to_string()))
}

//! Form validation, mirroring the constraints of the update request schema.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Url;

use crate::types::errors::ValidationErrors;
use crate::types::form::{EditableFormState, FormField};

/// Longest title the backend accepts.
pub const MAX_TITLE_LENGTH: usize = 1000;

/// Checks `state` and collects one message per failing field.
pub fn validate(state: &EditableFormState) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if state.bookmark_id.trim().is_empty() {
        errors.add(FormField::BookmarkId, "Bookmark id is required");
    }

    if let Some(title) = &state.title {
        if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add(
                FormField::Title,
                format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
            );
        }
    }

    if let Some(link) = &state.link {
        if let Err(message) = check_url(&link.url) {
            errors.add(FormField::Url, message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts only absolute URLs with a scheme.
pub fn check_url(raw: &str) -> Result<Url, String> {
    if raw.trim().is_empty() {
        return Err("URL is required".to_string());
    }
    Url::parse(raw).map_err(|e| format!("Invalid URL: {}", e))
}

/// Earliest date the pickers offer.
pub fn earliest_selectable_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether a picked date lies in `[1900-01-01, now]`.
pub fn is_selectable_date(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date >= earliest_selectable_date() && date <= now
}

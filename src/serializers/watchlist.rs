use serde_json::{json, Value};

use super::{incomplete, Fields, ValidationErrors};
use crate::models::{WatchlistEntry, WatchlistEntryInput};

pub const TITLE_MAX_LENGTH: usize = 150;
pub const STORYLINE_MAX_LENGTH: usize = 150;

/// Wire form of an entry. `active` is never sent to clients.
pub fn to_json(entry: &WatchlistEntry) -> Value {
    json!({
        "id": entry.id,
        "title": entry.title,
        "platform": entry.platform_id,
        "storyline": entry.storyline,
        "created": entry.created,
    })
}

pub fn validate(body: &Value) -> Result<WatchlistEntryInput, ValidationErrors> {
    let mut fields = Fields::from_body(body)?;
    let title = fields.string("title", TITLE_MAX_LENGTH);
    let platform_id = fields.reference("platform");
    let storyline = fields.string("storyline", STORYLINE_MAX_LENGTH);
    let active = fields.optional_bool("active");
    fields.finish()?;

    let (Some(title), Some(platform_id), Some(storyline)) = (title, platform_id, storyline) else {
        return Err(incomplete());
    };
    Ok(WatchlistEntryInput {
        title,
        platform_id,
        storyline,
        active,
    })
}

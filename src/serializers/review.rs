use serde_json::{json, Value};

use super::{incomplete, Fields, ValidationErrors};
use crate::models::{Review, ReviewInput};

pub const DESCRIPTION_MAX_LENGTH: usize = 255;

pub fn to_json(review: &Review) -> Value {
    json!({
        "id": review.id,
        "rating": review.rating,
        "description": review.description,
        "watchlist": review.watchlist_id,
        "active": review.active,
        "created": review.created,
        "updated": review.updated,
    })
}

/// Only non-negativity of `rating` is checked here, not the 1-5 range.
pub fn validate(body: &Value) -> Result<ReviewInput, ValidationErrors> {
    let mut fields = Fields::from_body(body)?;
    let rating = fields.integer("rating", 0);
    let description = fields.string("description", DESCRIPTION_MAX_LENGTH);
    let watchlist_id = fields.reference("watchlist");
    let active = fields.optional_bool("active");
    fields.finish()?;

    let (Some(rating), Some(description), Some(watchlist_id)) =
        (rating, description, watchlist_id)
    else {
        return Err(incomplete());
    };
    Ok(ReviewInput {
        rating,
        description,
        watchlist_id,
        active,
    })
}

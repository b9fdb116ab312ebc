use serde_json::{json, Value};

use super::{incomplete, watchlist, Fields, ValidationErrors};
use crate::models::{Platform, PlatformInput, WatchlistEntry};

pub const NAME_MAX_LENGTH: usize = 100;
pub const ABOUT_MAX_LENGTH: usize = 100;
pub const WEBSITE_MAX_LENGTH: usize = 100;

/// Wire form of a platform with its entries embedded read-only
pub fn to_json(platform: &Platform, entries: &[WatchlistEntry]) -> Value {
    json!({
        "id": platform.id,
        "name": platform.name,
        "about": platform.about,
        "website": platform.website,
        "watchlist": entries.iter().map(watchlist::to_json).collect::<Vec<_>>(),
    })
}

/// Validates a create or full-replace payload
pub fn validate(body: &Value) -> Result<PlatformInput, ValidationErrors> {
    let mut fields = Fields::from_body(body)?;
    let name = fields.string("name", NAME_MAX_LENGTH);
    let about = fields.string("about", ABOUT_MAX_LENGTH);
    let website = fields.url("website", WEBSITE_MAX_LENGTH);
    fields.finish()?;

    let (Some(name), Some(about), Some(website)) = (name, about, website) else {
        return Err(incomplete());
    };
    Ok(PlatformInput {
        name,
        about,
        website,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_validate_platform() {
        let input = validate(&json!({
            "id": 99,
            "name": "Netflix",
            "about": "streaming",
            "website": "https://netflix.com",
            "watchlist": [{"title": "ignored"}]
        }))
        .unwrap();

        assert_eq!(
            input,
            PlatformInput {
                name: "Netflix".to_string(),
                about: "streaming".to_string(),
                website: "https://netflix.com".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_platform_collects_all_errors() {
        let errors = validate(&json!({"about": "", "website": "not a url"})).unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("about"));
        assert_eq!(errors.messages("website"), ["Enter a valid URL."]);
    }

    #[test]
    fn test_platform_embeds_entries_without_active() {
        let platform = Platform {
            id: 1,
            name: "Netflix".to_string(),
            about: "streaming".to_string(),
            website: "https://netflix.com".to_string(),
        };
        let entry = WatchlistEntry {
            id: 3,
            title: "Dark".to_string(),
            platform_id: 1,
            storyline: "Time travel".to_string(),
            active: true,
            created: Utc::now(),
        };

        let value = to_json(&platform, &[entry]);
        assert_eq!(value["id"], 1);
        assert_eq!(value["website"], "https://netflix.com");
        assert_eq!(value["watchlist"][0]["id"], 3);
        assert_eq!(value["watchlist"][0]["platform"], 1);
        assert!(value["watchlist"][0].get("active").is_none());
    }
}

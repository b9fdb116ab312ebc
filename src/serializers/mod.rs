//! Conversion between stored records and their JSON wire form.
//!
//! Each entity module exposes a `to_json` mapping and a `validate` function
//! that turns an inbound JSON body into a typed input or a
//! [`ValidationErrors`] mapping of field name to messages.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use serde_json::{Map, Value};
use validator::ValidateUrl;

use crate::models::RecordId;

pub mod platform;
pub mod review;
pub mod watchlist;

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name to list of human-readable reasons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Message reported when a reference points at a record that does not exist
pub fn missing_parent_message(id: RecordId) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Reads typed fields out of an inbound JSON object, collecting every
/// failure instead of stopping at the first one.
pub struct Fields<'a> {
    data: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Fields<'a> {
    /// Fails with a `non_field_errors` entry when the body is not an object
    pub fn from_body(body: &'a Value) -> Result<Self, ValidationErrors> {
        match body {
            Value::Object(data) => Ok(Self {
                data,
                errors: ValidationErrors::new(),
            }),
            other => Err(ValidationErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(other)
                ),
            )),
        }
    }

    /// Looks up a field that must be present and non-null
    fn required(&mut self, name: &str) -> Option<&'a Value> {
        let data: &'a Map<String, Value> = self.data;
        match data.get(name) {
            None => {
                self.errors.add(name, "This field is required.");
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, "This field may not be null.");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Required, trimmed, non-blank string of at most `max_length` characters
    pub fn string(&mut self, name: &str, max_length: usize) -> Option<String> {
        let value = self.required(name)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.errors.add(name, "Not a valid string.");
                return None;
            }
        };

        if text.is_empty() {
            self.errors.add(name, "This field may not be blank.");
            return None;
        }
        if text.chars().count() > max_length {
            self.errors.add(
                name,
                format!("Ensure this field has no more than {} characters.", max_length),
            );
            return None;
        }
        Some(text)
    }

    /// Required string that must also be an http(s) or ftp(s) URL
    pub fn url(&mut self, name: &str, max_length: usize) -> Option<String> {
        let text = self.string(name, max_length)?;
        if is_web_url(&text) {
            Some(text)
        } else {
            self.errors.add(name, "Enter a valid URL.");
            None
        }
    }

    /// Optional boolean; `None` when the field is absent
    pub fn optional_bool(&mut self, name: &str) -> Option<bool> {
        let data: &'a Map<String, Value> = self.data;
        let value = data.get(name)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_f64() {
                Some(x) if x == 1.0 => Some(true),
                Some(x) if x == 0.0 => Some(false),
                _ => None,
            },
            Value::String(s) => parse_bool_token(s),
            Value::Null => {
                self.errors.add(name, "This field may not be null.");
                return None;
            }
            _ => None,
        };

        if parsed.is_none() {
            self.errors.add(name, "Must be a valid boolean.");
        }
        parsed
    }

    /// Required integer no smaller than `min`
    pub fn integer(&mut self, name: &str, min: i64) -> Option<i64> {
        let value = self.required(name)?;
        let parsed = match value {
            Value::Number(n) => parse_integer(&n.to_string()),
            Value::String(s) => parse_integer(s),
            _ => None,
        };

        let Some(number) = parsed else {
            self.errors.add(name, "A valid integer is required.");
            return None;
        };
        if number < min {
            self.errors.add(
                name,
                format!("Ensure this value is greater than or equal to {}.", min),
            );
            return None;
        }
        Some(number)
    }

    /// Required reference to another record by primary key
    pub fn reference(&mut self, name: &str) -> Option<RecordId> {
        let value = self.required(name)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<RecordId>().ok(),
            _ => None,
        };

        if parsed.is_none() {
            self.errors.add(
                name,
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    json_type_name(value)
                ),
            );
        }
        parsed
    }

    /// Consumes the reader, yielding the collected errors if there are any
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

fn is_web_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    let has_web_scheme = ["http://", "https://", "ftp://", "ftps://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));
    has_web_scheme && text.validate_url()
}

/// Boolean spellings accepted in string form. Matching is case-sensitive.
fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "t" | "T" | "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On"
        | "ON" | "1" => Some(true),
        "f" | "F" | "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off"
        | "Off" | "OFF" | "0" => Some(false),
        _ => None,
    }
}

/// Parses an integer, tolerating a trailing `.0` fraction (`"4.0"`, `4.00`)
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = match text.rfind('.') {
        Some(dot) if text[dot + 1..].chars().all(|c| c == '0') => &text[..dot],
        _ => text,
    };
    digits.parse::<i64>().ok()
}

/// Fallback for a value that went missing without a field error being recorded
pub(crate) fn incomplete() -> ValidationErrors {
    ValidationErrors::single(NON_FIELD_ERRORS, "Invalid data.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_body_is_rejected() {
        let body = json!(["Netflix"]);
        let errors = Fields::from_body(&body).err().unwrap();
        assert_eq!(
            errors.messages(NON_FIELD_ERRORS),
            ["Invalid data. Expected a dictionary, but got list."]
        );
    }

    #[test]
    fn test_string_rules() {
        let body = json!({"blank": "   ", "null": null, "flag": true, "num": 42, "long": "abcdef"});
        let mut fields = Fields::from_body(&body).unwrap();

        assert_eq!(fields.string("missing", 10), None);
        assert_eq!(fields.string("blank", 10), None);
        assert_eq!(fields.string("null", 10), None);
        assert_eq!(fields.string("flag", 10), None);
        assert_eq!(fields.string("num", 10), Some("42".to_string()));
        assert_eq!(fields.string("long", 5), None);

        let errors = fields.finish().unwrap_err();
        assert_eq!(errors.messages("missing"), ["This field is required."]);
        assert_eq!(errors.messages("blank"), ["This field may not be blank."]);
        assert_eq!(errors.messages("null"), ["This field may not be null."]);
        assert_eq!(errors.messages("flag"), ["Not a valid string."]);
        assert_eq!(
            errors.messages("long"),
            ["Ensure this field has no more than 5 characters."]
        );
        assert!(!errors.contains("num"));
    }

    #[test]
    fn test_string_is_trimmed() {
        let body = json!({"name": "  Netflix "});
        let mut fields = Fields::from_body(&body).unwrap();
        assert_eq!(fields.string("name", 100), Some("Netflix".to_string()));
        assert!(fields.finish().is_ok());
    }

    #[test]
    fn test_url_rules() {
        let body = json!({"good": "https://netflix.com", "bad": "netflix", "mail": "mailto:a@b.c"});
        let mut fields = Fields::from_body(&body).unwrap();
        assert_eq!(
            fields.url("good", 100),
            Some("https://netflix.com".to_string())
        );
        assert_eq!(fields.url("bad", 100), None);
        assert_eq!(fields.url("mail", 100), None);

        let errors = fields.finish().unwrap_err();
        assert_eq!(errors.messages("bad"), ["Enter a valid URL."]);
        assert_eq!(errors.messages("mail"), ["Enter a valid URL."]);
    }

    #[test]
    fn test_optional_bool() {
        let body = json!({
            "a": false,
            "b": "yes",
            "c": 1,
            "d": "maybe",
            "e": [true],
            "f": "tRuE",
            "g": "n",
            "h": 0.0
        });
        let mut fields = Fields::from_body(&body).unwrap();
        assert_eq!(fields.optional_bool("a"), Some(false));
        assert_eq!(fields.optional_bool("b"), Some(true));
        assert_eq!(fields.optional_bool("c"), Some(true));
        assert_eq!(fields.optional_bool("d"), None);
        assert_eq!(fields.optional_bool("e"), None);
        assert_eq!(fields.optional_bool("f"), None);
        assert_eq!(fields.optional_bool("g"), Some(false));
        assert_eq!(fields.optional_bool("h"), Some(false));
        assert_eq!(fields.optional_bool("absent"), None);

        let errors = fields.finish().unwrap_err();
        assert_eq!(errors.messages("d"), ["Must be a valid boolean."]);
        assert_eq!(errors.messages("e"), ["Must be a valid boolean."]);
        assert_eq!(errors.messages("f"), ["Must be a valid boolean."]);
        assert!(!errors.contains("absent"));
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["t", "Y", "YES", "True", "on", "1"] {
            assert_eq!(parse_bool_token(token), Some(true), "{token}");
        }
        for token in ["F", "n", "No", "FALSE", "Off", "0"] {
            assert_eq!(parse_bool_token(token), Some(false), "{token}");
        }
        for token in ["TrUe", "oN", "2", ""] {
            assert_eq!(parse_bool_token(token), None, "{token}");
        }
    }

    #[test]
    fn test_integer_accepts_whole_decimals() {
        let body = json!({"a": 4.0, "b": "4.0", "c": " 5.00 ", "d": 4.5, "e": "40", "f": "4."});
        let mut fields = Fields::from_body(&body).unwrap();
        assert_eq!(fields.integer("a", 0), Some(4));
        assert_eq!(fields.integer("b", 0), Some(4));
        assert_eq!(fields.integer("c", 0), Some(5));
        assert_eq!(fields.integer("d", 0), None);
        assert_eq!(fields.integer("e", 0), Some(40));
        assert_eq!(fields.integer("f", 0), Some(4));

        let errors = fields.finish().unwrap_err();
        assert_eq!(errors.messages("d"), ["A valid integer is required."]);
    }

    #[test]
    fn test_integer_and_reference() {
        let body = json!({
            "rating": "3",
            "negative": -1,
            "text": "five",
            "pk": "7",
            "obj": {"id": 7}
        });
        let mut fields = Fields::from_body(&body).unwrap();
        assert_eq!(fields.integer("rating", 0), Some(3));
        assert_eq!(fields.integer("negative", 0), None);
        assert_eq!(fields.integer("text", 0), None);
        assert_eq!(fields.reference("pk"), Some(7));
        assert_eq!(fields.reference("obj"), None);

        let errors = fields.finish().unwrap_err();
        assert_eq!(
            errors.messages("negative"),
            ["Ensure this value is greater than or equal to 0."]
        );
        assert_eq!(errors.messages("text"), ["A valid integer is required."]);
        assert_eq!(
            errors.messages("obj"),
            ["Incorrect type. Expected pk value, received dict."]
        );
    }

    #[test]
    fn test_validation_errors_serialize_as_mapping() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "This field is required.");
        errors.add("title", "Second reason.");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"title": ["This field is required.", "Second reason."]})
        );
        assert_eq!(errors.to_string(), "invalid fields: title");
    }

    #[test]
    fn test_missing_parent_message() {
        assert_eq!(
            missing_parent_message(7),
            "Invalid pk \"7\" - object does not exist."
        );
    }
}

// Request payloads for the review endpoints and their lenient field parsing

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::rating::{MAX_RATING, MIN_RATING};

/// Keep the key even when its value is `null`, so an edit can tell
/// "rating not sent" from "rating cleared".
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Raw JSON body shared by every review mutation. Fields stay untyped so a
/// wrong type is reported as a validation message, not a decoding failure.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub rating: Option<Value>,
    #[serde(default, rename = "parentId")]
    pub parent_id: Option<Value>,
}

/// Trimmed string value, or empty when missing or not a string
fn string_field(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn optional_string_field(value: &Option<Value>) -> Option<String> {
    Some(string_field(value)).filter(|s| !s.is_empty())
}

/// A rating as submitted by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingInput {
    /// The `rating` key was not sent
    Absent,
    /// `null` or `""`
    Empty,
    /// Not a finite number
    Invalid,
    /// A number, rounded to the nearest integer
    Score(i64),
}

impl RatingInput {
    pub fn parse(value: Option<&Value>) -> Self {
        match value {
            None => RatingInput::Absent,
            Some(Value::Null) => RatingInput::Empty,
            Some(Value::String(s)) if s.is_empty() => RatingInput::Empty,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => RatingInput::Score(f.round() as i64),
                _ => RatingInput::Invalid,
            },
            Some(_) => RatingInput::Invalid,
        }
    }

    /// No rating supplied, either absent or explicitly empty
    pub fn is_empty(&self) -> bool {
        matches!(self, RatingInput::Absent | RatingInput::Empty)
    }

    /// The score when it lies within the accepted range
    pub fn valid_score(&self) -> Option<i32> {
        match *self {
            RatingInput::Score(s) if (MIN_RATING..=MAX_RATING).contains(&s) => Some(s as i32),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateReviewInput {
    pub text: String,
    pub rating: RatingInput,
    pub parent_id: Option<String>,
}

impl From<ReviewPayload> for CreateReviewInput {
    fn from(payload: ReviewPayload) -> Self {
        Self {
            text: string_field(&payload.text),
            rating: RatingInput::parse(payload.rating.as_ref()),
            parent_id: optional_string_field(&payload.parent_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateReviewInput {
    pub id: String,
    pub text: String,
    pub rating: RatingInput,
}

impl From<ReviewPayload> for UpdateReviewInput {
    fn from(payload: ReviewPayload) -> Self {
        Self {
            id: string_field(&payload.id),
            text: string_field(&payload.text),
            rating: RatingInput::parse(payload.rating.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateReplyInput {
    pub text: String,
    pub parent_id: Option<String>,
}

impl From<ReviewPayload> for CreateReplyInput {
    fn from(payload: ReviewPayload) -> Self {
        Self {
            text: string_field(&payload.text),
            parent_id: optional_string_field(&payload.parent_id),
        }
    }
}

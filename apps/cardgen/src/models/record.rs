use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One question/answer/explanation unit from the question bank.
///
/// Missing text fields take the same defaults the cards display. A text
/// field present as `null` reads as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default = "default_subject", deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default = "default_question", deserialize_with = "null_as_empty")]
    pub question: String,
    #[serde(default = "default_answer", deserialize_with = "null_as_empty")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub explanation: String,
    /// Image payload for picture questions. Opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_subject() -> String {
    "General".to_string()
}

fn default_question() -> String {
    "Question?".to_string()
}

fn default_answer() -> String {
    "Answer".to_string()
}

impl Record {
    /// True when the record carries a non-empty image payload.
    ///
    /// null, false, 0, "", [] and {} all count as no image.
    pub fn has_image(&self) -> bool {
        match &self.image {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
        }
    }

    pub fn explanation_len(&self) -> usize {
        self.explanation.chars().count()
    }
}

//! Request-scoped data flowing through the comparison pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire name of the commentary field, both in the model schema and the API response.
pub const COMMENTARY_FIELD: &str = "aiCommentary";
/// Wire name of the comparison table field.
pub const TABLE_FIELD: &str = "tableHtml";

/// A normalized, length-bounded text excerpt derived from one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFragment {
    pub text: String,
    pub label: String,
}

/// Opaque user preferences, carried through to the prompt without interpretation.
///
/// Keys keep the order they were submitted in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserPreferences(Map<String, Value>);

impl UserPreferences {
    /// Parse the raw `preferences` form field. Anything that is not a JSON object
    /// yields an empty mapping.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            Ok(other) => {
                tracing::warn!("Ignoring non-object user preferences: {}", other);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Could not parse user preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Pretty JSON with two-space indentation, as embedded in the prompt.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<Map<String, Value>> for UserPreferences {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The fully assembled instruction string sent to the generative service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPrompt(String);

impl ComparisonPrompt {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ComparisonPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The only success payload: expert commentary plus an HTML comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "aiCommentary")]
    pub commentary: String,
    #[serde(rename = "tableHtml")]
    pub table_markup: String,
}

pub mod analysis;
pub mod context;
pub mod retirement;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A JSON sub-structure requested from the model. Construction always
/// succeeds: missing fields take the documented defaults, and `normalize`
/// clamps numeric fields to their documented ranges.
pub trait LlmSection: DeserializeOwned + Default {
    fn normalize(&mut self) {}

    /// Decode from an optional JSON value; a missing or malformed value
    /// yields the documented default structure.
    fn from_value(value: Option<&Value>) -> Self {
        let mut section: Self = value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        section.normalize();
        section
    }
}

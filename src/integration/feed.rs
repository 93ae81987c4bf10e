use serde::Deserialize;
use serde::Serialize;
use serde_aux::field_attributes::deserialize_bool_from_anything;

/// Per-form feed record, as stored by the host.
///
/// At notify-time the host hands over the *processed* values: mapping fields
/// (`email`, `first_name`, `last_name`) already have submission data merged
/// in. Missing keys take their defaults, so partial records deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub name: String,
    pub list_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    // hosts send checkbox values as "1", "true", 1, or a real bool
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub send_confirmation_email: bool,
    pub conditionals: Conditionals,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub enabled: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            list_id: String::new(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            send_confirmation_email: false,
            conditionals: Conditionals::default(),
            enabled: true,
        }
    }
}

/// Conditional logic block; evaluated by the host, carried here untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditionals {
    pub conditions: Vec<serde_json::Value>,
    pub status: bool,
    #[serde(rename = "type")]
    pub match_type: String,
}

impl Default for Conditionals {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            status: true,
            match_type: "all".to_string(),
        }
    }
}

/// A feed as passed to `notify`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    pub id: Option<u64>,
    #[serde(rename = "processedValues")]
    pub settings: FeedSettings,
}

/// A form submission: raw field values keyed by input name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub form_id: Option<u64>,
    pub entry_id: Option<u64>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Submission {
    /// String value of a form field. `names.first_name` style keys reach into
    /// nested fields when no top-level key matches.
    pub fn field(
        &self,
        key: &str,
    ) -> Option<&str> {
        if let Some(value) = self.data.get(key) {
            return value.as_str();
        }
        let mut parts = key.split('.');
        let mut current = self.data.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        current.as_str()
    }
}

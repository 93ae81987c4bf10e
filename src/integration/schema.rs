use serde::Serialize;

use crate::domain::RecipientLists;

/// Global settings page: menu texts plus the credential inputs
#[derive(Debug, Clone, Serialize)]
pub struct GlobalFields {
    pub logo: String,
    pub menu_title: String,
    pub menu_description: String,
    pub valid_message: String,
    pub invalid_message: String,
    pub save_button_text: String,
    pub config_instruction: String,
    pub fields: Vec<GlobalField>,
    /// Collapse the inputs once saved credentials are valid
    pub hide_on_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalField {
    pub key: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub placeholder: String,
    pub label_tips: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Password,
}

/// Per-feed settings form
#[derive(Debug, Clone, Serialize)]
pub struct SettingsFields {
    pub fields: Vec<FieldSpec>,
    pub button_require_list: bool,
    pub integration_title: String,
}

impl SettingsFields {
    pub fn field(
        &self,
        key: &str,
    ) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Component {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "select")]
    Select,
    /// Text input that accepts `{inputs.*}` shortcodes from the form
    #[serde(rename = "value_text")]
    ValueText,
    #[serde(rename = "checkbox-single")]
    CheckboxSingle,
    #[serde(rename = "conditional_block")]
    ConditionalBlock,
}

/// One input of the feed form. Optional attributes are omitted from the
/// serialized form rather than sent as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub key: String,
    pub component: Component,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkbox_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_list: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<RecipientLists>,
}

impl FieldSpec {
    pub fn new(
        key: &str,
        component: Component,
    ) -> Self {
        Self {
            key: key.to_string(),
            component,
            label: None,
            required: false,
            placeholder: None,
            tips: None,
            checkbox_label: None,
            require_list: None,
            options: None,
        }
    }

    pub fn label(
        mut self,
        label: &str,
    ) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(
        mut self,
        placeholder: &str,
    ) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn tips(
        mut self,
        tips: &str,
    ) -> Self {
        self.tips = Some(tips.to_string());
        self
    }

    pub fn checkbox_label(
        mut self,
        checkbox_label: &str,
    ) -> Self {
        self.checkbox_label = Some(checkbox_label.to_string());
        self
    }

    /// Show the field before a list has been picked
    pub fn without_list(mut self) -> Self {
        self.require_list = Some(false);
        self
    }

    pub fn options(
        mut self,
        options: RecipientLists,
    ) -> Self {
        self.options = Some(options);
        self
    }
}

/// Entry in the host's list of available integrations
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationCard {
    pub title: String,
    pub logo: String,
    pub is_active: bool,
    pub configure_title: String,
    pub global_configure_url: String,
    pub configure_message: String,
    pub configure_button_text: String,
}

/// Custom list field offered for mapping. Rapidmail lists have none.
#[derive(Debug, Clone, Serialize)]
pub struct MergeField {
    pub key: String,
    pub label: String,
    pub required: bool,
}

/// Reply to a successful settings save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSaved {
    pub message: String,
    /// Whether the stored credentials are now verified
    pub status: bool,
}

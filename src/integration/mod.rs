//! The Rapidmail feed: what the host framework calls into.
//!
//! The host owns the feed lifecycle. It asks the integration for its form
//! schemas, hands it settings to save, and calls `notify` once per matching
//! submission. Results flow back through `IntegrationHost`; credentials live
//! in the host's `SettingsStore`.

mod feed;
mod schema;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
pub use feed::*;
pub use schema::*;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::IntegrationSettings;
use crate::configuration::RapidmailSettings;
use crate::configuration::Settings;
use crate::domain::ContactName;
use crate::domain::Credentials;
use crate::domain::ListId;
use crate::domain::NewSubscriber;
use crate::domain::RecipientLists;
use crate::domain::SubscriberEmail;
use crate::host::ActionStatus;
use crate::host::IntegrationHost;
use crate::host::SettingsStore;
use crate::rapidmail_client::RapidmailClient;
use crate::rapidmail_client::RapidmailError;
use crate::utils::error_chain_fmt;
use crate::utils::sanitize_text_field;

pub const TITLE: &str = "Rapidmail";
pub const SUCCESS_MESSAGE: &str = "Rapidmail feed has been successfully initialed and pushed data";
const DESCRIPTION: &str =
    "Connect Rapidmail with your forms and subscribe a contact when a form is submitted.";
const CREDENTIAL_TIPS: &str =
    "login to your Rapidmail account and go to Settings -> API -> Create API credentials";

/// Hooks the host invokes on an integration
#[async_trait]
pub trait FeedIntegration: Send + Sync {
    fn global_fields(&self) -> GlobalFields;

    /// Stored credentials over defaults (blank username/password, unverified)
    fn global_settings(&self) -> Result<Credentials, anyhow::Error>;

    async fn save_global_settings(
        &self,
        input: GlobalSettingsInput,
    ) -> Result<SettingsSaved, SettingsError>;

    fn integration_card(&self) -> IntegrationCard;

    fn feed_defaults(&self) -> FeedSettings;

    /// Feed form; `existing` is the feed being edited (defaults for a new one)
    async fn settings_fields(
        &self,
        existing: &FeedSettings,
    ) -> SettingsFields;

    async fn lists(&self) -> RecipientLists;

    fn merge_fields(
        &self,
        list_id: &str,
    ) -> Vec<MergeField>;

    /// Push one submission. Never fails from the host's point of view;
    /// outcomes are reported through `IntegrationHost::action_result`.
    async fn notify(
        &self,
        feed: &Feed,
        submission: &Submission,
    );

    fn is_configured(&self) -> bool;

    fn is_enabled(&self) -> bool;
}

/// Credentials as typed into the global settings form
#[derive(Deserialize)]
pub struct GlobalSettingsInput {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(thiserror::Error)]
pub enum SettingsError {
    #[error("Your Rapidmail Credentials are not valid: {0}")]
    InvalidCredentials(#[source] RapidmailError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SettingsError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Shape of the credentials option in the settings store. Missing keys take
/// their defaults.
// `Secret<String>` is not `Serialize`, hence the plain mirror of `Credentials`
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct StoredCredentials {
    username: String,
    password: String,
    status: bool,
}

impl From<StoredCredentials> for Credentials {
    fn from(stored: StoredCredentials) -> Self {
        Self {
            username: stored.username,
            password: Secret::new(stored.password),
            status: stored.status,
        }
    }
}

impl From<&Credentials> for StoredCredentials {
    fn from(creds: &Credentials) -> Self {
        Self {
            username: creds.username.clone(),
            password: creds.password.expose_secret().clone(),
            status: creds.status,
        }
    }
}

pub struct RapidmailIntegration {
    integration: IntegrationSettings,
    rapidmail: RapidmailSettings,
    store: Arc<dyn SettingsStore>,
    host: Arc<dyn IntegrationHost>,
}

impl RapidmailIntegration {
    pub fn new(
        cfg: &Settings,
        store: Arc<dyn SettingsStore>,
        host: Arc<dyn IntegrationHost>,
    ) -> Self {
        Self {
            integration: cfg.integration.clone(),
            rapidmail: cfg.rapidmail.clone(),
            store,
            host,
        }
    }

    /// Client over whatever credentials are stored right now
    pub fn remote_client(&self) -> Result<RapidmailClient, anyhow::Error> {
        Ok(self.rapidmail.client(self.global_settings()?))
    }

    fn store_credentials(
        &self,
        creds: &Credentials,
    ) -> Result<(), anyhow::Error> {
        let value = serde_json::to_value(StoredCredentials::from(creds))?;
        self.store
            .put(&self.integration.option_key, value)
            .context("could not persist Rapidmail credentials")
    }

    /// Email from the processed values, or, if that is not an address, from
    /// the form field it names
    fn resolve_email(
        feed: &Feed,
        submission: &Submission,
    ) -> Option<SubscriberEmail> {
        let mapped = &feed.settings.email;
        SubscriberEmail::parse(mapped.clone())
            .or_else(|_| {
                let raw = submission.field(mapped).unwrap_or_default();
                SubscriberEmail::parse(raw.to_string())
            })
            .ok()
    }
}

#[async_trait]
impl FeedIntegration for RapidmailIntegration {
    fn global_fields(&self) -> GlobalFields {
        let credential = |key: &str, input_type: InputType, placeholder: &str, label: &str| {
            GlobalField {
                key: key.to_string(),
                input_type,
                placeholder: placeholder.to_string(),
                label_tips: format!(
                    "Enter your {label}. If you do not have one, please {CREDENTIAL_TIPS}"
                ),
                label: label.to_string(),
            }
        };
        GlobalFields {
            logo: self.integration.logo_url.clone(),
            menu_title: format!("{TITLE} Settings"),
            menu_description: DESCRIPTION.to_string(),
            valid_message: "Your Rapidmail Credentials are valid".to_string(),
            invalid_message: "Your Rapidmail Credentials are not valid".to_string(),
            save_button_text: "Save Settings".to_string(),
            config_instruction: "Enter your Rapidmail API credentials".to_string(),
            fields: vec![
                credential(
                    "username",
                    InputType::Text,
                    "Username",
                    "Rapidmail API Username",
                ),
                credential(
                    "password",
                    InputType::Password,
                    "Password",
                    "Rapidmail API Password",
                ),
            ],
            hide_on_valid: true,
        }
    }

    fn global_settings(&self) -> Result<Credentials, anyhow::Error> {
        let stored = match self.store.get(&self.integration.option_key)? {
            Some(value) => serde_json::from_value::<StoredCredentials>(value)
                .context("stored Rapidmail settings are malformed")?,
            None => StoredCredentials::default(),
        };
        Ok(stored.into())
    }

    #[tracing::instrument(
        name = "Saving Rapidmail settings",
        skip(self, input),
        fields(username = tracing::field::Empty)
    )]
    async fn save_global_settings(
        &self,
        input: GlobalSettingsInput,
    ) -> Result<SettingsSaved, SettingsError> {
        let username = sanitize_text_field(&input.username);
        tracing::Span::current().record("username", tracing::field::display(&username));

        if username.is_empty() {
            self.store_credentials(&Credentials::default())?;
            return Ok(SettingsSaved {
                message: "Your settings has been updated".to_string(),
                status: false,
            });
        }

        let password = Secret::new(sanitize_text_field(input.password.expose_secret()));
        // verified against the supplied pair; nothing is stored until it passes
        self.rapidmail
            .client(Credentials::default())
            .verify_credentials(&username, &password)
            .await
            .map_err(SettingsError::InvalidCredentials)?;

        self.store_credentials(&Credentials {
            username,
            password,
            status: true,
        })?;
        Ok(SettingsSaved {
            message: "Your Rapidmail Credentials are valid".to_string(),
            status: true,
        })
    }

    fn integration_card(&self) -> IntegrationCard {
        IntegrationCard {
            title: format!("{TITLE} Integration"),
            logo: self.integration.logo_url.clone(),
            is_active: self.is_configured(),
            configure_title: "Configuration required!".to_string(),
            global_configure_url: self.integration.settings_url.clone(),
            configure_message:
                "Rapidmail is not configured yet! Please configure your Rapidmail api first"
                    .to_string(),
            configure_button_text: "Set Rapidmail".to_string(),
        }
    }

    fn feed_defaults(&self) -> FeedSettings { FeedSettings::default() }

    async fn settings_fields(
        &self,
        _existing: &FeedSettings,
    ) -> SettingsFields {
        let lists = self.lists().await;
        SettingsFields {
            fields: vec![
                FieldSpec::new("name", Component::Text)
                    .label("Feed Name")
                    .required()
                    .placeholder("Your Feed Name"),
                FieldSpec::new("list_id", Component::Select)
                    .label("Rapidmail List")
                    .required()
                    .placeholder("Select Rapidmail List")
                    .tips("Select the Rapidmail List you would like to add your contacts to.")
                    .options(lists),
                FieldSpec::new("email", Component::ValueText)
                    .label("Email Address")
                    .required()
                    .placeholder("Select the email field of your form")
                    .without_list(),
                FieldSpec::new("first_name", Component::ValueText)
                    .label("First Name")
                    .without_list(),
                FieldSpec::new("last_name", Component::ValueText)
                    .label("Last Name")
                    .without_list(),
                FieldSpec::new("send_confirmation_email", Component::CheckboxSingle)
                    .checkbox_label("Send Confirmation Email")
                    .without_list(),
                FieldSpec::new("conditionals", Component::ConditionalBlock)
                    .label("Conditional Logics")
                    .tips(
                        "Allow Rapidmail integration conditionally based on your submission \
                         values",
                    )
                    .without_list(),
                FieldSpec::new("enabled", Component::CheckboxSingle)
                    .label("Status")
                    .checkbox_label("Enable This feed")
                    .without_list(),
            ],
            button_require_list: false,
            integration_title: TITLE.to_string(),
        }
    }

    async fn lists(&self) -> RecipientLists {
        match self.remote_client() {
            Ok(client) => client.recipient_lists().await,
            Err(e) => {
                tracing::warn!(
                    error.cause_chain=?e,
                    "could not read Rapidmail settings, offering no lists"
                );
                RecipientLists::default()
            }
        }
    }

    fn merge_fields(
        &self,
        _list_id: &str,
    ) -> Vec<MergeField> {
        Vec::new()
    }

    #[tracing::instrument(
        name = "Pushing submission to Rapidmail",
        skip_all,
        fields(
            feed_id = ?feed.id,
            form_id = ?submission.form_id,
            entry_id = ?submission.entry_id,
            subscriber_email = tracing::field::Empty,
        )
    )]
    async fn notify(
        &self,
        feed: &Feed,
        submission: &Submission,
    ) {
        let Some(email) = Self::resolve_email(feed, submission) else {
            // not an error from the host's point of view: the submission simply
            // has nothing to subscribe
            tracing::warn!("no valid email in submission, skipping");
            return;
        };
        tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

        let values = &feed.settings;
        let new_sub = match (
            ListId::parse(values.list_id.clone()),
            ContactName::parse(values.first_name.clone()),
            ContactName::parse(values.last_name.clone()),
        ) {
            (Ok(list_id), Ok(first_name), Ok(last_name)) => NewSubscriber {
                list_id,
                email,
                first_name,
                last_name,
                send_confirmation: values.send_confirmation_email,
            },
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                self.host
                    .action_result(feed, ActionStatus::Failed, &e);
                return;
            }
        };

        let client = match self.remote_client() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error.cause_chain=?e, "could not read Rapidmail settings");
                self.host
                    .action_result(feed, ActionStatus::Failed, &e.to_string());
                return;
            }
        };

        match client.create_subscriber(&new_sub).await {
            Ok(record) => {
                tracing::info!(contact_id = %record.contact_id, "recipient created");
                self.host
                    .action_result(feed, ActionStatus::Success, SUCCESS_MESSAGE);
            }
            Err(e) => {
                tracing::error!(
                    error.cause_chain=?e,
                    error.message=%e,
                    "could not create recipient"
                );
                self.host
                    .action_result(feed, ActionStatus::Failed, &e.to_string());
            }
        }
    }

    fn is_configured(&self) -> bool {
        match self.global_settings() {
            Ok(creds) => creds.status && !creds.is_empty(),
            Err(e) => {
                tracing::warn!(error.cause_chain=?e, "could not read Rapidmail settings");
                false
            }
        }
    }

    fn is_enabled(&self) -> bool { true }
}

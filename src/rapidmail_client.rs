use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::CreateRecipientRequest;
use crate::domain::Credentials;
use crate::domain::NewSubscriber;
use crate::domain::RecipientList;
use crate::domain::RecipientLists;
use crate::utils::error_chain_fmt;

/// Production endpoint of the Rapidmail v3 API
pub const DEFAULT_BASE_URL: &str = "https://apiv3.emailsys.net";

#[derive(thiserror::Error)]
pub enum RapidmailError {
    /// No response was received at all (DNS, connection refused, TLS, ...)
    #[error("Request could not be performed")]
    Transport(#[source] reqwest::Error),
    #[error("API credentials are not correct")]
    InvalidCredentials,
    #[error("An error occured: {message}")]
    Api { status: u16, message: String },
    #[error("Rapidmail returned an unreadable response")]
    UnexpectedResponse(#[source] anyhow::Error),
    /// Rejected locally, before any request was made
    #[error("{0}")]
    Validation(String),
}

impl std::fmt::Debug for RapidmailError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Successful `POST /recipients`
#[derive(Debug, Clone)]
pub struct SubscriberRecord {
    pub contact_id: String,
    /// The full response, for hosts that want to keep more than the id
    pub body: serde_json::Value,
}

/// Rapidmail reports errors as RFC 7807 problem details
#[derive(Deserialize, Default)]
struct ProblemDetail {
    title: Option<String>,
    detail: Option<String>,
}

impl ProblemDetail {
    /// `detail`, else `title`; blank values count as absent
    fn message(self) -> Option<String> {
        let non_blank = |m: &String| !m.trim().is_empty();
        self.detail
            .filter(non_blank)
            .or(self.title.filter(non_blank))
    }
}

#[derive(Deserialize)]
struct RecipientListsResponse {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedRecipientLists,
}

#[derive(Deserialize)]
struct EmbeddedRecipientLists {
    #[serde(default)]
    recipientlists: Vec<RecipientList>,
}

/// Client for the three Rapidmail endpoints the integration needs.
///
/// Credentials are captured at construction; the feed adapter builds a fresh
/// client from the settings store before each operation, so a saved change
/// is picked up on the next call.
// `reqwest::Client` holds a connection pool, and is cheap to clone
#[derive(Clone)]
pub struct RapidmailClient {
    http_client: Client,
    base_url: String,
    credentials: Credentials,
}

impl RapidmailClient {
    pub fn new(
        base_url: String,
        credentials: Credentials,
    ) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// `GET /apiusers` with the supplied pair rather than the stored one, so
    /// that new credentials can be checked before they are saved.
    #[tracing::instrument(name = "Verifying Rapidmail credentials", skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &Secret<String>,
    ) -> Result<(), RapidmailError> {
        let auth = basic_auth(username, password)?;
        self.send::<()>(Method::GET, "/apiusers", auth, None)
            .await?;
        Ok(())
    }

    /// Lists available to the stored API user. Any failure yields an empty
    /// mapping; the cause is only logged. Use `try_recipient_lists` to see it.
    pub async fn recipient_lists(&self) -> RecipientLists {
        if self.credentials.is_empty() {
            return RecipientLists::default();
        }
        match self.try_recipient_lists().await {
            Ok(lists) => lists,
            Err(e) => {
                tracing::warn!(
                    error.cause_chain=?e,
                    error.message=%e,
                    "could not fetch recipient lists, offering none"
                );
                RecipientLists::default()
            }
        }
    }

    #[tracing::instrument(name = "Fetching Rapidmail recipient lists", skip(self))]
    pub async fn try_recipient_lists(&self) -> Result<RecipientLists, RapidmailError> {
        let (_, body) = self
            .request::<()>(Method::GET, "/recipientlists", None)
            .await?;
        let response: RecipientListsResponse = serde_json::from_str(&body)
            .context("`_embedded.recipientlists` missing from response")
            .map_err(RapidmailError::UnexpectedResponse)?;
        Ok(response
            .embedded
            .recipientlists
            .into_iter()
            .collect())
    }

    /// `POST /recipients`. Identical calls are not deduplicated here; that is
    /// up to Rapidmail.
    #[tracing::instrument(
        name = "Creating Rapidmail recipient",
        skip(self, new_sub),
        fields(
            subscriber_email = %new_sub.email,
            list_id = %new_sub.list_id.as_ref(),
        )
    )]
    pub async fn create_subscriber(
        &self,
        new_sub: &NewSubscriber,
    ) -> Result<SubscriberRecord, RapidmailError> {
        let request = CreateRecipientRequest::from(new_sub);
        let (status, body) = self
            .request(Method::POST, "/recipients", Some(&request))
            .await?;
        let body: serde_json::Value = serde_json::from_str(&body)
            .context("response to POST /recipients is not JSON")
            .map_err(RapidmailError::UnexpectedResponse)?;

        let contact_id = match body.pointer("/contact/id") {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id.clone(),
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => {
                let problem = ProblemDetail::deserialize(&body).unwrap_or_default();
                return Err(RapidmailError::Api {
                    status: status.as_u16(),
                    message: problem
                        .message()
                        .unwrap_or("Rapidmail did not return a contact id".to_string()),
                });
            }
        };
        Ok(SubscriberRecord { contact_id, body })
    }

    /// Authenticated request with the stored credentials, which must be
    /// present. Returns the status and raw body of a 2xx response.
    async fn request<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, String), RapidmailError> {
        if self.credentials.is_empty() {
            return Err(RapidmailError::Validation(
                "Rapidmail API credentials are not configured".to_string(),
            ));
        }
        let auth = basic_auth(&self.credentials.username, &self.credentials.password)?;
        self.send(method, endpoint, auth, body).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        auth: HeaderValue,
        body: Option<&B>,
    ) -> Result<(StatusCode, String), RapidmailError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .http_client
            .request(method, &url)
            .header(AUTHORIZATION, auth);
        if let Some(body) = body {
            // sets content-type: application/json
            builder = builder.json(body);
        }
        let response = builder
            .send()
            .await
            .map_err(RapidmailError::Transport)?;

        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "rapidmail responded");
        if status == StatusCode::UNAUTHORIZED {
            return Err(RapidmailError::InvalidCredentials);
        }
        if !status.is_success() {
            // the status alone is enough to report; an unreadable body is not
            // worth a separate error
            let body = response.text().await.unwrap_or_default();
            return Err(RapidmailError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        let body = response
            .text()
            .await
            .map_err(RapidmailError::Transport)?;
        Ok((status, body))
    }
}

/// `Basic base64(username:password)`, marked sensitive so it never shows up in
/// debug output
fn basic_auth(
    username: &str,
    password: &Secret<String>,
) -> Result<HeaderValue, RapidmailError> {
    if username.trim().is_empty() || password.expose_secret().trim().is_empty() {
        return Err(RapidmailError::Validation(
            "Rapidmail API username and password are required".to_string(),
        ));
    }
    let encoded = STANDARD.encode(format!("{username}:{}", password.expose_secret()));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| RapidmailError::Validation(format!("Unusable credentials: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Message for a non-2xx response: the problem detail if there is one, else
/// the reason phrase of the status
fn error_message(
    status: StatusCode,
    body: &str,
) -> String {
    let problem: ProblemDetail = serde_json::from_str(body).unwrap_or_default();
    problem
        .message()
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string()
        })
}

//! Services the host framework provides to the integration.
//!
//! The host owns persistence and result reporting; the integration only calls
//! into these traits and keeps no state of its own.

use std::fmt::Display;

use serde::Serialize;

use crate::integration::Feed;

/// Key/value option storage (WordPress options, a JSON file, a table, ...).
/// Values are opaque JSON to the store.
pub trait SettingsStore: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<serde_json::Value>, anyhow::Error>;

    fn put(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), anyhow::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failed,
}

impl Display for ActionStatus {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Receives the outcome of every `notify` that got as far as Rapidmail (or
/// was rejected while building the request).
pub trait IntegrationHost: Send + Sync {
    fn action_result(
        &self,
        feed: &Feed,
        status: ActionStatus,
        message: &str,
    );
}

/// Host that only emits `tracing` events; used by the CLI
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHost;

impl IntegrationHost for TracingHost {
    fn action_result(
        &self,
        feed: &Feed,
        status: ActionStatus,
        message: &str,
    ) {
        match status {
            ActionStatus::Success => tracing::info!(
                feed_id = ?feed.id,
                feed_name = %feed.settings.name,
                %status,
                "{message}"
            ),
            ActionStatus::Failed => tracing::error!(
                feed_id = ?feed.id,
                feed_name = %feed.settings.name,
                %status,
                "{message}"
            ),
        }
    }
}

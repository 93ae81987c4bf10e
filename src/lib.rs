//! Rapidmail integration for form builders: a small client for the Rapidmail
//! v3 API, and a feed adapter that turns form submissions into recipients.
//!
//! The host framework (form builder, CLI, ...) drives
//! `integration::RapidmailIntegration` through the `FeedIntegration` hooks and
//! provides storage and result reporting through the traits in `host`.

pub mod configuration;
pub mod domain;
pub mod host;
pub mod integration;
pub mod rapidmail_client;
pub mod settings_store;
pub mod telemetry;
pub mod utils;

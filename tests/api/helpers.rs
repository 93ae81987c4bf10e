use std::net::TcpListener;
use std::sync::Arc;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use rapidmail_feed::configuration::get_configuration;
use rapidmail_feed::configuration::Settings;
use rapidmail_feed::domain::ContactName;
use rapidmail_feed::domain::Credentials;
use rapidmail_feed::domain::ListId;
use rapidmail_feed::domain::NewSubscriber;
use rapidmail_feed::domain::SubscriberEmail;
use rapidmail_feed::host::ActionStatus;
use rapidmail_feed::host::IntegrationHost;
use rapidmail_feed::host::SettingsStore;
use rapidmail_feed::integration::Feed;
use rapidmail_feed::integration::FeedSettings;
use rapidmail_feed::integration::RapidmailIntegration;
use rapidmail_feed::rapidmail_client::RapidmailClient;
use rapidmail_feed::settings_store::InMemorySettingsStore;
use rapidmail_feed::telemetry::get_subscriber;
use rapidmail_feed::telemetry::init_subscriber;
use secrecy::Secret;
use wiremock::MockServer;

// the subscriber can only be initialised once per test binary; all tests go
// through `spawn_app`, which forces this.
//
// TEST_LOG=true cargo test notify | bunyan
static TRACING: Lazy<()> = Lazy::new(|| {
    match std::env::var("TEST_LOG") {
        Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)),
        Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)),
    };
});

pub const USERNAME: &str = "api-user";
pub const PASSWORD: &str = "api-pass";

/// `Authorization` header Rapidmail must receive for `USERNAME`/`PASSWORD`
pub fn basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")))
}

/// Collects every `action_result` in order
#[derive(Default)]
pub struct RecordingHost {
    results: Mutex<Vec<(ActionStatus, String)>>,
}

impl IntegrationHost for RecordingHost {
    fn action_result(
        &self,
        _feed: &Feed,
        status: ActionStatus,
        message: &str,
    ) {
        self.results
            .lock()
            .unwrap()
            .push((status, message.to_string()));
    }
}

pub struct TestApp {
    pub cfg: Settings,
    /// Stands in for `https://apiv3.emailsys.net`
    pub rapidmail_server: MockServer,
    pub store: Arc<InMemorySettingsStore>,
    pub host: Arc<RecordingHost>,
    pub integration: RapidmailIntegration,
}

impl TestApp {
    /// Store verified credentials without going through the API
    pub fn configure(&self) {
        self.store
            .put(
                &self.cfg.integration.option_key,
                serde_json::json!({
                    "username": USERNAME,
                    "password": PASSWORD,
                    "status": true,
                }),
            )
            .unwrap();
    }

    pub fn stored_settings(&self) -> Option<serde_json::Value> {
        self.store
            .get(&self.cfg.integration.option_key)
            .unwrap()
    }

    /// Client with the test credentials, independent of the store
    pub fn client(&self) -> RapidmailClient {
        self.cfg.rapidmail.client(Credentials {
            username: USERNAME.to_string(),
            password: Secret::new(PASSWORD.to_string()),
            status: true,
        })
    }

    pub fn results(&self) -> Vec<(ActionStatus, String)> {
        self.host
            .results
            .lock()
            .unwrap()
            .clone()
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let rapidmail_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().expect("failed to read configuration");
        cfg.rapidmail.base_url = rapidmail_server.uri();
        cfg
    };

    let store = Arc::new(InMemorySettingsStore::default());
    let host = Arc::new(RecordingHost::default());
    let integration = RapidmailIntegration::new(&cfg, store.clone(), host.clone());

    TestApp {
        cfg,
        rapidmail_server,
        store,
        host,
        integration,
    }
}

/// Base url on which nothing listens: every request is a transport failure
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn new_subscriber(email: &str) -> NewSubscriber {
    NewSubscriber {
        list_id: ListId::parse("42".to_string()).unwrap(),
        email: SubscriberEmail::parse(email.to_string()).unwrap(),
        first_name: ContactName::parse("A".to_string()).unwrap(),
        last_name: ContactName::parse("B".to_string()).unwrap(),
        send_confirmation: false,
    }
}

/// Feed whose processed values already hold the contact
pub fn feed(email: &str) -> Feed {
    Feed {
        id: Some(1),
        settings: FeedSettings {
            name: "Newsletter signup".to_string(),
            list_id: "42".to_string(),
            email: email.to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            ..FeedSettings::default()
        },
    }
}

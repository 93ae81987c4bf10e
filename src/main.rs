use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use rapidmail_feed::configuration::get_configuration;
use rapidmail_feed::host::ActionStatus;
use rapidmail_feed::host::IntegrationHost;
use rapidmail_feed::host::TracingHost;
use rapidmail_feed::integration::Feed;
use rapidmail_feed::integration::FeedIntegration;
use rapidmail_feed::integration::FeedSettings;
use rapidmail_feed::integration::GlobalSettingsInput;
use rapidmail_feed::integration::RapidmailIntegration;
use rapidmail_feed::integration::Submission;
use rapidmail_feed::settings_store::JsonFileSettingsStore;
use rapidmail_feed::telemetry::get_subscriber;
use rapidmail_feed::telemetry::init_subscriber;
use secrecy::Secret;

#[derive(Parser, Debug)]
#[command(name = "rapidmail-feed", about = "Push form contacts to Rapidmail recipient lists")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify and store Rapidmail API credentials (a blank username clears them)
    Configure {
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, env = "RAPIDMAIL_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
    /// Show whether stored credentials are present and verified
    Status,
    /// Print the recipient lists available to the stored API user
    Lists,
    /// Print the global and feed settings schemas as JSON
    Schema,
    /// Subscribe one contact, exactly as a form submission would
    Subscribe {
        #[arg(long)]
        list_id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Have Rapidmail send its double opt-in mail
        #[arg(long)]
        send_confirmation: bool,
    },
}

/// Logs like `TracingHost`, and keeps the last outcome for the exit status
#[derive(Default)]
struct CliHost {
    outcome: Mutex<Option<(ActionStatus, String)>>,
}

impl IntegrationHost for CliHost {
    fn action_result(
        &self,
        feed: &Feed,
        status: ActionStatus,
        message: &str,
    ) {
        TracingHost.action_result(feed, status, message);
        if let Ok(mut outcome) = self.outcome.lock() {
            *outcome = Some((status, message.to_string()));
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // stdout is reserved for command output
    let subscriber = get_subscriber("rapidmail-feed", "info", std::io::stderr);
    init_subscriber(subscriber);

    let args = Args::parse();
    let cfg = get_configuration().context("could not load configuration")?;

    let store = Arc::new(JsonFileSettingsStore::new(&cfg.integration.settings_path));
    let host = Arc::new(CliHost::default());
    let integration = RapidmailIntegration::new(&cfg, store, host.clone());

    match args.command {
        Command::Configure { username, password } => {
            let saved = integration
                .save_global_settings(GlobalSettingsInput {
                    username,
                    password: Secret::new(password),
                })
                .await?;
            println!("{}", saved.message);
        }

        Command::Status => {
            let creds = integration.global_settings()?;
            match integration.is_configured() {
                true => println!("configured as {}", creds.username),
                false => println!("not configured"),
            }
        }

        Command::Lists => {
            let client = integration.remote_client()?;
            // unlike the feed form, an operator wants to see why nothing came back
            for list in client.try_recipient_lists().await?.iter() {
                println!("{}\t{}", list.id, list.name);
            }
        }

        Command::Schema => {
            let schema = serde_json::json!({
                "global": integration.global_fields(),
                "card": integration.integration_card(),
                "feed_defaults": integration.feed_defaults(),
                "feed": integration.settings_fields(&integration.feed_defaults()).await,
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Command::Subscribe {
            list_id,
            email,
            first_name,
            last_name,
            send_confirmation,
        } => {
            let feed = Feed {
                id: None,
                settings: FeedSettings {
                    name: "cli".to_string(),
                    list_id,
                    email,
                    first_name,
                    last_name,
                    send_confirmation_email: send_confirmation,
                    ..integration.feed_defaults()
                },
            };
            integration
                .notify(&feed, &Submission::default())
                .await;

            let outcome = host
                .outcome
                .lock()
                .map_err(|_| anyhow::anyhow!("outcome lock poisoned"))?
                .take();
            match outcome {
                Some((ActionStatus::Success, message)) => println!("{message}"),
                Some((ActionStatus::Failed, message)) => anyhow::bail!(message),
                None => anyhow::bail!("not a valid email address"),
            }
        }
    }

    Ok(())
}

use rapidmail_feed::host::ActionStatus;
use rapidmail_feed::integration::FeedIntegration;
use rapidmail_feed::integration::RapidmailIntegration;
use rapidmail_feed::integration::Submission;
use rapidmail_feed::integration::SUCCESS_MESSAGE;
use serde_json::json;
use wiremock::matchers::any;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::basic_auth;
use crate::helpers::feed;
use crate::helpers::spawn_app;
use crate::helpers::unreachable_base_url;

fn submission(data: serde_json::Value) -> Submission {
    Submission {
        form_id: Some(3),
        entry_id: Some(99),
        data: data.as_object().cloned().unwrap_or_default(),
    }
}

#[tokio::test]
async fn notify_subscribes_contact() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(path("/recipients"))
        .and(method("POST"))
        .and(header("Authorization", basic_auth().as_str()))
        .and(body_json(json!({
            "recipientlist_id": "42",
            "email": "a@b.com",
            "firstname": "A",
            "lastname": "B",
            "send_activationmail": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"contact": {"id": 5}})))
        .named("Create recipient")
        .expect(1)
        .mount(&app.rapidmail_server)
        .await;

    app.integration
        .notify(&feed("a@b.com"), &submission(json!({})))
        .await;

    assert_eq!(
        app.results(),
        vec![(ActionStatus::Success, SUCCESS_MESSAGE.to_string())]
    );
}

#[tokio::test]
async fn notify_passes_confirmation_flag() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(path("/recipients"))
        .and(body_json(json!({
            "recipientlist_id": "42",
            "email": "a@b.com",
            "firstname": "A",
            "lastname": "B",
            "send_activationmail": true,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"contact": {"id": 5}})))
        .expect(1)
        .mount(&app.rapidmail_server)
        .await;

    let mut feed = feed("a@b.com");
    feed.settings.send_confirmation_email = true;
    app.integration
        .notify(&feed, &submission(json!({})))
        .await;

    assert_eq!(app.results()[0].0, ActionStatus::Success);
}

#[tokio::test]
async fn notify_falls_back_to_form_field() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(path("/recipients"))
        .and(body_json(json!({
            "recipientlist_id": "42",
            "email": "from-form@b.com",
            "firstname": "A",
            "lastname": "B",
            "send_activationmail": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"contact": {"id": 5}})))
        .expect(1)
        .mount(&app.rapidmail_server)
        .await;

    // the processed value is the name of the email input, not an address
    app.integration
        .notify(
            &feed("email_address"),
            &submission(json!({"email_address": "from-form@b.com"})),
        )
        .await;

    assert_eq!(app.results()[0].0, ActionStatus::Success);
}

#[tokio::test]
async fn notify_skips_invalid_email() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.rapidmail_server)
        .await;

    for (mapped, data) in [
        ("", json!({})),
        ("not-an-email", json!({})),
        ("email_address", json!({"email_address": "still-not-an-email"})),
        ("email_address", json!({"email_address": 42})),
        ("email_address", json!({"other": "a@b.com"})),
    ] {
        app.integration
            .notify(&feed(mapped), &submission(data))
            .await;
    }

    assert!(app.results().is_empty(), "{:?}", app.results());
}

#[tokio::test]
async fn notify_reports_api_failure() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(path("/recipients"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "title": "Conflict",
            "detail": "Recipient already exists",
        })))
        .expect(1)
        .mount(&app.rapidmail_server)
        .await;

    app.integration
        .notify(&feed("a@b.com"), &submission(json!({})))
        .await;

    assert_eq!(
        app.results(),
        vec![(
            ActionStatus::Failed,
            "An error occured: Recipient already exists".to_string()
        )]
    );
}

#[tokio::test]
async fn notify_reports_unreachable_api() {
    let app = spawn_app().await;
    app.configure();

    let mut cfg = app.cfg.clone();
    cfg.rapidmail.base_url = unreachable_base_url();
    let integration = RapidmailIntegration::new(&cfg, app.store.clone(), app.host.clone());

    integration
        .notify(&feed("a@b.com"), &submission(json!({})))
        .await;

    assert_eq!(
        app.results(),
        vec![(
            ActionStatus::Failed,
            "Request could not be performed".to_string()
        )]
    );
}

#[tokio::test]
async fn notify_without_credentials() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.rapidmail_server)
        .await;

    app.integration
        .notify(&feed("a@b.com"), &submission(json!({})))
        .await;

    let results = app.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, ActionStatus::Failed);
}

#[tokio::test]
async fn notify_without_list() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.rapidmail_server)
        .await;

    let mut feed = feed("a@b.com");
    feed.settings.list_id = String::new();
    app.integration
        .notify(&feed, &submission(json!({})))
        .await;

    assert_eq!(
        app.results(),
        vec![(
            ActionStatus::Failed,
            "No Rapidmail list selected".to_string()
        )]
    );
}

#[tokio::test]
async fn notify_is_not_idempotent() {
    let app = spawn_app().await;
    app.configure();

    Mock::given(path("/recipients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"contact": {"id": 5}})))
        .expect(2)
        .mount(&app.rapidmail_server)
        .await;

    let feed = feed("a@b.com");
    let submission = submission(json!({}));
    app.integration.notify(&feed, &submission).await;
    app.integration.notify(&feed, &submission).await;

    assert_eq!(app.results().len(), 2);
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io::Write;
use std::sync::Arc;

use serde_json::json;

use crate::modules::context::MailerContext;
use crate::modules::dispatch::outcome::{DispatchResult, SendOutcome};
use crate::modules::dispatch::stub::StubTransport;
use crate::modules::error::code::ErrorCode;
use crate::modules::settings::cli::Settings;
use crate::modules::smtp::template::entity::{EmailTemplate, TemplateAttachment, TemplateCatalog};
use crate::modules::smtp::template::fetch::stub::StubFetcher;
use crate::modules::smtp::template::render::Templates;
use crate::modules::smtp::template::send::TemplateSendRequest;

fn certificate_template() -> EmailTemplate {
    EmailTemplate {
        subject: "Your {{event}} certificate".into(),
        body: "<p>Congratulations {{name}}!</p>".into(),
        attachments: vec![
            TemplateAttachment {
                file_name: "certificate-{{id}}.pdf".into(),
                url: "https://files.example.com/certificates/{{id}}.pdf".into(),
                content_type: None,
            },
            TemplateAttachment {
                file_name: "badge.png".into(),
                url: "https://files.example.com/badges/{{id}}.png".into(),
                content_type: Some("image/png".into()),
            },
        ],
    }
}

fn catalog() -> TemplateCatalog {
    let mut catalog = TemplateCatalog::default();
    catalog.register("certificate", certificate_template());
    catalog.register(
        "reminder",
        EmailTemplate {
            subject: "Reminder: {{event}}".into(),
            body: "Hi {{name}}, see you at {{venue}}.".into(),
            attachments: vec![],
        },
    );
    catalog.register_tenant("acme", "ACME Hack Days");
    catalog
}

fn context(settings: Settings, stub: &StubTransport, fetcher: StubFetcher) -> MailerContext {
    MailerContext::with_parts(settings, stub.connector(), catalog(), Arc::new(fetcher))
}

fn configured_settings() -> Settings {
    let mut settings = Settings::new_for_test();
    settings.smtp_host = Some("localhost".into());
    settings.smtp_from = Some("events@hackathon.example".into());
    settings
}

fn request(key: &str, variables: serde_json::Value) -> TemplateSendRequest {
    TemplateSendRequest {
        template_key: key.into(),
        to: "alice@example.com".into(),
        variables: Some(variables),
        tenant_id: None,
    }
}

#[test]
fn renders_every_templated_field() {
    let rendered = Templates::render(
        &certificate_template(),
        &json!({"event": "Spring Hack", "name": "Alice", "id": 42}),
    )
    .unwrap();

    assert_eq!(rendered.subject, "Your Spring Hack certificate");
    assert_eq!(rendered.body, "<p>Congratulations Alice!</p>");
    assert_eq!(rendered.attachments[0].file_name, "certificate-42.pdf");
    assert_eq!(
        rendered.attachments[0].url,
        "https://files.example.com/certificates/42.pdf"
    );
    assert_eq!(rendered.attachments[1].content_type.as_deref(), Some("image/png"));
}

#[test]
fn escapes_substitutions_in_html_bodies_only() {
    let data = json!({"event": "R&D <Night>", "name": "Tom & Jerry", "venue": "Hall <B>"});

    let html = Templates::render(&certificate_template(), &data).unwrap();
    assert!(html.is_html);
    assert_eq!(html.body, "<p>Congratulations Tom &amp; Jerry!</p>");
    assert_eq!(html.subject, "Your R&D <Night> certificate");

    let reminder = EmailTemplate {
        subject: "Reminder: {{event}}".into(),
        body: "Hi {{name}}, see you at {{venue}}.".into(),
        attachments: vec![],
    };
    let plain = json!({"name": "Tom & Jerry", "venue": "Hall 3 > 2"});
    let text = Templates::render(&reminder, &plain).unwrap();
    assert!(!text.is_html);
    assert_eq!(text.body, "Hi Tom & Jerry, see you at Hall 3 > 2.");
}

#[test]
fn markup_injected_into_a_plain_body_is_escaped() {
    let reminder = EmailTemplate {
        subject: "Reminder".into(),
        body: "Hi {{name}}, see you at {{venue}}.".into(),
        attachments: vec![],
    };

    let rendered = Templates::render(
        &reminder,
        &json!({"name": "<img src=x onerror=alert(1)>", "venue": "Hall"}),
    )
    .unwrap();

    assert!(rendered.is_html);
    assert_eq!(
        rendered.body,
        "Hi &lt;img src&#x3D;x onerror&#x3D;alert(1)&gt;, see you at Hall."
    );
}

#[tokio::test]
async fn injected_markup_is_never_delivered_raw() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub, StubFetcher::default());

    mailer
        .send_template(&request(
            "reminder",
            json!({"name": "<img src=x onerror=alert(1)>", "venue": "Hall"}),
        ))
        .await
        .unwrap();

    let delivered = stub.delivered();
    let html = delivered[0].html.as_deref().unwrap();
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img"));
    assert!(delivered[0].text.is_none());
}

#[test]
fn broken_template_is_a_render_error() {
    let template = EmailTemplate {
        subject: "{{#if}}".into(),
        body: "x".into(),
        attachments: vec![],
    };
    let error = Templates::render(&template, &json!({})).unwrap_err();
    assert_eq!(error.code(), ErrorCode::TemplateRenderFailed);
}

#[test]
fn catalog_loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "templates": {{
                "welcome": {{"subject": "Welcome {{{{name}}}}", "body": "Hello"}}
            }},
            "tenants": {{"t1": "Tenant One"}}
        }}"#
    )
    .unwrap();

    let catalog = TemplateCatalog::load(file.path()).unwrap();
    let welcome = catalog.get("welcome").unwrap();
    assert_eq!(welcome.subject, "Welcome {{name}}");
    assert!(welcome.attachments.is_empty());
    assert_eq!(catalog.tenant_name("t1"), Some("Tenant One"));
    assert_eq!(catalog.tenant_name("t2"), None);

    assert_eq!(
        catalog.get("missing").unwrap_err().code(),
        ErrorCode::ResourceNotFound
    );
    assert_eq!(
        TemplateCatalog::from_json("{not json").unwrap_err().code(),
        ErrorCode::InvalidParameter
    );
    assert_eq!(
        TemplateCatalog::load("/nonexistent/catalog.json")
            .unwrap_err()
            .code(),
        ErrorCode::MissingConfiguration
    );
}

#[tokio::test]
async fn failed_download_drops_only_that_attachment() {
    let stub = StubTransport::default();
    let fetcher = StubFetcher::default()
        .serving("https://files.example.com/certificates/7.pdf", b"%PDF-1.7")
        .failing("https://files.example.com/badges/7.png");
    let requested = fetcher.requested.clone();
    let mailer = context(configured_settings(), &stub, fetcher);

    let outcome = mailer
        .send_template(&request(
            "certificate",
            json!({"event": "Spring Hack", "name": "Alice", "id": 7}),
        ))
        .await
        .unwrap();

    match &outcome {
        SendOutcome::SentWithDroppedAttachments { dropped, .. } => {
            assert_eq!(dropped, &vec!["badge.png".to_string()]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let delivered = stub.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].attachments.len(), 1);
    assert_eq!(delivered[0].attachments[0].file_name, "certificate-7.pdf");
    assert_eq!(delivered[0].attachments[0].content_type, "application/pdf");
    assert_eq!(delivered[0].attachments[0].content, b"%PDF-1.7".to_vec());
    assert!(delivered[0].html.is_some());
    assert!(delivered[0].text.is_none());
    assert_eq!(requested.lock().unwrap().len(), 2);

    let result = DispatchResult::try_from(outcome).unwrap();
    assert!(result.actually_mailed);
    assert_eq!(result.dropped_attachments, vec!["badge.png".to_string()]);
}

#[tokio::test]
async fn plain_body_is_sent_as_text() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub, StubFetcher::default());

    let outcome = mailer
        .send_template(&request(
            "reminder",
            json!({"event": "Demo Day", "name": "Bob", "venue": "Hall A"}),
        ))
        .await
        .unwrap();

    assert!(matches!(outcome, SendOutcome::Sent { .. }));
    let delivered = stub.delivered();
    assert_eq!(delivered[0].subject, "Reminder: Demo Day");
    assert_eq!(delivered[0].text.as_deref(), Some("Hi Bob, see you at Hall A."));
    assert!(delivered[0].html.is_none());
}

#[tokio::test]
async fn tenant_name_becomes_the_sender_name() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub, StubFetcher::default());

    let mut scoped = request("reminder", json!({"name": "Bob"}));
    scoped.tenant_id = Some("acme".into());
    mailer.send_template(&scoped).await.unwrap();

    let mut unknown = request("reminder", json!({"name": "Bob"}));
    unknown.tenant_id = Some("globex".into());
    mailer.send_template(&unknown).await.unwrap();

    let delivered = stub.delivered();
    assert_eq!(delivered[0].from_name, "ACME Hack Days");
    assert_eq!(delivered[1].from_name, "Hackathon Platform");
}

#[tokio::test]
async fn unknown_template_key_is_not_found() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub, StubFetcher::default());

    let error = mailer
        .send_template(&request("missing", json!({})))
        .await
        .unwrap_err();

    assert_eq!(error.code(), ErrorCode::ResourceNotFound);
    assert_eq!(stub.attempt_count(), 0);
    assert!(mailer
        .dispatch_template(&request("missing", json!({})))
        .await
        .is_failed());
}

#[tokio::test]
async fn mocked_template_send_reports_dropped_attachments() {
    let stub = StubTransport::default();
    let fetcher = StubFetcher::default()
        .serving("https://files.example.com/certificates/1.pdf", b"%PDF-1.7")
        .failing("https://files.example.com/badges/1.png");
    let mailer = context(Settings::new_for_test(), &stub, fetcher);

    let outcome = mailer
        .send_template(&request("certificate", json!({"id": 1})))
        .await
        .unwrap();

    assert!(outcome.is_mocked());
    assert_eq!(stub.attempt_count(), 0);
    let result = DispatchResult::try_from(outcome).unwrap();
    assert!(result.mocked);
    assert_eq!(result.dropped_attachments, vec!["badge.png".to_string()]);
}

#[tokio::test]
async fn bulk_template_send_reports_per_recipient() {
    let stub = StubTransport::rejecting(["bounce@example.com".to_string()]);
    let mailer = context(configured_settings(), &stub, StubFetcher::default());

    let requests = ["a@example.com", "bounce@example.com", "c@example.com"]
        .into_iter()
        .map(|to| TemplateSendRequest {
            to: to.into(),
            ..request("reminder", json!({"name": "Team"}))
        })
        .collect();

    let report = mailer
        .send_template_bulk(
            requests,
            crate::modules::dispatch::bulk::BulkOptions {
                batch_size: Some(2),
                batch_delay: Some(std::time::Duration::ZERO),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].address, "bounce@example.com");
}

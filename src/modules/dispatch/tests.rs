// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use crate::modules::context::MailerContext;
use crate::modules::dispatch::bulk::BulkOptions;
use crate::modules::dispatch::message::OutboundMessage;
use crate::modules::dispatch::outcome::{DispatchResult, SendOutcome};
use crate::modules::dispatch::payload::{AttachmentPayload, SendEmailRequest};
use crate::modules::dispatch::stub::StubTransport;
use crate::modules::error::code::ErrorCode;
use crate::modules::settings::cli::Settings;
use crate::modules::smtp::template::entity::TemplateCatalog;
use crate::modules::smtp::template::fetch::stub::StubFetcher;

fn configured_settings() -> Settings {
    let mut settings = Settings::new_for_test();
    settings.smtp_host = Some("localhost".into());
    settings.smtp_port = 2525;
    settings.smtp_from = Some("events@hackathon.example".into());
    settings
}

fn context(settings: Settings, stub: &StubTransport) -> MailerContext {
    MailerContext::with_parts(
        settings,
        stub.connector(),
        TemplateCatalog::default(),
        Arc::new(StubFetcher::default()),
    )
}

fn message(to: &str) -> OutboundMessage {
    OutboundMessage::new(to, "Hackathon update").text("Doors open at 9am.")
}

#[tokio::test]
async fn sends_are_spaced_by_the_minimum_interval() {
    let mut settings = configured_settings();
    settings.mail_min_send_interval_ms = 80;
    let stub = StubTransport::default();
    let mailer = context(settings, &stub);

    for i in 0..3 {
        let outcome = mailer
            .send(message(&format!("p{}@example.com", i)))
            .await
            .unwrap();
        assert!(matches!(outcome, SendOutcome::Sent { .. }));
    }

    let attempts = stub.attempts.lock().unwrap().clone();
    assert_eq!(attempts.len(), 3);
    for pair in attempts.windows(2) {
        let gap = pair[1].0 - pair[0].0;
        assert!(gap >= Duration::from_millis(75), "gap was {:?}", gap);
    }
}

#[tokio::test(start_paused = true)]
async fn persistent_throttling_exhausts_three_attempts() {
    let stub = StubTransport::always_throttled();
    let mailer = context(configured_settings(), &stub);

    let error = mailer.send(message("a@example.com")).await.unwrap_err();

    assert_eq!(error.code(), ErrorCode::TooManyRequest);
    assert_eq!(stub.attempt_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn one_throttled_attempt_then_success() {
    let stub = StubTransport::throttled_for(1);
    let mailer = context(configured_settings(), &stub);

    let outcome = mailer.send(message("a@example.com")).await.unwrap();

    assert!(matches!(outcome, SendOutcome::Sent { .. }));
    assert_eq!(stub.attempt_count(), 2);
}

#[tokio::test]
async fn permanent_rejection_is_raised_after_one_attempt() {
    let stub = StubTransport::rejecting(["gone@example.com".to_string()]);
    let mailer = context(configured_settings(), &stub);

    let error = mailer.send(message("gone@example.com")).await.unwrap_err();

    assert_eq!(error.code(), ErrorCode::SmtpCommandFailed);
    assert_eq!(stub.attempt_count(), 1);
}

#[tokio::test]
async fn prepared_message_carries_sender_identity() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub);

    let mut outbound = message("a@example.com");
    outbound.from_name = Some("Spring Hack 2026".into());
    let outcome = mailer.send(outbound).await.unwrap();

    let delivered = stub.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].from_address, "events@hackathon.example");
    assert_eq!(delivered[0].from_name, "Spring Hack 2026");
    assert_eq!(Some(delivered[0].message_id.as_str()), outcome.message_id());

    mailer.send(message("b@example.com")).await.unwrap();
    assert_eq!(stub.delivered()[1].from_name, "Hackathon Platform");
}

#[tokio::test]
async fn invalid_messages_never_reach_the_transport() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub);

    let error = mailer
        .send(OutboundMessage::new("nope", "Subject").text("x"))
        .await
        .unwrap_err();

    assert_eq!(error.code(), ErrorCode::InvalidParameter);
    assert_eq!(stub.attempt_count(), 0);
}

#[tokio::test]
async fn unconfigured_send_is_mocked() {
    let stub = StubTransport::default();
    let mailer = context(Settings::new_for_test(), &stub);

    let outcome = mailer.send(message("a@example.com")).await.unwrap();
    let result = DispatchResult::try_from(outcome).unwrap();

    assert!(result.mocked);
    assert!(!result.actually_mailed);
    assert!(!result.message_id.is_empty());
    assert_eq!(stub.attempt_count(), 0);

    let status = mailer.status().await;
    assert!(!status.configured);
    assert!(!status.installed);
    assert_eq!(status.provider, None);
}

#[tokio::test]
async fn forced_send_without_transport_fails() {
    let mut settings = Settings::new_for_test();
    settings.email_force_send = true;
    let stub = StubTransport::default();
    let mailer = context(settings, &stub);

    let error = mailer.send(message("a@example.com")).await.unwrap_err();
    assert_eq!(error.code(), ErrorCode::MissingConfiguration);

    let outcome = mailer.dispatch(message("a@example.com")).await;
    assert!(outcome.is_failed());

    let bulk = mailer
        .send_bulk(vec![message("a@example.com")], BulkOptions::default())
        .await;
    assert_eq!(bulk.unwrap_err().code(), ErrorCode::MissingConfiguration);
}

#[tokio::test]
async fn bulk_counts_do_not_depend_on_batch_size() {
    let recipients: Vec<String> = (0..6).map(|i| format!("p{}@example.com", i)).collect();
    let failing = vec![recipients[1].clone(), recipients[4].clone()];

    for batch_size in [1, 3, 6] {
        let stub = StubTransport::rejecting(failing.clone());
        let mailer = context(configured_settings(), &stub);
        let messages = recipients.iter().map(|to| message(to)).collect();

        let report = mailer
            .send_bulk(
                messages,
                BulkOptions {
                    batch_size: Some(batch_size),
                    batch_delay: Some(Duration::ZERO),
                },
            )
            .await
            .unwrap();

        assert_eq!(report.total, 6, "batch size {}", batch_size);
        assert_eq!(report.sent, 4, "batch size {}", batch_size);
        assert_eq!(report.failed, 2, "batch size {}", batch_size);
        assert_eq!(report.errors.len(), 2, "batch size {}", batch_size);
        let mut failed: Vec<String> = report.errors.iter().map(|e| e.address.clone()).collect();
        failed.sort();
        assert_eq!(failed, failing);
        assert_eq!(stub.attempt_count(), 6);
    }
}

#[tokio::test(start_paused = true)]
async fn bulk_pauses_between_batches_only() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub);
    let messages = (0..5)
        .map(|i| message(&format!("p{}@example.com", i)))
        .collect();

    let started = tokio::time::Instant::now();
    let report = mailer
        .send_bulk(
            messages,
            BulkOptions {
                batch_size: Some(2),
                batch_delay: Some(Duration::from_millis(3000)),
            },
        )
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.sent, 5);
    // three batches, two pauses
    assert!(elapsed >= Duration::from_millis(6000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(9000), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn bulk_reports_invalid_messages_as_failures() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub);
    let messages = vec![
        message("ok@example.com"),
        OutboundMessage::new("broken", "Subject").text("x"),
    ];

    let report = mailer
        .send_bulk(
            messages,
            BulkOptions {
                batch_size: Some(0),
                batch_delay: Some(Duration::ZERO),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].address, "broken");
}

#[tokio::test]
async fn bulk_without_transport_counts_mocked_sends() {
    let stub = StubTransport::default();
    let mailer = context(Settings::new_for_test(), &stub);
    let messages = vec![message("a@example.com"), message("b@example.com")];

    let report = mailer
        .send_bulk(messages, BulkOptions::default())
        .await
        .unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(report.mocked, 2);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn bulk_requests_fail_individually_on_bad_attachments() {
    let stub = StubTransport::default();
    let mailer = context(configured_settings(), &stub);
    let request = |to: &str| SendEmailRequest {
        to: vec![to.to_string()],
        subject: "Badge".into(),
        text: Some("Your badge is attached.".into()),
        ..Default::default()
    };
    let mut broken = request("broken@example.com");
    broken.attachments = Some(vec![AttachmentPayload {
        file_name: "badge.png".into(),
        content_type: None,
        base64_content: "not base64!".into(),
    }]);

    let report = mailer
        .send_bulk_requests(
            vec![request("ok@example.com"), broken],
            BulkOptions {
                batch_size: Some(2),
                batch_delay: Some(Duration::ZERO),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors[0].address, "broken@example.com");
    assert_eq!(stub.attempt_count(), 1);
    assert_eq!(stub.delivered()[0].to, vec!["ok@example.com".to_string()]);
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use api::create_openapi_service;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Compression};
use poem::{Endpoint, EndpointExt, Route, Server};
use tracing::info;

use super::error::ApiErrorResponse;
use crate::modules::context::MailerContext;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::MailerResult;
use crate::modules::utils::shutdown::shutdown_signal;
use crate::raise_error;

pub mod api;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    HackMailer delivers the transactional and bulk email of the hackathon platform.

    - Sends plain and templated messages over SMTP or Gmail, with pacing and retry of provider throttling.
    - Falls back to logging mocked sends when no provider is configured.
"#;

pub fn build_route(context: Arc<MailerContext>) -> impl Endpoint {
    let api_service = create_openapi_service().description(DESCRIPTION);
    let swagger = api_service.swagger_ui();
    let redoc = api_service.redoc();
    let spec_json = api_service.spec_endpoint();

    Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/redoc", redoc)
        .nest("/api-docs/spec.json", spec_json)
        .nest_no_strip("/api/v1", api_service)
        .with(Compression::new())
        .with(CatchPanic::new())
        .data(context)
        .catch_all_error(error_handler)
}

pub async fn start_http_server(context: Arc<MailerContext>) -> MailerResult<()> {
    let settings = context.settings();
    let listener = TcpListener::bind((
        settings.mailer_http_bind.clone(),
        settings.mailer_http_port,
    ));
    let port = settings.mailer_http_port;

    let server = Server::new(listener)
        .name("HackMailer API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            build_route(context.clone()),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    info!("HackMailer API Service is now running on port {}.", port);
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}

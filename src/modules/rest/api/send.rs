// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use poem::web::Data;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

use crate::modules::context::MailerContext;
use crate::modules::dispatch::bulk::BulkReport;
use crate::modules::dispatch::message::OutboundMessage;
use crate::modules::dispatch::outcome::DispatchResult;
use crate::modules::dispatch::payload::{BulkSendRequest, SendEmailRequest, TemplateBulkSendRequest};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::smtp::template::send::TemplateSendRequest;

pub struct SendMailApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::SendMail")]
impl SendMailApi {
    /// Sends a single email.
    ///
    /// When no mail provider is configured the send is only logged and the
    /// result is flagged `mocked`.
    #[oai(path = "/send", method = "post", operation_id = "send_mail")]
    async fn send_mail(
        &self,
        /// A JSON payload containing the email to send
        request: Json<SendEmailRequest>,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<DispatchResult>> {
        let message = OutboundMessage::try_from(request.0)?;
        let outcome = context.send(message).await?;
        Ok(Json(DispatchResult::try_from(outcome)?))
    }

    /// Renders a catalog template and sends it to one recipient.
    ///
    /// Attachments that cannot be downloaded are skipped and listed in
    /// `dropped_attachments`.
    #[oai(
        path = "/send-template",
        method = "post",
        operation_id = "send_template"
    )]
    async fn send_template(
        &self,
        request: Json<TemplateSendRequest>,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<DispatchResult>> {
        let outcome = context.send_template(&request.0).await?;
        Ok(Json(DispatchResult::try_from(outcome)?))
    }

    /// Sends many emails in batches. Failures of individual messages are
    /// reported in the result instead of failing the request.
    #[oai(path = "/send-bulk", method = "post", operation_id = "send_bulk")]
    async fn send_bulk(
        &self,
        request: Json<BulkSendRequest>,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<BulkReport>> {
        let options = request.0.options();
        Ok(Json(
            context
                .send_bulk_requests(request.0.messages, options)
                .await?,
        ))
    }

    /// Sends one templated email per entry, in batches.
    #[oai(
        path = "/send-template-bulk",
        method = "post",
        operation_id = "send_template_bulk"
    )]
    async fn send_template_bulk(
        &self,
        request: Json<TemplateBulkSendRequest>,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<BulkReport>> {
        let options = request.0.options();
        Ok(Json(
            context
                .send_template_bulk(request.0.requests, options)
                .await?,
        ))
    }
}

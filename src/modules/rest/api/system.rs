// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use poem::web::Data;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

use crate::modules::context::status::TransportStatus;
use crate::modules::context::MailerContext;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;

pub struct SystemApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::System")]
impl SystemApi {
    /// Reports whether a mail transport is installed and configured, and which provider it uses.
    #[oai(method = "get", path = "/status", operation_id = "get_status")]
    async fn get_status(
        &self,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<TransportStatus>> {
        Ok(Json(context.status().await))
    }

    /// Drops the cached transport so the next send connects again.
    #[oai(
        method = "post",
        path = "/transport/reset",
        operation_id = "reset_transport"
    )]
    async fn reset_transport(
        &self,
        context: Data<&Arc<MailerContext>>,
    ) -> ApiResult<Json<TransportStatus>> {
        context.reset_transport().await;
        Ok(Json(context.status().await))
    }
}

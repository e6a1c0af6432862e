// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::{OpenApiService, Tags};
use send::SendMailApi;
use system::SystemApi;

use crate::hackmailer_version;

pub mod send;
pub mod system;

#[derive(Tags)]
pub enum ApiTags {
    SendMail,
    System,
}

type HackMailerOpenApi = (SendMailApi, SystemApi);

pub fn create_openapi_service() -> OpenApiService<HackMailerOpenApi, ()> {
    OpenApiService::new((SendMailApi, SystemApi), "HackMailerApi", hackmailer_version!())
}

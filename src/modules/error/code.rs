// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10020,
    MethodNotAllowed = 10090,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    TooManyRequest = 30020,

    // Mail service errors (50000–50999)
    SmtpCommandFailed = 50030,
    SmtpConnectionFailed = 50040,
    SmtpAuthenticationFailed = 50090,
    TemplateRenderFailed = 50100,
    AttachmentFetchFailed = 50110,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter | ErrorCode::TemplateRenderFailed => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::MissingConfiguration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::TooManyRequest => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::SmtpCommandFailed
            | ErrorCode::SmtpConnectionFailed
            | ErrorCode::SmtpAuthenticationFailed
            | ErrorCode::AttachmentFetchFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError | ErrorCode::UnhandledPoemError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

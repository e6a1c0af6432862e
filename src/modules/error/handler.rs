// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::{code::ErrorCode, ApiError, ApiErrorResponse, MailerError};
use poem::IntoResponse;
use poem_openapi::payload::Json;

/// Maps framework errors (routing, request parsing) onto the mailer error codes.
fn classify(error: &poem::Error) -> Option<ErrorCode> {
    if error.is::<poem::error::NotFoundError>() {
        return Some(ErrorCode::ResourceNotFound);
    }
    if error.is::<poem::error::MethodNotAllowedError>() {
        return Some(ErrorCode::MethodNotAllowed);
    }
    let malformed_request = error.is::<poem::error::ParseJsonError>()
        || error.is::<poem::error::ParsePathError>()
        || error.is::<poem::error::ParseQueryError>()
        || error.is::<poem_openapi::error::ParseRequestPayloadError>()
        || error.is::<poem_openapi::error::ContentTypeError>()
        || error.is::<poem_openapi::error::ParseParamError>();
    malformed_request.then_some(ErrorCode::InvalidParameter)
}

fn api_error_response(error: &poem::Error, code: ErrorCode) -> poem::Response {
    let api_error = ApiError::new_with_error_code(error.to_string(), code as u32);
    let mut response = ApiErrorResponse::Generic(code.status(), Json(api_error)).into_response();
    response.set_status(error.status());
    response
}

pub async fn error_handler(error: poem::Error) -> impl poem::IntoResponse {
    if error.is::<MailerError>() {
        return error.into_response();
    }
    match classify(&error) {
        Some(code) => api_error_response(&error, code),
        None if error.has_source() => api_error_response(&error, ErrorCode::UnhandledPoemError),
        None => error.into_response(),
    }
}

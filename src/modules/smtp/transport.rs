// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use futures::future::BoxFuture;
use mail_send::mail_builder::MessageBuilder;

use crate::modules::dispatch::message::PreparedMessage;
use crate::modules::error::{code::ErrorCode, MailerError};
use crate::modules::smtp::executor::SmtpExecutor;
use crate::modules::smtp::manager::SmtpEndpoint;
use crate::raise_error;

/// A handle able to submit prepared messages to a mail provider.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        message: &'a PreparedMessage,
    ) -> BoxFuture<'a, Result<(), TransportError>>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransportErrorKind {
    /// Provider-side throttling; expected to clear after a short wait.
    RateLimited,
    Authentication,
    /// Permanent rejection (bad recipient, policy, malformed message).
    Rejected,
    Connection,
    Other,
}

impl TransportErrorKind {
    pub fn from_reply_code(code: u16) -> Self {
        match code {
            421 | 450 | 451 | 452 => TransportErrorKind::RateLimited,
            530 | 534 | 535 => TransportErrorKind::Authentication,
            500..=599 => TransportErrorKind::Rejected,
            _ => TransportErrorKind::Other,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, TransportErrorKind::RateLimited)
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            TransportErrorKind::RateLimited => ErrorCode::TooManyRequest,
            TransportErrorKind::Authentication => ErrorCode::SmtpAuthenticationFailed,
            TransportErrorKind::Connection => ErrorCode::SmtpConnectionFailed,
            TransportErrorKind::Rejected | TransportErrorKind::Other => {
                ErrorCode::SmtpCommandFailed
            }
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::RateLimited => write!(f, "rate limited"),
            TransportErrorKind::Authentication => write!(f, "authentication failed"),
            TransportErrorKind::Rejected => write!(f, "rejected"),
            TransportErrorKind::Connection => write!(f, "connection failed"),
            TransportErrorKind::Other => write!(f, "transport error"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<mail_send::Error> for TransportError {
    fn from(error: mail_send::Error) -> Self {
        let kind = match &error {
            mail_send::Error::UnexpectedReply(reply) => {
                TransportErrorKind::from_reply_code(reply.code())
            }
            mail_send::Error::AuthenticationFailed(_)
            | mail_send::Error::MissingCredentials
            | mail_send::Error::UnsupportedAuthMechanism => TransportErrorKind::Authentication,
            mail_send::Error::Io(_)
            | mail_send::Error::Tls(_)
            | mail_send::Error::Timeout
            | mail_send::Error::MissingStartTls => TransportErrorKind::Connection,
            _ => TransportErrorKind::Other,
        };
        TransportError::new(kind, error.to_string())
    }
}

impl From<TransportError> for MailerError {
    fn from(error: TransportError) -> Self {
        raise_error!(error.to_string(), error.kind.error_code())
    }
}

/// Submits messages through a pooled mail-send SMTP session.
pub struct SmtpTransport {
    executor: SmtpExecutor,
}

impl SmtpTransport {
    pub fn new(endpoint: SmtpEndpoint, pool_size: u32) -> Self {
        Self {
            executor: SmtpExecutor::new(endpoint, pool_size),
        }
    }

    fn build_message(message: &PreparedMessage) -> MessageBuilder<'_> {
        let mut builder = MessageBuilder::new()
            .message_id(message.message_id.as_str())
            .from((message.from_name.as_str(), message.from_address.as_str()))
            .to(message
                .to
                .iter()
                .map(|address| address.as_str())
                .collect::<Vec<_>>())
            .subject(message.subject.as_str());

        if let Some(text) = &message.text {
            builder = builder.text_body(text.as_str());
        }
        if let Some(html) = &message.html {
            builder = builder.html_body(html.as_str());
        }
        for attachment in &message.attachments {
            builder = builder.attachment(
                attachment.content_type.as_str(),
                attachment.file_name.as_str(),
                attachment.content.as_slice(),
            );
        }
        builder
    }
}

impl Transport for SmtpTransport {
    fn send<'a>(
        &'a self,
        message: &'a PreparedMessage,
    ) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async move {
            let builder = Self::build_message(message);
            self.executor.send_email(builder).await
        })
    }
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::dispatch::bulk::BulkOptions;
use crate::modules::dispatch::message::{MailAttachment, OutboundMessage};
use crate::modules::error::{code::ErrorCode, MailerError, MailerResult};
use crate::modules::smtp::template::send::TemplateSendRequest;
use crate::{base64_decode_safe, raise_error};

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct SendEmailRequest {
    /// Recipient email addresses. At least one is required.
    pub to: Vec<String>,
    /// The subject line of the email.
    pub subject: String,
    /// Plain text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Sender display name. Defaults to the configured `MAIL_FROM_NAME`.
    pub from_name: Option<String>,
    /// Files attached to the email.
    pub attachments: Option<Vec<AttachmentPayload>>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct AttachmentPayload {
    pub file_name: String,
    /// MIME type. Guessed from the file name when absent.
    pub content_type: Option<String>,
    /// File content, base64 encoded.
    pub base64_content: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct BulkSendRequest {
    pub messages: Vec<SendEmailRequest>,
    /// Messages sent concurrently per batch. Defaults to `MAIL_BULK_BATCH_SIZE`.
    pub batch_size: Option<u32>,
    /// Pause between batches in milliseconds. Defaults to `MAIL_BULK_BATCH_DELAY_MS`.
    pub batch_delay_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct TemplateBulkSendRequest {
    /// One templated message per entry.
    pub requests: Vec<TemplateSendRequest>,
    pub batch_size: Option<u32>,
    pub batch_delay_ms: Option<u64>,
}

fn bulk_options(batch_size: Option<u32>, batch_delay_ms: Option<u64>) -> BulkOptions {
    BulkOptions {
        batch_size: batch_size.map(|size| size as usize),
        batch_delay: batch_delay_ms.map(Duration::from_millis),
    }
}

impl BulkSendRequest {
    pub fn options(&self) -> BulkOptions {
        bulk_options(self.batch_size, self.batch_delay_ms)
    }
}

impl TemplateBulkSendRequest {
    pub fn options(&self) -> BulkOptions {
        bulk_options(self.batch_size, self.batch_delay_ms)
    }
}

impl TryFrom<AttachmentPayload> for MailAttachment {
    type Error = MailerError;

    fn try_from(payload: AttachmentPayload) -> MailerResult<Self> {
        let content = base64_decode_safe!(&payload.base64_content).map_err(|e| {
            raise_error!(
                format!(
                    "Failed to decode base64_content of '{}': {}",
                    payload.file_name, e
                ),
                ErrorCode::InvalidParameter
            )
        })?;
        let content_type = payload.content_type.unwrap_or_else(|| {
            mime_guess::from_path(&payload.file_name)
                .first_or_octet_stream()
                .to_string()
        });
        Ok(MailAttachment {
            file_name: payload.file_name,
            content_type,
            content,
        })
    }
}

impl TryFrom<SendEmailRequest> for OutboundMessage {
    type Error = MailerError;

    fn try_from(request: SendEmailRequest) -> MailerResult<Self> {
        let attachments = request
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(MailAttachment::try_from)
            .collect::<MailerResult<Vec<_>>>()?;
        Ok(OutboundMessage {
            to: request.to,
            subject: request.subject,
            text: request.text,
            html: request.html,
            attachments,
            from_name: request.from_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AttachmentPayload, BulkSendRequest, SendEmailRequest};
    use crate::modules::dispatch::message::OutboundMessage;
    use crate::modules::error::code::ErrorCode;
    use std::time::Duration;

    fn request(attachment: AttachmentPayload) -> SendEmailRequest {
        SendEmailRequest {
            to: vec!["a@example.com".into()],
            subject: "Schedule".into(),
            text: Some("See attached".into()),
            attachments: Some(vec![attachment]),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_base64_attachments() {
        let message = OutboundMessage::try_from(request(AttachmentPayload {
            file_name: "schedule.txt".into(),
            content_type: None,
            base64_content: "aGVsbG8=".into(),
        }))
        .unwrap();

        assert_eq!(message.attachments[0].content, b"hello".to_vec());
        assert_eq!(message.attachments[0].content_type, "text/plain");
    }

    #[test]
    fn rejects_malformed_base64() {
        let error = OutboundMessage::try_from(request(AttachmentPayload {
            file_name: "schedule.pdf".into(),
            content_type: Some("application/pdf".into()),
            base64_content: "not base64!".into(),
        }))
        .unwrap_err();

        assert_eq!(error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn bulk_options_fall_back_to_settings() {
        let request = BulkSendRequest {
            messages: vec![],
            batch_size: Some(10),
            batch_delay_ms: None,
        };
        let options = request.options();
        assert_eq!(options.batch_size, Some(10));
        assert_eq!(options.batch_delay, None);

        let request = BulkSendRequest {
            batch_delay_ms: Some(250),
            ..request
        };
        assert_eq!(request.options().batch_delay, Some(Duration::from_millis(250)));
    }
}

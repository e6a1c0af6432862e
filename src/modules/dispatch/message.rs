// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::error::{code::ErrorCode, MailerResult},
    raise_error, validate_email,
};

/// A message handed to the dispatcher by a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    /// One or more recipient addresses.
    pub to: Vec<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<MailAttachment>,
    /// Overrides the configured sender display name.
    pub from_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn attachment(mut self, attachment: MailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Comma separated recipient list, used to label log lines and bulk failures.
    pub fn recipients(&self) -> String {
        self.to.join(", ")
    }

    pub fn validate(&self) -> MailerResult<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.to.is_empty() {
            errors.push("At least one recipient is required".into());
        }
        for address in &self.to {
            if validate_email!(address).is_err() {
                errors.push(format!("Invalid 'to' email address: {}", address));
            }
        }
        if self.subject.trim().is_empty() {
            errors.push("Subject must not be empty".into());
        }
        if self.text.is_none() && self.html.is_none() {
            errors.push("Either a text or an html body is required".into());
        }
        for attachment in &self.attachments {
            if attachment.file_name.trim().is_empty() {
                errors.push("Attachment file name must not be empty".into());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(raise_error!(errors.join("; "), ErrorCode::InvalidParameter))
        }
    }
}

/// An outbound message bound to its sender identity and Message-ID,
/// ready to be handed to a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedMessage {
    pub message_id: String,
    pub from_name: String,
    pub from_address: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<MailAttachment>,
}

#[cfg(test)]
mod tests {
    use super::{MailAttachment, OutboundMessage};
    use crate::modules::error::code::ErrorCode;

    #[test]
    fn valid_message_passes() {
        let message = OutboundMessage::new("team@example.com", "Registration confirmed")
            .text("See you at the kickoff.");
        assert!(message.validate().is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let message = OutboundMessage {
            to: vec!["not-an-address".into()],
            subject: "  ".into(),
            attachments: vec![MailAttachment {
                file_name: "".into(),
                content_type: "application/pdf".into(),
                content: vec![1, 2, 3],
            }],
            ..Default::default()
        };
        let error = message.validate().unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
        let text = error.to_string();
        assert!(text.contains("not-an-address"));
        assert!(text.contains("Subject"));
        assert!(text.contains("body"));
        assert!(text.contains("file name"));
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let message = OutboundMessage {
            subject: "Hi".into(),
            html: Some("<p>Hi</p>".into()),
            ..Default::default()
        };
        assert!(message.validate().is_err());
    }

    #[test]
    fn recipients_label() {
        let mut message = OutboundMessage::new("a@example.com", "s");
        message.to.push("b@example.com".into());
        assert_eq!(message.recipients(), "a@example.com, b@example.com");
    }
}

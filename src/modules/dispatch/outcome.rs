// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::error::MailerError;

/// What happened to a single message.
#[derive(Debug)]
pub enum SendOutcome {
    Sent {
        message_id: String,
    },
    /// No transport is configured; nothing left the process.
    SentMocked {
        message_id: String,
        dropped: Vec<String>,
    },
    /// Delivered, but some declared attachments could not be downloaded.
    SentWithDroppedAttachments {
        message_id: String,
        dropped: Vec<String>,
    },
    Failed {
        error: MailerError,
    },
}

impl SendOutcome {
    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendOutcome::Sent { message_id }
            | SendOutcome::SentMocked { message_id, .. }
            | SendOutcome::SentWithDroppedAttachments { message_id, .. } => Some(message_id),
            SendOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SendOutcome::Failed { .. })
    }

    pub fn is_mocked(&self) -> bool {
        matches!(self, SendOutcome::SentMocked { .. })
    }

    /// Records attachments dropped while composing the message.
    pub fn with_dropped(self, dropped: Vec<String>) -> Self {
        if dropped.is_empty() {
            return self;
        }
        match self {
            SendOutcome::Sent { message_id } => {
                SendOutcome::SentWithDroppedAttachments { message_id, dropped }
            }
            SendOutcome::SentWithDroppedAttachments {
                message_id,
                dropped: mut already,
            } => {
                already.extend(dropped);
                SendOutcome::SentWithDroppedAttachments {
                    message_id,
                    dropped: already,
                }
            }
            SendOutcome::SentMocked {
                message_id,
                dropped: mut already,
            } => {
                already.extend(dropped);
                SendOutcome::SentMocked {
                    message_id,
                    dropped: already,
                }
            }
            failed @ SendOutcome::Failed { .. } => failed,
        }
    }
}

/// Result descriptor returned to callers of the send operations.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct DispatchResult {
    /// The Message-ID assigned to the email.
    pub message_id: String,
    /// True when no transport was configured and the send was simulated.
    pub mocked: bool,
    /// True when the message was handed to the mail provider.
    pub actually_mailed: bool,
    /// File names of template attachments that could not be downloaded.
    pub dropped_attachments: Vec<String>,
}

impl TryFrom<SendOutcome> for DispatchResult {
    type Error = MailerError;

    fn try_from(outcome: SendOutcome) -> Result<Self, Self::Error> {
        match outcome {
            SendOutcome::Sent { message_id } => Ok(DispatchResult {
                message_id,
                mocked: false,
                actually_mailed: true,
                dropped_attachments: Vec::new(),
            }),
            SendOutcome::SentMocked {
                message_id,
                dropped,
            } => Ok(DispatchResult {
                message_id,
                mocked: true,
                actually_mailed: false,
                dropped_attachments: dropped,
            }),
            SendOutcome::SentWithDroppedAttachments {
                message_id,
                dropped,
            } => Ok(DispatchResult {
                message_id,
                mocked: false,
                actually_mailed: true,
                dropped_attachments: dropped,
            }),
            SendOutcome::Failed { error } => Err(error),
        }
    }
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{error, info};

use crate::modules::context::MailerContext;
use crate::modules::dispatch::message::{OutboundMessage, PreparedMessage};
use crate::modules::dispatch::outcome::SendOutcome;
use crate::modules::error::{MailerError, MailerResult};
use crate::modules::smtp::util::generate_message_id;

pub mod bulk;
pub mod message;
pub mod outcome;
pub mod payload;
pub mod retry;
pub mod throttle;
#[cfg(test)]
mod tests;

impl MailerContext {
    /// Sends one message. Fails when the message is invalid, when force-send
    /// is on without a transport, or when the provider refuses it after retries.
    pub async fn send(&self, message: OutboundMessage) -> MailerResult<SendOutcome> {
        message.validate()?;

        let from_name = message
            .from_name
            .clone()
            .unwrap_or_else(|| self.settings.mail_from_name.clone());
        let message_id = generate_message_id();

        let Some(resolved) = self.resolver.resolve(&self.settings).await? else {
            info!(
                "[mock] Email not sent (no transport configured): to={} subject={:?} message_id={}",
                message.recipients(),
                message.subject,
                message_id
            );
            return Ok(SendOutcome::SentMocked {
                message_id,
                dropped: Vec::new(),
            });
        };

        let prepared = PreparedMessage {
            message_id,
            from_name,
            from_address: self
                .settings
                .smtp_from
                .clone()
                .unwrap_or_else(|| resolved.from_address.clone()),
            to: message.to,
            subject: message.subject,
            text: message.text,
            html: message.html,
            attachments: message.attachments,
        };

        let throttle = &self.throttle;
        let transport = resolved.transport.as_ref();
        let outgoing = &prepared;
        let result = self
            .retry
            .run(move |_| async move {
                throttle.wait().await;
                transport.send(outgoing).await
            })
            .await;

        match result {
            Ok(()) => {
                info!(
                    "Email sent via {}: to={} subject={:?} message_id={}",
                    resolved.provider.as_str(),
                    prepared.to.join(", "),
                    prepared.subject,
                    prepared.message_id
                );
                Ok(SendOutcome::Sent {
                    message_id: prepared.message_id,
                })
            }
            Err(e) => {
                error!(
                    "Failed to send email to {}: {}",
                    prepared.to.join(", "),
                    e
                );
                Err(MailerError::from(e))
            }
        }
    }

    /// Like [`MailerContext::send`], but reports failures as an outcome instead of an error.
    pub async fn dispatch(&self, message: OutboundMessage) -> SendOutcome {
        match self.send(message).await {
            Ok(outcome) => outcome,
            Err(error) => SendOutcome::Failed { error },
        }
    }
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use futures::future::join_all;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::modules::context::MailerContext;
use crate::modules::dispatch::message::{MailAttachment, OutboundMessage};
use crate::modules::dispatch::outcome::SendOutcome;
use crate::modules::error::MailerResult;
use crate::modules::smtp::template::render::Templates;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct TemplateSendRequest {
    /// Key of the template in the catalog.
    pub template_key: String,
    /// Recipient email address.
    pub to: String,
    /// Values substituted into the template.
    pub variables: Option<Value>,
    /// Tenant the message is sent on behalf of. Its display name becomes the sender name.
    pub tenant_id: Option<String>,
}

impl MailerContext {
    /// Renders the template and downloads its attachments. Attachments that
    /// fail to download are left out and their file names returned.
    pub async fn compose_template(
        &self,
        request: &TemplateSendRequest,
    ) -> MailerResult<(OutboundMessage, Vec<String>)> {
        let template = self.catalog.get(&request.template_key)?;
        let variables = request
            .variables
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()));
        let rendered = Templates::render(template, &variables)?;

        let mut message = OutboundMessage::new(request.to.clone(), rendered.subject);
        message = if rendered.is_html {
            message.html(rendered.body)
        } else {
            message.text(rendered.body)
        };
        message.from_name = request
            .tenant_id
            .as_deref()
            .and_then(|id| self.catalog.tenant_name(id))
            .map(str::to_string);

        let downloads = join_all(
            rendered
                .attachments
                .iter()
                .map(|attachment| self.fetcher.fetch(&attachment.url)),
        )
        .await;

        let mut dropped = Vec::new();
        for (attachment, download) in rendered.attachments.into_iter().zip(downloads) {
            match download {
                Ok(content) => {
                    let content_type = attachment.content_type.unwrap_or_else(|| {
                        mime_guess::from_path(&attachment.file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                    message = message.attachment(MailAttachment {
                        file_name: attachment.file_name,
                        content_type,
                        content,
                    });
                }
                Err(e) => {
                    warn!(
                        "Dropping attachment '{}' of template '{}' for {}: {}",
                        attachment.file_name, request.template_key, request.to, e
                    );
                    dropped.push(attachment.file_name);
                }
            }
        }

        Ok((message, dropped))
    }

    pub async fn send_template(&self, request: &TemplateSendRequest) -> MailerResult<SendOutcome> {
        let (message, dropped) = self.compose_template(request).await?;
        Ok(self.send(message).await?.with_dropped(dropped))
    }

    pub async fn dispatch_template(&self, request: &TemplateSendRequest) -> SendOutcome {
        match self.send_template(request).await {
            Ok(outcome) => outcome,
            Err(error) => SendOutcome::Failed { error },
        }
    }
}

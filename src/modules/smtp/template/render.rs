// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use handlebars::{no_escape, Handlebars};
use serde_json::Value;

use crate::modules::error::{code::ErrorCode, MailerResult};
use crate::modules::smtp::template::entity::{EmailTemplate, TemplateAttachment};
use crate::modules::utils::looks_like_html;
use crate::raise_error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
    /// Whether the body goes out as the HTML part.
    pub is_html: bool,
    pub attachments: Vec<TemplateAttachment>,
}

pub struct Templates;

impl Templates {
    pub fn render(template: &EmailTemplate, data: &Value) -> MailerResult<RenderedTemplate> {
        let mut raw = Handlebars::new();
        raw.register_escape_fn(no_escape);

        let render = |name: &str, content: &str| render_string(&raw, name, content, data);

        let subject = render("subject", &template.subject)?;
        // a body that is or becomes markup is rendered again with escaped substitutions
        let mut body = render("body", &template.body)?;
        let is_html = looks_like_html(&template.body) || looks_like_html(&body);
        if is_html {
            body = render_string(&Handlebars::new(), "body", &template.body, data)?;
        }
        let attachments = template
            .attachments
            .iter()
            .map(|attachment| {
                Ok(TemplateAttachment {
                    file_name: render("file_name", &attachment.file_name)?,
                    url: render("url", &attachment.url)?,
                    content_type: attachment.content_type.clone(),
                })
            })
            .collect::<MailerResult<Vec<_>>>()?;

        Ok(RenderedTemplate {
            subject,
            body,
            is_html,
            attachments,
        })
    }
}

fn render_string(
    registry: &Handlebars<'_>,
    name: &str,
    content: &str,
    data: &Value,
) -> MailerResult<String> {
    registry.render_template(content, data).map_err(|e| {
        raise_error!(
            format!("Handlebars '{name}' render error: {e}"),
            ErrorCode::TemplateRenderFailed
        )
    })
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::path::Path;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::error::{code::ErrorCode, MailerResult};
use crate::raise_error;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct EmailTemplate {
    /// Subject line, a handlebars template.
    pub subject: String,
    /// Message body, a handlebars template. Sent as HTML when it renders to markup.
    pub body: String,
    /// Files downloaded and attached at send time.
    #[serde(default)]
    #[oai(default)]
    pub attachments: Vec<TemplateAttachment>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
pub struct TemplateAttachment {
    /// Attachment file name, a handlebars template.
    pub file_name: String,
    /// Download URL, a handlebars template.
    pub url: String,
    /// MIME type. Guessed from the file name when absent.
    pub content_type: Option<String>,
}

/// Email templates by key, plus the display names of tenants that send under
/// their own name.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    pub templates: HashMap<String, EmailTemplate>,
    #[serde(default)]
    pub tenants: HashMap<String, String>,
}

impl TemplateCatalog {
    pub fn load(path: impl AsRef<Path>) -> MailerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            raise_error!(
                format!("Failed to read template catalog {}: {}", path.display(), e),
                ErrorCode::MissingConfiguration
            )
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> MailerResult<Self> {
        serde_json::from_str(content).map_err(|e| {
            raise_error!(
                format!("Invalid template catalog: {}", e),
                ErrorCode::InvalidParameter
            )
        })
    }

    pub fn get(&self, key: &str) -> MailerResult<&EmailTemplate> {
        self.templates.get(key).ok_or_else(|| {
            raise_error!(
                format!("Email template '{}' not found", key),
                ErrorCode::ResourceNotFound
            )
        })
    }

    pub fn register(&mut self, key: impl Into<String>, template: EmailTemplate) {
        self.templates.insert(key.into(), template);
    }

    pub fn register_tenant(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.tenants.insert(id.into(), name.into());
    }

    pub fn tenant_name(&self, id: &str) -> Option<&str> {
        self.tenants.get(id).map(String::as_str)
    }
}

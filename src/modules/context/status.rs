// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
#[oai(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Explicit SMTP host and credentials.
    Smtp,
    /// Gmail service shortcut.
    Gmail,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Smtp => "smtp",
            ProviderKind::Gmail => "gmail",
        }
    }
}

/// Describes the transport the process resolved.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct TransportStatus {
    /// A transport handle was constructed and is ready for use.
    pub installed: bool,
    /// A provider was selected from the configuration.
    pub configured: bool,
    /// The selected provider, if any.
    pub provider: Option<ProviderKind>,
}

impl TransportStatus {
    pub fn unconfigured() -> Self {
        Self::default()
    }
}

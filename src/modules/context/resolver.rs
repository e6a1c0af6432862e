// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::modules::context::status::{ProviderKind, TransportStatus};
use crate::modules::error::{code::ErrorCode, MailerResult};
use crate::modules::settings::cli::{Encryption, Settings};
use crate::modules::smtp::manager::SmtpEndpoint;
use crate::modules::smtp::transport::{SmtpTransport, Transport};
use crate::raise_error;

const GMAIL_HOST: &str = "smtp.gmail.com";
const GMAIL_PORT: u16 = 465;

/// Builds a transport handle for a selected provider.
pub type Connector =
    Arc<dyn Fn(&ProviderConfig) -> MailerResult<Arc<dyn Transport>> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: SmtpEndpoint,
    pub from_address: String,
}

impl ProviderConfig {
    /// Explicit SMTP wins over the Gmail shortcut; neither means unconfigured.
    pub fn select(settings: &Settings) -> Option<ProviderConfig> {
        if let Some(host) = settings.smtp_host.as_ref().filter(|h| !h.trim().is_empty()) {
            let endpoint = SmtpEndpoint {
                host: host.trim().to_string(),
                port: settings.smtp_port,
                encryption: settings
                    .smtp_encryption
                    .unwrap_or_else(|| Encryption::for_port(settings.smtp_port)),
                username: settings.smtp_user.clone(),
                password: settings.smtp_pass.clone(),
                timeout: settings.smtp_timeout(),
            };
            let from_address = settings
                .smtp_from
                .clone()
                .or_else(|| settings.smtp_user.clone())
                .unwrap_or_else(|| format!("noreply@{}", endpoint.host));
            return Some(ProviderConfig {
                kind: ProviderKind::Smtp,
                endpoint,
                from_address,
            });
        }

        if let (Some(user), Some(pass)) = (&settings.gmail_user, &settings.gmail_pass) {
            let endpoint = SmtpEndpoint {
                host: GMAIL_HOST.into(),
                port: GMAIL_PORT,
                encryption: Encryption::Ssl,
                username: Some(user.clone()),
                password: Some(pass.clone()),
                timeout: settings.smtp_timeout(),
            };
            return Some(ProviderConfig {
                kind: ProviderKind::Gmail,
                endpoint,
                from_address: settings.smtp_from.clone().unwrap_or_else(|| user.clone()),
            });
        }

        None
    }
}

pub fn smtp_connector(pool_size: u32) -> Connector {
    Arc::new(move |provider: &ProviderConfig| {
        let transport: Arc<dyn Transport> =
            Arc::new(SmtpTransport::new(provider.endpoint.clone(), pool_size));
        Ok(transport)
    })
}

#[derive(Clone)]
pub struct ResolvedTransport {
    pub transport: Arc<dyn Transport>,
    pub provider: ProviderKind,
    pub from_address: String,
}

#[derive(Clone)]
struct TransportSlot {
    transport: Option<ResolvedTransport>,
    status: TransportStatus,
}

/// Resolves the mail transport once and keeps it until reset.
pub struct TransportResolver {
    connector: Connector,
    slot: RwLock<Option<TransportSlot>>,
}

impl TransportResolver {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached transport, or `None` when mail delivery is unavailable.
    /// Unavailability is an error only when force-send is enabled.
    pub async fn resolve(&self, settings: &Settings) -> MailerResult<Option<ResolvedTransport>> {
        let slot = self.slot(settings).await;
        match slot.transport {
            Some(resolved) => Ok(Some(resolved)),
            None if settings.email_force_send => Err(raise_error!(
                "No mail transport is configured and EMAIL_FORCE_SEND is enabled. \
                 Set SMTP_HOST/SMTP_PORT/SMTP_USER/SMTP_PASS or GMAIL_USER/GMAIL_PASS."
                    .into(),
                ErrorCode::MissingConfiguration
            )),
            None => Ok(None),
        }
    }

    pub async fn status(&self, settings: &Settings) -> TransportStatus {
        self.slot(settings).await.status
    }

    pub async fn reset(&self) {
        let mut guard = self.slot.write().await;
        if guard.take().is_some() {
            info!("Mail transport cache cleared");
        }
    }

    async fn slot(&self, settings: &Settings) -> TransportSlot {
        if let Some(slot) = self.slot.read().await.as_ref() {
            return slot.clone();
        }

        let mut guard = self.slot.write().await;
        // another caller may have resolved while we waited for the write lock
        if let Some(slot) = guard.as_ref() {
            return slot.clone();
        }
        let slot = self.build_slot(settings);
        *guard = Some(slot.clone());
        slot
    }

    fn build_slot(&self, settings: &Settings) -> TransportSlot {
        let Some(provider) = ProviderConfig::select(settings) else {
            warn!("No mail provider configured; outgoing mail will be mocked");
            return TransportSlot {
                transport: None,
                status: TransportStatus::unconfigured(),
            };
        };

        match (self.connector)(&provider) {
            Ok(transport) => {
                info!(
                    "Mail transport ready: provider={} host={}:{} from={}",
                    provider.kind.as_str(),
                    provider.endpoint.host,
                    provider.endpoint.port,
                    provider.from_address
                );
                TransportSlot {
                    transport: Some(ResolvedTransport {
                        transport,
                        provider: provider.kind,
                        from_address: provider.from_address,
                    }),
                    status: TransportStatus {
                        installed: true,
                        configured: true,
                        provider: Some(provider.kind),
                    },
                }
            }
            Err(e) => {
                error!(
                    "Failed to create {} mail transport: {:#?}",
                    provider.kind.as_str(),
                    e
                );
                TransportSlot {
                    transport: None,
                    status: TransportStatus {
                        installed: false,
                        configured: true,
                        provider: Some(provider.kind),
                    },
                }
            }
        }
    }
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use crate::modules::context::resolver::{smtp_connector, Connector, TransportResolver};
use crate::modules::context::status::TransportStatus;
use crate::modules::dispatch::retry::RetryPolicy;
use crate::modules::dispatch::throttle::SendThrottle;
use crate::modules::error::MailerResult;
use crate::modules::settings::cli::Settings;
use crate::modules::smtp::template::entity::TemplateCatalog;
use crate::modules::smtp::template::fetch::{AttachmentFetcher, HttpClient};

pub mod resolver;
pub mod status;

/// Process-wide mail state: the cached transport, the send throttle and the
/// template catalog. Constructed once at startup and shared behind an `Arc`.
pub struct MailerContext {
    pub(crate) settings: Arc<Settings>,
    pub(crate) resolver: TransportResolver,
    pub(crate) throttle: SendThrottle,
    pub(crate) retry: RetryPolicy,
    pub(crate) catalog: TemplateCatalog,
    pub(crate) fetcher: Arc<dyn AttachmentFetcher>,
}

impl MailerContext {
    /// Builds a context that delivers over SMTP and downloads attachments over HTTP.
    pub fn new(settings: Settings) -> MailerResult<Self> {
        let catalog = match &settings.mailer_catalog {
            Some(path) => TemplateCatalog::load(path)?,
            None => TemplateCatalog::default(),
        };
        let fetcher: Arc<dyn AttachmentFetcher> =
            Arc::new(HttpClient::new(settings.attachment_timeout())?);
        let connector = smtp_connector(settings.smtp_pool_size);
        Ok(Self::with_parts(settings, connector, catalog, fetcher))
    }

    pub fn with_parts(
        settings: Settings,
        connector: Connector,
        catalog: TemplateCatalog,
        fetcher: Arc<dyn AttachmentFetcher>,
    ) -> Self {
        Self {
            throttle: SendThrottle::new(settings.min_send_interval()),
            retry: RetryPolicy::new(
                settings.mail_retry_max_attempts,
                settings.retry_base_delay(),
            ),
            resolver: TransportResolver::new(connector),
            settings: Arc::new(settings),
            catalog,
            fetcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reports whether a provider is installed and configured, resolving it on first use.
    pub async fn status(&self) -> TransportStatus {
        self.resolver.status(&self.settings).await
    }

    /// Drops the cached transport so the next send resolves it again.
    pub async fn reset_transport(&self) {
        self.resolver.reset().await
    }
}

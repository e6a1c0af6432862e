// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::smtp::client::Sender;
use crate::modules::smtp::manager::{SmtpClientManager, SmtpEndpoint};
use crate::modules::smtp::pool::{build_smtp_pool, ConnectErrors};
use crate::modules::smtp::transport::{TransportError, TransportErrorKind};
use bb8::{Pool, RunError};
use mail_send::smtp::message::IntoMessage;

pub struct SmtpExecutor {
    pool: Pool<SmtpClientManager>,
    connect_errors: ConnectErrors,
}

impl SmtpExecutor {
    pub fn new(endpoint: SmtpEndpoint, pool_size: u32) -> Self {
        let connect_errors = ConnectErrors::default();
        Self {
            pool: build_smtp_pool(endpoint, pool_size, connect_errors.clone()),
            connect_errors,
        }
    }

    pub async fn send_email<'x>(
        &self,
        message: impl IntoMessage<'x>,
    ) -> Result<(), TransportError> {
        let mut client = self.pool.get().await.map_err(|e| match e {
            RunError::User(e) => TransportError::from(e),
            // connect failures land in the error sink, not in the checkout result
            RunError::TimedOut => self.connect_errors.take().unwrap_or_else(|| {
                TransportError::new(
                    TransportErrorKind::Connection,
                    "Timed out while attempting to acquire an SMTP connection from the pool",
                )
            }),
        })?;
        client.send_email(message).await.map_err(TransportError::from)
    }
}

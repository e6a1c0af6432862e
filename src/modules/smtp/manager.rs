// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::settings::cli::Encryption;
use crate::modules::smtp::client::MailSmtpClient;
use mail_send::smtp::AssertReply;
use mail_send::{Credentials, SmtpClient, SmtpClientBuilder};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

pub const EXT_START_TLS: u32 = 1 << 24;

/// Where and how to reach a submission server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub encryption: Encryption,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

pub struct SmtpClientManager {
    endpoint: SmtpEndpoint,
}

impl SmtpClientManager {
    pub fn new(endpoint: SmtpEndpoint) -> Self {
        Self { endpoint }
    }

    pub async fn build(&self) -> mail_send::Result<MailSmtpClient> {
        let endpoint = &self.endpoint;
        debug!(
            "Connecting to SMTP server {}:{} ({})",
            endpoint.host, endpoint.port, endpoint.encryption
        );

        let mut builder =
            SmtpClientBuilder::new(endpoint.host.clone(), endpoint.port).timeout(endpoint.timeout);

        if let (Some(username), Some(password)) = (&endpoint.username, &endpoint.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let client = match endpoint.encryption {
            Encryption::Ssl => MailSmtpClient::Tls(builder.implicit_tls(true).connect().await?),
            Encryption::StartTls => {
                MailSmtpClient::Tls(builder.implicit_tls(false).connect().await?)
            }
            Encryption::Auto => Self::connect_opportunistic(&builder).await?,
            Encryption::None => MailSmtpClient::Plain(builder.connect_plain().await?),
        };

        Ok(client)
    }

    /// Upgrades with STARTTLS when the server offers it, otherwise stays in clear text.
    async fn connect_opportunistic(
        builder: &SmtpClientBuilder<String>,
    ) -> mail_send::Result<MailSmtpClient> {
        tokio::time::timeout(builder.timeout, Self::negotiate(builder))
            .await
            .map_err(|_| mail_send::Error::Timeout)?
    }

    async fn negotiate(builder: &SmtpClientBuilder<String>) -> mail_send::Result<MailSmtpClient> {
        let mut client = SmtpClient {
            stream: TcpStream::connect(&builder.addr).await?,
            timeout: builder.timeout,
        };

        // Read greeting
        client.read().await?.assert_positive_completion()?;
        let response = client.ehlo(&builder.local_host).await?;

        if !response.has_capability(EXT_START_TLS) {
            debug!(
                "{} does not offer STARTTLS; continuing in clear text",
                builder.addr
            );
            if let Some(credentials) = &builder.credentials {
                client.authenticate(credentials, &response).await?;
            }
            return Ok(MailSmtpClient::Plain(client));
        }

        let mut client = client
            .start_tls(&builder.tls_connector, &builder.tls_hostname)
            .await?;
        let capabilities = client.capabilities(&builder.local_host, false).await?;
        if let Some(credentials) = &builder.credentials {
            client.authenticate(credentials, &capabilities).await?;
        }
        Ok(MailSmtpClient::Tls(client))
    }
}

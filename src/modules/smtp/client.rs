// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use mail_send::smtp::message::IntoMessage;
use mail_send::SmtpClient;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

pub enum MailSmtpClient {
    Plain(SmtpClient<TcpStream>),
    Tls(SmtpClient<TlsStream<TcpStream>>),
}

pub(crate) trait Sender {
    async fn send_noop(&mut self) -> mail_send::Result<()>;
    async fn reset(&mut self) -> mail_send::Result<()>;
    async fn send_email<'x>(&mut self, message: impl IntoMessage<'x>) -> mail_send::Result<()>;
}

impl Sender for MailSmtpClient {
    async fn send_noop(&mut self) -> mail_send::Result<()> {
        match self {
            MailSmtpClient::Plain(smtp_client) => smtp_client.noop().await,
            MailSmtpClient::Tls(smtp_client) => smtp_client.noop().await,
        }
    }

    async fn reset(&mut self) -> mail_send::Result<()> {
        match self {
            MailSmtpClient::Plain(smtp_client) => smtp_client.rset().await,
            MailSmtpClient::Tls(smtp_client) => smtp_client.rset().await,
        }
    }

    async fn send_email<'x>(&mut self, message: impl IntoMessage<'x>) -> mail_send::Result<()> {
        match self {
            MailSmtpClient::Plain(smtp_client) => smtp_client.send(message).await,
            MailSmtpClient::Tls(smtp_client) => smtp_client.send(message).await,
        }
    }
}

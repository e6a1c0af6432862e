use crate::modules::smtp::client::MailSmtpClient;
use crate::modules::smtp::client::Sender;
use crate::modules::smtp::manager::{SmtpClientManager, SmtpEndpoint};
use crate::modules::smtp::transport::TransportError;
use bb8::{ErrorSink, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

impl bb8::ManageConnection for SmtpClientManager {
    type Connection = MailSmtpClient;
    type Error = mail_send::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        self.build().await
    }

    // call this function before using the connection
    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.send_noop().await?;
        conn.reset().await
    }

    fn has_broken(&self, _: &mut Self::Connection) -> bool {
        false
    }
}

/// Keeps the most recent connect failure so a checkout timeout can report its cause.
#[derive(Clone, Debug, Default)]
pub struct ConnectErrors {
    last: Arc<Mutex<Option<TransportError>>>,
}

impl ConnectErrors {
    pub fn take(&self) -> Option<TransportError> {
        self.last.lock().ok().and_then(|mut last| last.take())
    }
}

impl ErrorSink<mail_send::Error> for ConnectErrors {
    fn sink(&self, error: mail_send::Error) {
        let error = TransportError::from(error);
        warn!("SMTP connection attempt failed: {}", error);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(error);
        }
    }

    fn boxed_clone(&self) -> Box<dyn ErrorSink<mail_send::Error>> {
        Box::new(self.clone())
    }
}

/// Builds the pool without connecting; the first checkout opens a session.
pub fn build_smtp_pool(
    endpoint: SmtpEndpoint,
    max_size: u32,
    errors: ConnectErrors,
) -> Pool<SmtpClientManager> {
    let timeout = endpoint.timeout;
    let manager = SmtpClientManager::new(endpoint);
    Pool::builder()
        .connection_timeout(timeout)
        .idle_timeout(Duration::from_secs(120))
        .retry_connection(false)
        .max_size(max_size)
        .test_on_check_out(true)
        .error_sink(Box::new(errors))
        .build_unchecked(manager)
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::modules::error::{code::ErrorCode, MailerResult};
use crate::{hackmailer_version, raise_error};

/// Downloads attachment bytes for templated sends.
pub trait AttachmentFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, MailerResult<Vec<u8>>>;
}

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> MailerResult<HttpClient> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(format!("HackMailer/{}", hackmailer_version!()))
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build HTTP client: {:#?}", e),
                    ErrorCode::InternalError
                )
            })?;
        Ok(Self { client })
    }

    pub async fn get_bytes(&self, url: &str) -> MailerResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                raise_error!(
                    format!("Failed to download {}: {}", url, e),
                    ErrorCode::AttachmentFetchFailed
                )
            })?;
        let bytes = response.bytes().await.map_err(|e| {
            raise_error!(
                format!("Failed to read body of {}: {}", url, e),
                ErrorCode::AttachmentFetchFailed
            )
        })?;
        Ok(bytes.to_vec())
    }
}

impl AttachmentFetcher for HttpClient {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, MailerResult<Vec<u8>>> {
        Box::pin(self.get_bytes(url))
    }
}

// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::modules::context::MailerContext;
use crate::modules::dispatch::message::OutboundMessage;
use crate::modules::dispatch::outcome::SendOutcome;
use crate::modules::dispatch::payload::SendEmailRequest;
use crate::modules::error::MailerResult;
use crate::modules::smtp::template::send::TemplateSendRequest;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BulkOptions {
    /// Messages dispatched concurrently per batch. Defaults to the configured size.
    pub batch_size: Option<usize>,
    /// Pause between two batches. Defaults to the configured delay.
    pub batch_delay: Option<Duration>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct BulkFailure {
    /// Recipient address(es) of the failed message.
    pub address: String,
    pub error: String,
}

/// Aggregate result of a bulk run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct BulkReport {
    pub total: usize,
    /// Messages that did not fail, mocked ones included.
    pub sent: usize,
    pub failed: usize,
    /// How many of the `sent` messages were mocked.
    pub mocked: usize,
    pub errors: Vec<BulkFailure>,
}

impl BulkReport {
    fn record(&mut self, address: String, outcome: SendOutcome) {
        self.total += 1;
        match outcome {
            SendOutcome::Failed { error } => {
                self.failed += 1;
                self.errors.push(BulkFailure {
                    address,
                    error: error.to_string(),
                });
            }
            SendOutcome::SentMocked { .. } => {
                self.sent += 1;
                self.mocked += 1;
            }
            SendOutcome::Sent { .. } | SendOutcome::SentWithDroppedAttachments { .. } => {
                self.sent += 1;
            }
        }
    }
}

impl MailerContext {
    /// Sends every message in sequential batches; messages of one batch run
    /// concurrently. Individual failures are reported, never raised.
    pub async fn send_bulk(
        &self,
        messages: Vec<OutboundMessage>,
        options: BulkOptions,
    ) -> MailerResult<BulkReport> {
        let items = messages
            .into_iter()
            .map(|message| (message.recipients(), message))
            .collect();
        self.run_batches(items, options, |message| self.dispatch(message))
            .await
    }

    /// Like [`MailerContext::send_bulk`], for raw request payloads. A payload
    /// that cannot be decoded fails on its own.
    pub async fn send_bulk_requests(
        &self,
        requests: Vec<SendEmailRequest>,
        options: BulkOptions,
    ) -> MailerResult<BulkReport> {
        let items = requests
            .into_iter()
            .map(|request| (request.to.join(", "), OutboundMessage::try_from(request)))
            .collect();
        self.run_batches(items, options, |message| async move {
            match message {
                Ok(message) => self.dispatch(message).await,
                Err(error) => SendOutcome::Failed { error },
            }
        })
        .await
    }

    /// Renders and sends one templated message per request, batched like [`MailerContext::send_bulk`].
    pub async fn send_template_bulk(
        &self,
        requests: Vec<TemplateSendRequest>,
        options: BulkOptions,
    ) -> MailerResult<BulkReport> {
        let items = requests
            .into_iter()
            .map(|request| (request.to.clone(), request))
            .collect();
        self.run_batches(items, options, |request| async move {
            self.dispatch_template(&request).await
        })
        .await
    }

    async fn run_batches<Item, F, Fut>(
        &self,
        items: Vec<(String, Item)>,
        options: BulkOptions,
        send: F,
    ) -> MailerResult<BulkReport>
    where
        F: Fn(Item) -> Fut,
        Fut: Future<Output = SendOutcome>,
    {
        // a forced send without a transport is fatal for the whole run
        self.resolver.resolve(&self.settings).await?;

        let batch_size = options
            .batch_size
            .unwrap_or(self.settings.mail_bulk_batch_size)
            .max(1);
        let batch_delay = options
            .batch_delay
            .unwrap_or_else(|| self.settings.bulk_batch_delay());

        let total = items.len();
        let batch_count = total.div_ceil(batch_size);
        let mut report = BulkReport::default();
        let mut items = items.into_iter().peekable();
        let mut batch_index = 0;

        info!(
            "Bulk send started: {} messages in {} batches of up to {}",
            total, batch_count, batch_size
        );

        while items.peek().is_some() {
            batch_index += 1;
            let batch: Vec<(String, Item)> = items.by_ref().take(batch_size).collect();
            let (addresses, payloads): (Vec<String>, Vec<Item>) = batch.into_iter().unzip();

            let outcomes = join_all(payloads.into_iter().map(&send)).await;
            for (address, outcome) in addresses.into_iter().zip(outcomes) {
                if let SendOutcome::Failed { error } = &outcome {
                    warn!("Bulk send to {} failed: {}", address, error);
                }
                report.record(address, outcome);
            }

            info!(
                "Bulk batch {}/{} done: sent={} failed={}",
                batch_index, batch_count, report.sent, report.failed
            );

            if items.peek().is_some() && !batch_delay.is_zero() {
                tokio::time::sleep(batch_delay).await;
            }
        }

        info!(
            "Bulk send finished: total={} sent={} failed={} mocked={}",
            report.total, report.sent, report.failed, report.mocked
        );
        Ok(report)
    }
}

//! Workflow webhook publisher.
//!
//! Each processed intake is posted to the downstream workflow engine on a
//! background task. Delivery never blocks or fails the intake response.

use anyhow::{Context, Result};
use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domain::{
    InputKind, IntakeResponse, IntakeStatus, PriceEstimate, PrintSpecification, ValidationResult,
};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned {0}")]
    Status(StatusCode),
}

impl DeliveryError {
    /// Connection failures, 5xx and 429 are worth retrying.
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder() && !e.is_decode(),
            Self::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

/// Payload posted to the workflow webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub request_id: String,
    pub status: IntakeStatus,
    pub specs: Option<PrintSpecification>,
    pub validation: ValidationResult,
    pub estimate: Option<PriceEstimate>,
    pub source: InputKind,
    pub published_at: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn new(response: &IntakeResponse, source: InputKind) -> Self {
        Self {
            request_id: response.request_id.clone(),
            status: response.status,
            specs: response.extracted_specs.clone(),
            validation: response.validation.clone(),
            estimate: response.estimate.clone(),
            source,
            published_at: Utc::now(),
        }
    }
}

/// Fire-and-forget client for the workflow webhook.
#[derive(Clone)]
pub struct WorkflowPublisher {
    client: Client,
    webhook_url: Option<Url>,
    max_elapsed: Duration,
}

impl WorkflowPublisher {
    pub fn new(
        webhook_url: Option<Url>,
        timeout_seconds: u64,
        max_elapsed_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        match &webhook_url {
            Some(url) => tracing::info!(webhook_url = %url, "Workflow publisher initialized"),
            None => tracing::info!("WORKFLOW_WEBHOOK_URL not set, workflow publishing disabled"),
        }

        Ok(Self {
            client,
            webhook_url,
            max_elapsed: Duration::from_secs(max_elapsed_seconds),
        })
    }

    /// Publisher that never sends anything.
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            webhook_url: None,
            max_elapsed: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Queue delivery of `event` on a background task.
    pub fn publish(&self, event: WorkflowEvent) {
        if !self.is_enabled() {
            return;
        }

        let publisher = self.clone();
        tokio::spawn(async move {
            let request_id = event.request_id.clone();
            match publisher.deliver(&event).await {
                Ok(()) => tracing::info!(request_id = %request_id, "Workflow webhook delivered"),
                Err(e) => tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Workflow webhook delivery failed"
                ),
            }
        });
    }

    /// Post `event`, retrying transient failures until the retry budget runs out.
    pub async fn deliver(&self, event: &WorkflowEvent) -> Result<(), DeliveryError> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(self.max_elapsed))
            .build();

        backoff::future::retry(policy, || async move {
            self.post_once(url, event).await.map_err(|e| {
                if e.is_transient() {
                    tracing::warn!(
                        request_id = %event.request_id,
                        error = %e,
                        "Workflow webhook attempt failed, retrying"
                    );
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    async fn post_once(&self, url: &Url, event: &WorkflowEvent) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url.clone())
            .header("x-request-id", &event.request_id)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status))
        }
    }
}

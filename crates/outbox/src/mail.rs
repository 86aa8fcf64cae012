//! Mail relay sink.
//!
//! Each flushed batch becomes one plain-text digest email, POSTed as JSON
//! to an HTTP mail relay.

use async_trait::async_trait;
use regex::Regex;
use relay_core::{Error, Record, RecordSink, SendError};
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::MailConfig;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("address regex is valid")
});

/// Loose `local@domain.tld` shape check.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// JSON body accepted by the relay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Sends batches as digest emails through an HTTP mail relay.
#[derive(Clone)]
pub struct MailRelaySink {
    config: MailConfig,
    relay_url: url::Url,
    http_client: reqwest::Client,
}

impl MailRelaySink {
    pub fn new(config: MailConfig) -> relay_core::Result<Self> {
        let relay_url = url::Url::parse(&config.relay_url)
            .map_err(|e| Error::config(format!("invalid mail relay URL '{}': {}", config.relay_url, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        if config.to.as_deref().map_or(true, str::is_empty) {
            warn!("No mail destination configured; records will accumulate until one is set");
        }

        Ok(Self {
            config,
            relay_url,
            http_client,
        })
    }

    /// Destination address, or the config error that blocks every flush.
    fn destination(&self) -> Result<&str, SendError> {
        let to = self
            .config
            .to
            .as_deref()
            .map(str::trim)
            .filter(|to| !to.is_empty())
            .ok_or_else(|| SendError::config("mail destination address is not set"))?;

        if !is_valid_address(to) {
            return Err(SendError::config(format!(
                "mail destination '{}' is not a valid address",
                to
            )));
        }
        Ok(to)
    }

    /// Build the digest for one batch.
    pub fn compose(&self, to: &str, records: &[Record]) -> MailMessage {
        let subject = format!("{} {} new SMS", self.config.subject_prefix, records.len());

        let text = records
            .iter()
            .map(|r| format!("[{}] {} {}: {}", r.formatted_date(), r.kind, r.sender, r.body))
            .collect::<Vec<_>>()
            .join("\n");

        MailMessage {
            from: self.config.from.clone(),
            to: to.to_string(),
            subject,
            text,
        }
    }
}

#[async_trait]
impl RecordSink for MailRelaySink {
    async fn send(&self, records: &[Record]) -> Result<(), SendError> {
        let to = self.destination()?;
        let message = self.compose(to, records);

        debug!(url = %self.relay_url, to = %to, count = records.len(), "Sending mail digest");

        let mut request = self.http_client.post(self.relay_url.clone()).json(&message);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SendError::transport(format!("mail relay unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected { status, body });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "mail"
    }

    async fn health_check(&self) -> bool {
        self.destination().is_ok()
    }
}

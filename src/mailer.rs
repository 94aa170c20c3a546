//! Email transport. Posts the composed report to the SendGrid v3 mail-send
//! endpoint and returns an explicit outcome; the caller decides whether a
//! delivery failure fails the run.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";
const SEND_PATH: &str = "/v3/mail/send";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to build the mail transport HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

pub struct Mailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Mailer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MailError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("wordform-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MailError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub async fn send(&self, email: &OutboundEmail) -> SendOutcome {
        let url = format!("{}{}", self.base_url, SEND_PATH);
        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": email.from },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html_body }],
        });

        let result = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();

                if status.is_success() {
                    info!(status = status.as_u16(), to = %email.to, "report email accepted");
                    SendOutcome {
                        success: true,
                        status_code: Some(status.as_u16()),
                        error: None,
                    }
                } else {
                    warn!(status = status.as_u16(), body = %body, "report email rejected");
                    SendOutcome {
                        success: false,
                        status_code: Some(status.as_u16()),
                        error: Some(body),
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, url = %url, "mail transport request failed");
                SendOutcome {
                    success: false,
                    status_code: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

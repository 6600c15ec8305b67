use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use common::VerificationError;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SubmissionStatus, VerificationApi, VerificationRequest};
use crate::artifact::VerificationSource;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_MAX_STATUS_CHECKS: u32 = 10;

/// Etherscan API client for submitting contract source verification
pub struct EtherscanClient {
    base_url: Option<String>,
    client: Client,
    source: VerificationSource,
    poll_interval: Duration,
    max_status_checks: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: String,
}

/// What a `verifysourcecode` response means for the caller
#[derive(Debug, PartialEq, Eq)]
enum Submission {
    /// Accepted and queued under this GUID
    Queued(String),
    /// Answered immediately
    Done(SubmissionStatus),
}

impl EtherscanResponse {
    fn is_ok(&self) -> bool {
        self.status == "1"
    }

    fn into_submission(self) -> Submission {
        if self.is_ok() {
            return Submission::Queued(self.result);
        }
        // Rejections carry the reason in `result`; `message` is just "NOTOK"
        Submission::Done(SubmissionStatus::classify(&self.result))
    }

    fn into_status(self) -> SubmissionStatus {
        SubmissionStatus::classify(&self.result)
    }
}

impl EtherscanClient {
    /// Create a new Etherscan client for the contract described by `source`
    pub fn new(source: VerificationSource) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: None,
            client,
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_status_checks: DEFAULT_MAX_STATUS_CHECKS,
        })
    }

    /// Use a fixed API URL instead of deriving it from the network name
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set how status checks are paced while the explorer processes a submission
    pub fn with_polling(mut self, interval: Duration, max_status_checks: u32) -> Self {
        self.poll_interval = interval;
        self.max_status_checks = max_status_checks.max(1);
        self
    }

    /// Get the base URL for the Etherscan API based on the network
    pub fn base_url(&self, network: &str) -> String {
        if let Some(url) = &self.base_url {
            return url.clone();
        }

        match network {
            "mainnet" => "https://api.etherscan.io/api".to_string(),
            "goerli" => "https://api-goerli.etherscan.io/api".to_string(),
            "sepolia" => "https://api-sepolia.etherscan.io/api".to_string(),
            "arbitrum" => "https://api.arbiscan.io/api".to_string(),
            "optimism" => "https://api-optimistic.etherscan.io/api".to_string(),
            "polygon" => "https://api.polygonscan.com/api".to_string(),
            _ => format!("https://api-{}.etherscan.io/api", network),
        }
    }

    async fn submit_source(&self, request: &VerificationRequest) -> Result<EtherscanResponse> {
        let url = self.base_url(&request.network.name);
        let address = format!("{:?}", request.address);
        let constructor_args = request.args.encode_hex();

        let response = self
            .client
            .post(&url)
            .form(&[
                ("apikey", request.api_key.as_str()),
                ("module", "contract"),
                ("action", "verifysourcecode"),
                ("contractaddress", address.as_str()),
                ("sourceCode", self.source.standard_json_input.as_str()),
                ("codeformat", "solidity-standard-json-input"),
                ("contractname", self.source.contract_identifier.as_str()),
                ("compilerversion", self.source.compiler_version.as_str()),
                // Etherscan's spelling
                ("constructorArguements", constructor_args.as_str()),
            ])
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn check_status(&self, url: &str, guid: &str, api_key: &str) -> Result<EtherscanResponse> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("apikey", api_key),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<EtherscanResponse> {
        if !response.status().is_success() {
            return Err(anyhow!("Etherscan API request failed: {}", response.status()));
        }

        let response_text = response.text().await?;
        serde_json::from_str::<EtherscanResponse>(&response_text)
            .map_err(|_| anyhow!("Failed to parse Etherscan API response: {}", response_text))
    }

    async fn poll(&self, url: &str, guid: &str, api_key: &str) -> Result<SubmissionStatus> {
        poll_status(self.poll_interval, self.max_status_checks, move || async move {
            Ok::<_, anyhow::Error>(self.check_status(url, guid, api_key).await?.into_status())
        })
        .await
    }
}

/// Run `check` until it reports something other than `Pending`, waiting
/// `interval` before each call. Still `Pending` after `max_checks` calls is
/// returned as is.
async fn poll_status<F, Fut>(interval: Duration, max_checks: u32, mut check: F) -> Result<SubmissionStatus>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SubmissionStatus>>,
{
    for attempt in 1..=max_checks {
        tokio::time::sleep(interval).await;

        let status = check().await?;
        debug!("Verification status check {}/{}: {:?}", attempt, max_checks, status);

        if status != SubmissionStatus::Pending {
            return Ok(status);
        }
    }

    Ok(SubmissionStatus::Pending)
}

#[async_trait]
impl VerificationApi for EtherscanClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmissionStatus, VerificationError> {
        let url = self.base_url(&request.network.name);

        let submission = self
            .submit_source(request)
            .await
            .map_err(|e| VerificationError::Request(e.to_string()))?
            .into_submission();

        match submission {
            Submission::Done(status) => Ok(status),
            Submission::Queued(guid) => {
                info!("Submitted {} for verification, GUID {}", self.source.contract_identifier, guid);
                self.poll(&url, &guid, &request.api_key)
                    .await
                    .map_err(|e| VerificationError::Request(e.to_string()))
            }
        }
    }
}

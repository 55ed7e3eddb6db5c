use std::time::Duration;

use anyhow::{anyhow, bail, ensure, Context, Result};
use ethers::types::Bytes;
use ethers::utils::hex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";

/// Client for the Pyth Hermes price service.
///
/// One GET per invocation, no retry and no staleness check: a failed or
/// malformed response terminates the run.
pub struct HermesClient {
    client: Client,
    base_url: String,
}

impl HermesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build reqwest client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Fetches the latest signed price update for each feed id and
    /// returns the opaque binary payloads, one per feed.
    pub async fn latest_price_updates(&self, feed_ids: &[String]) -> Result<Vec<Bytes>> {
        ensure!(!feed_ids.is_empty(), "at least one price feed id is required");

        let url = format!("{}/v2/updates/price/latest", self.base_url);
        let query: Vec<(&str, &str)> = feed_ids.iter().map(|id| ("ids[]", id.as_str())).collect();

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .context("failed to send Hermes request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read Hermes response body")?;

        if status != StatusCode::OK {
            bail!("Hermes returned status {status} with body: {text}");
        }

        let parsed: PriceUpdateResponse =
            serde_json::from_str(&text).context("failed to parse Hermes response JSON")?;
        parsed.update_payloads()
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceUpdateResponse {
    pub binary: BinaryUpdate,
}

#[derive(Debug, Deserialize)]
pub struct BinaryUpdate {
    #[serde(default)]
    pub encoding: String,
    pub data: Vec<String>,
}

impl PriceUpdateResponse {
    /// Decodes the hex payloads into bytes, never interpreting their
    /// contents: updates are forwarded verbatim to the contract.
    pub fn update_payloads(&self) -> Result<Vec<Bytes>> {
        if !self.binary.encoding.is_empty() && self.binary.encoding != "hex" {
            bail!(
                "unsupported Hermes payload encoding '{}'",
                self.binary.encoding
            );
        }
        ensure!(
            !self.binary.data.is_empty(),
            "Hermes response contained no update data"
        );
        self.binary
            .data
            .iter()
            .map(|blob| {
                let raw = hex::decode(blob.trim_start_matches("0x"))
                    .map_err(|e| anyhow!("invalid hex in Hermes payload: {e}"))?;
                Ok(Bytes::from(raw))
            })
            .collect()
    }
}

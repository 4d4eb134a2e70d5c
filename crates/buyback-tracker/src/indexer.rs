//! Block-explorer indexer client (Arbiscan / Snowscan, Etherscan-compatible API)
//!
//! Two queries are needed: the token-transfer history of an address
//! (`action=tokentx`) and the current balance of one token for one address
//! (`action=tokenbalance`). Explorer replies carry a `status` field; anything
//! other than `"1"` is a logical failure even when the HTTP call succeeded.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use crate::amounts;
use crate::config::NetworkConfig;
use crate::constants;
use crate::http;
use crate::types::{Network, TokenTransaction};

/// Per-network indexer
pub trait Indexer: Send + Sync {
    fn network(&self) -> Network;

    /// Full token-transfer history of `address`, newest first.
    ///
    /// A logical failure (including "no transactions found") is an empty list;
    /// `Err` is reserved for transport and decoding failures.
    fn token_transactions(&self, address: &str) -> impl Future<Output = Result<Vec<TokenTransaction>>> + Send;

    /// Current raw balance of `token_address` held by `address`.
    ///
    /// `Ok(None)` means the indexer answered with a non-success status.
    fn token_balance(&self, address: &str, token_address: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Explorer response envelope
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

/// Raw `tokentx` row; every field is a string on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenTransfer {
    block_number: String,
    time_stamp: String,
    hash: String,
    from: String,
    to: String,
    value: String,
    contract_address: String,
    token_name: String,
    token_symbol: String,
    token_decimal: String,
}

impl RawTokenTransfer {
    fn into_transaction(self, network: Network) -> Option<TokenTransaction> {
        let token_decimals = amounts::parse_decimals(&self.token_decimal)?;
        let amount = amounts::scale(&self.value, token_decimals)?;
        Some(TokenTransaction {
            block_number: self.block_number.parse().ok()?,
            timestamp: self.time_stamp.parse().ok()?,
            hash: self.hash,
            from: self.from,
            to: self.to,
            value: self.value,
            contract_address: self.contract_address,
            token_symbol: self.token_symbol,
            token_name: self.token_name,
            token_decimals,
            amount,
            network,
        })
    }
}

/// Etherscan-compatible explorer client for one network
pub struct EtherscanIndexer {
    network: Network,
    api_base: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EtherscanIndexer {
    pub fn new(config: &NetworkConfig, client: reqwest::Client) -> Self {
        Self {
            network: config.network,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            client,
        }
    }

    fn url(&self, params: &str) -> String {
        match &self.api_key {
            Some(key) => format!("{}?{}&apikey={}", self.api_base, params, key),
            None => format!("{}?{}", self.api_base, params),
        }
    }

    async fn call(&self, params: &str) -> Result<ExplorerResponse> {
        let url = self.url(params);
        http::get_json(&self.client, &url, &[])
            .await
            .with_context(|| format!("{} explorer call failed", self.network))
    }
}

impl Indexer for EtherscanIndexer {
    fn network(&self) -> Network {
        self.network
    }

    async fn token_transactions(&self, address: &str) -> Result<Vec<TokenTransaction>> {
        let params = format!("module=account&action=tokentx&address={}&sort=desc", address);
        let response = self.call(&params).await?;

        if response.status != constants::EXPLORER_STATUS_OK {
            debug!(
                network = %self.network,
                message = %response.message,
                "tokentx returned non-success status"
            );
            return Ok(Vec::new());
        }

        if !response.result.is_array() {
            return Ok(Vec::new());
        }
        let rows: Vec<RawTokenTransfer> =
            serde_json::from_value(response.result).context("Malformed tokentx result")?;

        let total = rows.len();
        let transactions: Vec<TokenTransaction> = rows
            .into_iter()
            .filter_map(|row| row.into_transaction(self.network))
            .collect();
        if transactions.len() < total {
            debug!(
                network = %self.network,
                skipped = total - transactions.len(),
                "Skipped malformed transfer rows"
            );
        }

        Ok(transactions)
    }

    async fn token_balance(&self, address: &str, token_address: &str) -> Result<Option<String>> {
        let params = format!(
            "module=account&action=tokenbalance&contractaddress={}&address={}&tag=latest",
            token_address, address
        );
        let response = self.call(&params).await?;

        if response.status != constants::EXPLORER_STATUS_OK {
            debug!(
                network = %self.network,
                token = token_address,
                message = %response.message,
                "tokenbalance returned non-success status"
            );
            return Ok(None);
        }

        match response.result {
            serde_json::Value::String(raw) => Ok(Some(raw)),
            other => anyhow::bail!("Unexpected tokenbalance result: {}", other),
        }
    }
}

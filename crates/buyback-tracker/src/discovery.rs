//! Balance discovery: derive the held-token set from transfer history.
//!
//! The explorers have no "all holdings" query, so the token universe is every
//! contract that ever appears in the tracked address's transfer history. Each
//! distinct token then gets one current-balance query (N+1 calls per network,
//! issued sequentially to stay inside free-tier explorer rate limits).

use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::indexer::Indexer;
use crate::types::{NetworkBalances, TokenBalance, TokenDescriptor, TokenTransaction};

/// Nonzero balances of every token `address` has ever transacted.
///
/// A transport failure anywhere degrades the whole network to an empty result:
/// a partially discovered token set would show an inconsistent portfolio.
pub async fn discover_balances<I: Indexer>(indexer: &I, address: &str) -> NetworkBalances {
    let network = indexer.network();
    match try_discover(indexer, address).await {
        Ok(balances) => {
            info!(network = %network, tokens = balances.len(), "Discovered token balances");
            NetworkBalances {
                network,
                address: address.to_string(),
                balances,
            }
        }
        Err(e) => {
            warn!(network = %network, "Token discovery failed: {:#}", e);
            NetworkBalances::empty(network, address)
        }
    }
}

async fn try_discover<I: Indexer>(indexer: &I, address: &str) -> Result<Vec<TokenBalance>> {
    let network = indexer.network();
    let transactions = indexer
        .token_transactions(address)
        .await
        .context("Failed to fetch token transfer history")?;

    let tokens = distinct_tokens(&transactions);
    debug!(
        network = %network,
        transfers = transactions.len(),
        tokens = tokens.len(),
        "Scanning distinct tokens"
    );

    let mut balances = Vec::new();
    for token in tokens {
        let reply = indexer
            .token_balance(address, &token.address)
            .await
            .with_context(|| format!("Failed to fetch {} balance", token.symbol))?;

        match reply {
            Some(raw) => {
                if let Some(balance) = TokenBalance::from_raw(token, raw, network) {
                    balances.push(balance);
                }
            }
            None => debug!(network = %network, token = %token.symbol, "Balance query rejected; skipping token"),
        }
    }

    Ok(balances)
}

/// Distinct tokens by contract address, keeping the first (most recent)
/// occurrence's descriptor. Order follows first appearance.
pub fn distinct_tokens(transactions: &[TokenTransaction]) -> Vec<TokenDescriptor> {
    let mut seen = HashSet::new();
    transactions
        .iter()
        .filter(|tx| seen.insert(tx.contract_address.to_lowercase()))
        .map(TokenTransaction::token)
        .collect()
}

/// Balances of a fixed token list (the buyback allowlist for one network).
///
/// Each token stands alone: a failed or rejected query skips only that token.
pub async fn fetch_allowlisted_balances<I: Indexer>(
    indexer: &I,
    address: &str,
    tokens: &[TokenDescriptor],
) -> Vec<TokenBalance> {
    let network = indexer.network();
    let mut balances = Vec::new();
    let mut failed = Vec::new();

    for token in tokens {
        match indexer.token_balance(address, &token.address).await {
            Ok(Some(raw)) => {
                if let Some(balance) = TokenBalance::from_raw(token.clone(), raw, network) {
                    balances.push(balance);
                }
            }
            Ok(None) => {}
            Err(e) => failed.push((token.symbol.as_str(), format!("{:#}", e))),
        }
    }

    // Report failures as a summary (not per-token spam)
    if !failed.is_empty() {
        warn!(
            network = %network,
            "Failed to fetch {} allowlisted balances: {:?}",
            failed.len(),
            failed
        );
    }

    balances
}

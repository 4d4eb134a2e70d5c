//! In-memory [`Indexer`] and [`PriceFeed`] implementations.
//!
//! Used by the unit and integration tests of both workspace crates to drive
//! the pipeline without network access.

use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::amounts;
use crate::indexer::Indexer;
use crate::prices::PriceFeed;
use crate::types::{Network, TokenDescriptor, TokenTransaction};

#[derive(Debug, Clone)]
enum BalanceReply {
    Raw(String),
    Rejected,
    TransportError,
}

/// Indexer serving a fixed transfer history and balance table
pub struct StaticIndexer {
    network: Network,
    transactions: Vec<TokenTransaction>,
    balances: HashMap<String, BalanceReply>,
    fail_history: bool,
    balance_calls: AtomicUsize,
}

impl StaticIndexer {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            transactions: Vec::new(),
            balances: HashMap::new(),
            fail_history: false,
            balance_calls: AtomicUsize::new(0),
        }
    }

    /// Append a transfer; add newest first to mirror explorer ordering
    pub fn with_transaction(mut self, transaction: TokenTransaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn with_balance(mut self, token_address: &str, raw: &str) -> Self {
        self.balances
            .insert(token_address.to_lowercase(), BalanceReply::Raw(raw.to_string()));
        self
    }

    /// Balance query answers with a non-success explorer status
    pub fn with_rejected_balance(mut self, token_address: &str) -> Self {
        self.balances.insert(token_address.to_lowercase(), BalanceReply::Rejected);
        self
    }

    /// Balance query fails at the transport level
    pub fn with_failing_balance(mut self, token_address: &str) -> Self {
        self.balances
            .insert(token_address.to_lowercase(), BalanceReply::TransportError);
        self
    }

    pub fn with_failing_history(mut self) -> Self {
        self.fail_history = true;
        self
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

impl Indexer for StaticIndexer {
    fn network(&self) -> Network {
        self.network
    }

    async fn token_transactions(&self, _address: &str) -> Result<Vec<TokenTransaction>> {
        if self.fail_history {
            anyhow::bail!("connection refused");
        }
        Ok(self.transactions.clone())
    }

    async fn token_balance(&self, _address: &str, token_address: &str) -> Result<Option<String>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        match self.balances.get(&token_address.to_lowercase()) {
            Some(BalanceReply::Raw(raw)) => Ok(Some(raw.clone())),
            Some(BalanceReply::Rejected) | None => Ok(None),
            Some(BalanceReply::TransportError) => anyhow::bail!("connection reset"),
        }
    }
}

/// Price feed serving fixed quotes and recording each batched request
pub struct StaticPriceFeed {
    quotes: HashMap<String, f64>,
    fail: bool,
    requests: Mutex<Vec<BTreeSet<String>>>,
}

impl StaticPriceFeed {
    pub fn new(quotes: &[(&str, f64)]) -> Self {
        Self {
            quotes: quotes.iter().map(|(id, price)| (id.to_string(), *price)).collect(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    /// Id sets requested so far, in call order
    pub fn requests(&self) -> Vec<BTreeSet<String>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PriceFeed for StaticPriceFeed {
    async fn prices(&self, ids: &BTreeSet<String>) -> Result<HashMap<String, f64>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(ids.clone());
        }
        if self.fail {
            anyhow::bail!("API returned status: 429 Too Many Requests");
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.quotes.get(id).map(|price| (id.clone(), *price)))
            .collect())
    }
}

/// Token descriptor shorthand
pub fn token(address: &str, symbol: &str, decimals: u8) -> TokenDescriptor {
    TokenDescriptor {
        address: address.to_lowercase(),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        decimals,
    }
}

/// A transfer of `raw_value` units of `token` from `from` to `to`
pub fn transfer(network: Network, token: &TokenDescriptor, from: &str, to: &str, raw_value: &str) -> TokenTransaction {
    TokenTransaction {
        block_number: 1,
        timestamp: 1_717_000_000,
        hash: format!("0x{}{}", token.symbol.to_lowercase(), raw_value),
        from: from.to_string(),
        to: to.to_string(),
        value: raw_value.to_string(),
        contract_address: token.address.clone(),
        token_symbol: token.symbol.clone(),
        token_name: token.name.clone(),
        token_decimals: token.decimals,
        amount: amounts::scale(raw_value, token.decimals).unwrap_or(0.0),
        network,
    }
}

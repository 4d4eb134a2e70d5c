//! Entry points: governance token overview and the full multi-token portfolio.
//!
//! Both entry points always return data. Failures inside are absorbed at the
//! smallest unit that failed (one token, one network, the price feed) and
//! logged; a full-portfolio run that fails outright yields
//! [`FullPortfolio::empty`] with the same shape.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregate::{self, CombinedTotals};
use crate::config::Config;
use crate::discovery;
use crate::governance::{self, GovernanceBalance, GovernanceOverview};
use crate::http;
use crate::indexer::{EtherscanIndexer, Indexer};
use crate::prices::{self, CoinGeckoFeed, PriceFeed};
use crate::types::{Network, NetworkSnapshot, TokenBalance, TokenHolding, TokenTransaction};
use crate::valuation;

/// Result of the general multi-token pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullPortfolio {
    pub arbitrum: NetworkSnapshot,
    pub avalanche: NetworkSnapshot,
    pub combined: CombinedTotals,
    pub common_tokens: Vec<TokenHolding>,
    pub buyback_tokens: Vec<TokenHolding>,
    /// Held symbols valued with a fallback price instead of a live quote
    pub fallback_priced: Vec<String>,
}

impl FullPortfolio {
    /// Zero-valued portfolio with the configured addresses
    pub fn empty(config: &Config) -> Self {
        Self {
            arbitrum: NetworkSnapshot::empty(Network::Arbitrum, &config.arbitrum.tracked_address),
            avalanche: NetworkSnapshot::empty(Network::Avalanche, &config.avalanche.tracked_address),
            combined: CombinedTotals::default(),
            common_tokens: Vec::new(),
            buyback_tokens: Vec::new(),
            fallback_priced: Vec::new(),
        }
    }

    pub fn network(&self, network: Network) -> &NetworkSnapshot {
        match network {
            Network::Arbitrum => &self.arbitrum,
            Network::Avalanche => &self.avalanche,
        }
    }

    pub fn common_tokens_total_usd(&self) -> f64 {
        valuation::total_usd(&self.common_tokens)
    }

    pub fn buyback_total_usd(&self) -> f64 {
        valuation::total_usd(&self.buyback_tokens)
    }
}

/// Both views, fetched together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub overview: GovernanceOverview,
    pub portfolio: FullPortfolio,
}

/// Owns the collaborators for both networks and the price feed
pub struct Tracker<I, P> {
    config: Config,
    arbitrum: I,
    avalanche: I,
    feed: P,
}

impl Tracker<EtherscanIndexer, CoinGeckoFeed> {
    /// Live explorers and CoinGecko, sharing one HTTP client
    pub fn from_config(config: Config) -> Self {
        let client = http::build_client();
        let arbitrum = EtherscanIndexer::new(&config.arbitrum, client.clone());
        let avalanche = EtherscanIndexer::new(&config.avalanche, client.clone());
        let feed = CoinGeckoFeed::new(&config.price_feed_api_base, config.coingecko_api_key.clone(), client);
        Self::new(config, arbitrum, avalanche, feed)
    }
}

impl<I, P> Tracker<I, P>
where
    I: Indexer + 'static,
    P: PriceFeed + 'static,
{
    pub fn new(config: Config, arbitrum: I, avalanche: I, feed: P) -> Self {
        Self {
            config,
            arbitrum,
            avalanche,
            feed,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn indexer(&self, network: Network) -> &I {
        match network {
            Network::Arbitrum => &self.arbitrum,
            Network::Avalanche => &self.avalanche,
        }
    }

    // =========================================================================
    // Governance token overview
    // =========================================================================

    /// Outflow history, per-network balances and current price of the governance token
    pub async fn fetch_governance_overview(&self) -> GovernanceOverview {
        let (arb_transactions, avax_transactions, arb_balance, avax_balance, price) = tokio::join!(
            self.governance_transactions(Network::Arbitrum),
            self.governance_transactions(Network::Avalanche),
            self.governance_balance(Network::Arbitrum),
            self.governance_balance(Network::Avalanche),
            prices::fetch_governance_price(&self.feed, &self.config.tables),
        );

        let mut transactions = arb_transactions;
        transactions.extend(avax_transactions);
        let outflow_transactions = governance::outflow_transactions(transactions, &self.config.tracked_addresses());

        let decimals = crate::constants::GOVERNANCE_DECIMALS;
        let balances = [(Network::Arbitrum, arb_balance), (Network::Avalanche, avax_balance)]
            .into_iter()
            .filter_map(|(network, raw)| GovernanceBalance::from_raw(network, raw?, decimals, price))
            .collect();

        GovernanceOverview {
            outflow_transactions,
            balances,
            price,
        }
    }

    /// Governance token transfers touching the tracked contract; empty on failure
    async fn governance_transactions(&self, network: Network) -> Vec<TokenTransaction> {
        let network_config = self.config.network(network);
        match self
            .indexer(network)
            .token_transactions(&network_config.tracked_address)
            .await
        {
            Ok(transactions) => transactions
                .into_iter()
                .filter(|tx| tx.contract_address.eq_ignore_ascii_case(&network_config.governance_token))
                .collect(),
            Err(e) => {
                warn!(network = %network, "Failed to fetch governance token transfers: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Raw governance token balance; `None` when the indexer failed or refused
    async fn governance_balance(&self, network: Network) -> Option<String> {
        let network_config = self.config.network(network);
        match self
            .indexer(network)
            .token_balance(&network_config.tracked_address, &network_config.governance_token)
            .await
        {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => {
                warn!(network = %network, "Governance token balance query rejected");
                None
            }
            Err(e) => {
                warn!(network = %network, "Failed to fetch governance token balance: {:#}", e);
                None
            }
        }
    }

    // =========================================================================
    // Full portfolio
    // =========================================================================

    /// Every nonzero holding on both networks, priced, plus the buyback token list
    pub async fn fetch_full_portfolio(self: &Arc<Self>) -> FullPortfolio {
        match self.try_fetch_full_portfolio().await {
            Ok(portfolio) => portfolio,
            Err(e) => {
                warn!("Full portfolio fetch failed: {:#}", e);
                FullPortfolio::empty(&self.config)
            }
        }
    }

    async fn try_fetch_full_portfolio(self: &Arc<Self>) -> Result<FullPortfolio> {
        // Each branch runs as its own task; a panic in one surfaces as a join error
        let arbitrum = tokio::spawn({
            let tracker = Arc::clone(self);
            async move {
                let address = &tracker.config.arbitrum.tracked_address;
                discovery::discover_balances(&tracker.arbitrum, address).await
            }
        });
        let avalanche = tokio::spawn({
            let tracker = Arc::clone(self);
            async move {
                let address = &tracker.config.avalanche.tracked_address;
                discovery::discover_balances(&tracker.avalanche, address).await
            }
        });
        let buyback = tokio::spawn({
            let tracker = Arc::clone(self);
            async move { tracker.allowlisted_balances().await }
        });

        // Wait for every task before looking at any result
        let (arbitrum, avalanche, buyback) = tokio::join!(arbitrum, avalanche, buyback);
        let arbitrum = arbitrum.context("Arbitrum discovery task failed")?;
        let avalanche = avalanche.context("Avalanche discovery task failed")?;
        let buyback = buyback.context("Buyback token task failed")?;

        info!(
            arbitrum = arbitrum.balances.len(),
            avalanche = avalanche.balances.len(),
            buyback = buyback.len(),
            "Fetched token balances"
        );

        let symbols: BTreeSet<String> = arbitrum
            .balances
            .iter()
            .chain(avalanche.balances.iter())
            .chain(buyback.iter())
            .map(|b| b.symbol().to_string())
            .collect();

        let price_map = prices::fetch_price_map(&self.feed, &self.config.tables, &symbols).await;
        let fallback_priced: Vec<String> = symbols
            .iter()
            .filter(|symbol| price_map.is_substituted(symbol))
            .cloned()
            .collect();
        if !fallback_priced.is_empty() {
            warn!(symbols = ?fallback_priced, "Valued with fallback prices");
        }

        let arbitrum = valuation::apply_prices(&arbitrum, &price_map);
        let avalanche = valuation::apply_prices(&avalanche, &price_map);
        let combined = aggregate::combine(&arbitrum, &avalanche);
        let common_tokens = aggregate::common_tokens(&arbitrum, &avalanche, &self.config.tables);
        let buyback_tokens = valuation::price_balances(&buyback, &price_map);

        Ok(FullPortfolio {
            arbitrum,
            avalanche,
            combined,
            common_tokens,
            buyback_tokens,
            fallback_priced,
        })
    }

    /// Buyback allowlist balances for both networks, Arbitrum first
    async fn allowlisted_balances(&self) -> Vec<TokenBalance> {
        let mut balances = Vec::new();
        for network in Network::ALL {
            let network_config = self.config.network(network);
            balances.extend(
                discovery::fetch_allowlisted_balances(
                    self.indexer(network),
                    &network_config.tracked_address,
                    &network_config.buyback_tokens,
                )
                .await,
            );
        }
        balances
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Both entry points concurrently
    pub async fn fetch_dashboard(self: &Arc<Self>) -> Dashboard {
        let (overview, portfolio) = tokio::join!(self.fetch_governance_overview(), self.fetch_full_portfolio());
        Dashboard { overview, portfolio }
    }
}

//! Price lookup tables: ticker → CoinGecko id, and fallback USD prices.
//!
//! The fallback table doubles as the "common token" allowlist: every symbol
//! with a fallback price is shown in the cross-network common-tokens view.
//! Tables are plain data carried on [`crate::config::Config`] so tests and
//! config files can swap them out.

use std::collections::{BTreeMap, HashMap};

use crate::constants;
use crate::symbols;

/// Ticker → CoinGecko id
const DEFAULT_SYMBOL_IDS: &[(&str, &str)] = &[
    ("GMX", "gmx"),
    ("WETH", "ethereum"),
    ("ETH", "ethereum"),
    ("WBTC", "wrapped-bitcoin"),
    ("BTC", "bitcoin"),
    ("BTC.B", "bitcoin"),
    ("BTCB", "bitcoin"),
    ("WBTC.E", "wrapped-bitcoin"),
    ("USDC", "usd-coin"),
    ("USDC.E", "usd-coin"),
    ("USDT", "tether"),
    ("DAI", "dai"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
    ("AAVE", "aave"),
    ("CRV", "curve-dao-token"),
    ("MKR", "maker"),
    ("SNX", "synthetix-network-token"),
    ("COMP", "compound-governance-token"),
    ("BAL", "balancer"),
    ("YFI", "yearn-finance"),
    ("SUSHI", "sushi"),
    ("1INCH", "1inch"),
    ("GRT", "the-graph"),
    ("MATIC", "matic-network"),
    ("FTM", "fantom"),
    ("AVAX", "avalanche-2"),
    ("WAVAX", "avalanche-2"),
    ("FRAX", "frax"),
    ("ARB", "arbitrum"),
    ("OP", "optimism"),
    ("PEPE", "pepe"),
    ("WSTETH", "wrapped-steth"),
    ("USDE", "usde"),
    ("TBTC", "tbtc"),
];

/// Prices used when the feed is down or omits an allowlisted symbol
const DEFAULT_FALLBACK_PRICES: &[(&str, f64)] = &[
    ("GMX", 12.0),
    ("WETH", 3000.0),
    ("ETH", 3000.0),
    ("WBTC", 75000.0),
    ("BTC", 75000.0),
    ("BTC.B", 75000.0),
    ("BTCB", 75000.0),
    ("WBTC.E", 75000.0),
    ("USDC", 1.0),
    ("USDC.E", 1.0),
    ("USDT", 1.0),
    ("DAI", 1.0),
    ("ARB", 0.25),
    ("AVAX", 16.0),
    ("WAVAX", 16.0),
    ("LINK", 10.0),
    ("AAVE", 120.0),
    ("UNI", 4.5),
    ("PEPE", 0.000006),
    ("WSTETH", 3200.0),
    ("USDE", 1.0),
    ("TBTC", 75000.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTables {
    /// Ticker → price-feed id
    pub symbol_ids: HashMap<String, String>,
    /// Ticker → fallback USD price; keys form the common-token allowlist
    pub fallback_prices: BTreeMap<String, f64>,
    pub governance_symbol: String,
    pub governance_feed_id: String,
}

impl Default for PriceTables {
    fn default() -> Self {
        Self {
            symbol_ids: DEFAULT_SYMBOL_IDS
                .iter()
                .map(|(symbol, id)| (symbol.to_string(), id.to_string()))
                .collect(),
            fallback_prices: DEFAULT_FALLBACK_PRICES
                .iter()
                .map(|(symbol, price)| (symbol.to_string(), *price))
                .collect(),
            governance_symbol: constants::GOVERNANCE_SYMBOL.to_string(),
            governance_feed_id: constants::GOVERNANCE_FEED_ID.to_string(),
        }
    }
}

impl PriceTables {
    /// Feed id for a ticker, using the tiered symbol fallback
    pub fn feed_id(&self, symbol: &str) -> Option<&str> {
        symbols::resolve(symbol, &self.symbol_ids).map(String::as_str)
    }

    /// Whether the ticker, exactly as reported, is on the common-token allowlist.
    ///
    /// No case folding or suffix stripping here: `BTC.b` is not `BTC.B`.
    pub fn is_common_token(&self, symbol: &str) -> bool {
        self.fallback_prices.contains_key(symbol)
    }

    pub fn governance_fallback_price(&self) -> f64 {
        self.fallback_prices
            .get(&self.governance_symbol)
            .copied()
            .unwrap_or(0.0)
    }

    /// Merge user-supplied entries over the current tables
    pub fn extend(&mut self, symbol_ids: HashMap<String, String>, fallback_prices: BTreeMap<String, f64>) {
        self.symbol_ids.extend(symbol_ids);
        self.fallback_prices.extend(fallback_prices);
    }
}

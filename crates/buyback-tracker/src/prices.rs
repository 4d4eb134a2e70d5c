//! USD price fetching (CoinGecko batch query → per-symbol fallback table)

use anyhow::Result;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use tracing::{debug, info, warn};

use crate::constants;
use crate::http;
use crate::symbols;
use crate::tables::PriceTables;

/// Batched USD price source keyed by feed id
pub trait PriceFeed: Send + Sync {
    /// Prices for `ids`. Unknown ids are simply absent from the result.
    fn prices(&self, ids: &BTreeSet<String>) -> impl Future<Output = Result<HashMap<String, f64>>> + Send;
}

/// CoinGecko simple price entry
#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
}

/// CoinGecko `/simple/price` client
pub struct CoinGeckoFeed {
    api_base: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl CoinGeckoFeed {
    pub fn new(api_base: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }
}

impl PriceFeed for CoinGeckoFeed {
    async fn prices(&self, ids: &BTreeSet<String>) -> Result<HashMap<String, f64>> {
        let ids_param = ids.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        let url = format!(
            "{}{}?ids={}&vs_currencies=usd",
            self.api_base,
            constants::COINGECKO_SIMPLE_PRICE,
            ids_param
        );

        let headers: Vec<(&str, &str)> = match &self.api_key {
            Some(key) => vec![("x-cg-demo-api-key", key.as_str())],
            None => Vec::new(),
        };

        let data: HashMap<String, SimplePrice> = http::get_json(&self.client, &url, &headers).await?;

        Ok(data
            .into_iter()
            .filter_map(|(id, price)| price.usd.map(|usd| (id, usd)))
            .collect())
    }
}

// =============================================================================
// Price Map
// =============================================================================

/// Symbol → USD price for one aggregation pass.
///
/// Keys are symbols as the indexer reported them, not normalized. Symbols
/// whose price came from the fallback table are tracked in `substituted`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceMap {
    prices: HashMap<String, f64>,
    substituted: BTreeSet<String>,
}

impl PriceMap {
    /// The whole fallback table, every entry marked as substituted
    pub fn fallback(tables: &PriceTables) -> Self {
        Self {
            prices: tables
                .fallback_prices
                .iter()
                .map(|(symbol, price)| (symbol.clone(), *price))
                .collect(),
            substituted: tables.fallback_prices.keys().cloned().collect(),
        }
    }

    pub fn insert(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_string(), price);
    }

    /// Exact-key lookup
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    /// Lookup with the tiered symbol fallback
    pub fn resolve(&self, symbol: &str) -> Option<f64> {
        symbols::resolve(symbol, &self.prices).copied()
    }

    /// Whether the price [`resolve`](Self::resolve) finds for `symbol` is a fallback
    pub fn is_substituted(&self, symbol: &str) -> bool {
        symbols::resolve_entry(symbol, &self.prices).is_some_and(|(key, _)| self.substituted.contains(key))
    }

    fn len(&self) -> usize {
        self.prices.len()
    }

    fn backfill(&mut self, tables: &PriceTables) {
        for (symbol, price) in &tables.fallback_prices {
            if !self.prices.contains_key(symbol) {
                self.prices.insert(symbol.clone(), *price);
                self.substituted.insert(symbol.clone());
            }
        }
    }
}

fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Build the price map for a set of symbols with one batched feed query.
///
/// Symbols without a feed id are left out of the query. After the query,
/// every allowlisted symbol still missing gets its fallback price. If the
/// query itself fails, the fallback table is returned as-is.
pub async fn fetch_price_map<F: PriceFeed>(feed: &F, tables: &PriceTables, symbols: &BTreeSet<String>) -> PriceMap {
    let mut symbol_ids: Vec<(&str, &str)> = Vec::new();
    for symbol in symbols {
        match tables.feed_id(symbol) {
            Some(id) => symbol_ids.push((symbol.as_str(), id)),
            None => debug!(symbol = %symbol, "No price feed id for symbol"),
        }
    }

    let ids: BTreeSet<String> = symbol_ids.iter().map(|(_, id)| id.to_string()).collect();
    let mut map = PriceMap::default();

    if !ids.is_empty() {
        match feed.prices(&ids).await {
            Ok(quotes) => {
                for (symbol, id) in &symbol_ids {
                    match quotes.get(*id) {
                        Some(price) if is_usable_price(*price) => map.insert(symbol, *price),
                        _ => debug!(symbol = %symbol, id = %id, "Price feed omitted id"),
                    }
                }
            }
            Err(e) => {
                warn!("Price feed request failed ({:#}); using fallback prices", e);
                return PriceMap::fallback(tables);
            }
        }
    }

    map.backfill(tables);

    if !map.substituted.is_empty() {
        info!(
            fetched = map.len() - map.substituted.len(),
            substituted = map.substituted.len(),
            "Price map built with fallback prices for missing symbols"
        );
    }

    map
}

/// Current governance token price, or its fallback constant
pub async fn fetch_governance_price<F: PriceFeed>(feed: &F, tables: &PriceTables) -> f64 {
    let ids = BTreeSet::from([tables.governance_feed_id.clone()]);
    match feed.prices(&ids).await {
        Ok(quotes) => match quotes.get(&tables.governance_feed_id) {
            Some(price) if is_usable_price(*price) => *price,
            _ => {
                warn!(
                    "No {} price in feed response; using fallback",
                    tables.governance_symbol
                );
                tables.governance_fallback_price()
            }
        },
        Err(e) => {
            warn!(
                "Failed to fetch {} price ({:#}); using fallback",
                tables.governance_symbol, e
            );
            tables.governance_fallback_price()
        }
    }
}

//! Ticker symbol resolution against symbol-keyed tables.
//!
//! Bridged tokens show up under suffixed tickers (`BTC.b`, `WBTC.e`, `USDC.e`)
//! and explorers are inconsistent about casing, so lookups fall through three
//! tiers, first match wins:
//!
//! 1. exact key
//! 2. case-insensitive key
//! 3. the part before the first `.`, uppercased
//!
//! The same resolver is used for symbol → price-feed id and symbol → price.

use std::collections::HashMap;

/// Resolve `symbol` against `map`, or `None` when every tier misses.
pub fn resolve<'a, V>(symbol: &str, map: &'a HashMap<String, V>) -> Option<&'a V> {
    resolve_entry(symbol, map).map(|(_, value)| value)
}

/// Like [`resolve`], but also returns the key that matched
pub fn resolve_entry<'a, V>(symbol: &str, map: &'a HashMap<String, V>) -> Option<(&'a String, &'a V)> {
    if let Some(entry) = map.get_key_value(symbol) {
        return Some(entry);
    }

    let upper = symbol.to_uppercase();
    if let Some(entry) = find_ignoring_case(&upper, map) {
        return Some(entry);
    }

    let base = base_symbol(symbol);
    if base == upper {
        // No suffix to strip, tier 3 would repeat tier 2
        return None;
    }
    map.get_key_value(&base).or_else(|| find_ignoring_case(&base, map))
}

/// Uppercased ticker with any `.suffix` removed
pub fn base_symbol(symbol: &str) -> String {
    symbol.split('.').next().unwrap_or(symbol).to_uppercase()
}

// Keys differing only by case (a live `BTC.b` next to a fallback `BTC.B`) are
// broken deterministically by taking the lexicographically smallest key.
fn find_ignoring_case<'a, V>(upper: &str, map: &'a HashMap<String, V>) -> Option<(&'a String, &'a V)> {
    map.iter()
        .filter(|(key, _)| key.to_uppercase() == upper)
        .min_by(|a, b| a.0.cmp(b.0))
}

//! Cross-network totals and the common-token view

use serde::Serialize;

use crate::tables::PriceTables;
use crate::types::{NetworkSnapshot, TokenHolding};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CombinedTotals {
    pub total_usd: f64,
    pub token_count: usize,
}

pub fn combine(first: &NetworkSnapshot, second: &NetworkSnapshot) -> CombinedTotals {
    CombinedTotals {
        total_usd: first.total_usd + second.total_usd,
        token_count: first.token_count() + second.token_count(),
    }
}

/// Allowlisted holdings from both networks, first network then second.
/// Each holding keeps its own network tag; no sorting.
pub fn common_tokens(first: &NetworkSnapshot, second: &NetworkSnapshot, tables: &PriceTables) -> Vec<TokenHolding> {
    first
        .holdings
        .iter()
        .chain(second.holdings.iter())
        .filter(|h| tables.is_common_token(h.symbol()))
        .cloned()
        .collect()
}

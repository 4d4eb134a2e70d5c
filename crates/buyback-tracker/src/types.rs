//! Token, balance and snapshot types shared across the pipeline.
//!
//! Balances are produced unpriced ([`TokenBalance`], [`NetworkBalances`]) and
//! only become [`TokenHolding`]s once a price map has been applied, so no
//! half-valued record is ever handed out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amounts;

// =============================================================================
// Networks
// =============================================================================

/// One of the two chains the buyback contracts live on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Arbitrum,
    Avalanche,
}

impl Network {
    /// Stable display order: Arbitrum first, then Avalanche
    pub const ALL: [Network; 2] = [Network::Arbitrum, Network::Avalanche];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Arbitrum => "arbitrum",
            Network::Avalanche => "avalanche",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tokens and Transactions
// =============================================================================

/// A fungible token on one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// A token transfer touching a tracked address, as reported by the indexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTransaction {
    pub block_number: u64,
    /// Unix seconds
    pub timestamp: i64,
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Raw integer amount as a decimal string
    pub value: String,
    pub contract_address: String,
    pub token_symbol: String,
    pub token_name: String,
    pub token_decimals: u8,
    /// `value` scaled by `token_decimals`
    pub amount: f64,
    pub network: Network,
}

impl TokenTransaction {
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Case-insensitive sender check (explorers mix checksummed and lowercase hex)
    pub fn is_from(&self, address: &str) -> bool {
        self.from.eq_ignore_ascii_case(address)
    }

    pub fn token(&self) -> TokenDescriptor {
        TokenDescriptor {
            address: self.contract_address.to_lowercase(),
            symbol: self.token_symbol.clone(),
            name: self.token_name.clone(),
            decimals: self.token_decimals,
        }
    }
}

// =============================================================================
// Balances
// =============================================================================

/// Current balance of one token, before pricing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    #[serde(flatten)]
    pub token: TokenDescriptor,
    /// Raw integer balance as a decimal string
    pub raw_balance: String,
    /// Human-scaled balance
    pub amount: f64,
    pub network: Network,
}

impl TokenBalance {
    /// Build a balance from an indexer reply.
    ///
    /// Returns `None` for zero balances and for replies that are not a plain
    /// non-negative integer, so callers never carry either forward.
    pub fn from_raw(token: TokenDescriptor, raw_balance: String, network: Network) -> Option<Self> {
        if amounts::is_zero(&raw_balance) {
            return None;
        }
        let amount = amounts::scale(&raw_balance, token.decimals)?;
        Some(Self {
            token,
            raw_balance,
            amount,
            network,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.token.symbol
    }
}

/// A priced balance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolding {
    #[serde(flatten)]
    pub balance: TokenBalance,
    pub usd_value: f64,
}

impl TokenHolding {
    pub fn symbol(&self) -> &str {
        self.balance.symbol()
    }

    pub fn network(&self) -> Network {
        self.balance.network
    }
}

// =============================================================================
// Per-network Results
// =============================================================================

/// Discovery output for one tracked address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkBalances {
    pub network: Network,
    pub address: String,
    pub balances: Vec<TokenBalance>,
}

impl NetworkBalances {
    pub fn empty(network: Network, address: &str) -> Self {
        Self {
            network,
            address: address.to_string(),
            balances: Vec::new(),
        }
    }
}

/// Priced holdings for one tracked address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub network: Network,
    pub address: String,
    pub holdings: Vec<TokenHolding>,
    /// Always the sum of `holdings[*].usd_value`
    pub total_usd: f64,
}

impl NetworkSnapshot {
    pub fn empty(network: Network, address: &str) -> Self {
        Self {
            network,
            address: address.to_string(),
            holdings: Vec::new(),
            total_usd: 0.0,
        }
    }

    pub fn token_count(&self) -> usize {
        self.holdings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> TokenDescriptor {
        TokenDescriptor {
            address: "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8".to_string(),
            symbol: "USDC".to_string(),
            name: "USD Coin".to_string(),
            decimals: 6,
        }
    }

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Arbitrum.to_string(), "arbitrum");
        assert_eq!(Network::Avalanche.to_string(), "avalanche");
    }

    #[test]
    fn test_network_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Network::Arbitrum).unwrap(), "\"arbitrum\"");
    }

    #[test]
    fn test_zero_balance_is_rejected() {
        assert!(TokenBalance::from_raw(usdc(), "0".to_string(), Network::Arbitrum).is_none());
        assert!(TokenBalance::from_raw(usdc(), "000".to_string(), Network::Arbitrum).is_none());
    }

    #[test]
    fn test_malformed_balance_is_rejected() {
        assert!(TokenBalance::from_raw(usdc(), "-5".to_string(), Network::Arbitrum).is_none());
        assert!(TokenBalance::from_raw(usdc(), "Max rate limit reached".to_string(), Network::Arbitrum).is_none());
    }

    #[test]
    fn test_balance_is_scaled() {
        let balance = TokenBalance::from_raw(usdc(), "2500000".to_string(), Network::Arbitrum).unwrap();
        assert!((balance.amount - 2.5).abs() < 1e-12);
        assert_eq!(balance.symbol(), "USDC");
    }

    #[test]
    fn test_is_from_ignores_case() {
        let tx = TokenTransaction {
            block_number: 1,
            timestamp: 1_700_000_000,
            hash: "0xabc".to_string(),
            from: "0x7EB417637A3E6D1C19E6D69158C47610B7A5D9B3".to_string(),
            to: "0x0000000000000000000000000000000000000001".to_string(),
            value: "1".to_string(),
            contract_address: "0xFC5A1A6EB076A2C7AD06ED22C90D7E710E35AD0A".to_string(),
            token_symbol: "GMX".to_string(),
            token_name: "GMX".to_string(),
            token_decimals: 18,
            amount: 1e-18,
            network: Network::Arbitrum,
        };
        assert!(tx.is_from("0x7eb417637a3e6d1c19e6d69158c47610b7a5d9b3"));
        assert!(!tx.is_from("0x0000000000000000000000000000000000000001"));
        assert_eq!(tx.token().address, "0xfc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a");
        assert_eq!(tx.timestamp_utc().unwrap().format("%Y-%m-%d").to_string(), "2023-11-14");
    }
}

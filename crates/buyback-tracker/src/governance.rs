//! Governance token (GMX) views: per-network balance and outflow history

use serde::Serialize;

use crate::amounts;
use crate::types::{Network, TokenTransaction};

/// Governance token balance held by one tracked contract
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceBalance {
    pub network: Network,
    pub raw_balance: String,
    pub amount: f64,
    pub usd_value: f64,
}

impl GovernanceBalance {
    /// Zero balances are kept here: the overview shows every network that answered
    pub fn from_raw(network: Network, raw_balance: String, decimals: u8, price: f64) -> Option<Self> {
        let amount = amounts::scale(&raw_balance, decimals)?;
        Some(Self {
            network,
            raw_balance,
            amount,
            usd_value: amount * price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceOverview {
    /// Transfers sent by either tracked contract, both networks merged, newest first
    pub outflow_transactions: Vec<TokenTransaction>,
    pub balances: Vec<GovernanceBalance>,
    pub price: f64,
}

impl GovernanceOverview {
    pub fn total_outflow(&self) -> f64 {
        self.outflow_transactions.iter().map(|tx| tx.amount).sum()
    }

    pub fn total_balance(&self) -> f64 {
        self.balances.iter().map(|b| b.amount).sum()
    }

    pub fn total_usd(&self) -> f64 {
        self.balances.iter().map(|b| b.usd_value).sum()
    }
}

/// Keep only transfers whose sender is one of `tracked` (case-insensitive),
/// newest first. The sort is stable, so same-second transfers keep input order.
pub fn outflow_transactions(transactions: Vec<TokenTransaction>, tracked: &[&str]) -> Vec<TokenTransaction> {
    let mut outflows: Vec<TokenTransaction> = transactions
        .into_iter()
        .filter(|tx| tracked.iter().any(|address| tx.is_from(address)))
        .collect();
    outflows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    outflows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{token, transfer};

    const ARB_CONTRACT: &str = "0x7eb417637a3e6d1c19e6d69158c47610b7a5d9b3";
    const AVAX_CONTRACT: &str = "0x1a3a103f9f536a0456c9b205152a3ac2b3c54490";
    const OTHER: &str = "0x000000000000000000000000000000000000beef";

    #[test]
    fn test_outflow_filter_is_case_insensitive() {
        let gmx = token("0xfc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a", "GMX", 18);
        let transactions = vec![
            transfer(Network::Arbitrum, &gmx, &ARB_CONTRACT.to_uppercase(), OTHER, "1000000000000000000"),
            transfer(Network::Arbitrum, &gmx, OTHER, ARB_CONTRACT, "5000000000000000000"),
            transfer(Network::Avalanche, &gmx, AVAX_CONTRACT, OTHER, "2000000000000000000"),
            transfer(Network::Avalanche, &gmx, OTHER, AVAX_CONTRACT, "7000000000000000000"),
        ];

        let outflows = outflow_transactions(transactions, &[ARB_CONTRACT, AVAX_CONTRACT]);

        assert_eq!(outflows.len(), 2);
        assert_eq!(outflows[0].network, Network::Arbitrum);
        assert_eq!(outflows[1].network, Network::Avalanche);
        assert!(outflows.iter().all(|tx| tx.to == OTHER));
    }

    #[test]
    fn test_outflows_merge_networks_newest_first() {
        let gmx = token("0xfc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a", "GMX", 18);
        let at = |mut tx: TokenTransaction, timestamp: i64| {
            tx.timestamp = timestamp;
            tx
        };

        // Arbitrum history first, as the tracker concatenates it
        let transactions = vec![
            at(transfer(Network::Arbitrum, &gmx, ARB_CONTRACT, OTHER, "1000000000000000000"), 1_500_000_000),
            at(transfer(Network::Arbitrum, &gmx, ARB_CONTRACT, OTHER, "2000000000000000000"), 1_000),
            at(transfer(Network::Avalanche, &gmx, AVAX_CONTRACT, OTHER, "3000000000000000000"), 2_000_000_000),
            at(transfer(Network::Avalanche, &gmx, AVAX_CONTRACT, OTHER, "4000000000000000000"), 1_200_000_000),
        ];

        let outflows = outflow_transactions(transactions, &[ARB_CONTRACT, AVAX_CONTRACT]);

        let order: Vec<(Network, i64)> = outflows.iter().map(|tx| (tx.network, tx.timestamp)).collect();
        assert_eq!(
            order,
            vec![
                (Network::Avalanche, 2_000_000_000),
                (Network::Arbitrum, 1_500_000_000),
                (Network::Avalanche, 1_200_000_000),
                (Network::Arbitrum, 1_000),
            ]
        );
    }

    #[test]
    fn test_overview_totals() {
        let gmx = token("0xfc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a", "GMX", 18);
        let overview = GovernanceOverview {
            outflow_transactions: vec![
                transfer(Network::Arbitrum, &gmx, ARB_CONTRACT, OTHER, "1500000000000000000"),
                transfer(Network::Avalanche, &gmx, AVAX_CONTRACT, OTHER, "2500000000000000000"),
            ],
            balances: vec![
                GovernanceBalance::from_raw(Network::Arbitrum, "10000000000000000000".to_string(), 18, 12.0)
                    .unwrap(),
                GovernanceBalance::from_raw(Network::Avalanche, "0".to_string(), 18, 12.0).unwrap(),
            ],
            price: 12.0,
        };

        assert_eq!(overview.total_outflow(), 4.0);
        assert_eq!(overview.total_balance(), 10.0);
        assert_eq!(overview.total_usd(), 120.0);
    }

    #[test]
    fn test_malformed_governance_balance() {
        assert!(GovernanceBalance::from_raw(Network::Arbitrum, "NOTOK".to_string(), 18, 12.0).is_none());
    }
}

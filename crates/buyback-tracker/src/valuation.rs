//! Price application: turn unpriced balances into USD-valued holdings.
//!
//! Pure functions. Totals are always recomputed from the holdings.

use crate::prices::PriceMap;
use crate::types::{NetworkBalances, NetworkSnapshot, TokenBalance, TokenHolding};

/// Value one balance; symbols without a price are worth zero
pub fn price_balance(balance: &TokenBalance, prices: &PriceMap) -> TokenHolding {
    let price = prices.resolve(balance.symbol()).unwrap_or(0.0);
    TokenHolding {
        balance: balance.clone(),
        usd_value: balance.amount * price,
    }
}

pub fn price_balances(balances: &[TokenBalance], prices: &PriceMap) -> Vec<TokenHolding> {
    balances.iter().map(|b| price_balance(b, prices)).collect()
}

pub fn total_usd(holdings: &[TokenHolding]) -> f64 {
    holdings.iter().map(|h| h.usd_value).sum()
}

/// Price a network's discovered balances
pub fn apply_prices(balances: &NetworkBalances, prices: &PriceMap) -> NetworkSnapshot {
    let holdings = price_balances(&balances.balances, prices);
    NetworkSnapshot {
        network: balances.network,
        address: balances.address.clone(),
        total_usd: total_usd(&holdings),
        holdings,
    }
}

impl NetworkSnapshot {
    /// Re-value the same balances against another price map
    pub fn reprice(&self, prices: &PriceMap) -> NetworkSnapshot {
        let holdings: Vec<TokenHolding> = self
            .holdings
            .iter()
            .map(|h| price_balance(&h.balance, prices))
            .collect();
        NetworkSnapshot {
            network: self.network,
            address: self.address.clone(),
            total_usd: total_usd(&holdings),
            holdings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::token;
    use crate::types::Network;

    const TRACKED: &str = "0x7eb417637a3e6d1c19e6d69158c47610b7a5d9b3";

    fn balance(symbol: &str, raw: &str, decimals: u8) -> TokenBalance {
        let address = format!("0x{:0>40}", symbol.len());
        TokenBalance::from_raw(token(&address, symbol, decimals), raw.to_string(), Network::Arbitrum).unwrap()
    }

    fn prices(entries: &[(&str, f64)]) -> PriceMap {
        let mut map = PriceMap::default();
        for (symbol, price) in entries {
            map.insert(symbol, *price);
        }
        map
    }

    fn network(balances: Vec<TokenBalance>) -> NetworkBalances {
        NetworkBalances {
            network: Network::Arbitrum,
            address: TRACKED.to_string(),
            balances,
        }
    }

    #[test]
    fn test_usdc_weth_scenario() {
        let balances = network(vec![
            balance("USDC", "1000000", 6),
            balance("WETH", "500000000000000000", 18),
        ]);
        let snapshot = apply_prices(&balances, &prices(&[("USDC", 1.0), ("WETH", 3000.0)]));

        assert_eq!(snapshot.holdings[0].balance.amount, 1.0);
        assert_eq!(snapshot.holdings[1].balance.amount, 0.5);
        assert_eq!(snapshot.holdings[0].usd_value, 1.0);
        assert_eq!(snapshot.holdings[1].usd_value, 1500.0);
        assert_eq!(snapshot.total_usd, 1501.0);
        assert_eq!(snapshot.token_count(), 2);
    }

    #[test]
    fn test_unpriced_symbol_is_zero() {
        let balances = network(vec![balance("SHIB", "1000", 0), balance("USDC", "2000000", 6)]);
        let snapshot = apply_prices(&balances, &prices(&[("USDC", 1.0)]));

        assert_eq!(snapshot.holdings[0].usd_value, 0.0);
        assert_eq!(snapshot.total_usd, 2.0);
    }

    #[test]
    fn test_resolution_fallbacks_apply() {
        let balances = network(vec![balance("btc.b", "100000000", 8), balance("weth", "1000000000000000000", 18)]);
        let snapshot = apply_prices(&balances, &prices(&[("BTC", 75000.0), ("WETH", 3000.0)]));

        assert_eq!(snapshot.holdings[0].usd_value, 75000.0);
        assert_eq!(snapshot.holdings[1].usd_value, 3000.0);
    }

    #[test]
    fn test_total_matches_sum_of_holdings() {
        let balances = network(vec![
            balance("USDC", "123456789", 6),
            balance("WETH", "987654321000000000", 18),
            balance("ARB", "31415926535897932384", 18),
            balance("GMX", "2718281828459045235", 18),
        ]);
        let map = prices(&[("USDC", 0.9998), ("WETH", 3123.45), ("ARB", 0.27), ("GMX", 24.1)]);
        let snapshot = apply_prices(&balances, &map);

        let sum: f64 = snapshot.holdings.iter().map(|h| h.usd_value).sum();
        assert_eq!(snapshot.total_usd, sum);
        assert!(snapshot.holdings.iter().all(|h| h.usd_value >= 0.0));
    }

    #[test]
    fn test_reprice_is_idempotent() {
        let balances = network(vec![balance("USDC", "1000000", 6), balance("GMX", "3000000000000000000", 18)]);
        let map = prices(&[("USDC", 1.0), ("GMX", 12.0)]);

        let once = apply_prices(&balances, &map);
        let twice = once.reprice(&map);
        assert_eq!(once, twice);

        let cheaper = once.reprice(&prices(&[("USDC", 1.0), ("GMX", 10.0)]));
        assert_eq!(cheaper.total_usd, 31.0);
    }

    #[test]
    fn test_empty_network() {
        let snapshot = apply_prices(&NetworkBalances::empty(Network::Avalanche, TRACKED), &PriceMap::default());
        assert_eq!(snapshot, NetworkSnapshot::empty(Network::Avalanche, TRACKED));
    }
}

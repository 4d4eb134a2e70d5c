//! Configuration for the buyback tracker

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::constants;
use crate::tables::PriceTables;
use crate::types::{Network, TokenDescriptor};

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml. Every section is optional; missing
/// values fall back to the built-in GMX buyback contracts.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub arbitrum: Option<NetworkSection>,
    #[serde(default)]
    pub avalanche: Option<NetworkSection>,
    #[serde(default)]
    pub price_feed: Option<PriceFeedSection>,
    #[serde(default)]
    pub tables: Option<TablesSection>,
}

/// API keys section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub arbiscan: Option<String>,
    #[serde(default)]
    pub snowscan: Option<String>,
    #[serde(default)]
    pub coingecko: Option<String>,
}

/// Per-network overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSection {
    /// Explorer API endpoint (Etherscan-compatible)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Contract whose holdings are tracked
    #[serde(default)]
    pub tracked_address: Option<String>,
    /// Governance token contract on this network
    #[serde(default)]
    pub governance_token: Option<String>,
    /// Replaces the built-in buyback token list when present
    #[serde(default)]
    pub buyback_tokens: Option<Vec<TokenDescriptor>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceFeedSection {
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Entries merged over the built-in price tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesSection {
    #[serde(default)]
    pub symbol_ids: HashMap<String, String>,
    #[serde(default)]
    pub fallback_prices: BTreeMap<String, f64>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Invalid config. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (strings vs numbers, decimals must be 0-255)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

/// API keys passed on the command line or via environment; take precedence
/// over the file.
#[derive(Debug, Clone, Default)]
pub struct KeyOverrides {
    pub arbiscan: Option<String>,
    pub snowscan: Option<String>,
    pub coingecko: Option<String>,
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// One tracked contract and the explorer that indexes it
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub network: Network,
    /// Explorer API endpoint
    pub api_base: String,
    /// Explorer API key
    pub api_key: Option<String>,
    /// Tracked contract address
    pub tracked_address: String,
    /// Governance token contract address
    pub governance_token: String,
    /// Buyback tokens checked directly (not via discovery)
    pub buyback_tokens: Vec<TokenDescriptor>,
}

/// Main configuration struct with validated values
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub arbitrum: NetworkConfig,
    pub avalanche: NetworkConfig,
    /// CoinGecko API base URL
    pub price_feed_api_base: String,
    /// CoinGecko demo API key
    pub coingecko_api_key: Option<String>,
    /// Symbol → feed id table, fallback prices, governance token ids
    pub tables: PriceTables,
}

impl Config {
    /// Built-in configuration with no API keys
    pub fn defaults() -> Result<Self> {
        Self::from_file(&FileConfig::default(), KeyOverrides::default())
    }

    /// Create config from file config and command-line key overrides
    pub fn from_file(file_config: &FileConfig, keys: KeyOverrides) -> Result<Self> {
        let file_keys = &file_config.api_keys;

        let arbitrum = network_config(
            Network::Arbitrum,
            file_config.arbitrum.as_ref(),
            keys.arbiscan.or_else(|| file_keys.arbiscan.clone()),
        )?;
        let avalanche = network_config(
            Network::Avalanche,
            file_config.avalanche.as_ref(),
            keys.snowscan.or_else(|| file_keys.snowscan.clone()),
        )?;

        let mut tables = PriceTables::default();
        if let Some(section) = &file_config.tables {
            for (symbol, price) in &section.fallback_prices {
                if !price.is_finite() || *price < 0.0 {
                    anyhow::bail!("Invalid fallback price for {}: {}", symbol, price);
                }
            }
            tables.extend(section.symbol_ids.clone(), section.fallback_prices.clone());
        }

        let price_feed_api_base = file_config
            .price_feed
            .as_ref()
            .and_then(|p| p.api_base.clone())
            .unwrap_or_else(|| constants::COINGECKO_API_BASE.to_string());

        Ok(Self {
            arbitrum,
            avalanche,
            price_feed_api_base,
            coingecko_api_key: non_empty(keys.coingecko.or_else(|| file_keys.coingecko.clone())),
            tables,
        })
    }

    /// Load from an explicit path, else `config.toml` in the working directory
    /// if present, else built-in defaults
    pub fn load(path: Option<&Path>, keys: KeyOverrides) -> Result<Self> {
        let file_config = match path {
            Some(path) => FileConfig::load(path)?,
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    FileConfig::load(default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::from_file(&file_config, keys)
    }

    pub fn network(&self, network: Network) -> &NetworkConfig {
        match network {
            Network::Arbitrum => &self.arbitrum,
            Network::Avalanche => &self.avalanche,
        }
    }

    /// Both tracked contracts, Arbitrum first
    pub fn tracked_addresses(&self) -> [&str; 2] {
        [
            self.arbitrum.tracked_address.as_str(),
            self.avalanche.tracked_address.as_str(),
        ]
    }
}

fn network_config(network: Network, section: Option<&NetworkSection>, api_key: Option<String>) -> Result<NetworkConfig> {
    let section = section.cloned().unwrap_or_default();

    let (default_api_base, default_tracked, default_governance) = match network {
        Network::Arbitrum => (
            constants::ARBISCAN_API_BASE,
            constants::ARBITRUM_CONTRACT,
            constants::ARBITRUM_GMX,
        ),
        Network::Avalanche => (
            constants::SNOWSCAN_API_BASE,
            constants::AVALANCHE_CONTRACT,
            constants::AVALANCHE_GMX,
        ),
    };

    let tracked_address = section.tracked_address.unwrap_or_else(|| default_tracked.to_string());
    validate_address(&tracked_address).with_context(|| format!("Invalid {}.tracked_address", network))?;

    let governance_token = section
        .governance_token
        .unwrap_or_else(|| default_governance.to_string());
    validate_address(&governance_token).with_context(|| format!("Invalid {}.governance_token", network))?;

    let buyback_tokens = section
        .buyback_tokens
        .unwrap_or_else(|| default_buyback_tokens(network));
    for token in &buyback_tokens {
        validate_address(&token.address)
            .with_context(|| format!("Invalid {}.buyback_tokens address for {}", network, token.symbol))?;
    }

    Ok(NetworkConfig {
        network,
        api_base: section.api_base.unwrap_or_else(|| default_api_base.to_string()),
        api_key: non_empty(api_key),
        tracked_address,
        governance_token,
        buyback_tokens,
    })
}

/// `0x` followed by 40 hex digits
fn validate_address(address: &str) -> Result<()> {
    let Some(hex) = address.strip_prefix("0x") else {
        anyhow::bail!("Address must start with 0x: {}", address);
    };
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        anyhow::bail!("Address must be 40 hex digits: {}", address);
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tokens the buyback contracts receive, checked directly each cycle
pub fn default_buyback_tokens(network: Network) -> Vec<TokenDescriptor> {
    let tokens: &[(&str, &str, &str, u8)] = match network {
        Network::Arbitrum => &[
            ("0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8", "USDC", "USD Coin", 6),
            ("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9", "USDT", "Tether USD", 6),
            ("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "WETH", "Wrapped Ether", 18),
            ("0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f", "WBTC", "Wrapped Bitcoin", 8),
        ],
        Network::Avalanche => &[
            ("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E", "USDC", "USD Coin", 6),
            ("0x9702230A8Ea53601f5cD2dc00fDBc13d4dF4A8c7", "USDT", "Tether USD", 6),
            ("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7", "WAVAX", "Wrapped AVAX", 18),
            ("0x152b9d0FdC40C096757F570A51E494bd4b943E50", "BTC.b", "Bitcoin.b", 8),
            ("0x50b7545627a5162F82A992c33b87aDc75187B218", "WBTC.e", "Wrapped Bitcoin", 8),
        ],
    };

    tokens
        .iter()
        .map(|(address, symbol, name, decimals)| TokenDescriptor {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals: *decimals,
        })
        .collect()
}

//! Addresses, endpoints and defaults for the tracked buyback contracts

// =============================================================================
// Tracked Contracts
// =============================================================================

/// Buyback contract on Arbitrum
pub const ARBITRUM_CONTRACT: &str = "0x7eb417637a3e6d1c19e6d69158c47610b7a5d9b3";

/// Buyback contract on Avalanche
pub const AVALANCHE_CONTRACT: &str = "0x1a3a103f9f536a0456c9b205152a3ac2b3c54490";

// =============================================================================
// Governance Token (GMX)
// =============================================================================

pub const GOVERNANCE_SYMBOL: &str = "GMX";
pub const GOVERNANCE_FEED_ID: &str = "gmx";
pub const GOVERNANCE_DECIMALS: u8 = 18;

pub const ARBITRUM_GMX: &str = "0xfc5a1a6eb076a2c7ad06ed22c90d7e710e35ad0a";
pub const AVALANCHE_GMX: &str = "0x62edc0692bd897d2295872a9ffcac5425011c661";

// =============================================================================
// External APIs
// =============================================================================

/// Etherscan-compatible explorer endpoints
pub const ARBISCAN_API_BASE: &str = "https://api.arbiscan.io/api";
pub const SNOWSCAN_API_BASE: &str = "https://api.snowscan.xyz/api";

/// CoinGecko API
pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";
pub const COINGECKO_SIMPLE_PRICE: &str = "/simple/price";

/// Explorer status value for a successful call
pub const EXPLORER_STATUS_OK: &str = "1";

// =============================================================================
// HTTP
// =============================================================================

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";

/// CSV export filenames
pub const HOLDINGS_CSV_FILENAME: &str = "holdings.csv";
pub const OUTFLOWS_CSV_FILENAME: &str = "gmx_outflows.csv";

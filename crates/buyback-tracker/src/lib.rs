//! GMX buyback tracker
//!
//! Discovers and values the token holdings of the GMX buyback contracts on
//! Arbitrum and Avalanche, and tracks GMX sent out of them.

pub mod aggregate;
pub mod amounts;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod governance;
pub mod http;
pub mod indexer;
pub mod prices;
pub mod report;
pub mod symbols;
pub mod tables;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tracker;
pub mod types;
pub mod valuation;

pub use config::{Config, FileConfig, KeyOverrides};
pub use governance::GovernanceOverview;
pub use tracker::{Dashboard, FullPortfolio, Tracker};
pub use types::{Network, NetworkSnapshot, TokenHolding};

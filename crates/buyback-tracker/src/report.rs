//! Report output (console summary and CSV)

use anyhow::Result;
use csv::Writer;
use std::io::Write;

use crate::governance::GovernanceOverview;
use crate::tracker::FullPortfolio;
use crate::types::{NetworkSnapshot, TokenHolding, TokenTransaction};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "  ─────────────────────────────────────────────";

/// Print the governance token overview to stdout
pub fn print_overview(overview: &GovernanceOverview) {
    println!("\n{}", RULE);
    println!("                 GMX BUYBACK OVERVIEW");
    println!("{}\n", RULE);

    println!("PRICE:");
    println!("  GMX:                            ${:>10.2}", overview.price);

    println!("\nBALANCES:");
    if overview.balances.is_empty() {
        println!("  (no balances reported)");
    }
    for balance in &overview.balances {
        println!(
            "  {:<10} {:>18.4} GMX    ${:>12.2}",
            balance.network.as_str(),
            balance.amount,
            balance.usd_value
        );
    }
    println!("{}", THIN_RULE);
    println!(
        "  Total:     {:>18.4} GMX    ${:>12.2}",
        overview.total_balance(),
        overview.total_usd()
    );

    println!("\nOUTFLOWS:");
    println!("  Transactions:                   {:>11}", overview.outflow_transactions.len());
    println!("  Total Sent:           {:>17.4} GMX", overview.total_outflow());
    for tx in overview.outflow_transactions.iter().take(10) {
        let date = tx
            .timestamp_utc()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "  {}  {:<10} {:>14.4}  {}",
            date,
            tx.network.as_str(),
            tx.amount,
            short_hash(&tx.hash)
        );
    }
    if overview.outflow_transactions.len() > 10 {
        println!("  ... {} more", overview.outflow_transactions.len() - 10);
    }
    println!("{}", RULE);
}

/// Print the full portfolio to stdout
pub fn print_portfolio(portfolio: &FullPortfolio) {
    println!("\n{}", RULE);
    println!("                 GMX BUYBACK PORTFOLIO");
    println!("{}", RULE);

    print_network(&portfolio.arbitrum);
    print_network(&portfolio.avalanche);

    println!("\nCOMMON TOKENS:");
    print_holdings(&portfolio.common_tokens, true);
    println!("{}", THIN_RULE);
    println!("  Total:                          ${:>12.2}", portfolio.common_tokens_total_usd());

    println!("\nBUYBACK TOKENS:");
    print_holdings(&portfolio.buyback_tokens, true);
    println!("{}", THIN_RULE);
    println!("  Total:                          ${:>12.2}", portfolio.buyback_total_usd());

    println!("\nCOMBINED:");
    println!("  Tokens:                         {:>13}", portfolio.combined.token_count);
    println!("  Total Value:                    ${:>12.2}", portfolio.combined.total_usd);
    if !portfolio.fallback_priced.is_empty() {
        println!("\n  Fallback prices used for: {}", portfolio.fallback_priced.join(", "));
    }
    println!("{}", RULE);
}

fn print_network(snapshot: &NetworkSnapshot) {
    println!("\n{} ({}):", snapshot.network.as_str().to_uppercase(), snapshot.address);
    print_holdings(&snapshot.holdings, false);
    println!("{}", THIN_RULE);
    println!(
        "  Total ({} tokens):{:>14}${:>12.2}",
        snapshot.token_count(),
        "",
        snapshot.total_usd
    );
}

fn print_holdings(holdings: &[TokenHolding], with_network: bool) {
    if holdings.is_empty() {
        println!("  (none)");
    }
    for holding in by_usd_value(holdings) {
        let label = if with_network {
            format!("{} ({})", holding.symbol(), holding.network().as_str())
        } else {
            holding.symbol().to_string()
        };
        println!(
            "  {:<22} {:>18.4}  ${:>12.2}",
            label, holding.balance.amount, holding.usd_value
        );
    }
}

/// Highest USD value first; ties keep their input order
fn by_usd_value(holdings: &[TokenHolding]) -> Vec<&TokenHolding> {
    let mut sorted: Vec<&TokenHolding> = holdings.iter().collect();
    sorted.sort_by(|a, b| b.usd_value.total_cmp(&a.usd_value));
    sorted
}

fn short_hash(hash: &str) -> &str {
    hash.get(..18).unwrap_or(hash)
}

/// Write every holding in the portfolio as CSV. `Category` distinguishes
/// discovered holdings from the buyback allowlist rows.
pub fn write_holdings_csv<W: Write>(writer: W, portfolio: &FullPortfolio) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record([
        "Category",
        "Network",
        "Symbol",
        "Name",
        "Token_Address",
        "Decimals",
        "Raw_Balance",
        "Amount",
        "USD_Value",
    ])?;

    let discovered = portfolio
        .arbitrum
        .holdings
        .iter()
        .chain(portfolio.avalanche.holdings.iter())
        .map(|h| ("Discovered", h));
    let buyback = portfolio.buyback_tokens.iter().map(|h| ("Buyback", h));

    for (category, holding) in discovered.chain(buyback) {
        let balance = &holding.balance;
        wtr.write_record([
            category,
            balance.network.as_str(),
            &balance.token.symbol,
            &balance.token.name,
            &balance.token.address,
            &balance.token.decimals.to_string(),
            &balance.raw_balance,
            &format!("{:.6}", balance.amount),
            &format!("{:.2}", holding.usd_value),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write governance token outflows as CSV
pub fn write_outflows_csv<W: Write>(writer: W, transactions: &[TokenTransaction]) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record([
        "Date",
        "Network",
        "Block",
        "Tx_Hash",
        "From",
        "To",
        "Symbol",
        "Amount",
    ])?;

    for tx in transactions {
        let date = tx
            .timestamp_utc()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
        wtr.write_record([
            date.as_str(),
            tx.network.as_str(),
            &tx.block_number.to_string(),
            &tx.hash,
            &tx.from,
            &tx.to,
            &tx.token_symbol,
            &format!("{:.6}", tx.amount),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

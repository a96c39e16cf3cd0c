mod analysis;
mod config;
mod loader;
mod models;
mod report;
mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::analysis::insights::cost_coverage_pct;
use crate::analysis::rollup;
use crate::config::AppConfig;
use crate::loader::cleaner::parse_date;
use crate::report::Analyzer;
use crate::utils::{fmt_currency, fmt_float, fmt_int, fmt_pct};

#[derive(Parser)]
#[command(name = "promo-insights", about = "Retail promotion analytics over POS coupon extracts", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,

    /// Window start, dd/mm/yyyy or ISO (default: earliest promotion start)
    #[arg(long, global = true)]
    from: Option<String>,

    /// Window end, dd/mm/yyyy or ISO (default: latest promotion end)
    #[arg(long, global = true)]
    to: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List promotions available in the selected window
    Promotions,

    /// Promotion-level KPIs: coupons, revenue, profit vs. target
    Insights {
        /// Grouped promotion name, e.g. "TABLOIDE 29 A 10"
        #[arg(short, long)]
        promotion: String,
    },

    /// Per-family rollup for one store
    Stores {
        #[arg(short, long)]
        promotion: String,

        /// Store id as it appears in the extracts
        #[arg(short, long)]
        store: String,

        /// Keep only the top-N families by quantity sold
        #[arg(long)]
        top: Option<usize>,
    },

    /// Statistics for one product family in one store
    Product {
        #[arg(short, long)]
        promotion: String,

        #[arg(short, long)]
        store: String,

        #[arg(short, long)]
        family: String,
    },

    /// ABC revenue classification for a promotion's full catalog
    Abc {
        #[arg(short, long)]
        promotion: String,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    parse_date(s).with_context(|| format!("Unparseable date {:?} (expected dd/mm/yyyy or ISO)", s))
}

/// Resolve the selection window: explicit flags win, otherwise the full span
/// of the treated report.
fn window(cli: &Cli, rows: &[models::ReportRow]) -> Result<(NaiveDate, NaiveDate)> {
    let min = rows.iter().map(|r| r.start).min();
    let max = rows.iter().map(|r| r.end).max();

    let from = match &cli.from {
        Some(s) => parse_date_arg(s)?,
        None => min.unwrap_or(NaiveDate::MIN),
    };
    let to = match &cli.to {
        Some(s) => parse_date_arg(s)?,
        None => max.unwrap_or(NaiveDate::MAX),
    };
    Ok((from, to))
}

/// Text listing for the promotions command. An empty catalog means no
/// treated report was loaded at all — saying so beats echoing the sentinel
/// MIN/MAX window bounds.
fn render_promotions(
    catalog_empty: bool,
    promos: &[models::Promotion],
    from: NaiveDate,
    to: NaiveDate,
) -> String {
    if catalog_empty {
        return "No promotions loaded — treated report is missing or empty.".to_string();
    }
    if promos.is_empty() {
        return format!("No promotions between {} and {}.", from, to);
    }
    let mut out = format!("{} promotions:", promos.len());
    for p in promos {
        out.push_str(&format!("\n  {}", p.label));
    }
    out
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "promo_insights=info,warn",
        1 => "promo_insights=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let analyzer = Analyzer::new(config);
    let rows = analyzer.report_rows()?;
    let (from, to) = window(&cli, &rows)?;

    match &cli.command {
        Command::Promotions => {
            let _t = utils::Timer::start("Promotion listing");
            let promos = analyzer.promotions(from, to)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&promos)?);
            } else {
                println!("{}", render_promotions(rows.is_empty(), &promos, from, to));
            }
        }

        Command::Insights { promotion } => {
            let _t = utils::Timer::start("Promotion insights");
            let promo = analyzer.find_promotion(promotion, from, to)?;
            let report = analyzer.promotion_report(&promo)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report.insights)?);
            } else {
                print_insights(&report);
            }
        }

        Command::Stores { promotion, store, top } => {
            let _t = utils::Timer::start("Store rollup");
            let promo = analyzer.find_promotion(promotion, from, to)?;
            let report = analyzer.promotion_report(&promo)?;
            let store_report = analyzer.store_report(&report, store);

            let items = match top {
                Some(n) => rollup::top_by(&store_report.items, *n, |r| r.quantity_sold),
                None => store_report.items.clone(),
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print_store_rollup(&store_report.store_name, &items);
            }
        }

        Command::Product { promotion, store, family } => {
            let _t = utils::Timer::start("Product statistics");
            let promo = analyzer.find_promotion(promotion, from, to)?;
            let report = analyzer.promotion_report(&promo)?;
            let stats = analyzer.product_report(&report, store, family);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_product_stats(&stats);
            }
        }

        Command::Abc { promotion } => {
            let _t = utils::Timer::start("ABC classification");
            let promo = analyzer.find_promotion(promotion, from, to)?;
            let report = analyzer.promotion_report(&promo)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report.abc)?);
            } else {
                print_abc(&report.promotion.label, &report.abc);
            }
        }
    }

    Ok(())
}

// ── Text rendering ────────────────────────────────────────────────────────────

fn print_insights(report: &report::PromotionReport) {
    let k = &report.insights;
    let pricing = match report.pricing {
        models::PricingModel::Uniform => "uniform (single chain-wide price list)",
        models::PricingModel::Mixed => "mixed (per-store price variants)",
    };

    println!("─────────────────────────────────────────────");
    println!("  {}", report.promotion.label);
    println!("─────────────────────────────────────────────");
    println!("  Pricing model    : {}", pricing);
    println!("  Coupons activated: {}", fmt_int(k.coupons_activated as i64));
    println!("  Distinct items   : {}", fmt_int(k.distinct_families as i64));
    println!("  Units sold       : {}", fmt_float(k.units_sold));
    println!("  Total discount   : {}", fmt_currency(k.total_discount));
    println!("  Flyer fee        : {}", fmt_currency(k.flyer_fee));
    println!("  Total cost       : {}", fmt_currency(k.total_cost));
    println!("  Gross revenue    : {}", fmt_currency(k.gross_revenue));
    println!("  Gross profit     : {}", fmt_currency(k.gross_profit));
    println!("  Profit target    : {}", fmt_currency(k.profit_target));
    let arrow = if k.target_delta < 0.0 { "📉" } else { "📈" };
    println!(
        "  Net profit {}    : {} (Δ target {})",
        arrow,
        fmt_currency(k.net_profit),
        fmt_currency(k.target_delta)
    );

    match cost_coverage_pct(k) {
        Some(pct) if k.net_profit >= k.total_cost => println!(
            "  Net profit covered total cost, {} above it.",
            fmt_pct(pct)
        ),
        Some(pct) => println!(
            "  Net profit fell short of total cost by {}.",
            fmt_pct(pct.abs())
        ),
        None => println!("  Cost coverage: n/a (zero total cost)."),
    }
    println!("  Active selling days in period: {}", report.active_day_count);
    println!("─────────────────────────────────────────────");
}

fn print_store_rollup(store_name: &str, items: &[models::StoreItemRollup]) {
    println!("🏬 {}", store_name);
    if items.is_empty() {
        println!("  No sales for this store in the period.");
        return;
    }
    println!(
        "  {:<30} {:>10} {:>8} {:>10} {:>12} {:>10}",
        "Item", "Qty", "Days", "Activated", "Revenue", "Days %"
    );
    for item in items {
        println!(
            "  {:<30} {:>10} {:>8} {:>10} {:>12} {:>10}",
            item.family,
            fmt_float(item.quantity_sold),
            item.days_with_sale,
            item.times_activated,
            fmt_currency(item.revenue),
            fmt_pct(item.days_activated_pct),
        );
    }
}

fn print_product_stats(stats: &models::ProductStats) {
    println!("📦 {}", stats.family);
    if let Some(class) = stats.abc_class {
        println!("  ABC class            : {}", class.as_str());
    }
    println!("  Units sold           : {}", fmt_float(stats.total_quantity));
    println!("  Times activated      : {}", fmt_int(stats.times_activated as i64));
    match &stats.best_day {
        Some(best) => println!(
            "  Best day             : {} ({}) — {} units",
            best.date.format("%d/%m/%Y"),
            best.weekday,
            fmt_float(best.quantity)
        ),
        None => println!("  Best day             : no sales in period"),
    }
    println!("  Mean units per day   : {}", fmt_float(stats.mean_daily_quantity));
    println!("  Days activated       : {}", fmt_pct(stats.days_activated_pct));
    println!("  Mean daily variation : {}", fmt_float(stats.mean_daily_variation));
    match stats.first_last_variation_pct {
        Some(pct) => println!("  First→last variation : {}", fmt_pct(pct)),
        None => println!("  First→last variation : n/a"),
    }
}

fn print_abc(label: &str, entries: &[models::AbcEntry]) {
    println!("ABC curve — {}", label);
    if entries.is_empty() {
        println!("  No sales in period.");
        return;
    }
    println!(
        "  {:<30} {:>10} {:>12} {:>10} {:>6}",
        "Item", "Qty", "Revenue", "Cum. %", "Class"
    );
    for e in entries {
        println!(
            "  {:<30} {:>10} {:>12} {:>10} {:>6}",
            e.family,
            fmt_float(e.quantity),
            fmt_currency(e.revenue),
            fmt_pct(e.cumulative_pct),
            e.class.as_str(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_promotions_empty_catalog() {
        let text = render_promotions(true, &[], NaiveDate::MIN, NaiveDate::MAX);
        assert_eq!(
            text,
            "No promotions loaded — treated report is missing or empty."
        );
        // The sentinel window bounds must not leak into the message.
        assert!(!text.contains("-262143"));
    }

    #[test]
    fn test_render_promotions_empty_window() {
        let from = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        let promo = models::Promotion {
            name: "TABLOIDE 5 A 9".into(),
            label: "TABLOIDE 5 A 9 - 05/08 A 09/08 - 2024".into(),
            start: from,
            end: to,
        };

        let text = render_promotions(false, &[], from, to);
        assert_eq!(text, "No promotions between 2024-08-01 and 2024-08-31.");

        let listed = render_promotions(false, std::slice::from_ref(&promo), from, to);
        assert!(listed.starts_with("1 promotions:"));
        assert!(listed.contains(&promo.label));
    }
}

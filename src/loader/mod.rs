//! CSV loader for the upstream promotion extracts.
//!
//! Two inputs, both semicolon-delimited with comma decimals:
//!   - the treated report (promotion catalog), one file;
//!   - monthly coupon files named "<prefix><MM>.csv", two-digit month,
//!     no year component.
//!
//! Missing files are a soft miss: the dashboard must degrade gracefully when
//! an extract has not been produced yet, so absence yields an empty table.
//! Missing *columns*, on the other hand, are a hard, typed error — the
//! upstream format is fixed and a renamed column is a real defect.

pub mod cleaner;

use crate::models::{Coupon, RawCouponRow, RawReportRow, ReportRow};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// Upstream extract column names (fixed by the POS export).
pub const COL_STORE: &str = "Loja";
pub const COL_COUPON: &str = "Num.Cupom";
pub const COL_FAMILY: &str = "Familia";
pub const COL_SKU: &str = "SKU";
pub const COL_DATE: &str = "Data Cupom";
pub const COL_QUANTITY: &str = "Quantidade Comprada";
pub const COL_PROMO_PRICE: &str = "Preco Venda Promocao";
pub const COL_UNIT_PRICE: &str = "Preco Venda Unidade";
pub const COL_COST: &str = "Custo Produto";
pub const COL_ACTIVATION: &str = "Ativacao Necessaria";
pub const COL_UNIT_DISCOUNT: &str = "Desconto Unitario";
pub const COL_DISCOUNT_PCT: &str = "Percentual Desconto";
pub const COL_TOTAL_DISCOUNT: &str = "Desconto Total";

pub const COL_PROMO_NAME: &str = "Nome Promocao";
pub const COL_START: &str = "Data Inicial";
pub const COL_END: &str = "Data Final";

const REQUIRED_COUPON_COLUMNS: &[&str] = &[
    COL_STORE,
    COL_COUPON,
    COL_FAMILY,
    COL_SKU,
    COL_DATE,
    COL_QUANTITY,
    COL_PROMO_PRICE,
    COL_COST,
    COL_ACTIVATION,
    COL_TOTAL_DISCOUNT,
];

const REQUIRED_REPORT_COLUMNS: &[&str] =
    &[COL_PROMO_NAME, COL_START, COL_END, COL_SKU, COL_STORE];

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("missing column {column:?} in {file:?}")]
    MissingColumn { file: PathBuf, column: String },
}

/// Header name → index map, validated against the required column list.
fn header_index(
    path: &Path,
    headers: &StringRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>> {
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    for col in required {
        if !index.contains_key(*col) {
            return Err(LoaderError::MissingColumn {
                file: path.to_path_buf(),
                column: (*col).to_string(),
            }
            .into());
        }
    }
    Ok(index)
}

fn field(record: &StringRecord, index: &HashMap<String, usize>, col: &str) -> Option<String> {
    index
        .get(col)
        .and_then(|&i| record.get(i))
        .map(|s| s.to_string())
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))
}

// ── Monthly coupon extracts ───────────────────────────────────────────────────

/// Load one monthly coupon file. A missing file is not an error: the
/// extract simply has not been produced, so an empty table is returned.
pub fn load_coupon_file(path: &Path) -> Result<Vec<Coupon>> {
    if !path.exists() {
        debug!("No extract at {:?} — treating as empty", path);
        return Ok(vec![]);
    }

    let mut reader = open_reader(path)?;
    let index = header_index(path, reader.headers()?, REQUIRED_COUPON_COLUMNS)?;

    let mut coupons = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let raw = RawCouponRow {
            store: field(&record, &index, COL_STORE),
            coupon_no: field(&record, &index, COL_COUPON),
            family: field(&record, &index, COL_FAMILY),
            sku: field(&record, &index, COL_SKU),
            date: field(&record, &index, COL_DATE),
            quantity: field(&record, &index, COL_QUANTITY),
            promo_price: field(&record, &index, COL_PROMO_PRICE),
            unit_price: field(&record, &index, COL_UNIT_PRICE),
            cost_price: field(&record, &index, COL_COST),
            activation_qty: field(&record, &index, COL_ACTIVATION),
            unit_discount: field(&record, &index, COL_UNIT_DISCOUNT),
            discount_pct: field(&record, &index, COL_DISCOUNT_PCT),
            total_discount: field(&record, &index, COL_TOTAL_DISCOUNT),
        };

        if let Some(coupon) = cleaner::raw_to_coupon(&raw) {
            coupons.push(coupon);
        } else {
            warn!("Row {} in {:?}: unusable — skipped", i + 1, path);
        }
    }

    info!("{:?}: {} coupon rows loaded", path, coupons.len());
    Ok(coupons)
}

/// Two-digit month tags covered by [start, end], deduplicated. The monthly
/// files carry no year, so a range spanning years maps onto the same files.
fn month_tags(start: NaiveDate, end: NaiveDate) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    let mut cursor = (start.year(), start.month());
    let last = (end.year(), end.month());

    while cursor <= last {
        tags.insert(format!("{:02}", cursor.1));
        cursor = if cursor.1 == 12 {
            (cursor.0 + 1, 1)
        } else {
            (cursor.0, cursor.1 + 1)
        };
    }
    tags
}

/// Load every monthly file covering the period. Absent months are skipped.
pub fn load_monthly(dir: &Path, prefix: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Coupon>> {
    let mut coupons = Vec::new();
    for tag in month_tags(start, end) {
        let path = dir.join(format!("{}{}.csv", prefix, tag));
        let mut month = load_coupon_file(&path)
            .with_context(|| format!("Failed to load monthly extract {:?}", path))?;
        coupons.append(&mut month);
    }
    info!(
        "{} coupon rows across period {} → {}",
        coupons.len(),
        start,
        end
    );
    Ok(coupons)
}

// ── Treated report ────────────────────────────────────────────────────────────

/// Load the treated report (promotion catalog). Same soft-miss policy.
pub fn load_report(path: &Path) -> Result<Vec<ReportRow>> {
    if !path.exists() {
        debug!("No treated report at {:?} — treating as empty", path);
        return Ok(vec![]);
    }

    let mut reader = open_reader(path)?;
    let index = header_index(path, reader.headers()?, REQUIRED_REPORT_COLUMNS)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {} in {:?}: {}", i + 1, path, e);
                continue;
            }
        };

        let raw = RawReportRow {
            promotion_name: field(&record, &index, COL_PROMO_NAME),
            start: field(&record, &index, COL_START),
            end: field(&record, &index, COL_END),
            sku: field(&record, &index, COL_SKU),
            store: field(&record, &index, COL_STORE),
        };

        if let Some(row) = cleaner::raw_to_report_row(&raw) {
            rows.push(row);
        }
    }

    info!("{:?}: {} report rows loaded", path, rows.len());
    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Promotion catalog and selection filters.
//!
//! The treated report names each campaign once per store
//! ("TABLOIDE 29 A 10 LOJA 1", "TABLOIDE 29 A 10 LOJA 2", …). Grouping on
//! the "TABLOIDE <n> A <n>" prefix folds those into a single chain-wide
//! campaign covering the union of the per-store date ranges.

use crate::models::{Coupon, Promotion, ReportRow};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Chain-wide campaign name: the "TABLOIDE <n> A <n>" prefix when the raw
/// name has that shape, otherwise the full trimmed name.
pub fn grouped_name(raw: &str) -> String {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() >= 4
        && tokens[0] == "TABLOIDE"
        && tokens[1].chars().all(|c| c.is_ascii_digit())
        && tokens[2] == "A"
        && tokens[3].chars().all(|c| c.is_ascii_digit())
    {
        return tokens[..4].join(" ");
    }
    raw.trim().to_string()
}

/// Display label: "<name> - <dd/mm> A <dd/mm> - <yyyy>".
fn label_for(name: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{} - {} A {} - {}",
        name,
        start.format("%d/%m"),
        end.format("%d/%m"),
        start.year()
    )
}

/// Promotions that start *and* end inside [from, to], grouped across stores.
/// Sorted by start date, then name.
pub fn promotions_in_period(rows: &[ReportRow], from: NaiveDate, to: NaiveDate) -> Vec<Promotion> {
    let mut grouped: BTreeMap<String, (NaiveDate, NaiveDate)> = BTreeMap::new();

    for row in rows {
        if row.start < from || row.end > to {
            continue;
        }
        let name = grouped_name(&row.promotion_name);
        grouped
            .entry(name)
            .and_modify(|(start, end)| {
                *start = (*start).min(row.start);
                *end = (*end).max(row.end);
            })
            .or_insert((row.start, row.end));
    }

    let mut promotions: Vec<Promotion> = grouped
        .into_iter()
        .map(|(name, (start, end))| Promotion {
            label: label_for(&name, start, end),
            name,
            start,
            end,
        })
        .collect();

    promotions.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
    promotions
}

// ── Coupon filters ────────────────────────────────────────────────────────────
//
// Pure filters returning owned sets; the caller owns sequencing. This
// replaces the original dashboard's page-level shared state.

/// Coupons dated inside [start, end], inclusive.
pub fn filter_by_period(coupons: &[Coupon], start: NaiveDate, end: NaiveDate) -> Vec<Coupon> {
    coupons
        .iter()
        .filter(|c| c.date >= start && c.date <= end)
        .cloned()
        .collect()
}

pub fn filter_by_store(coupons: &[Coupon], store: &str) -> Vec<Coupon> {
    coupons.iter().filter(|c| c.store == store).cloned().collect()
}

pub fn filter_by_family(coupons: &[Coupon], family: &str) -> Vec<Coupon> {
    coupons.iter().filter(|c| c.family == family).cloned().collect()
}

/// Distinct store ids present in a coupon set, ordered.
pub fn stores_present(coupons: &[Coupon]) -> Vec<String> {
    let mut stores: Vec<String> = coupons.iter().map(|c| c.store.clone()).collect();
    stores.sort();
    stores.dedup();
    stores
}

/// Distinct families present in a coupon set, ordered.
pub fn families_present(coupons: &[Coupon]) -> Vec<String> {
    let mut families: Vec<String> = coupons.iter().map(|c| c.family.clone()).collect();
    families.sort();
    families.dedup();
    families
}

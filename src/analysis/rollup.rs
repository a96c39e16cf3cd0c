//! Per-store and per-product rollups feeding the table and chart views.

use crate::models::{BestDay, Coupon, ProductStats, StoreItemRollup};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct coupons on which the purchased quantity met the activation
/// threshold.
fn count_activations(coupons: &[Coupon]) -> u64 {
    let activated: BTreeSet<&str> = coupons
        .iter()
        .filter(|c| c.quantity >= c.activation_qty)
        .map(|c| c.coupon_no.as_str())
        .collect();
    activated.len() as u64
}

/// Quantity sold per calendar day, date-ordered.
fn daily_quantities(coupons: &[Coupon]) -> BTreeMap<NaiveDate, f64> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for c in coupons {
        *per_day.entry(c.date).or_insert(0.0) += c.quantity;
    }
    per_day
}

fn pct_of_active_days(days_with_sale: usize, active_day_count: usize) -> f64 {
    if active_day_count == 0 {
        return 0.0;
    }
    days_with_sale as f64 / active_day_count as f64 * 100.0
}

// ── Per-store rollup ──────────────────────────────────────────────────────────

/// Per-family summary over one store's coupons. `active_day_count` is the
/// number of eligible selling days in the covering period. Output is
/// family-name ordered.
pub fn store_rollup(coupons: &[Coupon], active_day_count: usize) -> Vec<StoreItemRollup> {
    let mut by_family: BTreeMap<&str, Vec<&Coupon>> = BTreeMap::new();
    for c in coupons {
        by_family.entry(c.family.as_str()).or_default().push(c);
    }

    by_family
        .into_iter()
        .map(|(family, rows)| {
            let quantity_sold: f64 = rows.iter().map(|c| c.quantity).sum();
            let revenue: f64 = rows.iter().map(|c| c.quantity * c.promo_price).sum();
            let days: BTreeSet<NaiveDate> = rows.iter().map(|c| c.date).collect();
            let activated: BTreeSet<&str> = rows
                .iter()
                .filter(|c| c.quantity >= c.activation_qty)
                .map(|c| c.coupon_no.as_str())
                .collect();

            StoreItemRollup {
                family: family.to_string(),
                quantity_sold,
                days_with_sale: days.len() as u64,
                times_activated: activated.len() as u64,
                revenue,
                days_activated_pct: pct_of_active_days(days.len(), active_day_count),
            }
        })
        .collect()
}

/// Top-N rollup rows by a caller-chosen metric, descending. Feeds the
/// "top 15 items" chart views.
pub fn top_by<F>(rollups: &[StoreItemRollup], n: usize, key: F) -> Vec<StoreItemRollup>
where
    F: Fn(&StoreItemRollup) -> f64,
{
    let mut sorted: Vec<StoreItemRollup> = rollups.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(n);
    sorted
}

// ── Per-product statistics ────────────────────────────────────────────────────

/// Statistics for one store + family selection. `coupons` must already be
/// filtered to that selection; `active_day_count` covers the promotion
/// period.
pub fn product_stats(
    family: &str,
    coupons: &[Coupon],
    active_day_count: usize,
) -> ProductStats {
    let per_day = daily_quantities(coupons);
    let total_quantity: f64 = per_day.values().sum();

    let best_day = per_day
        .iter()
        // max_by keeps the later day on ties; prefer the earliest.
        .rev()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(&date, &quantity)| BestDay {
            date,
            quantity,
            weekday: date.format("%A").to_string(),
        });

    let mean_daily_quantity = if per_day.is_empty() {
        0.0
    } else {
        total_quantity / per_day.len() as f64
    };

    // Mean absolute change between consecutive sale days.
    let quantities: Vec<f64> = per_day.values().copied().collect();
    let mean_daily_variation = if quantities.len() > 1 {
        let diffs: f64 = quantities.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        diffs / (quantities.len() - 1) as f64
    } else {
        0.0
    };

    // First-to-last change is undefined with one sale day or a zero start.
    let first_last_variation_pct = match (quantities.first(), quantities.last()) {
        (Some(&first), Some(&last)) if quantities.len() > 1 && first > 0.0 => {
            Some((last - first) / first * 100.0)
        }
        _ => None,
    };

    ProductStats {
        family: family.to_string(),
        total_quantity,
        times_activated: count_activations(coupons),
        best_day,
        mean_daily_quantity,
        days_activated_pct: pct_of_active_days(per_day.len(), active_day_count),
        mean_daily_variation,
        first_last_variation_pct,
        abc_class: None,
    }
}

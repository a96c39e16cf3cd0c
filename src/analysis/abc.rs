//! ABC revenue classification over the full catalog for a period.
//!
//! Families are ranked by revenue (quantity × promotional price) and split
//! by cumulative revenue share: A up to the first boundary, B up to the
//! second, C past it. Ties in revenue break by family name so the ranking
//! is deterministic regardless of input order.

use crate::config::AbcConfig;
use crate::models::{AbcClass, AbcEntry, Coupon};
use std::collections::BTreeMap;

/// Rank every product family for the period and label its ABC class.
/// Uses the full (unfiltered-by-store) coupon set.
pub fn classify_abc(coupons: &[Coupon], config: &AbcConfig) -> Vec<AbcEntry> {
    // BTreeMap keeps families name-ordered, which is the tie-break order
    // after the stable sort by revenue below.
    let mut by_family: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for c in coupons {
        let entry = by_family.entry(c.family.as_str()).or_insert((0.0, 0.0));
        entry.0 += c.quantity;
        entry.1 += c.quantity * c.promo_price;
    }

    let total_revenue: f64 = by_family.values().map(|(_, r)| r).sum();

    let mut ranked: Vec<(&str, f64, f64)> = by_family
        .into_iter()
        .map(|(family, (qty, revenue))| (family, qty, revenue))
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut cumulative = 0.0;
    ranked
        .into_iter()
        .map(|(family, quantity, revenue)| {
            cumulative += revenue;
            // Zero catalog revenue leaves every share at 0, class A.
            let cumulative_pct = if total_revenue > 0.0 {
                cumulative / total_revenue * 100.0
            } else {
                0.0
            };
            AbcEntry {
                family: family.to_string(),
                quantity,
                revenue,
                cumulative_pct,
                class: class_for(cumulative_pct, config),
            }
        })
        .collect()
}

fn class_for(cumulative_pct: f64, config: &AbcConfig) -> AbcClass {
    if cumulative_pct <= config.class_a_pct {
        AbcClass::A
    } else if cumulative_pct <= config.class_b_pct {
        AbcClass::B
    } else {
        AbcClass::C
    }
}

/// ABC class of one family within a computed ranking.
pub fn class_of(entries: &[AbcEntry], family: &str) -> Option<AbcClass> {
    entries.iter().find(|e| e.family == family).map(|e| e.class)
}

//! Promotion cost classifier.
//!
//! The flyer is cheaper to produce when every SKU carries one promotional
//! price chain-wide; per-store price variants need per-store print runs and
//! cost more. The classifier inspects the per-SKU, per-store prices of a
//! promotion's coupon set and picks the fee tier.

use crate::config::FeeConfig;
use crate::models::{Coupon, PricingModel};
use std::collections::HashMap;

/// Price equality tolerance. Prices come from two-decimal extracts, so
/// anything below half a cent is the same price.
const PRICE_EPSILON: f64 = 0.005;

/// Classify a promotion's pricing: Uniform iff every SKU has one promotional
/// price across all stores that sold it. A SKU sold in a single store is
/// trivially uniform; an empty coupon set classifies as Uniform.
pub fn classify_pricing(coupons: &[Coupon]) -> PricingModel {
    // SKU → (store → promo price); last write per (SKU, store) wins, which
    // matches the extract where a pair repeats with the same price.
    let mut prices: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
    for coupon in coupons {
        prices
            .entry(coupon.sku.as_str())
            .or_default()
            .insert(coupon.store.as_str(), coupon.promo_price);
    }

    for stores in prices.values() {
        let mut iter = stores.values();
        let Some(&first) = iter.next() else { continue };
        if iter.any(|&p| (p - first).abs() > PRICE_EPSILON) {
            return PricingModel::Mixed;
        }
    }
    PricingModel::Uniform
}

/// Flat fee for the classified pricing model.
pub fn flyer_fee(model: PricingModel, fees: &FeeConfig) -> f64 {
    match model {
        PricingModel::Uniform => fees.uniform,
        PricingModel::Mixed => fees.mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn coupon(store: &str, sku: &str, promo_price: f64) -> Coupon {
        Coupon {
            store: store.into(),
            coupon_no: "1".into(),
            family: "FAM".into(),
            sku: sku.into(),
            date: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
            quantity: 1.0,
            promo_price,
            unit_price: None,
            cost_price: 0.0,
            activation_qty: 1.0,
            unit_discount: None,
            discount_pct: None,
            total_discount: 0.0,
        }
    }

    #[test]
    fn test_same_price_in_two_stores_is_uniform() {
        let coupons = vec![coupon("1", "555", 10.0), coupon("2", "555", 10.0)];
        assert_eq!(classify_pricing(&coupons), PricingModel::Uniform);
    }

    #[test]
    fn test_differing_price_is_mixed() {
        let coupons = vec![coupon("1", "555", 10.0), coupon("2", "555", 12.0)];
        assert_eq!(classify_pricing(&coupons), PricingModel::Mixed);
    }

    #[test]
    fn test_single_store_sku_is_trivially_uniform() {
        let coupons = vec![
            coupon("1", "555", 10.0),
            coupon("1", "777", 4.5),
            coupon("2", "777", 4.5),
        ];
        assert_eq!(classify_pricing(&coupons), PricingModel::Uniform);
    }

    #[test]
    fn test_one_divergent_sku_flips_the_tier() {
        let coupons = vec![
            coupon("1", "555", 10.0),
            coupon("2", "555", 10.0),
            coupon("1", "777", 4.5),
            coupon("2", "777", 4.99),
        ];
        assert_eq!(classify_pricing(&coupons), PricingModel::Mixed);
    }

    #[test]
    fn test_empty_set_is_uniform() {
        assert_eq!(classify_pricing(&[]), PricingModel::Uniform);
    }

    #[test]
    fn test_fee_tiers() {
        let fees = FeeConfig {
            uniform: 3600.0,
            mixed: 6400.0,
        };
        assert_eq!(flyer_fee(PricingModel::Uniform, &fees), 3600.0);
        assert_eq!(flyer_fee(PricingModel::Mixed, &fees), 6400.0);
    }
}

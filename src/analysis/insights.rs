//! Promotion-level KPI aggregation over a filtered coupon set.

use crate::models::{Coupon, PromotionInsights};
use std::collections::BTreeSet;

/// Compute the KPI set for one promotion + period.
///
/// `fee` is the classified flyer fee; `target_margin` derives the profit
/// target as total cost × (1 + margin). An empty coupon set yields zeros
/// (the fee still counts as cost — the flyer was printed either way).
pub fn promotion_insights(coupons: &[Coupon], fee: f64, target_margin: f64) -> PromotionInsights {
    let mut coupon_nos: BTreeSet<&str> = BTreeSet::new();
    let mut families: BTreeSet<&str> = BTreeSet::new();
    let mut units_sold = 0.0;
    let mut total_discount = 0.0;
    let mut gross_revenue = 0.0;
    let mut gross_profit = 0.0;

    for c in coupons {
        coupon_nos.insert(c.coupon_no.as_str());
        families.insert(c.family.as_str());
        units_sold += c.quantity;
        total_discount += c.total_discount;
        gross_revenue += c.quantity * c.promo_price;
        gross_profit += (c.promo_price - c.cost_price) * c.quantity;
    }

    let net_profit = gross_profit - fee - total_discount;
    let total_cost = total_discount + fee;
    let profit_target = total_cost * (1.0 + target_margin);

    PromotionInsights {
        coupons_activated: coupon_nos.len() as u64,
        distinct_families: families.len() as u64,
        units_sold,
        total_discount,
        gross_revenue,
        gross_profit,
        net_profit,
        flyer_fee: fee,
        total_cost,
        profit_target,
        target_delta: net_profit - profit_target,
    }
}

/// How far net profit landed above (positive) or below (negative) the total
/// cost, in percent. Undefined when the promotion cost nothing.
pub fn cost_coverage_pct(insights: &PromotionInsights) -> Option<f64> {
    if insights.total_cost == 0.0 {
        return None;
    }
    Some((insights.net_profit / insights.total_cost - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn coupon(coupon_no: &str, family: &str, qty: f64, price: f64, cost: f64, discount: f64) -> Coupon {
        Coupon {
            store: "1".into(),
            coupon_no: coupon_no.into(),
            family: family.into(),
            sku: "555".into(),
            date: NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
            quantity: qty,
            promo_price: price,
            unit_price: None,
            cost_price: cost,
            activation_qty: 1.0,
            unit_discount: None,
            discount_pct: None,
            total_discount: discount,
        }
    }

    #[test]
    fn test_kpi_identities() {
        let coupons = vec![
            coupon("100", "ARROZ", 2.0, 10.0, 7.0, 3.0),
            coupon("101", "FEIJAO", 1.0, 8.0, 5.0, 1.5),
            coupon("100", "ARROZ", 1.0, 10.0, 7.0, 1.5),
        ];
        let fee = 3600.0;
        let kpis = promotion_insights(&coupons, fee, 0.20);

        assert_eq!(kpis.coupons_activated, 2);
        assert_eq!(kpis.distinct_families, 2);
        assert_eq!(kpis.units_sold, 4.0);
        assert_eq!(kpis.total_discount, 6.0);
        assert_eq!(kpis.gross_revenue, 2.0 * 10.0 + 8.0 + 10.0);
        assert_eq!(kpis.gross_profit, 3.0 * 2.0 + 3.0 + 3.0);

        // Identities restated directly.
        assert_eq!(kpis.total_cost, kpis.total_discount + fee);
        assert_eq!(kpis.net_profit, kpis.gross_profit - kpis.total_cost);
        assert_eq!(kpis.profit_target, kpis.total_cost * 1.2);
        assert_eq!(kpis.target_delta, kpis.net_profit - kpis.profit_target);
    }

    #[test]
    fn test_empty_set_yields_zero_kpis() {
        let kpis = promotion_insights(&[], 0.0, 0.20);
        assert_eq!(kpis, PromotionInsights::default());
    }

    #[test]
    fn test_coverage_undefined_at_zero_cost() {
        let kpis = promotion_insights(&[], 0.0, 0.20);
        assert_eq!(cost_coverage_pct(&kpis), None);
    }

    #[test]
    fn test_coverage_pct() {
        let coupons = vec![coupon("1", "X", 10.0, 100.0, 10.0, 100.0)];
        // gross profit 900, fee 350 → net 450, cost 450 → coverage 0%.
        let kpis = promotion_insights(&coupons, 350.0, 0.20);
        assert_eq!(kpis.net_profit, 450.0);
        assert_eq!(kpis.total_cost, 450.0);
        assert_eq!(cost_coverage_pct(&kpis), Some(0.0));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Coupon line item ──────────────────────────────────────────────────────────

/// One coupon line from the monthly extracts. Immutable once loaded;
/// the extract file is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub store: String,
    pub coupon_no: String,
    pub family: String,
    pub sku: String,
    pub date: NaiveDate,
    pub quantity: f64,
    pub promo_price: f64,
    pub unit_price: Option<f64>,
    pub cost_price: f64,
    /// Minimum quantity required to trigger the promotional price.
    pub activation_qty: f64,
    pub unit_discount: Option<f64>,
    pub discount_pct: Option<f64>,
    pub total_discount: f64,
}

// ── Promotion catalog ─────────────────────────────────────────────────────────

/// A campaign derived from the treated report, grouped across stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    /// Grouped campaign name, e.g. "TABLOIDE 29 A 10".
    pub name: String,
    /// Display label: "TABLOIDE 29 A 10 - 29/07 A 10/08 - 2024".
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One row of the treated report (promotion catalog extract).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub promotion_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sku: String,
    pub store: String,
}

// ── Fee classification ────────────────────────────────────────────────────────

/// Whether a promotion used one promotional price per SKU across all stores.
/// Selects the flat fee assumed for producing the promotional flyer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PricingModel {
    Uniform,
    Mixed,
}

// ── Aggregate KPI set ─────────────────────────────────────────────────────────

/// Promotion-level KPIs for one campaign + period. Recomputed per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromotionInsights {
    pub coupons_activated: u64,
    pub distinct_families: u64,
    pub units_sold: f64,
    pub total_discount: f64,
    pub gross_revenue: f64,
    /// Cost basis may not reflect true landed cost; treat as indicative.
    pub gross_profit: f64,
    pub net_profit: f64,
    pub flyer_fee: f64,
    pub total_cost: f64,
    pub profit_target: f64,
    pub target_delta: f64,
}

// ── ABC classification ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }
}

/// One product family in the ABC revenue ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbcEntry {
    pub family: String,
    pub quantity: f64,
    pub revenue: f64,
    /// Cumulative revenue share, 0..=100.
    pub cumulative_pct: f64,
    pub class: AbcClass,
}

// ── Rollups ───────────────────────────────────────────────────────────────────

/// Per-family summary for one store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreItemRollup {
    pub family: String,
    pub quantity_sold: f64,
    /// Distinct calendar days with at least one sale.
    pub days_with_sale: u64,
    /// Distinct coupons where quantity met the activation threshold.
    pub times_activated: u64,
    pub revenue: f64,
    /// days_with_sale ÷ eligible active days × 100; 0.0 when no active days.
    pub days_activated_pct: f64,
}

/// Per-product statistics for one store + family selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductStats {
    pub family: String,
    pub total_quantity: f64,
    pub times_activated: u64,
    pub best_day: Option<BestDay>,
    /// Mean quantity over days that had at least one sale.
    pub mean_daily_quantity: f64,
    pub days_activated_pct: f64,
    /// Mean absolute quantity change between consecutive sale days.
    pub mean_daily_variation: f64,
    /// First-to-last sale day change in percent; None with fewer than two
    /// sale days or a zero first day.
    pub first_last_variation_pct: Option<f64>,
    pub abc_class: Option<AbcClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestDay {
    pub date: NaiveDate,
    pub quantity: f64,
    pub weekday: String,
}

// ── Raw CSV rows ──────────────────────────────────────────────────────────────

/// Monthly extract row as read, before cleaning. Semicolon-delimited,
/// comma decimals.
#[derive(Debug, Clone, Default)]
pub struct RawCouponRow {
    pub store: Option<String>,
    pub coupon_no: Option<String>,
    pub family: Option<String>,
    pub sku: Option<String>,
    pub date: Option<String>,
    pub quantity: Option<String>,
    pub promo_price: Option<String>,
    pub unit_price: Option<String>,
    pub cost_price: Option<String>,
    pub activation_qty: Option<String>,
    pub unit_discount: Option<String>,
    pub discount_pct: Option<String>,
    pub total_discount: Option<String>,
}

/// Treated report row as read, before cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawReportRow {
    pub promotion_name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub sku: Option<String>,
    pub store: Option<String>,
}

//! Field cleaning for the upstream extracts: semicolon-delimited CSV with
//! pt-BR comma decimals ("1.234,56") and dd/mm/YYYY dates.

use crate::models::{Coupon, RawCouponRow, RawReportRow, ReportRow};
use chrono::NaiveDate;
use tracing::warn;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse a pt-BR decimal: "1.234,56" → 1234.56. Plain dot decimals and
/// integers are accepted too.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "-" || s == "—" {
        return None;
    }

    // Comma present means pt-BR style: '.' groups thousands, ',' is decimal.
    let normalised = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };

    let cleaned: String = normalised
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

/// Parse dates: "29/07/2024" (extract format), ISO, or a timestamp prefix
/// like "2024-07-29 00:00:00".
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // Timestamp columns exported by pandas carry a time part.
    if let Some(date_part) = s.split_whitespace().next() {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(d);
        }
    }

    None
}

/// Non-empty trimmed string, or None.
fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// ── Monthly extract row → Coupon ──────────────────────────────────────────────

pub fn raw_to_coupon(row: &RawCouponRow) -> Option<Coupon> {
    let date_str = row.date.as_deref()?.trim();
    let Some(date) = parse_date(date_str) else {
        warn!("Unparseable coupon date {:?}", date_str);
        return None;
    };

    let store = clean_text(row.store.as_deref())?;
    let coupon_no = clean_text(row.coupon_no.as_deref())?;
    let family = clean_text(row.family.as_deref())?;
    let sku = clean_text(row.sku.as_deref())?;

    let quantity = row.quantity.as_deref().and_then(parse_decimal)?;
    let promo_price = row.promo_price.as_deref().and_then(parse_decimal)?;

    if promo_price < 0.0 || quantity < 0.0 {
        warn!(
            "Negative quantity/price for SKU {} on {} — skipping row",
            sku, date
        );
        return None;
    }

    Some(Coupon {
        store,
        coupon_no,
        family,
        sku,
        date,
        quantity,
        promo_price,
        unit_price: row.unit_price.as_deref().and_then(parse_decimal),
        cost_price: row.cost_price.as_deref().and_then(parse_decimal).unwrap_or(0.0),
        activation_qty: row
            .activation_qty
            .as_deref()
            .and_then(parse_decimal)
            .unwrap_or(1.0),
        unit_discount: row.unit_discount.as_deref().and_then(parse_decimal),
        discount_pct: row.discount_pct.as_deref().and_then(parse_decimal),
        total_discount: row
            .total_discount
            .as_deref()
            .and_then(parse_decimal)
            .unwrap_or(0.0),
    })
}

// ── Treated report row → ReportRow ────────────────────────────────────────────

pub fn raw_to_report_row(row: &RawReportRow) -> Option<ReportRow> {
    let promotion_name = clean_text(row.promotion_name.as_deref())?;
    let start = parse_date(row.start.as_deref()?)?;
    let end = parse_date(row.end.as_deref()?)?;

    if end < start {
        warn!(
            "Promotion {:?} ends before it starts ({} > {}) — skipping row",
            promotion_name, start, end
        );
        return None;
    }

    Some(ReportRow {
        promotion_name,
        start,
        end,
        sku: clean_text(row.sku.as_deref()).unwrap_or_default(),
        store: clean_text(row.store.as_deref()).unwrap_or_default(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal("10,00"), Some(10.0));
        assert_eq!(parse_decimal("3.50"), Some(3.5));
        assert_eq!(parse_decimal("42"), Some(42.0));
        assert_eq!(parse_decimal("-1,5"), Some(-1.5));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("N/A"), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 29).unwrap();
        assert_eq!(parse_date("29/07/2024"), Some(expected));
        assert_eq!(parse_date("2024-07-29"), Some(expected));
        assert_eq!(parse_date("2024-07-29 00:00:00"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_raw_to_coupon_minimal() {
        let raw = RawCouponRow {
            store: Some("1".into()),
            coupon_no: Some("123456".into()),
            family: Some("ARROZ".into()),
            sku: Some("789".into()),
            date: Some("05/08/2024".into()),
            quantity: Some("2,00".into()),
            promo_price: Some("10,50".into()),
            total_discount: Some("3,00".into()),
            ..Default::default()
        };
        let coupon = raw_to_coupon(&raw).unwrap();
        assert_eq!(coupon.quantity, 2.0);
        assert_eq!(coupon.promo_price, 10.5);
        assert_eq!(coupon.total_discount, 3.0);
        // Threshold defaults to 1 when the column is blank.
        assert_eq!(coupon.activation_qty, 1.0);
    }

    #[test]
    fn test_raw_to_coupon_rejects_missing_price() {
        let raw = RawCouponRow {
            store: Some("1".into()),
            coupon_no: Some("1".into()),
            family: Some("X".into()),
            sku: Some("1".into()),
            date: Some("05/08/2024".into()),
            quantity: Some("1".into()),
            promo_price: None,
            ..Default::default()
        };
        assert!(raw_to_coupon(&raw).is_none());
    }
}

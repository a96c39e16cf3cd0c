//! Report orchestrator: ties loader → filters → analysis together.
//!
//! Each method re-runs the full computation from the extract files — the
//! dashboard is stateless between interactions, so a report is always a pure
//! function of the files and the selection.

use crate::analysis::{abc, calendar, fee, insights, promotions, rollup};
use crate::config::AppConfig;
use crate::loader;
use crate::models::{
    AbcEntry, Coupon, PricingModel, ProductStats, Promotion, PromotionInsights, ReportRow,
    StoreItemRollup,
};
use anyhow::{Context, Result, bail};
use tracing::info;

/// Everything the insight view needs for one promotion + period.
#[derive(Debug, Clone)]
pub struct PromotionReport {
    pub promotion: Promotion,
    pub pricing: PricingModel,
    pub insights: PromotionInsights,
    pub abc: Vec<AbcEntry>,
    /// The filtered coupon set, passed on to the store/product views.
    pub coupons: Vec<Coupon>,
    /// Eligible selling days across the promotion window (insight display).
    pub active_day_count: usize,
}

/// Eligible selling days across the span actually covered by a coupon set,
/// first sale to last. The rollup views measure against days the data shows
/// the promotion was live, not the nominal window.
fn span_active_days(coupons: &[Coupon]) -> usize {
    let first = coupons.iter().map(|c| c.date).min();
    let last = coupons.iter().map(|c| c.date).max();
    match (first, last) {
        (Some(first), Some(last)) => calendar::active_days(first, last).len(),
        _ => 0,
    }
}

/// Per-store view: rollup rows plus the store's display name.
#[derive(Debug, Clone)]
pub struct StoreReport {
    pub store: String,
    pub store_name: String,
    pub items: Vec<StoreItemRollup>,
}

pub struct Analyzer {
    config: AppConfig,
}

impl Analyzer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The full treated report (promotion catalog extract).
    pub fn report_rows(&self) -> Result<Vec<ReportRow>> {
        loader::load_report(&self.config.data.report_path)
            .context("Failed to load treated report")
    }

    /// Promotions starting and ending inside the window.
    pub fn promotions(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Vec<Promotion>> {
        let rows = self.report_rows()?;
        Ok(promotions::promotions_in_period(&rows, from, to))
    }

    /// Find one promotion by grouped name inside the window.
    pub fn find_promotion(
        &self,
        name: &str,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> Result<Promotion> {
        let promos = self.promotions(from, to)?;
        let wanted = name.trim();
        match promos
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(wanted))
        {
            Some(p) => Ok(p),
            None => bail!("No promotion named {:?} between {} and {}", name, from, to),
        }
    }

    /// Build the full promotion report: load the covering months, filter to
    /// the promotion period, classify the fee, aggregate the KPIs, and rank
    /// the ABC curve over the unfiltered-by-store set.
    pub fn promotion_report(&self, promotion: &Promotion) -> Result<PromotionReport> {
        let monthly = loader::load_monthly(
            &self.config.data.monthly_dir,
            &self.config.data.monthly_prefix,
            promotion.start,
            promotion.end,
        )?;

        let coupons = promotions::filter_by_period(&monthly, promotion.start, promotion.end);
        info!(
            "{}: {} coupon rows in period",
            promotion.name,
            coupons.len()
        );

        let pricing = fee::classify_pricing(&coupons);
        let flyer_fee = fee::flyer_fee(pricing, &self.config.fees);
        let insights = insights::promotion_insights(
            &coupons,
            flyer_fee,
            self.config.insights.target_margin,
        );
        let abc = abc::classify_abc(&coupons, &self.config.abc);
        let active_day_count = calendar::active_days(promotion.start, promotion.end).len();

        Ok(PromotionReport {
            promotion: promotion.clone(),
            pricing,
            insights,
            abc,
            coupons,
            active_day_count,
        })
    }

    /// Per-family rollup for one store of an already-built report. The
    /// days-activated denominator is the store's own sale span: a store
    /// that only ran the promotion for two days is measured against those
    /// two days, not the chain-wide window.
    pub fn store_report(&self, report: &PromotionReport, store: &str) -> StoreReport {
        let store_coupons = promotions::filter_by_store(&report.coupons, store);
        let items = rollup::store_rollup(&store_coupons, span_active_days(&store_coupons));
        StoreReport {
            store: store.to_string(),
            store_name: self.config.store_name(store).to_string(),
            items,
        }
    }

    /// Product statistics for one store + family, with its ABC class from
    /// the report-wide ranking. The days-activated denominator spans the
    /// whole filtered set's sale dates.
    pub fn product_report(
        &self,
        report: &PromotionReport,
        store: &str,
        family: &str,
    ) -> ProductStats {
        let store_coupons = promotions::filter_by_store(&report.coupons, store);
        let family_coupons = promotions::filter_by_family(&store_coupons, family);
        let mut stats =
            rollup::product_stats(family, &family_coupons, span_active_days(&report.coupons));
        stats.abc_class = abc::class_of(&report.abc, family);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config_for(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.data.report_path = dir.join("relatorio_tratado.csv");
        config.data.monthly_dir = dir.to_path_buf();
        config
    }

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    const COUPON_HEADER: &str = "Loja;Num.Cupom;Familia;SKU;Data Cupom;Quantidade Comprada;Preco Venda Promocao;Preco Venda Unidade;Custo Produto;Ativacao Necessaria;Desconto Unitario;Percentual Desconto;Desconto Total";

    #[test]
    fn test_end_to_end_missing_files_yield_zero_kpis() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::new(config_for(dir.path()));

        // No treated report on disk → no promotions, not an error.
        let promos = analyzer
            .promotions(date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        assert!(promos.is_empty());

        // A promotion over months with no extracts → all-zero KPIs.
        let phantom = Promotion {
            name: "TABLOIDE 1 A 15".into(),
            label: "TABLOIDE 1 A 15 - 01/03 A 15/03 - 2024".into(),
            start: date(2024, 3, 1),
            end: date(2024, 3, 15),
        };
        let report = analyzer.promotion_report(&phantom).unwrap();
        assert_eq!(report.insights.units_sold, 0.0);
        assert_eq!(report.insights.coupons_activated, 0);
        assert!(report.abc.is_empty());
        // The flyer fee still registers as cost (uniform by vacuity).
        assert_eq!(report.pricing, PricingModel::Uniform);
        assert_eq!(report.insights.total_cost, report.insights.flyer_fee);
    }

    #[test]
    fn test_end_to_end_two_store_pricing() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "relatorio_tratado.csv",
            "Nome Promocao;Data Inicial;Data Final;SKU;Loja\n\
             TABLOIDE 5 A 9 LOJA 1;05/08/2024;09/08/2024;555;1\n\
             TABLOIDE 5 A 9 LOJA 2;05/08/2024;09/08/2024;555;2\n",
        );
        // Same SKU, same price in both stores → uniform tier.
        write_file(
            dir.path(),
            "dado_final-08.csv",
            &format!(
                "{}\n\
                 1;100;ARROZ;555;05/08/2024;2,00;10,00;;7,00;2;;;3,00\n\
                 2;200;ARROZ;555;06/08/2024;2,00;10,00;;7,00;2;;;3,00\n",
                COUPON_HEADER
            ),
        );

        let analyzer = Analyzer::new(config_for(dir.path()));
        let promo = analyzer
            .find_promotion("TABLOIDE 5 A 9", date(2024, 8, 1), date(2024, 8, 31))
            .unwrap();
        let report = analyzer.promotion_report(&promo).unwrap();

        assert_eq!(report.pricing, PricingModel::Uniform);
        assert_eq!(report.insights.flyer_fee, 3600.0);
        assert_eq!(report.insights.coupons_activated, 2);
        assert_eq!(report.insights.units_sold, 4.0);
        assert_eq!(report.insights.gross_revenue, 40.0);

        let store = analyzer.store_report(&report, "1");
        assert_eq!(store.store_name, "Espera Feliz 1");
        assert_eq!(store.items.len(), 1);
        assert_eq!(store.items[0].times_activated, 1);

        let stats = analyzer.product_report(&report, "1", "ARROZ");
        assert_eq!(stats.total_quantity, 2.0);
        // A single family holds 100% of cumulative revenue → class C.
        assert_eq!(stats.abc_class, Some(crate::models::AbcClass::C));
    }

    #[test]
    fn test_store_rollup_measured_against_store_sale_span() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "relatorio_tratado.csv",
            "Nome Promocao;Data Inicial;Data Final;SKU;Loja\n\
             TABLOIDE 1 A 14 LOJA 1;01/08/2024;14/08/2024;555;1\n",
        );
        // Store 1 sold on 01 and 02/08 only; the window runs two weeks.
        write_file(
            dir.path(),
            "dado_final-08.csv",
            &format!(
                "{}\n\
                 1;100;ARROZ;555;01/08/2024;2,00;10,00;;7,00;2;;;3,00\n\
                 1;101;ARROZ;555;02/08/2024;2,00;10,00;;7,00;2;;;3,00\n",
                COUPON_HEADER
            ),
        );

        let analyzer = Analyzer::new(config_for(dir.path()));
        let promo = analyzer
            .find_promotion("TABLOIDE 1 A 14", date(2024, 8, 1), date(2024, 8, 31))
            .unwrap();
        let report = analyzer.promotion_report(&promo).unwrap();

        // Window-based count stays with the insight view.
        assert_eq!(report.active_day_count, 12);

        // The store sold on both days of its own sale span → 100%.
        let store = analyzer.store_report(&report, "1");
        assert!((store.items[0].days_activated_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_product_stats_measured_against_filtered_set_span() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "relatorio_tratado.csv",
            "Nome Promocao;Data Inicial;Data Final;SKU;Loja\n\
             TABLOIDE 5 A 9 LOJA 1;05/08/2024;09/08/2024;555;1\n",
        );
        // ARROZ sells once in store 1; a later sale in store 2 stretches the
        // filtered set's span to 05–09/08 (5 active days, no Sunday).
        write_file(
            dir.path(),
            "dado_final-08.csv",
            &format!(
                "{}\n\
                 1;100;ARROZ;555;05/08/2024;2,00;10,00;;7,00;2;;;3,00\n\
                 2;200;FEIJAO;777;09/08/2024;1,00;8,00;;6,00;1;;;1,00\n",
                COUPON_HEADER
            ),
        );

        let analyzer = Analyzer::new(config_for(dir.path()));
        let promo = analyzer
            .find_promotion("TABLOIDE 5 A 9", date(2024, 8, 1), date(2024, 8, 31))
            .unwrap();
        let report = analyzer.promotion_report(&promo).unwrap();

        let stats = analyzer.product_report(&report, "1", "ARROZ");
        assert!((stats.days_activated_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_to_end_mixed_pricing() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "relatorio_tratado.csv",
            "Nome Promocao;Data Inicial;Data Final;SKU;Loja\n\
             TABLOIDE 5 A 9 LOJA 1;05/08/2024;09/08/2024;555;1\n",
        );
        // Same SKU priced 10.00 in store 1 and 12.00 in store 2 → mixed tier.
        write_file(
            dir.path(),
            "dado_final-08.csv",
            &format!(
                "{}\n\
                 1;100;ARROZ;555;05/08/2024;2,00;10,00;;7,00;2;;;3,00\n\
                 2;200;ARROZ;555;06/08/2024;2,00;12,00;;7,00;2;;;3,00\n",
                COUPON_HEADER
            ),
        );

        let analyzer = Analyzer::new(config_for(dir.path()));
        let promo = analyzer
            .find_promotion("TABLOIDE 5 A 9", date(2024, 8, 1), date(2024, 8, 31))
            .unwrap();
        let report = analyzer.promotion_report(&promo).unwrap();

        assert_eq!(report.pricing, PricingModel::Mixed);
        assert_eq!(report.insights.flyer_fee, 6400.0);
    }
}

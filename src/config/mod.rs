use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub abc: AbcConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    /// Store id → display name.
    #[serde(default = "default_stores")]
    pub stores: BTreeMap<String, String>,
}

/// Extract file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    #[serde(default = "default_monthly_dir")]
    pub monthly_dir: PathBuf,

    /// Monthly files are "<prefix><MM>.csv", two-digit month, no year.
    #[serde(default = "default_monthly_prefix")]
    pub monthly_prefix: String,
}

/// Flat fee tiers for producing the promotional flyer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeConfig {
    #[serde(default = "default_uniform_fee")]
    pub uniform: f64,

    #[serde(default = "default_mixed_fee")]
    pub mixed: f64,
}

/// Cumulative revenue share boundaries for the ABC curve
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbcConfig {
    #[serde(default = "default_class_a_pct")]
    pub class_a_pct: f64,

    #[serde(default = "default_class_b_pct")]
    pub class_b_pct: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InsightsConfig {
    /// Profit target is total cost × (1 + target_margin).
    #[serde(default = "default_target_margin")]
    pub target_margin: f64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_report_path() -> PathBuf {
    PathBuf::from("data/relatorio_tratado.csv")
}
fn default_monthly_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_monthly_prefix() -> String {
    "dado_final-".to_string()
}
fn default_uniform_fee() -> f64 {
    3600.0
}
fn default_mixed_fee() -> f64 {
    6400.0
}
fn default_class_a_pct() -> f64 {
    80.0
}
fn default_class_b_pct() -> f64 {
    95.0
}
fn default_target_margin() -> f64 {
    0.20
}
fn default_stores() -> BTreeMap<String, String> {
    [
        ("1", "Espera Feliz 1"),
        ("2", "Caiana"),
        ("3", "Divino 1"),
        ("5", "Alto Jequitibá"),
        ("6", "Divino 2"),
        ("8", "Espera Feliz 2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("PROMO").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }

    /// Display name for a store id; falls back to the raw id.
    pub fn store_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.stores.get(id).map(String::as_str).unwrap_or(id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            fees: FeeConfig::default(),
            abc: AbcConfig::default(),
            insights: InsightsConfig::default(),
            stores: default_stores(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            monthly_dir: default_monthly_dir(),
            monthly_prefix: default_monthly_prefix(),
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            uniform: default_uniform_fee(),
            mixed: default_mixed_fee(),
        }
    }
}

impl Default for AbcConfig {
    fn default() -> Self {
        Self {
            class_a_pct: default_class_a_pct(),
            class_b_pct: default_class_b_pct(),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            target_margin: default_target_margin(),
        }
    }
}

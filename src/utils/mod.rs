use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}

// ── pt-BR number formatting ───────────────────────────────────────────────────
//
// The extracts and the reporting audience are Brazilian: thousands with '.',
// decimals with ','. Done by hand to avoid a locale dependency.

/// Group an unsigned integer string with '.' thousands separators.
fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Format an integer with pt-BR thousands separators: 1234567 → "1.234.567".
pub fn fmt_int(n: i64) -> String {
    let grouped = group_thousands(&n.abs().to_string());
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a decimal with pt-BR separators: 1234.5 → "1.234,50".
pub fn fmt_float(v: f64) -> String {
    let negative = v < 0.0;
    let s = format!("{:.2}", v.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let grouped = group_thousands(int_part);
    if negative {
        format!("-{},{}", grouped, frac_part)
    } else {
        format!("{},{}", grouped, frac_part)
    }
}

/// Format a monetary value: 1234.5 → "R$ 1.234,50".
pub fn fmt_currency(v: f64) -> String {
    format!("R$ {}", fmt_float(v))
}

/// Format a percentage with two decimals: 12.345 → "12,35 %".
pub fn fmt_pct(v: f64) -> String {
    format!("{} %", fmt_float(v))
}

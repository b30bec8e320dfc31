use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Dashboard settings. Every field has a default, so a partial
/// `dashboard.json` (or none at all) is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file opened at startup.
    pub data_path: PathBuf,
    /// Lower/upper quantiles bounding the price and odometer sliders.
    pub trim_quantiles: (f64, f64),
    /// Initial histogram bin count.
    pub default_bins: usize,
    /// |rho| at or below this is reported as "no clear relation".
    pub correlation_threshold: f64,
    /// Categories listed per column in the median-price conclusions.
    pub top_categories: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("vehicles_us.csv"),
            trim_quantiles: (0.01, 0.99),
            default_bins: 40,
            correlation_threshold: 0.05,
            top_categories: 5,
        }
    }
}

impl DashboardConfig {
    /// Read `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no {} found, using default settings", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let (low, high) = self.trim_quantiles;
        anyhow::ensure!(
            (0.0..=1.0).contains(&low) && (0.0..=1.0).contains(&high) && low <= high,
            "trim_quantiles must satisfy 0 <= low <= high <= 1, got ({low}, {high})"
        );
        anyhow::ensure!(
            self.correlation_threshold >= 0.0,
            "correlation_threshold must not be negative"
        );
        Ok(())
    }
}

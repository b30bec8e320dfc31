use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::charts::{ChartSettings, HistogramSettings};
use crate::analysis::{self, Report};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{FilterBounds, FilterPredicates};
use crate::data::loader::{ListingCache, LoadError};
use crate::data::model::{CategoryColumn, ListingTable, NumericColumn};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Histogram,
    Scatter,
    BoxPlot,
    Conclusions,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Histogram, Tab::Scatter, Tab::BoxPlot, Tab::Conclusions];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Histogram => "Histogram",
            Tab::Scatter => "Scatter",
            Tab::BoxPlot => "Box plot",
            Tab::Conclusions => "Conclusions",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Tables loaded so far, by path.
    cache: ListingCache,

    /// File the current table came from.
    pub source: Option<PathBuf>,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Arc<ListingTable>>,

    /// Slider limits for the current table.
    pub bounds: FilterBounds,

    /// Current filter selections.
    pub predicates: FilterPredicates,

    /// Current chart selections.
    pub settings: ChartSettings,

    /// Colours for the scatter colour-by column.
    pub color_map: Option<ColorMap>,

    /// Report for the current inputs.
    pub report: Option<Report>,

    /// Inputs `report` was computed from.
    last_inputs: Option<(FilterPredicates, ChartSettings)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub active_tab: Tab,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_cache(config, ListingCache::default())
    }

    fn with_cache(config: DashboardConfig, cache: ListingCache) -> Self {
        let settings = ChartSettings::for_table(&ListingTable::default(), config.default_bins);
        Self {
            config,
            cache,
            source: None,
            table: None,
            bounds: FilterBounds::default(),
            predicates: FilterPredicates::default(),
            settings,
            color_map: None,
            report: None,
            last_inputs: None,
            status_message: None,
            active_tab: Tab::default(),
        }
    }

    /// Load (or fetch from the cache) the table at `path` and make it current.
    /// On failure the dashboard is cleared and only the error is shown.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} listings from {} with columns {:?} {:?}",
                    table.len(),
                    path.display(),
                    table.numeric_columns,
                    table.category_columns
                );
                if table.is_empty() {
                    log::warn!("{} has no usable listings", path.display());
                }
                self.source = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(describe_load_error(&e));
                self.source = None;
                self.table = None;
                self.report = None;
                self.last_inputs = None;
            }
        }
    }

    /// Ingest a table, initialise filters, charts and colour.
    pub fn set_table(&mut self, table: Arc<ListingTable>) {
        self.bounds = FilterBounds::from_table(&table, self.config.trim_quantiles);
        self.predicates = FilterPredicates::from_bounds(&self.bounds);
        self.settings = ChartSettings::for_table(&table, self.config.default_bins);
        self.table = Some(table);
        self.rebuild_color_map();
        self.status_message = None;
        self.last_inputs = None;
        self.refresh();
    }

    /// Recompute the report when filters or chart settings changed.
    pub fn refresh(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let inputs = (self.predicates.clone(), self.settings.clone());
        if self.last_inputs.as_ref() == Some(&inputs) {
            return;
        }
        self.report = Some(analysis::evaluate(
            table,
            &self.predicates,
            &self.settings,
            &self.config,
        ));
        self.last_inputs = Some(inputs);
    }

    /// Restore the default filters of the current table.
    pub fn reset_filters(&mut self) {
        self.predicates = FilterPredicates::from_bounds(&self.bounds);
    }

    /// Switch the histogram column; the log axis resets to its default.
    pub fn set_histogram_column(&mut self, column: NumericColumn) {
        if self.settings.histogram.column != column {
            self.settings.histogram = HistogramSettings::for_column(column, self.settings.histogram.bins);
        }
    }

    /// Set the scatter colour column and rebuild the map.
    pub fn set_color_by(&mut self, column: Option<CategoryColumn>) {
        self.settings.color_by = column;
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = match (&self.table, self.settings.color_by) {
            (Some(table), Some(column)) => table
                .unique_values
                .get(&column)
                .map(|values| ColorMap::new(column, values)),
            _ => None,
        };
    }
}

fn describe_load_error(err: &LoadError) -> String {
    match err {
        LoadError::NotFound(path) => {
            let full = std::env::current_dir()
                .map(|dir| dir.join(path))
                .unwrap_or_else(|_| path.clone());
            format!("Cannot find the file: {}", full.display())
        }
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Section;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("car-ads-state-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn state() -> AppState {
        AppState::with_cache(DashboardConfig::default(), ListingCache::with_year(2024))
    }

    #[test]
    fn test_missing_file_halts_dashboard() {
        let mut state = state();
        state.open(Path::new("missing/vehicles_us.csv"));
        assert!(state.table.is_none());
        assert!(state.report.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.starts_with("Cannot find the file"));
        assert!(msg.ends_with("vehicles_us.csv"));
    }

    #[test]
    fn test_open_builds_report_and_refreshes() {
        let path = temp_csv(
            "open.csv",
            "price,odometer,model_year,type,fuel\n\
             1000,200000,2004,sedan,gas\n\
             5000,150000,2008,sedan,gas\n\
             9000,90000,2014,SUV,diesel\n",
        );
        let mut state = state();
        state.open(&path);
        std::fs::remove_file(&path).ok();

        assert!(state.status_message.is_none());
        // default sliders trim the 1%/99% tails, leaving the middle row
        assert_eq!(state.bounds.price, Some(1080.0..=8920.0));
        assert_eq!(state.report.as_ref().unwrap().metrics.count, 1);

        state.predicates = FilterPredicates::default();
        state.refresh();
        assert_eq!(state.report.as_ref().unwrap().metrics.count, 3);

        state.predicates.toggle(CategoryColumn::Fuel, "diesel");
        state.refresh();
        assert_eq!(state.report.as_ref().unwrap().metrics.count, 1);

        state.reset_filters();
        state.refresh();
        assert_eq!(state.predicates, FilterPredicates::from_bounds(&state.bounds));
    }

    #[test]
    fn test_histogram_column_resets_log_axis() {
        let path = temp_csv("hist.csv", "price,odometer,model_year\n1,2,2010\n3,4,2011\n");
        let mut state = state();
        state.open(&path);
        std::fs::remove_file(&path).ok();

        assert!(state.settings.histogram.log_scale);
        state.set_histogram_column(NumericColumn::Odometer);
        assert!(!state.settings.histogram.log_scale);
        state.settings.histogram.log_scale = true;
        state.set_histogram_column(NumericColumn::Odometer);
        assert!(state.settings.histogram.log_scale);
    }

    #[test]
    fn test_color_by_builds_map() {
        let path = temp_csv("color.csv", "price,odometer,fuel\n1,2,gas\n3,4,diesel\n");
        let mut state = state();
        state.open(&path);
        std::fs::remove_file(&path).ok();

        state.predicates = FilterPredicates::default();
        state.set_color_by(Some(CategoryColumn::Fuel));
        state.refresh();
        assert_eq!(state.color_map.as_ref().unwrap().column, CategoryColumn::Fuel);
        let Some(Section::Ready(scatter)) = state.report.as_ref().map(|r| &r.scatter) else {
            panic!("expected a scatter");
        };
        assert_eq!(scatter.series.len(), 2);

        state.set_color_by(None);
        assert!(state.color_map.is_none());
    }
}

/// Analysis layer: everything the dashboard shows, computed as plain data.
///
/// Architecture:
/// ```text
///   ListingTable + FilterPredicates
///        │
///        ▼
///   ┌──────────────┐
///   │ FilteredView │  row indices passing the filters
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ evaluate │  metrics, charts, conclusions → Report
///   └──────────┘
/// ```
///
/// `evaluate` keeps no state between calls; the UI re-runs it whenever the
/// filters or chart settings change.

pub mod charts;
pub mod conclusions;
pub mod metrics;
pub mod stats;

use crate::config::DashboardConfig;
use crate::data::filter::{FilterPredicates, FilteredView};
use crate::data::model::ListingTable;

use charts::{ChartSettings, Histogram, PriceBoxPlot, Scatter};
use conclusions::Observation;
use metrics::SummaryMetrics;

pub const NO_DATA: &str = "No data available with the current filters.";
pub const NO_NUMERIC_PAIRS: &str = "Not enough numeric columns.";
pub const NO_PRICE: &str = "No price data available.";
pub const NO_CATEGORIES: &str = "No categorical columns available.";
pub const ADJUST_FILTERS: &str = "Adjust the filters to see conclusions backed by data.";

/// A report part: either computed data or an informational message.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Ready(T),
    Placeholder(&'static str),
}

/// Everything rendered for one combination of filters and chart settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub metrics: SummaryMetrics,
    pub histogram: Section<Histogram>,
    pub scatter: Section<Scatter>,
    pub box_plot: Section<PriceBoxPlot>,
    pub observations: Section<Vec<Observation>>,
}

impl Report {
    pub fn build(view: &FilteredView, settings: &ChartSettings, config: &DashboardConfig) -> Self {
        Self {
            metrics: SummaryMetrics::compute(view),
            histogram: charts::histogram(view, &settings.histogram),
            scatter: charts::scatter(view, settings.scatter_pair, settings.color_by),
            box_plot: charts::price_box_plot(view, settings.box_column),
            observations: conclusions::observations(
                view,
                config.correlation_threshold,
                config.top_categories,
            ),
        }
    }
}

/// Filter `table` and compute the full report from scratch.
pub fn evaluate(
    table: &ListingTable,
    predicates: &FilterPredicates,
    settings: &ChartSettings,
    config: &DashboardConfig,
) -> Report {
    let view = FilteredView::apply(table, predicates);
    log::debug!("evaluating report over {} of {} listings", view.len(), table.len());
    Report::build(&view, settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    const CSV: &str = "\
price,odometer,model_year,condition,type,transmission,fuel,paint_color
1000,200000,2004,fair,sedan,automatic,gas,red
5000,150000,2008,good,sedan,manual,gas,
9000,90000,2014,good,SUV,automatic,diesel,black
100000,20000,2021,like new,truck,automatic,diesel,white
";

    #[test]
    fn test_evaluate_price_window() {
        let table = read_csv(CSV.as_bytes(), 2024).unwrap();
        let config = DashboardConfig::default();
        let settings = ChartSettings::for_table(&table, config.default_bins);
        let predicates = FilterPredicates {
            price: Some(1000.0..=9000.0),
            ..Default::default()
        };

        let report = evaluate(&table, &predicates, &settings, &config);
        assert_eq!(report.metrics.count, 3);
        assert_eq!(report.metrics.median_price, Some(5000.0));
        assert!(matches!(report.histogram, Section::Ready(_)));
        assert!(matches!(report.box_plot, Section::Ready(_)));

        let Section::Ready(bullets) = &report.observations else {
            panic!("expected observations");
        };
        assert!(bullets[0].to_string().starts_with("Higher odometer, lower price"));
    }

    #[test]
    fn test_evaluate_empty_view_never_panics() {
        let table = read_csv(CSV.as_bytes(), 2024).unwrap();
        let config = DashboardConfig::default();
        let settings = ChartSettings::for_table(&table, config.default_bins);
        let mut predicates = FilterPredicates::default();
        predicates.toggle(crate::data::model::CategoryColumn::Fuel, "electric");

        let report = evaluate(&table, &predicates, &settings, &config);
        assert_eq!(report.metrics.count, 0);
        assert_eq!(report.metrics.median_price, None);
        assert_eq!(report.histogram, Section::Placeholder(NO_DATA));
        assert_eq!(report.scatter, Section::Placeholder(NO_NUMERIC_PAIRS));
        assert_eq!(report.box_plot, Section::Placeholder(NO_PRICE));
        assert_eq!(report.observations, Section::Placeholder(ADJUST_FILTERS));
    }

    #[test]
    fn test_evaluate_without_optional_columns() {
        let table = read_csv("price,odometer\n100,1000\n200,500\n".as_bytes(), 2024).unwrap();
        let config = DashboardConfig::default();
        let settings = ChartSettings::for_table(&table, config.default_bins);

        let report = evaluate(&table, &FilterPredicates::default(), &settings, &config);
        assert_eq!(report.box_plot, Section::Placeholder(NO_CATEGORIES));
        let Section::Ready(bullets) = &report.observations else {
            panic!("expected observations");
        };
        // only the odometer/price correlation applies
        assert_eq!(bullets.len(), 1);
    }
}

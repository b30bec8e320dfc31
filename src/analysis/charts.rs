use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use super::stats;
use super::{Section, NO_CATEGORIES, NO_DATA, NO_NUMERIC_PAIRS, NO_PRICE};
use crate::data::filter::FilteredView;
use crate::data::model::{CategoryColumn, ListingTable, NumericColumn};

/// Columns offered by the histogram selector.
pub const HISTOGRAM_COLUMNS: [NumericColumn; 3] = [
    NumericColumn::Price,
    NumericColumn::Odometer,
    NumericColumn::Age,
];

pub const BIN_RANGE: RangeInclusive<usize> = 10..=120;

/// Columns offered for scatter colouring.
pub const COLOR_BY_COLUMNS: [CategoryColumn; 3] = [
    CategoryColumn::Condition,
    CategoryColumn::Type,
    CategoryColumn::Fuel,
];

/// Columns offered for the price box plot.
pub const BOX_COLUMNS: [CategoryColumn; 4] = [
    CategoryColumn::Type,
    CategoryColumn::Condition,
    CategoryColumn::Transmission,
    CategoryColumn::Fuel,
];

/// Label for scatter points whose colour column is null.
pub const MISSING_LABEL: &str = "(missing)";

// ---------------------------------------------------------------------------
// Chart settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSettings {
    pub column: NumericColumn,
    pub bins: usize,
    pub log_scale: bool,
}

impl HistogramSettings {
    /// Log axis is the default for price only.
    pub fn for_column(column: NumericColumn, bins: usize) -> Self {
        Self {
            column,
            bins,
            log_scale: column == NumericColumn::Price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterPair {
    OdometerPrice,
    AgePrice,
}

impl ScatterPair {
    pub const ALL: [ScatterPair; 2] = [ScatterPair::OdometerPrice, ScatterPair::AgePrice];

    pub fn x(self) -> NumericColumn {
        match self {
            ScatterPair::OdometerPrice => NumericColumn::Odometer,
            ScatterPair::AgePrice => NumericColumn::Age,
        }
    }

    pub fn y(self) -> NumericColumn {
        NumericColumn::Price
    }

    pub fn is_available(self, table: &ListingTable) -> bool {
        table.has_numeric(self.x()) && table.has_numeric(self.y())
    }
}

impl fmt::Display for ScatterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.x(), self.y())
    }
}

/// Widget selections that shape the charts (everything but the filters).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub histogram: HistogramSettings,
    pub scatter_pair: ScatterPair,
    pub color_by: Option<CategoryColumn>,
    pub box_column: Option<CategoryColumn>,
}

impl ChartSettings {
    /// First available option for every selector; price preferred for the
    /// histogram.
    pub fn for_table(table: &ListingTable, default_bins: usize) -> Self {
        let column = histogram_columns(table)
            .into_iter()
            .next()
            .unwrap_or(NumericColumn::Price);
        let bins = default_bins.clamp(*BIN_RANGE.start(), *BIN_RANGE.end());
        Self {
            histogram: HistogramSettings::for_column(column, bins),
            scatter_pair: scatter_pairs(table)
                .into_iter()
                .next()
                .unwrap_or(ScatterPair::OdometerPrice),
            color_by: None,
            box_column: box_columns(table).into_iter().next(),
        }
    }
}

pub fn histogram_columns(table: &ListingTable) -> Vec<NumericColumn> {
    HISTOGRAM_COLUMNS
        .into_iter()
        .filter(|c| table.has_numeric(*c))
        .collect()
}

pub fn scatter_pairs(table: &ListingTable) -> Vec<ScatterPair> {
    ScatterPair::ALL
        .into_iter()
        .filter(|p| p.is_available(table))
        .collect()
}

pub fn color_by_columns(table: &ListingTable) -> Vec<CategoryColumn> {
    COLOR_BY_COLUMNS
        .into_iter()
        .filter(|c| table.has_category(*c))
        .collect()
}

pub fn box_columns(table: &ListingTable) -> Vec<CategoryColumn> {
    BOX_COLUMNS
        .into_iter()
        .filter(|c| table.has_category(*c))
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins. With `log_scale` the bin edges are in `log10` units.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: NumericColumn,
    pub log_scale: bool,
    pub bins: Vec<HistogramBin>,
    /// Values left out because a log axis cannot show them (<= 0).
    pub skipped: usize,
}

pub fn histogram(view: &FilteredView, settings: &HistogramSettings) -> Section<Histogram> {
    if view.is_empty() || !view.table().has_numeric(settings.column) {
        return Section::Placeholder(NO_DATA);
    }

    let raw = view.numeric_values(settings.column);
    let (values, skipped) = if settings.log_scale {
        let positive: Vec<f64> = raw.iter().copied().filter(|v| *v > 0.0).map(f64::log10).collect();
        let skipped = raw.len() - positive.len();
        (positive, skipped)
    } else {
        (raw, 0)
    };

    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Section::Placeholder(NO_DATA);
    };

    let n_bins = settings.bins.clamp(*BIN_RANGE.start(), *BIN_RANGE.end());
    let bins = if max > min {
        let width = (max - min) / n_bins as f64;
        let mut bins: Vec<HistogramBin> = (0..n_bins)
            .map(|i| HistogramBin {
                start: min + width * i as f64,
                end: min + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        for v in &values {
            let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
            bins[idx].count += 1;
        }
        bins
    } else {
        vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: values.len(),
        }]
    };

    Section::Ready(Histogram {
        column: settings.column,
        log_scale: settings.log_scale,
        bins,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub pair: ScatterPair,
    pub color_by: Option<CategoryColumn>,
    /// One series per category, or a single unnamed series.
    pub series: Vec<ScatterSeries>,
}

pub fn scatter(
    view: &FilteredView,
    pair: ScatterPair,
    color_by: Option<CategoryColumn>,
) -> Section<Scatter> {
    if view.is_empty() || !pair.is_available(view.table()) {
        return Section::Placeholder(NO_NUMERIC_PAIRS);
    }
    let color_by = color_by.filter(|c| view.table().has_category(*c));

    let mut groups: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for listing in view.iter() {
        let (Some(x), Some(y)) = (listing.numeric(pair.x()), listing.numeric(pair.y())) else {
            continue;
        };
        let label = match color_by {
            Some(column) => listing.category(column).unwrap_or(MISSING_LABEL),
            None => "",
        };
        groups.entry(label.to_string()).or_default().push([x, y]);
    }

    let series = groups
        .into_iter()
        .map(|(label, points)| ScatterSeries { label, points })
        .collect();

    Section::Ready(Scatter {
        pair,
        color_by,
        series,
    })
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers (1.5 × IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub category: String,
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond the whiskers.
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(category: &str, values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = stats::quantile_sorted(&sorted, 0.25)?;
        let median = stats::quantile_sorted(&sorted, 0.5)?;
        let q3 = stats::quantile_sorted(&sorted, 0.75)?;
        let fence = 1.5 * (q3 - q1);
        let fences = (q1 - fence)..=(q3 + fence);

        let lower_whisker = sorted.iter().copied().find(|v| fences.contains(v)).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| fences.contains(v)).unwrap_or(q3);
        let outliers = sorted.iter().copied().filter(|v| !fences.contains(v)).collect();

        Some(Self {
            category: category.to_string(),
            count: sorted.len(),
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBoxPlot {
    pub column: CategoryColumn,
    /// One box per category, sorted by category name.
    pub boxes: Vec<BoxSummary>,
}

pub fn price_box_plot(view: &FilteredView, column: Option<CategoryColumn>) -> Section<PriceBoxPlot> {
    if view.is_empty() || !view.table().has_numeric(NumericColumn::Price) {
        return Section::Placeholder(NO_PRICE);
    }
    let Some(column) = column.filter(|c| view.table().has_category(*c)) else {
        return Section::Placeholder(NO_CATEGORIES);
    };

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for listing in view.iter() {
        if let (Some(category), Some(price)) = (listing.category(column), listing.price) {
            groups.entry(category).or_default().push(price);
        }
    }

    let boxes = groups
        .into_iter()
        .filter_map(|(category, prices)| BoxSummary::from_values(category, &prices))
        .collect();

    Section::Ready(PriceBoxPlot { column, boxes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterPredicates;
    use crate::data::model::tests::{columns, record};
    use crate::data::model::CellValue;

    fn table() -> ListingTable {
        let cols = columns(&["price", "odometer", "model_year", "type", "fuel"]);
        let rows = [
            (1000, 200000, 2005, "sedan", "gas"),
            (10, 150000, 2008, "sedan", ""),
            (10000, 90000, 2014, "SUV", "gas"),
            (100000, 20000, 2020, "SUV", "diesel"),
        ];
        let records: Vec<_> = rows
            .iter()
            .map(|(p, o, y, t, f)| {
                record(&[
                    ("price", CellValue::Integer(*p)),
                    ("odometer", CellValue::Integer(*o)),
                    ("model_year", CellValue::Integer(*y)),
                    ("type", CellValue::Text(t.to_string())),
                    ("fuel", CellValue::Text(f.to_string())),
                ])
            })
            .collect();
        ListingTable::from_records(&cols, records, 2024)
    }

    fn empty_view(table: &ListingTable) -> FilteredView<'_> {
        let predicates = FilterPredicates {
            price: Some(-2.0..=-1.0),
            ..Default::default()
        };
        FilteredView::apply(table, &predicates)
    }

    #[test]
    fn test_linear_histogram_counts_every_value() {
        let table = table();
        let view = FilteredView::all(&table);
        let settings = HistogramSettings {
            column: NumericColumn::Odometer,
            bins: 10,
            log_scale: false,
        };
        let Section::Ready(hist) = histogram(&view, &settings) else {
            panic!("expected a histogram");
        };
        assert_eq!(hist.bins.len(), 10);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 4);
        // max value lands in the last bin
        assert_eq!(hist.bins[9].count, 1);
        assert!((hist.bins[0].start - 20000.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_histogram_uses_log10_edges() {
        let table = table();
        let view = FilteredView::all(&table);
        let settings = HistogramSettings::for_column(NumericColumn::Price, 12);
        assert!(settings.log_scale);
        let Section::Ready(hist) = histogram(&view, &settings) else {
            panic!("expected a histogram");
        };
        assert!((hist.bins[0].start - 1.0).abs() < 1e-9);
        assert!((hist.bins[11].end - 5.0).abs() < 1e-9);
        assert_eq!(hist.skipped, 0);
    }

    #[test]
    fn test_bins_are_clamped() {
        let table = table();
        let view = FilteredView::all(&table);
        let settings = HistogramSettings {
            column: NumericColumn::Age,
            bins: 500,
            log_scale: false,
        };
        let Section::Ready(hist) = histogram(&view, &settings) else {
            panic!("expected a histogram");
        };
        assert_eq!(hist.bins.len(), 120);
    }

    #[test]
    fn test_empty_view_gives_placeholders() {
        let table = table();
        let view = empty_view(&table);
        let settings = HistogramSettings::for_column(NumericColumn::Price, 40);
        assert_eq!(histogram(&view, &settings), Section::Placeholder(NO_DATA));
        assert_eq!(
            scatter(&view, ScatterPair::OdometerPrice, None),
            Section::Placeholder(NO_NUMERIC_PAIRS)
        );
        assert_eq!(
            price_box_plot(&view, Some(CategoryColumn::Type)),
            Section::Placeholder(NO_PRICE)
        );
    }

    #[test]
    fn test_scatter_groups_by_category() {
        let table = table();
        let view = FilteredView::all(&table);
        let Section::Ready(plot) = scatter(&view, ScatterPair::AgePrice, Some(CategoryColumn::Fuel))
        else {
            panic!("expected a scatter");
        };
        let labels: Vec<&str> = plot.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["(missing)", "diesel", "gas"]);
        assert_eq!(plot.series[1].points, vec![[4.0, 100000.0]]);
    }

    #[test]
    fn test_scatter_ignores_absent_color_column() {
        let table = table();
        let view = FilteredView::all(&table);
        let Section::Ready(plot) =
            scatter(&view, ScatterPair::OdometerPrice, Some(CategoryColumn::Condition))
        else {
            panic!("expected a scatter");
        };
        assert_eq!(plot.color_by, None);
        assert_eq!(plot.series.len(), 1);
        assert_eq!(plot.series[0].points.len(), 4);
    }

    #[test]
    fn test_box_summary_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = BoxSummary::from_values("x", &values).unwrap();
        assert!((summary.q1 - 2.25).abs() < 1e-9);
        assert!((summary.q3 - 4.75).abs() < 1e-9);
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_plot_per_category() {
        let table = table();
        let view = FilteredView::all(&table);
        let Section::Ready(plot) = price_box_plot(&view, Some(CategoryColumn::Type)) else {
            panic!("expected a box plot");
        };
        let names: Vec<&str> = plot.boxes.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, vec!["SUV", "sedan"]);
        assert_eq!(plot.boxes[0].median, 55000.0);
    }

    #[test]
    fn test_box_plot_without_categories() {
        let table = table();
        let view = FilteredView::all(&table);
        assert_eq!(price_box_plot(&view, None), Section::Placeholder(NO_CATEGORIES));
    }

    #[test]
    fn test_settings_follow_available_columns() {
        let table = table();
        let settings = ChartSettings::for_table(&table, 40);
        assert_eq!(settings.histogram.column, NumericColumn::Price);
        assert!(settings.histogram.log_scale);
        assert_eq!(settings.scatter_pair, ScatterPair::OdometerPrice);
        assert_eq!(settings.box_column, Some(CategoryColumn::Type));
        assert_eq!(
            color_by_columns(&table),
            vec![CategoryColumn::Type, CategoryColumn::Fuel]
        );
        assert_eq!(ScatterPair::AgePrice.to_string(), "age vs price");
    }
}

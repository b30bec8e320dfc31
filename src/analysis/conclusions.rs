use std::fmt;

use super::metrics::group_thousands;
use super::{stats, Section, ADJUST_FILTERS};
use crate::data::filter::FilteredView;
use crate::data::model::{CategoryColumn, NumericColumn};

/// Columns summarised by median price in the conclusions.
pub const MEDIAN_COLUMNS: [CategoryColumn; 2] = [CategoryColumn::Type, CategoryColumn::Condition];

/// Direction of a rank correlation after thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Negative,
    Positive,
    Unclear,
}

impl Trend {
    /// Strictly beyond `±threshold` counts as a trend. An undefined
    /// coefficient is unclear.
    pub fn classify(rho: Option<f64>, threshold: f64) -> Self {
        match rho {
            Some(r) if r < -threshold => Trend::Negative,
            Some(r) if r > threshold => Trend::Positive,
            _ => Trend::Unclear,
        }
    }
}

/// One bullet of the automatic conclusions.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    OdometerPrice { rho: Option<f64>, trend: Trend },
    AgePrice { rho: Option<f64>, trend: Trend },
    CategoryMedians {
        column: CategoryColumn,
        /// `(category, median price)` highest first; prices truncated.
        top: Vec<(String, i64)>,
    },
}

struct Coefficient(Option<f64>);

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "{r:.2}"),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::OdometerPrice { rho, trend } => {
                let rho = Coefficient(*rho);
                match trend {
                    Trend::Negative => write!(
                        f,
                        "Higher odometer, lower price (Spearman correlation = {rho})."
                    ),
                    Trend::Positive => write!(
                        f,
                        "Higher odometer, higher price (unusual): check the filters (corr = {rho})."
                    ),
                    Trend::Unclear => write!(
                        f,
                        "No clear relation between odometer and price (corr ≈ {rho})."
                    ),
                }
            }
            Observation::AgePrice { rho, trend } => {
                let rho = Coefficient(*rho);
                match trend {
                    Trend::Negative => write!(
                        f,
                        "Newer cars tend to cost more (less age, higher price) (corr = {rho})."
                    ),
                    Trend::Positive => write!(
                        f,
                        "Older cars are sometimes listed higher (unusual): check the filters (corr = {rho})."
                    ),
                    Trend::Unclear => write!(
                        f,
                        "No strong relation between age and price (corr ≈ {rho})."
                    ),
                }
            }
            Observation::CategoryMedians { column, top } => {
                let items: Vec<String> = top
                    .iter()
                    .map(|(name, price)| format!("{name}: ${}", group_thousands(*price)))
                    .collect();
                write!(f, "Median price by {column} (top) → {}", items.join(" • "))
            }
        }
    }
}

fn correlation(view: &FilteredView, x: NumericColumn, threshold: f64) -> Option<(Option<f64>, Trend)> {
    let table = view.table();
    if !table.has_numeric(x) || !table.has_numeric(NumericColumn::Price) {
        return None;
    }
    let rho = stats::spearman(&view.numeric_pairs(x, NumericColumn::Price));
    Some((rho, Trend::classify(rho, threshold)))
}

fn category_medians(view: &FilteredView, column: CategoryColumn, top_n: usize) -> Option<Observation> {
    let table = view.table();
    if !table.has_category(column) || !table.has_numeric(NumericColumn::Price) {
        return None;
    }
    let rows = view
        .iter()
        .filter_map(|l| Some((l.category(column)?, l.price?)));
    let top: Vec<(String, i64)> = stats::group_medians(rows)
        .into_iter()
        .take(top_n)
        .map(|(name, median)| (name, median.trunc() as i64))
        .collect();
    if top.is_empty() {
        return None;
    }
    Some(Observation::CategoryMedians { column, top })
}

/// Plain-language findings for the current view.
pub fn observations(view: &FilteredView, threshold: f64, top_n: usize) -> Section<Vec<Observation>> {
    if view.is_empty() {
        return Section::Placeholder(ADJUST_FILTERS);
    }

    let mut bullets = Vec::new();
    if let Some((rho, trend)) = correlation(view, NumericColumn::Odometer, threshold) {
        bullets.push(Observation::OdometerPrice { rho, trend });
    }
    if let Some((rho, trend)) = correlation(view, NumericColumn::Age, threshold) {
        bullets.push(Observation::AgePrice { rho, trend });
    }
    bullets.extend(
        MEDIAN_COLUMNS
            .iter()
            .filter_map(|column| category_medians(view, *column, top_n)),
    );
    Section::Ready(bullets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterPredicates;
    use crate::data::model::tests::{columns, record};
    use crate::data::model::{CellValue, ListingTable};

    fn table(rows: &[(i64, i64, i64, &str)]) -> ListingTable {
        let cols = columns(&["price", "odometer", "model_year", "type"]);
        let records: Vec<_> = rows
            .iter()
            .map(|(p, o, y, t)| {
                record(&[
                    ("price", CellValue::Integer(*p)),
                    ("odometer", CellValue::Integer(*o)),
                    ("model_year", CellValue::Integer(*y)),
                    ("type", CellValue::Text(t.to_string())),
                ])
            })
            .collect();
        ListingTable::from_records(&cols, records, 2024)
    }

    #[test]
    fn test_classify_bands() {
        assert_eq!(Trend::classify(Some(-0.06), 0.05), Trend::Negative);
        assert_eq!(Trend::classify(Some(0.06), 0.05), Trend::Positive);
        assert_eq!(Trend::classify(Some(0.05), 0.05), Trend::Unclear);
        assert_eq!(Trend::classify(Some(-0.05), 0.05), Trend::Unclear);
        assert_eq!(Trend::classify(None, 0.05), Trend::Unclear);
    }

    #[test]
    fn test_decreasing_odometer_price_relation() {
        // more miles and older → cheaper
        let table = table(&[
            (30000, 10000, 2022, "SUV"),
            (22000, 50000, 2019, "SUV"),
            (15000, 90000, 2015, "sedan"),
            (8000, 150000, 2010, "sedan"),
            (3000, 220000, 2004, "truck"),
        ]);
        let Section::Ready(bullets) = observations(&FilteredView::all(&table), 0.05, 5) else {
            panic!("expected observations");
        };

        let Observation::OdometerPrice { rho, trend } = &bullets[0] else {
            panic!("first bullet should be odometer/price");
        };
        assert!(rho.unwrap() <= -0.05);
        assert_eq!(*trend, Trend::Negative);
        assert!(bullets[0].to_string().starts_with("Higher odometer, lower price"));
        assert!(bullets[0].to_string().contains("-1.00"));

        assert_eq!(
            bullets[1].to_string(),
            "Newer cars tend to cost more (less age, higher price) (corr = -1.00)."
        );
    }

    #[test]
    fn test_category_medians_top_n() {
        let table = table(&[
            (30000, 1, 2020, "truck"),
            (20000, 1, 2020, "SUV"),
            (24000, 1, 2020, "SUV"),
            (9000, 1, 2020, "sedan"),
            (4000, 1, 2020, "hatchback"),
        ]);
        let Section::Ready(bullets) = observations(&FilteredView::all(&table), 0.05, 2) else {
            panic!("expected observations");
        };
        let medians = bullets
            .iter()
            .find(|b| matches!(b, Observation::CategoryMedians { .. }))
            .unwrap();
        assert_eq!(
            medians.to_string(),
            "Median price by type (top) → truck: $30,000 • SUV: $22,000"
        );
    }

    #[test]
    fn test_constant_column_reports_unclear() {
        let table = table(&[(1000, 5, 2020, "SUV"), (2000, 5, 2020, "SUV")]);
        let Section::Ready(bullets) = observations(&FilteredView::all(&table), 0.05, 5) else {
            panic!("expected observations");
        };
        assert_eq!(
            bullets[0],
            Observation::OdometerPrice {
                rho: None,
                trend: Trend::Unclear
            }
        );
        assert_eq!(
            bullets[0].to_string(),
            "No clear relation between odometer and price (corr ≈ n/a)."
        );
    }

    #[test]
    fn test_empty_view_gives_placeholder() {
        let table = table(&[(1000, 5, 2020, "SUV")]);
        let predicates = FilterPredicates {
            price: Some(0.0..=1.0),
            ..Default::default()
        };
        let view = FilteredView::apply(&table, &predicates);
        assert_eq!(observations(&view, 0.05, 5), Section::Placeholder(ADJUST_FILTERS));
    }
}

use super::stats;
use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;

/// Headline numbers shown above the tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryMetrics {
    pub count: usize,
    /// `None` when the view is empty or has no price column.
    pub median_price: Option<f64>,
    /// `None` when the view is empty or has no odometer column.
    pub mean_odometer: Option<f64>,
}

impl SummaryMetrics {
    pub fn compute(view: &FilteredView) -> Self {
        let guarded = |column: NumericColumn, f: fn(&[f64]) -> Option<f64>| {
            if view.is_empty() || !view.table().has_numeric(column) {
                return None;
            }
            f(&view.numeric_values(column))
        };

        Self {
            count: view.len(),
            median_price: guarded(NumericColumn::Price, stats::median),
            mean_odometer: guarded(NumericColumn::Odometer, stats::mean),
        }
    }

    pub fn count_label(&self) -> String {
        group_thousands(self.count as i64)
    }

    pub fn median_price_label(&self) -> Option<String> {
        self.median_price
            .map(|p| format!("${}", group_thousands(p.trunc() as i64)))
    }

    pub fn mean_odometer_label(&self) -> Option<String> {
        self.mean_odometer
            .map(|o| format!("{} mi", group_thousands(o.trunc() as i64)))
    }
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

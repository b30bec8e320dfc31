use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use super::model::{CategoryColumn, Listing, ListingTable, NumericColumn};
use crate::analysis::stats;

/// Categorical columns exposed as multi-select filters.
pub const FILTERABLE_CATEGORIES: [CategoryColumn; 3] = [
    CategoryColumn::Condition,
    CategoryColumn::Type,
    CategoryColumn::Fuel,
];

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// The filter selections for one interaction.
///
/// A range of `None`, or a range over a column the table lacks, is inactive.
/// An empty category set means "no filter" (show all).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicates {
    pub price: Option<RangeInclusive<f64>>,
    pub odometer: Option<RangeInclusive<f64>>,
    pub model_year: Option<RangeInclusive<i32>>,
    pub categories: BTreeMap<CategoryColumn, BTreeSet<String>>,
}

impl FilterPredicates {
    /// Predicates spanning the full slider bounds with nothing selected.
    pub fn from_bounds(bounds: &FilterBounds) -> Self {
        Self {
            price: bounds.price.clone(),
            odometer: bounds.odometer.clone(),
            model_year: bounds.model_year.clone(),
            categories: BTreeMap::new(),
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle(&mut self, column: CategoryColumn, value: &str) {
        let selected = self.categories.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn is_selected(&self, column: CategoryColumn, value: &str) -> bool {
        self.categories
            .get(&column)
            .is_some_and(|set| set.contains(value))
    }

    /// Whether a listing passes every active predicate of `table`.
    pub fn matches(&self, table: &ListingTable, listing: &Listing) -> bool {
        let in_range = |column: NumericColumn, range: &Option<RangeInclusive<f64>>| {
            match range {
                Some(range) if table.has_numeric(column) => listing
                    .numeric(column)
                    .is_some_and(|v| range.contains(&v)),
                _ => true,
            }
        };

        if !in_range(NumericColumn::Price, &self.price)
            || !in_range(NumericColumn::Odometer, &self.odometer)
        {
            return false;
        }

        if let Some(years) = &self.model_year {
            if table.has_numeric(NumericColumn::ModelYear)
                && !listing.model_year.is_some_and(|y| years.contains(&y))
            {
                return false;
            }
        }

        self.categories.iter().all(|(column, selected)| {
            if selected.is_empty() || !table.has_category(*column) {
                return true;
            }
            listing
                .category(*column)
                .is_some_and(|value| selected.contains(value))
        })
    }
}

// ---------------------------------------------------------------------------
// Slider bounds
// ---------------------------------------------------------------------------

/// Limits for the range widgets, derived once per table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterBounds {
    pub price: Option<RangeInclusive<f64>>,
    pub odometer: Option<RangeInclusive<f64>>,
    pub model_year: Option<RangeInclusive<i32>>,
}

impl FilterBounds {
    /// Price and odometer limits are trimmed to the `trim` quantiles (and
    /// truncated to whole numbers) so a handful of outliers do not squash
    /// the charts; year limits span the full data.
    pub fn from_table(table: &ListingTable, trim: (f64, f64)) -> Self {
        let trimmed = |column: NumericColumn| {
            if !table.has_numeric(column) {
                return None;
            }
            let values = table.numeric_values(column);
            let low = stats::quantile(&values, trim.0)?.trunc();
            let high = stats::quantile(&values, trim.1)?.trunc();
            Some(low..=high)
        };

        let model_year = if table.has_numeric(NumericColumn::ModelYear) {
            let years = table.listings.iter().filter_map(|l| l.model_year);
            match (years.clone().min(), years.max()) {
                (Some(min), Some(max)) => Some(min..=max),
                _ => None,
            }
        } else {
            None
        };

        Self {
            price: trimmed(NumericColumn::Price),
            odometer: trimmed(NumericColumn::Odometer),
            model_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Read-only subset of a table: the rows passing a predicate set.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a ListingTable,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Every row of the table.
    pub fn all(table: &'a ListingTable) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Rows of `table` that pass all active predicates.
    pub fn apply(table: &'a ListingTable, predicates: &FilterPredicates) -> Self {
        Self::all(table).refine(predicates)
    }

    /// Re-apply predicates to this view's rows.
    pub fn refine(&self, predicates: &FilterPredicates) -> Self {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| predicates.matches(self.table, &self.table.listings[i]))
            .collect();
        Self {
            table: self.table,
            indices,
        }
    }

    pub fn table(&self) -> &'a ListingTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.listings[i])
    }

    /// Non-null values of a numeric column; empty if the column is absent.
    pub fn numeric_values(&self, column: NumericColumn) -> Vec<f64> {
        self.iter().filter_map(|l| l.numeric(column)).collect()
    }

    /// Rows where both columns are present, as `(x, y)` pairs.
    pub fn numeric_pairs(&self, x: NumericColumn, y: NumericColumn) -> Vec<(f64, f64)> {
        self.iter()
            .filter_map(|l| Some((l.numeric(x)?, l.numeric(y)?)))
            .collect()
    }
}

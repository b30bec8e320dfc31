use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell as read from a file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what the file formats can hold.
/// Loaders produce these; [`ListingTable::from_records`] coerces them.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric coercion. Text is parsed; anything unparseable is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Bool(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Text form for categorical columns. Empty strings count as null.
    pub fn as_category(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// One row as produced by a loader: column name → cell.
pub type RawRecord = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Column identifiers
// ---------------------------------------------------------------------------

/// Numeric columns of the listing table (`age` is derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericColumn {
    Price,
    Odometer,
    ModelYear,
    Age,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::Price,
        NumericColumn::Odometer,
        NumericColumn::ModelYear,
        NumericColumn::Age,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Price => "price",
            NumericColumn::Odometer => "odometer",
            NumericColumn::ModelYear => "model_year",
            NumericColumn::Age => "age",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical (string) columns of the listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryColumn {
    Condition,
    Type,
    Transmission,
    Fuel,
    PaintColor,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 5] = [
        CategoryColumn::Condition,
        CategoryColumn::Type,
        CategoryColumn::Transmission,
        CategoryColumn::Fuel,
        CategoryColumn::PaintColor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoryColumn::Condition => "condition",
            CategoryColumn::Type => "type",
            CategoryColumn::Transmission => "transmission",
            CategoryColumn::Fuel => "fuel",
            CategoryColumn::PaintColor => "paint_color",
        }
    }

    /// Capitalised label for widgets ("Condition", "Paint_color").
    pub fn label(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Listing – one vehicle ad
// ---------------------------------------------------------------------------

/// A single vehicle ad (one row of the source file).
///
/// A numeric field is `None` only when its column is absent from the file;
/// rows with null price/odometer/model_year never make it into a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub price: Option<f64>,
    pub odometer: Option<f64>,
    pub model_year: Option<i32>,
    pub age: Option<i32>,
    /// Non-null categorical values; a missing key means null.
    pub categories: BTreeMap<CategoryColumn, String>,
}

impl Listing {
    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Price => self.price,
            NumericColumn::Odometer => self.odometer,
            NumericColumn::ModelYear => self.model_year.map(f64::from),
            NumericColumn::Age => self.age.map(f64::from),
        }
    }

    pub fn category(&self, column: CategoryColumn) -> Option<&str> {
        self.categories.get(&column).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// ListingTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Counters describing what the loader discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedRows {
    pub missing_price: usize,
    pub missing_odometer: usize,
    pub invalid_year: usize,
}

impl DroppedRows {
    pub fn total(&self) -> usize {
        self.missing_price + self.missing_odometer + self.invalid_year
    }
}

/// The full parsed dataset with column presence and category indices.
#[derive(Debug, Clone, Default)]
pub struct ListingTable {
    /// All listings (rows).
    pub listings: Vec<Listing>,
    /// Numeric columns present, in canonical order (includes derived `age`).
    pub numeric_columns: Vec<NumericColumn>,
    /// Categorical columns present, in canonical order.
    pub category_columns: Vec<CategoryColumn>,
    /// For each categorical column the sorted set of distinct values.
    pub unique_values: BTreeMap<CategoryColumn, BTreeSet<String>>,
    pub dropped: DroppedRows,
}

/// Truncate a year to an integer; years outside the `i32` range are invalid.
fn coerce_year(year: f64) -> Option<i32> {
    let year = year.trunc();
    (f64::from(i32::MIN)..=f64::from(i32::MAX))
        .contains(&year)
        .then_some(year as i32)
}

impl ListingTable {
    /// Build a table from raw records.
    ///
    /// `columns` lists the column names the file declared; anything outside
    /// the allowlist is ignored. Rows with a null price or odometer are
    /// dropped, as are rows whose `model_year` does not coerce to a number.
    pub fn from_records<I>(columns: &[String], records: I, current_year: i32) -> Self
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let has = |name: &str| columns.iter().any(|c| c == name);

        let mut numeric_columns: Vec<NumericColumn> = NumericColumn::ALL
            .into_iter()
            .filter(|c| *c != NumericColumn::Age && has(c.name()))
            .collect();
        if numeric_columns.contains(&NumericColumn::ModelYear) {
            numeric_columns.push(NumericColumn::Age);
        }
        let category_columns: Vec<CategoryColumn> = CategoryColumn::ALL
            .into_iter()
            .filter(|c| has(c.name()))
            .collect();

        let has_price = numeric_columns.contains(&NumericColumn::Price);
        let has_odometer = numeric_columns.contains(&NumericColumn::Odometer);
        let has_year = numeric_columns.contains(&NumericColumn::ModelYear);

        let mut dropped = DroppedRows::default();
        let mut listings = Vec::new();
        let mut unique_values: BTreeMap<CategoryColumn, BTreeSet<String>> = category_columns
            .iter()
            .map(|c| (*c, BTreeSet::new()))
            .collect();

        for record in records {
            let cell = |name: &str| record.get(name).and_then(CellValue::as_f64);

            let price = cell("price");
            if has_price && price.is_none() {
                dropped.missing_price += 1;
                continue;
            }
            let odometer = cell("odometer");
            if has_odometer && odometer.is_none() {
                dropped.missing_odometer += 1;
                continue;
            }
            let model_year = cell("model_year").and_then(coerce_year);
            let age = model_year.and_then(|y| current_year.checked_sub(y));
            if has_year && age.is_none() {
                dropped.invalid_year += 1;
                continue;
            }

            let mut categories = BTreeMap::new();
            for column in &category_columns {
                if let Some(value) = record.get(column.name()).and_then(CellValue::as_category) {
                    if let Some(set) = unique_values.get_mut(column) {
                        set.insert(value.clone());
                    }
                    categories.insert(*column, value);
                }
            }

            listings.push(Listing {
                price: price.filter(|_| has_price),
                odometer: odometer.filter(|_| has_odometer),
                model_year: model_year.filter(|_| has_year),
                age: age.filter(|_| has_year),
                categories,
            });
        }

        ListingTable {
            listings,
            numeric_columns,
            category_columns,
            unique_values,
            dropped,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn has_numeric(&self, column: NumericColumn) -> bool {
        self.numeric_columns.contains(&column)
    }

    pub fn has_category(&self, column: CategoryColumn) -> bool {
        self.category_columns.contains(&column)
    }

    /// All non-null values of a numeric column, in row order.
    pub fn numeric_values(&self, column: NumericColumn) -> Vec<f64> {
        self.listings.iter().filter_map(|l| l.numeric(column)).collect()
    }
}

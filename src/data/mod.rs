/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ListingTable (memoized per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ListingTable │  Vec<Listing>, column presence, category index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply range / category predicates → FilteredView
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;

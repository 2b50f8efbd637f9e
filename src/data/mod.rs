/// Data layer: core types, loading, and search filtering.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (cells left as Raw text)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  headers + Vec<Row>, read-only from here on
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  search tokens → matching row indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;

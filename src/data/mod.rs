/// Data layer: listing types, sources, and the filter/aggregate pipeline.
///
/// Architecture:
/// ```text
///  REST backend  /  .parquet .json .csv
///        │
///        ▼
///   ┌──────────────────┐
///   │ source / loader   │  fetch → Vec<Boat>, newest first
///   └──────────────────┘
///        │
///        ▼
///   ┌────────────────┐        ┌────────┐
///   │ BoatCollection  │──────▶│ facet   │  builder / model option lists
///   └────────────────┘        └────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState predicates → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, scatter points, price histogram
///   └───────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod facet;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;

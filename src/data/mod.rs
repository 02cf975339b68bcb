//! Data layer: core types, loading, caching, and the analysis pipeline.
//!
//! Architecture:
//! ```text
//!  .csv / .parquet / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (fatal DataLoadError on failure)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  Arc<Dataset>, reloaded after TTL / path change
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  year ∧ station selection → row indices
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌───────────┐     ┌───────────┐
//!   │ aggregate  │     │ correlate  │
//!   └───────────┘     └───────────┘
//! ```
//!
//! Every stage below the cache is a pure function of `&Dataset` and the row
//! indices; an empty selection flows through as empty output, never an error.

pub mod aggregate;
pub mod cache;
pub mod correlate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;

//! Logic Module - classification engine and document ingestion
//!
//! - `model/` - preprocessing + classifier backends
//! - `labels`, `router`, `tally` - label set, bin routing, counts
//! - `report/` - CSV, PDF and chart exports
//! - `pipeline` - glue for one upload
//! - `ingest/` - document → vector index

pub mod labels;
pub mod router;
pub mod tally;

pub mod model;
pub mod report;
pub mod pipeline;

pub mod ingest;

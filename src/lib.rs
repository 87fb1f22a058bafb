//! Per-tile spatial-join engine for tile-partitioned geometry streams.
//!
//! An upstream partitioner tags every record with a tile id and a join side.
//! This crate buckets consecutive records of one tile in memory, bulk-loads
//! an R-tree over one side, probes it with the other side and emits every
//! pair that satisfies the configured spatial predicate.
//!
//! Modules:
//! - `config`: the frozen query operator and its command line surface.
//! - `record`: tab-separated input records.
//! - `geometry` / `envelope`: WKT parsing, cached envelopes and the exact
//!   spatial relations.
//! - `bucket`: per-tile, per-side storage of geometries and raw tuples.
//! - `index`: bulk-loaded envelope R-tree over one join side.
//! - `predicate`: the two-stage (envelope, exact) predicate evaluator.
//! - `join` / `driver`: the per-tile join and the streaming loop around it.
//! - `emit`: projection and pair output.
//! - `window`: the single-window containment filter used by `tilefilter`.

pub mod bucket;
pub mod config;
pub mod driver;
pub mod emit;
pub mod envelope;
pub mod geometry;
pub mod index;
pub mod join;
pub mod predicate;
pub mod record;
pub mod window;

pub use config::{JoinArgs, Predicate, QueryOp, StatKind};
pub use driver::{JoinSummary, run_join};

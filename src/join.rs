use crate::bucket::TileBuckets;
use crate::config::{Predicate, QueryOp};
use crate::emit::PairWriter;
use crate::index::SpatialIndex;
use crate::predicate;
use crate::record::Side;
use anyhow::{Context, Result};
use std::io::Write;

/// Joins the buckets of one tile.
///
/// Side 1 probes; a self join probes its own bucket, a binary join probes
/// side 2. The R-tree over the probed side is built here and torn down when
/// the call returns. Pairs are emitted probe-major, candidates in the order
/// the index yields them. Returns the number of emitted pairs.
pub fn join_tile<W: Write>(
	op: &QueryOp,
	tile_id: &str,
	buckets: &TileBuckets,
	writer: &mut PairWriter<W>,
) -> Result<u64> {
	let probe_side = Side::One;
	let build_side = if op.is_self_join() { Side::One } else { Side::Two };

	if buckets.len(probe_side) == 0 || buckets.len(build_side) == 0 {
		return Ok(0);
	}

	let index = SpatialIndex::build(buckets.geometries(build_side))
		.with_context(|| format!("building the spatial index for tile {tile_id:?}"))?;

	let mut pairs = 0u64;
	for (i, g1) in buckets.geometries(probe_side).iter().enumerate() {
		let mut query = *g1.envelope();
		if op.predicate == Predicate::DWithin {
			query = query.expand(op.expansion_distance);
		}
		for j in index.query(&query) {
			if op.is_self_join() && j == i {
				continue;
			}
			let g2 = buckets.geometry(build_side, j);
			if let Some(found) = predicate::evaluate(op, g1, g2) {
				writer.write_pair(
					op,
					buckets.raw(probe_side, i),
					buckets.raw(build_side, j),
					found.stats.as_ref(),
					tile_id,
				)?;
				pairs += 1;
			}
		}
	}
	Ok(pairs)
}

use crate::bucket::TileBuckets;
use crate::config::QueryOp;
use crate::emit::{PairWriter, project};
use crate::geometry::TileGeometry;
use crate::join::join_tile;
use crate::record::{Record, Side};
use anyhow::{Context, Result, bail};
use log::debug;
use std::io::{BufRead, Write};

/// Totals of one engine run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSummary {
	/// Consecutive tile groups that held at least one record.
	pub tiles: u64,
	/// Qualifying pairs written.
	pub pairs: u64,
	/// Records skipped for an empty geometry.
	pub skipped: u64,
}

/// Streams tab separated records and joins every consecutive group sharing
/// a tile id.
///
/// Records of one tile are bucketed per side; when the tile id changes the
/// buckets are joined, emitted and released before the new record is stored,
/// so memory stays bounded by the largest tile. Records with an empty
/// geometry column are invisible to bucketing and never trigger a tile
/// flush. A malformed record or geometry aborts the run.
pub fn run_join<R: BufRead, W: Write>(op: &QueryOp, input: R, output: W) -> Result<JoinSummary> {
	let mut writer = PairWriter::new(output);
	let mut buckets = TileBuckets::new();
	let mut prev_tile = String::new();
	let mut summary = JoinSummary::default();

	for (number, line) in input.lines().enumerate() {
		let line = line.context("reading record from input")?;
		if line.is_empty() {
			continue;
		}
		ingest(op, &line, &mut prev_tile, &mut buckets, &mut writer, &mut summary)
			.with_context(|| format!("input line {}", number + 1))?;
	}

	// the last tile stays in memory until end of input
	if !buckets.is_empty() {
		flush_tile(op, &prev_tile, &mut buckets, &mut writer, &mut summary)?;
	}

	writer.flush()?;
	Ok(summary)
}

fn ingest<W: Write>(
	op: &QueryOp,
	line: &str,
	prev_tile: &mut String,
	buckets: &mut TileBuckets,
	writer: &mut PairWriter<W>,
	summary: &mut JoinSummary,
) -> Result<()> {
	let record = Record::parse(line)?;
	let side = record.side()?;
	let Some(shape_idx) = op.shape_index(side) else {
		bail!("record for join side 2 in a self join");
	};
	let Some(text) = record.field(shape_idx) else {
		bail!("record has no geometry column {}", shape_idx - 1);
	};
	if text.is_empty() {
		summary.skipped += 1;
		return Ok(());
	}
	let Some(geometry) = TileGeometry::from_wkt(text)? else {
		summary.skipped += 1;
		return Ok(());
	};

	let tile_id = record.tile_id();
	if !prev_tile.is_empty() && prev_tile != tile_id {
		flush_tile(op, prev_tile, buckets, writer, summary)?;
	}

	let raw = project(record.fields(), op.projection(side));
	buckets.push(side, geometry, raw);
	prev_tile.clear();
	prev_tile.push_str(tile_id);
	Ok(())
}

fn flush_tile<W: Write>(
	op: &QueryOp,
	tile_id: &str,
	buckets: &mut TileBuckets,
	writer: &mut PairWriter<W>,
	summary: &mut JoinSummary,
) -> Result<()> {
	let pairs = join_tile(op, tile_id, buckets, writer)?;
	debug!(
		"T[{tile_id}] |{}|x|{}|=|{pairs}|",
		buckets.len(Side::One),
		buckets.len(Side::Two)
	);
	summary.tiles += 1;
	summary.pairs += pairs;
	buckets.clear_all();
	Ok(())
}

use crate::config::QueryOp;
use crate::predicate::PairStats;
use anyhow::Result;
use std::io::Write;

/// Separator between the two raw tuples of an output pair (ASCII unit
/// separator). Columns inside a tuple and appended statistics stay tab
/// separated.
pub const PAIR_SEP: char = '\u{1e}';

/// Builds the raw output tuple of one record.
///
/// An empty projection keeps every column except the leading tile id and
/// join side id, in input order. Otherwise the listed positions are emitted
/// in the given order; positions past the end of the record are skipped.
pub fn project(fields: &[&str], projection: &[usize]) -> String {
	if projection.is_empty() {
		return fields.get(2..).unwrap_or(&[]).join("\t");
	}
	let mut out = String::from(*fields.get(projection[0]).unwrap_or(&""));
	for &position in &projection[1..] {
		if let Some(field) = fields.get(position) {
			out.push('\t');
			out.push_str(field);
		}
	}
	out
}

/// Writes qualifying pairs in the output format of the engine, exactly one
/// line per pair.
pub struct PairWriter<W: Write> {
	out: W,
}

impl<W: Write> PairWriter<W> {
	pub fn new(out: W) -> Self {
		Self { out }
	}

	/// Emits one qualifying pair.
	///
	/// A binary join may append the statistics block (fixed column order:
	/// area 1, area 2, union area, intersection area, jaccard) and the tile
	/// id; a self join emits only the two raw tuples.
	pub fn write_pair(
		&mut self,
		op: &QueryOp,
		raw1: &str,
		raw2: &str,
		stats: Option<&PairStats>,
		tile_id: &str,
	) -> Result<()> {
		if op.is_self_join() {
			writeln!(self.out, "{raw1}{PAIR_SEP}{raw2}")?;
			return Ok(());
		}
		write!(self.out, "{raw1}{PAIR_SEP}{raw2}")?;
		if !op.append_stats.is_empty() {
			if let Some(s) = stats {
				write!(
					self.out,
					"{PAIR_SEP}{}\t{}\t{}\t{}\t{}",
					s.area1,
					s.area2,
					s.union_area,
					s.intersect_area,
					s.intersect_area / s.union_area
				)?;
			}
		}
		if op.append_tile_id {
			write!(self.out, "\t{tile_id}")?;
		}
		writeln!(self.out)?;
		Ok(())
	}

	pub fn flush(&mut self) -> Result<()> {
		self.out.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Predicate, StatKind};

	fn op(shape_idx_2: Option<usize>) -> QueryOp {
		QueryOp {
			predicate: Predicate::Intersects,
			shape_idx_1: 2,
			shape_idx_2,
			expansion_distance: 0.0,
			proj1: vec![],
			proj2: vec![],
			append_stats: vec![],
			append_tile_id: false,
		}
	}

	fn stats() -> PairStats {
		PairStats {
			area1: 100.0,
			area2: 50.0,
			union_area: 125.0,
			intersect_area: 25.0,
		}
	}

	#[test]
	fn empty_projection_drops_tile_and_side_ids() {
		let fields = ["T1", "1", "POINT(0 0)", "alpha", "beta"];
		assert_eq!(project(&fields, &[]), "POINT(0 0)\talpha\tbeta");
	}

	#[test]
	fn explicit_projection_keeps_order_and_skips_out_of_range() {
		let fields = ["T1", "1", "geom", "alpha", "beta"];
		assert_eq!(project(&fields, &[4, 3]), "beta\talpha");
		assert_eq!(project(&fields, &[3, 99, 4]), "alpha\tbeta");
		assert_eq!(project(&fields, &[99, 3]), "\talpha");
	}

	#[test]
	fn record_with_only_ids_projects_to_nothing() {
		assert_eq!(project(&["T1", "1"], &[]), "");
	}

	#[test]
	fn self_join_pairs_carry_no_extras() {
		let mut o = op(None);
		o.append_stats = vec![StatKind::Area1];
		o.append_tile_id = true;
		let mut out = Vec::new();
		PairWriter::new(&mut out)
			.write_pair(&o, "left", "right", Some(&stats()), "T9")
			.unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "left\u{1e}right\n");
	}

	#[test]
	fn binary_join_without_stats_or_tile_id() {
		let mut out = Vec::new();
		PairWriter::new(&mut out)
			.write_pair(&op(Some(2)), "left", "right", None, "T9")
			.unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "left\u{1e}right\n");
	}

	#[test]
	fn stats_block_has_the_fixed_schema() {
		let mut o = op(Some(2));
		// requesting any subset still emits the full block
		o.append_stats = vec![StatKind::Jaccard];
		o.append_tile_id = true;
		let mut out = Vec::new();
		PairWriter::new(&mut out)
			.write_pair(&o, "left", "right", Some(&stats()), "T9")
			.unwrap();
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"left\u{1e}right\u{1e}100\t50\t125\t25\t0.2\tT9\n"
		);
	}

	#[test]
	fn stats_request_without_stats_emits_no_block() {
		let mut o = op(Some(2));
		o.append_stats = vec![StatKind::Area1];
		let mut out = Vec::new();
		PairWriter::new(&mut out).write_pair(&o, "left", "right", None, "T9").unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "left\u{1e}right\n");
	}

	#[test]
	fn tile_id_comes_last() {
		let mut o = op(Some(2));
		o.append_tile_id = true;
		let mut out = Vec::new();
		PairWriter::new(&mut out).write_pair(&o, "a", "b", None, "T7").unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "a\u{1e}b\tT7\n");
	}
}

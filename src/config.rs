use crate::record::Side;
use anyhow::{Context, Result, bail, ensure};
use log::warn;

/// The spatial join predicates understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
	Intersects,
	Touches,
	Crosses,
	Contains,
	Adjacent,
	Disjoint,
	Equals,
	DWithin,
	Within,
	Overlaps,
}

impl Predicate {
	/// Maps a predicate name to its variant. Unknown names fail
	/// configuration before any input is read.
	pub fn from_name(name: &str) -> Result<Predicate> {
		Ok(match name.to_ascii_lowercase().as_str() {
			"st_intersects" => Predicate::Intersects,
			"st_touches" => Predicate::Touches,
			"st_crosses" => Predicate::Crosses,
			"st_contains" => Predicate::Contains,
			"st_adjacent" => Predicate::Adjacent,
			"st_disjoint" => Predicate::Disjoint,
			"st_equals" => Predicate::Equals,
			"st_dwithin" => Predicate::DWithin,
			"st_within" => Predicate::Within,
			"st_overlaps" => Predicate::Overlaps,
			other => bail!("unknown spatial predicate {other:?}"),
		})
	}
}

/// Statistics that can be requested for the output.
///
/// The emitted block has a fixed column schema; this set only decides
/// whether the block is appended at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatKind {
	Area1,
	Area2,
	UnionArea,
	IntersectArea,
	Jaccard,
	Dice,
}

impl StatKind {
	fn from_token(token: &str) -> Option<StatKind> {
		Some(match token {
			"a1" => StatKind::Area1,
			"a2" => StatKind::Area2,
			"uni" => StatKind::UnionArea,
			"int" => StatKind::IntersectArea,
			"jac" => StatKind::Jaccard,
			"dice" => StatKind::Dice,
			_ => return None,
		})
	}
}

/// The frozen query operator.
///
/// Built once from the command line, validated before any input is read and
/// then threaded through driver, evaluator and emitter unchanged. Geometry
/// column positions are stored with the leading tile id already skipped;
/// projection positions additionally skip the join side id.
#[derive(Clone, Debug)]
pub struct QueryOp {
	pub predicate: Predicate,
	pub shape_idx_1: usize,
	pub shape_idx_2: Option<usize>,
	pub expansion_distance: f64,
	pub proj1: Vec<usize>,
	pub proj2: Vec<usize>,
	pub append_stats: Vec<StatKind>,
	pub append_tile_id: bool,
}

impl QueryOp {
	pub fn join_cardinality(&self) -> u8 {
		if self.shape_idx_2.is_some() { 2 } else { 1 }
	}

	pub fn is_self_join(&self) -> bool {
		self.shape_idx_2.is_none()
	}

	/// Geometry column for a record of the given side, `None` when the side
	/// does not take part in the join.
	pub fn shape_index(&self, side: Side) -> Option<usize> {
		match side {
			Side::One => Some(self.shape_idx_1),
			Side::Two => self.shape_idx_2,
		}
	}

	pub fn projection(&self, side: Side) -> &[usize] {
		match side {
			Side::One => &self.proj1,
			Side::Two => &self.proj2,
		}
	}
}

/// Command line surface of the join worker.
#[derive(clap::Args, Debug)]
pub struct JoinArgs {
	/// Spatial join predicate: st_intersects, st_touches, st_crosses,
	/// st_contains, st_adjacent, st_disjoint, st_equals, st_dwithin,
	/// st_within or st_overlaps
	#[arg(long, short = 'p')]
	pub predicate: Option<String>,

	/// Geometry column of the first dataset, counting from 1
	#[arg(long, short = 'i')]
	pub shpidx1: Option<usize>,

	/// Geometry column of the second dataset, counting from 1.
	/// Its presence makes the join binary instead of a self join.
	#[arg(long, short = 'j')]
	pub shpidx2: Option<usize>,

	/// Join distance for st_dwithin; no effect on other predicates
	#[arg(long, short = 'd', default_value_t = 0.0)]
	pub distance: f64,

	/// Output columns per side, e.g. "1,3,5:1,2,9". Comma separated within a
	/// side, sides separated by a colon; a missing side means all columns.
	#[arg(long, short = 'f')]
	pub fields: Option<String>,

	/// Statistics to append, comma separated over a1, a2, uni, int, jac, dice
	#[arg(long, short = 's')]
	pub stats: Option<String>,

	/// "true" appends the tile id to every output pair
	#[arg(long, short = 't')]
	pub tileid: Option<String>,
}

impl JoinArgs {
	/// Validates the options and freezes them into a query operator.
	pub fn to_query_op(&self) -> Result<QueryOp> {
		let Some(name) = &self.predicate else {
			bail!("the join predicate is not set");
		};
		let predicate = Predicate::from_name(name)?;

		let Some(shpidx1) = self.shpidx1 else {
			bail!("the geometry column of the first dataset is not set");
		};
		ensure!(shpidx1 >= 1, "geometry column indexes count from 1");
		if let Some(shpidx2) = self.shpidx2 {
			ensure!(shpidx2 >= 1, "geometry column indexes count from 1");
		}

		ensure!(
			self.distance >= 0.0 && self.distance.is_finite(),
			"the join distance must be a non-negative number"
		);
		if predicate == Predicate::DWithin {
			ensure!(self.distance > 0.0, "st_dwithin needs a positive join distance");
		}

		let (proj1, proj2) = match &self.fields {
			Some(spec) => parse_projections(spec)?,
			None => (Vec::new(), Vec::new()),
		};

		let append_stats = match &self.stats {
			Some(spec) => parse_stats(spec),
			None => Vec::new(),
		};

		Ok(QueryOp {
			predicate,
			// skip the leading tile id
			shape_idx_1: shpidx1 + 1,
			shape_idx_2: self.shpidx2.map(|idx| idx + 1),
			expansion_distance: self.distance,
			proj1,
			proj2,
			append_stats,
			append_tile_id: self.tileid.as_deref() == Some("true"),
		})
	}
}

/// Parses the two comma lists of an output column spec. Stored positions
/// skip the leading tile id and join side id.
fn parse_projections(spec: &str) -> Result<(Vec<usize>, Vec<usize>)> {
	let mut sides = spec.split(':');
	let proj1 = parse_projection_list(sides.next().unwrap_or(""))?;
	let proj2 = parse_projection_list(sides.next().unwrap_or(""))?;
	Ok((proj1, proj2))
}

fn parse_projection_list(list: &str) -> Result<Vec<usize>> {
	if list.is_empty() {
		return Ok(Vec::new());
	}
	list
		.split(',')
		.map(|entry| {
			let index: usize = entry
				.trim()
				.parse()
				.with_context(|| format!("invalid output column index {entry:?}"))?;
			Ok(index + 2)
		})
		.collect()
}

/// Parses the statistics spec. Unknown tokens are ignored with a warning,
/// duplicates are coalesced and the set is kept sorted.
fn parse_stats(spec: &str) -> Vec<StatKind> {
	let mut stats: Vec<StatKind> = spec
		.split(',')
		.filter_map(|token| {
			let kind = StatKind::from_token(token.trim());
			if kind.is_none() {
				warn!("ignoring unknown statistics token {token:?}");
			}
			kind
		})
		.collect();
	stats.sort_unstable();
	stats.dedup();
	stats
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(predicate: &str) -> JoinArgs {
		JoinArgs {
			predicate: Some(predicate.to_string()),
			shpidx1: Some(1),
			shpidx2: None,
			distance: 0.0,
			fields: None,
			stats: None,
			tileid: None,
		}
	}

	#[test]
	fn maps_all_predicate_names() {
		for (name, expected) in [
			("st_intersects", Predicate::Intersects),
			("st_touches", Predicate::Touches),
			("st_crosses", Predicate::Crosses),
			("st_contains", Predicate::Contains),
			("st_adjacent", Predicate::Adjacent),
			("st_disjoint", Predicate::Disjoint),
			("st_equals", Predicate::Equals),
			("st_dwithin", Predicate::DWithin),
			("st_within", Predicate::Within),
			("st_overlaps", Predicate::Overlaps),
		] {
			assert_eq!(Predicate::from_name(name).unwrap(), expected);
		}
		assert!(Predicate::from_name("st_nearby").is_err());
	}

	#[test]
	fn shape_indexes_skip_the_tile_id() {
		let mut a = args("st_intersects");
		a.shpidx2 = Some(3);
		let op = a.to_query_op().unwrap();
		assert_eq!(op.shape_idx_1, 2);
		assert_eq!(op.shape_idx_2, Some(4));
		assert_eq!(op.join_cardinality(), 2);
		assert!(!op.is_self_join());
	}

	#[test]
	fn missing_first_geometry_column_fails() {
		let mut a = args("st_intersects");
		a.shpidx1 = None;
		assert!(a.to_query_op().is_err());
		a.shpidx1 = Some(0);
		assert!(a.to_query_op().is_err());
	}

	#[test]
	fn dwithin_needs_a_positive_distance() {
		let mut a = args("st_dwithin");
		assert!(a.to_query_op().is_err());
		a.distance = 1.5;
		let op = a.to_query_op().unwrap();
		assert_eq!(op.expansion_distance, 1.5);
		a.distance = -1.0;
		assert!(a.to_query_op().is_err());
	}

	#[test]
	fn projection_positions_skip_tile_and_side_ids() {
		let mut a = args("st_intersects");
		a.fields = Some("1,3,5:1,2,9".to_string());
		let op = a.to_query_op().unwrap();
		assert_eq!(op.proj1, vec![3, 5, 7]);
		assert_eq!(op.proj2, vec![3, 4, 11]);
	}

	#[test]
	fn missing_projection_side_means_all_columns() {
		let mut a = args("st_intersects");
		a.fields = Some("2,4".to_string());
		let op = a.to_query_op().unwrap();
		assert_eq!(op.proj1, vec![4, 6]);
		assert!(op.proj2.is_empty());

		a.fields = Some(":2".to_string());
		let op = a.to_query_op().unwrap();
		assert!(op.proj1.is_empty());
		assert_eq!(op.proj2, vec![4]);
	}

	#[test]
	fn bad_projection_entries_fail_configuration() {
		let mut a = args("st_intersects");
		a.fields = Some("1,x".to_string());
		assert!(a.to_query_op().is_err());
	}

	#[test]
	fn stats_are_coalesced_and_sorted() {
		let mut a = args("st_intersects");
		a.stats = Some("jac,a1,a1,uni,bogus".to_string());
		let op = a.to_query_op().unwrap();
		assert_eq!(op.append_stats, vec![StatKind::Area1, StatKind::UnionArea, StatKind::Jaccard]);
	}

	#[test]
	fn tileid_is_enabled_by_the_literal_true() {
		let mut a = args("st_intersects");
		a.tileid = Some("true".to_string());
		assert!(a.to_query_op().unwrap().append_tile_id);
		a.tileid = Some("yes".to_string());
		assert!(!a.to_query_op().unwrap().append_tile_id);
		a.tileid = None;
		assert!(!a.to_query_op().unwrap().append_tile_id);
	}
}

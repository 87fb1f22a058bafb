use crate::config::{Predicate, QueryOp};
use crate::geometry::TileGeometry;

/// Geometric statistics of one qualifying pair. Produced by the evaluator
/// for `st_intersects` matches and carried to the emitter by value, so the
/// evaluator has no side effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairStats {
	pub area1: f64,
	pub area2: f64,
	pub union_area: f64,
	pub intersect_area: f64,
}

/// Outcome of a satisfied predicate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairMatch {
	pub stats: Option<PairStats>,
}

/// Checks the configured predicate on one candidate pair.
///
/// Every arm with an envelope prefilter short-circuits before touching the
/// exact geometry. Returns `None` when the pair does not qualify.
pub fn evaluate(op: &QueryOp, g1: &TileGeometry, g2: &TileGeometry) -> Option<PairMatch> {
	let e1 = g1.envelope();
	let e2 = g2.envelope();

	let matched = match op.predicate {
		Predicate::Intersects => {
			if e1.intersects(e2) && g1.intersects(g2) {
				return Some(PairMatch {
					stats: Some(intersection_stats(g1, g2)),
				});
			}
			false
		}
		Predicate::Touches => g1.touches(g2),
		Predicate::Crosses => g1.crosses(g2),
		Predicate::Contains => e1.contains(e2) && g1.contains(g2),
		// adjacency means not disjoint
		Predicate::Adjacent => g1.intersects(g2),
		Predicate::Disjoint => !g1.intersects(g2),
		Predicate::Equals => e1 == e2 && g1.equals_topo(g2),
		Predicate::DWithin => dwithin(g1, g2, op.expansion_distance),
		Predicate::Within => g1.within(g2),
		Predicate::Overlaps => g1.overlaps(g2),
	};

	matched.then_some(PairMatch { stats: None })
}

/// Distance predicate. Two points compare squared distances directly;
/// everything else first passes an expanded envelope check and then falls
/// back to the minimum distance between the geometries.
fn dwithin(g1: &TileGeometry, g2: &TileGeometry, distance: f64) -> bool {
	if let (Some((x1, y1)), Some((x2, y2))) = (g1.as_point(), g2.as_point()) {
		let dx = x1 - x2;
		let dy = y1 - y2;
		return dx * dx + dy * dy <= distance * distance;
	}
	if !g1.envelope().expand(distance).intersects(g2.envelope()) {
		return false;
	}
	g1.intersects(g2) || g1.min_distance_sq(g2) <= distance * distance
}

fn intersection_stats(g1: &TileGeometry, g2: &TileGeometry) -> PairStats {
	let (union_area, intersect_area) = g1.overlay_areas(g2);
	PairStats {
		area1: g1.area(),
		area2: g2.area(),
		union_area,
		intersect_area,
	}
}

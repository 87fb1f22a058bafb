use crate::geometry::TileGeometry;
use crate::record::Side;

/// Per-tile, per-side storage of parsed geometries and their projected raw
/// tuples, in insertion order.
///
/// The geometry and the raw tuple at the same position always come from the
/// same record. The bucket exclusively owns its geometries; `clear_all`
/// releases the whole tile in one step before the next tile is read.
#[derive(Default)]
pub struct TileBuckets {
	sides: [SideBucket; 2],
}

#[derive(Default)]
struct SideBucket {
	geometries: Vec<TileGeometry>,
	raw: Vec<String>,
}

impl TileBuckets {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, side: Side, geometry: TileGeometry, raw: String) {
		let bucket = &mut self.sides[side.slot()];
		bucket.geometries.push(geometry);
		bucket.raw.push(raw);
	}

	pub fn len(&self, side: Side) -> usize {
		self.sides[side.slot()].geometries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len(Side::One) == 0 && self.len(Side::Two) == 0
	}

	pub fn geometries(&self, side: Side) -> &[TileGeometry] {
		&self.sides[side.slot()].geometries
	}

	pub fn geometry(&self, side: Side, index: usize) -> &TileGeometry {
		&self.sides[side.slot()].geometries[index]
	}

	pub fn raw(&self, side: Side, index: usize) -> &str {
		&self.sides[side.slot()].raw[index]
	}

	pub fn clear_all(&mut self) {
		for bucket in &mut self.sides {
			bucket.geometries.clear();
			bucket.raw.clear();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point(x: f64) -> TileGeometry {
		TileGeometry::from_wkt(&format!("POINT({x} 0)")).unwrap().unwrap()
	}

	#[test]
	fn keeps_geometries_and_raw_tuples_aligned() {
		let mut buckets = TileBuckets::new();
		buckets.push(Side::One, point(1.0), "a".to_string());
		buckets.push(Side::One, point(2.0), "b".to_string());
		buckets.push(Side::Two, point(3.0), "c".to_string());

		assert_eq!(buckets.len(Side::One), 2);
		assert_eq!(buckets.len(Side::Two), 1);
		assert_eq!(buckets.geometry(Side::One, 1).as_point(), Some((2.0, 0.0)));
		assert_eq!(buckets.raw(Side::One, 1), "b");
		assert_eq!(buckets.raw(Side::Two, 0), "c");
	}

	#[test]
	fn clear_all_releases_both_sides() {
		let mut buckets = TileBuckets::new();
		buckets.push(Side::One, point(1.0), "a".to_string());
		buckets.push(Side::Two, point(2.0), "b".to_string());
		assert!(!buckets.is_empty());
		buckets.clear_all();
		assert!(buckets.is_empty());
		assert_eq!(buckets.len(Side::One), 0);
		assert_eq!(buckets.len(Side::Two), 0);
	}
}

use crate::envelope::Envelope;
use crate::geometry::TileGeometry;
use anyhow::{Result, ensure};
use rstar::{AABB, RTree, RTreeObject};

/// Envelope entry stored in the R-tree, keyed by the dense position of its
/// geometry in the bucket it was built from.
struct IndexEntry {
	id: usize,
	lower: [f64; 2],
	upper: [f64; 2],
}

impl RTreeObject for IndexEntry {
	type Envelope = AABB<[f64; 2]>;

	fn envelope(&self) -> Self::Envelope {
		AABB::from_corners(self.lower, self.upper)
	}
}

/// Bulk-loaded R-tree over the envelopes of one join side.
///
/// The tree lives only for the duration of one per-tile join and is torn
/// down with it.
pub struct SpatialIndex {
	tree: RTree<IndexEntry>,
}

impl SpatialIndex {
	/// Builds the index over all envelopes at once.
	///
	/// A geometry whose envelope is not finite cannot be indexed; that is
	/// the one way construction fails and it fails the whole tile.
	pub fn build(geometries: &[TileGeometry]) -> Result<SpatialIndex> {
		let mut entries = Vec::with_capacity(geometries.len());
		for (id, geometry) in geometries.iter().enumerate() {
			let env = geometry.envelope();
			ensure!(env.is_finite(), "cannot index geometry {id}: envelope is not finite");
			entries.push(IndexEntry {
				id,
				lower: [env.min_x, env.min_y],
				upper: [env.max_x, env.max_y],
			});
		}
		Ok(Self {
			tree: RTree::bulk_load(entries),
		})
	}

	/// Ids of all entries whose envelope intersects `query`, in the order
	/// the tree yields them.
	pub fn query(&self, query: &Envelope) -> Vec<usize> {
		self
			.tree
			.locate_in_envelope_intersecting(&query.to_aabb())
			.map(|entry| entry.id)
			.collect()
	}

	pub fn len(&self) -> usize {
		self.tree.size()
	}

	pub fn is_empty(&self) -> bool {
		self.tree.size() == 0
	}
}

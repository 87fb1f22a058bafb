use geo::{BoundingRect, Geometry, Rect};
use rstar::AABB;

/// Axis-aligned bounding rectangle over double precision coordinates.
///
/// All envelope checks are plain coordinate comparisons so they stay far
/// cheaper than any exact geometry call they guard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Envelope {
	#[must_use]
	pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
		Self {
			min_x,
			min_y,
			max_x,
			max_y,
		}
	}

	/// Envelope of a geometry, `None` if the geometry has no extent.
	pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
		geometry.bounding_rect().map(Self::from_rect)
	}

	fn from_rect(rect: Rect<f64>) -> Self {
		Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
	}

	pub fn intersects(&self, other: &Envelope) -> bool {
		self.min_x <= other.max_x && other.min_x <= self.max_x && self.min_y <= other.max_y && other.min_y <= self.max_y
	}

	pub fn contains(&self, other: &Envelope) -> bool {
		self.min_x <= other.min_x && other.max_x <= self.max_x && self.min_y <= other.min_y && other.max_y <= self.max_y
	}

	/// Grows the envelope outward on all four sides.
	#[must_use]
	pub fn expand(&self, distance: f64) -> Envelope {
		Self::new(
			self.min_x - distance,
			self.min_y - distance,
			self.max_x + distance,
			self.max_y + distance,
		)
	}

	pub fn is_finite(&self) -> bool {
		self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
	}

	pub fn to_aabb(&self) -> AABB<[f64; 2]> {
		AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
	}
}

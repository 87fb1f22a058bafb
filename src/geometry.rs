use crate::envelope::Envelope;
use anyhow::{Result, anyhow, bail};
use geo::dimensions::{Dimensions, HasDimensions};
use geo::{Area, BooleanOps, Coord, Geometry, Intersects, Line, LineString, MultiPolygon, Point, Polygon, Relate};
use std::str::FromStr;
use wkt::Wkt;

/// A parsed geometry together with its cached envelope.
///
/// Instances are exclusively owned by the tile bucket that read them and are
/// dropped as a unit when the bucket is released, so no geometry ever
/// outlives its tile.
#[derive(Clone, Debug)]
pub struct TileGeometry {
	geometry: Geometry<f64>,
	envelope: Envelope,
}

impl TileGeometry {
	/// Wraps a geometry, caching its envelope.
	/// Returns `None` for geometries without any extent (e.g. `POLYGON EMPTY`),
	/// which can never participate in an envelope-driven join.
	pub fn from_geometry(geometry: Geometry<f64>) -> Option<Self> {
		let envelope = Envelope::of(&geometry)?;
		Some(Self { geometry, envelope })
	}

	/// Parses one well-known-text geometry.
	///
	/// `Ok(None)` marks a geometry without extent; a syntax error or an
	/// unsupported type is an `Err` and aborts the run.
	pub fn from_wkt(text: &str) -> Result<Option<Self>> {
		let parsed: Wkt<f64> = Wkt::from_str(text).map_err(|e| anyhow!("invalid WKT geometry {text:?}: {e}"))?;
		Ok(Self::from_geometry(wkt_to_geometry(parsed)?))
	}

	pub fn envelope(&self) -> &Envelope {
		&self.envelope
	}

	pub fn area(&self) -> f64 {
		self.geometry.unsigned_area()
	}

	/// Coordinates of the geometry if it is a single point.
	pub fn as_point(&self) -> Option<(f64, f64)> {
		match &self.geometry {
			Geometry::Point(p) => Some((p.x(), p.y())),
			_ => None,
		}
	}

	pub fn intersects(&self, other: &Self) -> bool {
		self.geometry.intersects(&other.geometry)
	}

	pub fn contains(&self, other: &Self) -> bool {
		self.geometry.relate(&other.geometry).is_contains()
	}

	pub fn within(&self, other: &Self) -> bool {
		self.geometry.relate(&other.geometry).is_within()
	}

	pub fn equals_topo(&self, other: &Self) -> bool {
		self.geometry.relate(&other.geometry).is_equal_topo()
	}

	/// The geometries intersect but their interiors do not.
	pub fn touches(&self, other: &Self) -> bool {
		let im = self.geometry.relate(&other.geometry);
		im.is_intersects() && im.matches("F********").unwrap_or(false)
	}

	/// Interiors intersect in a lower dimension than the inputs, with neither
	/// geometry containing the other.
	pub fn crosses(&self, other: &Self) -> bool {
		let da = dimension_rank(&self.geometry);
		let db = dimension_rank(&other.geometry);
		let im = self.geometry.relate(&other.geometry);
		if da < db {
			im.matches("T*T******").unwrap_or(false)
		} else if da > db {
			im.matches("T*****T**").unwrap_or(false)
		} else if da == 2 {
			// line/line crossing meets in a point
			im.matches("0********").unwrap_or(false)
		} else {
			false
		}
	}

	/// Interiors intersect in the common dimension while each geometry keeps
	/// some of its interior to itself.
	pub fn overlaps(&self, other: &Self) -> bool {
		let da = dimension_rank(&self.geometry);
		let db = dimension_rank(&other.geometry);
		if da != db {
			return false;
		}
		let im = self.geometry.relate(&other.geometry);
		if da == 2 {
			im.matches("1*T***T**").unwrap_or(false)
		} else {
			im.matches("T*T***T**").unwrap_or(false)
		}
	}

	/// Areas of the union and of the intersection of the two geometries.
	///
	/// Only polygonal inputs produce a positive intersection area; with a
	/// point or line on either side the union area degenerates to the sum of
	/// the input areas.
	pub fn overlay_areas(&self, other: &Self) -> (f64, f64) {
		match (self.polygonal(), other.polygonal()) {
			(Some(a), Some(b)) => (a.union(&b).unsigned_area(), a.intersection(&b).unsigned_area()),
			_ => (self.area() + other.area(), 0.0),
		}
	}

	fn polygonal(&self) -> Option<MultiPolygon<f64>> {
		match &self.geometry {
			Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
			Geometry::MultiPolygon(mp) => Some(mp.clone()),
			Geometry::Rect(r) => Some(MultiPolygon(vec![r.to_polygon()])),
			Geometry::Triangle(t) => Some(MultiPolygon(vec![t.to_polygon()])),
			_ => None,
		}
	}

	/// Squared minimum distance between the boundaries of two geometries.
	/// Only meaningful when the geometries do not intersect.
	pub fn min_distance_sq(&self, other: &Self) -> f64 {
		let mut segs1 = Vec::new();
		let mut segs2 = Vec::new();
		collect_segments(&self.geometry, &mut segs1);
		collect_segments(&other.geometry, &mut segs2);
		let mut best = f64::INFINITY;
		for a in &segs1 {
			for b in &segs2 {
				let d = segment_distance_sq(a, b);
				if d < best {
					best = d;
				}
			}
		}
		best
	}
}

fn dimension_rank(geometry: &Geometry<f64>) -> u8 {
	match geometry.dimensions() {
		Dimensions::Empty => 0,
		Dimensions::ZeroDimensional => 1,
		Dimensions::OneDimensional => 2,
		Dimensions::TwoDimensional => 3,
	}
}

/// Converts the parsed WKT tree into a geo geometry.
/// Geometry collections are rejected; the join is defined over the six
/// simple feature types.
fn wkt_to_geometry(item: wkt::Wkt<f64>) -> Result<Geometry<f64>> {
	Ok(match item {
		wkt::Wkt::Point(p) => Geometry::Point(convert_point(&p)?),
		wkt::Wkt::LineString(ls) => Geometry::LineString(convert_line_string(&ls)),
		wkt::Wkt::Polygon(p) => Geometry::Polygon(convert_polygon(&p)),
		wkt::Wkt::MultiPoint(mp) => {
			let points = mp.0.iter().map(convert_point).collect::<Result<Vec<_>>>()?;
			Geometry::MultiPoint(geo::MultiPoint(points))
		}
		wkt::Wkt::MultiLineString(mls) => {
			Geometry::MultiLineString(geo::MultiLineString(mls.0.iter().map(convert_line_string).collect()))
		}
		wkt::Wkt::MultiPolygon(mp) => {
			Geometry::MultiPolygon(MultiPolygon(mp.0.iter().map(convert_polygon).collect()))
		}
		wkt::Wkt::GeometryCollection(_) => bail!("geometry collections are not supported"),
	})
}

fn convert_coord(c: &wkt::types::Coord<f64>) -> Coord<f64> {
	Coord { x: c.x, y: c.y }
}

fn convert_point(p: &wkt::types::Point<f64>) -> Result<Point<f64>> {
	let c = p.0.as_ref().ok_or_else(|| anyhow!("empty point has no coordinates"))?;
	Ok(Point::new(c.x, c.y))
}

fn convert_line_string(ls: &wkt::types::LineString<f64>) -> LineString<f64> {
	LineString(ls.0.iter().map(convert_coord).collect())
}

fn convert_polygon(p: &wkt::types::Polygon<f64>) -> Polygon<f64> {
	let mut rings = p.0.iter().map(convert_line_string);
	let exterior = rings.next().unwrap_or_else(|| LineString(vec![]));
	Polygon::new(exterior, rings.collect())
}

fn collect_segments(geometry: &Geometry<f64>, out: &mut Vec<Line<f64>>) {
	match geometry {
		// a point is kept as a degenerate segment
		Geometry::Point(p) => out.push(Line::new(p.0, p.0)),
		Geometry::MultiPoint(mp) => {
			for p in &mp.0 {
				out.push(Line::new(p.0, p.0));
			}
		}
		Geometry::Line(l) => out.push(*l),
		Geometry::LineString(ls) => line_string_segments(ls, out),
		Geometry::MultiLineString(mls) => {
			for ls in &mls.0 {
				line_string_segments(ls, out);
			}
		}
		Geometry::Polygon(p) => polygon_segments(p, out),
		Geometry::MultiPolygon(mp) => {
			for p in &mp.0 {
				polygon_segments(p, out);
			}
		}
		Geometry::Rect(r) => polygon_segments(&r.to_polygon(), out),
		Geometry::Triangle(t) => polygon_segments(&t.to_polygon(), out),
		Geometry::GeometryCollection(gc) => {
			for g in &gc.0 {
				collect_segments(g, out);
			}
		}
	}
}

fn line_string_segments(ls: &LineString<f64>, out: &mut Vec<Line<f64>>) {
	if let [only] = ls.0.as_slice() {
		out.push(Line::new(*only, *only));
		return;
	}
	for pair in ls.0.windows(2) {
		out.push(Line::new(pair[0], pair[1]));
	}
}

fn polygon_segments(polygon: &Polygon<f64>, out: &mut Vec<Line<f64>>) {
	line_string_segments(polygon.exterior(), out);
	for ring in polygon.interiors() {
		line_string_segments(ring, out);
	}
}

fn point_segment_distance_sq(p: Coord<f64>, seg: &Line<f64>) -> f64 {
	let ab = Coord {
		x: seg.end.x - seg.start.x,
		y: seg.end.y - seg.start.y,
	};
	let ap = Coord {
		x: p.x - seg.start.x,
		y: p.y - seg.start.y,
	};
	let ab_sq = ab.x * ab.x + ab.y * ab.y;
	if ab_sq == 0.0 {
		// degenerate segment
		return ap.x * ap.x + ap.y * ap.y;
	}
	let t = ((ap.x * ab.x + ap.y * ab.y) / ab_sq).clamp(0.0, 1.0);
	let dx = p.x - (seg.start.x + t * ab.x);
	let dy = p.y - (seg.start.y + t * ab.y);
	dx * dx + dy * dy
}

fn segment_distance_sq(a: &Line<f64>, b: &Line<f64>) -> f64 {
	// the segments come from non-intersecting geometries, so the minimum is
	// attained at one of the four endpoints
	point_segment_distance_sq(a.start, b)
		.min(point_segment_distance_sq(a.end, b))
		.min(point_segment_distance_sq(b.start, a))
		.min(point_segment_distance_sq(b.end, a))
}

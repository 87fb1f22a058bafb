use crate::geometry::TileGeometry;
use anyhow::{Context, Result, anyhow, bail, ensure};
use geo::{Coord, Geometry, Rect};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Builds the rectangular query window of the containment filter.
pub fn window_from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<TileGeometry> {
	ensure!(
		min_x <= max_x && min_y <= max_y,
		"query window bounds are inverted: ({min_x} {min_y}) to ({max_x} {max_y})"
	);
	let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
	TileGeometry::from_geometry(Geometry::Polygon(rect.to_polygon()))
		.ok_or_else(|| anyhow!("query window has no extent"))
}

/// Reads the query window geometry from the first line of a WKT file.
pub fn window_from_file(path: &Path) -> Result<TileGeometry> {
	let file = File::open(path).with_context(|| format!("opening window file {}", path.display()))?;
	let mut first_line = String::new();
	BufReader::new(file)
		.read_line(&mut first_line)
		.with_context(|| format!("reading window file {}", path.display()))?;
	let text = first_line.trim_end();
	ensure!(!text.is_empty(), "window file {} is empty", path.display());
	TileGeometry::from_wkt(text)?.ok_or_else(|| anyhow!("query window has no extent"))
}

/// Streams tab separated records and echoes every line whose geometry
/// intersects the query window.
///
/// `geometry_column` counts from 1; column 0 holds the partition id. Lines
/// whose geometry text is shorter than two characters are skipped, a
/// malformed geometry aborts the run. Returns the number of echoed lines.
pub fn run_filter<R: BufRead, W: Write>(
	geometry_column: usize,
	window: &TileGeometry,
	input: R,
	mut output: W,
) -> Result<u64> {
	ensure!(geometry_column >= 1, "the geometry column must be at least 1");

	let mut matched = 0u64;
	for (number, line) in input.lines().enumerate() {
		let line = line.context("reading record from input")?;
		if line.is_empty() {
			continue;
		}
		let fields: Vec<&str> = line.split('\t').collect();
		let Some(text) = fields.get(geometry_column) else {
			bail!("input line {}: record has no geometry column {geometry_column}", number + 1);
		};
		if text.len() < 2 {
			continue;
		}
		let Some(geometry) = TileGeometry::from_wkt(text).with_context(|| format!("input line {}", number + 1))?
		else {
			continue;
		};
		if geometry.envelope().intersects(window.envelope()) && geometry.intersects(window) {
			writeln!(output, "{line}")?;
			matched += 1;
		}
	}
	output.flush()?;
	Ok(matched)
}

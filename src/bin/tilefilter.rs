use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use std::io::{BufWriter, stdin, stdout};
use std::path::PathBuf;
use tilejoin::window;

/// Containment filter over a geometry stream.
///
/// Reads tab separated records from standard input and echoes every line
/// whose geometry intersects the query window. The window is either the
/// given rectangle or, when a window file is present, the WKT geometry on
/// the file's first line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
struct Cli {
	/// Lower left corner of the query window
	min_x: f64,
	min_y: f64,

	/// Upper right corner of the query window
	max_x: f64,
	max_y: f64,

	/// Geometry column, counting from 1 (column 0 is the partition id)
	geomidx: usize,

	/// File holding the WKT of the query window on its first line;
	/// overrides the rectangle bounds
	window_file: Option<PathBuf>,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	let query_window = match &cli.window_file {
		Some(path) => window::window_from_file(path)?,
		None => window::window_from_bounds(cli.min_x, cli.min_y, cli.max_x, cli.max_y)?,
	};

	let matched = window::run_filter(
		cli.geomidx,
		&query_window,
		stdin().lock(),
		BufWriter::new(stdout().lock()),
	)?;
	log::info!("{matched} records intersect the query window");
	Ok(())
}

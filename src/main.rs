use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use std::io::{BufWriter, stdin, stdout};
use tilejoin::JoinArgs;
use tilejoin::run_join;

/// Per-tile spatial-join worker.
///
/// Reads tile-partitioned, tab separated records from standard input and
/// writes every pair satisfying the chosen spatial predicate to standard
/// output. Consecutive lines sharing a tile id form one tile; every tile is
/// joined independently.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[command(flatten)]
	query: JoinArgs,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	let op = cli.query.to_query_op()?;
	let summary = run_join(&op, stdin().lock(), BufWriter::new(stdout().lock()))?;
	log::info!(
		"joined {} tiles into {} pairs ({} records skipped)",
		summary.tiles,
		summary.pairs,
		summary.skipped
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::Cli;
	use clap::Parser;

	#[test]
	fn parses_the_full_option_surface() {
		let cli = Cli::try_parse_from(vec![
			"tilejoin",
			"--predicate",
			"st_dwithin",
			"--shpidx1",
			"1",
			"--shpidx2",
			"2",
			"--distance",
			"1.5",
			"--fields",
			"1,2:1",
			"--stats",
			"a1,jac",
			"--tileid",
			"true",
		])
		.unwrap();
		let op = cli.query.to_query_op().unwrap();
		assert_eq!(op.shape_idx_1, 2);
		assert_eq!(op.shape_idx_2, Some(3));
		assert_eq!(op.expansion_distance, 1.5);
		assert!(op.append_tile_id);
	}

	#[test]
	fn short_forms_match_the_long_forms() {
		let cli = Cli::try_parse_from(vec![
			"tilejoin", "-p", "st_intersects", "-i", "1", "-j", "1", "-s", "uni", "-t", "false",
		])
		.unwrap();
		let op = cli.query.to_query_op().unwrap();
		assert_eq!(op.join_cardinality(), 2);
		assert!(!op.append_tile_id);
	}

	#[test]
	fn missing_predicate_is_a_configuration_error() {
		let cli = Cli::try_parse_from(vec!["tilejoin", "-i", "1"]).unwrap();
		assert!(cli.query.to_query_op().is_err());
	}
}

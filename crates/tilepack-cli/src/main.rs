//! Tilepack CLI
//!
//! Splits a greyscale image into a grid of bit-packed, zstd-compressed tiles.
//!
//! ```text
//! tilepack [OPTIONS] <INFILE> [OUTDIR]
//! ```

mod args;
mod error;
mod logging;

use clap::Parser;

use tilepack_core::build_tiles_from_file;

use crate::args::Args;
use crate::error::CliError;

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        e.exit();
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    logging::init_logging(args.log_level())?;
    args.validate()?;

    build_tiles_from_file(
        &args.input,
        &args.options(),
        &args.output_target(),
        args.parallelism(),
    )?;
    Ok(())
}

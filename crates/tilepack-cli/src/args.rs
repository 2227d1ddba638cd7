//! Command-line argument definitions and conversion into core options

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::Level;

use tilepack_core::{
    Options, OutputTarget, Parallelism, DEFAULT_BITS_PER_PIXEL, DEFAULT_COMPRESSION_LEVEL,
    DEFAULT_MARGIN, DEFAULT_SUBDIVISIONS,
};

use crate::error::CliError;

/// Longest accepted input or output path, in bytes.
pub const MAX_PATH_LEN: usize = 255;

#[derive(Parser, Debug)]
#[command(name = "tilepack", version)]
#[command(about = "Converts a jpeg or png image into zstd compressed tiles", long_about = None)]
pub struct Args {
    /// Number of subdivisions. Produces 2^(2n) tiles
    #[arg(short = 'n', long, value_name = "SUBDIVS", default_value_t = DEFAULT_SUBDIVISIONS)]
    pub subdivisions: u8,

    /// Bits per pixel of the resulting data (1-8)
    #[arg(
        short = 'b',
        long = "bpp",
        value_name = "BPP",
        default_value_t = DEFAULT_BITS_PER_PIXEL,
        value_parser = clap::value_parser!(u8).range(1..=8)
    )]
    pub bits_per_pixel: u8,

    /// Add a margin to each interior tile, containing pixels from neighbors
    #[arg(short = 'm', long, value_name = "MARGIN", default_value_t = DEFAULT_MARGIN)]
    pub margin: u8,

    /// The zstd compression level
    #[arg(
        short = 'c',
        long = "compression",
        value_name = "LEVEL",
        default_value_t = DEFAULT_COMPRESSION_LEVEL
    )]
    pub compression_level: u8,

    /// Worker threads (1 = serial, default: one per core)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Log every tile written
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Input image (jpeg or png)
    #[arg(value_name = "INFILE")]
    pub input: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTDIR")]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    /// Reject inputs clap cannot express.
    pub fn validate(&self) -> Result<(), CliError> {
        check_path_len("input file", &self.input)?;
        if let Some(dir) = &self.output_dir {
            check_path_len("output directory", dir)?;
        }
        Ok(())
    }

    pub fn options(&self) -> Options {
        Options {
            subdivisions: self.subdivisions,
            bits_per_pixel: self.bits_per_pixel,
            margin: self.margin,
            compression_level: self.compression_level,
        }
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget::from_optional(self.output_dir.clone())
    }

    pub fn parallelism(&self) -> Parallelism {
        Parallelism::from_jobs(self.jobs)
    }

    /// Default log level when `RUST_LOG` is unset.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

fn check_path_len(what: &str, path: &Path) -> Result<(), CliError> {
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(CliError::InvalidArgument(format!(
            "{} path too long ({} bytes, max {})",
            what,
            path.as_os_str().len(),
            MAX_PATH_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["tilepack", "in.png"]).unwrap();
        assert_eq!(args.options(), Options::default());
        assert_eq!(args.output_target(), OutputTarget::CurrentDir);
        assert_eq!(args.parallelism(), Parallelism::Auto);
        assert_eq!(args.log_level(), Level::INFO);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "tilepack", "-n", "3", "-b", "4", "-m", "2", "-c", "19", "-j", "1", "in.png", "tiles",
        ])
        .unwrap();

        assert_eq!(
            args.options(),
            Options {
                subdivisions: 3,
                bits_per_pixel: 4,
                margin: 2,
                compression_level: 19,
            }
        );
        assert_eq!(
            args.output_target(),
            OutputTarget::Directory(PathBuf::from("tiles"))
        );
        assert_eq!(args.parallelism(), Parallelism::Serial);
    }

    #[test]
    fn test_bpp_out_of_range() {
        assert!(Args::try_parse_from(["tilepack", "-b", "0", "in.png"]).is_err());
        assert!(Args::try_parse_from(["tilepack", "-b", "9", "in.png"]).is_err());
    }

    #[test]
    fn test_missing_input() {
        assert!(Args::try_parse_from(["tilepack"]).is_err());
    }

    #[test]
    fn test_too_many_positionals() {
        assert!(Args::try_parse_from(["tilepack", "a.png", "out", "extra"]).is_err());
    }

    #[test]
    fn test_long_path_rejected() {
        let long = "x".repeat(MAX_PATH_LEN + 1);
        let args = Args::try_parse_from(["tilepack", long.as_str()]).unwrap();
        assert!(matches!(args.validate(), Err(CliError::InvalidArgument(_))));

        let args = Args::try_parse_from(["tilepack", "in.png", long.as_str()]).unwrap();
        assert!(args.validate().is_err());

        let args = Args::try_parse_from(["tilepack", "in.png", "out"]).unwrap();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level_flags() {
        let args = Args::try_parse_from(["tilepack", "-v", "in.png"]).unwrap();
        assert_eq!(args.log_level(), Level::DEBUG);
        let args = Args::try_parse_from(["tilepack", "-q", "in.png"]).unwrap();
        assert_eq!(args.log_level(), Level::WARN);
        assert!(Args::try_parse_from(["tilepack", "-q", "-v", "in.png"]).is_err());
    }
}

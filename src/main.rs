//! binary subset pipeline tool.
//!
//! Takes font family directories structured as `original/` + `def/*.lst`
//! and produces per-subset font files under `subset/<weight>/` along with a
//! `style.css` of `@font-face` rules.

use clap::{ArgAction, Parser};
use log::LevelFilter;
use subsplit::services::{CharmapInspector, CommandSubsetter};
use subsplit::{process_family, AutoRest, Options};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Font family directories, each containing `original/` and `def/`.
    #[arg(required = true)]
    font: Vec<String>,

    /// Lower the log level threshold by one per use.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Raise the log level threshold by one per use.
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,

    /// Calculate a '10000.rest' subset from leftover codepoints.
    #[arg(short = 'r', long)]
    autorest: bool,

    /// (Over)write 'def/10000.rest.lst' as calculated; implies --autorest.
    #[arg(short = 'R', long)]
    save_autorest: bool,

    /// External subsetting command (fonttools-compatible CLI).
    #[arg(long, default_value = "fonttools")]
    subsetter: String,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(log_level(args.verbose, args.quiet))
        .init();

    let options = Options {
        auto_rest: if args.save_autorest {
            AutoRest::Persist
        } else if args.autorest {
            AutoRest::Synthesize
        } else {
            AutoRest::Off
        },
        ..Options::default()
    };

    let inspector = CharmapInspector;
    let subsetter = CommandSubsetter::new(&args.subsetter);

    for family in &args.font {
        if let Err(e) = process_family(family, &options, &inspector, &subsetter) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Warn by default; every `-v` lowers the threshold one level, every `-q`
/// raises it.
fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = 2 + i32::from(verbose) - i32::from(quiet);
    LEVELS[index.clamp(0, LEVELS.len() as i32 - 1) as usize]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn log_level_tracks_verbosity() {
        assert_eq!(log_level(0, 0), LevelFilter::Warn);
        assert_eq!(log_level(1, 0), LevelFilter::Info);
        assert_eq!(log_level(3, 0), LevelFilter::Trace);
        assert_eq!(log_level(9, 0), LevelFilter::Trace);
        assert_eq!(log_level(0, 1), LevelFilter::Error);
        assert_eq!(log_level(0, 5), LevelFilter::Off);
        assert_eq!(log_level(2, 1), LevelFilter::Info);
    }
}

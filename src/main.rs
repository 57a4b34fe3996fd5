//! `prodsched` — operator CLI for the schedule transcoder.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use prodsched_lib::encoder::encode_raw_schedule;
use prodsched_lib::error::CodecErrorReport;
use prodsched_lib::model::CliModel;
use prodsched_lib::recovery::parse_raw_schedule;
use prodsched_lib::state::load_config;
use prodsched_lib::types::schedule_to_raw;
use prodsched_lib::{decode_schedule, MergeCodeStrategy, PipelineError, RecoveryGate, Transcoder};

#[derive(Parser, Debug)]
#[command(name = "prodsched")]
#[command(about = "Production schedule transcoder: stripe JSON <-> merge-coded day lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Give every contiguous run its own merge code
    #[arg(long, global = true)]
    by_run: bool,

    /// Require every day of the month to be present when rendering
    #[arg(long, global = true)]
    strict: bool,
}

/// Reference month for day lines, which carry no year
#[derive(Args, Debug, Clone, Copy)]
struct MonthArgs {
    #[arg(long)]
    year: i32,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a JSON day list as day-line text
    Encode {
        /// Schedule JSON file ("-" or omitted for stdin)
        input: Option<PathBuf>,
    },
    /// Parse day-line text into a JSON day list
    Decode {
        /// Day-line text file ("-" or omitted for stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        month: MonthArgs,
    },
    /// Pass text through, or re-render a JSON reply as day-line text
    Recover {
        /// Service reply file ("-" or omitted for stdin)
        input: Option<PathBuf>,
    },
    /// Transcribe calendar images through the model
    Recognize {
        /// Calendar images
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[command(flatten)]
        month: MonthArgs,
    },
    /// Build a schedule from a free-text description through the model
    Generate {
        /// Description file ("-" or omitted for stdin)
        input: Option<PathBuf>,

        #[command(flatten)]
        month: MonthArgs,
    },
}

fn read_input(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

fn report(err: &PipelineError) -> String {
    let report = CodecErrorReport::from(err);
    format!("{}\n  hint: {}", report.message, report.recovery_suggestion)
}

async fn run(cli: Cli) -> Result<String, String> {
    let mut config = load_config()?;
    if cli.by_run {
        config.merge_codes = MergeCodeStrategy::ByRun;
    }
    if cli.strict {
        config.require_full_month = true;
    }
    let options = config.encode_options();

    match cli.command {
        Commands::Encode { input } => {
            let input = read_input(input.as_ref())?;
            let raw = parse_raw_schedule(&input).map_err(|e| report(&PipelineError::from(e)))?;
            encode_raw_schedule(raw, &options).map_err(|e| report(&PipelineError::from(e)))
        }
        Commands::Decode { input, month } => {
            let input = read_input(input.as_ref())?;
            let days = decode_schedule(&input, month.year, month.month)
                .map_err(|e| report(&PipelineError::from(e)))?;
            serde_json::to_string_pretty(&schedule_to_raw(&days))
                .map_err(|e| format!("Failed to serialize schedule: {}", e))
        }
        Commands::Recover { input } => {
            let input = read_input(input.as_ref())?;
            let outcome = RecoveryGate::new(options)
                .apply(&input)
                .map_err(|e| report(&PipelineError::from(e)))?;
            Ok(outcome.into_text())
        }
        Commands::Recognize { images, month } => {
            let transcoder = Transcoder::new(CliModel::new(&config.model), config);
            transcoder
                .recognize_calendar(&images, month.year, month.month)
                .await
                .map_err(|e| report(&e))
        }
        Commands::Generate { input, month } => {
            let description = read_input(input.as_ref())?;
            let transcoder = Transcoder::new(CliModel::new(&config.model), config);
            let days = transcoder
                .describe_to_schedule(&description, month.year, month.month)
                .await
                .map_err(|e| report(&e))?;
            serde_json::to_string_pretty(&schedule_to_raw(&days))
                .map_err(|e| format!("Failed to serialize schedule: {}", e))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_parses_month_and_flags() {
        let cli = Cli::try_parse_from([
            "prodsched", "decode", "feb.txt", "--year", "2026", "--month", "2", "--by-run",
        ])
        .unwrap();
        assert!(cli.by_run);
        match cli.command {
            Commands::Decode { input, month } => {
                assert_eq!(input, Some(PathBuf::from("feb.txt")));
                assert_eq!((month.year, month.month), (2026, 2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_misspelled_flag_is_rejected() {
        let err = Cli::try_parse_from([
            "prodsched", "decode", "--yaer", "2026", "--month", "2", "f.txt",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_decode_requires_year_and_month() {
        let err = Cli::try_parse_from(["prodsched", "decode", "f.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_month_out_of_range_rejected() {
        assert!(Cli::try_parse_from([
            "prodsched", "generate", "--year", "2026", "--month", "13",
        ])
        .is_err());
    }

    #[test]
    fn test_recognize_requires_images() {
        assert!(Cli::try_parse_from(["prodsched", "recognize", "--year", "2026", "--month", "2"])
            .is_err());
        let cli = Cli::try_parse_from([
            "prodsched", "recognize", "a.png", "b.png", "--year", "2026", "--month", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Recognize { images, .. } => assert_eq!(images.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_encode_needs_no_month() {
        let cli = Cli::try_parse_from(["prodsched", "encode", "--strict"]).unwrap();
        assert!(cli.strict);
        assert!(matches!(cli.command, Commands::Encode { input: None }));
    }
}

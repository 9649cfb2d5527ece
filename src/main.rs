use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{debug, error};
use mcqeval::libmcq::eval::{run, EvalConfig, EvalSummary, SourceConfig};
use mcqeval::Choice;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mcqeval")]
#[command(version, about = "Evaluate MCQ for competition - generates TXT file with index and answer columns", long_about = None)]
struct Args {
    /// MCQ JSON file
    #[arg(long, value_name = "FILE")]
    mcq_data: PathBuf,
    /// Directories to search for images, in order
    #[arg(long, value_name = "DIR", num_args = 1.., required = true)]
    image_dirs: Vec<PathBuf>,
    /// Results TXT file (format: index answer)
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
    /// Use random predictions instead of a model
    #[arg(long, conflicts_with_all = ["responses", "model_cmd"])]
    random: bool,
    /// Seed for --random
    #[arg(long, requires = "random")]
    seed: Option<u64>,
    /// JSON object of recorded model responses keyed by image name
    #[arg(long, value_name = "FILE", conflicts_with = "model_cmd")]
    responses: Option<PathBuf>,
    /// Model program, run as `<PROGRAM> <image>` with the prompt on stdin
    #[arg(long, value_name = "PROGRAM")]
    model_cmd: Option<PathBuf>,
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> EvalConfig {
        let source = if self.random {
            SourceConfig::Random { seed: self.seed }
        } else if let Some(path) = self.responses {
            SourceConfig::Replay(path)
        } else if let Some(program) = self.model_cmd {
            SourceConfig::Command(program)
        } else {
            SourceConfig::Unconfigured
        };
        EvalConfig {
            mcq_data: self.mcq_data,
            image_dirs: self.image_dirs,
            output: self.output,
            source,
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();
    debug!("[Setup] {:?}", args);

    let config = args.into_config();
    let outcome = match run(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}", format!("{}!", e).red());
            std::process::exit(1);
        }
    };

    print_summary(&outcome.summary);
    println!(
        "{}",
        format!("Results saved to: {}", config.output.display()).cyan()
    );
}

fn print_summary(summary: &EvalSummary) {
    println!(
        "{}",
        format!(
            "==========> {} / {} questions answered <==========",
            summary.written, summary.total
        )
        .cyan()
    );
    if summary.skipped() > 0 {
        println!(
            "{}",
            format!(
                "Skipped {} (no image name: {}, no index: {}, image not found: {})",
                summary.skipped(),
                summary.missing_name,
                summary.no_index,
                summary.image_not_found
            )
            .yellow()
        );
    }
    if summary.inference_failures > 0 {
        println!(
            "{}",
            format!(
                "{} answers defaulted to D after inference errors",
                summary.inference_failures
            )
            .bright_red()
        );
    }
    let distribution = Choice::ALL
        .iter()
        .map(|c| format!("{}: {}", c, summary.distribution.get(c).unwrap_or(&0)))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", distribution.bold());
}

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use samplr_core::{ExistingPolicy, SampleError, SampleOptions, StrategySpec};

#[derive(Parser)]
#[command(name = "samplr", version, about = "Sample images from a time-lapse folder and copy them with sequential names")]
#[command(group(ArgGroup::new("strategy").required(true).args(["every_nth", "closest_to", "time_range"])))]
struct Cli {
    /// Source directory containing images
    source: PathBuf,

    /// Destination directory for sampled images (created if missing)
    destination: PathBuf,

    /// Sample every Nth image across the whole sequence
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    every_nth: Option<i64>,

    /// Sample the image closest to this time (HH:MM) each day
    #[arg(long, value_name = "HH:MM")]
    closest_to: Option<String>,

    /// Sample every Nth image between START and END (HH:MM, inclusive) each day
    #[arg(long, num_args = 3, value_names = ["N", "START", "END"], allow_negative_numbers = true)]
    time_range: Option<Vec<String>>,

    /// Base name for output files (default: derived from first image, replacing 'CO' with 'SM')
    #[arg(long)]
    base_name: Option<String>,

    /// How to treat files already in the destination
    #[arg(long, value_enum, default_value_t = ExistingPolicy::Overwrite)]
    on_existing: ExistingPolicy,

    /// Show what would be copied without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level: error, warn, info, debug, trace (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn strategy(&self) -> Result<StrategySpec, SampleError> {
        if let Some(n) = self.every_nth {
            return Ok(StrategySpec::EveryNth { n });
        }
        if let Some(time) = &self.closest_to {
            return Ok(StrategySpec::ClosestTo { time: time.clone() });
        }
        match self.time_range.as_deref() {
            Some([n, start, end]) => {
                let n = n.parse::<i64>().map_err(|_| SampleError::InvalidParameter {
                    name: "time_range.n",
                    reason: format!("expected an integer, got {:?}", n),
                })?;
                Ok(StrategySpec::TimeRange {
                    n,
                    start: start.clone(),
                    end: end.clone(),
                })
            }
            _ => Err(SampleError::InvalidParameter {
                name: "strategy",
                reason: "one of --every-nth, --closest-to or --time-range is required".to_string(),
            }),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    let t_total = std::time::Instant::now();

    let options = SampleOptions {
        source: cli.source.clone(),
        destination: cli.destination.clone(),
        strategy: cli.strategy()?,
        base_name: cli.base_name.clone(),
        on_existing: cli.on_existing,
        dry_run: cli.dry_run,
    };
    debug!("{:?}", options);

    let pb = ProgressBar::hidden();
    if !cli.json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }
    pb.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}")?);

    let result = samplr_core::sample(&options, &|stage, current, total, message| {
        pb.set_length(total);
        pb.set_position(current + 1);
        pb.set_message(format!("[{}] {}", stage, message));
    });
    pb.finish_and_clear();
    let report = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.dry_run {
        for f in &report.files {
            println!("{} -> {}", f.source.display(), options.destination.join(&f.file_name).display());
        }
        println!(
            "Dry run: would copy {} of {} images to {}",
            report.images_selected,
            report.images_found,
            options.destination.display()
        );
    } else {
        println!(
            "Successfully copied {} images to {}",
            report.files_copied,
            options.destination.display()
        );
    }
    debug!("Finished in {:.2}s", t_total.elapsed().as_secs_f64());

    Ok(())
}

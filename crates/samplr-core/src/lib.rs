pub mod date;
pub mod error;
pub mod group;
pub mod media;
pub mod naming;
pub mod scan;
pub mod strategy;
pub mod writer;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

pub use error::{Result, SampleError};
pub use media::{TimestampSource, TimestampedImage};
pub use naming::{OutputPlan, PlannedCopy};
pub use strategy::{Select, Strategy, StrategySpec};
pub use writer::ExistingPolicy;

/// Everything a front-end decides for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub strategy: StrategySpec,
    /// Output base name; derived from the first selected image when absent
    #[serde(default)]
    pub base_name: Option<String>,
    #[serde(default)]
    pub on_existing: ExistingPolicy,
    /// Plan only: do not create the destination or copy anything
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleReport {
    pub images_found: u64,
    pub images_selected: u64,
    pub files_copied: u64,
    /// `None` when nothing was selected
    pub base_name: Option<String>,
    pub dry_run: bool,
    pub files: Vec<PlannedCopy>,
}

/// Type alias for progress callback. The callback may borrow from the caller.
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Throttled progress reporter - emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback<'a>,
    last_emit: Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback<'a>) -> Self {
        let start = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        Self {
            inner,
            last_emit: Mutex::new(start),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            let mut last = self.last_emit.lock().unwrap_or_else(|e| e.into_inner());
            if last.elapsed() < Duration::from_millis(200) {
                return;
            }
            *last = Instant::now();
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Run the full sampling pipeline: validate, enumerate, select, name, copy.
///
/// Parameter errors surface before any filesystem access. Per-file metadata
/// problems fall back to the modification time; a failed copy aborts the run.
pub fn sample(options: &SampleOptions, progress_callback: &ProgressCallback<'_>) -> Result<SampleReport> {
    let tp = ThrottledProgress::new(progress_callback);

    // Stage 1: Validate
    let strategy = options.strategy.build()?;
    if let Some(name) = &options.base_name {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(SampleError::invalid(
                "base_name",
                format!("must be a non-empty file name, got {:?}", name),
            ));
        }
    }

    // Stage 2: Enumerate and resolve timestamps
    let images = scan::scan_images(&options.source, &tp)?;

    // Stage 3: Select
    let selected = strategy.select(&images);
    info!("Selected {} of {} image(s): {}", selected.len(), images.len(), strategy);

    let base_name = match (&options.base_name, selected.first()) {
        (Some(name), _) => Some(name.clone()),
        (None, Some(first)) => Some(naming::derive_base_name(first.path())),
        (None, None) => None,
    };

    // Stage 4: Plan names
    let first_counter = match (&base_name, options.on_existing) {
        (Some(name), ExistingPolicy::Continue) => naming::next_counter_after_existing(&options.destination, name)
            .map_err(|e| SampleError::DestinationUnwritable {
                path: options.destination.clone(),
                source: e,
            })?,
        _ => 1,
    };
    let plan = OutputPlan::new(
        &selected,
        base_name.as_deref().unwrap_or(naming::DEFAULT_BASE_NAME),
        &options.destination,
        first_counter,
    );
    writer::ensure_sources_untouched(&plan, &images)?;
    if options.on_existing == ExistingPolicy::Refuse {
        writer::ensure_no_collisions(&plan)?;
    }

    // Stage 5: Copy
    let files_copied = if options.dry_run {
        0
    } else {
        writer::prepare_destination(&options.destination)?;
        writer::write_output(&plan, &tp)?
    };

    Ok(SampleReport {
        images_found: images.len() as u64,
        images_selected: selected.len() as u64,
        files_copied: files_copied as u64,
        base_name,
        dry_run: options.dry_run,
        files: plan.entries,
    })
}

//! Matching artwork to catalog entries and converting it in bulk.
//!
//! A run has two phases. [`plan_conversion`] pairs images with games and
//! decides every output path up front; [`execute_plan`] then transcodes the
//! planned jobs on a [`WorkerPool`]. Nothing a single job does can stop the
//! rest of the batch.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use retro_ipa_dat::{CatalogIndex, ImageIndex, MatchMethod, parse_dat_file};
use retro_ipa_image::{Dimensions, TranscodeOptions, transcode_file};

use crate::error::ConvertError;
use crate::worker_pool::WorkerPool;

/// Extension of every written file.
pub const OUTPUT_EXTENSION: &str = "bin";

/// Which side of the pairing drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// One job per image file: find the catalog game named in the file name
    Filename,
    /// One job per catalog game: find the image file named after the game
    #[default]
    Catalog,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Filename => "filename",
            MatchMode::Catalog => "catalog",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string cannot be parsed into a `MatchMode`.
#[derive(Debug, Clone)]
pub struct MatchModeParseError(pub String);

impl fmt::Display for MatchModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown match mode: '{}' (expected 'catalog' or 'filename')",
            self.0
        )
    }
}

impl std::error::Error for MatchModeParseError {}

impl std::str::FromStr for MatchMode {
    type Err = MatchModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filename" | "file" | "image" => Ok(MatchMode::Filename),
            "catalog" | "dat" | "game" => Ok(MatchMode::Catalog),
            _ => Err(MatchModeParseError(s.to_string())),
        }
    }
}

/// Options controlling a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub mode: MatchMode,
    /// Worker count; `None` uses the available hardware parallelism
    pub jobs: Option<usize>,
    pub transcode: TranscodeOptions,
}

impl ConvertOptions {
    pub fn worker_count(&self) -> usize {
        match self.jobs {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// One image to convert and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertJob {
    pub source: PathBuf,
    /// Catalog title the image was matched to
    pub title: String,
    pub checksum: String,
    pub target: PathBuf,
    pub method: MatchMethod,
}

impl ConvertJob {
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Why an input produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Filename mode: no catalog title appears in the file name
    NoGameForImage { file_name: String },
    /// Catalog mode: no image file is named after the game
    NoImageForGame { title: String },
    /// The game was found but none of its ROMs gives a usable checksum
    NoChecksum { title: String, file_name: String },
    /// The checksum cannot be used as a file name
    InvalidChecksum { title: String, checksum: String },
    /// Another job already writes this checksum
    DuplicateTarget {
        checksum: String,
        file_name: String,
        title: String,
        kept_title: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoGameForImage { file_name } => {
                write!(f, "No catalog entry for {file_name}")
            }
            SkipReason::NoImageForGame { title } => write!(f, "No image found for \"{title}\""),
            SkipReason::NoChecksum { title, file_name } => {
                write!(f, "No checksum for \"{title}\" (matched {file_name})")
            }
            SkipReason::InvalidChecksum { title, checksum } => {
                write!(f, "Unusable checksum \"{checksum}\" for \"{title}\"")
            }
            SkipReason::DuplicateTarget {
                checksum,
                file_name,
                title,
                kept_title,
            } => write!(
                f,
                "{file_name} (\"{title}\") would overwrite {checksum}.{OUTPUT_EXTENSION}, \
                 already claimed by \"{kept_title}\""
            ),
        }
    }
}

/// The full set of decisions for a run.
#[derive(Debug, Clone, Default)]
pub struct ConvertPlan {
    pub jobs: Vec<ConvertJob>,
    pub skipped: Vec<SkipReason>,
}

/// Result of running one job.
#[derive(Debug)]
pub enum JobOutcome {
    Written { job: ConvertJob, size: Dimensions },
    Failed { job: ConvertJob, error: ConvertError },
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub written: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Parse a catalog file into an index.
pub fn load_catalog(path: &Path) -> Result<CatalogIndex, ConvertError> {
    let catalog = parse_dat_file(path)?;
    log::debug!(
        "Loaded catalog \"{}\" version {} ({} games)",
        catalog.name,
        catalog.version,
        catalog.games.len()
    );
    Ok(CatalogIndex::from_catalog(catalog))
}

/// Load the catalog, check both folders and plan the run.
///
/// Every error here is fatal for the run; nothing has been written yet.
pub fn prepare(
    catalog_path: &Path,
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<(CatalogIndex, ConvertPlan), ConvertError> {
    let catalog = load_catalog(catalog_path)?;

    for dir in [input_dir, output_dir] {
        if !dir.is_dir() {
            return Err(ConvertError::not_a_directory(dir.display().to_string()));
        }
    }

    let images = ImageIndex::scan(input_dir)
        .map_err(|e| ConvertError::scan(format!("{}: {e}", input_dir.display())))?;
    if images.is_empty() {
        log::warn!("No files found in {}", input_dir.display());
    } else {
        log::debug!("Found {} files in {}", images.len(), input_dir.display());
    }

    let plan = plan_conversion(&catalog, &images, output_dir, options.mode);
    Ok((catalog, plan))
}

/// Pair images with games and assign an output path to each pair.
///
/// When two pairs resolve to the same checksum (compared case-insensitively)
/// the first one in work order keeps it and the later ones are skipped.
pub fn plan_conversion(
    catalog: &CatalogIndex,
    images: &ImageIndex,
    output_dir: &Path,
    mode: MatchMode,
) -> ConvertPlan {
    let mut plan = ConvertPlan::default();
    // Lowercased checksum → title of the job that claimed it
    let mut claimed: HashMap<String, String> = HashMap::new();

    let mut add = |plan: &mut ConvertPlan,
                   source: &Path,
                   file_name: &str,
                   title: &str,
                   checksum: &str,
                   method: MatchMethod| {
        if !is_usable_checksum(checksum) {
            plan.skipped.push(SkipReason::InvalidChecksum {
                title: title.to_string(),
                checksum: checksum.to_string(),
            });
            return;
        }
        if let Some(kept_title) = claimed.get(&checksum.to_lowercase()) {
            plan.skipped.push(SkipReason::DuplicateTarget {
                checksum: checksum.to_string(),
                file_name: file_name.to_string(),
                title: title.to_string(),
                kept_title: kept_title.clone(),
            });
            return;
        }
        claimed.insert(checksum.to_lowercase(), title.to_string());
        plan.jobs.push(ConvertJob {
            source: source.to_path_buf(),
            title: title.to_string(),
            checksum: checksum.to_string(),
            target: output_dir.join(format!("{checksum}.{OUTPUT_EXTENSION}")),
            method,
        });
    };

    match mode {
        MatchMode::Filename => {
            for file in images.files() {
                match catalog.match_filename(&file.file_name) {
                    Some(m) => add(
                        &mut plan,
                        &file.path,
                        &file.file_name,
                        &m.game.title,
                        m.checksum(),
                        m.method,
                    ),
                    None => plan.skipped.push(SkipReason::NoGameForImage {
                        file_name: file.file_name.clone(),
                    }),
                }
            }
        }
        MatchMode::Catalog => {
            for game in catalog.games() {
                let Some((file, method)) = images.find_for_title(&game.title) else {
                    plan.skipped.push(SkipReason::NoImageForGame {
                        title: game.title.clone(),
                    });
                    continue;
                };
                match catalog.resolve_checksum(&game.title) {
                    Some(checksum) => add(
                        &mut plan,
                        &file.path,
                        &file.file_name,
                        &game.title,
                        checksum,
                        method,
                    ),
                    None => plan.skipped.push(SkipReason::NoChecksum {
                        title: game.title.clone(),
                        file_name: file.file_name.clone(),
                    }),
                }
            }
        }
    }

    plan
}

/// Checksums become file names, so only plain alphanumeric ones are accepted.
fn is_usable_checksum(checksum: &str) -> bool {
    !checksum.is_empty() && checksum.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Run every planned job and wait for all of them to finish.
///
/// `on_outcome` is called once per job as results arrive, in completion
/// order. Failed jobs are reported there and counted; they never abort the
/// batch.
pub async fn execute_plan(
    plan: ConvertPlan,
    options: &ConvertOptions,
    mut on_outcome: impl FnMut(&JobOutcome),
) -> ConvertSummary {
    let mut summary = ConvertSummary {
        skipped: plan.skipped.len(),
        ..Default::default()
    };
    let transcode = options.transcode;

    let mut pool = WorkerPool::start(options.worker_count(), plan.jobs, move |job| async move {
        let fallback = job.clone();
        match tokio::task::spawn_blocking(move || run_job(job, &transcode)).await {
            Ok(outcome) => outcome,
            Err(e) => JobOutcome::Failed {
                job: fallback,
                error: ConvertError::worker(e.to_string()),
            },
        }
    });

    while let Some(outcome) = pool.recv().await {
        match &outcome {
            JobOutcome::Written { .. } => summary.written += 1,
            JobOutcome::Failed { .. } => summary.failed += 1,
        }
        on_outcome(&outcome);
    }

    summary
}

fn run_job(job: ConvertJob, options: &TranscodeOptions) -> JobOutcome {
    log::debug!(
        "Converting {} to {}",
        job.source.display(),
        job.target.display()
    );
    match transcode_file(&job.source, &job.target, options) {
        Ok(size) => JobOutcome::Written { job, size },
        Err(e) => JobOutcome::Failed {
            job,
            error: e.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("catalog".parse::<MatchMode>().unwrap(), MatchMode::Catalog);
        assert_eq!("Filename".parse::<MatchMode>().unwrap(), MatchMode::Filename);
        assert!("bogus".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::default(), MatchMode::Catalog);
    }

    #[test]
    fn test_worker_count() {
        let explicit = ConvertOptions {
            jobs: Some(3),
            ..Default::default()
        };
        assert_eq!(explicit.worker_count(), 3);

        let auto = ConvertOptions {
            jobs: Some(0),
            ..Default::default()
        };
        assert!(auto.worker_count() >= 1);
    }

    #[test]
    fn test_usable_checksum() {
        assert!(is_usable_checksum("ABCDEF12"));
        assert!(is_usable_checksum("599ead9b"));
        assert!(!is_usable_checksum(""));
        assert!(!is_usable_checksum("../etc"));
        assert!(!is_usable_checksum("ab cd"));
    }
}

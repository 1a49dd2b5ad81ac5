//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use retro_ipa_lib::{ConvertOptions, DEFAULT_TARGET_HEIGHT, MatchMode, TranscodeOptions};

#[derive(Parser)]
#[command(name = "retro-ipa", version)]
#[command(about = "Convert cover art into IPA files named by DAT checksums", long_about = None)]
pub(crate) struct Cli {
    /// Logiqx XML DAT file listing games and ROM checksums
    pub catalog: PathBuf,

    /// Folder of source images
    pub input_dir: PathBuf,

    /// Existing folder that receives <checksum>.bin files
    pub output_dir: PathBuf,

    /// Which side drives matching: "catalog" (one output per game) or
    /// "filename" (one output per image)
    #[arg(short, long, default_value_t = MatchMode::Catalog)]
    pub mode: MatchMode,

    /// Number of images converted in parallel (defaults to the CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output height in pixels
    #[arg(long, default_value_t = DEFAULT_TARGET_HEIGHT)]
    pub height: u16,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub(crate) fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            mode: self.mode,
            jobs: self.jobs,
            transcode: TranscodeOptions {
                target_height: self.height,
            },
        }
    }
}

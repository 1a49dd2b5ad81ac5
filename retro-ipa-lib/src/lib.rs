pub mod convert;
pub mod error;
pub mod worker_pool;

pub use convert::{
    ConvertJob, ConvertOptions, ConvertPlan, ConvertSummary, JobOutcome, MatchMode,
    MatchModeParseError, SkipReason, execute_plan, load_catalog, plan_conversion, prepare,
};
pub use error::ConvertError;
pub use worker_pool::WorkerPool;

pub use retro_ipa_dat::{CatalogIndex, ImageIndex, MatchMethod, Medium};
pub use retro_ipa_image::{DEFAULT_TARGET_HEIGHT, Dimensions, TranscodeOptions};

pub mod dat;
pub mod error;
pub mod image_index;
pub mod matcher;
pub mod normalize;

pub use dat::{Catalog, GameRecord, Medium, RomEntry, parse_dat, parse_dat_file};
pub use error::DatError;
pub use image_index::{ImageFile, ImageIndex};
pub use matcher::{CatalogIndex, GameMatch, MatchMethod, resolve_rom};
pub use normalize::{loose_key, normalize};

/// Characters that are illegal or ambiguous in file names on common
/// filesystems. Catalog titles may contain them; image names cannot.
const RESERVED_CHARS: [char; 11] = ['&', '/', ':', '*', '`', '<', '>', '?', '\\', '"', '|'];

/// Canonicalize a title or file name for comparison.
///
/// Every reserved character becomes `_`. Titles, stems and file names must
/// all go through this before being compared against each other.
pub fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Lowercase alphanumeric-only key for a name.
///
/// `"Bonk's Adventure"` and `"Bonks_Adventure"` share the key
/// `"bonksadventure"`. Only used for exact key equality, never substring
/// tests, since short keys collide easily.
pub fn loose_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

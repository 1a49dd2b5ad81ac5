use std::collections::HashMap;

use crate::dat::{Catalog, GameRecord, Medium, RomEntry};
use crate::normalize::{loose_key, normalize};

/// How a name was matched against its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized substring (or equality) test
    Normalized,
    /// Alphanumeric key equality, tried only when no normalized match exists
    Loose,
}

/// A catalog game matched to an input name, with its resolved ROM.
#[derive(Debug, Clone, Copy)]
pub struct GameMatch<'a> {
    pub game: &'a GameRecord,
    pub rom: &'a RomEntry,
    pub method: MatchMethod,
}

impl GameMatch<'_> {
    pub fn checksum(&self) -> &str {
        &self.rom.checksum
    }
}

/// An indexed, read-only view of a catalog.
#[derive(Debug)]
pub struct CatalogIndex {
    name: String,
    medium: Medium,
    /// Normalized title → index of the first game with that title
    by_title: HashMap<String, usize>,
    /// Normalized title of each game, parallel to `games`
    normalized_titles: Vec<String>,
    /// Loose key of each game, parallel to `games`
    loose_titles: Vec<String>,
    games: Vec<GameRecord>,
}

impl CatalogIndex {
    /// Build an index from a parsed catalog.
    pub fn from_catalog(catalog: Catalog) -> Self {
        let normalized_titles: Vec<String> =
            catalog.games.iter().map(|g| normalize(&g.title)).collect();
        let loose_titles = catalog.games.iter().map(|g| loose_key(&g.title)).collect();

        let mut by_title = HashMap::new();
        for (gi, title) in normalized_titles.iter().enumerate() {
            by_title.entry(title.clone()).or_insert(gi);
        }

        Self {
            name: catalog.name,
            medium: catalog.medium,
            by_title,
            normalized_titles,
            loose_titles,
            games: catalog.games,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn medium(&self) -> Medium {
        self.medium
    }

    /// Games in catalog order.
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// First game (catalog order) whose normalized title equals the
    /// normalized `title`.
    pub fn find_by_title(&self, title: &str) -> Option<&GameRecord> {
        self.by_title
            .get(&normalize(title))
            .map(|&gi| &self.games[gi])
    }

    /// Resolve the checksum a title's artwork should be filed under.
    pub fn resolve_checksum(&self, title: &str) -> Option<&str> {
        let game = self.find_by_title(title)?;
        resolve_rom(game, self.medium).map(|rom| rom.checksum.as_str())
    }

    /// Find the game an image file name belongs to.
    ///
    /// Returns the first game in catalog order whose normalized title is a
    /// substring of the normalized file name and whose checksum resolves.
    /// If none does, falls back to the first game whose loose key equals the
    /// loose key of the file stem.
    pub fn match_filename(&self, file_name: &str) -> Option<GameMatch<'_>> {
        let normalized = normalize(file_name);
        let by_substring = self
            .games
            .iter()
            .zip(&self.normalized_titles)
            .filter(|(_, title)| !title.is_empty() && normalized.contains(title.as_str()))
            .find_map(|(game, _)| self.game_match(game, MatchMethod::Normalized));
        if by_substring.is_some() {
            return by_substring;
        }

        let key = loose_key(file_stem(file_name));
        if key.is_empty() {
            return None;
        }
        self.games
            .iter()
            .zip(&self.loose_titles)
            .filter(|(_, title)| **title == key)
            .find_map(|(game, _)| self.game_match(game, MatchMethod::Loose))
    }

    fn game_match<'a>(&self, game: &'a GameRecord, method: MatchMethod) -> Option<GameMatch<'a>> {
        resolve_rom(game, self.medium).map(|rom| GameMatch { game, rom, method })
    }
}

/// Pick the ROM whose checksum identifies a game's artwork.
///
/// Cartridge games use their first ROM. Disc games use their only `.bin`
/// track, or track 2 when there are several (track 1 is usually the
/// shared data/warning track). Returns `None` when no ROM qualifies or its
/// checksum is empty.
pub fn resolve_rom(game: &GameRecord, medium: Medium) -> Option<&RomEntry> {
    let rom = match medium {
        Medium::Hucard => game.roms.first()?,
        Medium::Cd => {
            let tracks: Vec<&RomEntry> = game
                .roms
                .iter()
                .filter(|rom| rom.name.ends_with(".bin"))
                .collect();
            match tracks.as_slice() {
                [] => return None,
                [only] => *only,
                many => many.iter().copied().find(|rom| is_second_track(&rom.name))?,
            }
        }
    };

    if rom.checksum.is_empty() {
        return None;
    }
    Some(rom)
}

fn is_second_track(name: &str) -> bool {
    name.contains("(Track 02)") || name.contains("(Track 2)")
}

fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

#[cfg(test)]
#[path = "tests/matcher_tests.rs"]
mod tests;

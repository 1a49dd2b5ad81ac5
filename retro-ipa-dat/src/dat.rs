use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DatError;

/// Physical medium described by a catalog.
///
/// Decides how a game's ROM list is reduced to a single checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    /// Cartridge media: one ROM per game.
    Hucard,
    /// Disc media: one or more track files per game.
    Cd,
}

impl Medium {
    /// Derive the medium from the catalog header name.
    ///
    /// The check is a case-sensitive substring test for `"CD"`, so
    /// `"NEC - PC Engine CD & TurboGrafx CD"` is a disc catalog while
    /// `"NEC - PC Engine - TurboGrafx 16"` is a cartridge catalog.
    pub fn from_header_name(name: &str) -> Self {
        if name.contains("CD") {
            Medium::Cd
        } else {
            Medium::Hucard
        }
    }
}

/// A parsed Logiqx XML catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: String,
    pub description: String,
    pub version: String,
    pub medium: Medium,
    pub games: Vec<GameRecord>,
}

/// A single game entry, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub title: String,
    pub roms: Vec<RomEntry>,
}

/// A single ROM (or disc track) entry within a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomEntry {
    pub name: String,
    /// CRC32 as written in the catalog. Case is preserved because the
    /// checksum becomes the output file name.
    pub checksum: String,
    pub size: Option<u64>,
}

/// Parse a catalog from a file path.
pub fn parse_dat_file(path: &Path) -> Result<Catalog, DatError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    parse_dat(reader)
}

/// Parse a Logiqx XML catalog.
///
/// The document must be well formed and must contain a `<header>` element;
/// games are read from every `<game>` element in document order.
pub fn parse_dat<R: BufRead>(reader: R) -> Result<Catalog, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut name = String::new();
    let mut description = String::new();
    let mut version = String::new();
    let mut games = Vec::new();

    // Open element names, innermost last
    let mut open: Vec<String> = Vec::new();
    let mut saw_header = false;
    let mut current_game: Option<GameRecord> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = tag_name(e);
                match tag.as_str() {
                    "header" => saw_header = true,
                    "game" => {
                        current_game = Some(GameRecord {
                            title: game_title(e)?,
                            roms: Vec::new(),
                        });
                    }
                    "rom" => push_rom(&mut current_game, e)?,
                    _ => {}
                }
                open.push(tag);
            }
            Event::Empty(ref e) => match tag_name(e).as_str() {
                "header" => saw_header = true,
                "game" => games.push(GameRecord {
                    title: game_title(e)?,
                    roms: Vec::new(),
                }),
                "rom" => push_rom(&mut current_game, e)?,
                _ => {}
            },
            Event::Text(ref e) => {
                let in_header = open.iter().any(|t| t == "header");
                if in_header {
                    let text = e.unescape()?.to_string();
                    match open.last().map(String::as_str) {
                        Some("name") => name = text,
                        Some("description") => description = text,
                        Some("version") => version = text,
                        _ => {}
                    }
                }
            }
            Event::End(_) => {
                if open.pop().as_deref() == Some("game") {
                    if let Some(game) = current_game.take() {
                        games.push(game);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(tag) = open.last() {
        return Err(DatError::invalid_dat(format!(
            "Unexpected end of file inside <{tag}>"
        )));
    }
    if !saw_header {
        return Err(DatError::invalid_dat("No <header> element found"));
    }

    log::debug!(
        "Parsed catalog \"{}\" ({} games)",
        name,
        games.len()
    );

    Ok(Catalog {
        medium: Medium::from_header_name(&name),
        name,
        description,
        version,
        games,
    })
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn game_title(e: &BytesStart<'_>) -> Result<String, DatError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            return Ok(attr.unescape_value()?.to_string());
        }
    }
    Ok(String::new())
}

/// Attach a `<rom>` to the game being parsed. ROMs outside a game are ignored.
fn push_rom(game: &mut Option<GameRecord>, e: &BytesStart<'_>) -> Result<(), DatError> {
    if let Some(game) = game {
        game.roms.push(parse_rom_attributes(e)?);
    }
    Ok(())
}

fn parse_rom_attributes(e: &BytesStart<'_>) -> Result<RomEntry, DatError> {
    let mut rom = RomEntry {
        name: String::new(),
        checksum: String::new(),
        size: None,
    };

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"name" => rom.name = value.to_string(),
            b"crc" => rom.checksum = value.trim().to_string(),
            b"size" => {
                let size = value
                    .parse()
                    .map_err(|_| DatError::invalid_dat(format!("Invalid ROM size: {value}")))?;
                rom.size = Some(size);
            }
            _ => {}
        }
    }

    Ok(rom)
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;

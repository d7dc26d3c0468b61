//! Message table indexing
//!
//! The games look messages up through tables of `{id, box info, address}`
//! entries. Where those tables live and how they are laid out depends on the
//! game and region, so `analyze_msg_tbl` picks the right walk for the build
//! and returns one id-to-entry map per language.

use std::fmt;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::{Error, Result, RomError};
use crate::util::{get_u16, get_u32};
use crate::version::{Game, Region};

pub const ENTRY_SIZE: usize = 8;
pub const TABLE_END: u16 = 0xFFFF;
const ADDRESS_MASK: u32 = 0x00FF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Japanese,
    English,
    German,
    French,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Japanese,
        Language::English,
        Language::German,
        Language::French,
        Language::Spanish,
    ];

    /// Short code used in configuration keys and on the command line.
    pub fn code(self) -> &'static str {
        match self {
            Language::Japanese => "jp",
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Black,
    Wooden,
    Blue,
    Ocarina,
    NoBox,
    NoBoxNoShadow,
    Credits,
    Other(u8),
}

impl From<u8> for BoxKind {
    fn from(n: u8) -> Self {
        match n {
            0x0 => BoxKind::Black,
            0x1 => BoxKind::Wooden,
            0x2 => BoxKind::Blue,
            0x3 => BoxKind::Ocarina,
            0x4 => BoxKind::NoBox,
            0x5 => BoxKind::NoBoxNoShadow,
            0xB => BoxKind::Credits,
            other => BoxKind::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxPosition {
    Variable,
    Top,
    Middle,
    Bottom,
    Other(u8),
}

impl From<u8> for BoxPosition {
    fn from(n: u8) -> Self {
        match n {
            0 => BoxPosition::Variable,
            1 => BoxPosition::Top,
            2 => BoxPosition::Middle,
            3 => BoxPosition::Bottom,
            other => BoxPosition::Other(other),
        }
    }
}

/// One message table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgInfo {
    pub box_kind: BoxKind,
    pub position: BoxPosition,
    /// Offset of the message inside its language's message data file.
    pub address: u32,
}

impl MsgInfo {
    fn from_entry(info: u8, address: u32) -> MsgInfo {
        MsgInfo {
            box_kind: BoxKind::from(info >> 4),
            position: BoxPosition::from(info & 0x0F),
            address: address & ADDRESS_MASK,
        }
    }
}

pub type MessageTable = IndexMap<u16, MsgInfo>;

/// Per-language message tables in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageIndex {
    tables: IndexMap<Language, MessageTable>,
}

impl MessageIndex {
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.tables.keys().copied()
    }

    pub fn table(&self, language: Language) -> Option<&MessageTable> {
        self.tables.get(&language)
    }

    pub fn get(&self, language: Language, id: u16) -> Option<&MsgInfo> {
        self.tables.get(&language)?.get(&id)
    }

    /// Address of the entry following `id` in table order.
    pub fn next_address(&self, language: Language, id: u16) -> Option<u32> {
        let table = self.tables.get(&language)?;
        let index = table.get_index_of(&id)?;
        table.get_index(index + 1).map(|(_, info)| info.address)
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, language: Language, table: MessageTable) {
        debug!("{} messages for {}", table.len(), language);
        self.tables.insert(language, table);
    }
}

/// Where the tables for a build are stored.
pub enum TableSource<'a> {
    /// Tables inside the `code` file starting at `offset`.
    Code { code: &'a [u8], offset: usize },
    /// One table file per language.
    Files(Vec<(Language, &'a [u8])>),
}

fn no_terminator(offset: usize) -> Error {
    RomError::BadRom(format!("message table at {:#x} has no terminator", offset)).into()
}

/// Walk `{id, info, pad, address}` entries up to the 0xFFFF id.
///
/// Returns the table and the offset just past the terminating entry.
pub fn walk_table(code: &[u8], offset: usize) -> Result<(MessageTable, usize)> {
    let mut table = MessageTable::new();
    let mut pos = offset;
    loop {
        let id = get_u16(code, pos).ok_or_else(|| no_terminator(offset))?;
        let info = *code.get(pos + 2).ok_or_else(|| no_terminator(offset))?;
        let address = get_u32(code, pos + 4).ok_or_else(|| no_terminator(offset))?;
        pos += ENTRY_SIZE;
        if id == TABLE_END {
            return Ok((table, pos));
        }
        table.insert(id, MsgInfo::from_entry(info, address));
    }
}

/// Walk a bare address list ending in a zero word, pairing each address
/// with the entry at the same position in `ids_from`.
pub fn walk_addresses(
    code: &[u8],
    offset: usize,
    ids_from: &MessageTable,
) -> Result<(MessageTable, usize)> {
    let mut table = MessageTable::new();
    let mut pos = offset;
    let mut ids = ids_from.iter();
    loop {
        let raw = get_u32(code, pos).ok_or_else(|| no_terminator(offset))?;
        pos += 4;
        if raw == 0 {
            return Ok((table, pos));
        }
        match ids.next() {
            Some((id, info)) => {
                table.insert(
                    *id,
                    MsgInfo {
                        address: raw & ADDRESS_MASK,
                        ..*info
                    },
                );
            }
            None => warn!("address list at {:#x} outruns its id table", offset),
        }
    }
}

/// Read fixed-stride entries to the end of `bytes`.
pub fn walk_file(bytes: &[u8]) -> MessageTable {
    bytes
        .chunks_exact(ENTRY_SIZE)
        .filter_map(|e| {
            let id = get_u16(e, 0)?;
            (id != TABLE_END).then(|| (id, MsgInfo::from_entry(e[2], get_u32(e, 4).unwrap_or(0))))
        })
        .collect()
}

/// Build the per-language message index for a game and region.
pub fn analyze_msg_tbl(
    game: Option<Game>,
    region: Option<Region>,
    source: TableSource,
) -> Result<MessageIndex> {
    let mut index = MessageIndex::default();
    match (game, region, source) {
        (Some(Game::Oot), Some(Region::Ntsc), TableSource::Code { code, offset }) => {
            let (japanese, next) = walk_table(code, offset)?;
            let (english, _) = walk_table(code, next)?;
            index.insert(Language::Japanese, japanese);
            index.insert(Language::English, english);
        }
        (Some(Game::Oot), Some(Region::Pal), TableSource::Code { code, offset }) => {
            let (english, next) = walk_table(code, offset)?;
            let (german, next) = walk_addresses(code, next, &english)?;
            let (french, _) = walk_addresses(code, next, &english)?;
            index.insert(Language::English, english);
            index.insert(Language::German, german);
            index.insert(Language::French, french);
        }
        (Some(Game::Mm), Some(Region::Eu), TableSource::Files(files)) => {
            for (language, bytes) in files {
                index.insert(language, walk_file(bytes));
            }
        }
        (Some(Game::Mm), Some(region @ (Region::Jp | Region::Us)), TableSource::Code { code, offset }) => {
            let language = if region == Region::Jp {
                Language::Japanese
            } else {
                Language::English
            };
            let (table, _) = walk_table(code, offset)?;
            index.insert(language, table);
        }
        (game, region, _) => {
            return Err(Error::Internal(format!(
                "no message table layout for {:?} {:?} with this source",
                game, region
            )))
        }
    }
    Ok(index)
}

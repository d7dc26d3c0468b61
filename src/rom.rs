//! ROM image and its file table
//!
//! The build information block starts at the `zelda@` magic and is followed
//! by the file table. The table has an entry for itself, which is how it is
//! found: scan 16-byte records from the end of the build block until one
//! points back at the scan start.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::config::ConfigTree;
use crate::error::{ConfigError, Result, RomError, TextError, Yaz0Error};
use crate::header::CartHeader;
use crate::message_table::{self, Language, MessageIndex, TableSource};
use crate::text::{Message, TextEncoding};
use crate::util::{find_bytes, get_u32, swap_byte_pairs};
use crate::version::{Game, Region, Version, BUILD_INFO_SIZE};
use crate::yaz0;

pub const MAGIC: &[u8] = b"zelda@";
pub const SWAPPED_MAGIC: &[u8] = b"ezdl@a";
pub const RECORD_SIZE: usize = 16;
/// Physical bounds of a file left out of the cartridge.
pub const MISSING: u32 = 0xFFFF_FFFF;

/// One file table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub vstart: u32,
    pub vend: u32,
    pub pstart: u32,
    pub pend: u32,
    /// Name from the configuration, empty when unknown.
    pub name: String,
}

impl FileRecord {
    pub fn read(bytes: &[u8], offset: usize) -> Option<FileRecord> {
        Some(FileRecord {
            vstart: get_u32(bytes, offset)?,
            vend: get_u32(bytes, offset + 4)?,
            pstart: get_u32(bytes, offset + 8)?,
            pend: get_u32(bytes, offset + 12)?,
            name: String::new(),
        })
    }

    pub fn is_missing(&self) -> bool {
        self.pstart == MISSING && self.pend == MISSING
    }

    pub fn is_compressed(&self) -> bool {
        self.pend != 0 && !self.is_missing()
    }

    pub fn vsize(&self) -> usize {
        self.vend.saturating_sub(self.vstart) as usize
    }

    pub fn psize(&self) -> usize {
        if self.pend == 0 {
            self.vsize()
        } else {
            self.pend.saturating_sub(self.pstart) as usize
        }
    }

    fn is_blank(&self) -> bool {
        self.vstart == 0 && self.vend == 0 && self.pstart == 0 && self.pend == 0
    }

    fn label(&self) -> String {
        if self.name.is_empty() {
            format!("{:08X}", self.vstart)
        } else {
            self.name.clone()
        }
    }
}

impl Display for FileRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let flag = if self.is_missing() {
            "missing"
        } else if self.is_compressed() {
            "yaz0"
        } else {
            ""
        };
        write!(
            f,
            "{:08X} {:08X} {:08X} {:08X} {:>8X} {:<7} {}",
            self.vstart,
            self.vend,
            self.pstart,
            self.pend,
            self.vsize(),
            flag,
            self.name
        )
    }
}

/// Tabular listing of `records`.
pub fn render_file_table(records: &[FileRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:<8} {:<8} {:<8} {:<8} {:>8} {:<7} name",
        "#", "vstart", "vend", "pstart", "pend", "size", "flags"
    );
    for (i, r) in records.iter().enumerate() {
        let _ = writeln!(out, "{:>4} {}", i, r);
    }
    out
}

/// Bytes of one file, as stored or after decompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    record: FileRecord,
    data: Vec<u8>,
    decompressed: bool,
}

impl FileContent {
    /// Copy the file's physical range out of the ROM.
    pub fn read(rom: &[u8], record: &FileRecord) -> Result<FileContent> {
        if record.is_missing() {
            return Err(RomError::MissingFile(record.vstart).into());
        }
        let start = record.pstart as usize;
        let end = start + record.psize();
        let data = rom.get(start..end).ok_or_else(|| RomError::OutOfRange {
            name: record.label(),
            start,
            end,
            len: rom.len(),
        })?;
        Ok(FileContent {
            record: record.clone(),
            data: data.to_vec(),
            decompressed: false,
        })
    }

    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True once the bytes are the file's real contents.
    pub fn is_decompressed(&self) -> bool {
        self.decompressed || !self.record.is_compressed()
    }

    /// The decompressed file. Uncompressed or already decompressed content
    /// is returned unchanged.
    pub fn decompress(self) -> std::result::Result<FileContent, Yaz0Error> {
        if self.is_decompressed() {
            return Ok(self);
        }
        let data = yaz0::decompress(&self.data)?;
        debug!(
            "decompressed {} from {:#x} to {:#x} bytes",
            self.record.label(),
            self.data.len(),
            data.len()
        );
        Ok(FileContent {
            record: self.record,
            data,
            decompressed: true,
        })
    }
}

fn cached<'c>(
    cache: &'c mut HashMap<u32, FileContent>,
    rom: &[u8],
    record: &FileRecord,
) -> Result<&'c FileContent> {
    match cache.entry(record.vstart) {
        Entry::Occupied(e) => Ok(e.into_mut()),
        Entry::Vacant(slot) => Ok(slot.insert(FileContent::read(rom, record)?)),
    }
}

/// A loaded cartridge image.
pub struct RomImage {
    data: Vec<u8>,
    byte_swapped: bool,
    magic_offset: usize,
    version: Version,
    header: Option<CartHeader>,
    files: Vec<FileRecord>,
    config: Option<ConfigTree>,
    raw_files: HashMap<u32, FileContent>,
    decompressed_files: HashMap<u32, FileContent>,
}

impl RomImage {
    /// Parse without any configuration; files stay unnamed.
    pub fn new(data: Vec<u8>) -> Result<RomImage> {
        RomImage::load(data, |_| None)
    }

    /// Parse, looking for the build's configuration in `search_paths` and
    /// then the packaged configuration directory.
    pub fn open(data: Vec<u8>, search_paths: &[PathBuf]) -> Result<RomImage> {
        RomImage::load(data, |version| {
            ConfigTree::for_version(version, search_paths)
        })
    }

    pub fn from_path(path: &Path, search_paths: &[PathBuf]) -> Result<RomImage> {
        let data = std::fs::read(path)?;
        RomImage::open(data, search_paths)
    }

    /// Parse, asking `config_for` for the configuration once the build is known.
    pub fn load<F>(mut data: Vec<u8>, config_for: F) -> Result<RomImage>
    where
        F: FnOnce(Version) -> Option<ConfigTree>,
    {
        let byte_swapped = match find_bytes(&data, MAGIC) {
            Some(_) => false,
            None if find_bytes(&data, SWAPPED_MAGIC).is_some() => {
                debug!("byte-swapped image, swapping {:#x} bytes", data.len());
                swap_byte_pairs(&mut data);
                true
            }
            None => return Err(RomError::NoMagic.into()),
        };
        let magic_offset = find_bytes(&data, MAGIC).ok_or(RomError::NoMagic)?;
        debug!("build information at {:#x}", magic_offset);

        let version = Version::from_build_info(&data[magic_offset..]);
        info!("detected {}", version);

        let config = config_for(version);
        if config.is_none() {
            debug!("no configuration for {:?}", version);
        }

        let header = CartHeader::new(&data);
        let files = read_file_table(&data, magic_offset + BUILD_INFO_SIZE, config.as_ref())?;

        Ok(RomImage {
            data,
            byte_swapped,
            magic_offset,
            version,
            header,
            files,
            config,
            raw_files: HashMap::new(),
            decompressed_files: HashMap::new(),
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn is_byte_swapped(&self) -> bool {
        self.byte_swapped
    }

    pub fn magic_offset(&self) -> usize {
        self.magic_offset
    }

    pub fn header(&self) -> Option<&CartHeader> {
        self.header.as_ref()
    }

    pub fn config(&self) -> Option<&ConfigTree> {
        self.config.as_ref()
    }

    /// Raw image bytes, in big-endian order.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn record(&self, index: usize) -> Result<&FileRecord> {
        Ok(self.files.get(index).ok_or(RomError::BadIndex(index))?)
    }

    pub fn index_of_address(&self, vaddr: u32) -> Result<usize> {
        Ok(self
            .files
            .iter()
            .position(|r| r.vstart == vaddr)
            .ok_or(RomError::NoSuchAddress(vaddr))?)
    }

    pub fn index_of_name(&self, name: &str) -> Result<usize> {
        if self.config.is_none() {
            return Err(RomError::NoConfiguration.into());
        }
        Ok(self
            .files
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RomError::NoSuchName(name.to_string()))?)
    }

    /// File contents as stored in the ROM.
    pub fn file(&mut self, index: usize) -> Result<&FileContent> {
        let record = self.record(index)?.clone();
        cached(&mut self.raw_files, &self.data, &record)
    }

    pub fn file_by_address(&mut self, vaddr: u32) -> Result<&FileContent> {
        let index = self.index_of_address(vaddr)?;
        self.file(index)
    }

    pub fn file_by_name(&mut self, name: &str) -> Result<&FileContent> {
        let index = self.index_of_name(name)?;
        self.file(index)
    }

    /// File contents with any Yaz0 compression removed.
    pub fn decompressed(&mut self, index: usize) -> Result<&FileContent> {
        let record = self.record(index)?.clone();
        match self.decompressed_files.entry(record.vstart) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(slot) => {
                let raw = cached(&mut self.raw_files, &self.data, &record)?.clone();
                Ok(slot.insert(raw.decompress()?))
            }
        }
    }

    pub fn decompressed_by_address(&mut self, vaddr: u32) -> Result<&FileContent> {
        let index = self.index_of_address(vaddr)?;
        self.decompressed(index)
    }

    pub fn decompressed_by_name(&mut self, name: &str) -> Result<&FileContent> {
        let index = self.index_of_name(name)?;
        self.decompressed(index)
    }

    fn game_region(&self) -> Result<(Game, Region)> {
        match (self.version.game(), self.version.region()) {
            (Some(game), Some(region)) => Ok((game, region)),
            _ => Err(RomError::NoConfiguration.into()),
        }
    }

    /// Index every message table of this build.
    pub fn analyze_msg_tbl(&mut self) -> Result<MessageIndex> {
        let (game, region) = self.game_region()?;
        let tables = self
            .config
            .as_ref()
            .ok_or(RomError::NoConfiguration)?
            .message_table()?;

        if (game, region) == (Game::Mm, Region::Eu) {
            let files = tables
                .files
                .ok_or_else(|| ConfigError::MissingKey("messageTable.files".to_string()))?;
            let mut owned = Vec::new();
            for (language, name) in [
                (Language::English, files.en),
                (Language::German, files.de),
                (Language::French, files.fr),
                (Language::Spanish, files.es),
            ] {
                owned.push((language, self.decompressed_by_name(&name)?.bytes().to_vec()));
            }
            let source = TableSource::Files(owned.iter().map(|(l, b)| (*l, b.as_slice())).collect());
            message_table::analyze_msg_tbl(Some(game), Some(region), source)
        } else {
            let offset = tables
                .offset
                .ok_or_else(|| ConfigError::MissingKey("messageTable.offset".to_string()))?;
            let code = self.decompressed_by_name("code")?;
            message_table::analyze_msg_tbl(
                Some(game),
                Some(region),
                TableSource::Code {
                    code: code.bytes(),
                    offset: offset as usize,
                },
            )
        }
    }

    /// Decode message `id` of `language`.
    ///
    /// A message is bounded by the start of the next message in its table,
    /// or by the end of its data file.
    pub fn read_message(
        &mut self,
        index: &MessageIndex,
        language: Language,
        id: u16,
    ) -> Result<Message> {
        let info = *index.get(language, id).ok_or_else(|| TextError::NoMessage {
            language: language.to_string(),
            id,
        })?;
        let (game, region) = self.game_region()?;
        let encoding = TextEncoding::for_language(game, region, language).ok_or_else(|| {
            TextError::Unsupported(format!("{} text on {}", language, self.version))
        })?;

        let key = format!("messageData.{}", language.code());
        let name = self
            .config
            .as_ref()
            .ok_or(RomError::NoConfiguration)?
            .get_str(&["messageData", language.code()])
            .ok_or(ConfigError::MissingKey(key))?
            .to_string();
        let data = self.decompressed_by_name(&name)?.bytes();

        let start = info.address as usize;
        let end = index
            .next_address(language, id)
            .map(|a| a as usize)
            .filter(|&end| end > start && end <= data.len())
            .unwrap_or(data.len());
        if start >= end {
            return Err(TextError::UnexpectedEnd(start).into());
        }
        Ok(encoding.read_message(&data[..end], start)?)
    }

    pub fn render_files(&self) -> String {
        render_file_table(&self.files)
    }
}

fn file_name(config: Option<&ConfigTree>, vstart: u32) -> String {
    let key = format!("{:08X}", vstart);
    let name = config.and_then(|c| {
        c.get_str(&["fileList", &key])
            .or_else(|| c.get_str(&["fileList", "fakeNames", &key]))
    });
    match name {
        Some(n) => n.to_string(),
        None => {
            trace!("no name for file {}", key);
            String::new()
        }
    }
}

/// Find the self-describing table entry and read every record it covers.
fn read_file_table(
    data: &[u8],
    start: usize,
    config: Option<&ConfigTree>,
) -> Result<Vec<FileRecord>> {
    let mut pos = start;
    let table = loop {
        let record = FileRecord::read(data, pos).ok_or_else(|| {
            RomError::BadRom(format!("no file table entry for offset {:#x}", start))
        })?;
        if record.pstart as usize == start {
            break record;
        }
        pos += RECORD_SIZE;
    };
    if table.is_compressed() || table.is_missing() {
        return Err(RomError::BadRom(format!(
            "file table entry at {:#x} claims the table is compressed or missing",
            pos
        ))
        .into());
    }
    debug!("file table at {:#x}, {:#x} bytes", start, table.vsize());

    let end = start + table.vsize();
    if end > data.len() {
        return Err(RomError::BadRom(format!(
            "file table {:#x}..{:#x} runs past the image",
            start, end
        ))
        .into());
    }

    let mut files = Vec::new();
    for offset in (start..end).step_by(RECORD_SIZE) {
        let Some(mut record) = FileRecord::read(data, offset) else {
            break;
        };
        if record.is_blank() && !files.is_empty() {
            break;
        }
        record.name = file_name(config, record.vstart);
        files.push(record);
    }
    Ok(files)
}

impl Display for RomImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "
Version:                  {}
Byte-swapped:             {}
Build info offset:        {:#x}
Files:                    {}
Configuration:            {}
",
            self.version,
            self.byte_swapped,
            self.magic_offset,
            self.files.len(),
            if self.config.is_some() { "loaded" } else { "none" },
        )?;
        if let Some(header) = &self.header {
            write!(f, "{}", header)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use test_log::test;

    fn record(vstart: u32, vend: u32, pstart: u32, pend: u32) -> FileRecord {
        FileRecord {
            vstart,
            vend,
            pstart,
            pend,
            name: String::new(),
        }
    }

    #[test]
    fn predicates() {
        let plain = record(0x1000, 0x1800, 0x1000, 0);
        assert!(!plain.is_compressed());
        assert!(!plain.is_missing());
        assert_eq!(plain.psize(), plain.vsize());
        assert_eq!(plain.vsize(), 0x800);

        let packed = record(0x2000, 0x3000, 0x1800, 0x1A00);
        assert!(packed.is_compressed());
        assert_eq!(packed.psize(), 0x200);

        let gone = record(0x4000, 0x4100, MISSING, MISSING);
        assert!(gone.is_missing());
        assert!(!gone.is_compressed());
    }

    #[test]
    fn display_row() {
        let mut r = record(0x00A8_7000, 0x00B8_CB50, 0x00A8_7000, 0);
        r.name = "code".to_string();
        let row = r.to_string();
        assert!(row.starts_with("00A87000 00B8CB50 00A87000 00000000"));
        assert!(row.ends_with("code"));
        assert!(render_file_table(&[r]).contains("vstart"));
    }

    #[test]
    fn content_reads_physical_range() {
        let rom: Vec<u8> = (0..=255).collect();
        let c = FileContent::read(&rom, &record(0x10, 0x20, 0x10, 0)).unwrap();
        assert_eq!(c.bytes()[0], 0x10);
        assert_eq!(c.len(), 0x10);
        assert!(c.is_decompressed());
        let same = c.clone().decompress().unwrap();
        assert_eq!(same, c);

        assert!(matches!(
            FileContent::read(&rom, &record(0xF0, 0x200, 0xF0, 0)),
            Err(Error::Rom(RomError::OutOfRange { .. }))
        ));
        assert!(matches!(
            FileContent::read(&rom, &record(0x40, 0x50, MISSING, MISSING)),
            Err(Error::Rom(RomError::MissingFile(0x40)))
        ));
    }
}

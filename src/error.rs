// ROM and decoder error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error. Every component error converts into this.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Yaz0(#[from] Yaz0Error),

    #[error(transparent)]
    Rom(#[from] RomError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Text(#[from] TextError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A state the closed version/region set should make unreachable.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Yaz0Error {
    #[error("bad Yaz0 header: magic {0:02X?}")]
    BadMagic(Vec<u8>),

    #[error("Yaz0 stream too short for header ({0} bytes)")]
    Truncated(usize),

    #[error("back-reference distance {distance} reaches before output start at {position:#x}")]
    BadReference { distance: usize, position: usize },

    #[error("decompressed {actual} bytes, header declared {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RomError {
    #[error("no zelda@ magic found in ROM")]
    NoMagic,

    #[error("bad ROM: {0}")]
    BadRom(String),

    #[error("no file at index {0}")]
    BadIndex(usize),

    #[error("no file named {0:?}")]
    NoSuchName(String),

    #[error("no file starting at virtual address {0:#010X}")]
    NoSuchAddress(u32),

    #[error("no configuration loaded for this ROM version")]
    NoConfiguration,

    #[error("file {name:?} range {start:#X}..{end:#X} lies outside the ROM ({len:#X} bytes)")]
    OutOfRange {
        name: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("file at {0:#010X} is missing from this ROM")]
    MissingFile(u32),
}

fn suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

/// Raised when a display-list word matched an opcode pattern but failed
/// validation of its fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("bad {name} command {word:#018X}{}", suffix(.reason))]
    BadCommand {
        name: &'static str,
        word: u64,
        reason: Option<String>,
    },
}

impl CommandError {
    pub fn bad(name: &'static str, word: u64, reason: impl Into<String>) -> Self {
        CommandError::BadCommand {
            name,
            word,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("bad text sequence {bytes:02X?}{}", suffix(.reason))]
    BadSequence {
        bytes: Vec<u8>,
        reason: Option<String>,
    },

    #[error("message ran off the end of its buffer at offset {0:#x}")]
    UnexpectedEnd(usize),

    #[error("no message {id:#06X} for language {language}")]
    NoMessage { language: String, id: u16 },

    #[error("no text decoder for {0}")]
    Unsupported(String),
}

impl TextError {
    pub fn bad(bytes: &[u8], reason: impl Into<String>) -> Self {
        TextError::BadSequence {
            bytes: bytes.to_vec(),
            reason: Some(reason.into()),
        }
    }

    pub fn unknown(bytes: &[u8]) -> Self {
        TextError::BadSequence {
            bytes: bytes.to_vec(),
            reason: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config key {0} not found")]
    MissingKey(String),

    #[error("config key {key} has unusable value {value}")]
    BadValue { key: String, value: String },
}

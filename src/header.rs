use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;

use crate::util::get_u32;

pub const HEADER_SIZE: usize = 0x40;

/// The 64-byte N64 cartridge header at the start of the ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartHeader {
    pub pi_settings: u32,
    pub clock_rate: u32,
    pub boot_address: u32,
    pub release: u32,
    pub crc1: u32,
    pub crc2: u32,
    pub title: String,
    pub game_code: String,
    pub revision: u8,
}

impl CartHeader {
    /// Parse the header. Returns `None` if `bytes` is shorter than the header.
    pub fn new(bytes: &[u8]) -> Option<CartHeader> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        Some(CartHeader {
            pi_settings: get_u32(bytes, 0x00)?,
            clock_rate: get_u32(bytes, 0x04)?,
            boot_address: get_u32(bytes, 0x08)?,
            release: get_u32(bytes, 0x0C)?,
            crc1: get_u32(bytes, 0x10)?,
            crc2: get_u32(bytes, 0x14)?,
            title: || -> String {
                let mut title = String::new();
                for b in &bytes[0x20..0x34] {
                    title.push(*b as char);
                }
                title.trim_end_matches(['\0', ' ']).to_string()
            }(),
            game_code: bytes[0x3B..0x3F].iter().map(|&b| b as char).collect(),
            revision: bytes[0x3F],
        })
    }

    /// Region letter from the game code (`J`, `E`, `P`, ...).
    pub fn region_code(&self) -> Option<char> {
        self.game_code.chars().nth(3)
    }
}

impl Display for CartHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "
Title:                    {}
Game code:                {}
Revision:                 {}
PI settings:              {:#010x}
Clock rate:               {:#010x}
Boot address:             {:#010x}
Release:                  {:#010x}
CRC1:                     {:#010x}
CRC2:                     {:#010x}
",
            self.title,
            self.game_code,
            self.revision,
            self.pi_settings,
            self.clock_rate,
            self.boot_address,
            self.release,
            self.crc1,
            self.crc2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&[0x80, 0x37, 0x12, 0x40]);
        bytes[0x08..0x0C].copy_from_slice(&0x8000_0400u32.to_be_bytes());
        bytes[0x10..0x14].copy_from_slice(&0xEC70_11B7u32.to_be_bytes());
        bytes[0x20..0x34].copy_from_slice(b"THE LEGEND OF ZELDA ");
        bytes[0x3B..0x3F].copy_from_slice(b"CZLE");
        bytes[0x3F] = 2;

        let h = CartHeader::new(&bytes).unwrap();
        assert_eq!(h.pi_settings, 0x8037_1240);
        assert_eq!(h.boot_address, 0x8000_0400);
        assert_eq!(h.crc1, 0xEC70_11B7);
        assert_eq!(h.title, "THE LEGEND OF ZELDA");
        assert_eq!(h.game_code, "CZLE");
        assert_eq!(h.region_code(), Some('E'));
        assert_eq!(h.revision, 2);
        assert!(h.to_string().contains("CZLE"));
    }

    #[test]
    fn short_buffer() {
        assert!(CartHeader::new(&[0u8; 0x20]).is_none());
    }
}

// Cartridge build identification by compile timestamp

use std::collections::HashMap;
use std::fmt;

use log::debug;

/// Known cartridge builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    OotNtsc10,
    OotNtsc11,
    OotNtsc12,
    OotPal10,
    OotPal11,
    OotPalMqDebug,
    MmJp10,
    MmJp11,
    MmUs,
    MmEu10,
    MmEu11,
    MmEuDebug,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Oot,
    Mm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// OoT NTSC carts carry both Japanese and English text.
    Ntsc,
    Pal,
    Jp,
    Us,
    Eu,
}

lazy_static! {
    static ref BUILD_DATES: HashMap<&'static str, Version> = {
        let mut m = HashMap::new();
        m.insert("98-10-21 04:56:31", Version::OotNtsc10);
        m.insert("98-10-26 10:58:45", Version::OotNtsc11);
        m.insert("98-11-12 18:17:03", Version::OotNtsc12);
        m.insert("98-11-10 14:34:22", Version::OotPal10);
        m.insert("98-11-18 17:36:49", Version::OotPal11);
        m.insert("03-02-21 00:16:31", Version::OotPalMqDebug);
        m.insert("00-03-31 02:22:11", Version::MmJp10);
        m.insert("00-04-04 09:34:16", Version::MmJp11);
        m.insert("00-07-31 17:04:16", Version::MmUs);
        m.insert("00-09-25 11:16:53", Version::MmEu10);
        m.insert("00-09-29 09:29:41", Version::MmEu11);
        m.insert("00-09-29 09:29:05", Version::MmEuDebug);
        m
    };
}

/// Size of the build information block that starts at the magic.
pub const BUILD_INFO_SIZE: usize = 0x30;

impl Version {
    pub const ALL: [Version; 12] = [
        Version::OotNtsc10,
        Version::OotNtsc11,
        Version::OotNtsc12,
        Version::OotPal10,
        Version::OotPal11,
        Version::OotPalMqDebug,
        Version::MmJp10,
        Version::MmJp11,
        Version::MmUs,
        Version::MmEu10,
        Version::MmEu11,
        Version::MmEuDebug,
    ];

    /// Map an exact compile timestamp to a build.
    pub fn from_build_date(date: &str) -> Version {
        BUILD_DATES.get(date).copied().unwrap_or(Version::Unknown)
    }

    /// Identify the build from the block starting at the `zelda@` magic.
    ///
    /// The block holds a NUL-terminated `user@host` string followed by
    /// NUL padding and then the `YY-MM-DD HH:MM:SS` timestamp.
    pub fn from_build_info(block: &[u8]) -> Version {
        let block = &block[..block.len().min(BUILD_INFO_SIZE)];
        let date = build_date_field(block);
        let version = Version::from_build_date(&date);
        debug!("build date {:?} identifies {:?}", date, version);
        version
    }

    pub fn build_date(self) -> Option<&'static str> {
        BUILD_DATES
            .iter()
            .find(|(_, v)| **v == self)
            .map(|(date, _)| *date)
    }

    /// `None` only for `Unknown`.
    pub fn game(self) -> Option<Game> {
        match self {
            Version::OotNtsc10
            | Version::OotNtsc11
            | Version::OotNtsc12
            | Version::OotPal10
            | Version::OotPal11
            | Version::OotPalMqDebug => Some(Game::Oot),
            Version::MmJp10
            | Version::MmJp11
            | Version::MmUs
            | Version::MmEu10
            | Version::MmEu11
            | Version::MmEuDebug => Some(Game::Mm),
            Version::Unknown => None,
        }
    }

    pub fn region(self) -> Option<Region> {
        match self {
            Version::OotNtsc10 | Version::OotNtsc11 | Version::OotNtsc12 => Some(Region::Ntsc),
            Version::OotPal10 | Version::OotPal11 | Version::OotPalMqDebug => Some(Region::Pal),
            Version::MmJp10 | Version::MmJp11 => Some(Region::Jp),
            Version::MmUs => Some(Region::Us),
            Version::MmEu10 | Version::MmEu11 | Version::MmEuDebug => Some(Region::Eu),
            Version::Unknown => None,
        }
    }

    /// Base name of the configuration file describing this build.
    pub fn config_name(self) -> Option<&'static str> {
        let name = match self {
            Version::OotNtsc10 => "oot-ntsc-1.0",
            Version::OotNtsc11 => "oot-ntsc-1.1",
            Version::OotNtsc12 => "oot-ntsc-1.2",
            Version::OotPal10 => "oot-pal-1.0",
            Version::OotPal11 => "oot-pal-1.1",
            Version::OotPalMqDebug => "oot-pal-mq-debug",
            Version::MmJp10 => "mm-jp-1.0",
            Version::MmJp11 => "mm-jp-1.1",
            Version::MmUs => "mm-us",
            Version::MmEu10 => "mm-eu-1.0",
            Version::MmEu11 => "mm-eu-1.1",
            Version::MmEuDebug => "mm-eu-debug",
            Version::Unknown => return None,
        };
        Some(name)
    }
}

fn build_date_field(block: &[u8]) -> String {
    let Some(user_end) = block.iter().position(|&b| b == 0) else {
        return String::new();
    };
    let Some(date_start) = block[user_end..].iter().position(|&b| b != 0) else {
        return String::new();
    };
    let date = &block[user_end + date_start..];
    let date_end = date.iter().position(|&b| b == 0).unwrap_or(date.len());
    String::from_utf8_lossy(&date[..date_end]).into_owned()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::OotNtsc10 => "Ocarina of Time NTSC 1.0",
            Version::OotNtsc11 => "Ocarina of Time NTSC 1.1",
            Version::OotNtsc12 => "Ocarina of Time NTSC 1.2",
            Version::OotPal10 => "Ocarina of Time PAL 1.0",
            Version::OotPal11 => "Ocarina of Time PAL 1.1",
            Version::OotPalMqDebug => "Ocarina of Time Master Quest Debug",
            Version::MmJp10 => "Majora's Mask JP 1.0",
            Version::MmJp11 => "Majora's Mask JP 1.1",
            Version::MmUs => "Majora's Mask US",
            Version::MmEu10 => "Majora's Mask EU 1.0",
            Version::MmEu11 => "Majora's Mask EU 1.1",
            Version::MmEuDebug => "Majora's Mask EU Debug",
            Version::Unknown => "unknown build",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(user: &str, date: &str) -> Vec<u8> {
        let mut b = user.as_bytes().to_vec();
        b.resize(0x18, 0);
        b.extend_from_slice(date.as_bytes());
        b.resize(BUILD_INFO_SIZE, 0);
        b
    }

    #[test]
    fn identifies_known_builds() {
        assert_eq!(
            Version::from_build_info(&block("zelda@srd44", "98-10-21 04:56:31")),
            Version::OotNtsc10
        );
        assert_eq!(
            Version::from_build_info(&block("zelda@srd512", "00-07-31 17:04:16")),
            Version::MmUs
        );
    }

    #[test]
    fn unknown_date_is_not_fatal() {
        assert_eq!(
            Version::from_build_info(&block("zelda@home", "24-01-01 00:00:00")),
            Version::Unknown
        );
        assert_eq!(Version::from_build_info(b"zelda@nonul"), Version::Unknown);
    }

    #[test]
    fn every_build_has_metadata() {
        for v in Version::ALL {
            assert!(v.game().is_some());
            assert!(v.region().is_some());
            assert!(v.config_name().is_some());
            let date = v.build_date().unwrap();
            assert_eq!(Version::from_build_date(date), v);
        }
        assert_eq!(Version::Unknown.game(), None);
    }
}

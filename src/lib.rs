#![crate_name = "zelda64"]

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod display_list;
pub mod error;
pub mod fixed;
pub mod header;
pub mod instruction;
pub mod message_table;
pub mod opcode_tables;
pub mod rom;
pub mod text;
pub mod text_mm;
pub mod text_oot;
pub mod text_oot_sjis;
pub mod util;
pub mod version;
pub mod yaz0;

pub use error::{Error, Result};
pub use rom::RomImage;

#[cfg(test)]
mod instruction_tests;
#[cfg(test)]
mod text_tests;

/*
Layout of an Ocarina of Time NTSC 1.0 cartridge
        0000000 cartridge header
        0000040 boot code
        0001060 boot segment
        0007400 build information ("zelda@srd44", date)
        0007430 file table
        0A87000 code (Yaz0)
        ...     scenes, rooms, objects, message data
*/

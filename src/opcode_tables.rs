use std::collections::HashMap;

use crate::error::CommandError;
use crate::instruction::*;

/// One decodable command: its fixed bits and how to parse the rest.
pub struct OpcodeEntry {
    pub name: &'static str,
    pub opcode: u8,
    pub mask: u64,
    pub pattern: u64,
    pub decode: fn(u64) -> Result<Instruction, CommandError>,
}

impl OpcodeEntry {
    pub fn matches(&self, word: u64) -> bool {
        word & self.mask == self.pattern
    }
}

fn decode_into<C: Command>(word: u64) -> Result<Instruction, CommandError> {
    C::parse(word).map(Into::into)
}

macro_rules! entry {
    ($ty:ty) => {
        OpcodeEntry {
            name: <$ty as Command>::NAME,
            opcode: <$ty as Command>::OPCODE,
            mask: <$ty as Command>::MASK,
            pattern: <$ty as Command>::PATTERN,
            decode: decode_into::<$ty>,
        }
    };
}

/// Every command the decoder understands.
pub static OPCODES: &[OpcodeEntry] = &[
    entry!(Noop),
    entry!(Vtx),
    entry!(ModifyVtx),
    entry!(CullDl),
    entry!(BranchZ),
    entry!(Tri1),
    entry!(Tri2),
    entry!(Quad),
    entry!(Special3),
    entry!(Special2),
    entry!(Special1),
    entry!(DmaIo),
    entry!(Texture),
    entry!(PopMtx),
    entry!(GeometryMode),
    entry!(Mtx),
    entry!(MoveWord),
    entry!(MoveMem),
    entry!(LoadUcode),
    entry!(Dl),
    entry!(EndDl),
    entry!(SpNoop),
    entry!(RdpHalf1),
    entry!(SetOtherModeL),
    entry!(SetOtherModeH),
    entry!(TexRect),
    entry!(TexRectFlip),
    entry!(RdpLoadSync),
    entry!(RdpPipeSync),
    entry!(RdpTileSync),
    entry!(RdpFullSync),
    entry!(SetKeyGb),
    entry!(SetKeyR),
    entry!(SetConvert),
    entry!(SetScissor),
    entry!(SetPrimDepth),
    entry!(RdpSetOtherMode),
    entry!(LoadTlut),
    entry!(RdpHalf2),
    entry!(SetTileSize),
    entry!(LoadBlock),
    entry!(LoadTile),
    entry!(SetTile),
    entry!(FillRect),
    entry!(SetFillColor),
    entry!(SetFogColor),
    entry!(SetBlendColor),
    entry!(SetPrimColor),
    entry!(SetEnvColor),
    entry!(SetCombine),
    entry!(SetTImg),
    entry!(SetZImg),
    entry!(SetCImg),
];

lazy_static! {
    static ref BY_OPCODE: HashMap<u8, Vec<&'static OpcodeEntry>> = {
        let mut m: HashMap<u8, Vec<&'static OpcodeEntry>> = HashMap::new();
        for e in OPCODES {
            m.entry(e.opcode).or_default().push(e);
        }
        m
    };
}

/// Find the command whose fixed bits match `word`.
pub fn lookup(word: u64) -> Option<&'static OpcodeEntry> {
    let opcode = (word >> 56) as u8;
    BY_OPCODE
        .get(&opcode)?
        .iter()
        .copied()
        .find(|e| e.matches(word))
}

/// Get the name of a command from its opcode byte
pub fn get_opcode_name(opcode: u8) -> &'static str {
    BY_OPCODE
        .get(&opcode)
        .and_then(|entries| entries.first())
        .map(|e| e.name)
        .unwrap_or("unknown")
}

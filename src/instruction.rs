//! RCP display-list commands (F3DZEX microcode and RDP)
//!
//! Every command is one 64-bit big-endian word. Each command type below knows
//! its opcode byte, the mask of bits that are fixed for that command, and how
//! to pull its fields out of a word. Decoding checks that the fields make
//! sense together and reports a `CommandError` otherwise.

use std::fmt::{self, Display, Formatter};

use bitreader::BitReader;

use crate::error::CommandError;
use crate::fixed::{Coord, Dxt, Frac8, KeyWidth, Scale};
use crate::opcode_tables;
use crate::util::{bits, sign_extend};

/// A command type: identified by masked bit pattern, parsed from a word.
pub trait Command: Sized + Into<Instruction> {
    const NAME: &'static str;
    const OPCODE: u8;
    /// Bits that are fixed for this command.
    const MASK: u64;
    /// Value of the fixed bits.
    const PATTERN: u64;

    fn parse(word: u64) -> Result<Self, CommandError>;

    fn matches(word: u64) -> bool {
        word & Self::MASK == Self::PATTERN
    }
}

/// Borrow a specific command out of an `Instruction`.
pub trait Cast: Sized {
    fn cast(instruction: &Instruction) -> Option<&Self>;
}

/// Segmented address: top byte selects the segment, low 24 bits the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegAddr(pub u32);

impl SegAddr {
    pub fn segment(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn offset(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl Display for SegAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:06X}", self.segment(), self.offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    fn from_u32(v: u32) -> Rgba {
        let [r, g, b, a] = v.to_be_bytes();
        Rgba { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba,
    Yuv,
    Ci,
    Ia,
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelSize {
    Bits4,
    Bits8,
    Bits16,
    Bits32,
}

fn lo(word: u64) -> u32 {
    word as u32
}

fn segment(name: &'static str, word: u64, raw: u32) -> Result<SegAddr, CommandError> {
    let seg = raw >> 24;
    if seg > 0x0F {
        return Err(CommandError::bad(
            name,
            word,
            format!("segment {:#04x} out of range", seg),
        ));
    }
    Ok(SegAddr(raw))
}

/// Vertex buffer slot from a doubled index field.
fn vertex(name: &'static str, word: u64, doubled: u64) -> Result<u8, CommandError> {
    if doubled & 1 != 0 {
        return Err(CommandError::bad(name, word, "odd vertex index field"));
    }
    let index = doubled / 2;
    if index > 31 {
        return Err(CommandError::bad(
            name,
            word,
            format!("vertex index {} > 31", index),
        ));
    }
    Ok(index as u8)
}

fn image_format(name: &'static str, word: u64, fmt: u64) -> Result<ImageFormat, CommandError> {
    match fmt {
        0 => Ok(ImageFormat::Rgba),
        1 => Ok(ImageFormat::Yuv),
        2 => Ok(ImageFormat::Ci),
        3 => Ok(ImageFormat::Ia),
        4 => Ok(ImageFormat::I),
        _ => Err(CommandError::bad(
            name,
            word,
            format!("image format {} unknown", fmt),
        )),
    }
}

fn texel_size(siz: u64) -> TexelSize {
    match siz & 3 {
        0 => TexelSize::Bits4,
        1 => TexelSize::Bits8,
        2 => TexelSize::Bits16,
        _ => TexelSize::Bits32,
    }
}

fn rect(
    name: &'static str,
    word: u64,
    ul: (Coord, Coord),
    lr: (Coord, Coord),
) -> Result<(), CommandError> {
    if ul.0 > lr.0 || ul.1 > lr.1 {
        return Err(CommandError::bad(
            name,
            word,
            format!(
                "upper-left ({}, {}) is past lower-right ({}, {})",
                ul.0, ul.1, lr.0, lr.1
            ),
        ));
    }
    Ok(())
}

fn reader_error(name: &'static str, word: u64) -> impl Fn(bitreader::BitReaderError) -> CommandError {
    move |e| CommandError::bad(name, word, e.to_string())
}

// ---------------------------------------------------------------------------
// RSP geometry commands

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noop {
    pub tag: u32,
}

impl Command for Noop {
    const NAME: &'static str = "G_NOOP";
    const OPCODE: u8 = 0x00;
    const MASK: u64 = 0xFFFF_FFFF_0000_0000;
    const PATTERN: u64 = 0x0000_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(Noop { tag: lo(word) })
    }
}

/// Load `count` vertices into slots `dest..dest + count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vtx {
    pub count: u8,
    pub dest: u8,
    pub address: SegAddr,
}

impl Command for Vtx {
    const NAME: &'static str = "G_VTX";
    const OPCODE: u8 = 0x01;
    const MASK: u64 = 0xFFF0_0F01_0000_0000;
    const PATTERN: u64 = 0x0100_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let count = bits(word, 44, 8);
        let end = bits(word, 33, 7);
        if count == 0 {
            return Err(CommandError::bad(Self::NAME, word, "zero vertices"));
        }
        if end < count {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("end slot {} below count {}", end, count),
            ));
        }
        if end > 32 {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("dest {} + count {} > 32", end - count, count),
            ));
        }
        Ok(Vtx {
            count: count as u8,
            dest: (end - count) as u8,
            address: segment(Self::NAME, word, lo(word))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAttribute {
    Rgba,
    St,
    XyScreen,
    ZScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyVtx {
    pub attribute: VertexAttribute,
    pub vertex: u8,
    pub value: u32,
}

impl Command for ModifyVtx {
    const NAME: &'static str = "G_MODIFYVTX";
    const OPCODE: u8 = 0x02;
    const MASK: u64 = 0xFF00_0001_0000_0000;
    const PATTERN: u64 = 0x0200_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let attribute = match bits(word, 48, 8) {
            0x10 => VertexAttribute::Rgba,
            0x14 => VertexAttribute::St,
            0x18 => VertexAttribute::XyScreen,
            0x1C => VertexAttribute::ZScreen,
            other => {
                return Err(CommandError::bad(
                    Self::NAME,
                    word,
                    format!("attribute offset {:#04x} unknown", other),
                ))
            }
        };
        Ok(ModifyVtx {
            attribute,
            vertex: vertex(Self::NAME, word, bits(word, 32, 16))?,
            value: lo(word),
        })
    }
}

/// Skip the rest of the list when vertices `first..=last` are all off screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullDl {
    pub first: u8,
    pub last: u8,
}

impl Command for CullDl {
    const NAME: &'static str = "G_CULLDL";
    const OPCODE: u8 = 0x03;
    const MASK: u64 = 0xFFFF_0001_FFFF_0001;
    const PATTERN: u64 = 0x0300_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let first = vertex(Self::NAME, word, bits(word, 32, 16))?;
        let last = vertex(Self::NAME, word, bits(word, 0, 16))?;
        if first >= last {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("first vertex {} not below last {}", first, last),
            ));
        }
        Ok(CullDl { first, last })
    }
}

/// Branch to the list in the preceding RDPHALF_1 when the vertex Z is below `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchZ {
    pub vertex: u8,
    pub z: u32,
}

impl Command for BranchZ {
    const NAME: &'static str = "G_BRANCH_Z";
    const OPCODE: u8 = 0x04;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0x0400_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let by5 = bits(word, 44, 12);
        let index = vertex(Self::NAME, word, bits(word, 32, 12))?;
        if by5 != index as u64 * 5 {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("vertex fields disagree ({:#x} vs {})", by5, index),
            ));
        }
        Ok(BranchZ {
            vertex: index,
            z: lo(word),
        })
    }
}

fn triangle(name: &'static str, word: u64, shift: u32) -> Result<[u8; 3], CommandError> {
    Ok([
        vertex(name, word, bits(word, shift + 16, 8))?,
        vertex(name, word, bits(word, shift + 8, 8))?,
        vertex(name, word, bits(word, shift, 8))?,
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tri1 {
    pub vertices: [u8; 3],
}

impl Command for Tri1 {
    const NAME: &'static str = "G_TRI1";
    const OPCODE: u8 = 0x05;
    const MASK: u64 = 0xFF01_0101_FFFF_FFFF;
    const PATTERN: u64 = 0x0500_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(Tri1 {
            vertices: triangle(Self::NAME, word, 32)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tri2 {
    pub first: [u8; 3],
    pub second: [u8; 3],
}

impl Command for Tri2 {
    const NAME: &'static str = "G_TRI2";
    const OPCODE: u8 = 0x06;
    const MASK: u64 = 0xFF01_0101_FF01_0101;
    const PATTERN: u64 = 0x0600_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(Tri2 {
            first: triangle(Self::NAME, word, 32)?,
            second: triangle(Self::NAME, word, 0)?,
        })
    }
}

/// Same layout as TRI2; the two triangles share an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quad {
    pub first: [u8; 3],
    pub second: [u8; 3],
}

impl Command for Quad {
    const NAME: &'static str = "G_QUAD";
    const OPCODE: u8 = 0x07;
    const MASK: u64 = 0xFF01_0101_FF01_0101;
    const PATTERN: u64 = 0x0700_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(Quad {
            first: triangle(Self::NAME, word, 32)?,
            second: triangle(Self::NAME, word, 0)?,
        })
    }
}

macro_rules! raw_command {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $opcode:literal, $mask:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty {
            pub hi: u32,
            pub lo: u32,
        }

        impl Command for $ty {
            const NAME: &'static str = $name;
            const OPCODE: u8 = $opcode;
            const MASK: u64 = $mask;
            const PATTERN: u64 = ($opcode as u64) << 56;

            fn parse(word: u64) -> Result<Self, CommandError> {
                Ok($ty {
                    hi: (word >> 32) as u32 & 0x00FF_FFFF,
                    lo: lo(word),
                })
            }
        }
    };
}

raw_command!(Special3, "G_SPECIAL_3", 0xD3, 0xFF00_0000_0000_0000);
raw_command!(Special2, "G_SPECIAL_2", 0xD4, 0xFF00_0000_0000_0000);
raw_command!(Special1, "G_SPECIAL_1", 0xD5, 0xFF00_0000_0000_0000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaIo {
    pub write: bool,
    pub dmem: u16,
    pub size: u16,
    pub dram: SegAddr,
}

impl Command for DmaIo {
    const NAME: &'static str = "G_DMA_IO";
    const OPCODE: u8 = 0xD6;
    const MASK: u64 = 0xFF00_1000_0000_0000;
    const PATTERN: u64 = 0xD600_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(DmaIo {
            write: bits(word, 55, 1) != 0,
            dmem: (bits(word, 45, 10) * 8) as u16,
            size: (bits(word, 32, 12) + 1) as u16,
            dram: segment(Self::NAME, word, lo(word))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub level: u8,
    pub tile: u8,
    pub on: bool,
    pub scale_s: Scale,
    pub scale_t: Scale,
}

impl Command for Texture {
    const NAME: &'static str = "G_TEXTURE";
    const OPCODE: u8 = 0xD7;
    const MASK: u64 = 0xFFFF_C001_0000_0000;
    const PATTERN: u64 = 0xD700_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let on = match bits(word, 33, 7) {
            0 => false,
            1 => true,
            other => {
                return Err(CommandError::bad(
                    Self::NAME,
                    word,
                    format!("on flag {} is not 0 or 1", other),
                ))
            }
        };
        Ok(Texture {
            level: bits(word, 43, 3) as u8,
            tile: bits(word, 40, 3) as u8,
            on,
            scale_s: Scale::from_bits(bits(word, 16, 16)),
            scale_t: Scale::from_bits(bits(word, 0, 16)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopMtx {
    pub count: u32,
}

impl Command for PopMtx {
    const NAME: &'static str = "G_POPMTX";
    const OPCODE: u8 = 0xD8;
    const MASK: u64 = 0xFFFF_FFFF_0000_003F;
    const PATTERN: u64 = 0xD838_0002_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let count = lo(word) / 64;
        if count == 0 {
            return Err(CommandError::bad(Self::NAME, word, "pops no matrices"));
        }
        Ok(PopMtx { count })
    }
}

const GEOMETRY_FLAGS: [(u32, &str); 11] = [
    (0x0000_0001, "G_ZBUFFER"),
    (0x0000_0004, "G_SHADE"),
    (0x0000_0200, "G_CULL_FRONT"),
    (0x0000_0400, "G_CULL_BACK"),
    (0x0001_0000, "G_FOG"),
    (0x0002_0000, "G_LIGHTING"),
    (0x0004_0000, "G_TEXTURE_GEN"),
    (0x0008_0000, "G_TEXTURE_GEN_LINEAR"),
    (0x0010_0000, "G_LOD"),
    (0x0020_0000, "G_SHADING_SMOOTH"),
    (0x0080_0000, "G_CLIPPING"),
];

/// Names of the geometry mode flags set in `mode`.
pub fn geometry_flag_names(mode: u32) -> Vec<&'static str> {
    GEOMETRY_FLAGS
        .iter()
        .filter(|(flag, _)| mode & flag != 0)
        .map(|(_, name)| *name)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryMode {
    pub clear: u32,
    pub set: u32,
}

impl Command for GeometryMode {
    const NAME: &'static str = "G_GEOMETRYMODE";
    const OPCODE: u8 = 0xD9;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0xD900_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(GeometryMode {
            clear: !(bits(word, 32, 24) as u32) & 0x00FF_FFFF,
            set: lo(word),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mtx {
    pub push: bool,
    pub load: bool,
    pub projection: bool,
    pub address: SegAddr,
}

impl Command for Mtx {
    const NAME: &'static str = "G_MTX";
    const OPCODE: u8 = 0xDA;
    const MASK: u64 = 0xFFFF_FFF8_0000_0000;
    const PATTERN: u64 = 0xDA38_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        // the push bit is stored inverted
        let params = bits(word, 32, 3) ^ 1;
        Ok(Mtx {
            push: params & 1 != 0,
            load: params & 2 != 0,
            projection: params & 4 != 0,
            address: segment(Self::NAME, word, lo(word))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveWordIndex {
    Matrix,
    NumLight,
    Clip,
    Segment,
    Fog,
    LightCol,
    ForceMtx,
    PerspNorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveWord {
    pub index: MoveWordIndex,
    pub offset: u16,
    pub data: u32,
}

impl MoveWord {
    /// Segment number for `G_MW_SEGMENT` writes.
    pub fn segment(&self) -> Option<u8> {
        match self.index {
            MoveWordIndex::Segment => Some((self.offset / 4) as u8),
            _ => None,
        }
    }
}

impl Command for MoveWord {
    const NAME: &'static str = "G_MOVEWORD";
    const OPCODE: u8 = 0xDB;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0xDB00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let index = match bits(word, 48, 8) {
            0x00 => MoveWordIndex::Matrix,
            0x02 => MoveWordIndex::NumLight,
            0x04 => MoveWordIndex::Clip,
            0x06 => MoveWordIndex::Segment,
            0x08 => MoveWordIndex::Fog,
            0x0A => MoveWordIndex::LightCol,
            0x0C => MoveWordIndex::ForceMtx,
            0x0E => MoveWordIndex::PerspNorm,
            other => {
                return Err(CommandError::bad(
                    Self::NAME,
                    word,
                    format!("index {:#04x} unknown", other),
                ))
            }
        };
        let offset = bits(word, 32, 16) as u16;
        if index == MoveWordIndex::Segment && (offset % 4 != 0 || offset / 4 > 0x0F) {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("segment offset {:#x} invalid", offset),
            ));
        }
        Ok(MoveWord {
            index,
            offset,
            data: lo(word),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMemIndex {
    ModelviewMatrix,
    ProjectionMatrix,
    Viewport,
    Light,
    Point,
    Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMem {
    pub size: u16,
    pub offset: u16,
    pub index: MoveMemIndex,
    pub address: SegAddr,
}

impl Command for MoveMem {
    const NAME: &'static str = "G_MOVEMEM";
    const OPCODE: u8 = 0xDC;
    const MASK: u64 = 0xFF07_0000_0000_0000;
    const PATTERN: u64 = 0xDC00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let index = match bits(word, 32, 8) {
            2 => MoveMemIndex::ModelviewMatrix,
            6 => MoveMemIndex::ProjectionMatrix,
            8 => MoveMemIndex::Viewport,
            10 => MoveMemIndex::Light,
            12 => MoveMemIndex::Point,
            14 => MoveMemIndex::Matrix,
            other => {
                return Err(CommandError::bad(
                    Self::NAME,
                    word,
                    format!("index {} unknown", other),
                ))
            }
        };
        Ok(MoveMem {
            size: ((bits(word, 51, 5) + 1) * 8) as u16,
            offset: (bits(word, 40, 8) * 8) as u16,
            index,
            address: segment(Self::NAME, word, lo(word))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadUcode {
    pub data_size: u32,
    pub text: SegAddr,
}

impl Command for LoadUcode {
    const NAME: &'static str = "G_LOAD_UCODE";
    const OPCODE: u8 = 0xDD;
    const MASK: u64 = 0xFFFF_0000_0000_0000;
    const PATTERN: u64 = 0xDD00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(LoadUcode {
            data_size: bits(word, 32, 16) as u32 + 1,
            text: segment(Self::NAME, word, lo(word))?,
        })
    }
}

/// Call (`branch == false`) or jump to another display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dl {
    pub branch: bool,
    pub address: SegAddr,
}

impl Command for Dl {
    const NAME: &'static str = "G_DL";
    const OPCODE: u8 = 0xDE;
    const MASK: u64 = 0xFFFE_FFFF_0000_0000;
    const PATTERN: u64 = 0xDE00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(Dl {
            branch: bits(word, 48, 1) != 0,
            address: segment(Self::NAME, word, lo(word))?,
        })
    }
}

macro_rules! unit_command {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $opcode:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty;

        impl Command for $ty {
            const NAME: &'static str = $name;
            const OPCODE: u8 = $opcode;
            const MASK: u64 = u64::MAX;
            const PATTERN: u64 = ($opcode as u64) << 56;

            fn parse(_word: u64) -> Result<Self, CommandError> {
                Ok($ty)
            }
        }
    };
}

unit_command!(
    /// Display-list terminator.
    EndDl,
    "G_ENDDL",
    0xDF
);
unit_command!(SpNoop, "G_SPNOOP", 0xE0);
unit_command!(RdpLoadSync, "G_RDPLOADSYNC", 0xE6);
unit_command!(RdpPipeSync, "G_RDPPIPESYNC", 0xE7);
unit_command!(RdpTileSync, "G_RDPTILESYNC", 0xE8);
unit_command!(RdpFullSync, "G_RDPFULLSYNC", 0xE9);

macro_rules! word_command {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $opcode:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty {
            pub value: u32,
        }

        impl Command for $ty {
            const NAME: &'static str = $name;
            const OPCODE: u8 = $opcode;
            const MASK: u64 = 0xFFFF_FFFF_0000_0000;
            const PATTERN: u64 = ($opcode as u64) << 56;

            fn parse(word: u64) -> Result<Self, CommandError> {
                Ok($ty { value: lo(word) })
            }
        }
    };
}

word_command!(RdpHalf1, "G_RDPHALF_1", 0xE1);
word_command!(RdpHalf2, "G_RDPHALF_2", 0xF1);
word_command!(
    /// Packed fill value; two 16-bit pixels or one 32-bit pixel.
    SetFillColor,
    "G_SETFILLCOLOR",
    0xF7
);

fn other_mode(name: &'static str, word: u64) -> Result<(u8, u8, u32), CommandError> {
    let len = bits(word, 32, 8) + 1;
    let from_top = bits(word, 40, 8);
    if from_top + len > 32 {
        return Err(CommandError::bad(
            name,
            word,
            format!("field of {} bits at {} from the top overflows", len, from_top),
        ));
    }
    let shift = 32 - from_top - len;
    let data = lo(word);
    let field = (((1u64 << len) - 1) << shift) as u32;
    if data & !field != 0 {
        return Err(CommandError::bad(
            name,
            word,
            format!("data {:#010x} outside field {:#010x}", data, field),
        ));
    }
    Ok((shift as u8, len as u8, data))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOtherModeL {
    pub shift: u8,
    pub len: u8,
    pub data: u32,
}

impl Command for SetOtherModeL {
    const NAME: &'static str = "G_SETOTHERMODE_L";
    const OPCODE: u8 = 0xE2;
    const MASK: u64 = 0xFFFF_0000_0000_0000;
    const PATTERN: u64 = 0xE200_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let (shift, len, data) = other_mode(Self::NAME, word)?;
        Ok(SetOtherModeL { shift, len, data })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOtherModeH {
    pub shift: u8,
    pub len: u8,
    pub data: u32,
}

impl Command for SetOtherModeH {
    const NAME: &'static str = "G_SETOTHERMODE_H";
    const OPCODE: u8 = 0xE3;
    const MASK: u64 = 0xFFFF_0000_0000_0000;
    const PATTERN: u64 = 0xE300_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let (shift, len, data) = other_mode(Self::NAME, word)?;
        Ok(SetOtherModeH { shift, len, data })
    }
}

/// Rectangle with corners in 10.2 screen coordinates plus a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub ul: (Coord, Coord),
    pub lr: (Coord, Coord),
    pub tile: u8,
}

const TILE_RECT_MASK: u64 = 0xFF00_0000_F800_0000;

/// `op sss ttt 0i uuu vvv` with the upper-left corner in the high word.
fn tile_rect_ul_first(name: &'static str, word: u64) -> Result<TileRect, CommandError> {
    let r = TileRect {
        ul: (
            Coord::from_bits(bits(word, 44, 12)),
            Coord::from_bits(bits(word, 32, 12)),
        ),
        lr: (
            Coord::from_bits(bits(word, 12, 12)),
            Coord::from_bits(bits(word, 0, 12)),
        ),
        tile: bits(word, 24, 3) as u8,
    };
    rect(name, word, r.ul, r.lr)?;
    Ok(r)
}

/// `op xxx yyy 0i xxx yyy` with the lower-right corner in the high word.
fn tile_rect_lr_first(name: &'static str, word: u64) -> Result<TileRect, CommandError> {
    let r = TileRect {
        lr: (
            Coord::from_bits(bits(word, 44, 12)),
            Coord::from_bits(bits(word, 32, 12)),
        ),
        ul: (
            Coord::from_bits(bits(word, 12, 12)),
            Coord::from_bits(bits(word, 0, 12)),
        ),
        tile: bits(word, 24, 3) as u8,
    };
    rect(name, word, r.ul, r.lr)?;
    Ok(r)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexRect(pub TileRect);

impl Command for TexRect {
    const NAME: &'static str = "G_TEXRECT";
    const OPCODE: u8 = 0xE4;
    const MASK: u64 = TILE_RECT_MASK;
    const PATTERN: u64 = 0xE400_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        tile_rect_lr_first(Self::NAME, word).map(TexRect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexRectFlip(pub TileRect);

impl Command for TexRectFlip {
    const NAME: &'static str = "G_TEXRECTFLIP";
    const OPCODE: u8 = 0xE5;
    const MASK: u64 = TILE_RECT_MASK;
    const PATTERN: u64 = 0xE500_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        tile_rect_lr_first(Self::NAME, word).map(TexRectFlip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChannel {
    pub width: KeyWidth,
    pub center: u8,
    pub scale: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetKeyGb {
    pub green: KeyChannel,
    pub blue: KeyChannel,
}

impl Command for SetKeyGb {
    const NAME: &'static str = "G_SETKEYGB";
    const OPCODE: u8 = 0xEA;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0xEA00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(SetKeyGb {
            green: KeyChannel {
                width: KeyWidth::from_bits(bits(word, 44, 12)),
                center: bits(word, 24, 8) as u8,
                scale: bits(word, 16, 8) as u8,
            },
            blue: KeyChannel {
                width: KeyWidth::from_bits(bits(word, 32, 12)),
                center: bits(word, 8, 8) as u8,
                scale: bits(word, 0, 8) as u8,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetKeyR {
    pub red: KeyChannel,
}

impl Command for SetKeyR {
    const NAME: &'static str = "G_SETKEYR";
    const OPCODE: u8 = 0xEB;
    const MASK: u64 = 0xFFFF_FFFF_F000_0000;
    const PATTERN: u64 = 0xEB00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(SetKeyR {
            red: KeyChannel {
                width: KeyWidth::from_bits(bits(word, 16, 12)),
                center: bits(word, 8, 8) as u8,
                scale: bits(word, 0, 8) as u8,
            },
        })
    }
}

/// YUV to RGB conversion coefficients, signed 9-bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetConvert {
    pub k: [i16; 6],
}

impl Command for SetConvert {
    const NAME: &'static str = "G_SETCONVERT";
    const OPCODE: u8 = 0xEC;
    const MASK: u64 = 0xFFC0_0000_0000_0000;
    const PATTERN: u64 = 0xEC00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let mut k = [0i16; 6];
        for (i, slot) in k.iter_mut().enumerate() {
            let shift = 45 - 9 * i as u32;
            *slot = sign_extend(bits(word, shift, 9), 9) as i16;
        }
        Ok(SetConvert { k })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScissorMode {
    NonInterlace,
    EvenInterlace,
    OddInterlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScissor {
    pub mode: ScissorMode,
    pub ul: (Coord, Coord),
    pub lr: (Coord, Coord),
}

impl Command for SetScissor {
    const NAME: &'static str = "G_SETSCISSOR";
    const OPCODE: u8 = 0xED;
    const MASK: u64 = 0xFF00_0000_F000_0000;
    const PATTERN: u64 = 0xED00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let mode = match bits(word, 24, 4) {
            0 => ScissorMode::NonInterlace,
            2 => ScissorMode::EvenInterlace,
            3 => ScissorMode::OddInterlace,
            other => {
                return Err(CommandError::bad(
                    Self::NAME,
                    word,
                    format!("scanline mode {:#x} is not 0, 2 or 3", other),
                ))
            }
        };
        let ul = (
            Coord::from_bits(bits(word, 44, 12)),
            Coord::from_bits(bits(word, 32, 12)),
        );
        let lr = (
            Coord::from_bits(bits(word, 12, 12)),
            Coord::from_bits(bits(word, 0, 12)),
        );
        rect(Self::NAME, word, ul, lr)?;
        Ok(SetScissor { mode, ul, lr })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPrimDepth {
    pub z: i16,
    pub dz: i16,
}

impl Command for SetPrimDepth {
    const NAME: &'static str = "G_SETPRIMDEPTH";
    const OPCODE: u8 = 0xEE;
    const MASK: u64 = 0xFFFF_FFFF_0000_0000;
    const PATTERN: u64 = 0xEE00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(SetPrimDepth {
            z: bits(word, 16, 16) as u16 as i16,
            dz: bits(word, 0, 16) as u16 as i16,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleType {
    OneCycle,
    TwoCycle,
    Copy,
    Fill,
}

/// Sets both other-mode words at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdpSetOtherMode {
    pub high: u32,
    pub low: u32,
}

impl RdpSetOtherMode {
    pub fn cycle_type(&self) -> CycleType {
        match (self.high >> 20) & 0x3 {
            0 => CycleType::OneCycle,
            1 => CycleType::TwoCycle,
            2 => CycleType::Copy,
            _ => CycleType::Fill,
        }
    }

    pub fn texture_filter(&self) -> u8 {
        ((self.high >> 12) & 0x3) as u8
    }

    pub fn texture_lut(&self) -> u8 {
        ((self.high >> 14) & 0x3) as u8
    }

    pub fn alpha_compare(&self) -> u8 {
        (self.low & 0x3) as u8
    }

    pub fn z_source_prim(&self) -> bool {
        self.low & 0x4 != 0
    }

    /// Render mode bits of the low word (blender and coverage settings).
    pub fn render_mode(&self) -> u32 {
        self.low & 0xFFFF_FFF8
    }
}

impl Command for RdpSetOtherMode {
    const NAME: &'static str = "G_RDPSETOTHERMODE";
    const OPCODE: u8 = 0xEF;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0xEF00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(RdpSetOtherMode {
            high: bits(word, 32, 24) as u32,
            low: lo(word),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTlut {
    pub tile: u8,
    pub count: u16,
}

impl Command for LoadTlut {
    const NAME: &'static str = "G_LOADTLUT";
    const OPCODE: u8 = 0xF0;
    const MASK: u64 = 0xFFFF_FFFF_F800_3FFF;
    const PATTERN: u64 = 0xF000_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let count = bits(word, 14, 10) + 1;
        if count > 256 {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("{} palette entries > 256", count),
            ));
        }
        Ok(LoadTlut {
            tile: bits(word, 24, 3) as u8,
            count: count as u16,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTileSize(pub TileRect);

impl Command for SetTileSize {
    const NAME: &'static str = "G_SETTILESIZE";
    const OPCODE: u8 = 0xF2;
    const MASK: u64 = TILE_RECT_MASK;
    const PATTERN: u64 = 0xF200_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        tile_rect_ul_first(Self::NAME, word).map(SetTileSize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBlock {
    pub uls: u16,
    pub ult: u16,
    pub tile: u8,
    pub texels: u16,
    pub dxt: Dxt,
}

impl Command for LoadBlock {
    const NAME: &'static str = "G_LOADBLOCK";
    const OPCODE: u8 = 0xF3;
    const MASK: u64 = 0xFF00_0000_F800_0000;
    const PATTERN: u64 = 0xF300_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let texels = bits(word, 12, 12) + 1;
        if texels > 2048 {
            return Err(CommandError::bad(
                Self::NAME,
                word,
                format!("{} texels > 2048", texels),
            ));
        }
        Ok(LoadBlock {
            uls: bits(word, 44, 12) as u16,
            ult: bits(word, 32, 12) as u16,
            tile: bits(word, 24, 3) as u8,
            texels: texels as u16,
            dxt: Dxt::from_bits(bits(word, 0, 12)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTile(pub TileRect);

impl Command for LoadTile {
    const NAME: &'static str = "G_LOADTILE";
    const OPCODE: u8 = 0xF4;
    const MASK: u64 = TILE_RECT_MASK;
    const PATTERN: u64 = 0xF400_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        tile_rect_ul_first(Self::NAME, word).map(LoadTile)
    }
}

/// Clamp/mirror/mask settings for one texture axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileAxis {
    pub clamp: bool,
    pub mirror: bool,
    pub mask: u8,
    pub shift: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTile {
    pub format: ImageFormat,
    pub size: TexelSize,
    pub line: u16,
    pub tmem: u16,
    pub tile: u8,
    pub palette: u8,
    pub t: TileAxis,
    pub s: TileAxis,
}

impl Command for SetTile {
    const NAME: &'static str = "G_SETTILE";
    const OPCODE: u8 = 0xF5;
    const MASK: u64 = 0xFF04_0000_F800_0000;
    const PATTERN: u64 = 0xF500_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let bytes = word.to_be_bytes();
        let mut br = BitReader::new(&bytes[1..]);
        let err = reader_error(Self::NAME, word);

        let fmt = br.read_u8(3).map_err(&err)?;
        let siz = br.read_u8(2).map_err(&err)?;
        br.skip(1).map_err(&err)?;
        let line = br.read_u16(9).map_err(&err)?;
        let tmem = br.read_u16(9).map_err(&err)?;
        br.skip(5).map_err(&err)?;
        let tile = br.read_u8(3).map_err(&err)?;
        let palette = br.read_u8(4).map_err(&err)?;
        let mut axis = || -> Result<TileAxis, CommandError> {
            let cm = br.read_u8(2).map_err(&err)?;
            Ok(TileAxis {
                clamp: cm & 2 != 0,
                mirror: cm & 1 != 0,
                mask: br.read_u8(4).map_err(&err)?,
                shift: br.read_u8(4).map_err(&err)?,
            })
        };
        let t = axis()?;
        let s = axis()?;

        Ok(SetTile {
            format: image_format(Self::NAME, word, fmt as u64)?,
            size: texel_size(siz as u64),
            line,
            tmem,
            tile,
            palette,
            t,
            s,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRect {
    pub ul: (Coord, Coord),
    pub lr: (Coord, Coord),
}

impl Command for FillRect {
    const NAME: &'static str = "G_FILLRECT";
    const OPCODE: u8 = 0xF6;
    const MASK: u64 = 0xFF00_0000_FF00_0000;
    const PATTERN: u64 = 0xF600_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let r = tile_rect_lr_first(Self::NAME, word)?;
        Ok(FillRect { ul: r.ul, lr: r.lr })
    }
}

macro_rules! color_command {
    ($ty:ident, $name:literal, $opcode:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty {
            pub color: Rgba,
        }

        impl Command for $ty {
            const NAME: &'static str = $name;
            const OPCODE: u8 = $opcode;
            const MASK: u64 = 0xFFFF_FFFF_0000_0000;
            const PATTERN: u64 = ($opcode as u64) << 56;

            fn parse(word: u64) -> Result<Self, CommandError> {
                Ok($ty {
                    color: Rgba::from_u32(lo(word)),
                })
            }
        }
    };
}

color_command!(SetFogColor, "G_SETFOGCOLOR", 0xF8);
color_command!(SetBlendColor, "G_SETBLENDCOLOR", 0xF9);
color_command!(SetEnvColor, "G_SETENVCOLOR", 0xFB);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPrimColor {
    pub min_level: u8,
    pub lod_fraction: Frac8,
    pub color: Rgba,
}

impl Command for SetPrimColor {
    const NAME: &'static str = "G_SETPRIMCOLOR";
    const OPCODE: u8 = 0xFA;
    const MASK: u64 = 0xFFFF_0000_0000_0000;
    const PATTERN: u64 = 0xFA00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(SetPrimColor {
            min_level: bits(word, 40, 8) as u8,
            lod_fraction: Frac8::from_bits(bits(word, 32, 8)),
            color: Rgba::from_u32(lo(word)),
        })
    }
}

/// One color-combiner equation `(a - b) * c + d`, inputs as selector codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineInputs {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineCycle {
    pub color: CombineInputs,
    pub alpha: CombineInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCombine {
    pub cycles: [CombineCycle; 2],
}

impl Command for SetCombine {
    const NAME: &'static str = "G_SETCOMBINE";
    const OPCODE: u8 = 0xFC;
    const MASK: u64 = 0xFF00_0000_0000_0000;
    const PATTERN: u64 = 0xFC00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        let bytes = word.to_be_bytes();
        let mut br = BitReader::new(&bytes[1..]);
        let err = reader_error(Self::NAME, word);
        let mut field = |n: u8| br.read_u8(n).map_err(&err);

        let a0 = field(4)?;
        let c0 = field(5)?;
        let alpha_a0 = field(3)?;
        let alpha_c0 = field(3)?;
        let a1 = field(4)?;
        let c1 = field(5)?;
        let b0 = field(4)?;
        let b1 = field(4)?;
        let alpha_a1 = field(3)?;
        let alpha_c1 = field(3)?;
        let d0 = field(3)?;
        let alpha_b0 = field(3)?;
        let alpha_d0 = field(3)?;
        let d1 = field(3)?;
        let alpha_b1 = field(3)?;
        let alpha_d1 = field(3)?;

        Ok(SetCombine {
            cycles: [
                CombineCycle {
                    color: CombineInputs { a: a0, b: b0, c: c0, d: d0 },
                    alpha: CombineInputs {
                        a: alpha_a0,
                        b: alpha_b0,
                        c: alpha_c0,
                        d: alpha_d0,
                    },
                },
                CombineCycle {
                    color: CombineInputs { a: a1, b: b1, c: c1, d: d1 },
                    alpha: CombineInputs {
                        a: alpha_a1,
                        b: alpha_b1,
                        c: alpha_c1,
                        d: alpha_d1,
                    },
                },
            ],
        })
    }
}

/// Frame-, depth- or texture-image pointer with its pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSource {
    pub format: ImageFormat,
    pub size: TexelSize,
    pub width: u16,
    pub address: SegAddr,
}

const IMAGE_MASK: u64 = 0xFF07_F000_0000_0000;

fn image_source(name: &'static str, word: u64) -> Result<ImageSource, CommandError> {
    Ok(ImageSource {
        format: image_format(name, word, bits(word, 53, 3))?,
        size: texel_size(bits(word, 51, 2)),
        width: bits(word, 32, 12) as u16 + 1,
        address: segment(name, word, lo(word))?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTImg(pub ImageSource);

impl Command for SetTImg {
    const NAME: &'static str = "G_SETTIMG";
    const OPCODE: u8 = 0xFD;
    const MASK: u64 = IMAGE_MASK;
    const PATTERN: u64 = 0xFD00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        image_source(Self::NAME, word).map(SetTImg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetZImg {
    pub address: SegAddr,
}

impl Command for SetZImg {
    const NAME: &'static str = "G_SETZIMG";
    const OPCODE: u8 = 0xFE;
    const MASK: u64 = 0xFFFF_FFFF_0000_0000;
    const PATTERN: u64 = 0xFE00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        Ok(SetZImg {
            address: segment(Self::NAME, word, lo(word))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCImg(pub ImageSource);

impl Command for SetCImg {
    const NAME: &'static str = "G_SETCIMG";
    const OPCODE: u8 = 0xFF;
    const MASK: u64 = IMAGE_MASK;
    const PATTERN: u64 = 0xFF00_0000_0000_0000;

    fn parse(word: u64) -> Result<Self, CommandError> {
        image_source(Self::NAME, word).map(SetCImg)
    }
}

// ---------------------------------------------------------------------------

macro_rules! instructions {
    ($($variant:ident),* $(,)?) => {
        /// A decoded display-list command.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Instruction {
            $($variant($variant),)*
        }

        impl Instruction {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Instruction::$variant(_) => <$variant as Command>::NAME,)*
                }
            }

            pub fn opcode(&self) -> u8 {
                match self {
                    $(Instruction::$variant(_) => <$variant as Command>::OPCODE,)*
                }
            }

            fn payload(&self) -> &dyn fmt::Debug {
                match self {
                    $(Instruction::$variant(c) => c as &dyn fmt::Debug,)*
                }
            }
        }

        $(
            impl From<$variant> for Instruction {
                fn from(c: $variant) -> Self {
                    Instruction::$variant(c)
                }
            }

            impl Cast for $variant {
                fn cast(instruction: &Instruction) -> Option<&Self> {
                    match instruction {
                        Instruction::$variant(c) => Some(c),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

instructions!(
    Noop,
    Vtx,
    ModifyVtx,
    CullDl,
    BranchZ,
    Tri1,
    Tri2,
    Quad,
    Special3,
    Special2,
    Special1,
    DmaIo,
    Texture,
    PopMtx,
    GeometryMode,
    Mtx,
    MoveWord,
    MoveMem,
    LoadUcode,
    Dl,
    EndDl,
    SpNoop,
    RdpHalf1,
    SetOtherModeL,
    SetOtherModeH,
    TexRect,
    TexRectFlip,
    RdpLoadSync,
    RdpPipeSync,
    RdpTileSync,
    RdpFullSync,
    SetKeyGb,
    SetKeyR,
    SetConvert,
    SetScissor,
    SetPrimDepth,
    RdpSetOtherMode,
    LoadTlut,
    RdpHalf2,
    SetTileSize,
    LoadBlock,
    LoadTile,
    SetTile,
    FillRect,
    SetFillColor,
    SetFogColor,
    SetBlendColor,
    SetPrimColor,
    SetEnvColor,
    SetCombine,
    SetTImg,
    SetZImg,
    SetCImg,
);

impl Instruction {
    /// Decode one command word.
    ///
    /// `Ok(None)` means no command's fixed bits match the word. `Err` means a
    /// command matched but its fields are inconsistent.
    pub fn decode(word: u64) -> Result<Option<Instruction>, CommandError> {
        match opcode_tables::lookup(word) {
            Some(entry) => (entry.decode)(word).map(Some),
            None => Ok(None),
        }
    }

    /// Borrow the payload if this is a `C` command.
    pub fn cast<C: Cast>(&self) -> Option<&C> {
        C::cast(self)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Instruction::EndDl(_))
    }

    /// Target of a display-list call or branch.
    pub fn call_target(&self) -> Option<SegAddr> {
        self.cast::<Dl>().map(|dl| dl.address)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.name(), self.payload())
    }
}

//! Majora's Mask message text
//!
//! Every message starts with an 11-byte header describing its box, then
//! single-byte text terminated by `0xBF`. US and European builds share the
//! control codes; the European font adds the Spanish punctuation.

use crate::error::TextError;
use crate::text::{push_char, Color, ControlCode, TextCursor, TextFragment, BUTTONS};
use crate::util::get_u16;

pub const HEADER_SIZE: usize = 11;

const END: u8 = 0xBF;
const NO_VALUE: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmCharset {
    Us,
    Eu,
}

impl MmCharset {
    fn last_special(self) -> u8 {
        match self {
            MmCharset::Us => 0xAC,
            MmCharset::Eu => 0xAF,
        }
    }
}

/// Accented letters and punctuation at 0x80..=0xAF.
const SPECIAL_CHARS: [char; 48] = [
    'À', 'Á', 'Â', 'Ä', 'Ç', 'È', 'É', 'Ê', 'Ë', 'Ì', 'Í', 'Î', 'Ï', 'Ñ', 'Ò', 'Ó', 'Ô', 'Ö', 'Ù',
    'Ú', 'Û', 'Ü', 'ß', 'à', 'á', 'â', 'ä', 'ç', 'è', 'é', 'ê', 'ë', 'ì', 'í', 'î', 'ï', 'ñ', 'ò',
    'ó', 'ô', 'ö', 'ù', 'ú', 'û', 'ü', '¡', '¿', 'ª',
];

const BUTTON_FIRST: u8 = 0xB0;
const BUTTON_LAST: u8 = 0xBC;

/// Text box settings stored in front of each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmMessageHeader {
    pub box_type: u8,
    pub box_position: u8,
    pub icon: u8,
    pub next_message: Option<u16>,
    pub first_price: Option<u16>,
    pub second_price: Option<u16>,
}

fn optional(v: u16) -> Option<u16> {
    (v != NO_VALUE).then_some(v)
}

impl MmMessageHeader {
    pub fn parse(bytes: &[u8]) -> Option<MmMessageHeader> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        Some(MmMessageHeader {
            box_type: bytes[0],
            box_position: bytes[1],
            icon: bytes[2],
            next_message: optional(get_u16(bytes, 3)?),
            first_price: optional(get_u16(bytes, 5)?),
            second_price: optional(get_u16(bytes, 7)?),
        })
    }

    /// Read the header and advance past it.
    pub fn read(cursor: &mut TextCursor) -> Result<MmMessageHeader, TextError> {
        let start = cursor.pos();
        let mut raw = [0u8; HEADER_SIZE];
        for b in raw.iter_mut() {
            *b = cursor.next_u8()?;
        }
        MmMessageHeader::parse(&raw).ok_or(TextError::UnexpectedEnd(start))
    }
}

fn control(b: u8) -> Option<(ControlCode, usize)> {
    let c = match b {
        0x0B => (ControlCode::SwampCruiseHits, 0),
        0x0C => (ControlCode::StrayFairies, 0),
        0x0D => (ControlCode::GoldSkulltulas, 0),
        0x10 => (ControlCode::BoxBreak, 0),
        0x11 => (ControlCode::NewLine, 0),
        0x12 => (ControlCode::BoxBreak2, 0),
        0x13 => (ControlCode::CarriageReturn, 0),
        0x14 => (ControlCode::Shift, 1),
        0x15 => (ControlCode::Continue, 0),
        0x16 => (ControlCode::PlayerName, 0),
        0x17 => (ControlCode::QuickTextOn, 0),
        0x18 => (ControlCode::QuickTextOff, 0),
        0x19 => (ControlCode::Event, 0),
        0x1A => (ControlCode::Persistent, 0),
        0x1B => (ControlCode::BoxBreakDelayed, 2),
        0x1C => (ControlCode::Fade, 2),
        0x1D => (ControlCode::DelayEnd, 2),
        0x1E => (ControlCode::Sound, 2),
        0x1F => (ControlCode::Delay, 2),
        0xC1 => (ControlCode::Background, 0),
        0xC2 => (ControlCode::TwoChoice, 0),
        0xC3 => (ControlCode::ThreeChoice, 0),
        _ => return None,
    };
    Some(c)
}

fn color(b: u8) -> Option<Color> {
    let c = match b {
        0x00 => Color::Default,
        0x01 => Color::Red,
        0x02 => Color::Green,
        0x03 => Color::Blue,
        0x04 => Color::Yellow,
        0x05 => Color::LightBlue,
        0x06 => Color::Pink,
        0x07 => Color::Silver,
        0x08 => Color::Orange,
        _ => return None,
    };
    Some(c)
}

/// Decode message text (after the header), stopping after its end code.
pub fn decode(cursor: &mut TextCursor, charset: MmCharset) -> Result<Vec<TextFragment>, TextError> {
    let mut out = Vec::new();
    loop {
        let start = cursor.pos();
        let b = cursor.next_u8()?;
        if b == END {
            out.push(TextFragment::control(ControlCode::End));
            return Ok(out);
        }
        if let Some(c) = color(b) {
            out.push(TextFragment::Color(c));
            continue;
        }
        if let Some((code, n)) = control(b) {
            if n == 0 {
                out.push(TextFragment::control(code));
            } else {
                out.push(TextFragment::control_with(code, cursor.arg(n)?));
            }
            continue;
        }
        match b {
            0x0A | 0x0E | 0x0F => {
                out.push(TextFragment::control_with(ControlCode::Reserved, b as u32))
            }
            0x20..=0x7E => push_char(&mut out, b as char),
            0x80..=0xAF if b <= charset.last_special() => {
                push_char(&mut out, SPECIAL_CHARS[(b - 0x80) as usize])
            }
            BUTTON_FIRST..=BUTTON_LAST => {
                out.push(TextFragment::Button(BUTTONS[(b - BUTTON_FIRST) as usize]))
            }
            0xC4..=0xFF => out.push(TextFragment::control_with(ControlCode::GameValue, b as u32)),
            _ => return Err(TextError::unknown(cursor.since(start))),
        }
    }
}

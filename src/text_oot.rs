// Ocarina of Time single-byte message text (English, German and French)

use crate::error::TextError;
use crate::text::{push_char, Color, ControlCode, TextCursor, TextFragment, BUTTONS};

const END: u8 = 0x02;
const COLOR: u8 = 0x05;

/// Accented letters at 0x80..=0x9E.
const SPECIAL_CHARS: [char; 31] = [
    'À', 'î', 'Â', 'Ä', 'Ç', 'È', 'É', 'Ê', 'Ë', 'Ï', 'Ô', 'Ö', 'Ù', 'Û', 'Ü', 'ß', 'à', 'á', 'â',
    'ä', 'ç', 'è', 'é', 'ê', 'ë', 'ï', 'ô', 'ö', 'ù', 'û', 'ü',
];

const BUTTON_BASE: u8 = 0x9F;

/// Control code for `b` and the number of argument bytes following it.
fn control(b: u8) -> Option<(ControlCode, usize)> {
    let c = match b {
        0x01 => (ControlCode::NewLine, 0),
        0x04 => (ControlCode::BoxBreak, 0),
        0x06 => (ControlCode::Shift, 1),
        0x07 => (ControlCode::Goto, 2),
        0x08 => (ControlCode::QuickTextOn, 0),
        0x09 => (ControlCode::QuickTextOff, 0),
        0x0A => (ControlCode::Persistent, 0),
        0x0B => (ControlCode::Event, 0),
        0x0C => (ControlCode::BoxBreakDelayed, 1),
        0x0D => (ControlCode::AwaitButton, 0),
        0x0E => (ControlCode::Fade, 1),
        0x0F => (ControlCode::PlayerName, 0),
        0x10 => (ControlCode::Ocarina, 0),
        0x11 => (ControlCode::Fade2, 2),
        0x12 => (ControlCode::Sound, 2),
        0x13 => (ControlCode::ItemIcon, 1),
        0x14 => (ControlCode::TextSpeed, 1),
        0x15 => (ControlCode::Background, 3),
        0x16 => (ControlCode::MarathonTime, 0),
        0x17 => (ControlCode::RaceTime, 0),
        0x18 => (ControlCode::Points, 0),
        0x19 => (ControlCode::GoldSkulltulas, 0),
        0x1A => (ControlCode::Unskippable, 0),
        0x1B => (ControlCode::TwoChoice, 0),
        0x1C => (ControlCode::ThreeChoice, 0),
        0x1D => (ControlCode::FishWeight, 0),
        0x1E => (ControlCode::HighScore, 1),
        0x1F => (ControlCode::Time, 0),
        _ => return None,
    };
    Some(c)
}

pub(crate) fn color(code: u8) -> Option<Color> {
    let c = match code {
        0x40 => Color::Default,
        0x41 => Color::Red,
        0x42 => Color::Green,
        0x43 => Color::Blue,
        0x44 => Color::LightBlue,
        0x45 => Color::Pink,
        0x46 => Color::Yellow,
        0x47 => Color::Black,
        _ => return None,
    };
    Some(c)
}

/// Decode one message, stopping after its end code.
pub fn decode(cursor: &mut TextCursor) -> Result<Vec<TextFragment>, TextError> {
    let mut out = Vec::new();
    loop {
        let start = cursor.pos();
        let b = cursor.next_u8()?;
        match b {
            END => {
                out.push(TextFragment::control(ControlCode::End));
                return Ok(out);
            }
            COLOR => {
                let code = cursor.next_u8()?;
                let c = color(code)
                    .ok_or_else(|| TextError::bad(cursor.since(start), "unknown color"))?;
                out.push(TextFragment::Color(c));
            }
            0x20..=0x7E => push_char(&mut out, b as char),
            0x80..=0x9E => push_char(&mut out, SPECIAL_CHARS[(b - 0x80) as usize]),
            0x9F..=0xAB => out.push(TextFragment::Button(BUTTONS[(b - BUTTON_BASE) as usize])),
            _ => match control(b) {
                Some((code, 0)) => out.push(TextFragment::control(code)),
                Some((code, n)) => out.push(TextFragment::control_with(code, cursor.arg(n)?)),
                None => return Err(TextError::unknown(cursor.since(start))),
            },
        }
    }
}

// Ocarina of Time Japanese message text
//
// Text is a stream of two-byte Shift-JIS units. Control codes reuse unit
// values from the Shift-JIS symbol rows, so each unit is checked against the
// control and button tables before falling back to a character decode.

use encoding_rs::SHIFT_JIS;

use crate::error::TextError;
use crate::text::{push_str, ControlCode, TextCursor, TextFragment, BUTTONS};
use crate::text_oot;

const END: u16 = 0x8170;
const COLOR: u16 = 0x000B;
const BUTTON_FIRST: u16 = 0x839F;
const BUTTON_LAST: u16 = 0x83AB;

/// Control code for `unit` and the number of argument bytes following it.
fn control(unit: u16) -> Option<(ControlCode, usize)> {
    let c = match unit {
        0x000A => (ControlCode::NewLine, 0),
        0x81A5 => (ControlCode::BoxBreak, 0),
        0x86C7 => (ControlCode::Shift, 2),
        0x81CB => (ControlCode::Goto, 2),
        0x8189 => (ControlCode::QuickTextOn, 0),
        0x818A => (ControlCode::QuickTextOff, 0),
        0x86C8 => (ControlCode::Persistent, 0),
        0x819F => (ControlCode::Event, 0),
        0x81A3 => (ControlCode::BoxBreakDelayed, 2),
        0x81A4 => (ControlCode::AwaitButton, 0),
        0x819E => (ControlCode::Fade, 2),
        0x874F => (ControlCode::PlayerName, 0),
        0x81F0 => (ControlCode::Ocarina, 0),
        0x81F4 => (ControlCode::Fade2, 2),
        0x81F3 => (ControlCode::Sound, 2),
        0x819A => (ControlCode::ItemIcon, 2),
        0x86C9 => (ControlCode::TextSpeed, 2),
        0x86B3 => (ControlCode::Background, 4),
        0x8791 => (ControlCode::MarathonTime, 0),
        0x8792 => (ControlCode::RaceTime, 0),
        0x879B => (ControlCode::Points, 0),
        0x86A3 => (ControlCode::GoldSkulltulas, 0),
        0x8199 => (ControlCode::Unskippable, 0),
        0x81BC => (ControlCode::TwoChoice, 0),
        0x81B8 => (ControlCode::ThreeChoice, 0),
        0x86A4 => (ControlCode::FishWeight, 0),
        0x869F => (ControlCode::HighScore, 2),
        0x81A1 => (ControlCode::Time, 0),
        _ => return None,
    };
    Some(c)
}

fn is_lead_byte(b: u8) -> bool {
    matches!(b, 0x81..=0x9F | 0xE0..=0xFC)
}

/// Decode one message, stopping after its end code.
pub fn decode(cursor: &mut TextCursor) -> Result<Vec<TextFragment>, TextError> {
    let mut out = Vec::new();
    loop {
        let start = cursor.pos();
        let unit = cursor.next_u16()?;
        let [lead, trail] = unit.to_be_bytes();

        if unit == END {
            out.push(TextFragment::control(ControlCode::End));
            return Ok(out);
        }
        if unit == COLOR {
            let arg = cursor.next_u16()?;
            let c = match arg.to_be_bytes() {
                [0, code] => text_oot::color(code),
                _ => None,
            }
            .ok_or_else(|| TextError::bad(cursor.since(start), "unknown color"))?;
            out.push(TextFragment::Color(c));
            continue;
        }
        if let Some((code, n)) = control(unit) {
            if n == 0 {
                out.push(TextFragment::control(code));
            } else {
                out.push(TextFragment::control_with(code, cursor.arg(n)?));
            }
            continue;
        }
        if (BUTTON_FIRST..=BUTTON_LAST).contains(&unit) {
            out.push(TextFragment::Button(
                BUTTONS[(unit - BUTTON_FIRST) as usize],
            ));
            continue;
        }
        if !is_lead_byte(lead) {
            return Err(TextError::unknown(&[lead, trail]));
        }
        match SHIFT_JIS.decode_without_bom_handling_and_without_replacement(&[lead, trail]) {
            Some(text) => push_str(&mut out, &text),
            None => return Err(TextError::bad(&[lead, trail], "not a Shift-JIS character")),
        }
    }
}

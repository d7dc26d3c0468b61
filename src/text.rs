//! Message text shared by all in-game encodings
//!
//! A decoded message is a flat list of `TextFragment`s. Adjacent printable
//! characters always coalesce into one `Text` fragment, so the list alternates
//! between runs of text and the control codes between them.

use std::fmt::{self, Display, Formatter};

use crate::error::TextError;
use crate::message_table::Language;
use crate::text_mm::{self, MmCharset, MmMessageHeader};
use crate::version::{Game, Region};
use crate::{text_oot, text_oot_sjis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Red,
    Green,
    Blue,
    LightBlue,
    Pink,
    Yellow,
    Black,
    Silver,
    Orange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    C,
    L,
    R,
    Z,
    CUp,
    CDown,
    CLeft,
    CRight,
    Triangle,
    ControlStick,
    DPad,
}

/// Button glyphs in font order, shared by every encoding.
pub const BUTTONS: [Button; 13] = [
    Button::A,
    Button::B,
    Button::C,
    Button::L,
    Button::R,
    Button::Z,
    Button::CUp,
    Button::CDown,
    Button::CLeft,
    Button::CRight,
    Button::Triangle,
    Button::ControlStick,
    Button::DPad,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCode {
    NewLine,
    End,
    BoxBreak,
    /// Box break after a delay, argument in frames.
    BoxBreakDelayed,
    /// Second box-break flavour used by Majora's Mask.
    BoxBreak2,
    CarriageReturn,
    Shift,
    /// Continue with another message, argument is its id.
    Goto,
    QuickTextOn,
    QuickTextOff,
    Persistent,
    Event,
    AwaitButton,
    Fade,
    Fade2,
    Continue,
    Delay,
    DelayEnd,
    PlayerName,
    Ocarina,
    Sound,
    ItemIcon,
    TextSpeed,
    Background,
    MarathonTime,
    RaceTime,
    Points,
    GoldSkulltulas,
    SwampCruiseHits,
    StrayFairies,
    /// Majora's Mask code that prints nothing; argument is the raw byte.
    Reserved,
    Unskippable,
    TwoChoice,
    ThreeChoice,
    FishWeight,
    HighScore,
    Time,
    /// A game counter or timer substituted at display time; argument is
    /// the selector byte.
    GameValue,
}

impl ControlCode {
    pub fn label(self) -> &'static str {
        match self {
            ControlCode::NewLine => "newline",
            ControlCode::End => "end",
            ControlCode::BoxBreak => "box_break",
            ControlCode::BoxBreakDelayed => "box_break_delayed",
            ControlCode::BoxBreak2 => "box_break2",
            ControlCode::CarriageReturn => "carriage_return",
            ControlCode::Shift => "shift",
            ControlCode::Goto => "goto",
            ControlCode::QuickTextOn => "quicktext_on",
            ControlCode::QuickTextOff => "quicktext_off",
            ControlCode::Persistent => "persistent",
            ControlCode::Event => "event",
            ControlCode::AwaitButton => "await_button",
            ControlCode::Fade => "fade",
            ControlCode::Fade2 => "fade2",
            ControlCode::Continue => "continue",
            ControlCode::Delay => "delay",
            ControlCode::DelayEnd => "delay_end",
            ControlCode::PlayerName => "name",
            ControlCode::Ocarina => "ocarina",
            ControlCode::Sound => "sound",
            ControlCode::ItemIcon => "item_icon",
            ControlCode::TextSpeed => "text_speed",
            ControlCode::Background => "background",
            ControlCode::MarathonTime => "marathon_time",
            ControlCode::RaceTime => "race_time",
            ControlCode::Points => "points",
            ControlCode::GoldSkulltulas => "gold_skulltulas",
            ControlCode::SwampCruiseHits => "swamp_cruise_hits",
            ControlCode::StrayFairies => "stray_fairies",
            ControlCode::Reserved => "reserved",
            ControlCode::Unskippable => "unskippable",
            ControlCode::TwoChoice => "two_choice",
            ControlCode::ThreeChoice => "three_choice",
            ControlCode::FishWeight => "fish_weight",
            ControlCode::HighScore => "high_score",
            ControlCode::Time => "time",
            ControlCode::GameValue => "value",
        }
    }

    fn is_box_break(self) -> bool {
        matches!(
            self,
            ControlCode::BoxBreak | ControlCode::BoxBreakDelayed | ControlCode::BoxBreak2
        )
    }

    /// Codes replaced by a number or name when the message is shown.
    fn is_placeholder(self) -> bool {
        matches!(
            self,
            ControlCode::PlayerName
                | ControlCode::MarathonTime
                | ControlCode::RaceTime
                | ControlCode::Points
                | ControlCode::GoldSkulltulas
                | ControlCode::SwampCruiseHits
                | ControlCode::StrayFairies
                | ControlCode::FishWeight
                | ControlCode::HighScore
                | ControlCode::Time
                | ControlCode::GameValue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFragment {
    Text(String),
    Color(Color),
    Button(Button),
    Control { code: ControlCode, arg: Option<u32> },
}

impl TextFragment {
    pub fn control(code: ControlCode) -> TextFragment {
        TextFragment::Control { code, arg: None }
    }

    pub fn control_with(code: ControlCode, arg: u32) -> TextFragment {
        TextFragment::Control {
            code,
            arg: Some(arg),
        }
    }

    pub fn code(&self) -> Option<ControlCode> {
        match self {
            TextFragment::Control { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl Display for TextFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TextFragment::Text(s) => f.write_str(s),
            TextFragment::Color(c) => write!(f, "<{:?}>", c),
            TextFragment::Button(b) => write!(f, "[{:?}]", b),
            TextFragment::Control { code, arg: None } => write!(f, "<{}>", code.label()),
            TextFragment::Control {
                code,
                arg: Some(arg),
            } => write!(f, "<{}:{:#x}>", code.label(), arg),
        }
    }
}

/// Append `c`, joining it onto a trailing text run.
pub fn push_char(out: &mut Vec<TextFragment>, c: char) {
    if let Some(TextFragment::Text(s)) = out.last_mut() {
        s.push(c);
    } else {
        out.push(TextFragment::Text(c.to_string()));
    }
}

pub fn push_str(out: &mut Vec<TextFragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(TextFragment::Text(s)) = out.last_mut() {
        s.push_str(text);
    } else {
        out.push(TextFragment::Text(text.to_string()));
    }
}

/// Render fragments as one string with control codes in angle brackets.
pub fn markup(fragments: &[TextFragment]) -> String {
    fragments.iter().map(|f| f.to_string()).collect()
}

/// The text a player would read, with names and counters as placeholders.
pub fn plain_text(fragments: &[TextFragment]) -> String {
    let mut out = String::new();
    for f in fragments {
        match f {
            TextFragment::Text(s) => out.push_str(s),
            TextFragment::Button(b) => out.push_str(&format!("[{:?}]", b)),
            TextFragment::Control { code, .. } => match code {
                ControlCode::NewLine | ControlCode::CarriageReturn => out.push('\n'),
                c if c.is_box_break() => out.push_str("\n\n"),
                c if c.is_placeholder() => out.push_str(&format!("[{}]", c.label())),
                _ => (),
            },
            TextFragment::Color(_) => (),
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextLine {
    pub fragments: Vec<TextFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub lines: Vec<TextLine>,
}

impl Default for TextBox {
    fn default() -> Self {
        TextBox {
            lines: vec![TextLine::default()],
        }
    }
}

/// Lay fragments out into the text boxes the game would show.
///
/// Newlines start a new line and box breaks a new box; both codes are
/// consumed. Everything after the end code is ignored.
pub fn compose(fragments: &[TextFragment]) -> Vec<TextBox> {
    let mut boxes = Vec::new();
    let mut current = TextBox::default();
    for f in fragments {
        match f.code() {
            Some(ControlCode::End) => break,
            Some(ControlCode::NewLine) => current.lines.push(TextLine::default()),
            Some(c) if c.is_box_break() => boxes.push(std::mem::take(&mut current)),
            _ => {
                if let Some(line) = current.lines.last_mut() {
                    line.fragments.push(f.clone());
                }
            }
        }
    }
    boxes.push(current);
    boxes
}

/// Read position inside a message buffer.
#[derive(Debug, Clone)]
pub struct TextCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TextCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        TextCursor { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        TextCursor { bytes, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn next_u8(&mut self) -> Result<u8, TextError> {
        let b = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or(TextError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    pub fn next_u16(&mut self) -> Result<u16, TextError> {
        Ok(self.arg(2)? as u16)
    }

    /// Read an `n`-byte big-endian argument, `n <= 4`.
    pub fn arg(&mut self, n: usize) -> Result<u32, TextError> {
        let raw = self
            .bytes
            .get(self.pos..self.pos + n)
            .ok_or(TextError::UnexpectedEnd(self.pos))?;
        self.pos += n;
        Ok(raw.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }

    /// Bytes from `start` up to the current position, for error reports.
    pub fn since(&self, start: usize) -> &'a [u8] {
        &self.bytes[start.min(self.pos)..self.pos]
    }
}

/// One message: the Majora's Mask box header, if any, and its fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Option<MmMessageHeader>,
    pub fragments: Vec<TextFragment>,
}

impl Message {
    pub fn boxes(&self) -> Vec<TextBox> {
        compose(&self.fragments)
    }

    pub fn plain_text(&self) -> String {
        plain_text(&self.fragments)
    }
}

/// The four message encodings found on the supported cartridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    OotAscii,
    OotShiftJis,
    MmAscii,
    /// Majora's Mask European text: the same codes with a wider character set.
    MmEuAscii,
}

impl TextEncoding {
    /// Encoding used for `language` on a given game and region.
    pub fn for_language(game: Game, region: Region, language: Language) -> Option<TextEncoding> {
        match (game, region, language) {
            (Game::Oot, _, Language::Japanese) => Some(TextEncoding::OotShiftJis),
            (Game::Oot, _, _) => Some(TextEncoding::OotAscii),
            (Game::Mm, _, Language::Japanese) => None,
            (Game::Mm, Region::Eu, _) => Some(TextEncoding::MmEuAscii),
            (Game::Mm, _, _) => Some(TextEncoding::MmAscii),
        }
    }

    /// Decode fragments up to and including the end code.
    pub fn decode(self, cursor: &mut TextCursor) -> Result<Vec<TextFragment>, TextError> {
        match self {
            TextEncoding::OotAscii => text_oot::decode(cursor),
            TextEncoding::OotShiftJis => text_oot_sjis::decode(cursor),
            TextEncoding::MmAscii => text_mm::decode(cursor, MmCharset::Us),
            TextEncoding::MmEuAscii => text_mm::decode(cursor, MmCharset::Eu),
        }
    }

    pub fn has_header(self) -> bool {
        matches!(self, TextEncoding::MmAscii | TextEncoding::MmEuAscii)
    }

    /// Decode the message starting at `offset` in `bytes`.
    pub fn read_message(self, bytes: &[u8], offset: usize) -> Result<Message, TextError> {
        let mut cursor = TextCursor::at(bytes, offset);
        let header = if self.has_header() {
            Some(MmMessageHeader::read(&mut cursor)?)
        } else {
            None
        };
        Ok(Message {
            header,
            fragments: self.decode(&mut cursor)?,
        })
    }
}

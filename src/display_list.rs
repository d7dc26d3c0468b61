//! Display-list discovery inside raw file data
//!
//! Object files keep their display lists packed between vertex and texture
//! data with nothing marking where a list begins. Every list does end in
//! `G_ENDDL`, so the scanner walks the file backwards one word at a time:
//! an ENDDL opens a list, and each preceding word that decodes cleanly is
//! pushed onto its front. The first word that does not decode closes it.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;

use log::{debug, trace};

use crate::instruction::{EndDl, Instruction};
use crate::util::get_u64;

pub const WORD_SIZE: usize = 8;
pub const ENDDL_WORD: u64 = 0xDF00_0000_0000_0000;

/// A run of instructions ending in `G_ENDDL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayList {
    /// Byte offset of the first instruction within the scanned data.
    pub offset: usize,
    pub instructions: VecDeque<Instruction>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Byte offset just past the terminating ENDDL.
    pub fn end(&self) -> usize {
        self.offset + self.len() * WORD_SIZE
    }
}

/// Display lists keyed by starting byte offset.
pub type DisplayLists = BTreeMap<usize, DisplayList>;

struct OpenList {
    instructions: VecDeque<Instruction>,
}

/// Find every display list in `data`.
pub fn find_display_lists(data: &[u8]) -> DisplayLists {
    let mut lists = DisplayLists::new();
    let words = data.len() / WORD_SIZE;
    let mut open: Option<OpenList> = None;

    let mut close = |open: &mut Option<OpenList>, offset: usize| {
        if let Some(list) = open.take() {
            trace!(
                "display list at {:#x} ({} instructions)",
                offset,
                list.instructions.len()
            );
            lists.insert(
                offset,
                DisplayList {
                    offset,
                    instructions: list.instructions,
                },
            );
        }
    };

    for index in (0..words).rev() {
        let offset = index * WORD_SIZE;
        let Some(word) = get_u64(data, offset) else {
            break;
        };

        if word == ENDDL_WORD {
            close(&mut open, offset + WORD_SIZE);
            open = Some(OpenList {
                instructions: VecDeque::from([Instruction::EndDl(EndDl)]),
            });
            continue;
        }

        let Some(list) = open.as_mut() else {
            continue;
        };
        match Instruction::decode(word) {
            Ok(Some(instruction)) => list.instructions.push_front(instruction),
            Ok(None) => close(&mut open, offset + WORD_SIZE),
            Err(e) => {
                debug!("{:#x}: {}", offset, e);
                close(&mut open, offset + WORD_SIZE);
            }
        }
    }
    close(&mut open, 0);

    lists
}

/// Text listing of `lists`, one instruction per line.
pub fn render(lists: &DisplayLists) -> String {
    let mut out = String::new();
    for list in lists.values() {
        let _ = writeln!(out, "dlist_{:08X}:", list.offset);
        for (i, instruction) in list.instructions.iter().enumerate() {
            let _ = writeln!(
                out,
                "    {:08X}: {}",
                list.offset + i * WORD_SIZE,
                instruction
            );
        }
    }
    out
}

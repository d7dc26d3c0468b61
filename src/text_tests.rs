#[cfg(test)]
mod tests {
    use crate::error::TextError;
    use crate::message_table::Language;
    use crate::text::*;
    use crate::version::{Game, Region};
    use test_log::test;

    #[test]
    fn cursor_stops_just_past_end_code() {
        let bytes = [0x41, 0x42, 0x02, 0x43, 0x44];
        let mut cursor = TextCursor::new(&bytes);
        let f = TextEncoding::OotAscii.decode(&mut cursor).unwrap();
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.peek(), Some(0x43));
        assert_eq!(plain_text(&f), "AB");
    }

    #[test]
    fn read_message_at_offset() {
        let bytes = b"First\x02Second\x01line\x02";
        let m = TextEncoding::OotAscii.read_message(bytes, 6).unwrap();
        assert_eq!(m.header, None);
        assert_eq!(m.plain_text(), "Second\nline");
        assert_eq!(m.boxes().len(), 1);
        assert_eq!(m.boxes()[0].lines.len(), 2);
    }

    #[test]
    fn encoding_per_language() {
        use TextEncoding::*;
        let cases = [
            (Game::Oot, Region::Ntsc, Language::Japanese, Some(OotShiftJis)),
            (Game::Oot, Region::Ntsc, Language::English, Some(OotAscii)),
            (Game::Oot, Region::Pal, Language::French, Some(OotAscii)),
            (Game::Mm, Region::Us, Language::English, Some(MmAscii)),
            (Game::Mm, Region::Eu, Language::Spanish, Some(MmEuAscii)),
            (Game::Mm, Region::Jp, Language::Japanese, None),
        ];
        for (game, region, language, expected) in cases {
            assert_eq!(TextEncoding::for_language(game, region, language), expected);
        }
        assert!(MmAscii.has_header());
        assert!(!OotShiftJis.has_header());
    }

    #[test]
    fn markup_shows_codes() {
        let f = vec![
            TextFragment::Color(Color::Red),
            TextFragment::Text("Hey".into()),
            TextFragment::Button(Button::B),
            TextFragment::control_with(ControlCode::Sound, 0x28DF),
            TextFragment::control(ControlCode::End),
        ];
        let m = markup(&f);
        assert!(m.starts_with("<Red>Hey[B]<"));
        assert!(m.contains(":0x28df>"));
    }

    #[test]
    fn box_breaks_split_boxes() {
        let f = vec![
            TextFragment::Text("a".into()),
            TextFragment::control_with(ControlCode::BoxBreakDelayed, 0x10),
            TextFragment::Text("b".into()),
            TextFragment::control(ControlCode::End),
            TextFragment::Text("ignored".into()),
        ];
        let boxes = compose(&f);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[1].lines[0].fragments, vec![TextFragment::Text("b".into())]);
        assert_eq!(plain_text(&f[..3]), "a\n\nb");
    }

    #[test]
    fn short_reads_report_cursor_position() {
        let bytes = [0x07, 0x10, 0x20];
        let mut cursor = TextCursor::at(&bytes, 2);
        assert_eq!(cursor.arg(2), Err(TextError::UnexpectedEnd(2)));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.next_u8(), Ok(0x20));
        assert_eq!(cursor.next_u8(), Err(TextError::UnexpectedEnd(3)));
        assert_eq!(cursor.next_u16(), Err(TextError::UnexpectedEnd(3)));

        assert_eq!(
            TextEncoding::OotAscii.read_message(&bytes[..2], 0),
            Err(TextError::UnexpectedEnd(1))
        );
    }

    #[test]
    fn empty_buffer_is_unexpected_end() {
        for encoding in [
            TextEncoding::OotAscii,
            TextEncoding::OotShiftJis,
            TextEncoding::MmAscii,
            TextEncoding::MmEuAscii,
        ] {
            assert!(matches!(
                encoding.read_message(&[], 0),
                Err(TextError::UnexpectedEnd(0))
            ));
        }
    }
}

// Big-endian readers over byte slices

/// Read a big-endian u16 at `counter`, or `None` when it would run past the end.
pub fn get_u16(bytes: &[u8], counter: usize) -> Option<u16> {
    let raw = bytes.get(counter..counter.checked_add(2)?)?;
    Some(u16::from_be_bytes([raw[0], raw[1]]))
}

/// Read a big-endian u32 at `counter`, or `None` when it would run past the end.
pub fn get_u32(bytes: &[u8], counter: usize) -> Option<u32> {
    let raw = bytes.get(counter..counter.checked_add(4)?)?;
    Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Read a big-endian u64 at `counter`, or `None` when it would run past the end.
pub fn get_u64(bytes: &[u8], counter: usize) -> Option<u64> {
    let raw = bytes.get(counter..counter.checked_add(8)?)?;
    let mut word = [0u8; 8];
    word.copy_from_slice(raw);
    Some(u64::from_be_bytes(word))
}

/// Extract `width` bits of `word` starting at bit `shift` (bit 0 is the LSB).
pub fn bits(word: u64, shift: u32, width: u32) -> u64 {
    (word >> shift) & ((1u64 << width) - 1)
}

/// Sign-extend the low `width` bits of `value`.
pub fn sign_extend(value: u64, width: u32) -> i64 {
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// Swap every adjacent pair of bytes in place. A trailing odd byte is left alone.
pub fn swap_byte_pairs(bytes: &mut [u8]) {
    for pair in bytes.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Find the first occurrence of `needle` in `haystack`.
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(get_u16(&bytes, 1), Some(0x3456));
        assert_eq!(get_u32(&bytes, 4), Some(0x9ABCDEF0));
        assert_eq!(get_u64(&bytes, 0), Some(0x123456789ABCDEF0));
        assert_eq!(get_u32(&bytes, 5), None);
        assert_eq!(get_u16(&bytes, usize::MAX), None);
    }

    #[test]
    fn bit_fields() {
        assert_eq!(bits(0xDF00_0000_0000_0000, 56, 8), 0xDF);
        assert_eq!(bits(0x0000_0000_0000_00F0, 4, 4), 0xF);
        assert_eq!(sign_extend(0x1FF, 9), -1);
        assert_eq!(sign_extend(0x0FF, 9), 255);
    }

    #[test]
    fn byte_pairs() {
        let mut bytes = b"ezdl@a!".to_vec();
        swap_byte_pairs(&mut bytes);
        assert_eq!(&bytes, b"zelda@!");
        assert_eq!(find_bytes(b"xxzelda@", b"zelda@"), Some(2));
        assert_eq!(find_bytes(b"zeld", b"zelda@"), None);
    }
}

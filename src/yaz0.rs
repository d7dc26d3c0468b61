//! Yaz0 decompression
//!
//! Header (16 bytes):
//!   Magic "Yaz0" (or "Yaz1"), decompressed size (u32 big-endian), 8 reserved bytes.
//! Data:
//!   A flag byte governs the next eight operations, MSB first.
//!   Flag bit 1: copy one literal byte.
//!   Flag bit 0: two-byte back-reference `NR RR`. `N` is the length minus 2;
//!   when it is zero a third byte follows holding the length minus 0x12.
//!   `RRR + 1` is the distance back from the current output position.

use log::{debug, warn};

use crate::error::Yaz0Error;
use crate::util::get_u32;

pub const HEADER_SIZE: usize = 0x10;

/// True when `bytes` starts with a Yaz0/Yaz1 magic.
pub fn is_yaz0(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && (&bytes[..4] == b"Yaz0" || &bytes[..4] == b"Yaz1")
}

/// Decompressed size declared in the header.
pub fn declared_size(bytes: &[u8]) -> Result<usize, Yaz0Error> {
    if bytes.len() < HEADER_SIZE {
        return Err(Yaz0Error::Truncated(bytes.len()));
    }
    if !is_yaz0(bytes) {
        return Err(Yaz0Error::BadMagic(bytes[..4].to_vec()));
    }
    get_u32(bytes, 4)
        .map(|size| size as usize)
        .ok_or(Yaz0Error::Truncated(bytes.len()))
}

/// Decompress a complete Yaz0 stream.
///
/// The output is exactly the size declared in the header; anything else is
/// an error. Overlapping back-references read bytes already produced by the
/// same copy, which is how runs of one repeated byte are encoded.
pub fn decompress(src: &[u8]) -> Result<Vec<u8>, Yaz0Error> {
    let size = declared_size(src)?;
    // The declared size is untrusted until the stream actually produces it.
    let mut dst: Vec<u8> = Vec::with_capacity(size.min(src.len().saturating_mul(8)));
    let mut src_offs = HEADER_SIZE;

    'groups: while src_offs < src.len() && dst.len() < size {
        let flags = src[src_offs];
        src_offs += 1;

        for bit in (0..8).rev() {
            if src_offs >= src.len() || dst.len() >= size {
                break 'groups;
            }

            if flags & (1 << bit) != 0 {
                dst.push(src[src_offs]);
                src_offs += 1;
                continue;
            }

            if src_offs + 1 >= src.len() {
                return Err(Yaz0Error::Truncated(src.len()));
            }
            let b0 = src[src_offs] as usize;
            let b1 = src[src_offs + 1] as usize;
            src_offs += 2;

            let distance = (((b0 & 0x0F) << 8) | b1) + 1;
            let length = match b0 >> 4 {
                0 => {
                    let extra = *src.get(src_offs).ok_or(Yaz0Error::Truncated(src.len()))?;
                    src_offs += 1;
                    extra as usize + 0x12
                }
                n => n + 2,
            };

            if distance > dst.len() {
                return Err(Yaz0Error::BadReference {
                    distance,
                    position: dst.len(),
                });
            }

            let run = length.min(size - dst.len());
            if run < length {
                debug!(
                    "Yaz0 back-reference of {} bytes clipped to {} at end of output",
                    length, run
                );
            }
            let mut copy_offs = dst.len() - distance;
            for _ in 0..run {
                let byte = dst[copy_offs];
                dst.push(byte);
                copy_offs += 1;
            }
        }
    }

    if src_offs < src.len() && src[src_offs..].iter().any(|&b| b != 0) {
        warn!(
            "Yaz0 stream has {} unread bytes after output filled, not all padding",
            src.len() - src_offs
        );
    }

    if dst.len() != size {
        return Err(Yaz0Error::SizeMismatch {
            expected: size,
            actual: dst.len(),
        });
    }

    debug!(
        "Yaz0: decompressed {} bytes to {} bytes",
        src.len(),
        dst.len()
    );
    Ok(dst)
}

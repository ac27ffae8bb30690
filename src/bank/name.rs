//! Voice name decoding

use std::fmt::Write;

use super::variant::NAME_SIZE;

/// Decodes a raw voice name field into a display string.
///
/// Decoding stops at the first zero byte. Printable ASCII (0x20-0x7E) is kept
/// as is, every other byte is written as a bracketed decimal escape such as
/// `[5]`, so no byte is ever dropped. Trailing whitespace is trimmed.
///
/// Only the first 10 bytes are considered.
pub fn decode_name(raw: &[u8]) -> String {
    let mut name = String::with_capacity(NAME_SIZE);

    for &byte in raw.iter().take(NAME_SIZE) {
        if byte == 0 {
            break;
        }
        if (0x20..=0x7e).contains(&byte) {
            name.push(char::from(byte));
        } else {
            // writing to a String cannot fail
            let _ = write!(name, "[{}]", byte);
        }
    }

    let trimmed = name.trim_end().len();
    name.truncate(trimmed);
    name
}

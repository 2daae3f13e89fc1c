//! Decodes literal backslash escape sequences that survive JSON parsing.
//!
//! A recorded chunk's `data` field is plain JSON text, so by the time
//! `serde_json` hands it back to us any *real* JSON string escape (like a
//! literal newline) has already become the corresponding byte. What can
//! still be sitting in the string are sequences someone wrote out as text --
//! most importantly the ESC byte (0x1B) spelled as one of u001b, 033, or
//! x1b after a backslash (optionally with an extra backslash, if a writer
//! escaped its output twice) -- plus the usual n/r/t/b/f/v/backslash/quote/
//! slash escapes.
//! Anything else following a backslash is not a recognized spelling; the
//! backslash is dropped and only the following character passes through,
//! since guessing at an unrecognized escape would corrupt otherwise-valid
//! output.

const ESC: u8 = 0x1b;

/// Decode a chunk's text into the raw bytes it represents.
#[must_use]
pub fn decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        // One level of escaping: \u001b, \033, \x1b directly.
        if let Some(consumed) = match_esc_spelling(&bytes[i + 1..]) {
            out.push(ESC);
            i += 1 + consumed;
            continue;
        }

        let next_is_backslash = bytes.get(i + 1) == Some(&b'\\');

        // Two levels of escaping: \\u001b, \\033, \\x1b.
        if next_is_backslash {
            if let Some(consumed) = match_esc_spelling(&bytes[i + 2..]) {
                out.push(ESC);
                i += 2 + consumed;
                continue;
            }
            // Plain doubled backslash: one literal backslash.
            out.push(b'\\');
            i += 2;
            continue;
        }

        match bytes.get(i + 1) {
            Some(b'n') => {
                out.push(b'\n');
                i += 2;
            }
            Some(b'r') => {
                out.push(b'\r');
                i += 2;
            }
            Some(b't') => {
                out.push(b'\t');
                i += 2;
            }
            Some(b'b') => {
                out.push(0x08);
                i += 2;
            }
            Some(b'f') => {
                out.push(0x0c);
                i += 2;
            }
            Some(b'v') => {
                out.push(0x0b);
                i += 2;
            }
            Some(&c @ (b'\\' | b'"' | b'/')) => {
                out.push(c);
                i += 2;
            }
            Some(&c) => {
                // Unknown escape: drop the backslash, pass the char through.
                out.push(c);
                i += 2;
            }
            None => {
                out.push(b'\\');
                i += 1;
            }
        }
    }

    out
}

/// If `rest` begins with one of the recognized ESC spellings (`u001b`,
/// `033`, `x1b`, case-insensitive on the hex digits), returns how many bytes
/// of `rest` that spelling consumed.
fn match_esc_spelling(rest: &[u8]) -> Option<usize> {
    if rest.len() >= 5 && rest[0] == b'u' {
        if let Ok(hex) = std::str::from_utf8(&rest[1..5]) {
            if let Ok(0x1b) = u32::from_str_radix(hex, 16) {
                return Some(5);
            }
        }
    }
    if rest.len() >= 3 && rest[0].is_ascii_digit() {
        if let Ok(oct) = std::str::from_utf8(&rest[0..3]) {
            if let Ok(0x1b) = u32::from_str_radix(oct, 8) {
                return Some(3);
            }
        }
    }
    if rest.len() >= 3 && rest[0] == b'x' {
        if let Ok(hex) = std::str::from_utf8(&rest[1..3]) {
            if let Ok(0x1b) = u32::from_str_radix(hex, 16) {
                return Some(3);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unaffected() {
        assert_eq!(decode("abc"), b"abc".to_vec());
    }

    #[test]
    fn standard_escapes_decode_to_their_byte() {
        assert_eq!(decode(r"a\nb\tc"), b"a\nb\tc".to_vec());
        assert_eq!(decode(r#"\"q\""#), b"\"q\"".to_vec());
        assert_eq!(decode(r"\\"), b"\\".to_vec());
    }

    #[test]
    fn esc_spellings_all_decode_to_the_esc_byte() {
        assert_eq!(decode(r"\u001b[31m"), [&[ESC][..], b"[31m"].concat());
        assert_eq!(decode(r"\033[31m"), [&[ESC][..], b"[31m"].concat());
        assert_eq!(decode(r"\x1b[31m"), [&[ESC][..], b"[31m"].concat());
    }

    #[test]
    fn double_escaped_esc_spellings_still_decode() {
        assert_eq!(decode(r"\\u001b[31m"), [&[ESC][..], b"[31m"].concat());
        assert_eq!(decode(r"\\x1b[0m"), [&[ESC][..], b"[0m"].concat());
    }

    #[test]
    fn unknown_backslash_sequences_drop_the_backslash() {
        assert_eq!(decode(r"\q"), b"q".to_vec());
    }

    #[test]
    fn decoding_is_idempotent_on_already_decoded_text() {
        let once = decode(r"\u001b[32mOK\u001b[0m");
        let twice = decode(&String::from_utf8_lossy(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn colored_ok_banner_decodes_to_expected_bytes() {
        let decoded = decode(r"\u001b[32mOK\u001b[0m");
        let expected = [&[ESC][..], b"[32mOK", &[ESC][..], b"[0m"].concat();
        assert_eq!(decoded, expected);
    }
}

//! # Encoding Module
//!
//! Decoding of incoming serial data for display. Chunks are interpreted as
//! UTF-8 text; a chunk that is not valid UTF-8 is rendered as an
//! ASCII-escaped literal byte representation instead.

/// Decodes a chunk of received bytes to displayable text.
///
/// # Examples
///
/// ```
/// use serial_simple::serial::encoding::decode_chunk;
///
/// assert_eq!(decode_chunk(b"Hello\n"), "Hello\n");
/// assert_eq!(decode_chunk(&[0xFF, 0xFE]), "\\xff\\xfe");
/// ```
#[must_use]
pub fn decode_chunk(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => data.escape_ascii().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_chunk(b"Hello, world\r\n"), "Hello, world\r\n");
    }

    #[test]
    fn test_decode_utf8_multibyte() {
        assert_eq!(decode_chunk("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_decode_invalid_falls_back_to_escaped_bytes() {
        let decoded = decode_chunk(&[0x48, 0x69, 0xFF]);
        assert_eq!(decoded, "Hi\\xff");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_chunk(&[]), "");
    }
}

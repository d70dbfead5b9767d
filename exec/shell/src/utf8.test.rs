use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_ascii_passes_through() {
    let mut decoder = Utf8Decoder::new();
    assert_eq!(decoder.decode(b"hello"), "hello");
    assert!(!decoder.has_pending());
}

#[test]
fn test_split_multibyte_character() {
    let bytes = "日".as_bytes();
    assert_eq!(bytes.len(), 3);

    let mut decoder = Utf8Decoder::new();
    assert_eq!(decoder.decode(&bytes[..1]), "");
    assert!(decoder.has_pending());
    assert_eq!(decoder.decode(&bytes[1..2]), "");
    assert_eq!(decoder.decode(&bytes[2..]), "日");
    assert!(!decoder.has_pending());
}

#[test]
fn test_every_split_point_reassembles() {
    let text = "a✓b日本ö\u{1F600}z";
    let bytes = text.as_bytes();
    for split in 0..=bytes.len() {
        let mut decoder = Utf8Decoder::new();
        let mut out = decoder.decode(&bytes[..split]);
        out.push_str(&decoder.decode(&bytes[split..]));
        assert_eq!(out, text, "split at {split}");
        assert!(!decoder.has_pending());
    }
}

#[test]
fn test_byte_at_a_time() {
    let text = "héllo ✓";
    let mut decoder = Utf8Decoder::new();
    let mut out = String::new();
    for byte in text.as_bytes() {
        let piece = decoder.decode(std::slice::from_ref(byte));
        // Never emits half a character.
        assert!(piece.chars().all(|c| c != char::REPLACEMENT_CHARACTER));
        out.push_str(&piece);
    }
    assert_eq!(out, text);
}

#[test]
fn test_invalid_byte_is_replaced() {
    let mut decoder = Utf8Decoder::new();
    assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
}

#[test]
fn test_finish_flushes_incomplete_sequence() {
    let mut decoder = Utf8Decoder::new();
    assert_eq!(decoder.decode(&[b'x', 0xE6]), "x");
    assert_eq!(decoder.finish(), "\u{FFFD}");
    assert!(!decoder.has_pending());
}

use super::*;
use pretty_assertions::assert_eq;

const NONCE: &str = "n0nce";

fn marker(code: i32, cwd: &str) -> String {
    format!("\u{1e}SB{NONCE};{code};{cwd}\u{1e}")
}

/// Feed `input` split at every index in `splits` and join the results.
fn scan_in_pieces(input: &str, splits: &[usize]) -> (String, Vec<Marker>) {
    let mut scanner = MarkerScanner::new(NONCE);
    let mut text = String::new();
    let mut markers = Vec::new();
    let mut last = 0;
    for &split in splits.iter().chain(std::iter::once(&input.len())) {
        for event in scanner.feed(&input[last..split]) {
            match event {
                ScanEvent::Output(s) => text.push_str(&s),
                ScanEvent::Marker(m) => markers.push(m),
            }
        }
        last = split;
    }
    if let Some(rest) = scanner.flush() {
        text.push_str(&rest);
    }
    (text, markers)
}

#[test]
fn test_plain_output_passes_through() {
    let mut scanner = MarkerScanner::new(NONCE);
    assert_eq!(
        scanner.feed("hello\n"),
        vec![ScanEvent::Output("hello\n".to_string())]
    );
    assert_eq!(scanner.flush(), None);
}

#[test]
fn test_marker_is_extracted() {
    let mut scanner = MarkerScanner::new(NONCE);
    let input = format!("out\n{}", marker(0, "/tmp"));
    assert_eq!(
        scanner.feed(&input),
        vec![
            ScanEvent::Output("out\n".to_string()),
            ScanEvent::Marker(Marker {
                exit_code: 0,
                cwd: Some(PathBuf::from("/tmp")),
            }),
        ]
    );
}

#[test]
fn test_marker_split_at_every_byte() {
    let input = format!("before{}after", marker(3, "/home/u;x"));
    for split in 1..input.len() {
        if !input.is_char_boundary(split) {
            continue;
        }
        let (text, markers) = scan_in_pieces(&input, &[split]);
        assert_eq!(text, "beforeafter", "split at {split}");
        assert_eq!(
            markers,
            vec![Marker {
                exit_code: 3,
                cwd: Some(PathBuf::from("/home/u;x")),
            }],
            "split at {split}"
        );
    }
}

#[test]
fn test_marker_fed_one_char_at_a_time() {
    let input = format!("a{}b{}", marker(0, "/"), marker(1, "/srv"));
    let splits: Vec<usize> = input.char_indices().map(|(i, _)| i).skip(1).collect();
    let (text, markers) = scan_in_pieces(&input, &splits);
    assert_eq!(text, "ab");
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[1].exit_code, 1);
}

#[test]
fn test_prefix_lookalike_is_released() {
    let mut scanner = MarkerScanner::new(NONCE);
    // Held back: could still become a marker.
    assert_eq!(scanner.feed("x\u{1e}SB"), vec![ScanEvent::Output("x".to_string())]);
    // Not a marker after all.
    assert_eq!(
        scanner.feed("other"),
        vec![ScanEvent::Output("\u{1e}SBother".to_string())]
    );
}

#[test]
fn test_other_nonce_is_output() {
    let foreign = "\u{1e}SBzzz;0;/tmp\u{1e}";
    let (text, markers) = scan_in_pieces(foreign, &[]);
    assert_eq!(text, foreign);
    assert!(markers.is_empty());
}

#[test]
fn test_unterminated_marker_is_held_until_flush() {
    let mut scanner = MarkerScanner::new(NONCE);
    let partial = format!("\u{1e}SB{NONCE};0;/tm");
    assert_eq!(scanner.feed(&format!("out{partial}")), vec![ScanEvent::Output("out".to_string())]);
    assert_eq!(scanner.flush(), Some(partial));
}

#[test]
fn test_multibyte_text_around_marker() {
    let input = format!("✓日本{}ö", marker(0, "/データ"));
    let splits: Vec<usize> = input.char_indices().map(|(i, _)| i).skip(1).collect();
    let (text, markers) = scan_in_pieces(&input, &splits);
    assert_eq!(text, "✓日本ö");
    assert_eq!(markers[0].cwd, Some(PathBuf::from("/データ")));
}

#[test]
fn test_bad_status_and_empty_cwd() {
    let mut scanner = MarkerScanner::new(NONCE);
    let events = scanner.feed(&format!("\u{1e}SB{NONCE};x;\u{1e}"));
    assert_eq!(
        events,
        vec![ScanEvent::Marker(Marker {
            exit_code: -1,
            cwd: None,
        })]
    );
}

use regex::Regex;

/// Asserts that every line of `got` matches the corresponding pattern of
/// `want` (one pattern per line, anchored at both ends).
pub fn assert_lines(got: &str, want: &str) {
    let got: Vec<_> = got.lines().collect();
    let want: Vec<_> = want.lines().collect();

    assert_eq!(
        got.len(),
        want.len(),
        "line count mismatch:\n{}\n---\n{}",
        got.join("\n"),
        want.join("\n")
    );

    for (got, want) in got.iter().zip(want.iter()) {
        let regex = Regex::new(&format!("^{want}$")).unwrap();
        assert!(regex.is_match(got), "{got:?} does not match {want:?}");
    }
}

/// Asserts that `got` starts with lines matching `want` (see
/// [assert_lines]).
pub fn assert_prefix_lines(got: &str, want: &str) {
    let count = want.lines().count();
    let got = got.lines().take(count).collect::<Vec<_>>().join("\n");

    assert_lines(&got, want);
}

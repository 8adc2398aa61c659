use std::borrow::Cow;

/// Shortens a demangled function name by stripping its module path.
///
/// - `errtrace::stack::callers` becomes `callers`.
/// - A method keeps its enclosing type: `errtrace::frame::Frame::line`
///   becomes `Frame::line`.
/// - A qualified receiver keeps its angle brackets, with every path inside
///   shortened: `<std::io::Stdout as std::io::Write>::write` becomes
///   `<Stdout as Write>::write`.
/// - Closure segments are kept: `app::main::{{closure}}` becomes
///   `main::{{closure}}`.
/// - A name without any path separator is returned unchanged.
///
/// A trailing symbol hash (`::h0123456789abcdef`) is dropped.
pub fn funcname(name: &str) -> Cow<'_, str> {
    let name = strip_hash(name);

    if let Some(qualified) = name.strip_prefix('<') {
        if let Some(end) = closing_bracket(qualified) {
            let receiver = qualified[..end]
                .split(" as ")
                .map(last_segment)
                .collect::<Vec<_>>()
                .join(" as ");

            return Cow::Owned(format!("<{receiver}>{}", &qualified[end + 1..]));
        }
    }

    let segments = split_path(name);

    let Some(fn_idx) = segments.iter().rposition(|seg| !is_closure(seg)) else {
        return Cow::Borrowed(name);
    };

    let start = match fn_idx.checked_sub(1).map(|i| segments[i]) {
        Some(ty) if ty.starts_with(|c: char| c.is_ascii_uppercase()) => fn_idx - 1,
        _ => fn_idx,
    };

    if start == 0 {
        return Cow::Borrowed(name);
    }

    Cow::Owned(segments[start..].join("::"))
}

fn strip_hash(name: &str) -> &str {
    match name.rsplit_once("::h") {
        Some((path, hash)) if hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            path
        }
        _ => name,
    }
}

fn is_closure(segment: &str) -> bool {
    segment.starts_with('{')
}

fn last_segment(path: &str) -> &str {
    split_path(path).pop().unwrap_or(path)
}

/// Returns the index of the `>` closing an already opened `<`.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut prev = '\0';

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => (),
        }
        prev = c;
    }

    None
}

/// Splits a path on `::`, ignoring separators within generic arguments.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => (),
        }
        i += 1;
    }

    segments.push(&path[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::{funcname, split_path};

    #[test]
    fn shorten_names() {
        let tests = [
            ("", ""),
            ("main", "main"),
            ("funcname", "funcname"),
            ("std::rt::lang_start", "lang_start"),
            ("errtrace_symbol::funcname", "funcname"),
            ("std::io::copy::generic_copy", "generic_copy"),
            ("errtrace::frame::Frame::line", "Frame::line"),
            ("app::main::{{closure}}", "main::{{closure}}"),
            ("app::run::{{closure}}::{{closure}}", "run::{{closure}}::{{closure}}"),
            ("<std::io::Stdout as std::io::Write>::write", "<Stdout as Write>::write"),
            ("<app::R as core::fmt::Display>::fmt", "<R as Display>::fmt"),
            ("<app::R>::method", "<R>::method"),
            ("core::ops::function::FnOnce::call_once", "FnOnce::call_once"),
            (
                "core::ptr::drop_in_place<alloc::string::String>",
                "drop_in_place<alloc::string::String>",
            ),
            ("app::work::h0123456789abcdef", "work"),
        ];

        for (name, want) in tests {
            assert_eq!(funcname(name), want, "funcname({name:?})");
        }
    }

    #[test]
    fn shorten_is_pure() {
        let name = "<app::R as core::fmt::Display>::fmt";
        assert_eq!(funcname(name), funcname(name));
    }

    #[test]
    fn split_generic_path() {
        assert_eq!(
            split_path("a::b<c::d>::e"),
            vec!["a", "b<c::d>", "e"],
        );
        assert_eq!(split_path("a::f<fn() -> c::d>"), vec!["a", "f<fn() -> c::d>"]);
    }
}

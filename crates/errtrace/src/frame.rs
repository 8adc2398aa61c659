use std::fmt;

use errtrace_symbol::Symbol;

/// Kind of a formatting verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerbKind {
    /// Source file name.
    Short,

    /// Source file name and line.
    Default,

    /// Source line.
    Line,

    /// Shortened function name.
    Name,
}

/// Formatting verb applied by [Render].
///
/// The `plus` flag requests the verbose form (full function name and file
/// path), while `alternate` requests the literal (debug) form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Verb {
    /// Kind of the verb.
    pub kind: VerbKind,

    /// Whether the verbose form is requested.
    pub plus: bool,

    /// Whether the literal form is requested.
    pub alternate: bool,
}

impl Verb {
    /// Base file name.
    pub const SHORT: Self = Self::new(VerbKind::Short);

    /// Full function name and file path.
    pub const LONG: Self = Self::SHORT.plus();

    /// Line number.
    pub const LINE: Self = Self::new(VerbKind::Line);

    /// Shortened function name.
    pub const NAME: Self = Self::new(VerbKind::Name);

    /// Base file name and line number.
    pub const DEFAULT: Self = Self::new(VerbKind::Default);

    /// Full function name, file path and line number.
    pub const DEFAULT_LONG: Self = Self::DEFAULT.plus();

    /// Literal (debug) representation.
    pub const LITERAL: Self = Self::DEFAULT.alternate();

    /// Creates a verb of the given kind, without flags.
    pub const fn new(kind: VerbKind) -> Self {
        Self {
            kind,
            plus: false,
            alternate: false,
        }
    }

    /// Sets the `plus` flag.
    pub const fn plus(mut self) -> Self {
        self.plus = true;
        self
    }

    /// Sets the `alternate` flag.
    pub const fn alternate(mut self) -> Self {
        self.alternate = true;
        self
    }

    /// Creates a verb of the given kind, with the flags of a formatter
    /// (`{:+}` and `{:#}`).
    pub fn from_formatter(kind: VerbKind, f: &fmt::Formatter<'_>) -> Self {
        Self {
            kind,
            plus: f.sign_plus(),
            alternate: f.alternate(),
        }
    }
}

/// Trait for values formatted according to a [Verb].
pub trait Render {
    /// Formats the value according to the given verb.
    fn render(&self, f: &mut fmt::Formatter<'_>, verb: Verb) -> fmt::Result;

    /// Returns a [Display](fmt::Display) adapter applying the given verb.
    fn display(&self, verb: Verb) -> Rendered<'_, Self> {
        Rendered { value: self, verb }
    }
}

/// [Display](fmt::Display) adapter returned by [Render::display].
pub struct Rendered<'a, T: ?Sized> {
    value: &'a T,
    verb: Verb,
}

impl<T: Render + ?Sized> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.render(f, self.verb)
    }
}

/// Single entry of a captured call stack.
///
/// A frame is an opaque code address (the return address of a call).
/// Its symbol information is resolved every time it is requested, so that
/// capturing frames costs nothing more than walking the stack.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Frame(usize);

impl Frame {
    /// Creates a frame from a return address.
    ///
    /// The null address is valid, and resolves to an unknown location.
    pub const fn from_ip(ip: usize) -> Self {
        Self(ip)
    }

    /// Returns the return address of this frame.
    pub const fn ip(self) -> usize {
        self.0
    }

    /// Resolves the symbol information of this frame.
    pub fn symbol(self) -> Symbol {
        errtrace_symbol::resolve(self.0)
    }

    /// Returns the full function name, or an empty string.
    pub fn function(self) -> String {
        self.symbol().function().unwrap_or_default().to_owned()
    }

    /// Returns the shortened function name, or an empty string.
    pub fn name(self) -> String {
        self.symbol().short_name().into_owned()
    }

    /// Returns the full path of the source file, or `"unknown"`.
    pub fn file(self) -> String {
        self.symbol().file().to_owned()
    }

    /// Returns the source line, or 0.
    pub fn line(self) -> u32 {
        self.symbol().line()
    }
}

impl Render for Frame {
    fn render(&self, f: &mut fmt::Formatter<'_>, verb: Verb) -> fmt::Result {
        let symbol = self.symbol();

        match verb.kind {
            VerbKind::Short if verb.plus => write_long(f, &symbol),
            VerbKind::Short => f.write_str(symbol.file_name()),
            VerbKind::Line => write!(f, "{}", symbol.line()),
            VerbKind::Name => f.write_str(&symbol.short_name()),
            VerbKind::Default if verb.plus => {
                write_long(f, &symbol)?;
                write!(f, ":{}", symbol.line())
            }
            VerbKind::Default => write!(f, "{}:{}", symbol.file_name(), symbol.line()),
        }
    }
}

fn write_long(f: &mut fmt::Formatter<'_>, symbol: &Symbol) -> fmt::Result {
    match symbol.function() {
        Some(function) => write!(f, "{function}\n\t{}", symbol.file()),
        None => f.write_str("unknown"),
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::from_formatter(VerbKind::Default, f))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::{Frame, Render, Verb, VerbKind};

    #[test]
    fn verb_constants() {
        assert_eq!(Verb::LONG.kind, VerbKind::Short);
        assert!(Verb::LONG.plus);
        assert!(!Verb::LONG.alternate);

        assert_eq!(Verb::DEFAULT_LONG.kind, VerbKind::Default);
        assert!(Verb::DEFAULT_LONG.plus);

        assert_eq!(Verb::LITERAL.kind, VerbKind::Default);
        assert!(Verb::LITERAL.alternate);
        assert!(!Verb::LITERAL.plus);
    }

    #[test]
    fn verb_from_formatter_flags() {
        struct Flags;

        impl std::fmt::Display for Flags {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let verb = Verb::from_formatter(VerbKind::Line, f);
                write!(f, "{}{}", u8::from(verb.plus), u8::from(verb.alternate))
            }
        }

        assert_eq!(format!("{Flags}"), "00");
        assert_eq!(format!("{Flags:+}"), "10");
        assert_eq!(format!("{Flags:#}"), "01");
        assert_eq!(format!("{Flags:+#}"), "11");
    }

    #[test]
    fn null_frame() {
        let frame = Frame::from_ip(0);

        let tests = [
            (Verb::SHORT, "unknown"),
            (Verb::LONG, "unknown"),
            (Verb::LINE, "0"),
            (Verb::NAME, ""),
            (Verb::DEFAULT, "unknown:0"),
            (Verb::DEFAULT_LONG, "unknown:0"),
            (Verb::LITERAL, "unknown:0"),
        ];

        for (verb, want) in tests {
            assert_eq!(frame.display(verb).to_string(), want, "{verb:?}");
        }

        assert_eq!(format!("{frame}"), "unknown:0");
        assert_eq!(format!("{frame:+}"), "unknown:0");
        assert_eq!(format!("{frame:?}"), "unknown:0");

        assert_eq!(frame.function(), "");
        assert_eq!(frame.name(), "");
        assert_eq!(frame.file(), "unknown");
        assert_eq!(frame.line(), 0);
    }

    #[test]
    fn default_frame_is_null() {
        assert_eq!(Frame::default(), Frame::from_ip(0));
        assert_eq!(Frame::from_ip(0x1234).ip(), 0x1234);
    }
}

use std::borrow::Cow;
use std::path::Path;

/// File name reported for addresses without source information.
const UNKNOWN_FILE: &str = "unknown";

/// Symbol information of a code address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symbol {
    /// Demangled function name (without hash).
    function: Option<String>,

    /// Path of the source file.
    file: Option<String>,

    /// Line within the source file (0 if unknown).
    line: u32,
}

impl Symbol {
    /// Returns the sentinel symbol of an unresolved address.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Returns whether a function name was found for the address.
    pub fn is_resolved(&self) -> bool {
        self.function.is_some()
    }

    /// Returns the full function name, if any.
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Returns the function name without its module path.
    ///
    /// See [funcname](crate::funcname) for the shortening rules. An empty
    /// string is returned for unresolved addresses.
    pub fn short_name(&self) -> Cow<'_, str> {
        self.function
            .as_deref()
            .map_or(Cow::Borrowed(""), crate::funcname)
    }

    /// Returns the full path of the source file, or `"unknown"`.
    pub fn file(&self) -> &str {
        self.file.as_deref().unwrap_or(UNKNOWN_FILE)
    }

    /// Returns the base name of the source file, or `"unknown"`.
    pub fn file_name(&self) -> &str {
        self.file
            .as_deref()
            .and_then(|file| Path::new(file).file_name())
            .and_then(|name| name.to_str())
            .unwrap_or(UNKNOWN_FILE)
    }

    /// Returns the line within the source file, or 0.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Resolves the symbol information of the given return address.
///
/// The lookup targets `ip - 1`, so that the line reported for a return
/// address is the one of the call instruction.
///
/// This function never fails: the null address, and any address lacking
/// debug information, resolve to [Symbol::unknown].
pub fn resolve(ip: usize) -> Symbol {
    if ip == 0 {
        return Symbol::unknown();
    }

    let symbol = lookup(ip);

    if !symbol.is_resolved() {
        tracing::debug!(ip = format_args!("{ip:#x}"), "no symbol information");
    }

    symbol
}

/// Looks up a return address (`backtrace::resolve` targets `ip - 1`).
#[cfg(feature = "symbolize")]
fn lookup(ip: usize) -> Symbol {
    let mut symbol = None;

    // inlined frames are reported innermost first
    backtrace::resolve(ip as *mut std::ffi::c_void, |sym| {
        if symbol.is_some() {
            return;
        }

        symbol = Some(Symbol {
            function: sym.name().map(|name| format!("{name:#}")),
            file: sym.filename().map(|path| path.display().to_string()),
            line: sym.lineno().unwrap_or_default(),
        });
    });

    symbol.unwrap_or_default()
}

#[cfg(not(feature = "symbolize"))]
fn lookup(_ip: usize) -> Symbol {
    Symbol::unknown()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::{Symbol, resolve};

    #[inline(never)]
    fn target() -> u32 {
        line!()
    }

    #[test]
    fn null_address() {
        let symbol = resolve(0);

        assert_eq!(symbol, Symbol::unknown());
        assert!(!symbol.is_resolved());
        assert_eq!(symbol.function(), None);
        assert_eq!(symbol.short_name(), "");
        assert_eq!(symbol.file(), "unknown");
        assert_eq!(symbol.file_name(), "unknown");
        assert_eq!(symbol.line(), 0);
    }

    #[test]
    fn resolve_is_pure() {
        let addr = target as *const () as usize + 1;
        assert_eq!(resolve(addr), resolve(addr));
    }

    #[cfg(feature = "symbolize")]
    #[test]
    fn function_address() {
        let _ = target();

        let symbol = resolve(target as *const () as usize + 1);

        assert!(symbol.is_resolved());
        assert!(
            symbol
                .function()
                .is_some_and(|name| name.ends_with("resolve::tests::target")),
            "{symbol:?}"
        );
        assert_eq!(symbol.short_name(), "target");
        assert_eq!(symbol.file_name(), "resolve.rs");
        assert!(symbol.file().ends_with("resolve.rs"));
    }

    #[cfg(feature = "symbolize")]
    #[test]
    fn return_address_adjusted_once() {
        let entry = target as *const () as usize;

        // a return address equal to the entry point belongs to the code before it
        let before = resolve(entry);
        assert!(
            !before
                .function()
                .is_some_and(|name| name.ends_with("resolve::tests::target")),
            "{before:?}"
        );

        assert_eq!(resolve(entry + 1).short_name(), "target");
    }

    #[cfg(not(feature = "symbolize"))]
    #[test]
    fn function_address_without_symbolize() {
        assert_eq!(resolve(target as *const () as usize + 1), Symbol::unknown());
    }
}

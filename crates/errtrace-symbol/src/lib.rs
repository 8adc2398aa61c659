//! This crate provides helpers to resolve code addresses of the running
//! process into symbol information (function name, source file and line).
//!
//! Resolution is **total**: an address without debug information, or the
//! null address, resolves to a sentinel [Symbol] instead of an error.
//!
//! # Example
//!
//! ```no_run
//! #[inline(never)]
//! fn target() {}
//!
//! // `resolve` expects a return address (it looks up `ip - 1`)
//! let symbol = errtrace_symbol::resolve(target as *const () as usize + 1);
//!
//! println!("{} ({}:{})", symbol.short_name(), symbol.file_name(), symbol.line());
//! ```
//!
//! # Features
//!
//! - `symbolize` (enabled by default): perform the symbol lookup with the
//!   [backtrace](https://docs.rs/backtrace) crate. When disabled, every
//!   address resolves to the sentinel [Symbol].

mod name;
mod resolve;

pub use self::name::funcname;
pub use self::resolve::{Symbol, resolve};

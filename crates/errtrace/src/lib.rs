//! This crate allows to annotate errors with context (a message, a captured
//! call stack) while keeping the original error recoverable.
//!
//! Three components are provided:
//! - [Frame]/[StackTrace], a lightweight capture of the call stack. Frames
//!   are raw code addresses, resolved into function/file/line **only** when
//!   formatted.
//! - [Error], a chain of annotations around a single root cause, which can
//!   be recovered with [cause].
//! - [suspend_stack]/[resume_stack], to hide the stack trace of a chain and
//!   reinstate it later.
//!
//! # Annotating errors
//!
//! ```
//! use errtrace::ResultExt;
//!
//! fn read_config() -> errtrace::Result<String> {
//!     std::fs::read_to_string("/nonexistent/config.kdl").annotate("read config")
//! }
//!
//! let err = read_config().unwrap_err();
//!
//! // plain formatting only shows the outermost message
//! assert_eq!(err.to_string(), "read config");
//!
//! // the root cause is still there
//! let io_err = err.downcast_ref::<std::io::Error>().unwrap();
//! assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
//!
//! // `{:+}` renders every message, followed by the stack trace:
//! //
//! // No such file or directory (os error 2)
//! // read config
//! // <crate>::read_config
//! //     <path>/<file>.rs:<line>
//! // ...
//! println!("{err:+}");
//! ```
//!
//! # Formatting verbs
//!
//! [Frame], [StackTrace] and [Error] implement [Render], which formats a
//! value according to an explicit [Verb]. Their [Display](std::fmt::Display)
//! implementations use [VerbKind::Default], honoring the `+` (`{:+}`) and
//! `#` (`{:#}`) flags.

mod error;
mod ext;
mod frame;
mod macros;
mod stack;
mod suspend;

pub use self::error::{
    Chain, Error, Fundamental, Result, annotate, cause, new, new_no_stack_error, trace,
    with_message, with_stack,
};
pub use self::ext::ResultExt;
pub use self::frame::{Frame, Render, Rendered, Verb, VerbKind};
pub use self::stack::{StackTrace, capture_stack, capture_stack_depth};
pub use self::suspend::{StackState, resume_stack, suspend_stack};

#[doc(hidden)]
pub mod __private {
    use crate::error::Error;
    use crate::stack::callers;
    use crate::suspend::StackState;

    #[inline(never)]
    pub fn errorf(message: String) -> Error {
        Error::root(message, StackState::Active(callers(1, usize::MAX)))
    }

    #[inline(never)]
    pub fn annotatef(err: impl Into<Error>, message: String) -> Error {
        Error::wrap(
            err.into(),
            Some(message),
            Some(StackState::Active(callers(1, usize::MAX))),
        )
    }
}

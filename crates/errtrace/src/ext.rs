use crate::error::{Error, Result};
use crate::stack::callers;
use crate::suspend::{StackState, suspend_stack};

/// Extension trait annotating the error of a [Result].
///
/// Methods capturing the call stack record it at the caller of the method.
pub trait ResultExt<T> {
    /// See [with_message](crate::with_message).
    fn with_message(self, message: impl Into<String>) -> Result<T>;

    /// See [with_stack](crate::with_stack).
    fn with_stack(self) -> Result<T>;

    /// See [annotate](crate::annotate).
    fn annotate(self, message: impl Into<String>) -> Result<T>;

    /// Like [annotate](Self::annotate), with a message computed only on
    /// error.
    fn annotate_with<M, F>(self, message: F) -> Result<T>
    where
        M: Into<String>,
        F: FnOnce() -> M;

    /// See [trace](crate::trace).
    fn trace(self) -> Result<T>;

    /// See [suspend_stack](crate::suspend_stack).
    fn suspend_stack(self) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn with_message(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|err| Error::wrap(err.into(), Some(message.into()), None))
    }

    #[inline(never)]
    fn with_stack(self) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(err) => Err(Error::wrap(
                err.into(),
                None,
                Some(StackState::Active(callers(1, usize::MAX))),
            )),
        }
    }

    #[inline(never)]
    fn annotate(self, message: impl Into<String>) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(err) => Err(Error::wrap(
                err.into(),
                Some(message.into()),
                Some(StackState::Active(callers(1, usize::MAX))),
            )),
        }
    }

    #[inline(never)]
    fn annotate_with<M, F>(self, message: F) -> Result<T>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(v) => Ok(v),
            Err(err) => Err(Error::wrap(
                err.into(),
                Some(message().into()),
                Some(StackState::Active(callers(1, usize::MAX))),
            )),
        }
    }

    #[inline(never)]
    fn trace(self) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(err) => {
                let err: Error = err.into();
                if err.has_stack() {
                    return Err(err);
                }
                Err(err.wrap(None, Some(StackState::Active(callers(1, usize::MAX)))))
            }
        }
    }

    fn suspend_stack(self) -> Result<T> {
        self.map_err(suspend_stack)
    }
}

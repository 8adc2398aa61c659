use std::error::Error as StdError;
use std::{fmt, mem};

use crate::frame::{Render, Verb, VerbKind};
use crate::stack::{StackTrace, callers};
use crate::suspend::StackState;

/// Result type of this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Error annotated with messages and call stacks.
///
/// An `Error` is a chain of nodes: each annotation wraps the previous error
/// (its *underlying* error), down to a single root. The root is either a
/// [Fundamental] error created by this crate, or any foreign
/// [std::error::Error] converted with [From].
///
/// # Formatting
///
/// - `{}` renders the outermost message (or the root error if no message
///   was added).
/// - `{:+}` and `{:?}` render the root error and every message (root first,
///   one per line), followed by the nearest active stack trace.
pub struct Error {
    inner: Box<Node>,
}

pub(crate) enum Node {
    Root(Fundamental),
    Foreign(Box<dyn StdError + Send + Sync + 'static>),
    Wrapped(Wrapped),
}

pub(crate) struct Wrapped {
    pub(crate) cause: Error,
    pub(crate) message: Option<String>,
    pub(crate) stack: Option<StackState>,
}

/// Root error created by [new], [errorf!](crate::errorf) or
/// [new_no_stack_error].
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct Fundamental {
    message: String,
    stack: StackState,
}

impl Fundamental {
    /// Returns the message of this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stack state of this error.
    pub fn stack(&self) -> &StackState {
        &self.stack
    }

    /// Returns the stack trace captured with this error, if active.
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        self.stack.active()
    }

    pub(crate) fn stack_mut(&mut self) -> &mut StackState {
        &mut self.stack
    }
}

impl Error {
    pub(crate) fn root(message: String, stack: StackState) -> Self {
        Self {
            inner: Box::new(Node::Root(Fundamental { message, stack })),
        }
    }

    pub(crate) fn wrap(self, message: Option<String>, stack: Option<StackState>) -> Self {
        Self {
            inner: Box::new(Node::Wrapped(Wrapped {
                cause: self,
                message,
                stack,
            })),
        }
    }

    pub(crate) fn node_mut(&mut self) -> &mut Node {
        &mut self.inner
    }

    /// Creates an error from a boxed foreign error.
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Self {
            inner: Box::new(Node::Foreign(err)),
        }
    }

    /// Returns the error wrapped by this one, if any.
    pub fn underlying(&self) -> Option<&Error> {
        match *self.inner {
            Node::Wrapped(ref wrapped) => Some(&wrapped.cause),
            Node::Root(_) | Node::Foreign(_) => None,
        }
    }

    /// Returns an iterator over this error and its underlying errors,
    /// outermost first.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Returns the outermost message of the chain.
    ///
    /// `None` is returned when no message was added on top of a foreign
    /// root error.
    pub fn message(&self) -> Option<&str> {
        self.chain().find_map(|err| match *err.inner {
            Node::Root(ref root) => Some(root.message()),
            Node::Wrapped(ref wrapped) => wrapped.message.as_deref(),
            Node::Foreign(_) => None,
        })
    }

    /// Returns the stack state carried by this node (not by the chain).
    pub fn stack_state(&self) -> Option<&StackState> {
        match *self.inner {
            Node::Root(ref root) => Some(&root.stack),
            Node::Wrapped(ref wrapped) => wrapped.stack.as_ref(),
            Node::Foreign(_) => None,
        }
    }

    /// Returns whether any node of the chain carries a stack state
    /// (active, suspended or disabled).
    pub fn has_stack(&self) -> bool {
        self.chain().any(|err| err.stack_state().is_some())
    }

    /// Returns the nearest active stack trace of the chain.
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        self.chain()
            .find_map(|err| err.stack_state().and_then(StackState::active))
    }

    /// Returns a reference to the root error, if it is of type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        cause(self).downcast_ref::<E>()
    }

    fn write_messages(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .chain()
            .filter_map(|err| match *err.inner {
                Node::Wrapped(ref wrapped) => wrapped.message.as_deref(),
                Node::Root(_) | Node::Foreign(_) => None,
            })
            .collect::<Vec<_>>();

        write!(f, "{}", cause(self))?;

        for message in messages.iter().rev() {
            write!(f, "\n{message}")?;
        }

        Ok(())
    }
}

impl Node {
    /// Node left behind while unlinking a chain.
    fn vacant() -> Self {
        Self::Root(Fundamental {
            message: String::new(),
            stack: StackState::Disabled,
        })
    }
}

// chains are unlinked one node at a time, to not recurse on deep chains
impl Drop for Error {
    fn drop(&mut self) {
        let mut node = mem::replace(&mut *self.inner, Node::vacant());

        while let Node::Wrapped(wrapped) = node {
            let mut cause = wrapped.cause;
            node = mem::replace(&mut *cause.inner, Node::vacant());
        }
    }
}

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::from_boxed(Box::new(err))
    }
}

impl Render for Error {
    fn render(&self, f: &mut fmt::Formatter<'_>, verb: Verb) -> fmt::Result {
        if !verb.plus {
            return match self.message() {
                Some(message) => f.write_str(message),
                None => write!(f, "{}", cause(self)),
            };
        }

        self.write_messages(f)?;

        match self.stack_trace() {
            Some(stack) => stack.render(f, Verb::DEFAULT_LONG),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::from_formatter(VerbKind::Default, f))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::DEFAULT_LONG)
    }
}

/// Iterator over the nodes of an error chain (see [Error::chain]).
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.underlying();
        Some(cur)
    }
}

/// Standard error view of an [Error], to leave the crate through `?`.
struct Boxed(Error);

impl fmt::Display for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl StdError for Boxed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.underlying()?;
        Some(cause(&self.0))
    }
}

impl From<Error> for Box<dyn StdError + Send + Sync + 'static> {
    fn from(err: Error) -> Self {
        Box::new(Boxed(err))
    }
}

/// Creates an error with the given message, capturing the call stack.
#[inline(never)]
pub fn new(message: impl Into<String>) -> Error {
    Error::root(
        message.into(),
        StackState::Active(callers(1, usize::MAX)),
    )
}

/// Creates an error with the given message, which never carries a stack
/// trace.
///
/// [trace] leaves such an error untouched.
pub fn new_no_stack_error(message: impl Into<String>) -> Error {
    Error::root(message.into(), StackState::Disabled)
}

/// Annotates an error with a message, without capturing the call stack.
pub fn with_message(err: impl Into<Error>, message: impl Into<String>) -> Error {
    Error::wrap(err.into(), Some(message.into()), None)
}

/// Annotates an error with the current call stack.
#[inline(never)]
pub fn with_stack(err: impl Into<Error>) -> Error {
    Error::wrap(
        err.into(),
        None,
        Some(StackState::Active(callers(1, usize::MAX))),
    )
}

/// Annotates an error with a message and the current call stack.
#[inline(never)]
pub fn annotate(err: impl Into<Error>, message: impl Into<String>) -> Error {
    Error::wrap(
        err.into(),
        Some(message.into()),
        Some(StackState::Active(callers(1, usize::MAX))),
    )
}

/// Makes sure an error carries a stack state.
///
/// If no node of the chain has a stack state (active, suspended or
/// disabled), the current call stack is attached. Otherwise the error is
/// returned unchanged: a suspended stack stays suspended (see
/// [resume_stack](crate::resume_stack)).
#[inline(never)]
pub fn trace(err: impl Into<Error>) -> Error {
    let err: Error = err.into();

    if err.has_stack() {
        return err;
    }

    err.wrap(None, Some(StackState::Active(callers(1, usize::MAX))))
}

/// Returns the root cause of an error chain.
///
/// This is either the [Fundamental] error created by this crate, or the
/// foreign error the chain was built from.
pub fn cause(err: &Error) -> &(dyn StdError + Send + Sync + 'static) {
    let mut err = err;

    loop {
        match *err.inner {
            Node::Root(ref root) => return root,
            Node::Foreign(ref foreign) => return foreign.as_ref(),
            Node::Wrapped(ref wrapped) => err = &wrapped.cause,
        }
    }
}

use crate::error::{Error, Node};
use crate::stack::StackTrace;

/// Stack state of an error chain node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackState {
    /// The stack trace is rendered.
    Active(StackTrace),

    /// The stack trace is kept, but hidden until resumed.
    Suspended(StackTrace),

    /// The error is not worth tracing: no stack trace is ever captured.
    Disabled,
}

impl StackState {
    /// Returns the stack trace, if active.
    pub fn active(&self) -> Option<&StackTrace> {
        match self {
            Self::Active(stack) => Some(stack),
            Self::Suspended(_) | Self::Disabled => None,
        }
    }

    /// Returns whether the stack trace is suspended.
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended(_))
    }

    fn suspend(&mut self) {
        *self = match std::mem::replace(self, Self::Disabled) {
            Self::Active(stack) => Self::Suspended(stack),
            state => state,
        };
    }

    fn resume(&mut self) {
        *self = match std::mem::replace(self, Self::Disabled) {
            Self::Suspended(stack) => Self::Active(stack),
            state => state,
        };
    }
}

/// Applies `f` to every stack state of the chain.
///
/// Returns whether the chain carries any stack state.
fn for_each_stack(err: &mut Error, mut f: impl FnMut(&mut StackState)) -> bool {
    let mut found = false;
    let mut node = err.node_mut();

    loop {
        node = match node {
            Node::Root(root) => {
                f(root.stack_mut());
                return true;
            }
            Node::Foreign(_) => return found,
            Node::Wrapped(wrapped) => {
                if let Some(stack) = wrapped.stack.as_mut() {
                    f(stack);
                    found = true;
                }
                wrapped.cause.node_mut()
            }
        };
    }
}

/// Hides the stack traces of an error chain.
///
/// Every active stack trace of the chain becomes suspended: formatting
/// omits it, and [trace](crate::trace) does not capture a new one. Suspended
/// stack traces are reinstated by [resume_stack].
///
/// If the chain carries no stack state at all, it is marked as not worth
/// tracing.
pub fn suspend_stack(err: impl Into<Error>) -> Error {
    let mut err = err.into();

    if for_each_stack(&mut err, StackState::suspend) {
        tracing::trace!("suspended stack");
        return err;
    }

    err.wrap(None, Some(StackState::Disabled))
}

/// Reinstates the stack traces of an error chain suspended by
/// [suspend_stack].
///
/// Formatting then renders the nearest reinstated stack trace. Disabled
/// stacks stay disabled.
pub fn resume_stack(err: impl Into<Error>) -> Error {
    let mut err = err.into();

    if for_each_stack(&mut err, StackState::resume) {
        tracing::trace!("resumed stack");
    }

    err
}

#[cfg(test)]
mod tests {
    use std::io;

    use test_log::test;

    use super::{StackState, resume_stack, suspend_stack};
    use crate::error::{cause, new, new_no_stack_error, trace, with_message, with_stack};
    use crate::stack::StackTrace;

    fn eof() -> io::Error {
        io::Error::new(io::ErrorKind::UnexpectedEof, "EOF")
    }

    #[test]
    fn state_transitions() {
        let mut state = StackState::Active(StackTrace::empty());
        state.suspend();
        assert_eq!(state, StackState::Suspended(StackTrace::empty()));
        assert!(state.is_suspended());
        assert!(state.active().is_none());

        state.suspend();
        assert_eq!(state, StackState::Suspended(StackTrace::empty()));

        state.resume();
        assert_eq!(state, StackState::Active(StackTrace::empty()));

        let mut state = StackState::Disabled;
        state.suspend();
        state.resume();
        assert_eq!(state, StackState::Disabled);
    }

    #[test]
    fn no_stack_error() {
        let err = new_no_stack_error("test error");
        let err = trace(err);
        let err = trace(err);

        assert_eq!(format!("{err:+}"), "test error");
        assert_eq!(err.chain().count(), 1);

        let err = resume_stack(err);
        assert_eq!(format!("{err:+}"), "test error");
    }

    #[test]
    fn suspend_foreign_error() {
        let err = suspend_stack(eof());
        let err = trace(err);

        assert_eq!(format!("{err:+}"), "EOF");
        assert_eq!(err.stack_state(), Some(&StackState::Disabled));

        let root = cause(&err).downcast_ref::<io::Error>().unwrap();
        assert_eq!(root.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn suspend_traced_with_message() {
        let err = trace(eof());
        let err = with_stack(err);
        let err = with_message(err, "1");
        let err = suspend_stack(err);
        let err = trace(err);

        assert_eq!(format!("{err:+}"), "EOF\n1");
        assert_eq!(err.chain().count(), 4);
        assert!(err.stack_trace().is_none());

        let err = resume_stack(err);
        assert!(format!("{err:+}").starts_with("EOF\n1\n"));
        assert!(err.stack_trace().is_some());
    }

    #[test]
    fn resume_picks_nearest() {
        let err = new("root");
        let root_stack = err.stack_trace().cloned();

        let err = with_stack(err);
        let outer_stack = err.stack_trace().cloned();

        let err = resume_stack(suspend_stack(err));
        assert_eq!(err.stack_trace().cloned(), outer_stack);
        assert_ne!(err.stack_trace().cloned(), root_stack);
    }

    #[test]
    fn stack_after_suspend() {
        let err = suspend_stack(new("root"));
        assert!(err.stack_trace().is_none());

        // a later explicit capture is rendered
        let err = with_stack(err);
        assert!(err.stack_trace().is_some());
        assert!(format!("{err:+}").starts_with("root\n"));
    }
}

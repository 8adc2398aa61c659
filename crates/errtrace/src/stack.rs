use std::fmt::{self, Write};
use std::hint;
use std::ops::Deref;

use crate::frame::{Frame, Render, Verb, VerbKind};

/// Call stack captured at some point of the execution.
///
/// Frames are ordered from the innermost call (the function which captured
/// the stack) to the outermost one.
///
/// A *nil* trace (see [StackTrace::nil]) and an *empty* trace (see
/// [StackTrace::empty]) both hold no frame. They only differ in their
/// literal representation.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct StackTrace {
    frames: Option<Box<[Frame]>>,
}

impl StackTrace {
    /// Returns the nil trace.
    pub const fn nil() -> Self {
        Self { frames: None }
    }

    /// Returns an empty (but non-nil) trace.
    pub fn empty() -> Self {
        Self {
            frames: Some(Box::default()),
        }
    }

    /// Returns whether this trace is nil.
    pub fn is_nil(&self) -> bool {
        self.frames.is_none()
    }

    /// Returns the frames of this trace.
    pub fn frames(&self) -> &[Frame] {
        self.frames.as_deref().unwrap_or_default()
    }

    /// Returns a trace made of the first `len` frames of this one.
    ///
    /// Truncating a nil trace returns a nil trace.
    pub fn truncated(&self, len: usize) -> Self {
        match self.frames {
            Some(ref frames) => Self {
                frames: Some(frames.iter().take(len).copied().collect()),
            },
            None => Self::nil(),
        }
    }
}

impl Deref for StackTrace {
    type Target = [Frame];

    fn deref(&self) -> &Self::Target {
        self.frames()
    }
}

impl From<Vec<Frame>> for StackTrace {
    fn from(frames: Vec<Frame>) -> Self {
        Self {
            frames: Some(frames.into_boxed_slice()),
        }
    }
}

impl FromIterator<Frame> for StackTrace {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: Some(iter.into_iter().collect()),
        }
    }
}

impl Render for StackTrace {
    fn render(&self, f: &mut fmt::Formatter<'_>, verb: Verb) -> fmt::Result {
        let frames = self.frames();

        match verb.kind {
            VerbKind::Short | VerbKind::Default if verb.plus => {
                for frame in frames {
                    f.write_char('\n')?;
                    frame.render(f, verb)?;
                }
                Ok(())
            }
            VerbKind::Default if verb.alternate => {
                if self.is_nil() {
                    return f.write_str("StackTrace(nil)");
                }

                f.write_str("StackTrace{")?;
                for (i, frame) in frames.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    frame.render(f, Verb::DEFAULT)?;
                }
                f.write_char('}')
            }
            _ => {
                f.write_char('[')?;
                for (i, frame) in frames.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    frame.render(f, verb)?;
                }
                f.write_char(']')
            }
        }
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::from_formatter(VerbKind::Default, f))
    }
}

impl fmt::Debug for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, Verb::LITERAL)
    }
}

/// Captures the current call stack.
///
/// `skip` is the number of frames to omit: with 0, the first frame is the
/// function calling `capture_stack`.
#[inline(never)]
pub fn capture_stack(skip: usize) -> StackTrace {
    let stack = callers(skip + 1, usize::MAX);
    // not a tail call: `skip + 1` counts this frame
    hint::black_box(&stack);
    stack
}

/// Captures at most `max_depth` frames of the current call stack.
///
/// See [capture_stack] for the meaning of `skip`.
#[inline(never)]
pub fn capture_stack_depth(skip: usize, max_depth: usize) -> StackTrace {
    let stack = callers(skip + 1, max_depth);
    hint::black_box(&stack);
    stack
}

/// Frames walked before giving up on finding the stack walker's own frame.
const MAX_WALKER_FRAMES: usize = 32;

/// Initial frame capacity of a capture.
const CAPTURE_CAPACITY: usize = 64;

/// Walks the call stack, starting with the caller of this function.
///
/// Frames belonging to the stack walker (below this function) are dropped
/// once this function's own frame is found. If it is never found, an empty
/// trace is returned.
#[inline(never)]
pub(crate) fn callers(skip: usize, max_depth: usize) -> StackTrace {
    let mut walk = Walk::new(callers as *const () as usize, skip, max_depth);

    backtrace::trace(|frame| walk.visit(frame.symbol_address() as usize, frame.ip() as usize));

    let stack = walk.finish();
    tracing::trace!(depth = stack.len(), skip, "captured stack");

    stack
}

/// State of a stack walk, fed with the frames reported by the unwinder.
struct Walk {
    marker: usize,
    to_skip: usize,
    max_depth: usize,
    walked: usize,
    found_marker: bool,
    frames: Vec<Frame>,
}

impl Walk {
    fn new(marker: usize, skip: usize, max_depth: usize) -> Self {
        Self {
            marker,
            to_skip: skip,
            max_depth,
            walked: 0,
            found_marker: false,
            frames: Vec::with_capacity(max_depth.min(CAPTURE_CAPACITY)),
        }
    }

    /// Records a frame, and returns whether the walk should go on.
    fn visit(&mut self, symbol_address: usize, ip: usize) -> bool {
        if !self.found_marker {
            self.walked += 1;
            self.found_marker = symbol_address == self.marker;
            return self.found_marker || self.walked < MAX_WALKER_FRAMES;
        }

        if self.to_skip > 0 {
            self.to_skip -= 1;
            return true;
        }

        if self.frames.len() >= self.max_depth {
            return false;
        }

        self.frames.push(Frame::from_ip(ip));
        self.frames.len() < self.max_depth
    }

    fn finish(self) -> StackTrace {
        if !self.found_marker {
            tracing::debug!(walked = self.walked, "stack walker frame not found");
            return StackTrace::empty();
        }

        StackTrace::from(self.frames)
    }
}

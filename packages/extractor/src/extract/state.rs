//! Element-nesting stack of the extractor.

use crate::error::StructuralError;

/// What the extractor was doing when an element opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Text goes to the innermost open section.
    Accumulating,
    /// Inside a skipped subtree; all text is dropped.
    Skipping,
    /// Inside the identifier element; text goes to the id buffer.
    CapturingId,
    /// A structural error occurred; waiting for the next record.
    Recovering,
}

/// Effect an open element has when it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRole {
    Transparent,
    /// Root of a skipped subtree, or any element inside one.
    Skipped,
    DocId,
    Split,
    SplitTag,
    /// Owns the innermost buffer of the text accumulator.
    Section,
    /// Token to append on close, if any.
    Markup(Option<String>),
}

/// One open element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub mode: Mode,
    pub role: FrameRole,
}

/// Nesting stack and record-level mode flags.
#[derive(Debug, Clone, Default)]
pub struct ExtractionState {
    stack: Vec<Frame>,
    skip_depth: usize,
    capturing_id: bool,
    id_buffer: String,
    recovering: bool,
}

impl ExtractionState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode for the next event.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.recovering {
            Mode::Recovering
        } else if self.skip_depth > 0 {
            Mode::Skipping
        } else if self.capturing_id {
            Mode::CapturingId
        } else {
            Mode::Accumulating
        }
    }

    /// Push an open element.
    pub fn push(&mut self, name: String, role: FrameRole) {
        let mode = self.mode();
        if role == FrameRole::Skipped {
            self.skip_depth += 1;
        }
        if role == FrameRole::DocId {
            self.capturing_id = true;
            self.id_buffer.clear();
        }
        self.stack.push(Frame { name, mode, role });
    }

    /// Pop the innermost frame if it matches `name`.
    ///
    /// On mismatch the stack is left untouched.
    pub fn pop(&mut self, name: &str) -> Result<Frame, StructuralError> {
        match self.stack.last() {
            Some(top) if top.name == name => self.pop_frame().ok_or_else(|| unmatched(name)),
            Some(top) => Err(StructuralError::MismatchedClose {
                name: name.to_string(),
                expected: top.name.clone(),
            }),
            None => Err(unmatched(name)),
        }
    }

    /// Pop frames down to and including the innermost `name`.
    ///
    /// A close for an element that is not open at all pops nothing.
    pub fn unwind_to(&mut self, name: &str) {
        if let Some(index) = self.stack.iter().rposition(|f| f.name == name) {
            while self.stack.len() > index {
                self.pop_frame();
            }
        }
    }

    fn pop_frame(&mut self) -> Option<Frame> {
        let frame = self.stack.pop()?;
        match frame.role {
            FrameRole::Skipped => self.skip_depth = self.skip_depth.saturating_sub(1),
            FrameRole::DocId => self.capturing_id = false,
            _ => {}
        }
        Some(frame)
    }

    /// Append identifier text.
    pub fn push_id_text(&mut self, text: &str) {
        self.id_buffer.push_str(text);
    }

    /// Take the captured identifier text.
    pub fn take_id(&mut self) -> String {
        std::mem::take(&mut self.id_buffer)
    }

    /// Forget record-level roles of the frames still open.
    ///
    /// Used when a record ends or is discarded while enclosing elements stay
    /// open: their sections, markup and id capture belong to the old record.
    /// Skipped subtrees stay skipped.
    pub fn detach_record(&mut self) {
        for frame in &mut self.stack {
            if frame.role != FrameRole::Skipped {
                frame.role = FrameRole::Transparent;
            }
        }
        self.capturing_id = false;
        self.id_buffer.clear();
    }

    pub fn set_recovering(&mut self, recovering: bool) {
        self.recovering = recovering;
    }

    #[must_use]
    pub fn is_recovering(&self) -> bool {
        self.recovering
    }

    /// Nesting depth of skipped subtrees.
    #[must_use]
    pub fn skip_depth(&self) -> usize {
        self.skip_depth
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Names of the open elements, outermost first.
    #[must_use]
    pub fn open_elements(&self) -> Vec<String> {
        self.stack.iter().map(|f| f.name.clone()).collect()
    }

    /// Innermost open element.
    #[must_use]
    pub fn top(&self) -> Option<&Frame> {
        self.stack.last()
    }
}

fn unmatched(name: &str) -> StructuralError {
    StructuralError::UnmatchedClose {
        name: name.to_string(),
    }
}

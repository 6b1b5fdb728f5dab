//! Selection of the part of a document that takes part in the merge.
//!
//! A document can mark the region to carry forward with an *initial* line
//! (where the region starts, inclusive) and a *terminal* line (where it
//! stops, exclusive). Both are matched by exact text against whole lines.

use thiserror::Error;

/// The lines delimiting the merged region of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boundaries {
    /// First line of the region. `None` means the start of the document.
    pub initial: Option<String>,
    /// Line that ends the region. `None` means the end of the document.
    pub terminal: Option<String>,
}

/// Errors that can occur when locating the merged region.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    /// A configured boundary line does not occur in the document.
    #[error("{document} does not contain the boundary line {boundary:?}")]
    BoundaryNotFound {
        /// A name for the document, used in diagnostics.
        document: String,
        /// The missing boundary line.
        boundary: String,
    },

    /// The terminal boundary does not come after the initial boundary.
    #[error("in {document}, the initial line {initial:?} must precede the terminal line {terminal:?}")]
    BoundaryOrder {
        /// A name for the document, used in diagnostics.
        document: String,
        /// The initial boundary line.
        initial: String,
        /// The terminal boundary line.
        terminal: String,
    },
}

/// A document split around its merged region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Lines before the region, passed through untouched.
    pub before: Vec<String>,
    /// The region itself.
    pub body: Vec<String>,
    /// Lines from the terminal boundary onward, passed through untouched.
    pub after: Vec<String>,
}

/// Splits `lines` around the region delimited by `boundaries`.
///
/// `document` names the document in error messages.
///
/// # Errors
///
/// Returns [`ScopeError::BoundaryNotFound`] if a configured boundary is
/// missing and [`ScopeError::BoundaryOrder`] if the terminal boundary occurs
/// first.
pub fn slice(
    lines: &[String],
    boundaries: &Boundaries,
    document: &str,
) -> Result<Scope, ScopeError> {
    let find = |boundary: &Option<String>, default: usize| match boundary {
        None => Ok(default),
        Some(boundary) => lines
            .iter()
            .position(|line| line == boundary)
            .ok_or_else(|| ScopeError::BoundaryNotFound {
                document: document.to_string(),
                boundary: boundary.clone(),
            }),
    };

    let start = find(&boundaries.initial, 0)?;
    let end = find(&boundaries.terminal, lines.len())?;

    if let (Some(initial), Some(terminal)) = (&boundaries.initial, &boundaries.terminal) {
        if end <= start {
            return Err(ScopeError::BoundaryOrder {
                document: document.to_string(),
                initial: initial.clone(),
                terminal: terminal.clone(),
            });
        }
    }

    Ok(Scope {
        before: lines[..start].to_vec(),
        body: lines[start..end].to_vec(),
        after: lines[end..].to_vec(),
    })
}

impl Scope {
    /// Reassembles the document with `body` in place of the original region.
    #[must_use]
    pub fn reassemble(self, body: Vec<String>) -> Vec<String> {
        let mut lines = self.before;
        lines.extend(body);
        lines.extend(self.after);
        lines
    }
}

// ABOUTME: DOM query interface consumed by the extraction engine: DomSession and ElementHandle traits.
// ABOUTME: Includes ContextHandle for browsing contexts and ContextGuard for symmetric context restore.

//! The DOM query interface.
//!
//! The engine never talks to a browser directly; it consumes these traits and
//! leaves the implementation to an external WebDriver adapter (or a scripted
//! fake in tests). `find` with zero matches returns an empty vector, never an
//! error.
//!
//! The one process-wide mutable resource is the currently active browsing
//! context. Any code that switches it must go through [`ContextGuard`], which
//! restores the prior context on every exit path, including faults.

use std::fmt;

use serde_json::Value;

/// A fault raised by the DOM query interface.
///
/// Strategies catch these and convert them into failure results; they never
/// escalate past a single strategy run.
#[derive(Debug, thiserror::Error)]
#[error("dom {op}: {message}")]
pub struct DomError {
    pub op: String,
    pub message: String,
}

impl DomError {
    pub fn new(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Opaque handle to an independent browsing context (page/tab) within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub String);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handle to a single element in the live document.
///
/// Handles may go stale between reads: the underlying collection is owned by
/// the page and periodically replaced. Callers that need to survive that use
/// the robust re-query path in the strategies rather than caching handles.
pub trait ElementHandle: Sized {
    /// The rendered text content of the element.
    fn text(&self) -> Result<String, DomError>;

    /// An attribute value, or `None` if the attribute is absent.
    fn attribute(&self, name: &str) -> Result<Option<String>, DomError>;

    /// Find descendants matching a selector, scoped to this element's subtree.
    /// Zero matches is `Ok(vec![])`, never an error.
    fn find(&self, selector: &str) -> Result<Vec<Self>, DomError>;

    /// The parent element, or `None` at the document root.
    fn parent(&self) -> Result<Option<Self>, DomError>;
}

/// A single automation session against one live page.
///
/// All suspension is blocking I/O with fixed per-operation timeouts owned by
/// the implementation; the engine assumes a single caller thread per session.
pub trait DomSession {
    type Element: ElementHandle;

    /// Find elements matching a selector, in document order.
    /// Zero matches is `Ok(vec![])`, never an error.
    fn find(&self, selector: &str) -> Result<Vec<Self::Element>, DomError>;

    /// Execute a script in the page, optionally bound to an element, returning
    /// its structured result.
    fn execute_script(
        &self,
        code: &str,
        element: Option<&Self::Element>,
        args: &[Value],
    ) -> Result<Value, DomError>;

    /// Simulate a user click on an element.
    fn simulate_click(&self, element: &Self::Element) -> Result<(), DomError>;

    /// The URL of the currently active browsing context.
    fn current_location(&self) -> Result<String, DomError>;

    /// All open browsing contexts, the original first.
    fn browsing_contexts(&self) -> Result<Vec<ContextHandle>, DomError>;

    /// Make the given context the active one.
    fn switch_context(&self, handle: &ContextHandle) -> Result<(), DomError>;

    /// Close the given context.
    fn close_context(&self, handle: &ContextHandle) -> Result<(), DomError>;
}

/// Scoped guard for the active browsing context.
///
/// Switches to `target` on entry and switches back to `original` when dropped,
/// so the restore runs on every exit path, including panics and early `?`
/// returns. Restore failures are ignored; there is nothing useful to do with
/// them mid-unwind.
pub struct ContextGuard<'a, D: DomSession> {
    dom: &'a D,
    original: ContextHandle,
}

impl<'a, D: DomSession> ContextGuard<'a, D> {
    /// Switch the session into `target`, remembering `original` for restore.
    pub fn enter(
        dom: &'a D,
        original: ContextHandle,
        target: &ContextHandle,
    ) -> Result<Self, DomError> {
        dom.switch_context(target)?;
        Ok(Self { dom, original })
    }
}

impl<D: DomSession> Drop for ContextGuard<'_, D> {
    fn drop(&mut self) {
        let _ = self.dom.switch_context(&self.original);
    }
}

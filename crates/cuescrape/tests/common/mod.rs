// ABOUTME: Scripted in-memory DomSession used by the integration tests.
// ABOUTME: Records every session call so tests can assert on call order and counts.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use cuescrape::dom::{ContextHandle, DomError, DomSession, ElementHandle};

/// One recorded session-level call. Element-scoped reads are not recorded;
/// tests assert on the session traffic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    InspectScript,
    SuppressScript,
    Click(usize),
    Location,
    Contexts,
    Switch(String),
    Close(String),
}

#[derive(Debug, Default)]
struct Node {
    labels: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    children: Vec<usize>,
    parent: Option<usize>,
}

struct Inner {
    nodes: Vec<Node>,
    calls: Vec<Call>,
    contexts: Vec<ContextHandle>,
    current: ContextHandle,
    locations: HashMap<String, String>,
    click_opens: HashMap<usize, (String, String)>,
    inspect_response: Value,
    fail_location_in: Option<String>,
    fail_finds: bool,
    shrink_selector: Option<String>,
    finds_served: HashMap<String, usize>,
    playback_suppressed: bool,
}

/// Builds the static node tree for one fake page.
#[derive(Default)]
pub struct PageBuilder {
    nodes: Vec<Node>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node answering to the given selector labels.
    pub fn node(&mut self, labels: &[&str], text: &str) -> usize {
        self.push(labels, text, None)
    }

    /// Add a child node under `parent`.
    pub fn child(&mut self, parent: usize, labels: &[&str], text: &str) -> usize {
        let id = self.push(labels, text, Some(parent));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn attr(&mut self, id: usize, name: &str, value: &str) {
        self.nodes[id]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    pub fn build(self) -> FakeDom {
        let main = ContextHandle("main".to_string());
        let mut locations = HashMap::new();
        locations.insert("main".to_string(), "https://queue.example/requests".to_string());
        FakeDom {
            inner: Rc::new(RefCell::new(Inner {
                nodes: self.nodes,
                calls: Vec::new(),
                contexts: vec![main.clone()],
                current: main,
                locations,
                click_opens: HashMap::new(),
                inspect_response: Value::Null,
                fail_location_in: None,
                fail_finds: false,
                shrink_selector: None,
                finds_served: HashMap::new(),
                playback_suppressed: false,
            })),
        }
    }

    fn push(&mut self, labels: &[&str], text: &str, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            text: text.to_string(),
            attrs: HashMap::new(),
            children: Vec::new(),
            parent,
        });
        id
    }
}

/// A scripted page session. Cloning shares the underlying state, so a test
/// can keep a handle for assertions while the engine drives the clone.
#[derive(Clone)]
pub struct FakeDom {
    inner: Rc<RefCell<Inner>>,
}

/// A node matches a selector when any comma-separated part of the selector
/// is one of the node's labels.
fn matches(node: &Node, selector: &str) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .any(|part| node.labels.iter().any(|label| label == part))
}

fn descendants(nodes: &[Node], id: usize, out: &mut Vec<usize>) {
    for &child in &nodes[id].children {
        out.push(child);
        descendants(nodes, child, out);
    }
}

impl FakeDom {
    pub fn element(&self, id: usize) -> FakeElement {
        FakeElement {
            inner: Rc::clone(&self.inner),
            id,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn click_count(&self) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Click(_)))
            .count()
    }

    pub fn find_count(&self, selector: &str) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Find(s) if s == selector))
            .count()
    }

    pub fn current_context(&self) -> ContextHandle {
        self.inner.borrow().current.clone()
    }

    pub fn playback_suppressed(&self) -> bool {
        self.inner.borrow().playback_suppressed
    }

    /// Clicking the given node opens a new context at the given location.
    pub fn click_opens(&self, id: usize, context: &str, location: &str) {
        let mut inner = self.inner.borrow_mut();
        inner
            .click_opens
            .insert(id, (context.to_string(), location.to_string()));
    }

    /// Value returned by element-bound script execution.
    pub fn inspect_response(&self, value: Value) {
        self.inner.borrow_mut().inspect_response = value;
    }

    /// Reading the location while the given context is active faults.
    pub fn fail_location_in(&self, context: &str) {
        self.inner.borrow_mut().fail_location_in = Some(context.to_string());
    }

    /// Every session-level find faults.
    pub fn fail_finds(&self) {
        self.inner.borrow_mut().fail_finds = true;
    }

    /// After the first find of `selector`, later finds of it drop the last
    /// match, simulating a collection replaced and shrunk by the page.
    pub fn shrink_after_first_find(&self, selector: &str) {
        self.inner.borrow_mut().shrink_selector = Some(selector.to_string());
    }

    fn record(&self, call: Call) {
        self.inner.borrow_mut().calls.push(call);
    }
}

pub struct FakeElement {
    inner: Rc<RefCell<Inner>>,
    id: usize,
}

impl ElementHandle for FakeElement {
    fn text(&self) -> Result<String, DomError> {
        Ok(self.inner.borrow().nodes[self.id].text.clone())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.inner.borrow().nodes[self.id].attrs.get(name).cloned())
    }

    fn find(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        let inner = self.inner.borrow();
        let mut ids = Vec::new();
        descendants(&inner.nodes, self.id, &mut ids);
        Ok(ids
            .into_iter()
            .filter(|&id| matches(&inner.nodes[id], selector))
            .map(|id| FakeElement {
                inner: Rc::clone(&self.inner),
                id,
            })
            .collect())
    }

    fn parent(&self) -> Result<Option<Self>, DomError> {
        Ok(self.inner.borrow().nodes[self.id].parent.map(|id| FakeElement {
            inner: Rc::clone(&self.inner),
            id,
        }))
    }
}

impl DomSession for FakeDom {
    type Element = FakeElement;

    fn find(&self, selector: &str) -> Result<Vec<Self::Element>, DomError> {
        self.record(Call::Find(selector.to_string()));
        let mut inner = self.inner.borrow_mut();
        if inner.fail_finds {
            return Err(DomError::new("find", "session lost"));
        }

        let shrink_active = inner.shrink_selector.as_deref() == Some(selector);
        let served = inner.finds_served.entry(selector.to_string()).or_insert(0);
        let drop_last = shrink_active && *served > 0;
        *served += 1;

        let mut ids: Vec<usize> = (0..inner.nodes.len())
            .filter(|&id| matches(&inner.nodes[id], selector))
            .collect();
        if drop_last {
            ids.pop();
        }

        Ok(ids
            .into_iter()
            .map(|id| FakeElement {
                inner: Rc::clone(&self.inner),
                id,
            })
            .collect())
    }

    fn execute_script(
        &self,
        _code: &str,
        element: Option<&Self::Element>,
        _args: &[Value],
    ) -> Result<Value, DomError> {
        if element.is_some() {
            self.record(Call::InspectScript);
            Ok(self.inner.borrow().inspect_response.clone())
        } else {
            self.record(Call::SuppressScript);
            self.inner.borrow_mut().playback_suppressed = true;
            Ok(Value::Null)
        }
    }

    fn simulate_click(&self, element: &Self::Element) -> Result<(), DomError> {
        self.record(Call::Click(element.id));
        let mut inner = self.inner.borrow_mut();
        if let Some((context, location)) = inner.click_opens.get(&element.id).cloned() {
            inner.contexts.push(ContextHandle(context.clone()));
            inner.locations.insert(context, location);
        }
        Ok(())
    }

    fn current_location(&self) -> Result<String, DomError> {
        self.record(Call::Location);
        let inner = self.inner.borrow();
        if inner.fail_location_in.as_deref() == Some(inner.current.0.as_str()) {
            return Err(DomError::new("current_location", "page hung"));
        }
        Ok(inner
            .locations
            .get(&inner.current.0)
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    fn browsing_contexts(&self) -> Result<Vec<ContextHandle>, DomError> {
        self.record(Call::Contexts);
        Ok(self.inner.borrow().contexts.clone())
    }

    fn switch_context(&self, handle: &ContextHandle) -> Result<(), DomError> {
        self.record(Call::Switch(handle.0.clone()));
        let mut inner = self.inner.borrow_mut();
        if !inner.contexts.contains(handle) {
            return Err(DomError::new("switch_context", "no such context"));
        }
        inner.current = handle.clone();
        Ok(())
    }

    fn close_context(&self, handle: &ContextHandle) -> Result<(), DomError> {
        self.record(Call::Close(handle.0.clone()));
        self.inner.borrow_mut().contexts.retain(|c| c != handle);
        Ok(())
    }
}

/// A queue page with two populated rows, each carrying a nested title,
/// labels and a link control with a direct video URL.
pub fn two_row_queue() -> (FakeDom, [usize; 2]) {
    let mut page = PageBuilder::new();

    let row1 = page.node(&["tr"], "Bohemian Rhapsody\n05:55\nBy alice");
    page.child(row1, &[".queue-item-title"], "Bohemian Rhapsody");
    page.child(row1, &[".queue-item-label"], "05:55");
    page.child(row1, &[".queue-item-label"], "By alice");
    page.child(row1, &[".queue-item-label"], "Playing now");
    let control1 = page.child(row1, &["button.item-link"], "");
    page.attr(control1, "data-url", "https://www.youtube.com/watch?v=fJ9rUzIMcZQ");

    let row2 = page.node(&["tr"], "Karma Police\n04:24\nBy bob");
    page.child(row2, &[".queue-item-title"], "Karma Police");
    page.child(row2, &[".queue-item-label"], "04:24");
    page.child(row2, &[".queue-item-label"], "By bob");
    let control2 = page.child(row2, &["button.item-link"], "");
    page.attr(control2, "data-url", "https://www.youtube.com/watch?v=1uYWYWPc9HU");

    (page.build(), [row1, row2])
}

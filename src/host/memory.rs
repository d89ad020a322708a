//! In-memory document host.
//!
//! An arena-backed document tree that implements every host trait. Tree edits
//! queue mutation records for the registered mutation root, ratio changes
//! queue intersection entries for observed elements, and both queues are
//! drained by whoever plays the event loop (tests, the replay harness).

use super::{
    Capabilities, Document, EventTarget, Host, InteractionKind, IntersectionEntry,
    IntersectionFacility, MutationFacility, MutationObserverInit, MutationRecord,
};
use crate::model::{ComputedStyle, Display, InvalidTag, NodeId, NodeKind, Tag};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::trace;

/// Declarative description of a subtree.
///
/// JSON forms: `{"text": "..."}`, `{"comment": "..."}`, or an element
/// `{"tag": "p", "id": "a", "style": {"display": "none"}, "children": [...]}`.
/// Every form rejects keys it does not know, including an object that mixes
/// `text` with element keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// A text node.
    Text(TextSpec),
    /// A comment node.
    Comment(CommentSpec),
    /// An element with its subtree.
    Element(ElementSpec),
}

impl NodeSpec {
    /// A text node with `text` as its data.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextSpec { text: text.into() })
    }

    /// A comment node with `comment` as its data.
    pub fn comment(comment: impl Into<String>) -> Self {
        Self::Comment(CommentSpec {
            comment: comment.into(),
        })
    }
}

/// `{"text": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextSpec {
    /// Character data of the node.
    pub text: String,
}

/// `{"comment": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentSpec {
    /// Character data of the node.
    pub comment: String,
}

/// Builder and JSON form of an element subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    /// Tag name, any case.
    pub tag: String,
    /// DOM id for [`MemoryHost::lookup`]. Unique per document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Computed style; defaults to a static block.
    #[serde(default)]
    pub style: ComputedStyle,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl ElementSpec {
    /// An element with no id, default style and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            style: ComputedStyle::default(),
            children: Vec::new(),
        }
    }

    /// Set the DOM id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the computed style.
    pub fn style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Shorthand for appending a text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(NodeSpec::text(text))
    }
}

impl From<ElementSpec> for NodeSpec {
    fn from(element: ElementSpec) -> Self {
        NodeSpec::Element(element)
    }
}

/// Failures building or editing a [`MemoryHost`] document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryHostError {
    /// The handle was never allocated by this host.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Children can only be appended to elements.
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// The node is already detached, or is the body itself.
    #[error("Node {0} has no parent to be removed from")]
    Detached(NodeId),

    /// Two elements claim the same DOM id.
    #[error("Duplicate element id: {0:?}")]
    DuplicateId(String),

    /// An element spec carries an unusable tag.
    #[error("Invalid tag: {0}")]
    InvalidTag(#[from] InvalidTag),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: Option<Tag>,
    dom_id: Option<String>,
    style: ComputedStyle,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn element(tag: Tag, dom_id: Option<String>, style: ComputedStyle) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: Some(tag),
            dom_id,
            style,
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn leaf(kind: NodeKind, text: &str) -> Self {
        Self {
            kind,
            tag: None,
            dom_id: None,
            style: ComputedStyle::default(),
            text: text.to_string(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-backed document implementing every host trait.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<NodeData>,
    body: Option<NodeId>,
    ids: HashMap<String, NodeId>,
    observed: HashSet<NodeId>,
    duplicate_observes: usize,
    mutation_root: Option<(NodeId, MutationObserverInit)>,
    listening: Vec<InteractionKind>,
    pending_mutations: Vec<MutationRecord>,
    pending_intersections: Vec<IntersectionEntry>,
    capabilities: Capabilities,
}

impl MemoryHost {
    /// Build a document whose `<body>` holds `body_children`.
    pub fn new(body_children: impl IntoIterator<Item = NodeSpec>) -> Result<Self, MemoryHostError> {
        let mut host = Self::default();
        let body = host.alloc(NodeData::element(
            Tag::new("body")?,
            None,
            ComputedStyle::default(),
        ));
        host.body = Some(body);
        for spec in body_children {
            let child = host.build(&spec)?;
            host.attach(body, child);
        }
        Ok(host)
    }

    /// A document with no body at all.
    pub fn without_body() -> Self {
        Self::default()
    }

    /// Pretend to lack some facilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Resolve an element by its `id` attribute. Removed subtrees are forgotten.
    pub fn lookup(&self, dom_id: &str) -> Option<NodeId> {
        self.ids.get(dom_id).copied()
    }

    /// Build `spec` and append it to `parent`, queueing a child-list record.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        spec: &NodeSpec,
    ) -> Result<NodeId, MemoryHostError> {
        let parent_data = self
            .data(parent)
            .ok_or(MemoryHostError::UnknownNode(parent))?;
        if parent_data.kind != NodeKind::Element {
            return Err(MemoryHostError::NotAnElement(parent));
        }

        let child = self.build(spec)?;
        self.attach(parent, child);
        self.queue_child_list(parent, vec![child], Vec::new());
        Ok(child)
    }

    /// Detach `node` from its parent, queueing a child-list record.
    pub fn remove(&mut self, node: NodeId) -> Result<(), MemoryHostError> {
        let parent = self
            .data(node)
            .ok_or(MemoryHostError::UnknownNode(node))?
            .parent
            .ok_or(MemoryHostError::Detached(node))?;

        if let Some(parent_data) = self.data_mut(parent) {
            parent_data.children.retain(|child| *child != node);
        }
        if let Some(data) = self.data_mut(node) {
            data.parent = None;
        }
        self.forget_ids(node);
        self.queue_child_list(parent, Vec::new(), vec![node]);
        Ok(())
    }

    /// Report a new intersection ratio for `node`.
    ///
    /// Only observed elements produce an entry; returns whether one was queued.
    pub fn set_ratio(&mut self, node: NodeId, ratio: f64) -> bool {
        if !self.observed.contains(&node) {
            trace!(%node, ratio, "ratio change on unobserved node dropped");
            return false;
        }
        self.pending_intersections
            .push(IntersectionEntry::new(node, ratio));
        true
    }

    /// Drain queued mutation records.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending_mutations)
    }

    /// Drain queued intersection entries.
    pub fn take_intersections(&mut self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut self.pending_intersections)
    }

    /// Whether `node` is currently observed for intersection.
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    /// Number of observed elements.
    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// How many times an already-observed element was observed again.
    pub fn duplicate_observes(&self) -> usize {
        self.duplicate_observes
    }

    /// Root and options of the mutation registration, if any.
    pub fn mutation_registration(&self) -> Option<(NodeId, MutationObserverInit)> {
        self.mutation_root
    }

    /// Whether events of `kind` are delivered.
    pub fn is_listening(&self, kind: InteractionKind) -> bool {
        self.listening.contains(&kind)
    }

    /// Listened event kinds in registration order.
    pub fn listening(&self) -> &[InteractionKind] {
        &self.listening
    }

    /// Whether `node` is currently attached below the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        match self.body {
            Some(body) => node == body || self.is_descendant_of(node, body),
            None => false,
        }
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        usize::try_from(node.get())
            .ok()
            .and_then(|index| self.nodes.get(index))
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        usize::try_from(node.get())
            .ok()
            .and_then(|index| self.nodes.get_mut(index))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(data);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(data) = self.data_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.data_mut(parent) {
            data.children.push(child);
        }
    }

    fn build(&mut self, spec: &NodeSpec) -> Result<NodeId, MemoryHostError> {
        match spec {
            NodeSpec::Text(leaf) => Ok(self.alloc(NodeData::leaf(NodeKind::Text, &leaf.text))),
            NodeSpec::Comment(leaf) => {
                Ok(self.alloc(NodeData::leaf(NodeKind::Comment, &leaf.comment)))
            }
            NodeSpec::Element(element) => {
                let tag = Tag::new(&element.tag)?;
                if let Some(dom_id) = &element.id {
                    if self.ids.contains_key(dom_id) {
                        return Err(MemoryHostError::DuplicateId(dom_id.clone()));
                    }
                }

                let id = self.alloc(NodeData::element(tag, element.id.clone(), element.style));
                if let Some(dom_id) = &element.id {
                    self.ids.insert(dom_id.clone(), id);
                }
                for child_spec in &element.children {
                    let child = self.build(child_spec)?;
                    self.attach(id, child);
                }
                Ok(id)
            }
        }
    }

    fn forget_ids(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let Some(data) = self.data(node) else {
                continue;
            };
            stack.extend(data.children.iter().copied());
            if let Some(dom_id) = data.dom_id.clone() {
                self.ids.remove(&dom_id);
            }
        }
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.data(node).and_then(|data| data.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.data(parent).and_then(|data| data.parent);
        }
        false
    }

    fn queue_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let Some((root, init)) = self.mutation_root else {
            return;
        };
        if !init.child_list {
            return;
        }
        let covered = target == root || (init.subtree && self.is_descendant_of(target, root));
        if covered {
            self.pending_mutations
                .push(MutationRecord::child_list(target, added, removed));
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.data(node) else {
            return;
        };
        match data.kind {
            NodeKind::Text => out.push_str(&data.text),
            NodeKind::Comment => {}
            NodeKind::Element => {
                if data.style.is_hidden() {
                    return;
                }
                let block = !matches!(
                    data.style.display,
                    Display::Inline | Display::InlineBlock | Display::Contents
                );
                if block {
                    out.push(' ');
                }
                for child in &data.children {
                    self.collect_text(*child, out);
                }
                if block {
                    out.push(' ');
                }
            }
        }
    }
}

impl Document for MemoryHost {
    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.data(node).map(|data| data.kind)
    }

    fn tag(&self, node: NodeId) -> Option<&Tag> {
        self.data(node).and_then(|data| data.tag.as_ref())
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.data(node).map(|data| data.style).unwrap_or_default()
    }

    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(data) = self.data(node) else {
            return Vec::new();
        };
        data.children
            .iter()
            .copied()
            .filter(|child| self.kind(*child) == Some(NodeKind::Element))
            .collect()
    }

    fn has_text_child(&self, node: NodeId) -> bool {
        self.data(node).is_some_and(|data| {
            data.children
                .iter()
                .any(|child| self.kind(*child) == Some(NodeKind::Text))
        })
    }

    fn rendered_text(&self, node: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(node, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl IntersectionFacility for MemoryHost {
    fn observe_intersection(&mut self, target: NodeId) {
        if !self.observed.insert(target) {
            self.duplicate_observes += 1;
        }
    }

    fn unobserve_intersection(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }
}

impl MutationFacility for MemoryHost {
    fn observe_mutations(&mut self, root: NodeId, init: MutationObserverInit) {
        self.mutation_root = Some((root, init));
    }
}

impl EventTarget for MemoryHost {
    fn listen(&mut self, kind: InteractionKind) {
        if !self.listening.contains(&kind) {
            self.listening.push(kind);
        }
    }
}

impl Host for MemoryHost {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

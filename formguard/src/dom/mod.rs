//! In-process document model.
//!
//! [`Document`] plays the part of the host UI runtime: it owns a tree of
//! elements with attributes, classes, text and control values, keeps a
//! registry of event listeners, and serializes access to all of it behind a
//! single lock. Listeners always run after the lock has been released, so a
//! handler may freely read and mutate the document it was dispatched from.

mod event;
mod node;

pub use event::{DispatchOutcome, Event, EventKind, Listener, ListenerId};
pub use node::{Element, NodeId};

use std::sync::{Arc, PoisonError, RwLock};

use event::Registration;
use node::Node;

/// Tags treated as form fields.
pub const FIELD_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// Storage for one node. `generation` is bumped when the node is removed.
#[derive(Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

struct DocumentInner {
    slots: Vec<Slot>,
    /// Vacated slot indices, reused by `insert`.
    free: Vec<usize>,
    body: NodeId,
    listeners: Vec<Registration>,
    next_listener: u64,
}

impl DocumentInner {
    fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new("body")),
            }],
            free: Vec::new(),
            body: NodeId::new(0, 0),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(self.slots.len() - 1, 0)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    fn mount(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let Element {
            tag,
            attributes,
            classes,
            text,
            value,
            disabled,
            children,
        } = element;

        let id = self.insert(Node {
            tag,
            attributes,
            classes,
            text,
            default_value: value.clone(),
            value,
            disabled,
            parent,
            children: Vec::new(),
        });

        for child in children {
            let child_id = self.mount(Some(id), child);
            if let Some(node) = self.node_mut(id) {
                node.children.push(child_id);
            }
        }

        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).and_then(|node| node.parent) {
            if let Some(parent) = self.node_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(root)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether `child` may be placed under `parent`.
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        child != self.body
            && self.node(parent).is_some()
            && self.node(child).is_some()
            && !self.is_ancestor_or_self(child, parent)
    }
}

/// Shared handle to a document. Clones refer to the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl Document {
    /// Create an empty document containing only `body`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(DocumentInner::new())),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&DocumentInner) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut DocumentInner) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn with_node<R: Default>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> R {
        self.read(|inner| inner.node(id).map(f).unwrap_or_default())
    }

    fn with_node_mut(&self, id: NodeId, f: impl FnOnce(&mut Node)) -> bool {
        self.write(|inner| inner.node_mut(id).map(f).is_some())
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    pub fn body(&self) -> NodeId {
        self.read(|inner| inner.body)
    }

    /// Build `element` and its children and append the result to `parent`.
    ///
    /// If `parent` does not exist the new subtree stays detached.
    pub fn mount(&self, parent: NodeId, element: Element) -> NodeId {
        self.write(|inner| {
            let id = inner.mount(None, element);
            if inner.can_adopt(parent, id) {
                if let Some(node) = inner.node_mut(id) {
                    node.parent = Some(parent);
                }
                if let Some(parent) = inner.node_mut(parent) {
                    parent.children.push(id);
                }
            }
            id
        })
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        let tag = tag.into();
        self.write(|inner| inner.insert(Node::new(tag)))
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.write(|inner| {
            if !inner.can_adopt(parent, child) {
                return false;
            }
            inner.detach(child);
            if let Some(node) = inner.node_mut(child) {
                node.parent = Some(parent);
            }
            if let Some(parent) = inner.node_mut(parent) {
                parent.children.push(child);
            }
            true
        })
    }

    /// Move `node` so it directly follows `reference` under the same parent.
    ///
    /// Fails when `reference` has no parent.
    pub fn insert_after(&self, reference: NodeId, node: NodeId) -> bool {
        self.write(|inner| {
            let Some(parent) = inner.node(reference).and_then(|n| n.parent) else {
                return false;
            };
            if node == reference || !inner.can_adopt(parent, node) {
                return false;
            }
            inner.detach(node);
            let Some(parent_node) = inner.node_mut(parent) else {
                return false;
            };
            let position = parent_node
                .children
                .iter()
                .position(|child| *child == reference)
                .map_or(parent_node.children.len(), |pos| pos + 1);
            parent_node.children.insert(position, node);
            if let Some(node) = inner.node_mut(node) {
                node.parent = Some(parent);
            }
            true
        })
    }

    /// Remove `node` and its subtree, along with listeners targeting them.
    pub fn remove(&self, node: NodeId) -> bool {
        self.write(|inner| {
            if node == inner.body || inner.node(node).is_none() {
                return false;
            }
            inner.detach(node);
            let mut removed = inner.descendants(node);
            removed.push(node);
            for id in &removed {
                inner.release(*id);
            }
            inner
                .listeners
                .retain(|registration| !removed.contains(&registration.target));
            true
        })
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.read(|inner| inner.node(node).is_some())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.with_node(node, |n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.with_node(node, |n| n.children.clone())
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.read(|inner| {
            let parent = inner.node(node)?.parent?;
            let siblings = &inner.node(parent)?.children;
            let position = siblings.iter().position(|child| *child == node)?;
            siblings.get(position + 1).copied()
        })
    }

    /// Descendants of `root` in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.read(|inner| inner.descendants(root))
    }

    /// Find an attached element by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.read(|inner| {
            inner.descendants(inner.body).into_iter().find(|node| {
                inner
                    .node(*node)
                    .and_then(|n| n.attributes.get("id"))
                    .is_some_and(|value| value == id)
            })
        })
    }

    // -------------------------------------------------------------------------
    // Element state
    // -------------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |n| Some(n.tag.clone()))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attributes.get(name).cloned())
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.with_node(node, |n| n.attributes.contains_key(name))
    }

    pub fn set_attribute(&self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.with_node_mut(node, |n| {
            n.attributes.insert(name, value);
        });
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        self.with_node_mut(node, |n| {
            n.attributes.remove(name);
        });
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.with_node(node, |n| n.classes.clone())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        self.with_node_mut(node, |n| n.classes.retain(|c| c != class));
    }

    pub fn text(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.text.clone())
    }

    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        let text = text.into();
        self.with_node_mut(node, |n| n.text = text);
    }

    pub fn value(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.value.clone())
    }

    /// Set a control's value without dispatching any event.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        let value = value.into();
        self.with_node_mut(node, |n| n.value = value);
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.with_node(node, |n| n.disabled)
    }

    pub fn set_disabled(&self, node: NodeId, disabled: bool) {
        self.with_node_mut(node, |n| n.disabled = disabled);
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// Every attached `form`, in document order.
    pub fn forms(&self) -> Vec<NodeId> {
        self.read(|inner| {
            inner
                .descendants(inner.body)
                .into_iter()
                .filter(|id| inner.node(*id).is_some_and(|n| n.tag == "form"))
                .collect()
        })
    }

    /// Every `input`, `textarea` and `select` inside `form`, in document order.
    pub fn form_fields(&self, form: NodeId) -> Vec<NodeId> {
        self.read(|inner| {
            inner
                .descendants(form)
                .into_iter()
                .filter(|id| {
                    inner
                        .node(*id)
                        .is_some_and(|n| FIELD_TAGS.contains(&n.tag.as_str()))
                })
                .collect()
        })
    }

    /// The first `button[type=submit]` inside `form`.
    pub fn submit_button(&self, form: NodeId) -> Option<NodeId> {
        self.read(|inner| {
            inner.descendants(form).into_iter().find(|id| {
                inner.node(*id).is_some_and(|n| {
                    n.tag == "button" && n.attributes.get("type").is_some_and(|t| t == "submit")
                })
            })
        })
    }

    /// Restore every field of `form` to its default value.
    pub fn reset_form(&self, form: NodeId) {
        let fields = self.form_fields(form);
        self.write(|inner| {
            for field in fields {
                if let Some(node) = inner.node_mut(field) {
                    node.value = node.default_value.clone();
                }
            }
        });
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Register `listener` for `kind` events targeted at `target`.
    pub fn add_listener<F>(&self, target: NodeId, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.write(|inner| {
            let id = ListenerId(inner.next_listener);
            inner.next_listener += 1;
            inner.listeners.push(Registration {
                id,
                target,
                kind,
                listener: Arc::new(listener),
            });
            id
        })
    }

    /// Unregister a listener. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.write(|inner| {
            let before = inner.listeners.len();
            inner.listeners.retain(|registration| registration.id != id);
            inner.listeners.len() != before
        })
    }

    pub fn listener_count(&self) -> usize {
        self.read(|inner| inner.listeners.len())
    }

    /// Number of elements alive in the document, attached or not.
    pub fn node_count(&self) -> usize {
        self.read(|inner| inner.live_nodes())
    }

    /// Run every listener registered for `kind` on `target`.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> DispatchOutcome {
        let listeners: Vec<Listener> = self.read(|inner| {
            inner
                .listeners
                .iter()
                .filter(|r| r.target == target && r.kind == kind)
                .map(|r| Arc::clone(&r.listener))
                .collect()
        });

        let event = Event::new(kind, target);
        for listener in &listeners {
            listener(&event);
        }

        DispatchOutcome {
            default_prevented: event.default_prevented(),
            listeners_run: listeners.len(),
        }
    }

    /// Replace a control's value the way a user edit would, then dispatch
    /// [`EventKind::Input`].
    pub fn type_into(&self, field: NodeId, value: impl Into<String>) -> DispatchOutcome {
        self.set_value(field, value);
        self.dispatch(field, EventKind::Input)
    }

    pub fn blur(&self, field: NodeId) -> DispatchOutcome {
        self.dispatch(field, EventKind::Blur)
    }

    pub fn submit(&self, form: NodeId) -> DispatchOutcome {
        self.dispatch(form, EventKind::Submit)
    }

    pub fn click(&self, node: NodeId) -> DispatchOutcome {
        self.dispatch(node, EventKind::Click)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|inner| {
            f.debug_struct("Document")
                .field("nodes", &inner.live_nodes())
                .field("listeners", &inner.listeners.len())
                .finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let document = Document::new();
        let form = document.mount(
            document.body(),
            Element::form()
                .id("contact")
                .child(
                    Element::div()
                        .child(Element::input("text").name("name").value("anon"))
                        .child(Element::input("email").name("email")),
                )
                .child(Element::textarea().name("message"))
                .child(Element::button("Cancel"))
                .child(Element::submit("Send")),
        );
        (document, form)
    }

    #[test]
    fn test_form_fields_in_document_order() {
        let (document, form) = sample();
        let fields = document.form_fields(form);
        let names: Vec<_> = fields
            .iter()
            .filter_map(|f| document.attribute(*f, "name"))
            .collect();
        assert_eq!(names, vec!["name", "email", "message"]);
    }

    #[test]
    fn test_submit_button_skips_plain_buttons() {
        let (document, form) = sample();
        let button = document.submit_button(form).expect("submit button");
        assert_eq!(document.text(button), "Send");
    }

    #[test]
    fn test_insert_after_places_node_next_to_reference() {
        let (document, form) = sample();
        let name = document.form_fields(form)[0];
        let note = document.create_element("div");

        assert!(document.insert_after(name, note));
        assert_eq!(document.next_sibling(name), Some(note));
        assert_eq!(document.parent(note), document.parent(name));
    }

    #[test]
    fn test_insert_after_requires_parent() {
        let document = Document::new();
        let detached = document.create_element("input");
        let note = document.create_element("div");
        assert!(!document.insert_after(detached, note));
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let (document, form) = sample();
        let wrapper = document.children(form)[0];
        assert!(!document.append_child(wrapper, form));
        assert!(!document.append_child(form, form));
    }

    #[test]
    fn test_remove_drops_subtree_and_listeners() {
        let (document, form) = sample();
        let field = document.form_fields(form)[0];
        document.add_listener(field, EventKind::Blur, |_| {});
        assert_eq!(document.listener_count(), 1);

        assert!(document.remove(form));
        assert!(!document.contains(field));
        assert_eq!(document.listener_count(), 0);
        assert!(document.forms().is_empty());
        assert!(!document.remove(document.body()));
    }

    #[test]
    fn test_reset_restores_default_values() {
        let (document, form) = sample();
        let fields = document.form_fields(form);
        document.set_value(fields[0], "changed");
        document.set_value(fields[1], "a@b.c");

        document.reset_form(form);
        assert_eq!(document.value(fields[0]), "anon");
        assert_eq!(document.value(fields[1]), "");
    }

    #[test]
    fn test_element_by_id_ignores_detached_nodes() {
        let (document, form) = sample();
        assert_eq!(document.element_by_id("contact"), Some(form));

        let detached = document.create_element("div");
        document.set_attribute(detached, "id", "ghost");
        assert_eq!(document.element_by_id("ghost"), None);
    }

    #[test]
    fn test_listeners_can_mutate_document() {
        let (document, form) = sample();
        let field = document.form_fields(form)[0];
        let handle = document.clone();
        document.add_listener(field, EventKind::Input, move |event| {
            handle.add_class(event.target(), "touched");
        });

        let outcome = document.type_into(field, "x");
        assert_eq!(outcome.listeners_run, 1);
        assert!(!outcome.default_prevented);
        assert!(document.has_class(field, "touched"));
        assert_eq!(document.value(field), "x");
    }

    #[test]
    fn test_prevent_default_is_reported() {
        let (document, form) = sample();
        let id = document.add_listener(form, EventKind::Submit, |event| event.prevent_default());
        assert!(document.submit(form).default_prevented);

        assert!(document.remove_listener(id));
        assert!(!document.remove_listener(id));
        assert!(!document.submit(form).default_prevented);
    }

    #[test]
    fn test_removed_slots_are_reused() {
        let (document, form) = sample();
        let field = document.form_fields(form)[0];
        let before = document.node_count();
        let slots = document.read(|inner| inner.slots.len());

        for _ in 0..1000 {
            let note = document.create_element("div");
            assert!(document.insert_after(field, note));
            assert!(document.remove(note));
        }

        assert_eq!(document.node_count(), before);
        assert_eq!(document.read(|inner| inner.slots.len()), slots + 1);
    }

    #[test]
    fn test_stale_handle_ignores_reused_slot() {
        let document = Document::new();
        let old = document.create_element("div");
        document.set_text(old, "old");
        assert!(document.remove(old));

        let new = document.create_element("span");
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert_ne!(new.key(), old.key());

        document.set_text(old, "stale write");
        assert!(!document.contains(old));
        assert!(!document.remove(old));
        assert_eq!(document.tag(new).as_deref(), Some("span"));
        assert_eq!(document.text(new), "");
        assert!(document.contains(new));
    }
}

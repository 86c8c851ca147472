use std::collections::BTreeMap;

/// Handle to an element stored in a [`Document`](super::Document).
///
/// Handles stay valid until the element is removed; operations on a removed
/// handle are no-ops, even after its slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index. Reused once the element is removed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bumped every time the slot is vacated.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Identifier unique across slot reuse, suitable for attribute values.
    pub fn key(&self) -> String {
        format!("{}:{}", self.index, self.generation)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Stored element state.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: String,
    /// Current value of a form control.
    pub value: String,
    /// Value restored by a form reset.
    pub default_value: String,
    pub disabled: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// Declarative element description, mounted with [`Document::mount`].
///
/// # Example
///
/// ```
/// use formguard::dom::{Document, Element};
///
/// let document = Document::new();
/// let form = document.mount(
///     document.body(),
///     Element::form()
///         .child(Element::input("email").name("email").required())
///         .child(Element::submit("Send")),
/// );
/// assert_eq!(document.form_fields(form).len(), 1);
/// ```
///
/// [`Document::mount`]: super::Document::mount
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) classes: Vec<String>,
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) disabled: bool,
    pub(crate) children: Vec<Element>,
}

impl Element {
    /// Create an element with an arbitrary tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn form() -> Self {
        Self::new("form")
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    /// An `input` with the given `type` attribute.
    pub fn input(input_type: impl Into<String>) -> Self {
        Self::new("input").attr("type", input_type)
    }

    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    pub fn select() -> Self {
        Self::new("select")
    }

    /// A plain `button type="button"`.
    pub fn button(label: impl Into<String>) -> Self {
        Self::new("button").attr("type", "button").text(label)
    }

    /// A `button type="submit"`.
    pub fn submit(label: impl Into<String>) -> Self {
        Self::new("button").attr("type", "submit").text(label)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.attr("name", name)
    }

    /// Mark the element with the boolean `required` attribute.
    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Initial value; also becomes the value restored on form reset.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }
}

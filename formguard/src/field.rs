//! Form field snapshots.

use serde::{Deserialize, Serialize};

use crate::dom::{Document, FIELD_TAGS, NodeId};

/// The `type` of a field, as far as validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text, also used for controls without a `type` attribute.
    #[default]
    Text,
    Email,
    Tel,
    /// Any other input type (`password`, `number`, `checkbox`, ...).
    Other,
}

impl FieldType {
    /// Interpret a `type` attribute value.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("text") => Self::Text,
            Some("email") => Self::Email,
            Some("tel") => Self::Tel,
            Some(_) => Self::Other,
        }
    }

    /// The attribute value that produces this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Other => "other",
        }
    }
}

/// Point-in-time view of a field's validation-relevant state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub node: NodeId,
    pub name: Option<String>,
    pub field_type: FieldType,
    pub required: bool,
    pub value: String,
    pub disabled: bool,
}

impl Field {
    /// Read a field from the document. Returns `None` for removed nodes and
    /// elements that are not form controls.
    pub fn read(document: &Document, node: NodeId) -> Option<Self> {
        let tag = document.tag(node)?;
        if !FIELD_TAGS.contains(&tag.as_str()) {
            return None;
        }

        // Only inputs carry a meaningful `type`.
        let field_type = if tag == "input" {
            FieldType::from_attribute(document.attribute(node, "type").as_deref())
        } else {
            FieldType::Text
        };

        Some(Self {
            node,
            name: document.attribute(node, "name"),
            field_type,
            required: document.has_attribute(node, "required"),
            value: document.value(node),
            disabled: document.is_disabled(node),
        })
    }
}

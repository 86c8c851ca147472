//! JSON form descriptions.
//!
//! ```json
//! {
//!   "submit_label": "Sign up",
//!   "fields": [
//!     { "name": "email", "type": "email", "required": true },
//!     { "name": "bio", "type": "textarea" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use formguard::dom::{Document, Element, NodeId};
use serde::Deserialize;

use crate::DemoError;

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// An input type, or `textarea` / `select` for those elements.
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: String,
}

fn default_type() -> String {
    "text".to_string()
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormSpec {
    pub fields: Vec<FieldSpec>,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
}

impl FormSpec {
    pub fn load(path: &Path) -> Result<Self, DemoError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Name, email, phone and message.
    pub fn contact() -> Self {
        let field = |name: &str, kind: &str, required| FieldSpec {
            name: name.to_string(),
            kind: kind.to_string(),
            required,
            value: String::new(),
        };
        Self {
            fields: vec![
                field("name", "text", true),
                field("email", "email", true),
                field("phone", "tel", false),
                field("message", "textarea", true),
            ],
            submit_label: "Send message".to_string(),
        }
    }

    /// Mount the form under `body`, one wrapper `div` per field.
    pub fn mount(&self, document: &Document) -> NodeId {
        let fields = self.fields.iter().map(|spec| {
            let element = match spec.kind.as_str() {
                "textarea" => Element::textarea(),
                "select" => Element::select(),
                kind => Element::input(kind),
            };
            let element = element.name(&spec.name).value(&spec.value);
            let element = if spec.required {
                element.required()
            } else {
                element
            };
            Element::div().class("mb-3").child(element)
        });

        document.mount(
            document.body(),
            Element::form()
                .children(fields)
                .child(Element::submit(&self.submit_label)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_json_form() {
        let spec: FormSpec = serde_json::from_str(
            r#"{
                "fields": [
                    { "name": "email", "type": "email", "required": true },
                    { "name": "bio", "type": "textarea", "value": "hi" },
                    { "name": "plan", "type": "select" },
                    { "name": "nick" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.submit_label, "Submit");

        let document = Document::new();
        let form = spec.mount(&document);
        let fields = document.form_fields(form);
        assert_eq!(fields.len(), 4);

        assert_eq!(document.tag(fields[0]).as_deref(), Some("input"));
        assert_eq!(document.attribute(fields[0], "type").as_deref(), Some("email"));
        assert!(document.has_attribute(fields[0], "required"));

        assert_eq!(document.tag(fields[1]).as_deref(), Some("textarea"));
        assert_eq!(document.value(fields[1]), "hi");
        assert!(!document.has_attribute(fields[1], "required"));

        assert_eq!(document.tag(fields[2]).as_deref(), Some("select"));
        assert_eq!(document.attribute(fields[3], "type").as_deref(), Some("text"));

        let button = document.submit_button(form).unwrap();
        assert_eq!(document.text(button), "Submit");
        assert_eq!(document.parent(fields[0]).map(|p| document.parent(p)), Some(Some(form)));
    }

    #[test]
    fn test_contact_form_shape() {
        let document = Document::new();
        let form = FormSpec::contact().mount(&document);
        let names: Vec<_> = document
            .form_fields(form)
            .into_iter()
            .filter_map(|field| document.attribute(field, "name"))
            .collect();
        assert_eq!(names, ["name", "email", "phone", "message"]);
    }
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formguard::dom::{Document, Element, NodeId};
use formguard::toast::{Toast, ToastHost, ToastKind};
use formguard::{FieldValidator, ValidatorConfig};
use tokio_util::sync::CancellationToken;

/// Toast host that records every toast and keeps it up until dismissed.
#[derive(Clone, Default)]
pub struct RecordingHost {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl RecordingHost {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToastHost for RecordingHost {
    async fn present(
        &self,
        _document: &Document,
        _element: NodeId,
        toast: &Toast,
        dismissed: CancellationToken,
    ) {
        self.toasts.lock().unwrap().push(toast.clone());
        dismissed.cancelled().await;
    }
}

pub struct ContactForm {
    pub form: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub phone: NodeId,
    pub message: NodeId,
    pub submit: NodeId,
}

impl ContactForm {
    pub fn mount(document: &Document) -> Self {
        let form = document.mount(
            document.body(),
            Element::form()
                .id("contact")
                .child(group(Element::input("text").name("name").required()))
                .child(group(Element::input("email").name("email").required()))
                .child(group(Element::input("tel").name("phone")))
                .child(group(Element::textarea().name("message").required()))
                .child(Element::submit("Send message")),
        );

        let fields = document.form_fields(form);
        Self {
            form,
            name: fields[0],
            email: fields[1],
            phone: fields[2],
            message: fields[3],
            submit: document.submit_button(form).unwrap(),
        }
    }

    pub fn fields(&self) -> [NodeId; 4] {
        [self.name, self.email, self.phone, self.message]
    }

    pub fn fill_valid(&self, document: &Document) {
        document.set_value(self.name, "Ada Lovelace");
        document.set_value(self.email, "ada@example.com");
        document.set_value(self.phone, "+44 (20) 7946-0958");
        document.set_value(self.message, "Hello there");
    }

    pub fn values(&self, document: &Document) -> Vec<String> {
        self.fields().iter().map(|f| document.value(*f)).collect()
    }
}

fn group(field: Element) -> Element {
    Element::div().class("mb-3").child(field)
}

pub fn validator(document: &Document, form: NodeId, host: &RecordingHost) -> FieldValidator {
    FieldValidator::builder(document)
        .forms([form])
        .config(ValidatorConfig::default())
        .toast_host(host.clone())
        .build()
        .unwrap()
}

/// Inline error nodes currently shown next to `field`.
pub fn error_nodes(document: &Document, field: NodeId) -> Vec<NodeId> {
    let parent = document.parent(field).unwrap();
    document
        .children(parent)
        .into_iter()
        .filter(|node| document.has_class(*node, "invalid-feedback"))
        .filter(|node| {
            document.attribute(*node, "data-error-for") == Some(field.key())
        })
        .collect()
}

/// Toast elements of `kind` currently in the document.
pub fn toast_count(document: &Document, kind: ToastKind) -> usize {
    document
        .descendants(document.body())
        .into_iter()
        .filter(|node| document.has_class(*node, "toast") && document.has_class(*node, kind.class()))
        .count()
}

/// Let spawned tasks run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

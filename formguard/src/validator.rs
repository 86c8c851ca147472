//! The form validator.
//!
//! A [`FieldValidator`] wires a set of forms to validation and submission
//! handling:
//!
//! - blur on a field validates it and shows or clears its inline error
//! - input on a field clears its inline error
//! - submit validates every field, then either reports an error toast or
//!   marks the submit button as sent, logs the payload and, after a delay,
//!   resets the form and reports a success toast
//!
//! # Example
//!
//! ```
//! use formguard::dom::{Document, Element};
//! use formguard::{FieldValidator, ValidatorConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> formguard::Result<()> {
//! let document = Document::new();
//! let form = document.mount(
//!     document.body(),
//!     Element::form()
//!         .child(Element::input("email").name("email").required())
//!         .child(Element::submit("Send")),
//! );
//!
//! let validator = FieldValidator::initialize(&document, [form], ValidatorConfig::default())?;
//! let email = document.form_fields(form)[0];
//!
//! document.type_into(email, "a@b");
//! document.blur(email);
//! assert_eq!(
//!     validator.field_error(email).as_deref(),
//!     Some("Enter a valid email address")
//! );
//!
//! validator.dispose();
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::config::ValidatorConfig;
use crate::dom::{Document, Event, EventKind, ListenerId, NodeId};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::schedule::ScheduledTask;
use crate::submit::{FormPayload, SubmitOutcome};
use crate::toast::{AnimatedToastHost, ToastHandle, ToastHost, ToastKind, Toaster};
use crate::validation::{FieldFailure, RuleSet, ValidationError, ValidationResult};

/// Attribute linking an inline error node to its field.
const ERROR_FOR_ATTR: &str = "data-error-for";

struct ValidatorInner {
    document: Document,
    config: ValidatorConfig,
    forms: Vec<NodeId>,
    toaster: Toaster,
    runtime: Handle,
    listeners: Mutex<Vec<ListenerId>>,
    /// Explicit rule sets replacing the attribute-derived ones.
    rules: RwLock<HashMap<NodeId, RuleSet>>,
    /// Accepted submissions waiting for their reset, by form.
    pending: Mutex<HashMap<NodeId, ScheduledTask>>,
    /// Submit button labels saved by submissions that never restored them,
    /// by button.
    labels: Mutex<HashMap<NodeId, String>>,
    /// Parent of every submission task.
    shutdown: CancellationToken,
}

/// Builder for [`FieldValidator`].
pub struct FieldValidatorBuilder {
    document: Document,
    forms: Option<Vec<NodeId>>,
    config: ValidatorConfig,
    host: Option<Arc<dyn ToastHost>>,
    runtime: Option<Handle>,
}

impl FieldValidatorBuilder {
    /// Forms to wire. Defaults to every form in the document at build time.
    pub fn forms(mut self, forms: impl IntoIterator<Item = NodeId>) -> Self {
        self.forms = Some(forms.into_iter().collect());
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default [`AnimatedToastHost`].
    pub fn toast_host(mut self, host: impl ToastHost + 'static) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    /// Runtime for deferred work. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate the form handles and register every listener.
    pub fn build(self) -> Result<FieldValidator> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()?,
        };

        let document = self.document;
        let forms = self.forms.unwrap_or_else(|| document.forms());
        for &form in &forms {
            match document.tag(form).as_deref() {
                Some("form") => {}
                Some(_) => return Err(Error::NotAForm(form)),
                None => return Err(Error::MissingNode(form)),
            }
        }

        let host = self
            .host
            .unwrap_or_else(|| Arc::new(AnimatedToastHost::new()));
        let toaster = Toaster::new(document.clone(), host, runtime.clone())
            .with_container_id(&self.config.toast_container_id)
            .with_duration(self.config.toast_duration());

        let validator = FieldValidator {
            inner: Arc::new(ValidatorInner {
                document,
                config: self.config,
                forms,
                toaster,
                runtime,
                listeners: Mutex::new(Vec::new()),
                rules: RwLock::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                labels: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
            }),
        };
        validator.attach();
        Ok(validator)
    }
}

/// Validation and submission handling for a fixed set of forms.
///
/// Clones share state. Listeners only hold a weak reference, so dropping every
/// clone turns them into no-ops; [`dispose`](Self::dispose) removes them.
#[derive(Clone)]
pub struct FieldValidator {
    inner: Arc<ValidatorInner>,
}

impl FieldValidator {
    pub fn builder(document: &Document) -> FieldValidatorBuilder {
        FieldValidatorBuilder {
            document: document.clone(),
            forms: None,
            config: ValidatorConfig::default(),
            host: None,
            runtime: None,
        }
    }

    /// Wire the given forms. Must be called inside a tokio runtime.
    pub fn initialize(
        document: &Document,
        forms: impl IntoIterator<Item = NodeId>,
        config: ValidatorConfig,
    ) -> Result<Self> {
        Self::builder(document).forms(forms).config(config).build()
    }

    /// Wire every form currently in the document. Forms added later are not
    /// covered.
    pub fn initialize_all(document: &Document, config: ValidatorConfig) -> Result<Self> {
        Self::builder(document).config(config).build()
    }

    fn upgrade(weak: &Weak<ValidatorInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn attach(&self) {
        let document = &self.inner.document;
        let mut ids = Vec::new();

        for &form in &self.inner.forms {
            let weak = Arc::downgrade(&self.inner);
            ids.push(document.add_listener(form, EventKind::Submit, move |event| {
                if let Some(validator) = Self::upgrade(&weak) {
                    validator.handle_submit(event);
                }
            }));

            let fields = document.form_fields(form);
            for &field in &fields {
                let weak = Arc::downgrade(&self.inner);
                ids.push(document.add_listener(field, EventKind::Blur, move |event| {
                    if let Some(validator) = Self::upgrade(&weak) {
                        validator.validate_field(event.target());
                    }
                }));

                let weak = Arc::downgrade(&self.inner);
                ids.push(document.add_listener(field, EventKind::Input, move |event| {
                    if let Some(validator) = Self::upgrade(&weak) {
                        validator.clear_field_error(event.target());
                    }
                }));
            }
            log::debug!("FieldValidator: wired form {form} with {} fields", fields.len());
        }

        self.lock_listeners().extend(ids);
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<ListenerId>> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<NodeId, ScheduledTask>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_labels(&self) -> std::sync::MutexGuard<'_, HashMap<NodeId, String>> {
        self.inner
            .labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.inner.config
    }

    /// The forms this validator was wired to.
    pub fn forms(&self) -> &[NodeId] {
        &self.inner.forms
    }

    /// Number of listeners still registered.
    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Use `rules` for `field` instead of the ones implied by its attributes.
    pub fn set_rules(&self, field: NodeId, rules: RuleSet) {
        self.inner
            .rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field, rules);
    }

    /// Go back to attribute-derived rules for `field`.
    pub fn clear_rules(&self, field: NodeId) {
        self.inner
            .rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&field);
    }

    /// The rules `field` is checked against.
    pub fn rules_for(&self, field: &Field) -> RuleSet {
        let custom = self
            .inner
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&field.node)
            .cloned();
        custom.unwrap_or_else(|| RuleSet::for_field(field, &self.inner.config.messages))
    }

    // -------------------------------------------------------------------------
    // Field validation
    // -------------------------------------------------------------------------

    /// Validate `field`, update its inline error, and return the violation.
    ///
    /// Nodes that are not form fields always pass.
    pub fn check_field(&self, field: NodeId) -> std::result::Result<(), ValidationError> {
        let Some(snapshot) = Field::read(&self.inner.document, field) else {
            return Ok(());
        };

        let outcome = self.rules_for(&snapshot).evaluate(&snapshot.value);
        match &outcome {
            Ok(()) => self.clear_field_error(field),
            Err(error) => self.show_field_error(field, error.message()),
        }
        outcome
    }

    /// Validate `field` and update its inline error.
    pub fn validate_field(&self, field: NodeId) -> bool {
        self.check_field(field).is_ok()
    }

    /// Mark `field` invalid and put `message` directly after it, replacing
    /// any error it already had.
    pub fn show_field_error(&self, field: NodeId, message: &str) {
        self.clear_field_error(field);

        let document = &self.inner.document;
        let config = &self.inner.config;
        document.add_class(field, &config.invalid_class);

        let error = document.create_element("div");
        document.add_class(error, &config.error_class);
        document.set_attribute(error, ERROR_FOR_ATTR, field.key());
        document.set_text(error, message);

        if !document.insert_after(field, error) {
            log::warn!("FieldValidator: field {field} has no parent, error not shown");
            document.remove(error);
        }
    }

    /// Remove the invalid marker and inline error of `field`, if any.
    pub fn clear_field_error(&self, field: NodeId) {
        let document = &self.inner.document;
        document.remove_class(field, &self.inner.config.invalid_class);
        for error in self.error_nodes(field) {
            document.remove(error);
        }
    }

    /// Message of the inline error currently shown for `field`.
    pub fn field_error(&self, field: NodeId) -> Option<String> {
        self.error_nodes(field)
            .first()
            .map(|error| self.inner.document.text(*error))
    }

    fn error_nodes(&self, field: NodeId) -> Vec<NodeId> {
        let document = &self.inner.document;
        let Some(parent) = document.parent(field) else {
            return Vec::new();
        };
        let key = field.key();
        document
            .children(parent)
            .into_iter()
            .filter(|node| {
                document.has_class(*node, &self.inner.config.error_class)
                    && document.attribute(*node, ERROR_FOR_ATTR).as_deref() == Some(key.as_str())
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Submit listener: suppress native submission and run
    /// [`submit_form`](Self::submit_form) on the event target.
    pub fn handle_submit(&self, event: &Event) -> SubmitOutcome {
        event.prevent_default();
        self.submit_form(event.target())
    }

    /// Validate every field of `form` and act on the result.
    pub fn submit_form(&self, form: NodeId) -> SubmitOutcome {
        if let Some(task) = self.pending_submission(form) {
            log::debug!("FieldValidator: form {form} already has a pending submission");
            return SubmitOutcome::Pending(task);
        }

        let document = &self.inner.document;
        let messages = &self.inner.config.messages;

        let failures: Vec<FieldFailure> = document
            .form_fields(form)
            .into_iter()
            .filter_map(|field| {
                self.check_field(field).err().map(|error| FieldFailure {
                    field,
                    name: document.attribute(field, "name"),
                    error,
                })
            })
            .collect();
        let result = ValidationResult::from_failures(failures);

        if result.is_invalid() {
            log::debug!(
                "FieldValidator: form {form} rejected, {} invalid fields",
                result.failures().len()
            );
            let toast = self.show_toast(&messages.form_invalid, ToastKind::Error);
            return SubmitOutcome::Rejected { result, toast };
        }

        let payload = FormPayload::collect(document, form);
        log::info!("Form submitted successfully: {}", payload.to_json());

        let restore = match document.submit_button(form) {
            Some(button) => {
                // A cancelled submission leaves the submitted label on the
                // button; keep restoring the one saved before it.
                let label = self
                    .lock_labels()
                    .entry(button)
                    .or_insert_with(|| document.text(button))
                    .clone();
                document.set_text(button, &messages.submitted_label);
                document.set_disabled(button, true);
                Some((button, label))
            }
            None => {
                log::warn!("FieldValidator: form {form} has no submit button");
                None
            }
        };

        let weak = Arc::downgrade(&self.inner);
        let task = ScheduledTask::spawn_with_token(
            &self.inner.runtime,
            self.inner.shutdown.child_token(),
            self.inner.config.submit_delay(),
            move || {
                if let Some(validator) = Self::upgrade(&weak) {
                    validator.finish_submission(form, restore);
                }
            },
        );
        self.lock_pending().insert(form, task.clone());

        SubmitOutcome::Accepted { payload, task }
    }

    fn finish_submission(&self, form: NodeId, restore: Option<(NodeId, String)>) {
        let document = &self.inner.document;
        if let Some((button, label)) = restore {
            document.set_text(button, label);
            document.set_disabled(button, false);
            self.lock_labels().remove(&button);
        }
        document.reset_form(form);
        self.lock_pending().remove(&form);

        self.show_toast(&self.inner.config.messages.form_submitted, ToastKind::Success);
    }

    /// The still-pending reset task of an accepted submit of `form`.
    ///
    /// A task that has been cancelled no longer counts, even before the
    /// runtime has observed the cancellation.
    pub fn pending_submission(&self, form: NodeId) -> Option<ScheduledTask> {
        self.lock_pending()
            .get(&form)
            .filter(|task| task.is_pending())
            .cloned()
    }

    // -------------------------------------------------------------------------
    // Toasts and teardown
    // -------------------------------------------------------------------------

    /// Show a toast in the page-global container.
    pub fn show_toast(&self, message: &str, kind: ToastKind) -> ToastHandle {
        self.inner.toaster.show(message, kind)
    }

    /// Remove every listener and cancel pending submissions. Idempotent.
    pub fn dispose(&self) {
        let ids = std::mem::take(&mut *self.lock_listeners());
        for id in &ids {
            self.inner.document.remove_listener(*id);
        }
        self.inner.shutdown.cancel();
        self.lock_pending().clear();

        if !ids.is_empty() {
            log::debug!("FieldValidator: disposed, removed {} listeners", ids.len());
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl std::fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValidator")
            .field("forms", &self.inner.forms)
            .field("listeners", &self.listener_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::validation::Rule;

    #[tokio::test]
    async fn test_rules_survive_poisoned_lock() {
        let document = Document::new();
        let form = document.mount(
            document.body(),
            Element::form().child(Element::div().child(Element::input("text").name("code"))),
        );
        let validator =
            FieldValidator::initialize(&document, [form], ValidatorConfig::default()).unwrap();
        let field = document.form_fields(form)[0];

        let inner = Arc::clone(&validator.inner);
        let poisoned = std::thread::spawn(move || {
            let _guard = inner.rules.write().unwrap();
            panic!("poison the rules lock");
        })
        .join();
        assert!(poisoned.is_err());
        assert!(validator.inner.rules.is_poisoned());

        validator.set_rules(field, RuleSet::new().with(Rule::required("code needed")));
        assert!(!validator.validate_field(field));
        assert_eq!(validator.field_error(field).as_deref(), Some("code needed"));

        validator.clear_rules(field);
        assert!(validator.validate_field(field));
        assert_eq!(validator.field_error(field), None);
    }
}

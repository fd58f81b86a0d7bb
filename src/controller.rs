// src/controller.rs
//! The form submission controller: owns the page, reacts to UI events, and
//! runs the submit → predict → render pipeline.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::errors::{PredictError, Result};
use crate::layout::{
    self, CONFIDENCE_SCORE, FORM_SECTION_CLASS, HIDDEN_CLASS, LOADING_SPINNER, PREDICT_BTN,
    PREDICTION_FORM, PREDICTION_RESULT, PROBABILITY_BREAKDOWN, RESULT_CARD_CLASS, RESULTS_SECTION,
    SUBMIT_SECTION_CLASS,
};
use crate::page::{Document, NodeId, Selector};
use crate::payload::FormPayload;
use crate::predictor::PredictionService;
use crate::render::{ErrorView, PredictionView};
use crate::schema::FormSchema;

pub const VALID_BORDER: &str = "#48bb78";
pub const INVALID_BORDER: &str = "#f56565";
pub const NEUTRAL_BORDER: &str = "#e2e8f0";

/// Hosts on which the sample-data button is offered.
pub const DEV_HOSTS: &[&str] = &["localhost", "127.0.0.1"];
pub const SAMPLE_BTN: &str = "fillSampleBtn";

const FADE_IN_CSS: &str = "
    .fade-in {
        animation: fadeIn 0.6s ease-out forwards;
        opacity: 0;
    }

    @keyframes fadeIn {
        from {
            opacity: 0;
            transform: translateY(20px);
        }
        to {
            opacity: 1;
            transform: translateY(0);
        }
    }
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// Everything the page can report to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    DomContentLoaded,
    Submit,
    /// The user typed into the field named `field`.
    Input { field: String, value: String },
    KeyDown(KeyEvent),
    Click { target: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Prediction(PredictionView),
    Error(ErrorView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub id: Uuid,
    pub rendered: Rendered,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.rendered, Rendered::Prediction(_))
    }
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    pub default_prevented: bool,
    pub submission: Option<SubmissionOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

/// Disables the submit button and shows the spinner for as long as it lives.
/// Dropping it restores both, whatever path the submission took.
struct BusyGuard<'a> {
    document: &'a mut Document,
    button: NodeId,
    spinner: NodeId,
}

impl<'a> BusyGuard<'a> {
    fn acquire(document: &'a mut Document, button: NodeId, spinner: NodeId) -> Self {
        document.element_mut(button).disabled = true;
        document.element_mut(spinner).remove_class(HIDDEN_CLASS);
        Self {
            document,
            button,
            spinner,
        }
    }
}

impl Deref for BusyGuard<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl DerefMut for BusyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.document
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.document.element_mut(self.button).disabled = false;
        self.document.element_mut(self.spinner).add_class(HIDDEN_CLASS);
    }
}

/// Handles to the elements the controller works with, resolved once.
#[derive(Debug, Clone, Copy)]
struct Elements {
    form: NodeId,
    predict_btn: NodeId,
    spinner: NodeId,
    results: NodeId,
    result_card: NodeId,
    submit_section: NodeId,
}

impl Elements {
    fn resolve(doc: &Document) -> Result<Self> {
        let by_id = |id: &str| {
            doc.get_element_by_id(id)
                .ok_or_else(|| PredictError::MissingElement(id.to_string()))
        };
        let by_class = |class: &str| {
            doc.query_selector(doc.body(), Selector::Class(class))
                .ok_or_else(|| PredictError::MissingElement(format!(".{}", class)))
        };
        Ok(Self {
            form: by_id(PREDICTION_FORM)?,
            predict_btn: by_id(PREDICT_BTN)?,
            spinner: by_id(LOADING_SPINNER)?,
            results: by_id(RESULTS_SECTION)?,
            result_card: by_class(RESULT_CARD_CLASS)?,
            submit_section: by_class(SUBMIT_SECTION_CLASS)?,
        })
    }
}

pub struct FormController<P: PredictionService> {
    document: Document,
    elements: Elements,
    service: P,
    schema: Arc<FormSchema>,
}

impl<P: PredictionService> FormController<P> {
    /// Binds to a page. Injects the fade-in stylesheet and, on development
    /// hosts, the sample-data button.
    pub fn attach(document: Document, service: P, schema: Arc<FormSchema>) -> Result<Self> {
        let elements = Elements::resolve(&document)?;
        let mut controller = Self {
            document,
            elements,
            service,
            schema,
        };
        controller.document.add_head_style(FADE_IN_CSS);
        if DEV_HOSTS.contains(&controller.document.hostname()) {
            controller.inject_sample_button()?;
        }
        Ok(controller)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn state(&self) -> SubmitState {
        if self.document.element(self.elements.predict_btn).disabled {
            SubmitState::Submitting
        } else {
            SubmitState::Idle
        }
    }

    pub fn is_spinner_visible(&self) -> bool {
        !self.document.element(self.elements.spinner).has_class(HIDDEN_CLASS)
    }

    pub fn is_results_visible(&self) -> bool {
        !self.document.element(self.elements.results).has_class(HIDDEN_CLASS)
    }

    /// Sets a field's value without any validation side effect.
    pub fn set_field_value(&mut self, name: &str, value: &str) -> bool {
        match self.field_by_name(name) {
            Some(node) => {
                self.document.element_mut(node).value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.field_by_name(name)
            .map(|node| self.document.element(node).value.as_str())
    }

    fn field_by_name(&self, name: &str) -> Option<NodeId> {
        self.document
            .query_selector(self.elements.form, Selector::Name(name))
            .filter(|n| self.document.element(*n).is_form_control())
    }

    pub async fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        match event {
            UiEvent::DomContentLoaded => {
                self.on_content_loaded();
                Dispatch::default()
            }
            UiEvent::Submit => Dispatch {
                default_prevented: true,
                submission: Some(self.submit().await),
            },
            UiEvent::Input { field, value } => {
                self.on_input(&field, &value);
                Dispatch::default()
            }
            UiEvent::KeyDown(key) => self.on_key_down(key).await,
            UiEvent::Click { target } => {
                if target == SAMPLE_BTN && self.document.get_element_by_id(SAMPLE_BTN).is_some() {
                    self.fill_sample_data();
                }
                Dispatch::default()
            }
        }
    }

    /// Collects the form, calls the backend, and renders the answer or the
    /// failure. The button and spinner are restored on every path.
    pub async fn submit(&mut self) -> SubmissionOutcome {
        let id = Uuid::new_v4();
        let Elements {
            form,
            predict_btn,
            spinner,
            results,
            result_card,
            ..
        } = self.elements;

        let mut page = BusyGuard::acquire(&mut self.document, predict_btn, spinner);
        page.element_mut(results).add_class(HIDDEN_CLASS);

        let payload = FormPayload::from_entries(page.form_entries(form), &self.schema);
        match serde_json::to_string(&payload) {
            Ok(json) => log::debug!("[{}] Sending data: {}", id, json),
            Err(e) => log::warn!("[{}] Could not serialize payload for logging: {}", id, e),
        }

        let start = Instant::now();
        let rendered = match self.service.predict(&payload).await {
            Ok(result) => {
                let view = PredictionView::from_result(&result);
                match display_results(&mut page, results, result_card, &view) {
                    Ok(()) => Rendered::Prediction(view),
                    Err(e) => {
                        log::error!("[{}] Could not render prediction: {}", id, e);
                        let view = ErrorView::from_error(&e);
                        display_error(&mut page, results, result_card, &view);
                        Rendered::Error(view)
                    }
                }
            }
            Err(e) => {
                log::error!("[{}] Prediction failed: {}", id, e);
                let view = ErrorView::from_error(&e);
                display_error(&mut page, results, result_card, &view);
                Rendered::Error(view)
            }
        };
        drop(page);

        log::info!(
            "[{}] Submission finished in {}ms ({})",
            id,
            start.elapsed().as_millis(),
            if matches!(rendered, Rendered::Prediction(_)) { "rendered" } else { "error" }
        );

        SubmissionOutcome { id, rendered }
    }

    /// True iff every required field has a non-blank value. Colours each
    /// required field's border accordingly.
    pub fn validate_required_fields(&mut self) -> bool {
        let mut is_valid = true;
        for node in self.document.query_selector_all(self.elements.form, Selector::Required) {
            let el = self.document.element_mut(node);
            if el.value.trim().is_empty() {
                el.set_style("border-color", INVALID_BORDER);
                is_valid = false;
            } else {
                el.set_style("border-color", VALID_BORDER);
            }
        }
        is_valid
    }

    /// Clears the form, hides the results and drops validation colouring.
    pub fn reset(&mut self) {
        self.document.reset_form(self.elements.form);
        self.document
            .element_mut(self.elements.results)
            .add_class(HIDDEN_CLASS);
        for node in self
            .document
            .query_selector_all(self.elements.form, Selector::Tags(&["input", "select"]))
        {
            self.document
                .element_mut(node)
                .set_style("border-color", NEUTRAL_BORDER);
        }
    }

    fn on_input(&mut self, field: &str, value: &str) {
        let Some(node) = self.field_by_name(field) else {
            log::warn!("Input event for unknown field '{}'", field);
            return;
        };
        let el = self.document.element_mut(node);
        el.value = value.to_string();
        if el.required {
            let color = if el.value.trim().is_empty() {
                INVALID_BORDER
            } else {
                VALID_BORDER
            };
            el.set_style("border-color", color);
        }
    }

    async fn on_key_down(&mut self, key: KeyEvent) -> Dispatch {
        let mut dispatch = Dispatch::default();
        if (key.ctrl || key.meta) && key.key == "Enter" {
            dispatch.default_prevented = true;
            if self.validate_required_fields() {
                dispatch.submission = Some(self.submit().await);
            } else {
                log::debug!("Shortcut submit skipped: required fields missing");
            }
        }
        if key.key == "Escape" {
            self.reset();
        }
        dispatch
    }

    fn on_content_loaded(&mut self) {
        let tooltips: Vec<(String, String)> = self
            .schema
            .tooltips()
            .map(|(id, text)| (id.to_string(), text.to_string()))
            .collect();
        for (id, text) in tooltips {
            if let Some(node) = self.document.get_element_by_id(&id) {
                self.document.element_mut(node).title = Some(text);
            }
        }

        let body = self.document.body();
        let sections = self
            .document
            .query_selector_all(body, Selector::Class(FORM_SECTION_CLASS));
        for (index, node) in sections.into_iter().enumerate() {
            let el = self.document.element_mut(node);
            el.set_style("animation-delay", &animation_delay(index));
            el.add_class("fade-in");
        }
    }

    fn inject_sample_button(&mut self) -> Result<()> {
        let doc = &mut self.document;
        let button = doc.create_element("button");
        {
            let el = doc.element_mut(button);
            el.id = Some(SAMPLE_BTN.to_string());
            el.name = Some(layout::ACTION_FIELD.to_string());
            el.set_class_name("predict-btn");
            el.set_attr("type", "submit");
            el.set_attr("value", layout::ACTION_FILL_SAMPLE);
            el.set_attr("formnovalidate", "formnovalidate");
            el.set_style("margin-right", "10px");
            el.set_style("background", "linear-gradient(135deg, #48bb78 0%, #38a169 100%)");
        }
        doc.set_text(button, "Fill Sample Data");
        doc.insert_before(self.elements.submit_section, button, self.elements.predict_btn)
    }

    fn fill_sample_data(&mut self) {
        for (id, value) in &self.schema.sample {
            if let Some(node) = self.document.get_element_by_id(id) {
                self.document.element_mut(node).value = value.clone();
            }
        }
    }
}

/// `index * 0.1s`, computed in whole milliseconds.
fn animation_delay(index: usize) -> String {
    let millis = index * 100;
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}s", millis as f64 / 1000.0)
    }
}

/// Writes a successful prediction into the result card, recreating its
/// slots if an earlier error replaced them.
fn display_results(
    doc: &mut Document,
    results: NodeId,
    card: NodeId,
    view: &PredictionView,
) -> Result<()> {
    if doc.get_element_by_id(PREDICTION_RESULT).is_none() {
        doc.set_inner_html(card, String::new());
        layout::append_result_slots(doc, card);
    }
    let slot = |doc: &Document, id: &str| {
        doc.get_element_by_id(id)
            .ok_or_else(|| PredictError::MissingElement(id.to_string()))
    };
    let prediction = slot(doc, PREDICTION_RESULT)?;
    let confidence = slot(doc, CONFIDENCE_SCORE)?;
    let breakdown = slot(doc, PROBABILITY_BREAKDOWN)?;

    doc.set_inner_html(prediction, view.result_html());
    doc.element_mut(prediction).set_class_name(&view.class_name());
    doc.set_inner_html(confidence, view.confidence_html());
    doc.set_inner_html(breakdown, view.breakdown_html());

    reveal(doc, results);
    Ok(())
}

fn display_error(doc: &mut Document, results: NodeId, card: NodeId, view: &ErrorView) {
    doc.set_inner_html(card, view.card_html());
    reveal(doc, results);
}

fn reveal(doc: &mut Document, results: NodeId) {
    doc.element_mut(results).remove_class(HIDDEN_CLASS);
    doc.scroll_into_view(results);
}

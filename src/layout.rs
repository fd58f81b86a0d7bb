// src/layout.rs
//! Builds the prediction page markup the controller is attached to.

use crate::page::{Document, NodeId};
use crate::schema::{FieldKind, FieldSpec, FormSchema};

pub const PREDICTION_FORM: &str = "predictionForm";
pub const PREDICT_BTN: &str = "predictBtn";
pub const LOADING_SPINNER: &str = "loadingSpinner";
pub const RESULTS_SECTION: &str = "resultsSection";
pub const PREDICTION_RESULT: &str = "predictionResult";
pub const CONFIDENCE_SCORE: &str = "confidenceScore";
pub const PROBABILITY_BREAKDOWN: &str = "probabilityBreakdown";
pub const RESET_BTN: &str = "resetBtn";

pub const RESULT_CARD_CLASS: &str = "result-card";
pub const SUBMIT_SECTION_CLASS: &str = "submit-section";
pub const FORM_SECTION_CLASS: &str = "form-section";
pub const HIDDEN_CLASS: &str = "hidden";

/// Value of the posted `action` field for each page button.
pub const ACTION_FIELD: &str = "action";
pub const ACTION_PREDICT: &str = "predict";
pub const ACTION_RESET: &str = "reset";
pub const ACTION_FILL_SAMPLE: &str = "fill-sample";

pub const STYLESHEET_HREF: &str = "/styles.css";

fn div(doc: &mut Document, parent: NodeId, class: &str) -> NodeId {
    let node = doc.create_element("div");
    doc.element_mut(node).set_class_name(class);
    doc.append_child(parent, node);
    node
}

fn with_id(doc: &mut Document, node: NodeId, id: &str) -> NodeId {
    doc.element_mut(node).id = Some(id.to_string());
    node
}

fn text_element(doc: &mut Document, parent: NodeId, tag: &str, text: &str) -> NodeId {
    let node = doc.create_element(tag);
    doc.set_text(node, text);
    doc.append_child(parent, node);
    node
}

fn field_group(doc: &mut Document, grid: NodeId, field: &FieldSpec) {
    let group = div(doc, grid, "form-group");

    let label = text_element(doc, group, "label", &field.label);
    doc.element_mut(label).set_attr("for", &field.name);

    let control = if field.is_select() {
        let node = doc.create_element("select");
        doc.element_mut(node).options = field.options.clone();
        node
    } else {
        let node = doc.create_element("input");
        let el = doc.element_mut(node);
        match field.kind {
            FieldKind::Numeric => {
                el.set_attr("type", "number");
                el.set_attr("step", "any");
            }
            FieldKind::Text => el.set_attr("type", "text"),
        }
        if let Some(placeholder) = &field.placeholder {
            el.set_attr("placeholder", placeholder);
        }
        node
    };

    let el = doc.element_mut(control);
    el.id = Some(field.name.clone());
    el.name = Some(field.name.clone());
    el.required = field.required;
    doc.append_child(group, control);
}

/// Produces a fresh page for `hostname` with every element the controller
/// expects to find.
pub fn build_page(schema: &FormSchema, hostname: &str) -> Document {
    let mut doc = Document::new(hostname, &schema.title);
    doc.add_stylesheet(STYLESHEET_HREF);
    let body = doc.body();

    let container = div(&mut doc, body, "container");
    let header = doc.create_element("header");
    doc.append_child(container, header);
    text_element(&mut doc, header, "h1", &schema.title);
    if let Some(subtitle) = &schema.subtitle {
        text_element(&mut doc, header, "p", subtitle);
    }

    let form = doc.create_element("form");
    with_id(&mut doc, form, PREDICTION_FORM);
    doc.element_mut(form).set_attr("method", "post");
    doc.element_mut(form).set_attr("action", "/");
    doc.append_child(container, form);

    for section in &schema.sections {
        let node = div(&mut doc, form, FORM_SECTION_CLASS);
        text_element(&mut doc, node, "h2", &section.title);
        let grid = div(&mut doc, node, "form-grid");
        for field in &section.fields {
            field_group(&mut doc, grid, field);
        }
    }

    let submit = div(&mut doc, form, SUBMIT_SECTION_CLASS);

    let predict = doc.create_element("button");
    with_id(&mut doc, predict, PREDICT_BTN);
    {
        let el = doc.element_mut(predict);
        el.name = Some(ACTION_FIELD.to_string());
        el.set_class_name("predict-btn");
        el.set_attr("type", "submit");
        el.set_attr("value", ACTION_PREDICT);
    }
    doc.set_inner_html(predict, "<i class=\"fas fa-magic\"></i> Predict");
    doc.append_child(submit, predict);

    let reset = doc.create_element("button");
    with_id(&mut doc, reset, RESET_BTN);
    {
        let el = doc.element_mut(reset);
        el.name = Some(ACTION_FIELD.to_string());
        el.set_class_name("reset-btn");
        el.set_attr("type", "submit");
        el.set_attr("value", ACTION_RESET);
        el.set_attr("formnovalidate", "formnovalidate");
    }
    doc.set_text(reset, "Reset");
    doc.append_child(submit, reset);

    let spinner = div(&mut doc, submit, "spinner hidden");
    with_id(&mut doc, spinner, LOADING_SPINNER);

    let results = div(&mut doc, container, "results-section hidden");
    with_id(&mut doc, results, RESULTS_SECTION);
    let card = div(&mut doc, results, RESULT_CARD_CLASS);
    append_result_slots(&mut doc, card);

    doc
}

/// The three nodes a successful prediction is written into.
pub fn append_result_slots(doc: &mut Document, card: NodeId) {
    let result = div(doc, card, "prediction-result");
    with_id(doc, result, PREDICTION_RESULT);
    let confidence = div(doc, card, "confidence-score");
    with_id(doc, confidence, CONFIDENCE_SCORE);
    let breakdown = div(doc, card, "probability-breakdown");
    with_id(doc, breakdown, PROBABILITY_BREAKDOWN);
}

// src/page.rs
//! In-memory page document: an arena of elements addressed by [`NodeId`],
//! with just enough DOM behaviour for the form controller (ids, classes,
//! inline styles, form values, inner HTML) and a serializer back to markup.

use crate::errors::{PredictError, Result};
use crate::schema::SelectOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The small selector vocabulary the controller needs.
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    Class(&'a str),
    Name(&'a str),
    /// Elements carrying the `required` attribute.
    Required,
    /// Any of the given tag names.
    Tags(&'a [&'a str]),
}

#[derive(Debug, Clone)]
enum Content {
    Children(Vec<NodeId>),
    Html(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub class_list: Vec<String>,
    pub value: String,
    pub default_value: String,
    pub required: bool,
    pub disabled: bool,
    pub title: Option<String>,
    pub options: Vec<SelectOption>,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    content: Content,
    parent: Option<NodeId>,
}

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "link", "meta"];

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            name: None,
            class_list: Vec::new(),
            value: String::new(),
            default_value: String::new(),
            required: false,
            disabled: false,
            title: None,
            options: Vec::new(),
            attrs: Vec::new(),
            style: Vec::new(),
            content: Content::Children(Vec::new()),
            parent: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.class_list.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.class_list.retain(|c| c != class);
    }

    /// Replaces the whole class list, like assigning `className`.
    pub fn set_class_name(&mut self, class_name: &str) {
        self.class_list = class_name.split_whitespace().map(str::to_string).collect();
    }

    pub fn class_name(&self) -> String {
        self.class_list.join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.iter().find(|(k, _)| k == property).map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        match self.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }

    /// Raw markup when the content was set through [`Document::set_inner_html`].
    pub fn inner_html(&self) -> Option<&str> {
        match &self.content {
            Content::Html(html) => Some(html),
            Content::Children(_) => None,
        }
    }

    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    fn is_button_like(&self) -> bool {
        self.tag == "button"
            || matches!(self.attr("type"), Some("submit" | "button" | "reset" | "image"))
    }

    fn matches(&self, selector: Selector<'_>) -> bool {
        match selector {
            Selector::Class(class) => self.has_class(class),
            Selector::Name(name) => self.name.as_deref() == Some(name),
            Selector::Required => self.required,
            Selector::Tags(tags) => tags.contains(&self.tag.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    hostname: String,
    title: String,
    stylesheets: Vec<String>,
    head_styles: Vec<String>,
    nodes: Vec<Element>,
    body: NodeId,
    scrolled_into_view: Option<NodeId>,
}

impl Document {
    pub fn new(hostname: &str, title: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            title: title.to_string(),
            stylesheets: Vec::new(),
            head_styles: Vec::new(),
            nodes: vec![Element::new("body")],
            body: NodeId(0),
            scrolled_into_view: None,
        }
    }

    /// Host the page was served for, without port.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    pub fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match &self.nodes[node.0].content {
            Content::Children(children) => children,
            Content::Html(_) => &[],
        }
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            if let Content::Children(children) = &mut self.nodes[parent.0].content {
                children.retain(|c| *c != child);
            }
        }
    }

    fn children_mut(&mut self, node: NodeId) -> &mut Vec<NodeId> {
        let content = &mut self.nodes[node.0].content;
        if let Content::Html(_) = content {
            *content = Content::Children(Vec::new());
        }
        match content {
            Content::Children(children) => children,
            Content::Html(_) => unreachable!("content was just replaced with children"),
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.children_mut(parent).push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Inserts `child` into `parent` right before `reference`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        let position = self
            .children(parent)
            .iter()
            .position(|c| *c == reference)
            .ok_or_else(|| {
                PredictError::MissingElement(format!(
                    "{} (insertion reference)",
                    self.describe(reference)
                ))
            })?;
        self.detach(child);
        self.children_mut(parent).insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Replaces the node's content with raw markup. Existing children are
    /// detached and no longer reachable by id.
    pub fn set_inner_html(&mut self, node: NodeId, html: impl Into<String>) {
        let old = std::mem::replace(&mut self.nodes[node.0].content, Content::Html(html.into()));
        if let Content::Children(children) = old {
            for child in children {
                self.nodes[child.0].parent = None;
            }
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.set_inner_html(node, escape_html(text));
    }

    /// Pre-order walk of everything under `scope`, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.nodes[n.0].id.as_deref() == Some(id))
    }

    pub fn query_selector(&self, scope: NodeId, selector: Selector<'_>) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.nodes[n.0].matches(selector))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: Selector<'_>) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.nodes[n.0].matches(selector))
            .collect()
    }

    /// Name/value pairs a browser would collect from `form`, in document order.
    pub fn form_entries(&self, form: NodeId) -> Vec<(String, String)> {
        self.descendants(form)
            .into_iter()
            .map(|n| &self.nodes[n.0])
            .filter(|el| el.is_form_control() && !el.is_button_like() && !el.disabled)
            .filter_map(|el| el.name.clone().map(|name| (name, el.value.clone())))
            .collect()
    }

    /// Restores every control in `form` to its default value.
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.descendants(form) {
            let el = &mut self.nodes[node.0];
            if el.is_form_control() {
                el.value = el.default_value.clone();
            }
        }
    }

    pub fn add_stylesheet(&mut self, href: &str) {
        self.stylesheets.push(href.to_string());
    }

    pub fn add_head_style(&mut self, css: &str) {
        self.head_styles.push(css.to_string());
    }

    pub fn head_styles(&self) -> &[String] {
        &self.head_styles
    }

    pub fn scroll_into_view(&mut self, node: NodeId) {
        self.scrolled_into_view = Some(node);
    }

    pub fn scrolled_into_view(&self) -> Option<NodeId> {
        self.scrolled_into_view
    }

    fn describe(&self, node: NodeId) -> String {
        let el = &self.nodes[node.0];
        match &el.id {
            Some(id) => format!("#{}", id),
            None => el.tag.clone(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"UTF-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        for href in &self.stylesheets {
            out.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape_html(href)));
        }
        for css in &self.head_styles {
            out.push_str(&format!("<style>{}</style>\n", css));
        }
        out.push_str("</head>\n");
        self.write_node(self.body, &mut out);
        out.push_str("\n</html>\n");
        out
    }

    /// Markup of a single node and its content.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let el = &self.nodes[node.0];
        out.push('<');
        out.push_str(&el.tag);
        let mut attr = |name: &str, value: &str| {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        };
        if let Some(id) = &el.id {
            attr("id", id);
        }
        if let Some(name) = &el.name {
            attr("name", name);
        }
        if !el.class_list.is_empty() {
            attr("class", &el.class_name());
        }
        for (k, v) in &el.attrs {
            attr(k, v);
        }
        if el.tag == "input" && !el.is_button_like() {
            attr("value", &el.value);
        }
        if let Some(title) = &el.title {
            attr("title", title);
        }
        if !el.style.is_empty() {
            let style = el
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            attr("style", &style);
        }
        if el.required {
            out.push_str(" required");
        }
        if el.disabled {
            out.push_str(" disabled");
        }
        out.push('>');

        if VOID_TAGS.contains(&el.tag.as_str()) {
            return;
        }

        match el.tag.as_str() {
            "select" => {
                for option in &el.options {
                    let selected = if option.value == el.value { " selected" } else { "" };
                    out.push_str(&format!(
                        "<option value=\"{}\"{}>{}</option>",
                        escape_html(&option.value),
                        selected,
                        escape_html(&option.label)
                    ));
                }
            }
            "textarea" => out.push_str(&escape_html(&el.value)),
            _ => match &el.content {
                Content::Html(html) => out.push_str(html),
                Content::Children(children) => {
                    for child in children {
                        self.write_node(*child, out);
                    }
                }
            },
        }

        out.push_str(&format!("</{}>", el.tag));
    }
}

/// Escapes text for use inside element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

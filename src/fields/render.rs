//! Field rendering into a UI tree and HTML
//!
//! Each [`FieldDefinition`] becomes a small [`UiNode`] tree. The tree is what
//! tests inspect; [`UiNode::to_html`] is the only place that produces markup.
//! [`collect_submission`] walks a tree the way a browser builds a form
//! submission, so render and parse can be checked against each other.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::parse::DATETIME_FORMAT;
use super::{FieldDefinition, FieldKind, FieldValue, NumericType, ScalarKind, SelectOption};
use crate::config::EngineConfig;
use crate::protocol::{FIELD_PREFIX, FormParams};

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

// ============================================================================
// UI tree
// ============================================================================

/// Minimal element tree handed to the markup renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UiNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<UiNode>,
    },
    Text {
        text: String,
    },
}

impl UiNode {
    pub fn element(tag: impl Into<String>) -> Self {
        UiNode::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        UiNode::Text { text: text.into() }
    }

    /// Set an attribute, replacing an earlier value
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let UiNode::Element { attrs, .. } = &mut self {
            let name = name.into();
            let value = value.into();
            match attrs.iter_mut().find(|(k, _)| *k == name) {
                Some(existing) => existing.1 = value,
                None => attrs.push((name, value)),
            }
        }
        self
    }

    /// Boolean attribute such as `checked` or `selected`
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    pub fn child(mut self, node: UiNode) -> Self {
        if let UiNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = UiNode>) -> Self {
        if let UiNode::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            UiNode::Element { tag, .. } => Some(tag),
            UiNode::Text { .. } => None,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            UiNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            UiNode::Text { .. } => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    pub fn child_nodes(&self) -> &[UiNode] {
        match self {
            UiNode::Element { children, .. } => children,
            UiNode::Text { .. } => &[],
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        match self {
            UiNode::Text { text } => text.clone(),
            UiNode::Element { children, .. } => {
                children.iter().map(UiNode::text_content).collect()
            }
        }
    }

    /// Depth-first search for elements matching `pred`
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&UiNode) -> bool) -> Vec<&'a UiNode> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a UiNode)) {
        visit(self);
        for child in self.child_nodes() {
            child.walk(visit);
        }
    }

    /// Serialize to HTML with escaped text and attribute values
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            UiNode::Text { text } => out.push_str(&escape_html(text)),
            UiNode::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_html(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

// ============================================================================
// Rendering
// ============================================================================

/// Per-form rendering settings
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Table the form edits
    pub table: String,
    pub help_inline_limit: usize,
    pub autocomplete_path: String,
}

impl RenderContext {
    pub fn new(config: &EngineConfig, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            help_inline_limit: config.help_inline_limit,
            autocomplete_path: config.autocomplete_path.clone(),
        }
    }

    fn autocomplete_url(&self, field: &str) -> String {
        self.autocomplete_path
            .replace("{table}", &self.table)
            .replace("{field}", field)
    }
}

/// Render a whole edit form
pub fn render_form(fields: &[FieldDefinition], ctx: &RenderContext) -> UiNode {
    UiNode::element("form")
        .attr("method", "post")
        .attr("class", "grid-form")
        .attr("data-table", ctx.table.as_str())
        .children(fields.iter().map(|f| render_field(f, ctx)))
        .child(
            UiNode::element("button")
                .attr("type", "submit")
                .attr("class", "btn btn-primary")
                .child(UiNode::text("Save")),
        )
}

/// Render one field: label, control and optional help
pub fn render_field(field: &FieldDefinition, ctx: &RenderContext) -> UiNode {
    let name = format!("{}{}", FIELD_PREFIX, field.name);

    if field.kind == FieldKind::Hidden {
        return input("hidden", &name, &field.value.to_input_string());
    }

    let mut group = UiNode::element("div")
        .attr("class", "form-group")
        .attr("data-field", field.name.as_str())
        .child(
            UiNode::element("label")
                .attr("for", name.as_str())
                .child(UiNode::text(field.label.as_str())),
        )
        .child(render_control(field, &name, ctx));

    if let Some(help) = &field.help {
        group = group.child(render_help(help, ctx.help_inline_limit));
    }
    group
}

fn render_help(help: &str, inline_limit: usize) -> UiNode {
    if help.chars().count() <= inline_limit {
        UiNode::element("small")
            .attr("class", "form-text help")
            .child(UiNode::text(help))
    } else {
        UiNode::element("details")
            .attr("class", "help")
            .child(UiNode::element("summary").child(UiNode::text("Help")))
            .child(UiNode::element("p").child(UiNode::text(help)))
    }
}

fn input(kind: &str, name: &str, value: &str) -> UiNode {
    UiNode::element("input")
        .attr("type", kind)
        .attr("name", name)
        .attr("value", value)
}

fn render_control(field: &FieldDefinition, name: &str, ctx: &RenderContext) -> UiNode {
    let value = &field.value;
    match &field.kind {
        FieldKind::Text => input("text", name, &value.to_input_string()).attr("id", name),
        FieldKind::Password => input("password", name, &value.to_input_string()).attr("id", name),
        FieldKind::Email => input("email", name, &value.to_input_string()).attr("id", name),
        FieldKind::Url => input("url", name, &value.to_input_string()).attr("id", name),
        FieldKind::Hidden => input("hidden", name, &value.to_input_string()),
        FieldKind::TextArea => UiNode::element("textarea")
            .attr("name", name)
            .attr("id", name)
            .attr("rows", "4")
            .child(UiNode::text(value.to_input_string())),
        FieldKind::Number { numeric } => number_input(name, *numeric, value).attr("id", name),
        FieldKind::Checkbox => UiNode::element("span")
            .attr("class", "checkbox")
            // unchecked boxes post nothing; the hidden twin makes that an explicit false
            .child(input("hidden", name, "0"))
            .child(
                input("checkbox", name, "1")
                    .attr("id", name)
                    .flag("checked", value.as_bool()),
            ),
        FieldKind::Date => input("date", name, &value.to_input_string()).attr("id", name),
        FieldKind::DateTime => input("datetime-local", name, &datetime_input_value(value))
            .attr("id", name)
            .attr("step", "1"),
        FieldKind::Select { options } => {
            let current = value.to_input_string();
            select(name, options, &[current], true).attr("id", name)
        }
        FieldKind::MultiSelect { options } => {
            select(name, options, &value.list_items(), false)
                .attr("id", name)
                .flag("multiple", true)
        }
        FieldKind::Array { element } => repeatable(name, &value.list_items(), |item| {
            match element {
                ScalarKind::Text => input("text", name, item),
                ScalarKind::Integer => input("number", name, item).attr("step", "1"),
            }
        }),
        FieldKind::ArrayOfSelect { options } => {
            repeatable(name, &value.list_items(), |item| {
                select(name, options, &[item.to_string()], true)
            })
        }
        FieldKind::ForeignKey { table } => {
            let mut node = UiNode::element("select")
                .attr("name", name)
                .attr("id", name)
                .attr("class", "fk-select")
                .attr("data-ref-table", *table)
                .attr("data-source", ctx.autocomplete_url(&field.name));
            if let FieldValue::Int(id) = value {
                let text = field
                    .reference_label
                    .clone()
                    .unwrap_or_else(|| id.to_string());
                node = node.attr("data-selected-id", id.to_string()).child(
                    UiNode::element("option")
                        .attr("value", id.to_string())
                        .flag("selected", true)
                        .child(UiNode::text(text)),
                );
            }
            node
        }
    }
}

fn number_input(name: &str, numeric: NumericType, value: &FieldValue) -> UiNode {
    let mut node = input("number", name, &value.to_input_string());
    match numeric.bounds() {
        Some((min, max)) => {
            node = node
                .attr("step", "1")
                .attr("min", min.to_string())
                .attr("max", max.to_string());
        }
        None => node = node.attr("step", "any"),
    }
    node
}

/// Stored `YYYY-MM-DD HH:MM:SS` as a `datetime-local` value
fn datetime_input_value(value: &FieldValue) -> String {
    let raw = value.to_input_string();
    match NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT) {
        Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(_) => raw,
    }
}

/// A select over `options` with `selected` pre-selected
///
/// Selected options come first in `selected` order so a multi-select posts
/// them back in the same order. Values outside the option set are dropped.
fn select(name: &str, options: &[SelectOption], selected: &[String], placeholder: bool) -> UiNode {
    let is_selected = |o: &SelectOption| selected.iter().any(|s| s == o.value);

    let mut ordered: Vec<&SelectOption> = Vec::with_capacity(options.len());
    for value in selected {
        if let Some(o) = options.iter().find(|o| o.value == value) {
            if !ordered.iter().any(|seen| seen.value == o.value) {
                ordered.push(o);
            }
        }
    }
    ordered.extend(options.iter().filter(|o| !is_selected(o)));

    let mut node = UiNode::element("select").attr("name", name);
    if placeholder {
        node = node.child(
            UiNode::element("option")
                .attr("value", "")
                .child(UiNode::text("")),
        );
    }
    node.children(ordered.into_iter().map(|o| {
        UiNode::element("option")
            .attr("value", o.value)
            .flag("selected", is_selected(o))
            .child(UiNode::text(o.label))
    }))
}

/// Repeatable rows with per-row remove, a row template and an add control
fn repeatable(name: &str, items: &[String], control: impl Fn(&str) -> UiNode) -> UiNode {
    let row = |item: &str| {
        UiNode::element("div")
            .attr("class", "repeatable-row")
            .child(control(item))
            .child(
                UiNode::element("button")
                    .attr("type", "button")
                    .attr("data-action", "remove-row")
                    .child(UiNode::text("Remove")),
            )
    };

    UiNode::element("div")
        .attr("class", "repeatable")
        .attr("id", name)
        .attr("data-name", name)
        .children(items.iter().map(|i| row(i.as_str())))
        .child(UiNode::element("template").child(row("")))
        .child(
            UiNode::element("button")
                .attr("type", "button")
                .attr("data-action", "add-row")
                .child(UiNode::text("Add")),
        )
}

// ============================================================================
// Submission
// ============================================================================

/// Collect the name/value pairs a browser would submit for `node`
///
/// Follows document order. Unchecked checkboxes, disabled controls, buttons
/// and `<template>` contents contribute nothing.
pub fn collect_submission(node: &UiNode) -> FormParams {
    let mut params = FormParams::new();
    collect_into(node, &mut params);
    params
}

fn collect_into(node: &UiNode, params: &mut FormParams) {
    let Some(tag) = node.tag() else {
        return;
    };
    if tag == "template" || node.has_attr("disabled") {
        return;
    }

    let name = node.get_attr("name").filter(|n| !n.is_empty());
    match (tag, name) {
        ("input", Some(name)) => {
            let kind = node.get_attr("type").unwrap_or("text");
            match kind {
                "checkbox" | "radio" => {
                    if node.has_attr("checked") {
                        params.push(name, node.get_attr("value").unwrap_or("on"));
                    }
                }
                "button" | "submit" | "reset" | "image" | "file" => {}
                _ => params.push(name, node.get_attr("value").unwrap_or("")),
            }
        }
        ("textarea", Some(name)) => params.push(name, node.text_content()),
        ("select", Some(name)) => {
            let options = node.find_all(&|n| n.tag() == Some("option"));
            let value_of = |o: &UiNode| {
                o.get_attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| o.text_content())
            };
            let selected: Vec<&UiNode> = options
                .iter()
                .copied()
                .filter(|o| o.has_attr("selected"))
                .collect();
            if node.has_attr("multiple") {
                for o in selected.iter().copied() {
                    params.push(name, value_of(o));
                }
            } else if let Some(o) = selected.last().or(options.first()).copied() {
                params.push(name, value_of(o));
            }
        }
        _ => {
            for child in node.child_nodes() {
                collect_into(child, params);
            }
        }
    }
}

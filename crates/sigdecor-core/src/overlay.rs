//! DOM-like node tree handed to the host's rendering pipeline

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use std::fmt::Write;

/// A node of the generated overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum OverlayNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<OverlayNode>,
    },
    Text {
        content: String,
    },
}

impl OverlayNode {
    pub fn element(tag: impl Into<String>) -> Self {
        OverlayNode::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        OverlayNode::Text {
            content: content.into(),
        }
    }

    /// Set an attribute, replacing an existing value. No-op on text nodes.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let OverlayNode::Element { attributes, .. } = &mut self {
            let name = name.into();
            let value = value.into();
            match attributes.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => attributes.push((name, value)),
            }
        }
        self
    }

    /// Set the inline `style` attribute from declarations
    pub fn style(self, declarations: &[(&str, String)]) -> Self {
        let css = declarations
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ");
        self.attr("style", css)
    }

    pub fn child(mut self, node: OverlayNode) -> Self {
        if let OverlayNode::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            OverlayNode::Element { tag, .. } => Some(tag),
            OverlayNode::Text { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            OverlayNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.as_str()),
            OverlayNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[OverlayNode] {
        match self {
            OverlayNode::Element { children, .. } => children,
            OverlayNode::Text { .. } => &[],
        }
    }

    /// Concatenated text content of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            OverlayNode::Text { content } => content.clone(),
            OverlayNode::Element { children, .. } => {
                children.iter().map(OverlayNode::text_content).collect()
            }
        }
    }

    /// Depth-first search for the first element carrying `class`
    pub fn find_by_class(&self, class: &str) -> Option<&OverlayNode> {
        let has_class = self
            .attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false);
        if has_class {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_by_class(class))
    }

    /// Serialize to HTML/SVG markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            OverlayNode::Text { content } => out.push_str(&encode_text(content)),
            OverlayNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(
                        out,
                        " {}=\"{}\"",
                        name,
                        encode_double_quoted_attribute(value)
                    );
                }
                if children.is_empty() && is_void_svg(tag) {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_markup(out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn is_void_svg(tag: &str) -> bool {
    matches!(tag, "path" | "line" | "circle" | "rect")
}

/// Format a coordinate compactly: integers without decimals, otherwise at
/// most two decimals with trailing zeros removed
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{:.0}", rounded);
    }
    let s = format!("{:.2}", rounded);
    s.trim_end_matches('0').to_string()
}

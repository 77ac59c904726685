//! Tag serialization seam.

use crate::types::{AttrValue, Attributes};

/// Serializes one tag. Implementations own the output dialect.
pub trait MarkupRenderer {
    /// Render `name` with `attrs`; `content` is the already-built inner markup.
    fn tag(&self, name: &str, attrs: &Attributes, content: Option<&str>) -> String;
}

const VOID_ELEMENTS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

/// Plain HTML5 serializer.
///
/// Attribute values are written verbatim: every value the form places is
/// escaped before it gets here. `Flag(true)` becomes a bare attribute and
/// `Flag(false)` is left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupRenderer for HtmlRenderer {
    fn tag(&self, name: &str, attrs: &Attributes, content: Option<&str>) -> String {
        let mut out = String::with_capacity(32 + content.map_or(0, str::len));
        out.push('<');
        out.push_str(name);
        for (key, value) in attrs {
            match value {
                AttrValue::Text(text) => {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(text);
                    out.push('"');
                }
                AttrValue::Flag(true) => {
                    out.push(' ');
                    out.push_str(key);
                }
                AttrValue::Flag(false) => {}
            }
        }

        if VOID_ELEMENTS.contains(&name) {
            out.push_str(" />");
            return out;
        }

        out.push('>');
        if let Some(content) = content {
            out.push_str(content);
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
        out
    }
}

//! Textual rendering of filter graphs

use super::{FilterNode, Param};

/// Target syntax for a serialized graph
pub trait Dialect {
    /// Render one node including its pin labels
    fn render_node(&self, node: &FilterNode) -> String;

    /// Text placed between rendered nodes
    fn separator(&self) -> &str;
}

/// ffmpeg `-filter_complex` syntax: `[in]name=a:k=v[out]`, chains joined by `;`
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterComplexDialect;

impl FilterComplexDialect {
    /// Quote a value when it contains filtergraph syntax characters
    pub fn escape_value(value: &str) -> String {
        let needs_quotes = value
            .chars()
            .any(|c| matches!(c, ',' | ':' | ';' | '[' | ']' | '\'' | '=') || c.is_whitespace());
        if needs_quotes {
            format!("'{}'", value.replace('\'', "'\\''"))
        } else {
            value.to_string()
        }
    }
}

impl Dialect for FilterComplexDialect {
    fn render_node(&self, node: &FilterNode) -> String {
        let mut out = String::new();
        for pin in node.inputs().iter().flatten() {
            out.push_str(&pin.to_string());
        }
        out.push_str(node.name());

        if !node.params().is_empty() {
            let args: Vec<String> = node
                .params()
                .iter()
                .map(|p| match p {
                    Param::Positional(v) => Self::escape_value(v),
                    Param::Keyed { key, value } => format!("{}={}", key, Self::escape_value(value)),
                })
                .collect();
            out.push('=');
            out.push_str(&args.join(":"));
        }

        for pin in node.outputs() {
            out.push_str(&pin.to_string());
        }
        out
    }

    fn separator(&self) -> &str {
        ";"
    }
}

//! Filter graph core
//!
//! A [`Graph`] is an append-only list of [`FilterNode`]s plus a registry of
//! input files. Nodes can only consume pins that already exist when they are
//! added, so list order is always a valid topological order and the
//! serializer never has to sort.
//!
//! Every [`Pin`] names exactly one stream and may feed exactly one input
//! slot. Fanning a stream out to several consumers needs an explicit
//! `split`/`asplit` node; [`Graph::connect`] and [`Graph::bind`] enforce it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::trace;

use crate::error::{GraphError, GraphResult};

pub mod serializer;

pub use serializer::{Dialect, FilterComplexDialect};

/// Elementary stream type of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Stream specifier used in input pin labels
    pub fn specifier(self) -> char {
        match self {
            StreamKind::Video => 'v',
            StreamKind::Audio => 'a',
        }
    }
}

/// Handle for one in-flight stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pin {
    /// A stream of a registered input file
    Input { index: usize, kind: StreamKind },
    /// An intermediate stream produced by a node
    Stream(u32),
    /// A fixed, externally mapped output label
    Label(String),
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pin::Input { index, kind } => write!(f, "[{}:{}]", index, kind.specifier()),
            Pin::Stream(n) => write!(f, "[s{}]", n),
            Pin::Label(label) => write!(f, "[{}]", label),
        }
    }
}

/// One filter argument
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Positional(String),
    Keyed { key: String, value: String },
}

/// Operation name and arguments of a node before it is placed in a graph
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    params: Vec<Param>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a `key=value` argument
    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push(Param::Keyed {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    /// Append a bare positional argument
    pub fn positional(mut self, value: impl ToString) -> Self {
        self.params.push(Param::Positional(value.to_string()));
        self
    }
}

/// Index of a node inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A placed filter with fixed input and output arity
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    name: String,
    params: Vec<Param>,
    inputs: Vec<Option<Pin>>,
    outputs: Vec<Pin>,
}

impl FilterNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn inputs(&self) -> &[Option<Pin>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Pin] {
        &self.outputs
    }

    /// Value of a keyed argument
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find_map(|p| match p {
            Param::Keyed { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Normalize a media path for identity comparison
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

/// Filter graph under construction
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<FilterNode>,
    inputs: Vec<String>,
    input_map: HashMap<String, usize>,
    consumed: HashSet<Pin>,
    next_stream: u32,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input file, returning its index.
    ///
    /// Paths are compared after normalization, so the same file reached via
    /// different separators is opened once.
    pub fn add_input(&mut self, path: &str) -> usize {
        let norm = normalize_path(path);
        if let Some(&index) = self.input_map.get(&norm) {
            return index;
        }
        let index = self.inputs.len();
        self.input_map.insert(norm.clone(), index);
        self.inputs.push(norm);
        index
    }

    /// Pin for one stream of an input file, registering the file if new
    pub fn input_stream(&mut self, path: &str, kind: StreamKind) -> Pin {
        let index = self.add_input(path);
        Pin::Input { index, kind }
    }

    /// Index of an already registered path
    pub fn input_index(&self, path: &str) -> Option<usize> {
        self.input_map.get(&normalize_path(path)).copied()
    }

    /// Registered inputs in first-seen order
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&FilterNode> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id.0))
    }

    /// Append a node whose outputs are fresh intermediate streams
    pub fn add_node(&mut self, filter: Filter, inputs: usize, outputs: usize) -> NodeId {
        let pins = (0..outputs).map(|_| self.fresh_pin()).collect();
        self.push(filter, inputs, pins)
    }

    /// Append a node writing to a fixed output label such as `vo`
    pub fn add_sink(&mut self, filter: Filter, inputs: usize, label: &str) -> NodeId {
        self.push(filter, inputs, vec![Pin::Label(label.to_string())])
    }

    /// Output pin `index` of a node
    pub fn output(&self, id: NodeId, index: usize) -> GraphResult<Pin> {
        let node = self.node(id)?;
        node.outputs
            .get(index)
            .cloned()
            .ok_or_else(|| GraphError::PinOutOfRange {
                node: node.name.clone(),
                direction: "output",
                index,
                arity: node.outputs.len(),
            })
    }

    /// Feed output `from_pin` of `from` into input slot `to_pin` of `to`
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_pin: usize,
        to_pin: usize,
    ) -> GraphResult<()> {
        let pin = self.output(from, from_pin)?;
        self.bind(to, to_pin, pin)
    }

    /// Feed an existing pin (input stream or node output) into a slot
    pub fn bind(&mut self, to: NodeId, slot: usize, pin: Pin) -> GraphResult<()> {
        let node = self.nodes.get_mut(to.0).ok_or(GraphError::UnknownNode(to.0))?;
        let arity = node.inputs.len();
        let entry = node
            .inputs
            .get_mut(slot)
            .ok_or_else(|| GraphError::PinOutOfRange {
                node: node.name.clone(),
                direction: "input",
                index: slot,
                arity,
            })?;
        if entry.is_some() {
            return Err(GraphError::SlotAlreadyBound {
                node: node.name.clone(),
                slot,
            });
        }
        if self.consumed.contains(&pin) {
            return Err(GraphError::PinAlreadyConsumed {
                pin: pin.to_string(),
            });
        }
        self.consumed.insert(pin.clone());
        *entry = Some(pin);
        Ok(())
    }

    /// Append a one-in, one-out filter fed by `input` and return its output
    pub fn pipe(&mut self, input: Pin, filter: Filter) -> GraphResult<Pin> {
        let id = self.add_node(filter, 1, 1);
        self.bind(id, 0, input)?;
        self.output(id, 0)
    }

    /// Append a fan-out node and return its output pins
    pub fn split(&mut self, input: Pin, kind: StreamKind, count: usize) -> GraphResult<Vec<Pin>> {
        let name = match kind {
            StreamKind::Video => "split",
            StreamKind::Audio => "asplit",
        };
        let id = self.add_node(Filter::new(name).positional(count), 1, count);
        self.bind(id, 0, input)?;
        (0..count).map(|i| self.output(id, i)).collect()
    }

    /// Render the graph in ffmpeg `-filter_complex` syntax
    pub fn serialize(&self) -> GraphResult<String> {
        self.serialize_with(&FilterComplexDialect)
    }

    /// Render the graph with an explicit dialect
    pub fn serialize_with(&self, dialect: &dyn Dialect) -> GraphResult<String> {
        for node in &self.nodes {
            if let Some(slot) = node.inputs.iter().position(|p| p.is_none()) {
                return Err(GraphError::UnboundInput {
                    node: node.name.clone(),
                    slot,
                });
            }
        }
        let rendered: Vec<String> = self
            .nodes
            .iter()
            .map(|node| {
                let text = dialect.render_node(node);
                trace!(node = %text, "serialized filter node");
                text
            })
            .collect();
        Ok(rendered.join(dialect.separator()))
    }

    fn fresh_pin(&mut self) -> Pin {
        let pin = Pin::Stream(self.next_stream);
        self.next_stream += 1;
        pin
    }

    fn push(&mut self, filter: Filter, inputs: usize, outputs: Vec<Pin>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FilterNode {
            name: filter.name,
            params: filter.params,
            inputs: vec![None; inputs],
            outputs,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_input_deduplicates_normalized_paths() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_input("C:\\media\\a.mp4"), 0);
        assert_eq!(graph.add_input("/media/b.mp4"), 1);
        assert_eq!(graph.add_input("C:/media/a.mp4"), 0);
        assert_eq!(graph.inputs(), &["C:/media/a.mp4", "/media/b.mp4"]);
    }

    #[test]
    fn input_stream_tags_kind_and_index() {
        let mut graph = Graph::new();
        graph.add_input("a.mp4");
        let pin = graph.input_stream("b.mp4", StreamKind::Audio);
        assert_eq!(pin, Pin::Input { index: 1, kind: StreamKind::Audio });
        assert_eq!(pin.to_string(), "[1:a]");
    }

    #[test]
    fn pins_are_numbered_per_graph() {
        let mut first = Graph::new();
        let a = first.add_node(Filter::new("nullsrc"), 0, 2);
        assert_eq!(first.output(a, 1).unwrap(), Pin::Stream(1));

        let mut second = Graph::new();
        let b = second.add_node(Filter::new("nullsrc"), 0, 1);
        assert_eq!(second.output(b, 0).unwrap(), Pin::Stream(0));
    }

    #[test]
    fn connect_rejects_out_of_range_pins() {
        let mut graph = Graph::new();
        let src = graph.add_node(Filter::new("color"), 0, 1);
        let dst = graph.add_node(Filter::new("null"), 1, 1);

        let err = graph.connect(src, dst, 1, 0).unwrap_err();
        assert!(matches!(err, GraphError::PinOutOfRange { direction: "output", .. }));

        let err = graph.connect(src, dst, 0, 3).unwrap_err();
        assert!(matches!(err, GraphError::PinOutOfRange { direction: "input", index: 3, .. }));

        assert!(graph.connect(src, dst, 0, 0).is_ok());
    }

    #[test]
    fn pins_feed_a_single_consumer() {
        let mut graph = Graph::new();
        let src = graph.add_node(Filter::new("color"), 0, 1);
        let first = graph.add_node(Filter::new("null"), 1, 1);
        let second = graph.add_node(Filter::new("null"), 1, 1);

        graph.connect(src, first, 0, 0).unwrap();
        let err = graph.connect(src, second, 0, 0).unwrap_err();
        assert!(matches!(err, GraphError::PinAlreadyConsumed { .. }));

        let err = graph.connect(second, first, 0, 0).unwrap_err();
        assert!(matches!(err, GraphError::SlotAlreadyBound { .. }));
    }

    #[test]
    fn split_gives_each_consumer_its_own_pin() {
        let mut graph = Graph::new();
        let src = graph.input_stream("a.mp4", StreamKind::Video);
        let outs = graph.split(src.clone(), StreamKind::Video, 2).unwrap();
        assert_eq!(outs.len(), 2);
        assert_ne!(outs[0], outs[1]);

        // the raw input is now owned by the split node
        assert!(graph.pipe(src, Filter::new("null")).is_err());
        assert!(graph.pipe(outs[0].clone(), Filter::new("null")).is_ok());
        assert!(graph.pipe(outs[1].clone(), Filter::new("null")).is_ok());
    }

    #[test]
    fn serialize_keeps_insertion_order() {
        let mut graph = Graph::new();
        let base = graph.add_node(Filter::new("color").arg("c", "black").arg("d", "5.000"), 0, 1);
        let out = graph.output(base, 0).unwrap();
        let sink = graph.add_sink(Filter::new("null"), 1, "vo");
        graph.bind(sink, 0, out).unwrap();

        assert_eq!(graph.serialize().unwrap(), "color=c=black:d=5.000[s0];[s0]null[vo]");
    }

    #[test]
    fn serialize_refuses_dangling_inputs() {
        let mut graph = Graph::new();
        graph.add_node(Filter::new("overlay"), 2, 1);
        let err = graph.serialize().unwrap_err();
        assert_eq!(
            err,
            GraphError::UnboundInput {
                node: "overlay".to_string(),
                slot: 0
            }
        );
    }

    #[test]
    fn node_param_lookup() {
        let mut graph = Graph::new();
        let id = graph.add_node(Filter::new("amix").arg("inputs", 3).positional("x"), 0, 1);
        let node = graph.node(id).unwrap();
        assert_eq!(node.param("inputs"), Some("3"));
        assert_eq!(node.param("missing"), None);
        assert!(graph.node(NodeId(9)).is_err());
    }
}

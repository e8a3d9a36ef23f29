//! Routing of shared input streams to mini-chains

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::GraphResult;
use crate::graph::{Graph, Pin, StreamKind};

/// Hands out one pin per mini-chain for each source file.
///
/// A file feeding a single chain binds its input stream directly. A file
/// feeding several chains gets one `split`/`asplit` node, emitted while the
/// router is prepared, and each chain takes the next output of that node.
#[derive(Debug)]
pub struct SourceRouter {
    kind: StreamKind,
    pools: HashMap<usize, VecDeque<Pin>>,
}

impl SourceRouter {
    /// Count uses per path and emit the fan-out nodes.
    ///
    /// `uses` lists one path per mini-chain in the order chains will be
    /// built. Inputs must already be registered on `graph`.
    pub fn prepare<'p, I>(graph: &mut Graph, kind: StreamKind, uses: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let mut order: Vec<usize> = Vec::new();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for path in uses {
            let index = graph.add_input(path);
            let count = counts.entry(index).or_insert(0);
            if *count == 0 {
                order.push(index);
            }
            *count += 1;
        }

        let mut pools = HashMap::new();
        for index in order {
            let count = counts.get(&index).copied().unwrap_or(0);
            if count < 2 {
                continue;
            }
            let source = Pin::Input { index, kind };
            let outputs = graph.split(source, kind, count)?;
            debug!(input = index, ?kind, count, "fanned out shared source");
            pools.insert(index, outputs.into_iter().collect());
        }

        Ok(Self { kind, pools })
    }

    /// Pin feeding the next mini-chain that reads `path`
    pub fn take(&mut self, graph: &mut Graph, path: &str) -> Pin {
        let index = graph.add_input(path);
        match self.pools.get_mut(&index).and_then(VecDeque::pop_front) {
            Some(pin) => pin,
            None => Pin::Input {
                index,
                kind: self.kind,
            },
        }
    }
}

//! Execution trace
//!
//! A forest of labelled tactic invocations. Labels are opened by
//! [`crate::Tactic::tagged`] and closed when the tagged computation
//! succeeds; a branch that fails takes its part of the trace with it.

use serde::Serialize;

/// One tactic invocation and what ran inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceNode {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TraceNode::size).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    roots: Vec<TraceNode>,
    #[serde(skip)]
    open: Vec<TraceNode>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf under the innermost open label
    pub fn record(&mut self, label: impl Into<String>) {
        self.attach(TraceNode::leaf(label));
    }

    pub(crate) fn enter(&mut self, label: impl Into<String>) {
        self.open.push(TraceNode::leaf(label));
    }

    pub(crate) fn leave(&mut self) {
        if let Some(node) = self.open.pop() {
            self.attach(node);
        }
    }

    fn attach(&mut self, node: TraceNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Completed top-level invocations
    pub fn nodes(&self) -> &[TraceNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first labels of every completed node
    pub fn labels(&self) -> Vec<String> {
        fn walk(node: &TraceNode, out: &mut Vec<String>) {
            out.push(node.label.clone());
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for node in &self.roots {
            walk(node, &mut out);
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.roots)
    }
}

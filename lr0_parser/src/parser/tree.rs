use std::fmt::{self, Display, Formatter};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::parser::{ParseError, Symbol};

/// A node of the concrete syntax tree, it owns its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNode {
    pub symbol: Symbol,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(symbol: Symbol, children: Vec<ParseNode>) -> Self {
        ParseNode { symbol, children }
    }

    pub fn leaf(symbol: Symbol) -> Self {
        ParseNode { symbol, children: Vec::new() }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf symbols from left to right.
    pub fn leaves(&self) -> Vec<&Symbol> {
        let mut res = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                res.push(&node.symbol);
            }
            stack.extend(node.children.iter().rev());
        }
        res
    }

    fn fmt_indented(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.symbol, indent = depth * 2)?;
        for child in self.children.iter() {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl Display for ParseNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Serialized as `{ name: [children...] }`, a leaf is `{ name: [] }`.
///
/// Only the name is kept: a terminal and a non-terminal named alike map to the same key, use
/// `Display` when the kind matters.
impl Serialize for ParseNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.symbol.name(), &self.children)?;
        map.end()
    }
}

/// Builds the tree while the parser shifts and reduces.
///
/// Every node that is not yet attached to a parent is either the active node (the last one
/// created) or in the node stack, so the count of pending nodes follows the parser state stack
/// (one less, the start state has no node).
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    node_stack: Vec<ParseNode>,
    active_node: Option<ParseNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// A terminal was shifted, it becomes the new active leaf.
    pub fn shift(&mut self, symbol: Symbol) {
        if let Some(node) = self.active_node.take() {
            self.node_stack.push(node);
        }
        self.active_node = Some(ParseNode::leaf(symbol));
    }

    /// The last `count` pending nodes become the children of a new `label` node.
    pub fn reduce(&mut self, label: Symbol, count: usize) -> Result<(), ParseError> {
        if count == 0 || self.active_node.is_none() || self.node_stack.len() < count - 1 {
            return Err(ParseError::TreeUnderflow { label, count });
        }

        let split = self.node_stack.len() - (count - 1);
        let mut children = self.node_stack.split_off(split);
        children.extend(self.active_node.take());

        self.active_node = Some(ParseNode::new(label, children));
        Ok(())
    }

    /// Count of nodes waiting for a parent (active node included).
    pub fn depth(&self) -> usize {
        self.node_stack.len() + self.active_node.is_some() as usize
    }

    pub fn active_node(&self) -> Option<&ParseNode> {
        self.active_node.as_ref()
    }

    pub fn finish(self) -> Option<ParseNode> {
        self.active_node
    }
}

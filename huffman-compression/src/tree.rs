use std::collections::BTreeMap;

use bit_vec::BitVec;
use itertools::Itertools;
use log::{debug, trace};

use crate::{
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
};

/// Index of a node inside [`HuffmanTree`]'s arena.
pub type NodeId = usize;

/// Huffman code of every symbol, left = `false` (0), right = `true` (1).
pub type CodeTable = BTreeMap<u8, BitVec>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight,
        }
    }

    /// The right-hand sibling synthesized for a single-symbol tree. It carries
    /// no code and is never produced by a valid stream.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Node::Leaf { weight: 0, .. })
    }
}

/// A prefix-code tree stored as an arena. Children always have a smaller index
/// than their parent and the root is the last node pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl HuffmanTree {
    pub fn new(frequencies: &FrequencyTable) -> Result<Self> {
        let mut nodes = Vec::with_capacity(frequencies.len() * 2);
        let mut queue = Queue::default();

        for (symbol, weight) in frequencies.iter() {
            queue.0.push(Pending {
                weight,
                id: nodes.len(),
            });
            nodes.push(Node::Leaf { symbol, weight });
        }

        let root = match frequencies.iter().exactly_one() {
            _ if nodes.is_empty() => return Err(HuffmanError::EmptyInput),
            Ok((symbol, weight)) => {
                nodes.push(Node::Leaf {
                    symbol: symbol.wrapping_add(1),
                    weight: 0,
                });
                nodes.push(Node::Internal {
                    weight,
                    left: 0,
                    right: 1,
                });
                2
            }
            Err(_) => {
                queue.sort();
                queue.merge(&mut nodes).ok_or(HuffmanError::EmptyInput)?
            }
        };

        let tree = Self { nodes, root };
        debug!(
            "built huffman tree with {} symbols, weight = {}, depth = {}",
            tree.symbol_count(),
            tree.weight(),
            tree.depth()
        );
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Follows one edge down from an internal node; `None` for leaves.
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.node(id) {
            Node::Internal { left, right, .. } => Some(if bit { *right } else { *left }),
            Node::Leaf { .. } => None,
        }
    }

    pub fn weight(&self) -> u64 {
        self.node(self.root).weight()
    }

    pub fn symbol_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }) && !node.is_placeholder())
            .count()
    }

    /// Length of the longest code.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            match self.node(id) {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Internal { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Walks every root-to-leaf path and records it as that leaf's code.
    pub fn codes(&self) -> CodeTable {
        let mut codes = CodeTable::new();
        let mut stack = vec![(self.root, BitVec::new())];

        while let Some((id, code)) = stack.pop() {
            match self.node(id) {
                node if node.is_placeholder() => {}
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, code);
                }
                Node::Internal { left, right, .. } => {
                    let mut right_code = code.clone();
                    right_code.push(true);
                    let mut left_code = code;
                    left_code.push(false);

                    stack.push((*right, right_code));
                    stack.push((*left, left_code));
                }
            }
        }

        codes
    }
}

/// A subtree waiting to be merged. Ordering is by weight, then by arena index,
/// which doubles as the insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    weight: u64,
    id: NodeId,
}

/// Subtrees sorted in descending order so the lowest sits at the end.
#[derive(Default)]
struct Queue(Vec<Pending>);

impl Queue {
    fn sort(&mut self) {
        self.0.sort_unstable_by(|a, b| b.cmp(a));
    }

    fn merge(mut self, nodes: &mut Vec<Node>) -> Option<NodeId> {
        loop {
            match self.pop_lowest()? {
                PopResult::TreesToMerge { left, right } => {
                    let weight = left.weight + right.weight;
                    let id = nodes.len();
                    trace!(
                        "merging node {} (weight {}) and node {} (weight {}) into node {id}",
                        left.id,
                        left.weight,
                        right.id,
                        right.weight
                    );
                    nodes.push(Node::Internal {
                        weight,
                        left: left.id,
                        right: right.id,
                    });

                    self.insert(Pending { weight, id });
                }
                PopResult::Single(pending) => {
                    return Some(pending.id);
                }
            }
        }
    }

    fn pop_lowest(&mut self) -> Option<PopResult> {
        let left = self.0.pop()?;

        let item_result = match self.0.pop() {
            Some(right) => PopResult::TreesToMerge { left, right },
            None => PopResult::Single(left),
        };

        Some(item_result)
    }

    fn insert(&mut self, pending: Pending) {
        self.0.push(pending);
        self.sort();
    }
}

enum PopResult {
    TreesToMerge { left: Pending, right: Pending },
    Single(Pending),
}

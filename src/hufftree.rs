use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::canonical::{CodeLengthTable, MAX_CODE_LENGTH};
use crate::error::{HuffmanError, Result};
use crate::frequency::{FrequencyTable, Symbol};
use crate::min_heap::MinHeap;

/// An optimal prefix tree. Only lives long enough to read code lengths off it.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        symbol: Symbol,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
    /// Placeholder sibling that gives a lone leaf a depth of 1.
    Vacant,
}

/// Heap slot. `order` is the insertion sequence number: leaves take 0..n in
/// ascending symbol order, merged nodes continue from n. Ties on weight go
/// to the lower sequence number, which makes the merge order total.
#[derive(Debug)]
struct QueuedNode {
    weight: u64,
    order: usize,
    node: HuffNode,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    /// Greedy minimum-weight merging until one node is left.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Self {
        let leaves: Vec<QueuedNode> = frequencies
            .iter()
            .enumerate()
            .map(|(order, (symbol, weight))| QueuedNode {
                weight,
                order,
                node: HuffNode::new(symbol, weight),
            })
            .collect();

        let mut next_order = leaves.len();
        let mut heap = MinHeap::build(leaves);

        while let Ok(x) = heap.extract_min() {
            let y = match heap.extract_min() {
                Ok(y) => y,
                Err(_) => return HuffmanTree::with_root(x.node),
            };
            heap.insert(QueuedNode {
                weight: x.weight + y.weight,
                order: next_order,
                node: HuffNode::merge(x.node, y.node),
            });
            next_order += 1;
        }

        HuffmanTree { root: HuffNode::Vacant }
    }

    fn with_root(root: HuffNode) -> Self {
        let root = match root {
            leaf @ HuffNode::Leaf { .. } => {
                let weight = leaf.weight();
                HuffNode::Internal {
                    weight,
                    left: Box::new(leaf),
                    right: Box::new(HuffNode::Vacant),
                }
            }
            other => other,
        };
        HuffmanTree { root }
    }

    /// Depth of every leaf, the root being depth 0.
    pub fn code_lengths(&self) -> Result<CodeLengthTable> {
        let mut lengths = Vec::new();
        self.root.collect_depths(0, &mut lengths);

        let mut table = CodeLengthTable::new();
        for (symbol, depth) in lengths {
            if depth > MAX_CODE_LENGTH as usize {
                return Err(HuffmanError::CodeTooLong {
                    length: depth,
                    max: MAX_CODE_LENGTH,
                });
            }
            table.insert(symbol, depth as u8);
        }
        debug!(
            symbols = table.len(),
            max_length = table.max_length(),
            "extracted code lengths"
        );
        Ok(table)
    }

    fn fmt_node(f: &mut fmt::Formatter<'_>, node: &HuffNode, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match node {
            HuffNode::Leaf { symbol, weight } => {
                writeln!(f, "{}{}-> Leaf: {} [weight: {}]", indent, label, symbol, weight)
            }
            HuffNode::Internal { weight, left, right } => {
                writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, weight)?;
                Self::fmt_node(f, left, depth + 1, "L")?;
                Self::fmt_node(f, right, depth + 1, "R")
            }
            HuffNode::Vacant => writeln!(f, "{}{}-> (vacant)", indent, label),
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_node(f, &self.root, 0, "root")
    }
}

impl HuffNode {
    pub fn new(symbol: Symbol, weight: u64) -> Self {
        HuffNode::Leaf { weight, symbol }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
            HuffNode::Vacant => 0,
        }
    }

    pub fn merge(a: Self, b: Self) -> Self {
        // a is the smaller node
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    fn collect_depths(&self, depth: usize, out: &mut Vec<(Symbol, usize)>) {
        match self {
            HuffNode::Leaf { symbol, .. } => out.push((*symbol, depth)),
            HuffNode::Internal { left, right, .. } => {
                left.collect_depths(depth + 1, out);
                right.collect_depths(depth + 1, out);
            }
            HuffNode::Vacant => {}
        }
    }
}

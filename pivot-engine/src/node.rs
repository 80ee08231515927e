//! FILENAME: pivot-engine/src/node.rs
//! Pivot Tree - grouped aggregation over an arena of nodes.
//!
//! Nodes live in a flat arena and are addressed by `NodeId`; parent and
//! child links are plain indices, so the parent back-reference never
//! forms an ownership cycle. A tree is built once per report, serialized,
//! and dropped - nodes are never freed individually, which keeps the
//! arena append-only.
//!
//! The correctness-critical piece is the private `update` walk: after a
//! value lands in a leaf, every ancestor re-derives its aggregate from
//! its direct children, bottom-up, so the root always carries the grand
//! total of all leaves.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::aggregate::Aggregator;
use crate::definition::{AggregationType, SortMode};
use crate::value::Value;

/// Index of a node inside its tree's arena.
pub type NodeId = u32;

/// The arena slot the root node always occupies.
pub const ROOT: NodeId = 0;

// ============================================================================
// NODE
// ============================================================================

/// One grouping node: a key at one level, its aggregator, and links to
/// its parent and ordered children.
///
/// A node is a leaf until its first child arrives; from then on its
/// aggregator is derived from the children and direct accumulation into
/// it is overwritten by the next recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotNode {
    /// Grouping key. `Empty` at the root, and for rows whose grouping
    /// field carried no value.
    key: Value,

    /// Explicit display label. Falls back to the stringified key.
    title: Option<String>,

    /// Ordering maintained over `children`. Inherited from the parent
    /// at creation.
    sort_mode: SortMode,

    /// This node's reducer.
    aggregator: Aggregator,

    /// Back-link used for traversal and recomputation only - never an
    /// ownership edge.
    parent: Option<NodeId>,

    /// Direct children, ordered per `sort_mode`.
    children: SmallVec<[NodeId; 8]>,
}

impl PivotNode {
    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Display label: the explicit title, else the stringified key.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self.key.to_string(),
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// A node with no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The single parentless node of a tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

// ============================================================================
// TREE
// ============================================================================

/// A pivot aggregation tree.
///
/// All operations are total: lookups report misses as `None`, and no
/// input can put the tree in an invalid state. `NodeId`s are only
/// meaningful for the tree that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotTree {
    nodes: Vec<PivotNode>,
}

impl PivotTree {
    /// Creates a tree holding only a root node.
    pub fn new(kind: AggregationType, sort: SortMode) -> Self {
        PivotTree {
            nodes: vec![PivotNode {
                key: Value::Empty,
                title: None,
                sort_mode: sort,
                aggregator: Aggregator::new(kind),
                parent: None,
                children: SmallVec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Borrows a node.
    pub fn node(&self, id: NodeId) -> &PivotNode {
        &self.nodes[id as usize]
    }

    /// Total number of nodes in the arena, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Direct children of `node`, in maintained order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node as usize].children
    }

    /// Number of direct children of `node`.
    pub fn count(&self, node: NodeId) -> usize {
        self.nodes[node as usize].children.len()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Appends a child under `parent`, respecting the parent's sort
    /// mode, and returns the new node.
    ///
    /// No key-uniqueness check is performed; callers wanting
    /// find-or-create semantics pair this with [`find`](Self::find).
    /// When `initial` is set it is folded into the new leaf and every
    /// ancestor aggregate recomputes immediately.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: AggregationType,
        key: Value,
        initial: Option<f64>,
    ) -> NodeId {
        let sort_mode = self.nodes[parent as usize].sort_mode;
        let id = self.nodes.len() as NodeId;
        self.nodes.push(PivotNode {
            key,
            title: None,
            sort_mode,
            aggregator: Aggregator::new(kind),
            parent: Some(parent),
            children: SmallVec::new(),
        });
        self.insert_child(parent, id);
        if initial.is_some() {
            self.add_value(id, initial);
        }
        id
    }

    /// Folds a value into `node`'s own aggregator, then recomputes every
    /// ancestor bottom-up. `None` leaves the aggregator untouched.
    ///
    /// Meaningful on leaves; a value folded into a node that already has
    /// children is overwritten by the recomputation pass.
    pub fn add_value(&mut self, node: NodeId, value: Option<f64>) {
        self.nodes[node as usize].aggregator.add(value);
        self.update(node);
    }

    /// Overrides the display label used by `titles` and serialization.
    pub fn set_title(&mut self, node: NodeId, title: impl Into<String>) {
        self.nodes[node as usize].title = Some(title.into());
    }

    /// Changes `node`'s child ordering. A real change re-sorts the
    /// children immediately; switching to `None` freezes the current
    /// order. Future insertions follow the new mode.
    pub fn set_sort_mode(&mut self, node: NodeId, mode: SortMode) {
        if self.nodes[node as usize].sort_mode == mode {
            return;
        }
        self.nodes[node as usize].sort_mode = mode;
        if mode == SortMode::None {
            return;
        }

        let mut children = std::mem::take(&mut self.nodes[node as usize].children);
        children.sort_by(|&a, &b| {
            let ordering = self.nodes[a as usize].key.compare(&self.nodes[b as usize].key);
            match mode {
                SortMode::Descending => ordering.reverse(),
                _ => ordering,
            }
        });
        self.nodes[node as usize].children = children;
    }

    /// Switches the aggregation kind for `node` and its whole subtree.
    ///
    /// Accumulated state is kept: the new kind reinterprets the data
    /// already folded in, so an existing tree can flip between e.g. sum
    /// and average without refolding its source rows.
    pub fn set_aggregation(&mut self, node: NodeId, kind: AggregationType) {
        self.nodes[node as usize].aggregator.set_kind(kind);
        for i in 0..self.nodes[node as usize].children.len() {
            let child = self.nodes[node as usize].children[i];
            self.set_aggregation(child, kind);
        }
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// First direct child of `node` whose key equals `key`. Equality is
    /// strict: an integer key never matches a float or text key.
    pub fn find(&self, node: NodeId, key: &Value) -> Option<NodeId> {
        self.nodes[node as usize]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child as usize].key == *key)
    }

    /// Walks [`find`](Self::find) down a key path starting at `node`.
    /// Returns `None` as soon as any level misses; an empty path yields
    /// `node` itself.
    pub fn find_by_keys(&self, node: NodeId, keys: &[Value]) -> Option<NodeId> {
        let mut current = node;
        for key in keys {
            current = self.find(current, key)?;
        }
        Some(current)
    }

    /// Depth-first search of the subtree below `node`: direct children
    /// first, then each child's subtree in order.
    pub fn find_recursive(&self, node: NodeId, key: &Value) -> Option<NodeId> {
        if let Some(found) = self.find(node, key) {
            return Some(found);
        }
        for i in 0..self.nodes[node as usize].children.len() {
            let child = self.nodes[node as usize].children[i];
            if let Some(found) = self.find_recursive(child, key) {
                return Some(found);
            }
        }
        None
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    /// Distance from the root: 0 at the root, one more per level down.
    pub fn level(&self, node: NodeId) -> usize {
        let mut level = 0;
        let mut current = self.nodes[node as usize].parent;
        while let Some(id) = current {
            level += 1;
            current = self.nodes[id as usize].parent;
        }
        level
    }

    /// Keys from the root (exclusive) down to `node` (inclusive).
    /// Empty at the root.
    pub fn keys(&self, node: NodeId) -> Vec<Value> {
        let mut keys = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current as usize].parent {
            keys.push(self.nodes[current as usize].key.clone());
            current = parent;
        }
        keys.reverse();
        keys
    }

    /// Display titles along the same path as [`keys`](Self::keys),
    /// falling back to stringified keys.
    pub fn titles(&self, node: NodeId) -> Vec<String> {
        let mut titles = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current as usize].parent {
            titles.push(self.nodes[current as usize].display_title());
            current = parent;
        }
        titles.reverse();
        titles
    }

    /// `/`-separated key path of `node`; just `/` at the root.
    pub fn path(&self, node: NodeId) -> String {
        let parts: Vec<String> = self.keys(node).iter().map(Value::to_string).collect();
        format!("/{}", parts.join("/"))
    }

    /// Every node in the subtree of `node` (itself included) whose
    /// absolute level equals `level`.
    pub fn level_children(&self, node: NodeId, level: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_level(node, self.level(node), level, &mut out);
        out
    }

    fn collect_level(&self, node: NodeId, node_level: usize, target: usize, out: &mut Vec<NodeId>) {
        if node_level == target {
            out.push(node);
        }
        for i in 0..self.nodes[node as usize].children.len() {
            let child = self.nodes[node as usize].children[i];
            self.collect_level(child, node_level + 1, target, out);
        }
    }

    /// Leaf nodes strictly below `node`, depth-first.
    pub fn last_children(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(node, &mut out);
        out
    }

    fn collect_leaves(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for i in 0..self.nodes[node as usize].children.len() {
            let child = self.nodes[node as usize].children[i];
            if self.nodes[child as usize].children.is_empty() {
                out.push(child);
            } else {
                self.collect_leaves(child, out);
            }
        }
    }

    /// Depth below `node`, measured along the first-child chain only.
    ///
    /// A ragged tree underreports here: sibling branches deeper than the
    /// first one are not inspected. Report trees are uniform-depth (one
    /// level per grouping field), where this equals the true maximum.
    pub fn deep_level(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(&first) = self.nodes[current as usize].children.first() {
            depth += 1;
            current = first;
        }
        depth
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    /// Inserts `child` into `parent`'s child list at the position its
    /// key demands. Ties keep insertion order.
    fn insert_child(&mut self, parent: NodeId, child: NodeId) {
        let position = {
            let parent_node = &self.nodes[parent as usize];
            match parent_node.sort_mode {
                SortMode::None => parent_node.children.len(),
                mode => {
                    let key = &self.nodes[child as usize].key;
                    parent_node.children.partition_point(|&existing| {
                        let ordering = self.nodes[existing as usize].key.compare(key);
                        match mode {
                            SortMode::Descending => ordering != std::cmp::Ordering::Less,
                            _ => ordering != std::cmp::Ordering::Greater,
                        }
                    })
                }
            }
        };
        self.nodes[parent as usize].children.insert(position, child);
    }

    /// Root-ward recomputation after a leaf mutation. Every visited node
    /// that has children resets its aggregator and folds the children
    /// back in, in child order; ancestors therefore always see
    /// already-updated child values.
    fn update(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            if !self.nodes[id as usize].children.is_empty() {
                let mut derived = Aggregator::new(self.nodes[id as usize].aggregator.kind());
                for i in 0..self.nodes[id as usize].children.len() {
                    let child = self.nodes[id as usize].children[i];
                    derived.merge(self.nodes[child as usize].aggregator());
                }
                self.nodes[id as usize].aggregator = derived;
            }
            current = self.nodes[id as usize].parent;
        }
    }
}

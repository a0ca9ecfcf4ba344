//! Parent/child task hierarchy assembled from a flat list.
//!
//! Tasks are persisted flat with a nullable `parent_id`. The tree is rebuilt on
//! read in two linear passes: index every node by id, then attach each node to
//! its parent. Nodes that cannot be reached from a root (missing parent or a
//! parent cycle) are returned separately instead of being dropped or looping.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Anything that can be placed in a parent/child hierarchy.
pub trait TreeNode {
    fn node_id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
}

/// A node together with its assembled children.
///
/// Serializes as the node's own fields plus a `children` array.
#[derive(Debug, Clone, Serialize)]
pub struct TaskTree<T> {
    #[serde(flatten)]
    pub node: T,
    pub children: Vec<TaskTree<T>>,
}

impl<T: TreeNode> TaskTree<T> {
    /// Number of nodes in this subtree, including the root.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TaskTree::len).sum::<usize>()
    }

    /// A subtree always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Result of [`build_forest`].
#[derive(Debug, Clone, Serialize)]
pub struct TaskForest<T> {
    /// Top-level nodes (no parent), each with its full subtree.
    pub roots: Vec<TaskTree<T>>,
    /// Nodes whose parent is absent from the input or that sit on a cycle.
    pub detached: Vec<T>,
}

/// Assemble a forest from a flat node list in O(n).
///
/// Children keep the relative order they had in `nodes`. A node listed twice
/// keeps its first occurrence; later duplicates are detached.
pub fn build_forest<T: TreeNode>(nodes: Vec<T>) -> TaskForest<T> {
    let mut index: HashMap<DbId, usize> = HashMap::with_capacity(nodes.len());
    let mut duplicates: HashSet<usize> = HashSet::new();
    for (i, node) in nodes.iter().enumerate() {
        if *index.entry(node.node_id()).or_insert(i) != i {
            duplicates.insert(i);
        }
    }

    let mut root_slots = Vec::new();
    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        if duplicates.contains(&i) {
            continue;
        }
        match node.parent_id() {
            None => root_slots.push(i),
            Some(parent) if parent == node.node_id() => {}
            Some(parent) => {
                if let Some(&p) = index.get(&parent) {
                    children_of.entry(p).or_default().push(i);
                }
            }
        }
    }

    let mut slots: Vec<Option<T>> = nodes.into_iter().map(Some).collect();
    let roots = root_slots
        .into_iter()
        .filter_map(|i| assemble(i, &mut slots, &children_of))
        .collect();
    let detached = slots.into_iter().flatten().collect();

    TaskForest { roots, detached }
}

fn assemble<T>(
    slot: usize,
    slots: &mut [Option<T>],
    children_of: &HashMap<usize, Vec<usize>>,
) -> Option<TaskTree<T>> {
    let node = slots[slot].take()?;
    let children = children_of
        .get(&slot)
        .map(|kids| {
            kids.iter()
                .filter_map(|&k| assemble(k, slots, children_of))
                .collect()
        })
        .unwrap_or_default();
    Some(TaskTree { node, children })
}

/// Depth-first search for `id` within a set of trees.
pub fn find<T: TreeNode>(roots: &[TaskTree<T>], id: DbId) -> Option<&TaskTree<T>> {
    for tree in roots {
        if tree.node.node_id() == id {
            return Some(tree);
        }
        if let Some(found) = find(&tree.children, id) {
            return Some(found);
        }
    }
    None
}

/// Ids from the root down to `id`, inclusive.
///
/// Returns `None` when `id` is unknown or its ancestor chain does not reach a
/// root (missing parent or cycle).
pub fn path_to<T: TreeNode>(nodes: &[T], id: DbId) -> Option<Vec<DbId>> {
    let by_id: HashMap<DbId, &T> = nodes.iter().map(|n| (n.node_id(), n)).collect();
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = *by_id.get(&id)?;

    loop {
        let current_id = current.node_id();
        if !seen.insert(current_id) {
            return None;
        }
        path.push(current_id);
        match current.parent_id() {
            None => break,
            Some(parent) => current = *by_id.get(&parent)?,
        }
    }

    path.reverse();
    Some(path)
}

/// Render a path as `"root/child/grandchild"`.
pub fn render_path(path: &[DbId]) -> String {
    path.iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

/// `id` followed by every descendant, breadth-first.
///
/// This is the set removed by a cascading delete. Unknown ids yield `[id]`.
pub fn descendant_ids<T: TreeNode>(nodes: &[T], id: DbId) -> Vec<DbId> {
    let mut children_of: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id() {
            children_of.entry(parent).or_default().push(node.node_id());
        }
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([id]);
    while let Some(next) = queue.pop_front() {
        if !seen.insert(next) {
            continue;
        }
        out.push(next);
        if let Some(kids) = children_of.get(&next) {
            queue.extend(kids.iter().copied());
        }
    }
    out
}

/// Nodes sharing `parent` (top-level nodes when `parent` is `None`).
pub fn siblings<T: TreeNode>(nodes: &[T], parent: Option<DbId>) -> Vec<&T> {
    nodes.iter().filter(|n| n.parent_id() == parent).collect()
}

/// Check that moving `task_id` under `new_parent` keeps the hierarchy acyclic.
pub fn validate_reparent<T: TreeNode>(
    nodes: &[T],
    task_id: DbId,
    new_parent: Option<DbId>,
) -> Result<(), CoreError> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if parent == task_id {
        return Err(CoreError::Validation(
            "A task cannot be its own parent".into(),
        ));
    }
    if !nodes.iter().any(|n| n.node_id() == parent) {
        return Err(CoreError::NotFound {
            entity: "Task",
            id: parent,
        });
    }
    if descendant_ids(nodes, task_id).contains(&parent) {
        return Err(CoreError::Validation(format!(
            "Task {parent} is a descendant of task {task_id}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Node {
        id: DbId,
        parent: Option<DbId>,
    }

    impl TreeNode for Node {
        fn node_id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent
        }
    }

    fn n(id: DbId, parent: Option<DbId>) -> Node {
        Node { id, parent }
    }

    fn count_occurrences(roots: &[TaskTree<Node>], id: DbId) -> usize {
        roots
            .iter()
            .map(|t| usize::from(t.node.id == id) + count_occurrences(&t.children, id))
            .sum()
    }

    #[test]
    fn roots_and_children_are_linked() {
        let forest = build_forest(vec![
            n(3, Some(1)),
            n(1, None),
            n(2, None),
            n(4, Some(3)),
            n(5, Some(1)),
        ]);

        assert_eq!(forest.roots.len(), 2);
        assert!(forest.detached.is_empty());
        let first = &forest.roots[0];
        assert_eq!(first.node.id, 1);
        let child_ids: Vec<_> = first.children.iter().map(|c| c.node.id).collect();
        assert_eq!(child_ids, vec![3, 5]);
        assert_eq!(first.children[0].children[0].node.id, 4);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn every_linked_node_appears_exactly_once() {
        let nodes = vec![
            n(1, None),
            n(2, Some(1)),
            n(3, Some(2)),
            n(4, Some(2)),
            n(5, Some(1)),
        ];
        let forest = build_forest(nodes.clone());
        for node in &nodes {
            assert_eq!(count_occurrences(&forest.roots, node.id), 1, "node {}", node.id);
        }
    }

    #[test]
    fn orphans_and_cycles_are_detached() {
        let forest = build_forest(vec![
            n(1, None),
            n(2, Some(99)),
            n(3, Some(4)),
            n(4, Some(3)),
            n(5, Some(5)),
        ]);

        assert_eq!(forest.roots.len(), 1);
        let detached: Vec<_> = forest.detached.iter().map(|d| d.id).collect();
        assert_eq!(detached, vec![2, 3, 4, 5]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let forest = build_forest(vec![n(1, None), n(2, Some(1)), n(1, None)]);
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.roots[0].children.len(), 1);
        assert_eq!(forest.detached.len(), 1);
    }

    #[test]
    fn find_searches_nested_levels() {
        let forest = build_forest(vec![n(1, None), n(2, Some(1)), n(3, Some(2))]);
        let found = find(&forest.roots, 3).expect("node 3 should be found");
        assert_eq!(found.node.id, 3);
        assert!(find(&forest.roots, 42).is_none());
    }

    #[test]
    fn path_runs_from_root_to_node() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(2))];
        let path = path_to(&nodes, 3).unwrap();
        assert_eq!(path, vec![1, 2, 3]);
        assert_eq!(render_path(&path), "1/2/3");
    }

    #[test]
    fn path_is_none_for_unknown_or_broken_chains() {
        let nodes = vec![n(1, Some(2)), n(2, Some(1)), n(3, Some(77))];
        assert!(path_to(&nodes, 1).is_none());
        assert!(path_to(&nodes, 3).is_none());
        assert!(path_to(&nodes, 10).is_none());
    }

    #[test]
    fn descendants_include_the_node_itself() {
        let nodes = vec![
            n(1, None),
            n(2, Some(1)),
            n(3, Some(2)),
            n(4, Some(1)),
            n(5, None),
        ];
        let mut ids = descendant_ids(&nodes, 1);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(descendant_ids(&nodes, 5), vec![5]);
    }

    #[test]
    fn descendants_terminate_on_cycles() {
        let nodes = vec![n(1, Some(2)), n(2, Some(1))];
        let mut ids = descendant_ids(&nodes, 1);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn siblings_filter_by_parent() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(1)), n(4, None)];
        let top: Vec<_> = siblings(&nodes, None).iter().map(|s| s.id).collect();
        assert_eq!(top, vec![1, 4]);
        let under_one: Vec<_> = siblings(&nodes, Some(1)).iter().map(|s| s.id).collect();
        assert_eq!(under_one, vec![2, 3]);
    }

    #[test]
    fn reparent_rejects_self_and_descendants() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(2)), n(4, None)];

        assert!(validate_reparent(&nodes, 2, None).is_ok());
        assert!(validate_reparent(&nodes, 2, Some(4)).is_ok());
        assert_matches!(
            validate_reparent(&nodes, 2, Some(2)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_reparent(&nodes, 1, Some(3)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_reparent(&nodes, 1, Some(99)),
            Err(CoreError::NotFound { id: 99, .. })
        );
    }

    #[test]
    fn tree_serializes_flattened_with_children() {
        let forest = build_forest(vec![n(1, None), n(2, Some(1))]);
        let json = serde_json::to_value(&forest.roots).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["children"][0]["id"], 2);
        assert_eq!(json[0]["children"][0]["children"], serde_json::json!([]));
    }
}

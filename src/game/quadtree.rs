//! Adaptive quadtree over entity positions
//!
//! Nodes live in a flat arena and reference each other by index; the
//! entity-to-node back-reference is a vid-keyed table rather than a pointer,
//! so the tree owns every cycle the structure would otherwise create.
//!
//! Leaves split into four equal quadrants when their bucket fills, unless the
//! region is already too small to usefully split, in which case the bucket
//! capacity grows instead. Child quadrants are half-open on their far edges so
//! a position on an internal seam lands in exactly one child.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::game::constants::tree::{MIN_SPLIT_EXTENT, NODE_CAPACITY};
use crate::game::entity::EntityKindTag;
use crate::game::vid::Vid;
use crate::game::WorldError;
use crate::util::vec2::Vec2;

/// Axis-aligned rectangle, origin + size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: far edges belong to the neighbour
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    /// Whether the circle at (cx, cy) overlaps this rectangle
    pub fn intersects_circle(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let nearest_x = cx.clamp(self.x, self.x + self.width);
        let nearest_y = cy.clamp(self.y, self.y + self.height);
        let dx = cx - nearest_x;
        let dy = cy - nearest_y;
        dx * dx + dy * dy <= radius * radius
    }

    /// Quadrant 0..4: NW, NE, SW, SE
    fn quadrant(&self, index: usize) -> Rect {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let (ox, oy) = match index {
            0 => (0.0, 0.0),
            1 => (hw, 0.0),
            2 => (0.0, hh),
            _ => (hw, hh),
        };
        Rect::new(self.x + ox, self.y + oy, hw, hh)
    }
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy)]
struct Entry {
    vid: Vid,
    position: Vec2,
    kind: EntityKindTag,
}

#[derive(Debug)]
struct Node {
    bounds: Rect,
    /// Adaptive bucket capacity; grows when the region is too small to split
    capacity: usize,
    entries: SmallVec<[Entry; NODE_CAPACITY]>,
    /// Four child quadrants once subdivided
    children: Option<[NodeId; 4]>,
}

impl Node {
    fn leaf(bounds: Rect, capacity: usize) -> Self {
        Self {
            bounds,
            capacity,
            entries: SmallVec::new(),
            children: None,
        }
    }
}

/// Spatial index over entity positions
pub struct QuadTree {
    nodes: Vec<Node>,
    /// Which node currently holds each tracked vid
    locations: HashMap<Vid, NodeId>,
    base_capacity: usize,
}

impl QuadTree {
    /// Fails fast on degenerate geometry or a zero bucket capacity.
    pub fn new(bounds: Rect, capacity: usize) -> Result<Self, WorldError> {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Err(WorldError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        if capacity == 0 {
            return Err(WorldError::InvalidCapacity(capacity));
        }
        Ok(Self {
            nodes: vec![Node::leaf(bounds, capacity)],
            locations: HashMap::new(),
            base_capacity: capacity,
        })
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[ROOT].bounds
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether `vid` is currently held by some node.
    pub fn tracks(&self, vid: Vid) -> bool {
        self.locations.contains_key(&vid)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts an entity at `position`. Returns false without mutating
    /// anything when the position lies outside the tree bounds.
    pub fn insert(&mut self, vid: Vid, kind: EntityKindTag, position: Vec2) -> bool {
        if !self.nodes[ROOT].bounds.contains(position) {
            return false;
        }
        let entry = Entry {
            vid,
            position,
            kind,
        };
        let mut node = ROOT;
        loop {
            node = self.descend(node, position);

            let (len, capacity, can_split) = {
                let n = &self.nodes[node];
                let can_split = n.bounds.width * 0.5 >= MIN_SPLIT_EXTENT
                    && n.bounds.height * 0.5 >= MIN_SPLIT_EXTENT;
                (n.entries.len(), n.capacity, can_split)
            };

            if len < capacity {
                self.nodes[node].entries.push(entry);
                self.locations.insert(vid, node);
                return true;
            }
            if can_split {
                self.subdivide(node);
                // retry from the now-subdivided node
                continue;
            }
            // Region too small to split: grow the bucket instead
            let grow = self.base_capacity;
            let n = &mut self.nodes[node];
            n.capacity += grow;
            n.entries.push(entry);
            self.locations.insert(vid, node);
            return true;
        }
    }

    /// Detaches an entity from whichever node holds it. False if untracked.
    pub fn remove(&mut self, vid: Vid) -> bool {
        let Some(node) = self.locations.remove(&vid) else {
            return false;
        };
        let entries = &mut self.nodes[node].entries;
        match entries.iter().position(|e| e.vid == vid) {
            Some(idx) => {
                entries.swap_remove(idx);
                true
            }
            None => {
                debug_assert!(false, "location table out of sync for vid {}", vid);
                false
            }
        }
    }

    /// Re-indexes an entity after a position change. No-op while the current
    /// node still contains the new position; otherwise removes and reinserts
    /// from the root. Inserts fresh if the entity was untracked.
    pub fn update_position(&mut self, vid: Vid, kind: EntityKindTag, position: Vec2) {
        match self.locations.get(&vid).copied() {
            Some(node) if self.nodes[node].bounds.contains(position) => {
                if let Some(entry) = self.nodes[node]
                    .entries
                    .iter_mut()
                    .find(|e| e.vid == vid)
                {
                    entry.position = position;
                }
            }
            Some(_) => {
                self.remove(vid);
                self.insert(vid, kind, position);
            }
            None => {
                self.insert(vid, kind, position);
            }
        }
    }

    /// Appends every tracked entity within `radius` of (cx, cy), optionally
    /// restricted to one entity kind, to a caller-owned buffer. The buffer is
    /// not cleared here; callers reuse and clear their own scratch.
    pub fn query_around(
        &self,
        out: &mut Vec<Vid>,
        cx: f32,
        cy: f32,
        radius: f32,
        filter: Option<EntityKindTag>,
    ) {
        self.query_node(ROOT, out, cx, cy, radius, radius * radius, filter);
    }

    /// Walks to the leaf (or smallest subdivided node's leaf) containing
    /// `position`, starting from `node`.
    fn descend(&self, mut node: NodeId, position: Vec2) -> NodeId {
        while let Some(children) = self.nodes[node].children {
            let mut next = children[3];
            for &child in &children {
                if self.nodes[child].bounds.contains(position) {
                    next = child;
                    break;
                }
            }
            node = next;
        }
        node
    }

    fn subdivide(&mut self, node: NodeId) {
        let bounds = self.nodes[node].bounds;
        let capacity = self.base_capacity;
        let first = self.nodes.len();
        for i in 0..4 {
            self.nodes.push(Node::leaf(bounds.quadrant(i), capacity));
        }
        let children = [first, first + 1, first + 2, first + 3];
        let entries = std::mem::take(&mut self.nodes[node].entries);
        self.nodes[node].children = Some(children);

        // Redistribute the bucket into the new quadrants
        for entry in entries {
            for &child in &children {
                if self.nodes[child].bounds.contains(entry.position) {
                    self.nodes[child].entries.push(entry);
                    self.locations.insert(entry.vid, child);
                    break;
                }
            }
        }
    }

    fn query_node(
        &self,
        node: NodeId,
        out: &mut Vec<Vid>,
        cx: f32,
        cy: f32,
        radius: f32,
        radius_sq: f32,
        filter: Option<EntityKindTag>,
    ) {
        let n = &self.nodes[node];
        if !n.bounds.intersects_circle(cx, cy, radius) {
            return;
        }
        if let Some(children) = n.children {
            for &child in &children {
                self.query_node(child, out, cx, cy, radius, radius_sq, filter);
            }
            return;
        }
        let center = Vec2::new(cx, cy);
        for entry in &n.entries {
            if let Some(kind) = filter {
                if entry.kind != kind {
                    continue;
                }
            }
            if entry.position.distance_sq_to(center) <= radius_sq {
                out.push(entry.vid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(width: f32, height: f32, capacity: usize) -> QuadTree {
        QuadTree::new(Rect::new(0.0, 0.0, width, height), capacity).unwrap()
    }

    fn query(tree: &QuadTree, cx: f32, cy: f32, radius: f32) -> Vec<Vid> {
        let mut out = Vec::new();
        tree.query_around(&mut out, cx, cy, radius, None);
        out
    }

    #[test]
    fn test_rejects_degenerate_bounds() {
        assert!(QuadTree::new(Rect::new(0.0, 0.0, 0.0, 100.0), 4).is_err());
        assert!(QuadTree::new(Rect::new(0.0, 0.0, 100.0, -1.0), 4).is_err());
        assert!(QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0).is_err());
    }

    #[test]
    fn test_insert_and_query() {
        let mut tree = tree(100.0, 100.0, 4);
        assert!(tree.insert(1, EntityKindTag::Player, Vec2::new(10.0, 10.0)));
        assert!(tree.tracks(1));

        let found = query(&tree, 10.0, 10.0, 5.0);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_out_of_bounds_insert_fails_without_mutation() {
        let mut tree = tree(100.0, 100.0, 4);
        assert!(!tree.insert(1, EntityKindTag::Other, Vec2::new(150.0, 10.0)));
        assert!(!tree.insert(2, EntityKindTag::Other, Vec2::new(-1.0, 10.0)));
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_remove_then_remove_again() {
        let mut tree = tree(100.0, 100.0, 4);
        tree.insert(7, EntityKindTag::Monster, Vec2::new(50.0, 50.0));

        assert!(tree.remove(7));
        assert!(query(&tree, 50.0, 50.0, 10.0).is_empty());
        assert!(!tree.remove(7));
    }

    #[test]
    fn test_subdivides_on_third_insert_with_capacity_two() {
        let mut tree = tree(100.0, 100.0, 2);
        assert!(tree.insert(1, EntityKindTag::Other, Vec2::new(25.0, 25.0)));
        assert!(tree.insert(2, EntityKindTag::Other, Vec2::new(30.0, 30.0)));
        assert_eq!(tree.node_count(), 1);

        assert!(tree.insert(3, EntityKindTag::Other, Vec2::new(35.0, 35.0)));

        // Root bucket emptied into four fresh quadrants
        assert!(tree.nodes[ROOT].children.is_some());
        assert!(tree.nodes[ROOT].entries.is_empty());

        let found = query(&tree, 30.0, 30.0, 20.0);
        assert_eq!(found.len(), 3);
        for vid in [1, 2, 3] {
            assert!(found.contains(&vid));
        }
    }

    #[test]
    fn test_small_region_grows_capacity_instead_of_splitting() {
        // 20x20 halves to 10, below MIN_SPLIT_EXTENT, so the node must never split
        let mut tree = tree(20.0, 20.0, 2);
        for vid in 0..10 {
            let pos = Vec2::new(1.0 + vid as f32, 1.0 + vid as f32);
            assert!(tree.insert(vid, EntityKindTag::Other, pos));
        }
        assert_eq!(tree.node_count(), 1);
        assert!(tree.nodes[ROOT].capacity >= 10);
        assert_eq!(query(&tree, 10.0, 10.0, 30.0).len(), 10);
    }

    #[test]
    fn test_type_filter() {
        let mut tree = tree(100.0, 100.0, 8);
        tree.insert(1, EntityKindTag::Player, Vec2::new(40.0, 40.0));
        tree.insert(2, EntityKindTag::Monster, Vec2::new(42.0, 40.0));
        tree.insert(3, EntityKindTag::Other, Vec2::new(44.0, 40.0));

        let mut out = Vec::new();
        tree.query_around(&mut out, 42.0, 40.0, 10.0, Some(EntityKindTag::Monster));
        assert_eq!(out, vec![2]);

        out.clear();
        tree.query_around(&mut out, 42.0, 40.0, 10.0, None);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_query_respects_radius() {
        let mut tree = tree(1000.0, 1000.0, 4);
        tree.insert(1, EntityKindTag::Other, Vec2::new(100.0, 100.0));
        tree.insert(2, EntityKindTag::Other, Vec2::new(500.0, 500.0));

        let found = query(&tree, 100.0, 100.0, 50.0);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_update_position_within_node_is_cheap() {
        let mut tree = tree(100.0, 100.0, 4);
        tree.insert(1, EntityKindTag::Player, Vec2::new(10.0, 10.0));
        let nodes_before = tree.node_count();

        tree.update_position(1, EntityKindTag::Player, Vec2::new(12.0, 12.0));

        assert_eq!(tree.node_count(), nodes_before);
        assert_eq!(query(&tree, 12.0, 12.0, 1.0), vec![1]);
        assert!(query(&tree, 10.0, 10.0, 1.0).is_empty());
    }

    #[test]
    fn test_update_position_across_nodes_reindexes() {
        let mut tree = tree(128.0, 128.0, 1);
        // Force a subdivision so movement crosses node boundaries
        tree.insert(1, EntityKindTag::Player, Vec2::new(10.0, 10.0));
        tree.insert(2, EntityKindTag::Player, Vec2::new(100.0, 100.0));
        assert!(tree.node_count() > 1);

        tree.update_position(1, EntityKindTag::Player, Vec2::new(90.0, 90.0));

        assert_eq!(query(&tree, 90.0, 90.0, 5.0), vec![1]);
        assert!(query(&tree, 10.0, 10.0, 5.0).is_empty());
    }

    #[test]
    fn test_update_position_untracked_inserts_fresh() {
        let mut tree = tree(100.0, 100.0, 4);
        tree.update_position(9, EntityKindTag::Monster, Vec2::new(20.0, 20.0));
        assert!(tree.tracks(9));
        assert_eq!(query(&tree, 20.0, 20.0, 1.0), vec![9]);
    }

    #[test]
    fn test_dense_inserts_stay_queryable() {
        let mut tree = tree(1024.0, 1024.0, 4);
        for vid in 0..200 {
            let x = (vid % 32) as f32 * 30.0 + 5.0;
            let y = (vid / 32) as f32 * 100.0 + 5.0;
            assert!(tree.insert(vid, EntityKindTag::Other, Vec2::new(x, y)));
        }
        assert_eq!(tree.len(), 200);

        let mut out = Vec::new();
        tree.query_around(&mut out, 512.0, 512.0, 2000.0, None);
        assert_eq!(out.len(), 200);
    }
}

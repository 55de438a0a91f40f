//! A map: one contiguous region of world space and everything alive in it
//!
//! The map owns the spatial index, the live-entity arena, and the two
//! cross-thread queues external gameplay logic enqueues into. Producers clone
//! the `Sender` handles; the tick thread is the only consumer, so nothing
//! else here needs locking.

use crossbeam_channel::{unbounded, Receiver, Sender};
use hashbrown::HashMap;

use crate::game::entity::Entity;
use crate::game::quadtree::{QuadTree, Rect};
use crate::game::terrain::TerrainQuery;
use crate::game::vid::Vid;
use crate::game::WorldError;
use crate::util::vec2::Vec2;

pub struct Map {
    name: String,
    bounds: Rect,
    pub tree: QuadTree,
    /// Live-entity arena; an entity is in here iff the tree tracks it
    pub entities: HashMap<Vid, Entity>,
    spawn_tx: Sender<Box<Entity>>,
    pub(crate) spawn_rx: Receiver<Box<Entity>>,
    removal_tx: Sender<Vid>,
    pub(crate) removal_rx: Receiver<Vid>,
    pub terrain: Option<Box<dyn TerrainQuery>>,
}

impl Map {
    pub fn new(
        name: impl Into<String>,
        origin: Vec2,
        width: f32,
        height: f32,
        node_capacity: usize,
    ) -> Result<Self, WorldError> {
        let bounds = Rect::new(origin.x, origin.y, width, height);
        let tree = QuadTree::new(bounds, node_capacity)?;
        let (spawn_tx, spawn_rx) = unbounded();
        let (removal_tx, removal_rx) = unbounded();
        Ok(Self {
            name: name.into(),
            bounds,
            tree,
            entities: HashMap::new(),
            spawn_tx,
            spawn_rx,
            removal_tx,
            removal_rx,
            terrain: None,
        })
    }

    pub fn with_terrain(mut self, terrain: Box<dyn TerrainQuery>) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.bounds.contains(pos)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Producer handle for enqueueing entities to spawn. Clonable, safe to
    /// call from any thread.
    pub fn spawn_queue(&self) -> Sender<Box<Entity>> {
        self.spawn_tx.clone()
    }

    /// Producer handle for enqueueing entities to remove.
    pub fn removal_queue(&self) -> Sender<Vid> {
        self.removal_tx.clone()
    }

    /// Establishes the symmetric nearby relation between two live entities.
    pub fn link_nearby(&mut self, a: Vid, b: Vid) {
        if let Some(entity) = self.entities.get_mut(&a) {
            entity.nearby.insert(b);
        }
        if let Some(entity) = self.entities.get_mut(&b) {
            entity.nearby.insert(a);
        }
    }

    /// Breaks the symmetric nearby relation between two entities.
    pub fn unlink_nearby(&mut self, a: Vid, b: Vid) {
        if let Some(entity) = self.entities.get_mut(&a) {
            entity.nearby.remove(&b);
        }
        if let Some(entity) = self.entities.get_mut(&b) {
            entity.nearby.remove(&a);
        }
    }

    /// Whether an entity could walk straight from `from` to `to`: the target
    /// is on the map, its cell does not block, and the straight path crosses
    /// no blocking cell. Maps without terrain data only bounds-check.
    pub fn is_walkable_path(&self, from: Vec2, to: Vec2) -> bool {
        if !self.bounds.contains(to) {
            return false;
        }
        match &self.terrain {
            Some(terrain) => {
                terrain.is_inside_map(to)
                    && !terrain.has_blocking_attribute(to)
                    && !terrain.has_blocking_attribute_on_path(from, to)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::{flags, TerrainGrid};

    fn test_map() -> Map {
        Map::new("test", Vec2::ZERO, 320.0, 320.0, 4).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_bounds() {
        assert!(Map::new("bad", Vec2::ZERO, 0.0, 100.0, 4).is_err());
        assert!(Map::new("bad", Vec2::ZERO, 100.0, -5.0, 4).is_err());
    }

    #[test]
    fn test_queues_are_multi_producer() {
        let map = test_map();
        let tx1 = map.spawn_queue();
        let tx2 = map.spawn_queue();

        let h1 = std::thread::spawn(move || {
            tx1.send(Box::new(Entity::other(1, 0, Vec2::new(1.0, 1.0)))).unwrap();
        });
        let h2 = std::thread::spawn(move || {
            tx2.send(Box::new(Entity::other(2, 0, Vec2::new(2.0, 2.0)))).unwrap();
        });
        h1.join().unwrap();
        h2.join().unwrap();

        let received: Vec<_> = map.spawn_rx.try_iter().collect();
        assert_eq!(received.len(), 2);
    }

    #[test]
    fn test_link_and_unlink_are_symmetric() {
        let mut map = test_map();
        map.entities.insert(1, Entity::other(1, 0, Vec2::ZERO));
        map.entities.insert(2, Entity::other(2, 0, Vec2::ONE));

        map.link_nearby(1, 2);
        assert!(map.entities[&1].nearby.contains(&2));
        assert!(map.entities[&2].nearby.contains(&1));

        map.unlink_nearby(1, 2);
        assert!(map.entities[&1].nearby.is_empty());
        assert!(map.entities[&2].nearby.is_empty());
    }

    #[test]
    fn test_walkable_path_without_terrain_is_bounds_only() {
        let map = test_map();
        assert!(map.is_walkable_path(Vec2::new(10.0, 10.0), Vec2::new(200.0, 200.0)));
        assert!(!map.is_walkable_path(Vec2::new(10.0, 10.0), Vec2::new(400.0, 10.0)));
    }

    #[test]
    fn test_walkable_path_respects_terrain() {
        let mut grid = TerrainGrid::new(Vec2::ZERO, 10, 10, 32.0).unwrap();
        for row in 0..10 {
            grid.set_flags(5, row, flags::BLOCK);
        }
        let map = test_map().with_terrain(Box::new(grid));

        let from = Vec2::new(16.0, 16.0);
        // Target on the far side of the wall: path blocked
        assert!(!map.is_walkable_path(from, Vec2::new(300.0, 16.0)));
        // Target on a blocking cell itself
        assert!(!map.is_walkable_path(from, Vec2::new(170.0, 16.0)));
        // Clear short hop
        assert!(map.is_walkable_path(from, Vec2::new(100.0, 16.0)));
    }
}

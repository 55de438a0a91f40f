//! Terrain passability queries
//!
//! The simulation only needs three questions answered: is a position on the
//! map, does its cell block movement, and does the straight line between two
//! positions cross a blocking cell. Loading real map data into a grid is a
//! loader concern; [`TerrainGrid`] is the in-memory shape that data lands in.

use crate::game::WorldError;
use crate::util::vec2::Vec2;

/// Per-cell attribute bits
pub mod flags {
    /// Movement through the cell is blocked
    pub const BLOCK: u8 = 0b0000_0001;
    /// Cell is water
    pub const WATER: u8 = 0b0000_0010;
    /// Safe zone, no combat
    pub const SAFE: u8 = 0b0000_0100;
}

/// Query surface for straight-line passability checks. No pathfinding.
pub trait TerrainQuery: Send + Sync {
    fn is_inside_map(&self, pos: Vec2) -> bool;
    fn has_blocking_attribute(&self, pos: Vec2) -> bool;
    fn has_blocking_attribute_on_path(&self, from: Vec2, to: Vec2) -> bool;
}

/// Cell-lattice bitmask over a rectangular region of world space.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    origin: Vec2,
    cols: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<u8>,
}

impl TerrainGrid {
    pub fn new(origin: Vec2, cols: usize, rows: usize, cell_size: f32) -> Result<Self, WorldError> {
        if cols == 0 || rows == 0 {
            return Err(WorldError::InvalidTerrain(format!(
                "grid must be non-empty, got {}x{}",
                cols, rows
            )));
        }
        if cell_size <= 0.0 {
            return Err(WorldError::InvalidTerrain(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        Ok(Self {
            origin,
            cols,
            rows,
            cell_size,
            cells: vec![0; cols * rows],
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_index(&self, pos: Vec2) -> Option<usize> {
        let dx = pos.x - self.origin.x;
        let dy = pos.y - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        let col = (dx / self.cell_size) as usize;
        let row = (dy / self.cell_size) as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row * self.cols + col)
    }

    /// Sets the attribute bits of one cell; used by loaders and tests.
    pub fn set_flags(&mut self, col: usize, row: usize, flag_bits: u8) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] |= flag_bits;
        }
    }

    /// Attribute bits at a world position, None when off-grid.
    pub fn flags_at(&self, pos: Vec2) -> Option<u8> {
        self.cell_index(pos).map(|idx| self.cells[idx])
    }
}

impl TerrainQuery for TerrainGrid {
    fn is_inside_map(&self, pos: Vec2) -> bool {
        self.cell_index(pos).is_some()
    }

    fn has_blocking_attribute(&self, pos: Vec2) -> bool {
        match self.flags_at(pos) {
            Some(bits) => bits & flags::BLOCK != 0,
            // Off-grid counts as blocked
            None => true,
        }
    }

    fn has_blocking_attribute_on_path(&self, from: Vec2, to: Vec2) -> bool {
        // Sample at half-cell steps so no cell along the segment is skipped
        let distance = from.distance_to(to);
        let step = self.cell_size * 0.5;
        let samples = (distance / step).ceil() as u32;
        for i in 0..=samples {
            let t = if samples == 0 {
                1.0
            } else {
                i as f32 / samples as f32
            };
            if self.has_blocking_attribute(from.lerp(to, t)) {
                return true;
            }
        }
        false
    }
}

//! Server-side world simulation for a 2D multiplayer game.
//!
//! A single tick thread owns all live game state. Entities are spawned and
//! removed through channels, indexed spatially in a quadtree, and players
//! receive appear/disappear/move notifications as their area of interest
//! changes from tick to tick.

pub mod config;
pub mod data;
pub mod game;
pub mod net;
pub mod util;

//! Tile spawner: the single source of randomness for a game
//!
//! Refills, rainbow colour picks and shuffles all draw from one seeded
//! ChaCha stream so a game can be replayed from its seed.

use crate::tile::{Cell, TileType};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(test)]
use std::collections::VecDeque;

/// Seeded tile generator
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: ChaCha8Rng,
    /// Tiles handed out before falling back to the rng
    #[cfg(test)]
    queue: VecDeque<TileType>,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    /// Create a spawner with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a spawner with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            #[cfg(test)]
            queue: VecDeque::new(),
        }
    }

    /// Queue specific tiles to be handed out next
    #[cfg(test)]
    pub fn preload(&mut self, tiles: impl IntoIterator<Item = TileType>) {
        self.queue.extend(tiles);
    }

    /// Next refill tile, uniform over the catalog
    pub fn next_tile(&mut self) -> TileType {
        if let Some(tile) = self.preloaded() {
            return tile;
        }
        TileType::ALL[self.rng.gen_range(0..TileType::ALL.len())]
    }

    #[cfg(test)]
    fn preloaded(&mut self) -> Option<TileType> {
        self.queue.pop_front()
    }

    #[cfg(not(test))]
    fn preloaded(&mut self) -> Option<TileType> {
        None
    }

    /// Pick one of `options` uniformly
    pub fn pick(&mut self, options: &[TileType]) -> Option<TileType> {
        options.choose(&mut self.rng).copied()
    }

    /// Uniform random permutation (Fisher-Yates) of the cells
    pub fn shuffle(&mut self, cells: &mut [Cell]) {
        cells.shuffle(&mut self.rng);
    }
}

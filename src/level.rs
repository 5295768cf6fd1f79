//! Level table

/// Score target and move budget of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub target: u64,
    pub moves: u32,
}

/// Levels in order of difficulty
pub const LEVELS: [Level; 5] = [
    Level { target: 500, moves: 15 },
    Level { target: 1000, moves: 20 },
    Level { target: 2000, moves: 25 },
    Level { target: 3500, moves: 30 },
    Level { target: 5000, moves: 35 },
];

impl Level {
    /// Level at `index`, clamped to the hardest one
    pub fn for_index(index: usize) -> Level {
        LEVELS[index.min(LEVELS.len() - 1)]
    }

    /// Whether winning `index` ends the run
    pub fn is_final(index: usize) -> bool {
        index >= LEVELS.len() - 1
    }

    /// Intro text shown before the first move
    pub fn description(&self) -> String {
        format!("Reach {} points in {} moves", self.target, self.moves)
    }
}

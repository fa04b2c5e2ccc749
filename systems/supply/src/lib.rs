#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ball-supply strategies that decide which balls arrive each turn and where
//! they land.

use std::collections::VecDeque;

use marble_lines_core::{BallSupply, Color, Location, Piece, PieceFactory, PlacedPiece};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Number of balls added to the board after each turn.
pub const DEFAULT_BALLS_PER_TURN: usize = 3;

/// Colors a supply draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    /// Every color is equally likely.
    Uniform,
    /// Every ball carries the same color.
    Fixed(Color),
}

/// Configuration parameters required to construct a random supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    balls_per_turn: usize,
    rng_seed: u64,
    palette: Palette,
}

impl Config {
    /// Creates a uniform-palette configuration with the provided turn size and seed.
    #[must_use]
    pub const fn new(balls_per_turn: usize, rng_seed: u64) -> Self {
        Self {
            balls_per_turn,
            rng_seed,
            palette: Palette::Uniform,
        }
    }

    /// Replaces the palette the supply draws colors from.
    #[must_use]
    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Number of balls produced per turn.
    #[must_use]
    pub const fn balls_per_turn(&self) -> usize {
        self.balls_per_turn
    }

    /// Seed feeding the placement and color generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Palette the supply draws colors from.
    #[must_use]
    pub const fn palette(&self) -> Palette {
        self.palette
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_BALLS_PER_TURN, 0)
    }
}

/// Seeded supply that picks colors from its palette and drops balls on
/// uniformly chosen empty cells.
#[derive(Debug)]
pub struct RandomSupply {
    balls_per_turn: usize,
    palette: Palette,
    rng: ChaCha8Rng,
}

impl RandomSupply {
    /// Creates a new random supply using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            balls_per_turn: config.balls_per_turn,
            palette: config.palette,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    fn next_color(&mut self) -> Color {
        match self.palette {
            Palette::Uniform => Color::ALL[self.rng.gen_range(0..Color::ALL.len())],
            Palette::Fixed(color) => color,
        }
    }
}

impl BallSupply for RandomSupply {
    fn next_balls_for_turn(&mut self, factory: &mut PieceFactory) -> Vec<Piece> {
        let mut pieces = Vec::with_capacity(self.balls_per_turn);
        for _ in 0..self.balls_per_turn {
            let color = self.next_color();
            pieces.push(factory.create(color));
        }
        debug!(count = pieces.len(), "drew balls for next turn");
        pieces
    }

    fn place_balls(&mut self, pieces: &[Piece], available: &[Location]) -> Vec<PlacedPiece> {
        let mut cells = available.to_vec();
        let mut placed = Vec::with_capacity(pieces.len().min(cells.len()));
        for &piece in pieces {
            if cells.is_empty() {
                break;
            }
            let index = self.rng.gen_range(0..cells.len());
            placed.push(PlacedPiece::new(piece, cells.swap_remove(index)));
        }
        placed
    }
}

/// Deterministic supply that cycles through a color script and fills cells in
/// a predictable order.
///
/// Each placed piece consumes the next queued target; when the target is not
/// available, the first available cell is used instead.
#[derive(Debug)]
pub struct ScriptedSupply {
    balls_per_turn: usize,
    colors: Vec<Color>,
    cursor: usize,
    targets: VecDeque<Location>,
}

impl ScriptedSupply {
    /// Creates a supply that produces `balls_per_turn` balls colored by cycling `colors`.
    ///
    /// An empty script yields red balls.
    #[must_use]
    pub fn new(balls_per_turn: usize, colors: Vec<Color>) -> Self {
        Self {
            balls_per_turn,
            colors,
            cursor: 0,
            targets: VecDeque::new(),
        }
    }

    /// Queues preferred landing cells, consumed one per placed piece.
    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = Location>) -> Self {
        self.targets.extend(targets);
        self
    }

    fn next_color(&mut self) -> Color {
        if self.colors.is_empty() {
            return Color::Red;
        }
        let color = self.colors[self.cursor % self.colors.len()];
        self.cursor = (self.cursor + 1) % self.colors.len();
        color
    }
}

impl BallSupply for ScriptedSupply {
    fn next_balls_for_turn(&mut self, factory: &mut PieceFactory) -> Vec<Piece> {
        let mut pieces = Vec::with_capacity(self.balls_per_turn);
        for _ in 0..self.balls_per_turn {
            let color = self.next_color();
            pieces.push(factory.create(color));
        }
        pieces
    }

    fn place_balls(&mut self, pieces: &[Piece], available: &[Location]) -> Vec<PlacedPiece> {
        let mut cells = available.to_vec();
        let mut placed = Vec::with_capacity(pieces.len().min(cells.len()));
        for &piece in pieces {
            if cells.is_empty() {
                break;
            }
            let preferred = self
                .targets
                .pop_front()
                .and_then(|target| cells.iter().position(|cell| *cell == target));
            let cell = cells.remove(preferred.unwrap_or(0));
            placed.push(PlacedPiece::new(piece, cell));
        }
        placed
    }
}

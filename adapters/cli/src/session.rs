//! Chains the turn-engine steps that a console turn runs without animation.

use anyhow::{Context, Result};
use marble_lines_core::{Event, Location, Phase};
use marble_lines_world::{query, World};
use tracing::{debug, info};

/// Result of a requested move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Turn {
    /// The move was played and the board settled.
    Played {
        /// Balls removed by completed lines during the turn.
        cleared: usize,
    },
    /// No ball stands on the source cell.
    NothingToSelect,
    /// The ball cannot travel to the destination.
    Blocked,
}

/// Owns the world and the event buffer its steps write into.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    events: Vec<Event>,
}

impl Session {
    pub(crate) fn new(world: World) -> Self {
        Self {
            world,
            events: Vec::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn is_over(&self) -> bool {
        query::phase(&self.world) == Phase::GameOver
    }

    /// Starts a new game and lands the first balls.
    pub(crate) fn restart(&mut self) -> Result<()> {
        self.events.clear();
        self.world
            .restart(&mut self.events)
            .context("failed to restart the game")?;
        self.world
            .finish_shooting_balls(&mut self.events)
            .context("failed to land the opening balls")?;
        self.world
            .next_move_or_end_game(&mut self.events)
            .context("failed to hand the first turn to the player")?;
        info!(
            pieces = query::grid(&self.world).all_pieces().count(),
            "new game started"
        );
        Ok(())
    }

    /// Moves the ball on `from` to `to` and runs the rest of the turn.
    pub(crate) fn play(&mut self, from: Location, to: Location) -> Result<Turn> {
        self.events.clear();
        if !self.world.select_ball(from, &mut self.events)? {
            return Ok(Turn::NothingToSelect);
        }
        if !self.world.start_move(to, &mut self.events)? {
            return Ok(Turn::Blocked);
        }

        self.world.finish_move(&mut self.events)?;
        if query::phase(&self.world) == Phase::ShootingNewBalls {
            self.world.finish_shooting_balls(&mut self.events)?;
        }
        self.world.next_move_or_end_game(&mut self.events)?;

        let cleared = self.cleared();
        debug!(events = self.events.len(), cleared, "turn settled");
        Ok(Turn::Played { cleared })
    }

    fn cleared(&self) -> usize {
        self.events
            .iter()
            .map(|event| match event {
                Event::PiecesRemoved { removed } => removed.len(),
                _ => 0,
            })
            .sum()
    }
}

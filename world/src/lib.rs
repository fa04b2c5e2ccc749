#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board and turn-engine state for Marble Lines.
//!
//! A turn runs through a fixed sequence of phases:
//!
//! ```text
//! WaitingForSelection --SelectBall--> BallSelected --StartMove--> BallMoving
//! BallMoving --FinishMove--> ClearingLines            (the move completed a line)
//! BallMoving --FinishMove--> ShootingNewBalls         (no line, new balls chosen)
//! ShootingNewBalls --FinishShootingBalls--> ClearingLines
//! ClearingLines / ShootingNewBalls --NextMoveOrEndGame--> WaitingForSelection | GameOver
//! ```
//!
//! Every operation runs to completion and reports its board and turn changes
//! through the caller's event buffer. Presentation layers animate on top of
//! the phase changes and call the next step when they are done.

use std::mem;

use marble_lines_core::{
    BallSupply, Color, Command, EngineError, Event, GridError, Location, Phase, Piece,
    PieceFactory, PlacedPiece,
};
use marble_lines_system_lines::LineDetector;
use tracing::{debug, instrument};

mod grid;
pub mod navigation;

pub use grid::Grid;

const DEFAULT_WIDTH: u32 = 9;
const DEFAULT_HEIGHT: u32 = 9;

/// Board dimensions used to construct a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    width: u32,
    height: u32,
}

impl Config {
    /// Creates a configuration for a `width` by `height` board.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of board columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of board rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Ball travelling between two cells while the engine is in [`Phase::BallMoving`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveInFlight {
    /// The travelling piece; it occupies neither cell until the move finishes.
    pub piece: Piece,
    /// Cell the piece left.
    pub from: Location,
    /// Cell the piece will land on.
    pub to: Location,
}

/// Represents the authoritative Marble Lines game state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    supply: Box<dyn BallSupply>,
    factory: PieceFactory,
    detector: LineDetector,
    phase: Phase,
    selected: Option<Location>,
    moving: Option<MoveInFlight>,
    pieces_to_clear: Vec<PlacedPiece>,
    pieces_to_shoot: Vec<PlacedPiece>,
    upcoming: Vec<Piece>,
}

impl World {
    /// Creates a world with an empty board waiting for a selection.
    ///
    /// Call [`World::restart`] to drop the first balls on the board.
    #[must_use]
    pub fn new(config: Config, supply: Box<dyn BallSupply>) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            supply,
            factory: PieceFactory::default(),
            detector: LineDetector::default(),
            phase: Phase::WaitingForSelection,
            selected: None,
            moving: None,
            pieces_to_clear: Vec::new(),
            pieces_to_shoot: Vec::new(),
            upcoming: Vec::new(),
        }
    }

    /// Mints a piece of `color` and places it on the empty `cell`.
    ///
    /// Used to set up positions; it bypasses the turn rules. The piece comes
    /// from the same factory as the supplied balls, so its identifier is
    /// unique on this board.
    pub fn add_piece(
        &mut self,
        color: Color,
        cell: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<Piece, EngineError> {
        if !self.grid.in_bounds(cell) {
            return Err(GridError::OutOfRange(cell).into());
        }
        if self.grid.is_occupied(cell) {
            return Err(GridError::OccupiedCell(cell).into());
        }

        let piece = self.factory.create(color);
        self.grid.add(piece, cell, out_events)?;
        Ok(piece)
    }

    /// Clears the board and turn state, then chooses cells for the first balls.
    ///
    /// A ball still travelling is reported as removed from the cell it left.
    /// Leaves the engine in [`Phase::ShootingNewBalls`].
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn restart(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        self.change_selection(None, out_events)?;
        let travelling = self
            .moving
            .take()
            .map(|flight| PlacedPiece::new(flight.piece, flight.from));
        self.grid.clear_with(travelling, out_events);
        self.pieces_to_clear.clear();
        self.pieces_to_shoot.clear();
        self.upcoming = self.supply.next_balls_for_turn(&mut self.factory);
        self.shoot(out_events)
    }

    /// Selects the ball on `cell`.
    ///
    /// Returns `false`, leaving the state untouched, when the cell is off the
    /// board or empty.
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn select_ball(
        &mut self,
        cell: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, EngineError> {
        self.ensure_phase(
            "SelectBall",
            &[Phase::WaitingForSelection, Phase::BallSelected],
        )?;

        if !self.grid.is_occupied(cell) {
            return Ok(false);
        }

        self.change_selection(Some(cell), out_events)?;
        self.set_phase(Phase::BallSelected, out_events);
        Ok(true)
    }

    /// Sends the selected ball toward `destination`.
    ///
    /// Returns `false` when the destination cannot be reached. On success the
    /// ball leaves the board until [`World::finish_move`] lands it.
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn start_move(
        &mut self,
        destination: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, EngineError> {
        self.ensure_phase("StartMove", &[Phase::BallSelected])?;

        let selected = self.selected_piece().ok_or(EngineError::NoSelection)?;
        if !self.can_move(selected.location, destination) {
            return Ok(false);
        }

        self.change_selection(None, out_events)?;
        let piece = self.grid.lift(selected.location)?;
        self.moving = Some(MoveInFlight {
            piece,
            from: selected.location,
            to: destination,
        });
        self.set_phase(Phase::BallMoving, out_events);
        Ok(true)
    }

    /// Lands the moving ball and looks for lines it completed.
    ///
    /// Enters [`Phase::ClearingLines`] when lines were found; otherwise new
    /// balls are chosen immediately and the engine enters
    /// [`Phase::ShootingNewBalls`].
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn finish_move(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        self.ensure_phase("FinishMove", &[Phase::BallMoving])?;

        let flight = self.moving.take().ok_or(EngineError::NoMoveInFlight)?;
        if let Err(error) = self
            .grid
            .land(flight.piece, flight.from, flight.to, out_events)
        {
            self.moving = Some(flight);
            return Err(error.into());
        }

        self.mark_lines(&[flight.to])?;
        if self.pieces_to_clear.is_empty() {
            self.shoot(out_events)
        } else {
            self.set_phase(Phase::ClearingLines, out_events);
            Ok(())
        }
    }

    /// Removes cleared balls and chooses cells for the upcoming balls.
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn shoot_new_balls(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        self.ensure_phase("ShootNewBalls", &[Phase::BallMoving])?;
        if self.moving.is_some() {
            return Err(EngineError::MoveInFlight);
        }
        self.shoot(out_events)
    }

    /// Places the shot balls and marks the lines they completed.
    ///
    /// Any selection is dropped and a ball still travelling lands first, so
    /// no turn state outlives the phase change. Lines already marked stay
    /// marked. Always enters [`Phase::ClearingLines`], even when nothing is
    /// marked.
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn finish_shooting_balls(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        self.change_selection(None, out_events)?;

        let shots = mem::take(&mut self.pieces_to_shoot);
        let mut landed = Vec::with_capacity(shots.len() + 1);
        if let Some(flight) = self.moving.take() {
            if let Err(error) = self
                .grid
                .land(flight.piece, flight.from, flight.to, out_events)
            {
                self.moving = Some(flight);
                self.pieces_to_shoot = shots;
                return Err(error.into());
            }
            landed.push(flight.to);
        }

        for shot in shots {
            self.grid.add(shot.piece, shot.location, out_events)?;
            landed.push(shot.location);
        }

        self.mark_lines(&landed)?;
        self.set_phase(Phase::ClearingLines, out_events);
        Ok(())
    }

    /// Removes marked lines, prepares the next balls and either hands the turn
    /// back to the player or ends the game when the board is full.
    #[instrument(level = "debug", skip(self, out_events))]
    pub fn next_move_or_end_game(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        self.ensure_phase(
            "NextMoveOrEndGame",
            &[Phase::ShootingNewBalls, Phase::ClearingLines],
        )?;

        self.clear_marked(out_events)?;
        self.upcoming = self.supply.next_balls_for_turn(&mut self.factory);

        for shot in mem::take(&mut self.pieces_to_shoot) {
            self.grid.add(shot.piece, shot.location, out_events)?;
        }

        if self.grid.is_full() {
            self.set_phase(Phase::GameOver, out_events);
        } else {
            self.set_phase(Phase::WaitingForSelection, out_events);
        }
        Ok(())
    }

    fn shoot(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        self.clear_marked(out_events)?;

        let empty: Vec<Location> = self.grid.empty_cells().collect();
        let placed = self.supply.place_balls(&self.upcoming, &empty);
        debug!(shots = placed.len(), free = empty.len(), "chose cells for new balls");
        self.pieces_to_shoot.extend(placed);

        self.set_phase(Phase::ShootingNewBalls, out_events);
        Ok(())
    }

    fn clear_marked(&mut self, out_events: &mut Vec<Event>) -> Result<(), EngineError> {
        let cells: Vec<Location> = mem::take(&mut self.pieces_to_clear)
            .into_iter()
            .map(|placed| placed.location)
            .collect();
        self.grid.remove_many(&cells, out_events)?;
        Ok(())
    }

    fn mark_lines(&mut self, anchors: &[Location]) -> Result<(), EngineError> {
        let cells = self.detector.complete_lines_from(&self.grid, anchors)?;
        for cell in cells {
            if self.pieces_to_clear.iter().any(|marked| marked.location == cell) {
                continue;
            }
            if let Some(piece) = self.grid.get(cell)? {
                self.pieces_to_clear.push(PlacedPiece::new(piece, cell));
            }
        }

        if !self.pieces_to_clear.is_empty() {
            debug!(marked = self.pieces_to_clear.len(), "marked completed lines");
        }
        Ok(())
    }

    fn can_move(&self, from: Location, to: Location) -> bool {
        if !self.grid.in_bounds(from) || !self.grid.in_bounds(to) {
            return false;
        }
        if !self.grid.is_occupied(from) || self.grid.is_occupied(to) {
            return false;
        }

        navigation::can_reach(self.grid.width(), self.grid.height(), from, to, |cell| {
            self.grid.is_occupied(cell)
        })
    }

    fn selected_piece(&self) -> Option<PlacedPiece> {
        let cell = self.selected?;
        let piece = self.grid.get(cell).ok().flatten()?;
        Some(PlacedPiece::new(piece, cell))
    }

    fn change_selection(
        &mut self,
        selection: Option<Location>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), EngineError> {
        if self.selected == selection {
            return Ok(());
        }

        let previous = self.selected_piece();
        let current = match selection {
            Some(cell) => {
                let piece = self.grid.get(cell)?.ok_or(EngineError::NoSelection)?;
                Some(PlacedPiece::new(piece, cell))
            }
            None => None,
        };

        self.selected = selection;
        out_events.push(Event::SelectionChanged { previous, current });
        Ok(())
    }

    fn ensure_phase(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), EngineError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(EngineError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn set_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }

        let previous = mem::replace(&mut self.phase, phase);
        debug!(?previous, current = ?phase, "phase changed");
        out_events.push(Event::PhaseChanged {
            previous,
            current: phase,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Returns `Ok(false)` when a selection or move request was refused as a
/// normal gameplay outcome, and `Ok(true)` otherwise.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<bool, EngineError> {
    match command {
        Command::Restart => world.restart(out_events).map(|()| true),
        Command::SelectBall { cell } => world.select_ball(cell, out_events),
        Command::StartMove { destination } => world.start_move(destination, out_events),
        Command::FinishMove => world.finish_move(out_events).map(|()| true),
        Command::ShootNewBalls => world.shoot_new_balls(out_events).map(|()| true),
        Command::FinishShootingBalls => world.finish_shooting_balls(out_events).map(|()| true),
        Command::NextMoveOrEndGame => world.next_move_or_end_game(out_events).map(|()| true),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use marble_lines_core::{Location, Phase, Piece, PlacedPiece};

    use super::{navigation, Grid, MoveInFlight, World};

    /// Current phase of the turn engine.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Selected ball and its cell, if any.
    #[must_use]
    pub fn selected_piece(world: &World) -> Option<PlacedPiece> {
        world.selected_piece()
    }

    /// Ball currently travelling between cells, if any.
    #[must_use]
    pub fn moving_piece(world: &World) -> Option<MoveInFlight> {
        world.moving
    }

    /// Balls marked for removal by the last line search.
    #[must_use]
    pub fn pieces_to_clear(world: &World) -> &[PlacedPiece] {
        &world.pieces_to_clear
    }

    /// Balls chosen for the board and waiting to be placed.
    #[must_use]
    pub fn pieces_to_shoot(world: &World) -> &[PlacedPiece] {
        &world.pieces_to_shoot
    }

    /// Balls that will be shot after the next move.
    #[must_use]
    pub fn upcoming_pieces(world: &World) -> &[Piece] {
        &world.upcoming
    }

    /// Reports whether the ball on `from` could move to the empty cell `to`.
    #[must_use]
    pub fn can_move(world: &World, from: Location, to: Location) -> bool {
        world.can_move(from, to)
    }

    /// Reports whether the selected ball could move to `to`.
    #[must_use]
    pub fn can_move_selected(world: &World, to: Location) -> bool {
        world
            .selected_piece()
            .map_or(false, |selected| world.can_move(selected.location, to))
    }

    /// Cells a ball standing on `from` could travel to.
    #[must_use]
    pub fn available_moves(world: &World, from: Location) -> Vec<Location> {
        let grid = &world.grid;
        navigation::reachable_from(grid.width(), grid.height(), from, |cell| {
            grid.is_occupied(cell)
        })
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Marble Lines engine.
//!
//! This crate defines the value types and message surface that connect
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing the next step of a turn, the world executes
//! them via its `apply` entry point, and reports every board and turn change
//! as [`Event`] values in the order they happened. Systems read the board
//! through [`ColorLookup`] and the world obtains new balls exclusively through
//! a [`BallSupply`] strategy.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single board cell expressed as column and row coordinates.
///
/// Coordinates are signed so that searches may step past the board edge; the
/// grid decides whether a location lies inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    /// Creates a new board location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the location.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the location.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the location displaced by the provided step.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Colors a ball may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    /// Red ball.
    Red,
    /// Green ball.
    Green,
    /// Blue ball.
    Blue,
    /// Cyan ball.
    Cyan,
    /// Yellow ball.
    Yellow,
    /// Brown ball.
    Brown,
    /// Magenta ball.
    Magenta,
}

impl Color {
    /// Every color in declaration order.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Cyan,
        Color::Yellow,
        Color::Brown,
        Color::Magenta,
    ];

    /// Position of the color within [`Color::ALL`].
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Cyan => 3,
            Self::Yellow => 4,
            Self::Brown => 5,
            Self::Magenta => 6,
        }
    }

    /// Lowercase name used by adapters and configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::Brown => "brown",
            Self::Magenta => "magenta",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reported when a color name does not match any [`Color`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown ball color `{0}`")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Color::ALL
            .into_iter()
            .find(|color| color.name() == normalized)
            .ok_or_else(|| UnknownColor(value.to_owned()))
    }
}

/// Unique identifier assigned to a piece when it is minted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// A ball carrying exactly one color.
///
/// The identifier stays with the piece while it is queued, placed, selected,
/// moved and finally removed, so observers can track it across events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    color: Color,
}

impl Piece {
    /// Creates a piece with an explicit identifier.
    #[must_use]
    pub const fn new(id: PieceId, color: Color) -> Self {
        Self { id, color }
    }

    /// Identifier of the piece.
    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    /// Color carried by the piece.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

/// Mints pieces with identifiers that are unique per factory.
///
/// Identifiers from two factories may collide, so every piece that shares a
/// board must come from the same factory. The world owns that factory and
/// lends it to its ball supply.
#[derive(Clone, Debug, Default)]
pub struct PieceFactory {
    next_id: u32,
}

impl PieceFactory {
    /// Creates a factory whose first piece receives the provided identifier.
    #[must_use]
    pub const fn starting_at(first_id: u32) -> Self {
        Self { next_id: first_id }
    }

    /// Creates a new piece of the requested color.
    pub fn create(&mut self, color: Color) -> Piece {
        let id = PieceId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Piece::new(id, color)
    }
}

/// Pairing of a piece with the cell it occupies or is about to occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedPiece {
    /// The piece itself.
    pub piece: Piece,
    /// Cell associated with the piece.
    pub location: Location,
}

impl PlacedPiece {
    /// Pairs a piece with a location.
    #[must_use]
    pub const fn new(piece: Piece, location: Location) -> Self {
        Self { piece, location }
    }
}

/// Stage of the turn life-cycle the engine currently occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The player may pick a ball.
    #[default]
    WaitingForSelection,
    /// A ball is selected and may be moved or replaced by another selection.
    BallSelected,
    /// A ball has left its cell and travels toward its destination.
    BallMoving,
    /// Completed lines are marked and wait for removal.
    ClearingLines,
    /// New balls are chosen and wait to be placed on the board.
    ShootingNewBalls,
    /// The board is full; only a restart is possible.
    GameOver,
}

/// Commands that express every permissible turn-engine step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Clears the board and starts a new game.
    Restart,
    /// Requests selection of the ball on the provided cell.
    SelectBall {
        /// Cell holding the ball to select.
        cell: Location,
    },
    /// Requests that the selected ball starts moving toward the destination.
    StartMove {
        /// Empty cell the selected ball should travel to.
        destination: Location,
    },
    /// Lands the moving ball and searches for completed lines.
    FinishMove,
    /// Removes cleared balls and chooses cells for the upcoming balls.
    ShootNewBalls,
    /// Places the shot balls and searches for lines they completed.
    FinishShootingBalls,
    /// Completes the turn, ending the game when the board is full.
    NextMoveOrEndGame,
}

/// Events emitted by the grid and turn engine, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A piece appeared on the board.
    PieceAdded {
        /// The piece and the cell it now occupies.
        placed: PlacedPiece,
    },
    /// A piece travelled between two cells.
    PieceMoved {
        /// The piece that moved.
        piece: Piece,
        /// Cell the piece left.
        from: Location,
        /// Cell the piece now occupies.
        to: Location,
    },
    /// One or more pieces were removed from the board.
    PiecesRemoved {
        /// Removed pieces paired with the cells they occupied.
        removed: Vec<PlacedPiece>,
    },
    /// The selected piece changed.
    SelectionChanged {
        /// Selection before the change.
        previous: Option<PlacedPiece>,
        /// Selection after the change.
        current: Option<PlacedPiece>,
    },
    /// The turn engine entered a new phase.
    PhaseChanged {
        /// Phase that was left.
        previous: Phase,
        /// Phase that became active.
        current: Phase,
    },
}

/// Read-only color view over a rectangular board.
pub trait ColorLookup {
    /// Board dimensions as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Color of the piece on the cell, or `None` for empty or out-of-range cells.
    fn color_at(&self, cell: Location) -> Option<Color>;

    /// Reports whether the cell lies on the board.
    fn contains(&self, cell: Location) -> bool {
        let (width, height) = self.dimensions();
        in_bounds(cell, width, height)
    }
}

/// Strategy that supplies the balls added to the board after each turn.
pub trait BallSupply: fmt::Debug {
    /// Produces the pieces shown to the player for the next refill, minting
    /// them from the board's factory.
    fn next_balls_for_turn(&mut self, factory: &mut PieceFactory) -> Vec<Piece>;

    /// Assigns each piece, in order, a distinct cell taken from `available`.
    ///
    /// Stops early when the available cells run out.
    fn place_balls(&mut self, pieces: &[Piece], available: &[Location]) -> Vec<PlacedPiece>;
}

/// Reports whether `cell` lies inside a `width` by `height` board.
#[must_use]
pub fn in_bounds(cell: Location, width: u32, height: u32) -> bool {
    let (Ok(x), Ok(y)) = (u32::try_from(cell.x()), u32::try_from(cell.y())) else {
        return false;
    };
    x < width && y < height
}

/// Reasons a grid mutation or lookup may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The location lies outside the board.
    #[error("location {0} lies outside the board")]
    OutOfRange(Location),
    /// The target cell already holds a piece.
    #[error("cell {0} is already occupied")]
    OccupiedCell(Location),
    /// The source cell holds no piece.
    #[error("cell {0} holds no piece")]
    EmptySource(Location),
}

/// Failures raised by the line detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum LineError {
    /// The anchor cell carries no color.
    #[error("line search anchored at empty cell {0}")]
    EmptyAnchor(Location),
    /// Reconstructing a run stepped outside the board, which means the bounds
    /// bookkeeping is broken.
    #[error("line reconstruction walked off the board at {0}")]
    WalkedOffGrid(Location),
}

/// Contract violations reported by the turn engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The operation is not valid in the current phase.
    #[error("{operation} is not permitted during {phase:?}")]
    InvalidPhase {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Phase the engine was in.
        phase: Phase,
    },
    /// A move was requested without a selected ball.
    #[error("no ball is selected")]
    NoSelection,
    /// The move was finished although no ball is travelling.
    #[error("no ball is moving")]
    NoMoveInFlight,
    /// New balls were requested while a ball is still travelling.
    #[error("a ball is still moving")]
    MoveInFlight,
    /// The grid rejected a mutation.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The line detector failed.
    #[error(transparent)]
    Lines(#[from] LineError),
}

//! Text front end: reads commands line by line and prints the board.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use marble_lines_core::{Color, Location};
use marble_lines_world::{query, World};
use thiserror::Error;

use crate::session::{Session, Turn};

/// A parsed line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Move the ball on `from` to `to`.
    Move { from: Location, to: Location },
    /// Start a new game.
    Restart,
    /// Leave the game.
    Quit,
    /// Blank line.
    Empty,
}

/// Reasons a line of input was not understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    #[error("unrecognized command `{0}`; enter a move such as `0,0 4,4` or `00 44`")]
    Unrecognized(String),
    #[error("invalid cell `{0}`; use `x,y` or two digits")]
    InvalidCell(String),
}

/// Parses a move (`x,y x,y` or the compact `xy xy`), `restart` or `quit`.
pub(crate) fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "restart" => return Ok(Input::Restart),
        "quit" | "exit" => return Ok(Input::Quit),
        _ => {}
    }

    let mut parts = line.split_whitespace();
    let (Some(from), Some(to), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InputError::Unrecognized(line.to_owned()));
    };
    Ok(Input::Move {
        from: parse_cell(from)?,
        to: parse_cell(to)?,
    })
}

fn parse_cell(token: &str) -> Result<Location, InputError> {
    let invalid = || InputError::InvalidCell(token.to_owned());

    if let Some((x, y)) = token.split_once(',') {
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        return Ok(Location::new(x, y));
    }

    let mut digits = token.chars().map(|c| c.to_digit(10));
    match (digits.next(), digits.next(), digits.next()) {
        (Some(Some(x)), Some(Some(y)), None) => {
            let x = i32::try_from(x).map_err(|_| invalid())?;
            let y = i32::try_from(y).map_err(|_| invalid())?;
            Ok(Location::new(x, y))
        }
        _ => Err(invalid()),
    }
}

/// Writes the color legend shown once at start-up.
pub(crate) fn write_legend(out: &mut impl Write, seed: u64) -> Result<()> {
    let legend = Color::ALL
        .iter()
        .map(|color| format!("{}={}", color.index(), color))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "colors: {legend}")?;
    writeln!(out, "seed: {seed}")?;
    writeln!(out, "enter moves as `x,y x,y` or `xy xy`; `restart` or `quit`")?;
    Ok(())
}

/// Writes the board with column digits across the top, row digits down the
/// side and the upcoming balls after the arrow.
pub(crate) fn write_board(out: &mut impl Write, world: &World) -> Result<()> {
    let grid = query::grid(world);

    let columns: String = (0..grid.width()).map(digit).collect();
    let upcoming: String = query::upcoming_pieces(world)
        .iter()
        .map(|piece| digit(u32::from(piece.color().index())))
        .collect();
    writeln!(out, "  {columns}   -> {upcoming}")?;

    for y in 0..grid.height() {
        let mut row = format!(" {}", digit(y));
        for x in 0..grid.width() {
            let cell = Location::new(i32::try_from(x)?, i32::try_from(y)?);
            let symbol = match grid.get(cell)? {
                Some(piece) => digit(u32::from(piece.color().index())),
                None => '.',
            };
            row.push(symbol);
        }
        writeln!(out, "{row}")?;
    }
    writeln!(out)?;
    Ok(())
}

fn digit(value: u32) -> char {
    char::from_digit(value % 10, 10).unwrap_or('?')
}

/// Runs the read-print loop until the input ends, the player quits or the
/// game is over.
pub(crate) fn run(session: &mut Session, input: impl BufRead, mut out: impl Write) -> Result<()> {
    let mut lines = input.lines();
    loop {
        write_board(&mut out, session.world())?;
        if session.is_over() {
            writeln!(out, "GAME OVER")?;
            return Ok(());
        }

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read command from input")?;

        match parse_input(&line) {
            Ok(Input::Empty) => {}
            Ok(Input::Quit) => return Ok(()),
            Ok(Input::Restart) => session.restart()?,
            Ok(Input::Move { from, to }) => match session.play(from, to)? {
                Turn::Played { cleared: 0 } => {}
                Turn::Played { cleared } => writeln!(out, "cleared {cleared} balls")?,
                Turn::NothingToSelect => writeln!(out, "no ball at {from}")?,
                Turn::Blocked => writeln!(out, "ball at {from} cannot reach {to}")?,
            },
            Err(error) => writeln!(out, "{error}")?,
        }
        out.flush()?;
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure line-detection system that finds completed same-color runs.

use marble_lines_core::{Color, ColorLookup, LineError, Location};
use tracing::trace;

/// Shortest run of equal colors that counts as a completed line.
pub const MIN_LINE_LENGTH: u32 = 5;

/// Axis steps inspected around an anchor: horizontal, vertical and both diagonals.
pub const AXES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Detects completed lines running through an anchor cell.
#[derive(Clone, Copy, Debug)]
pub struct LineDetector {
    min_length: u32,
}

impl Default for LineDetector {
    fn default() -> Self {
        Self::new(MIN_LINE_LENGTH)
    }
}

impl LineDetector {
    /// Creates a detector that accepts runs of at least `min_length` cells.
    #[must_use]
    pub const fn new(min_length: u32) -> Self {
        Self { min_length }
    }

    /// Minimum run length this detector reports.
    #[must_use]
    pub const fn min_length(&self) -> u32 {
        self.min_length
    }

    /// Returns every cell of each completed run passing through `anchor`.
    ///
    /// Axes are inspected independently, so a cell shared by two runs (the
    /// anchor of a cross, for example) appears once per run. Callers treat the
    /// result as a set of cells to clear.
    pub fn complete_lines<L>(&self, lookup: &L, anchor: Location) -> Result<Vec<Location>, LineError>
    where
        L: ColorLookup + ?Sized,
    {
        let color = lookup
            .color_at(anchor)
            .ok_or(LineError::EmptyAnchor(anchor))?;

        let mut cells = Vec::new();
        for (dx, dy) in AXES {
            self.collect_run(lookup, anchor, dx, dy, color, &mut cells)?;
        }

        trace!(?anchor, ?color, found = cells.len(), "line search finished");
        Ok(cells)
    }

    /// Runs [`LineDetector::complete_lines`] for each anchor and concatenates the results.
    pub fn complete_lines_from<L>(
        &self,
        lookup: &L,
        anchors: &[Location],
    ) -> Result<Vec<Location>, LineError>
    where
        L: ColorLookup + ?Sized,
    {
        let mut cells = Vec::new();
        for &anchor in anchors {
            cells.extend(self.complete_lines(lookup, anchor)?);
        }
        Ok(cells)
    }

    fn collect_run<L>(
        &self,
        lookup: &L,
        anchor: Location,
        dx: i32,
        dy: i32,
        color: Color,
        out: &mut Vec<Location>,
    ) -> Result<(), LineError>
    where
        L: ColorLookup + ?Sized,
    {
        let forward_end = run_end(lookup, anchor, dx, dy, color);
        let backward_end = run_end(lookup, anchor, -dx, -dy, color);

        let length = forward_end
            .x()
            .abs_diff(backward_end.x())
            .max(forward_end.y().abs_diff(backward_end.y()))
            + 1;
        if length < self.min_length {
            return Ok(());
        }

        let mut cell = forward_end;
        loop {
            if !lookup.contains(cell) {
                return Err(LineError::WalkedOffGrid(cell));
            }
            out.push(cell);
            if cell == backward_end {
                return Ok(());
            }
            cell = cell.offset(-dx, -dy);
        }
    }
}

/// Walks from `start` along the step while the color matches and returns the
/// last matching cell.
fn run_end<L>(lookup: &L, start: Location, dx: i32, dy: i32, color: Color) -> Location
where
    L: ColorLookup + ?Sized,
{
    let (width, height) = lookup.dimensions();
    let max_steps = width.max(height);

    let mut end = start;
    let mut steps = 0;
    while steps < max_steps {
        let next = end.offset(dx, dy);
        if lookup.color_at(next) != Some(color) {
            break;
        }
        end = next;
        steps += 1;
    }
    end
}

//! Board occupancy and change notifications.

use marble_lines_core::{
    in_bounds, Color, ColorLookup, Event, GridError, Location, Piece, PlacedPiece,
};

/// Dense `width` by `height` board holding at most one piece per cell.
///
/// Cells are stored column by column so that iteration visits x ascending in
/// the outer loop and y ascending in the inner loop. Supply strategies draw
/// cells from [`Grid::empty_cells`], so this order keeps seeded games
/// reproducible.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Option<Piece>>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![None; capacity],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the location lies on the board.
    #[must_use]
    pub fn in_bounds(&self, cell: Location) -> bool {
        in_bounds(cell, self.width, self.height)
    }

    /// Returns the piece on the cell, if any.
    pub fn get(&self, cell: Location) -> Result<Option<Piece>, GridError> {
        let index = self.index(cell).ok_or(GridError::OutOfRange(cell))?;
        Ok(self.cells[index])
    }

    /// Reports whether the cell lies on the board and holds a piece.
    #[must_use]
    pub fn is_occupied(&self, cell: Location) -> bool {
        self.index(cell)
            .map_or(false, |index| self.cells[index].is_some())
    }

    /// Places a piece on an empty cell.
    pub fn add(
        &mut self,
        piece: Piece,
        cell: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let index = self.index(cell).ok_or(GridError::OutOfRange(cell))?;
        if self.cells[index].is_some() {
            return Err(GridError::OccupiedCell(cell));
        }

        self.cells[index] = Some(piece);
        out_events.push(Event::PieceAdded {
            placed: PlacedPiece::new(piece, cell),
        });
        Ok(())
    }

    /// Moves the piece on `from` to the empty cell `to`.
    pub fn move_piece(
        &mut self,
        from: Location,
        to: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let from_index = self.index(from).ok_or(GridError::OutOfRange(from))?;
        let piece = self.cells[from_index].ok_or(GridError::EmptySource(from))?;
        let to_index = self.index(to).ok_or(GridError::OutOfRange(to))?;
        if self.cells[to_index].is_some() {
            return Err(GridError::OccupiedCell(to));
        }

        self.cells[from_index] = None;
        self.cells[to_index] = Some(piece);
        out_events.push(Event::PieceMoved { piece, from, to });
        Ok(())
    }

    /// Removes the pieces on the provided cells, skipping empty ones.
    ///
    /// Every location is validated before anything is removed. A single
    /// [`Event::PiecesRemoved`] lists the removed pieces in the order their
    /// cells were given; nothing is emitted when every cell was already empty.
    pub fn remove_many(
        &mut self,
        cells: &[Location],
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        if let Some(&outside) = cells.iter().find(|cell| !self.in_bounds(**cell)) {
            return Err(GridError::OutOfRange(outside));
        }

        let mut removed = Vec::new();
        for &cell in cells {
            let Some(index) = self.index(cell) else {
                continue;
            };
            if let Some(piece) = self.cells[index].take() {
                removed.push(PlacedPiece::new(piece, cell));
            }
        }

        if !removed.is_empty() {
            out_events.push(Event::PiecesRemoved { removed });
        }
        Ok(())
    }

    /// Removes every piece, always reporting the (possibly empty) removal.
    pub fn clear(&mut self, out_events: &mut Vec<Event>) {
        self.clear_with(None, out_events);
    }

    /// Clears the board and reports `travelling` as removed alongside the
    /// pieces that were on it, keeping x-major order.
    pub(crate) fn clear_with(
        &mut self,
        travelling: Option<PlacedPiece>,
        out_events: &mut Vec<Event>,
    ) {
        let mut removed: Vec<PlacedPiece> = self.all_pieces().collect();
        if let Some(placed) = travelling {
            let at = removed.partition_point(|other| other.location <= placed.location);
            removed.insert(at, placed);
        }
        self.cells.fill(None);
        out_events.push(Event::PiecesRemoved { removed });
    }

    /// Iterates over every placed piece, x ascending then y ascending.
    pub fn all_pieces(&self) -> impl Iterator<Item = PlacedPiece> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let piece = (*slot)?;
                Some(PlacedPiece::new(piece, self.location(index)?))
            })
    }

    /// Iterates over every empty cell, x ascending then y ascending.
    pub fn empty_cells(&self) -> impl Iterator<Item = Location> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .filter_map(|(index, _)| self.location(index))
    }

    /// Reports whether no empty cell remains.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Takes the piece off `cell` without reporting it, so it can travel.
    pub(crate) fn lift(&mut self, cell: Location) -> Result<Piece, GridError> {
        let index = self.index(cell).ok_or(GridError::OutOfRange(cell))?;
        self.cells[index].take().ok_or(GridError::EmptySource(cell))
    }

    /// Lands a travelling piece on `to` and reports the completed move.
    pub(crate) fn land(
        &mut self,
        piece: Piece,
        from: Location,
        to: Location,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError> {
        let index = self.index(to).ok_or(GridError::OutOfRange(to))?;
        if self.cells[index].is_some() {
            return Err(GridError::OccupiedCell(to));
        }

        self.cells[index] = Some(piece);
        out_events.push(Event::PieceMoved { piece, from, to });
        Ok(())
    }

    fn index(&self, cell: Location) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        x.checked_mul(height)?.checked_add(y)
    }

    fn location(&self, index: usize) -> Option<Location> {
        let height = usize::try_from(self.height).ok()?.max(1);
        let x = i32::try_from(index / height).ok()?;
        let y = i32::try_from(index % height).ok()?;
        Some(Location::new(x, y))
    }
}

impl ColorLookup for Grid {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn color_at(&self, cell: Location) -> Option<Color> {
        self.index(cell)
            .and_then(|index| self.cells[index])
            .map(|piece| piece.color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marble_lines_core::PieceFactory;

    #[test]
    fn storage_follows_column_major_order() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.index(Location::new(0, 1)), Some(1));
        assert_eq!(grid.index(Location::new(1, 0)), Some(2));
        assert_eq!(grid.location(5), Some(Location::new(2, 1)));
    }

    #[test]
    fn lift_and_land_report_a_single_move() {
        let mut factory = PieceFactory::default();
        let piece = factory.create(Color::Green);
        let mut grid = Grid::new(4, 4);
        let mut events = Vec::new();
        grid.add(piece, Location::new(1, 1), &mut events)
            .expect("cell is free");
        events.clear();

        let lifted = grid.lift(Location::new(1, 1)).expect("cell holds a piece");
        assert_eq!(lifted, piece);
        assert_eq!(grid.get(Location::new(1, 1)), Ok(None));
        assert!(events.is_empty());

        grid.land(lifted, Location::new(1, 1), Location::new(3, 0), &mut events)
            .expect("destination is free");
        assert_eq!(
            events,
            vec![Event::PieceMoved {
                piece,
                from: Location::new(1, 1),
                to: Location::new(3, 0),
            }]
        );
    }

    #[test]
    fn clear_with_reports_the_travelling_piece_in_board_order() {
        let mut factory = PieceFactory::default();
        let mut grid = Grid::new(3, 3);
        let mut events = Vec::new();
        let first = factory.create(Color::Red);
        let last = factory.create(Color::Blue);
        let travelling = factory.create(Color::Cyan);
        grid.add(first, Location::new(0, 2), &mut events).expect("free");
        grid.add(last, Location::new(2, 0), &mut events).expect("free");
        events.clear();

        grid.clear_with(
            Some(PlacedPiece::new(travelling, Location::new(1, 1))),
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PiecesRemoved {
                removed: vec![
                    PlacedPiece::new(first, Location::new(0, 2)),
                    PlacedPiece::new(travelling, Location::new(1, 1)),
                    PlacedPiece::new(last, Location::new(2, 0)),
                ],
            }]
        );
        assert_eq!(grid.all_pieces().count(), 0);
    }

    #[test]
    fn lift_rejects_empty_cells() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(
            grid.lift(Location::new(0, 0)),
            Err(GridError::EmptySource(Location::new(0, 0)))
        );
    }

    #[test]
    fn zero_sized_grid_is_full_and_empty() {
        let grid = Grid::new(0, 0);
        assert!(grid.is_full());
        assert_eq!(grid.empty_cells().count(), 0);
        assert!(!grid.in_bounds(Location::new(0, 0)));
    }
}

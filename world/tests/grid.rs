use marble_lines_core::{Color, Event, GridError, Location, PieceFactory, PlacedPiece};
use marble_lines_world::Grid;

const OUTSIDE: [(i32, i32); 6] = [(-1, 0), (-6, -7), (3, 5), (5, 5), (100, 1000), (100, -100)];
const INSIDE: [(i32, i32); 4] = [(0, 0), (4, 4), (1, 2), (0, 3)];

#[test]
fn out_of_range_lookups_are_rejected() {
    let grid = Grid::new(5, 5);
    for (x, y) in OUTSIDE {
        let cell = Location::new(x, y);
        assert!(!grid.in_bounds(cell));
        assert_eq!(grid.get(cell), Err(GridError::OutOfRange(cell)));
    }
}

#[test]
fn added_pieces_round_trip_through_get() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();

    for (x, y) in INSIDE {
        let cell = Location::new(x, y);
        let piece = factory.create(Color::Blue);
        assert_eq!(grid.get(cell), Ok(None));

        grid.add(piece, cell, &mut events).expect("cell is free");
        assert_eq!(grid.get(cell), Ok(Some(piece)));
        assert_eq!(
            events.last(),
            Some(&Event::PieceAdded {
                placed: PlacedPiece::new(piece, cell)
            })
        );
    }
}

#[test]
fn adding_to_an_occupied_cell_leaves_the_grid_unchanged() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();
    let cell = Location::new(2, 2);
    let first = factory.create(Color::Red);
    grid.add(first, cell, &mut events).expect("cell is free");
    events.clear();

    let second = factory.create(Color::Green);
    assert_eq!(
        grid.add(second, cell, &mut events),
        Err(GridError::OccupiedCell(cell))
    );
    assert_eq!(grid.get(cell), Ok(Some(first)));
    assert_eq!(grid.all_pieces().count(), 1);
    assert!(events.is_empty());
}

#[test]
fn adding_outside_the_board_is_rejected() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();
    let cell = Location::new(5, 0);

    assert_eq!(
        grid.add(factory.create(Color::Red), cell, &mut events),
        Err(GridError::OutOfRange(cell))
    );
    assert!(events.is_empty());
}

#[test]
fn moving_validates_both_cells() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();
    let piece = factory.create(Color::Cyan);
    let blocker = factory.create(Color::Brown);
    grid.add(piece, Location::new(0, 0), &mut events)
        .expect("cell is free");
    grid.add(blocker, Location::new(1, 0), &mut events)
        .expect("cell is free");
    events.clear();

    assert_eq!(
        grid.move_piece(Location::new(3, 3), Location::new(4, 4), &mut events),
        Err(GridError::EmptySource(Location::new(3, 3)))
    );
    assert_eq!(
        grid.move_piece(Location::new(0, 0), Location::new(1, 0), &mut events),
        Err(GridError::OccupiedCell(Location::new(1, 0)))
    );
    assert_eq!(
        grid.move_piece(Location::new(0, 0), Location::new(0, 9), &mut events),
        Err(GridError::OutOfRange(Location::new(0, 9)))
    );
    assert_eq!(
        grid.move_piece(Location::new(-1, 0), Location::new(0, 1), &mut events),
        Err(GridError::OutOfRange(Location::new(-1, 0)))
    );
    assert!(events.is_empty());

    grid.move_piece(Location::new(0, 0), Location::new(4, 4), &mut events)
        .expect("move is valid");
    assert_eq!(grid.get(Location::new(0, 0)), Ok(None));
    assert_eq!(grid.get(Location::new(4, 4)), Ok(Some(piece)));
    assert_eq!(
        events,
        vec![Event::PieceMoved {
            piece,
            from: Location::new(0, 0),
            to: Location::new(4, 4),
        }]
    );
}

#[test]
fn removing_reports_pieces_in_request_order_and_skips_empty_cells() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();
    let a = factory.create(Color::Red);
    let b = factory.create(Color::Yellow);
    grid.add(a, Location::new(0, 0), &mut events).expect("free");
    grid.add(b, Location::new(3, 1), &mut events).expect("free");
    events.clear();

    grid.remove_many(
        &[Location::new(3, 1), Location::new(2, 2), Location::new(0, 0)],
        &mut events,
    )
    .expect("cells are on the board");

    assert_eq!(
        events,
        vec![Event::PiecesRemoved {
            removed: vec![
                PlacedPiece::new(b, Location::new(3, 1)),
                PlacedPiece::new(a, Location::new(0, 0)),
            ],
        }]
    );
    assert_eq!(grid.all_pieces().count(), 0);
}

#[test]
fn removing_only_empty_cells_is_silent() {
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();

    grid.remove_many(&[Location::new(1, 1), Location::new(1, 1)], &mut events)
        .expect("cells are on the board");
    assert!(events.is_empty());
}

#[test]
fn removing_outside_the_board_removes_nothing() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(5, 5);
    let mut events = Vec::new();
    grid.add(factory.create(Color::Red), Location::new(0, 0), &mut events)
        .expect("free");
    events.clear();

    assert_eq!(
        grid.remove_many(&[Location::new(0, 0), Location::new(7, 7)], &mut events),
        Err(GridError::OutOfRange(Location::new(7, 7)))
    );
    assert!(grid.is_occupied(Location::new(0, 0)));
    assert!(events.is_empty());
}

#[test]
fn clear_reports_every_piece_exactly_once() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(4, 3);
    let mut events = Vec::new();
    let placements = [(3, 0), (0, 2), (1, 1), (0, 0)];
    for (x, y) in placements {
        grid.add(factory.create(Color::Green), Location::new(x, y), &mut events)
            .expect("free");
    }
    let before: Vec<PlacedPiece> = grid.all_pieces().collect();
    events.clear();

    grid.clear(&mut events);

    assert_eq!(grid.all_pieces().count(), 0);
    assert_eq!(events, vec![Event::PiecesRemoved { removed: before.clone() }]);
    let cells: Vec<Location> = before.iter().map(|placed| placed.location).collect();
    assert_eq!(
        cells,
        vec![
            Location::new(0, 0),
            Location::new(0, 2),
            Location::new(1, 1),
            Location::new(3, 0),
        ]
    );
}

#[test]
fn clearing_an_empty_board_still_reports() {
    let mut grid = Grid::new(3, 3);
    let mut events = Vec::new();

    grid.clear(&mut events);
    assert_eq!(events, vec![Event::PiecesRemoved { removed: Vec::new() }]);
}

#[test]
fn empty_cells_iterate_column_by_column() {
    let mut factory = PieceFactory::default();
    let mut grid = Grid::new(2, 3);
    let mut events = Vec::new();
    grid.add(factory.create(Color::Red), Location::new(0, 1), &mut events)
        .expect("free");

    let empty: Vec<Location> = grid.empty_cells().collect();
    assert_eq!(
        empty,
        vec![
            Location::new(0, 0),
            Location::new(0, 2),
            Location::new(1, 0),
            Location::new(1, 1),
            Location::new(1, 2),
        ]
    );
    assert!(!grid.is_full());
}

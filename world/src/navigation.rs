//! Wave-based reachability search used to validate ball moves.

use std::collections::VecDeque;

use marble_lines_core::{in_bounds, Location};

const UNVISITED: u32 = u32::MAX;

/// Reports whether `to` can be reached from `from` through unblocked cells.
///
/// The wave expands four-directionally from `from` and succeeds as soon as
/// `to` is discovered next to the wavefront, whether or not `to` itself is
/// blocked. Callers check that the destination is free before moving there.
/// Returns `false` when either cell lies outside the board.
pub fn can_reach<F>(width: u32, height: u32, from: Location, to: Location, is_blocked: F) -> bool
where
    F: FnMut(Location) -> bool,
{
    if !in_bounds(from, width, height) || !in_bounds(to, width, height) {
        return false;
    }

    let mut field = WaveField::new(width, height);
    field.flood(from, Some(to), is_blocked)
}

/// Returns every cell the wave from `from` reaches, excluding `from` itself.
///
/// Cells are listed x ascending then y ascending. Blocked cells are never
/// part of the result.
pub fn reachable_from<F>(width: u32, height: u32, from: Location, is_blocked: F) -> Vec<Location>
where
    F: FnMut(Location) -> bool,
{
    if !in_bounds(from, width, height) {
        return Vec::new();
    }

    let mut field = WaveField::new(width, height);
    let _ = field.flood(from, None, is_blocked);
    field.reached()
}

/// Dense distance grid filled by a breadth-first wave.
#[derive(Clone, Debug)]
struct WaveField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl WaveField {
    fn new(width: u32, height: u32) -> Self {
        let cell_count_u64 = u64::from(width) * u64::from(height);
        let cell_count = usize::try_from(cell_count_u64).unwrap_or(0);
        Self {
            width,
            height,
            distances: vec![UNVISITED; cell_count],
        }
    }

    /// Floods the field from `start`, returning `true` early once `target` is
    /// discovered adjacent to the wavefront.
    fn flood<F>(&mut self, start: Location, target: Option<Location>, mut is_blocked: F) -> bool
    where
        F: FnMut(Location) -> bool,
    {
        let Some(start_index) = self.index(start) else {
            return false;
        };
        self.distances[start_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = self.index(cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell, self.width, self.height) {
                if Some(neighbor) == target {
                    return true;
                }

                if is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        false
    }

    /// Distance recorded for the cell, if the wave reached it.
    #[cfg(test)]
    fn distance(&self, cell: Location) -> Option<u32> {
        self.index(cell)
            .map(|index| self.distances[index])
            .filter(|distance| *distance != UNVISITED)
    }

    fn reached(&self) -> Vec<Location> {
        let height = usize::try_from(self.height).unwrap_or(0).max(1);
        self.distances
            .iter()
            .enumerate()
            .filter(|(_, distance)| **distance != UNVISITED && **distance > 0)
            .filter_map(|(index, _)| {
                let x = i32::try_from(index / height).ok()?;
                let y = i32::try_from(index % height).ok()?;
                Some(Location::new(x, y))
            })
            .collect()
    }

    fn index(&self, cell: Location) -> Option<usize> {
        if !in_bounds(cell, self.width, self.height) {
            return None;
        }
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        x.checked_mul(height)?.checked_add(y)
    }
}

fn neighbors(cell: Location, width: u32, height: u32) -> impl Iterator<Item = Location> {
    [(-1, 0), (0, -1), (1, 0), (0, 1)]
        .into_iter()
        .map(move |(dx, dy)| cell.offset(dx, dy))
        .filter(move |neighbor| in_bounds(*neighbor, width, height))
}

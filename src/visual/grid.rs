//! Sparse spatial hash for neighbor queries between particles

use ahash::AHashMap;
use glam::Vec2;

/// Uniform grid keyed by floor-divided position.
///
/// Stores particle indices; cell contents keep insertion order so queries
/// are deterministic.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    pub fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(index);
    }

    /// Rebuild from scratch
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (usize, Vec2)>) {
        self.clear();
        for (index, pos) in entries {
            self.insert(index, pos);
        }
    }

    /// Indices sharing `pos`'s cell
    pub fn query_cell(&self, pos: Vec2) -> &[usize] {
        self.cells
            .get(&self.cell_coord(pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Indices in the (2r+1)x(2r+1) block of cells around `pos`
    pub fn query_neighborhood(&self, pos: Vec2, reach: i32) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_coord(pos);
        (-reach..=reach).flat_map(move |dx| {
            (-reach..=reach).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_floors_negative() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.cell_coord(Vec2::new(49.9, 0.0)), (0, 0));
        assert_eq!(grid.cell_coord(Vec2::new(50.0, 120.0)), (1, 2));
        assert_eq!(grid.cell_coord(Vec2::new(-0.1, -50.1)), (-1, -2));
    }

    #[test]
    fn test_neighborhood_reach() {
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild(
            [
                (0, Vec2::new(10.0, 10.0)),
                (1, Vec2::new(110.0, 110.0)),
                (2, Vec2::new(160.0, 10.0)),
                (3, Vec2::new(20.0, 20.0)),
            ]
            .into_iter(),
        );
        assert_eq!(grid.occupied_cells(), 3);
        assert_eq!(grid.query_cell(Vec2::new(5.0, 5.0)), &[0, 3]);

        let mut near: Vec<usize> = grid.query_neighborhood(Vec2::new(10.0, 10.0), 2).collect();
        near.sort_unstable();
        // Index 2 is three cells over
        assert_eq!(near, vec![0, 1, 3]);
    }

    #[test]
    fn test_rebuild_drops_stale_cells() {
        let mut grid = SpatialGrid::new(50.0);
        grid.rebuild((0..5_000).map(|i| (i, Vec2::new((i % 100) as f32 * 8.0, (i / 100) as f32 * 12.0))));
        // 800x600 arena in 50 px cells: 16 columns, 12 rows
        assert_eq!(grid.occupied_cells(), 16 * 12);
        assert_eq!(grid.query_neighborhood(Vec2::ZERO, 16).count(), 5_000);

        grid.rebuild([(7, Vec2::new(400.0, 300.0))].into_iter());
        assert_eq!(grid.occupied_cells(), 1);
        assert_eq!(grid.query_cell(Vec2::new(410.0, 310.0)), &[7]);
        assert_eq!(grid.query_neighborhood(Vec2::new(0.0, 0.0), 2).count(), 0);
    }
}

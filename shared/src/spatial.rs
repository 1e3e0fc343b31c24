use geo::{Contains, Point};

use crate::scene::{NodeId, Scene};

const GRID_COLS: usize = 64;
const GRID_ROWS: usize = 32;

/// A flat 2D grid over map space for country hit-testing.
/// Cells hold candidate nodes by bounding box; the exact point-in-polygon
/// test runs only on those candidates. Rebuilt when the scene is populated.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cells: Vec<Vec<NodeId>>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            min_x: 0.0,
            min_y: 0.0,
            cell_w: 1.0,
            cell_h: 1.0,
        }
    }
}

impl SpatialGrid {
    pub fn build(scene: &Scene) -> Self {
        let nodes: Vec<_> = scene
            .thematic()
            .iter()
            .filter_map(|n| n.bounds.map(|b| (n.id, b)))
            .collect();
        if nodes.is_empty() {
            return Self::default();
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (_, b) in &nodes {
            min_x = min_x.min(b.min().x);
            min_y = min_y.min(b.min().y);
            max_x = max_x.max(b.max().x);
            max_y = max_y.max(b.max().y);
        }

        // Pad so points on the outer edge still fall inside the grid
        min_x -= 1.0;
        min_y -= 1.0;
        max_x += 1.0;
        max_y += 1.0;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;
        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];

        for (id, b) in nodes {
            let col_start = ((b.min().x - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((b.max().x - min_x) / cell_w).ceil().min(GRID_COLS as f64) as usize;
            let row_start = ((b.min().y - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((b.max().y - min_y) / cell_h).ceil().min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(id);
                }
            }
        }

        Self {
            cells,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    fn candidates(&self, mx: f64, my: f64) -> &[NodeId] {
        if self.cells.is_empty() {
            return &[];
        }
        let col = ((mx - self.min_x) / self.cell_w).floor();
        let row = ((my - self.min_y) / self.cell_h).floor();
        if !(0.0..GRID_COLS as f64).contains(&col) || !(0.0..GRID_ROWS as f64).contains(&row) {
            return &[];
        }
        &self.cells[row as usize * GRID_COLS + col as usize]
    }

    /// Top-most thematic node containing the map-space point.
    pub fn find_at(&self, scene: &Scene, mx: f64, my: f64) -> Option<NodeId> {
        let point = Point::new(mx, my);
        self.candidates(mx, my)
            .iter()
            .filter_map(|&id| {
                let node = scene.node(id)?;
                let bounds = node.bounds?;
                if mx < bounds.min().x
                    || mx > bounds.max().x
                    || my < bounds.min().y
                    || my > bounds.max().y
                {
                    return None;
                }
                node.geometry.contains(&point).then_some(id)
            })
            .max_by_key(|&id| scene.z_index(id))
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialGrid;
    use crate::scene::{PathStyle, Scene};
    use geo::{LineString, MultiPolygon, Polygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )])
    }

    fn triangle() -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(100.0, 0.0), (200.0, 0.0), (100.0, 100.0), (100.0, 0.0)]),
            vec![],
        )])
    }

    fn style() -> PathStyle {
        PathStyle {
            fill: "#fff".into(),
            stroke: "white".into(),
            stroke_width: 0.5,
        }
    }

    #[test]
    fn finds_containing_country() {
        let mut scene = Scene::new();
        let a = scene.append_thematic(0, rect(0.0, 0.0, 50.0, 50.0), style());
        let b = scene.append_thematic(1, triangle(), style());
        let grid = SpatialGrid::build(&scene);
        assert_eq!(grid.find_at(&scene, 10.0, 10.0), Some(a));
        assert_eq!(grid.find_at(&scene, 110.0, 10.0), Some(b));
        assert_eq!(grid.find_at(&scene, 75.0, 25.0), None);
    }

    #[test]
    fn bounding_box_hit_outside_polygon_misses() {
        let mut scene = Scene::new();
        scene.append_thematic(0, triangle(), style());
        let grid = SpatialGrid::build(&scene);
        // Inside the triangle's bounding box but beyond its hypotenuse.
        assert_eq!(grid.find_at(&scene, 190.0, 90.0), None);
    }

    #[test]
    fn overlapping_nodes_resolve_to_front_most() {
        let mut scene = Scene::new();
        let a = scene.append_thematic(0, rect(0.0, 0.0, 50.0, 50.0), style());
        let b = scene.append_thematic(1, rect(25.0, 25.0, 75.0, 75.0), style());
        let grid = SpatialGrid::build(&scene);
        assert_eq!(grid.find_at(&scene, 30.0, 30.0), Some(b));
        scene.bring_to_front(a);
        assert_eq!(grid.find_at(&scene, 30.0, 30.0), Some(a));
    }

    #[test]
    fn basemap_is_never_hit() {
        let mut scene = Scene::new();
        scene.append_basemap(rect(0.0, 0.0, 50.0, 50.0), style());
        let grid = SpatialGrid::build(&scene);
        assert_eq!(grid.find_at(&scene, 10.0, 10.0), None);
    }
}

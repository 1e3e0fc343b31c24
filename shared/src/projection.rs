use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

const MAX_RESAMPLE_DEPTH: u32 = 16;
const EPSILON: f64 = 1e-6;

/// Cylindrical equal-area projection with a configurable standard parallel.
///
/// Output is in map space: pixels relative to the canvas before any zoom
/// transform. The projection is fixed once the viewport size is known; zoom
/// is applied afterwards as an affine transform on the drawn group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylindricalEqualArea {
    /// Standard parallel in degrees (37.5 gives the Hobo-Dyer variant).
    pub parallel: f64,
    pub scale: f64,
    pub translate: (f64, f64),
    /// Maximum distance in pixels between a resampled edge and the true curve.
    pub precision: f64,
}

impl Default for CylindricalEqualArea {
    fn default() -> Self {
        Self {
            parallel: 37.5,
            scale: 172.0,
            translate: (480.0, 250.0),
            precision: 0.1,
        }
    }
}

impl CylindricalEqualArea {
    pub fn centered(self, width: f64, height: f64) -> Self {
        Self {
            translate: (width / 2.0, height / 2.0),
            ..self
        }
    }

    fn cos_parallel(&self) -> f64 {
        self.parallel.to_radians().cos()
    }

    fn project_radians(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let cos0 = self.cos_parallel();
        let x = lambda * cos0;
        let y = phi.sin() / cos0;
        (
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        )
    }

    /// Project a longitude/latitude pair given in degrees.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        self.project_radians(lon.to_radians(), lat.to_radians())
    }

    /// Project a ring, inserting extra vertices wherever a straight screen
    /// segment would stray from the projected great-circle arc by more than
    /// `precision` pixels.
    pub fn project_ring(&self, ring: &LineString<f64>) -> LineString<f64> {
        let mut out: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
        let mut prev: Option<ResamplePoint> = None;
        for coord in &ring.0 {
            let point = ResamplePoint::new(self, coord.x.to_radians(), coord.y.to_radians());
            if let Some(p0) = prev {
                self.resample(&p0, &point, MAX_RESAMPLE_DEPTH, &mut out);
            }
            out.push(Coord {
                x: point.x,
                y: point.y,
            });
            prev = Some(point);
        }
        LineString(out)
    }

    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Polygon<f64> {
        Polygon::new(
            self.project_ring(polygon.exterior()),
            polygon
                .interiors()
                .iter()
                .map(|ring| self.project_ring(ring))
                .collect(),
        )
    }

    pub fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon(geometry.0.iter().map(|p| self.project_polygon(p)).collect())
    }

    fn resample(&self, p0: &ResamplePoint, p1: &ResamplePoint, depth: u32, out: &mut Vec<Coord<f64>>) {
        let delta2 = self.precision * self.precision;
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let d2 = dx * dx + dy * dy;
        if d2 <= 4.0 * delta2 || depth == 0 {
            return;
        }
        let depth = depth - 1;

        let (a, b, c) = (p0.a + p1.a, p0.b + p1.b, p0.c + p1.c);
        let m = (a * a + b * b + c * c).sqrt();
        if m < EPSILON {
            return;
        }
        let c = c / m;
        let phi2 = c.clamp(-1.0, 1.0).asin();
        let lambda2 = if ((c.abs() - 1.0).abs() < EPSILON) || (p0.lambda - p1.lambda).abs() < EPSILON
        {
            (p0.lambda + p1.lambda) / 2.0
        } else {
            b.atan2(a)
        };
        let (x2, y2) = self.project_radians(lambda2, phi2);
        let dx2 = x2 - p0.x;
        let dy2 = y2 - p0.y;
        let dz = dy * dx2 - dx * dy2;

        let off_line = dz * dz / d2 > delta2;
        let near_end = ((dx * dx2 + dy * dy2) / d2 - 0.5).abs() > 0.3;
        let too_long = p0.a * p1.a + p0.b * p1.b + p0.c * p1.c < COS_MIN_DISTANCE;
        if off_line || near_end || too_long {
            let mid = ResamplePoint {
                x: x2,
                y: y2,
                lambda: lambda2,
                a: a / m,
                b: b / m,
                c,
            };
            self.resample(p0, &mid, depth, out);
            out.push(Coord { x: x2, y: y2 });
            self.resample(&mid, p1, depth, out);
        }
    }
}

/// cos(30°): edges spanning a wider angle are always subdivided.
const COS_MIN_DISTANCE: f64 = 0.866_025_403_784_438_6;

#[derive(Debug, Clone, Copy)]
struct ResamplePoint {
    x: f64,
    y: f64,
    lambda: f64,
    a: f64,
    b: f64,
    c: f64,
}

impl ResamplePoint {
    fn new(projection: &CylindricalEqualArea, lambda: f64, phi: f64) -> Self {
        let (x, y) = projection.project_radians(lambda, phi);
        let cos_phi = phi.cos();
        Self {
            x,
            y,
            lambda,
            a: cos_phi * lambda.cos(),
            b: cos_phi * lambda.sin(),
            c: phi.sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CylindricalEqualArea;
    use geo::LineString;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < tol, "expected {expected}, got {actual} (diff: {diff})");
    }

    fn projection() -> CylindricalEqualArea {
        CylindricalEqualArea::default().centered(960.0, 500.0)
    }

    #[test]
    fn origin_maps_to_viewport_center() {
        let (x, y) = projection().project(0.0, 0.0);
        assert_close(x, 480.0, 1e-9);
        assert_close(y, 250.0, 1e-9);
    }

    #[test]
    fn known_points() {
        let p = projection();
        let cos0 = 37.5f64.to_radians().cos();

        let (x, _) = p.project(180.0, 0.0);
        assert_close(x, 480.0 + 172.0 * std::f64::consts::PI * cos0, 1e-9);

        let (_, y) = p.project(0.0, 90.0);
        assert_close(y, 250.0 - 172.0 / cos0, 1e-9);

        let (_, y) = p.project(0.0, -30.0);
        assert_close(y, 250.0 + 172.0 * 0.5 / cos0, 1e-9);
    }

    #[test]
    fn short_edges_are_not_resampled() {
        let ring = LineString::from(vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)]);
        let projected = projection().project_ring(&ring);
        assert_eq!(projected.0.len(), 4);
    }

    #[test]
    fn long_edges_gain_vertices_within_precision() {
        let p = projection();
        let ring = LineString::from(vec![(-60.0, 50.0), (60.0, 50.0)]);
        let projected = p.project_ring(&ring);
        assert!(projected.0.len() > 2, "expected resampled vertices");

        // Every inserted vertex lies on the projected great circle between the endpoints.
        let first = projected.0[0];
        let last = projected.0[projected.0.len() - 1];
        assert_close(first.x, p.project(-60.0, 50.0).0, 1e-9);
        assert_close(last.x, p.project(60.0, 50.0).0, 1e-9);
        for window in projected.0.windows(2) {
            assert!(window[1].x > window[0].x, "resampled vertices must stay ordered");
        }
    }

    #[test]
    fn meridian_edges_stay_vertical() {
        let p = projection();
        let ring = LineString::from(vec![(10.0, -60.0), (10.0, 60.0)]);
        let projected = p.project_ring(&ring);
        let x = p.project(10.0, 0.0).0;
        for coord in &projected.0 {
            assert_close(coord.x, x, 1e-6);
        }
    }
}

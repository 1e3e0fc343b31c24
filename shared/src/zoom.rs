use crate::config::ZoomConfig;

/// Wheel pixels per doubling of the zoom scale (line/page deltas count 120 each).
const WHEEL_DELTA_DIVISOR: f64 = 500.0;
const WHEEL_LINE_MULTIPLIER: f64 = 120.0;

/// Affine pan/zoom applied to the main map group: `screen = map * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    /// Map space to screen space.
    pub fn apply(&self, mx: f64, my: f64) -> (f64, f64) {
        (mx * self.k + self.x, my * self.k + self.y)
    }

    /// Screen space to map space.
    pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }
}

/// Wheel event payload in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_y: f64,
    /// DOM delta mode: 0 pixels, 1 lines, 2 pages.
    pub delta_mode: u32,
    pub x: f64,
    pub y: f64,
}

/// Owns the current zoom transform. Scale is always kept inside the
/// configured extent; every mutating call reports whether anything changed.
#[derive(Debug, Clone)]
pub struct ZoomController {
    transform: ZoomTransform,
    config: ZoomConfig,
    width: f64,
    height: f64,
}

impl ZoomController {
    pub fn new(config: ZoomConfig, width: f64, height: f64) -> Self {
        let mut controller = Self {
            transform: ZoomTransform::IDENTITY,
            config,
            width,
            height,
        };
        controller.transform.k = controller.clamp_scale(1.0);
        controller
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.k
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        if !k.is_finite() {
            return self.transform.k;
        }
        k.clamp(self.config.min_scale, self.config.max_scale)
    }

    fn set(&mut self, next: ZoomTransform) -> bool {
        if next == self.transform {
            return false;
        }
        self.transform = next;
        true
    }

    /// Multiply the scale by `factor`, keeping the screen point `(px, py)` fixed.
    pub fn scale_at(&mut self, factor: f64, px: f64, py: f64) -> bool {
        let k = self.clamp_scale(self.transform.k * factor);
        let (mx, my) = self.transform.invert(px, py);
        self.set(ZoomTransform {
            k,
            x: px - mx * k,
            y: py - my * k,
        })
    }

    /// Multiply the scale by `factor` around the viewport center.
    pub fn scale_by(&mut self, factor: f64) -> bool {
        self.scale_at(factor, self.width / 2.0, self.height / 2.0)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.scale_by(self.config.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.scale_by(self.config.zoom_out_factor)
    }

    /// Wheel up zooms in; one doubling per 500 px of delta.
    pub fn wheel(&mut self, input: WheelInput) -> bool {
        let unit = if input.delta_mode == 0 {
            1.0
        } else {
            WHEEL_LINE_MULTIPLIER
        };
        let exponent = -input.delta_y * unit / WHEEL_DELTA_DIVISOR;
        self.scale_at(2f64.powf(exponent), input.x, input.y)
    }

    pub fn double_click(&mut self, x: f64, y: f64, shift: bool) -> bool {
        let factor = if shift {
            1.0 / self.config.double_click_factor
        } else {
            self.config.double_click_factor
        };
        self.scale_at(factor, x, y)
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        self.set(ZoomTransform {
            k: self.transform.k,
            x: self.transform.x + dx,
            y: self.transform.y + dy,
        })
    }

    pub fn reset(&mut self) -> bool {
        let k = self.clamp_scale(1.0);
        self.set(ZoomTransform { k, x: 0.0, y: 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::{WheelInput, ZoomController, ZoomTransform};
    use crate::config::ZoomConfig;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn controller() -> ZoomController {
        ZoomController::new(ZoomConfig::default(), 960.0, 500.0)
    }

    #[test]
    fn three_zoom_ins_from_identity() {
        let mut zoom = controller();
        for _ in 0..3 {
            assert!(zoom.zoom_in());
        }
        assert_close(zoom.scale(), 1.728);
    }

    #[test]
    fn zoom_out_at_minimum_is_a_no_op() {
        let mut zoom = controller();
        assert!(!zoom.zoom_out());
        assert_close(zoom.scale(), 1.0);
        assert_eq!(zoom.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn scale_stays_in_extent_under_any_sequence() {
        let mut zoom = controller();
        let deltas = [-900.0, -2000.0, 150.0, 5000.0, -12.0, -3000.0, 40.0];
        for (i, delta) in deltas.iter().enumerate() {
            zoom.wheel(WheelInput {
                delta_y: *delta,
                delta_mode: (i % 2) as u32,
                x: 100.0,
                y: 80.0,
            });
            assert!((1.0..=8.0).contains(&zoom.scale()));
            for _ in 0..i {
                zoom.zoom_in();
                assert!((1.0..=8.0).contains(&zoom.scale()));
            }
            zoom.zoom_out();
            assert!((1.0..=8.0).contains(&zoom.scale()));
        }
        for _ in 0..40 {
            zoom.zoom_in();
        }
        assert_close(zoom.scale(), 8.0);
    }

    #[test]
    fn wheel_keeps_pointer_anchored() {
        let mut zoom = controller();
        let before = zoom.transform().invert(300.0, 200.0);
        assert!(zoom.wheel(WheelInput {
            delta_y: -500.0,
            delta_mode: 0,
            x: 300.0,
            y: 200.0,
        }));
        assert_close(zoom.scale(), 2.0);
        let after = zoom.transform().invert(300.0, 200.0);
        assert_close(after.0, before.0);
        assert_close(after.1, before.1);
    }

    #[test]
    fn line_mode_wheel_is_amplified() {
        let mut zoom = controller();
        zoom.wheel(WheelInput {
            delta_y: -3.0,
            delta_mode: 1,
            x: 0.0,
            y: 0.0,
        });
        assert_close(zoom.scale(), 2f64.powf(360.0 / 500.0));
    }

    #[test]
    fn buttons_zoom_around_center() {
        let mut zoom = controller();
        zoom.zoom_in();
        let (cx, cy) = zoom.transform().apply(480.0, 250.0);
        assert_close(cx, 480.0);
        assert_close(cy, 250.0);
    }

    #[test]
    fn pan_moves_translation_only() {
        let mut zoom = controller();
        zoom.zoom_in();
        let k = zoom.scale();
        assert!(zoom.pan(15.0, -4.0));
        assert_close(zoom.scale(), k);
        assert!(!zoom.pan(0.0, 0.0));
    }

    #[test]
    fn double_click_doubles_and_shift_halves() {
        let mut zoom = controller();
        zoom.double_click(10.0, 10.0, false);
        assert_close(zoom.scale(), 2.0);
        zoom.double_click(10.0, 10.0, true);
        assert_close(zoom.scale(), 1.0);
    }

    #[test]
    fn reset_restores_identity() {
        let mut zoom = controller();
        zoom.zoom_in();
        zoom.pan(30.0, 30.0);
        assert!(zoom.reset());
        assert_eq!(zoom.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn transform_apply_and_invert_are_inverse() {
        let t = ZoomTransform {
            k: 2.5,
            x: -40.0,
            y: 12.0,
        };
        let (sx, sy) = t.apply(100.0, 50.0);
        let (mx, my) = t.invert(sx, sy);
        assert_close(mx, 100.0);
        assert_close(my, 50.0);
    }
}

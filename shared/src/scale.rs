use serde::{Deserialize, Serialize};

/// Continuous linear mapping from a two-point domain to a two-point range.
///
/// Inputs outside the domain extrapolate; callers that need a bounded output
/// clamp the input first (the zoom controller never hands out a scale outside
/// its extent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    #[serde(default)]
    pub round: bool,
}

impl LinearScale {
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    /// Same mapping, but outputs are rounded to the nearest integer.
    pub const fn rounded(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            round: true,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        let out = r0 + (r1 - r0) * t;
        if self.round { out.round() } else { out }
    }

    pub fn domain_min(&self) -> f64 {
        self.domain[0].min(self.domain[1])
    }

    pub fn domain_max(&self) -> f64 {
        self.domain[0].max(self.domain[1])
    }
}

/// Boundary line widths as a function of the current zoom scale.
///
/// Both curves shrink as the map zooms in: the rendered group is magnified,
/// so a thinner stroke keeps borders from thickening on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeWidths {
    pub normal: LinearScale,
    pub highlighted: LinearScale,
}

impl Default for StrokeWidths {
    fn default() -> Self {
        Self {
            normal: LinearScale::new([1.0, 8.0], [0.5, 0.15]),
            highlighted: LinearScale::new([1.0, 8.0], [3.0, 0.4]),
        }
    }
}

impl StrokeWidths {
    pub fn normal(&self, scale: f64) -> f64 {
        self.normal.apply(scale)
    }

    pub fn highlighted(&self, scale: f64) -> f64 {
        self.highlighted.apply(scale)
    }

    pub fn for_state(&self, scale: f64, highlighted: bool) -> f64 {
        if highlighted {
            self.highlighted(scale)
        } else {
            self.normal(scale)
        }
    }
}

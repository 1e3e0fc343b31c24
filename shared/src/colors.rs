use serde::{Deserialize, Serialize};

/// ColorBrewer sequential "Reds", nine classes, light to dark.
pub const REDS_9: [(u8, u8, u8); 9] = [
    (0xff, 0xf5, 0xf0),
    (0xfe, 0xe0, 0xd2),
    (0xfc, 0xbb, 0xa1),
    (0xfc, 0x92, 0x72),
    (0xfb, 0x6a, 0x4a),
    (0xef, 0x3b, 0x2c),
    (0xcb, 0x18, 0x1d),
    (0xa5, 0x0f, 0x15),
    (0x67, 0x00, 0x0d),
];

/// Fill used for countries whose metric is missing or not a number.
pub const NO_DATA_COLOR: (u8, u8, u8) = (0xcc, 0xcc, 0xcc);

/// Format an RGB triple as `#rrggbb`.
pub fn hex_css((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Fill assigned to a thematic region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Bucket(usize),
    NoData,
}

/// Step function from a metric value to one of a fixed set of colors.
///
/// With `n` colors only the first `n - 1` boundaries are active. A value
/// falls into the bucket whose lower boundary it equals or exceeds, so the
/// first bucket is open below and the last is open above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    thresholds: Vec<f64>,
    colors: Vec<(u8, u8, u8)>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new((0..=10).map(f64::from).collect(), REDS_9.to_vec())
    }
}

impl ColorScale {
    pub fn new(thresholds: Vec<f64>, colors: Vec<(u8, u8, u8)>) -> Self {
        Self { thresholds, colors }
    }

    pub fn colors(&self) -> &[(u8, u8, u8)] {
        &self.colors
    }

    pub fn bucket_count(&self) -> usize {
        self.colors.len()
    }

    fn active_thresholds(&self) -> &[f64] {
        let n = self
            .thresholds
            .len()
            .min(self.colors.len().saturating_sub(1));
        &self.thresholds[..n]
    }

    /// Index of the bucket holding `value` (bisect-right over the active thresholds).
    pub fn bucket_index(&self, value: f64) -> usize {
        self.active_thresholds().partition_point(|t| *t <= value)
    }

    pub fn fill(&self, value: Option<f64>) -> Fill {
        match value {
            Some(v) if !v.is_nan() && !self.colors.is_empty() => Fill::Bucket(self.bucket_index(v)),
            _ => Fill::NoData,
        }
    }

    pub fn rgb(&self, fill: Fill) -> (u8, u8, u8) {
        match fill {
            Fill::Bucket(idx) => self.colors.get(idx).copied().unwrap_or(NO_DATA_COLOR),
            Fill::NoData => NO_DATA_COLOR,
        }
    }

    pub fn color(&self, value: Option<f64>) -> (u8, u8, u8) {
        self.rgb(self.fill(value))
    }

    /// `[lower, upper)` boundaries of a bucket; `None` marks an open end.
    pub fn invert_extent(&self, bucket: usize) -> (Option<f64>, Option<f64>) {
        let active = self.active_thresholds();
        let lower = bucket.checked_sub(1).and_then(|i| active.get(i)).copied();
        let upper = active.get(bucket).copied();
        (lower, upper)
    }

    /// Bucket extent with open ends replaced by the given domain bounds.
    pub fn legend_bounds(&self, bucket: usize, domain_min: f64, domain_max: f64) -> (f64, f64) {
        let (lower, upper) = self.invert_extent(bucket);
        (lower.unwrap_or(domain_min), upper.unwrap_or(domain_max))
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorScale, Fill, NO_DATA_COLOR, REDS_9, hex_css};

    #[test]
    fn negative_values_land_in_first_bucket() {
        let scale = ColorScale::default();
        assert_eq!(scale.bucket_index(-0.001), 0);
        assert_eq!(scale.bucket_index(-250.0), 0);
        assert_eq!(scale.color(Some(-3.0)), REDS_9[0]);
    }

    #[test]
    fn large_values_land_in_last_bucket() {
        let scale = ColorScale::default();
        assert_eq!(scale.bucket_index(10.0), 8);
        assert_eq!(scale.bucket_index(15.5), 8);
        assert_eq!(scale.color(Some(10.0)), REDS_9[8]);
    }

    #[test]
    fn boundaries_are_lower_inclusive() {
        let scale = ColorScale::default();
        let bucket = scale.bucket_index(3.0);
        assert_eq!(scale.invert_extent(bucket).0, Some(3.0));
        assert_eq!(scale.bucket_index(2.999), bucket - 1);
    }

    #[test]
    fn buckets_are_monotonic() {
        let scale = ColorScale::default();
        let mut prev = 0;
        for step in -20..=130 {
            let idx = scale.bucket_index(step as f64 * 0.1);
            assert!(idx >= prev);
            prev = idx;
        }
    }

    #[test]
    fn seven_maps_to_bucket_starting_at_seven() {
        let scale = ColorScale::default();
        let bucket = scale.bucket_index(7.0);
        assert_eq!(scale.invert_extent(bucket).0, Some(7.0));
        assert_eq!(scale.color(Some(7.0)), REDS_9[bucket]);
    }

    #[test]
    fn legend_bounds_fill_open_ends() {
        let scale = ColorScale::default();
        assert_eq!(scale.invert_extent(0), (None, Some(0.0)));
        assert_eq!(scale.legend_bounds(0, 0.0, 10.0), (0.0, 0.0));
        assert_eq!(scale.invert_extent(8), (Some(7.0), None));
        assert_eq!(scale.legend_bounds(8, 0.0, 10.0), (7.0, 10.0));
        assert_eq!(scale.legend_bounds(4, 0.0, 10.0), (3.0, 4.0));
    }

    #[test]
    fn missing_values_are_no_data() {
        let scale = ColorScale::default();
        assert_eq!(scale.fill(None), Fill::NoData);
        assert_eq!(scale.fill(Some(f64::NAN)), Fill::NoData);
        assert_eq!(scale.color(None), NO_DATA_COLOR);
    }

    #[test]
    fn hex_css_is_lowercase_and_padded() {
        assert_eq!(hex_css((0x67, 0x00, 0x0d)), "#67000d");
        assert_eq!(hex_css((0xcc, 0xcc, 0xcc)), "#cccccc");
    }
}

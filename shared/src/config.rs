use serde::{Deserialize, Serialize};

use crate::projection::CylindricalEqualArea;
use crate::scale::{LinearScale, StrokeWidths};

pub const DEFAULT_LAND_URL: &str = "data/world-50m.json";
pub const DEFAULT_COUNTRIES_URL: &str = "data/NFACountries_WGC_1984_topojson.json";
pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 500.0;

pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;
pub const TOOLTIP_FADE_IN_MS: u32 = 400;
pub const TOOLTIP_FADE_OUT_MS: u32 = 500;

pub const FOOTER_TEXT: &str = "Data credit: Natural Earth and Global Footprint Network";

/// Everything tunable about the map. Every field has a default, so a partial
/// JSON object (or none at all) yields a working configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    pub data: DataConfig,
    pub projection: CylindricalEqualArea,
    pub zoom: ZoomConfig,
    pub stroke: StrokeWidths,
    pub legend: LegendConfig,
    pub style: StyleConfig,
    pub tooltip: TooltipConfig,
    pub footer: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            data: DataConfig::default(),
            projection: CylindricalEqualArea::default(),
            zoom: ZoomConfig::default(),
            stroke: StrokeWidths::default(),
            legend: LegendConfig::default(),
            style: StyleConfig::default(),
            tooltip: TooltipConfig::default(),
            footer: FOOTER_TEXT.to_string(),
        }
    }
}

impl MapConfig {
    /// Projection centered on the configured viewport.
    pub fn centered_projection(&self) -> CylindricalEqualArea {
        self.projection.centered(self.width, self.height)
    }

    /// Replace the viewport size, ignoring non-positive or non-finite values.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        if width.is_finite() && width > 0.0 {
            self.width = width;
        }
        if height.is_finite() && height > 0.0 {
            self.height = height;
        }
        self
    }
}

/// Where the two datasets live and which objects/properties to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub land_url: String,
    pub land_object: String,
    pub countries_url: String,
    pub countries_object: String,
    pub name_property: String,
    pub metric_property: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            land_url: DEFAULT_LAND_URL.to_string(),
            land_object: "land".to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            countries_object: "Countries".to_string(),
            name_property: "Name".to_string(),
            metric_property: "TotFtprntCons".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Scale factor applied per double-click.
    pub double_click_factor: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 8.0,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
            double_click_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Offset of the legend group from the canvas origin.
    pub origin: (f64, f64),
    /// Metric value to vertical position inside the legend.
    pub y_scale: LinearScale,
    pub swatch_size: f64,
    pub label_x: f64,
    pub labels: Vec<(f64, String)>,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            origin: (18.0, 240.0),
            y_scale: LinearScale::rounded([0.0, 10.0], [0.0, 200.0]),
            swatch_size: 20.0,
            label_x: 28.0,
            labels: vec![
                (10.0, "Low".to_string()),
                (24.0, "Footprint".to_string()),
                (150.0, "High".to_string()),
                (164.0, "Footprint".to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub background: String,
    pub land_fill: String,
    pub land_stroke: String,
    pub country_stroke: String,
    pub highlight_stroke: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: "#eeeeee".to_string(),
            land_fill: "#d9d9d9".to_string(),
            land_stroke: "#ffffff".to_string(),
            country_stroke: "white".to_string(),
            highlight_stroke: "#444444".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub fade_in_ms: u32,
    pub fade_out_ms: u32,
    /// Opacity reached after fading in. Deliberately below 1.
    pub opacity: f64,
    /// Vertical offset from the pointer, in pixels.
    pub offset_y: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: TOOLTIP_FADE_IN_MS,
            fade_out_ms: TOOLTIP_FADE_OUT_MS,
            opacity: 0.8,
            offset_y: -28.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MapConfig;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: MapConfig =
            serde_json::from_str(r#"{"data": {"land_url": "/geo/land.json"}, "width": 1200}"#)
                .unwrap();
        assert_eq!(cfg.data.land_url, "/geo/land.json");
        assert_eq!(cfg.data.countries_object, "Countries");
        assert_eq!(cfg.width, 1200.0);
        assert_eq!(cfg.height, 500.0);
        assert_eq!(cfg.zoom.max_scale, 8.0);
    }

    #[test]
    fn centered_projection_uses_viewport() {
        let cfg = MapConfig::default().with_size(800.0, 600.0);
        let projection = cfg.centered_projection();
        assert_eq!(projection.translate, (400.0, 300.0));
        assert_eq!(projection.scale, 172.0);
        assert_eq!(projection.parallel, 37.5);
    }

    #[test]
    fn with_size_ignores_bad_values() {
        let cfg = MapConfig::default().with_size(0.0, f64::NAN);
        assert_eq!((cfg.width, cfg.height), (960.0, 500.0));
    }
}

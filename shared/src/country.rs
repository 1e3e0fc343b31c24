use geo::MultiPolygon;

use crate::config::DataConfig;
use crate::topology::Feature;

const UNKNOWN_NAME: &str = "Unknown";

/// A country of the thematic layer, in geographic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    /// Total ecological footprint of consumption, in global hectares.
    /// `None` when the dataset has no usable value.
    pub footprint: Option<f64>,
    pub geometry: MultiPolygon<f64>,
}

impl Country {
    pub fn from_feature(feature: Feature, data: &DataConfig) -> Self {
        let name = feature
            .property_str(&data.name_property)
            .unwrap_or(UNKNOWN_NAME)
            .to_string();
        let footprint = feature
            .property_f64(&data.metric_property)
            .filter(|v| v.is_finite());
        Self {
            name,
            footprint,
            geometry: feature.geometry,
        }
    }

    /// Tooltip content: the name on the first line, the value on the second.
    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![format!("{}:", self.name), format_footprint(self.footprint)]
    }
}

/// `"7 gha"`, `"1.25 gha"`, or `"no data"`.
pub fn format_footprint(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v} gha"),
        None => "no data".to_string(),
    }
}

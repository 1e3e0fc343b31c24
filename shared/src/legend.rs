use crate::colors::{ColorScale, Fill};
use crate::config::LegendConfig;

/// One colored square of the legend, positioned inside the legend group.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendSwatch {
    pub color: (u8, u8, u8),
    pub lower: f64,
    pub upper: f64,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Vertical color key. Never zoomed.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub origin: (f64, f64),
    pub swatches: Vec<LegendSwatch>,
    pub labels: Vec<LegendLabel>,
}

impl Legend {
    pub fn build(colors: &ColorScale, config: &LegendConfig) -> Self {
        let y_scale = config.y_scale;
        let (domain_min, domain_max) = (y_scale.domain_min(), y_scale.domain_max());
        let swatches = (0..colors.bucket_count())
            .map(|bucket| {
                let (lower, upper) = colors.legend_bounds(bucket, domain_min, domain_max);
                LegendSwatch {
                    color: colors.rgb(Fill::Bucket(bucket)),
                    lower,
                    upper,
                    x: 0.0,
                    y: y_scale.apply(lower),
                    size: config.swatch_size,
                }
            })
            .collect();
        let labels = config
            .labels
            .iter()
            .map(|(y, text)| LegendLabel {
                x: config.label_x,
                y: *y,
                text: text.clone(),
            })
            .collect();
        Self {
            origin: config.origin,
            swatches,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Legend;
    use crate::colors::{ColorScale, REDS_9};
    use crate::config::LegendConfig;

    #[test]
    fn one_swatch_per_bucket() {
        let legend = Legend::build(&ColorScale::default(), &LegendConfig::default());
        assert_eq!(legend.swatches.len(), 9);
        assert_eq!(legend.origin, (18.0, 240.0));
    }

    #[test]
    fn open_ends_use_domain_bounds() {
        let legend = Legend::build(&ColorScale::default(), &LegendConfig::default());
        let first = &legend.swatches[0];
        let last = &legend.swatches[8];
        assert_eq!((first.lower, first.upper), (0.0, 0.0));
        assert_eq!((last.lower, last.upper), (7.0, 10.0));
    }

    #[test]
    fn swatches_are_placed_by_lower_bound() {
        let legend = Legend::build(&ColorScale::default(), &LegendConfig::default());
        let ys: Vec<f64> = legend.swatches.iter().map(|s| s.y).collect();
        assert_eq!(
            ys,
            vec![0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0]
        );
        assert_eq!(legend.swatches[0].color, REDS_9[0]);
        assert_eq!(legend.swatches[5].color, REDS_9[5]);
        assert!(legend.swatches.iter().all(|s| s.size == 20.0 && s.x == 0.0));
    }

    #[test]
    fn labels_sit_beside_swatches() {
        let legend = Legend::build(&ColorScale::default(), &LegendConfig::default());
        let texts: Vec<&str> = legend.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Low", "Footprint", "High", "Footprint"]);
        assert!(legend.labels.iter().all(|l| l.x == 28.0));
        assert_eq!(legend.labels[2].y, 150.0);
    }
}

pub mod colors;
pub mod config;
pub mod country;
pub mod data;
pub mod error;
pub mod legend;
pub mod map;
pub mod projection;
pub mod scale;
pub mod scene;
pub mod spatial;
pub mod topology;
pub mod zoom;

pub use colors::{ColorScale, Fill};
pub use config::*;
pub use country::Country;
pub use data::{LoadState, MapData};
pub use error::{LoadError, TopologyError};
pub use legend::Legend;
pub use map::{Changes, ChoroplethMap, MapEvent, PointerEvent, Tooltip};
pub use projection::CylindricalEqualArea;
pub use scale::{LinearScale, StrokeWidths};
pub use zoom::{WheelInput, ZoomTransform};

use geo::MultiPolygon;

use crate::config::DataConfig;
use crate::country::Country;
use crate::error::LoadError;
use crate::topology::Topology;

/// Both datasets, decoded and ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    /// Background landmass, drawn as a single path.
    pub land: MultiPolygon<f64>,
    pub countries: Vec<Country>,
}

/// Progress of the one-shot startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

impl MapData {
    /// Decode the raw bodies of both fetches. Errors carry the offending URL.
    pub fn decode(land: &[u8], countries: &[u8], data: &DataConfig) -> Result<Self, LoadError> {
        let land_topo = parse_topology(land, &data.land_url)?;
        let countries_topo = parse_topology(countries, &data.countries_url)?;
        let land = land_topo
            .merged_geometry(&data.land_object)
            .map_err(|source| LoadError::Topology {
                url: data.land_url.clone(),
                source,
            })?;
        let countries = countries_topo
            .features(&data.countries_object)
            .map_err(|source| LoadError::Topology {
                url: data.countries_url.clone(),
                source,
            })?
            .into_iter()
            .map(|feature| Country::from_feature(feature, data))
            .collect();
        Ok(Self { land, countries })
    }
}

fn parse_topology(bytes: &[u8], url: &str) -> Result<Topology, LoadError> {
    Topology::from_slice(bytes).map_err(|e| LoadError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

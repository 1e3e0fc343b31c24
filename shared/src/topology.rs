use std::collections::HashMap;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::TopologyError;

/// A TopoJSON document: shared arcs plus named geometry objects.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub objects: HashMap<String, TopoObject>,
}

/// Quantization transform: `position = quantized * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// One geometry object. Arc references are kept raw and interpreted per `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct TopoObject {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub arcs: Value,
    #[serde(default)]
    pub geometries: Vec<TopoObject>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// A decoded polygonal feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: MultiPolygon<f64>,
}

impl Feature {
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Numeric property; numeric strings are accepted, anything else is `None`.
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TopologyError> {
        serde_json::from_slice(bytes).map_err(|e| TopologyError::Json(e.to_string()))
    }

    fn object(&self, name: &str) -> Result<&TopoObject, TopologyError> {
        self.objects
            .get(name)
            .ok_or_else(|| TopologyError::UnknownObject(name.to_string()))
    }

    /// Arcs in absolute coordinates (delta decoding and transform applied).
    pub fn decoded_arcs(&self) -> Vec<Vec<(f64, f64)>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|pos| pos.len() >= 2)
                    .map(|pos| match self.transform {
                        Some(t) => {
                            x += pos[0];
                            y += pos[1];
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        }
                        None => (pos[0], pos[1]),
                    })
                    .collect()
            })
            .collect()
    }

    /// One feature per polygonal geometry of the named object.
    ///
    /// A `GeometryCollection` yields one feature per member; any other
    /// object yields a single feature. Non-polygonal members are skipped.
    pub fn features(&self, name: &str) -> Result<Vec<Feature>, TopologyError> {
        let object = self.object(name)?;
        let arcs = self.decoded_arcs();
        let members: Vec<&TopoObject> = if object.kind.as_deref() == Some("GeometryCollection") {
            object.geometries.iter().collect()
        } else {
            vec![object]
        };

        let mut features = Vec::with_capacity(members.len());
        for member in members {
            let mut polygons = Vec::new();
            collect_polygons(member, &arcs, &mut polygons)?;
            if polygons.is_empty() && !is_polygonal(member.kind.as_deref()) {
                continue;
            }
            features.push(Feature {
                properties: member.properties.clone().unwrap_or_default(),
                geometry: MultiPolygon(polygons),
            });
        }
        Ok(features)
    }

    /// Every polygon of the named object merged into a single geometry.
    pub fn merged_geometry(&self, name: &str) -> Result<MultiPolygon<f64>, TopologyError> {
        let object = self.object(name)?;
        let arcs = self.decoded_arcs();
        let mut polygons = Vec::new();
        collect_polygons(object, &arcs, &mut polygons)?;
        Ok(MultiPolygon(polygons))
    }
}

fn is_polygonal(kind: Option<&str>) -> bool {
    matches!(kind, Some("Polygon" | "MultiPolygon"))
}

fn collect_polygons(
    object: &TopoObject,
    arcs: &[Vec<(f64, f64)>],
    out: &mut Vec<Polygon<f64>>,
) -> Result<(), TopologyError> {
    match object.kind.as_deref().unwrap_or_default() {
        "GeometryCollection" => {
            for member in &object.geometries {
                collect_polygons(member, arcs, out)?;
            }
        }
        "Polygon" => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(object.arcs.clone())
                .map_err(|e| TopologyError::Json(e.to_string()))?;
            if let Some(polygon) = polygon_from_rings(&rings, arcs)? {
                out.push(polygon);
            }
        }
        "MultiPolygon" => {
            let parts: Vec<Vec<Vec<i64>>> = serde_json::from_value(object.arcs.clone())
                .map_err(|e| TopologyError::Json(e.to_string()))?;
            for rings in &parts {
                if let Some(polygon) = polygon_from_rings(rings, arcs)? {
                    out.push(polygon);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn polygon_from_rings(
    rings: &[Vec<i64>],
    arcs: &[Vec<(f64, f64)>],
) -> Result<Option<Polygon<f64>>, TopologyError> {
    let mut decoded = Vec::with_capacity(rings.len());
    for ring in rings {
        decoded.push(stitch_ring(ring, arcs)?);
    }
    let mut iter = decoded.into_iter();
    let Some(exterior) = iter.next() else {
        return Ok(None);
    };
    Ok(Some(Polygon::new(exterior, iter.collect())))
}

/// Concatenate referenced arcs into one ring. A negative index `i` refers to
/// arc `!i` traversed backwards; shared endpoints are emitted once.
fn stitch_ring(refs: &[i64], arcs: &[Vec<(f64, f64)>]) -> Result<LineString<f64>, TopologyError> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &index in refs {
        let (arc_idx, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_idx)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcIndexOutOfRange(index))?;

        points.pop();
        if reversed {
            points.extend(arc.iter().rev().map(|&(x, y)| Coord { x, y }));
        } else {
            points.extend(arc.iter().map(|&(x, y)| Coord { x, y }));
        }
    }
    // Degenerate rings are padded so they still close.
    while !points.is_empty() && points.len() < 4 {
        points.push(points[0]);
    }
    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use super::Topology;
    use crate::error::TopologyError;

    const SQUARES: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [0, 10], [10, 10]],
            [[10, 10], [10, 0]],
            [[10, 0], [0, 0]],
            [[10, 10], [20, 10], [20, 0], [10, 0]]
        ],
        "objects": {
            "Countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1, 2]], "properties": {"Name": "West", "TotFtprntCons": 2.5}},
                    {"type": "Polygon", "arcs": [[3, -2]], "properties": {"Name": "East", "TotFtprntCons": null}},
                    {"type": "Point", "coordinates": [1, 1]}
                ]
            }
        }
    }"#;

    #[test]
    fn decodes_shared_and_reversed_arcs() {
        let topo = Topology::from_slice(SQUARES.as_bytes()).unwrap();
        let features = topo.features("Countries").unwrap();
        assert_eq!(features.len(), 2);

        let west = &features[0].geometry.0[0];
        let west_points: Vec<(f64, f64)> = west.exterior().points().map(|p| (p.x(), p.y())).collect();
        assert_eq!(
            west_points,
            vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]
        );

        let east = &features[1].geometry.0[0];
        let east_points: Vec<(f64, f64)> = east.exterior().points().map(|p| (p.x(), p.y())).collect();
        assert_eq!(
            east_points,
            vec![(10.0, 10.0), (20.0, 10.0), (20.0, 0.0), (10.0, 0.0), (10.0, 10.0)]
        );
    }

    #[test]
    fn keeps_properties() {
        let topo = Topology::from_slice(SQUARES.as_bytes()).unwrap();
        let features = topo.features("Countries").unwrap();
        assert_eq!(features[0].property_str("Name"), Some("West"));
        assert_eq!(features[0].property_f64("TotFtprntCons"), Some(2.5));
        assert_eq!(features[1].property_f64("TotFtprntCons"), None);
    }

    #[test]
    fn applies_quantization_transform() {
        let json = r#"{
            "type": "Topology",
            "transform": {"scale": [0.5, 2.0], "translate": [-180, -90]},
            "arcs": [[[0, 0], [4, 0], [0, 3], [-4, 0], [0, -3]]],
            "objects": {"land": {"type": "MultiPolygon", "arcs": [[[0]]]}}
        }"#;
        let topo = Topology::from_slice(json.as_bytes()).unwrap();
        let land = topo.merged_geometry("land").unwrap();
        let points: Vec<(f64, f64)> = land.0[0].exterior().points().map(|p| (p.x(), p.y())).collect();
        assert_eq!(
            points,
            vec![
                (-180.0, -90.0),
                (-178.0, -90.0),
                (-178.0, -84.0),
                (-180.0, -84.0),
                (-180.0, -90.0)
            ]
        );
    }

    #[test]
    fn merged_geometry_flattens_collection() {
        let topo = Topology::from_slice(SQUARES.as_bytes()).unwrap();
        let merged = topo.merged_geometry("Countries").unwrap();
        assert_eq!(merged.0.len(), 2);
    }

    #[test]
    fn unknown_object_is_an_error() {
        let topo = Topology::from_slice(SQUARES.as_bytes()).unwrap();
        assert_eq!(
            topo.features("countries").unwrap_err(),
            TopologyError::UnknownObject("countries".to_string())
        );
    }

    #[test]
    fn out_of_range_arc_is_an_error() {
        let json = r#"{
            "type": "Topology",
            "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]],
            "objects": {"land": {"type": "Polygon", "arcs": [[0, 3]]}}
        }"#;
        let topo = Topology::from_slice(json.as_bytes()).unwrap();
        assert_eq!(
            topo.merged_geometry("land").unwrap_err(),
            TopologyError::ArcIndexOutOfRange(3)
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Topology::from_slice(b"{\"objects\": 3}"),
            Err(TopologyError::Json(_))
        ));
    }
}

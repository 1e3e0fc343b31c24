use geo::{BoundingRect, MultiPolygon, Rect};

/// Stable handle to a drawable node. Survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Basemap,
    Thematic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

/// One projected path in the display list.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub layer: Layer,
    /// Index into the country list for thematic nodes.
    pub feature: Option<usize>,
    /// Geometry in map space (projected, before the zoom transform).
    pub geometry: MultiPolygon<f64>,
    pub bounds: Option<Rect<f64>>,
    pub style: PathStyle,
}

/// Retained display list for the zoomable group.
///
/// Layers draw in a fixed order (basemap under thematic). Within a layer,
/// later nodes paint over earlier ones, so moving a node to the end of its
/// layer brings it to the front.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    basemap: Vec<SceneNode>,
    thematic: Vec<SceneNode>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.basemap.is_empty() && self.thematic.is_empty()
    }

    fn push(
        &mut self,
        layer: Layer,
        feature: Option<usize>,
        geometry: MultiPolygon<f64>,
        style: PathStyle,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let node = SceneNode {
            id,
            layer,
            feature,
            bounds: geometry.bounding_rect(),
            geometry,
            style,
        };
        match layer {
            Layer::Basemap => self.basemap.push(node),
            Layer::Thematic => self.thematic.push(node),
        }
        id
    }

    pub fn append_basemap(&mut self, geometry: MultiPolygon<f64>, style: PathStyle) -> NodeId {
        self.push(Layer::Basemap, None, geometry, style)
    }

    pub fn append_thematic(
        &mut self,
        feature: usize,
        geometry: MultiPolygon<f64>,
        style: PathStyle,
    ) -> NodeId {
        self.push(Layer::Thematic, Some(feature), geometry, style)
    }

    pub fn basemap(&self) -> &[SceneNode] {
        &self.basemap
    }

    pub fn thematic(&self) -> &[SceneNode] {
        &self.thematic
    }

    /// Nodes in paint order.
    pub fn draw_order(&self) -> impl Iterator<Item = &SceneNode> {
        self.basemap.iter().chain(self.thematic.iter())
    }

    fn layer_mut(&mut self, id: NodeId) -> Option<(&mut Vec<SceneNode>, usize)> {
        if let Some(pos) = self.basemap.iter().position(|n| n.id == id) {
            return Some((&mut self.basemap, pos));
        }
        let pos = self.thematic.iter().position(|n| n.id == id)?;
        Some((&mut self.thematic, pos))
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.draw_order().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        let (layer, pos) = self.layer_mut(id)?;
        layer.get_mut(pos)
    }

    /// Paint position of a node within its layer (higher paints later).
    pub fn z_index(&self, id: NodeId) -> Option<usize> {
        self.basemap
            .iter()
            .position(|n| n.id == id)
            .or_else(|| self.thematic.iter().position(|n| n.id == id))
    }

    /// Move a node to the end of its layer. Returns false for unknown ids.
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        let Some((layer, pos)) = self.layer_mut(id) else {
            return false;
        };
        let node = layer.remove(pos);
        layer.push(node);
        true
    }

    pub fn thematic_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.thematic.iter_mut()
    }
}

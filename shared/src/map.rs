use crate::colors::{ColorScale, hex_css};
use crate::config::MapConfig;
use crate::country::Country;
use crate::data::{LoadState, MapData};
use crate::error::LoadError;
use crate::legend::Legend;
use crate::scene::{NodeId, PathStyle, Scene};
use crate::spatial::SpatialGrid;
use crate::zoom::{WheelInput, ZoomController, ZoomTransform};

/// Pointer position in canvas-local and page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

/// Every input the map reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp,
    PointerLeave,
    Wheel(WheelInput),
    DoubleClick { pointer: PointerEvent, shift: bool },
    Pinch { factor: f64, x: f64, y: f64 },
    ZoomIn,
    ZoomOut,
    Reset,
}

/// What a handled event invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub redraw: bool,
    pub tooltip: bool,
}

impl Changes {
    const NONE: Self = Self {
        redraw: false,
        tooltip: false,
    };
    const REDRAW: Self = Self {
        redraw: true,
        tooltip: false,
    };
    const ALL: Self = Self {
        redraw: true,
        tooltip: true,
    };

    pub fn any(&self) -> bool {
        self.redraw || self.tooltip
    }

    fn merge(self, other: Self) -> Self {
        Self {
            redraw: self.redraw || other.redraw,
            tooltip: self.tooltip || other.tooltip,
        }
    }
}

/// The reusable hover tooltip. `opacity` is the transition target, reached
/// over `transition_ms`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    pub lines: Vec<String>,
    pub left: f64,
    pub top: f64,
    pub opacity: f64,
    pub transition_ms: u32,
}

impl Tooltip {
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Choropleth state: display list, zoom, hover and tooltip.
#[derive(Debug, Clone)]
pub struct ChoroplethMap {
    config: MapConfig,
    colors: ColorScale,
    zoom: ZoomController,
    scene: Scene,
    grid: SpatialGrid,
    countries: Vec<Country>,
    hovered: Option<NodeId>,
    tooltip: Tooltip,
    drag_from: Option<(f64, f64)>,
    last_pointer: Option<PointerEvent>,
    load_state: LoadState,
}

impl ChoroplethMap {
    pub fn new(config: MapConfig) -> Self {
        let zoom = ZoomController::new(config.zoom, config.width, config.height);
        Self {
            config,
            colors: ColorScale::default(),
            zoom,
            scene: Scene::new(),
            grid: SpatialGrid::default(),
            countries: Vec::new(),
            hovered: None,
            tooltip: Tooltip::default(),
            drag_from: None,
            last_pointer: None,
            load_state: LoadState::Loading,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn colors(&self) -> &ColorScale {
        &self.colors
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    /// Current zoom scale. Stroke widths are always derived from this.
    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn legend(&self) -> Legend {
        Legend::build(&self.colors, &self.config.legend)
    }

    pub fn hovered_country(&self) -> Option<&Country> {
        let node = self.scene.node(self.hovered?)?;
        self.countries.get(node.feature?)
    }

    /// Consume the joined result of both fetches. Only a success touches the
    /// scene; a failure is recorded and nothing is drawn.
    pub fn apply_load(&mut self, result: Result<MapData, LoadError>) -> &LoadState {
        match result {
            Ok(data) => {
                self.populate(data);
                self.load_state = LoadState::Ready;
            }
            Err(err) => {
                self.load_state = LoadState::Failed(err.to_string());
            }
        }
        &self.load_state
    }

    /// Project and append the basemap, then the thematic layer.
    fn populate(&mut self, data: MapData) {
        if !self.scene.is_empty() {
            return;
        }
        let projection = self.config.centered_projection();
        let style = &self.config.style;

        self.scene.append_basemap(
            projection.project_geometry(&data.land),
            PathStyle {
                fill: style.land_fill.clone(),
                stroke: style.land_stroke.clone(),
                stroke_width: 0.0,
            },
        );

        let width = self.config.stroke.normal(self.zoom.scale());
        for (idx, country) in data.countries.iter().enumerate() {
            let fill = hex_css(self.colors.color(country.footprint));
            self.scene.append_thematic(
                idx,
                projection.project_geometry(&country.geometry),
                PathStyle {
                    fill,
                    stroke: style.country_stroke.clone(),
                    stroke_width: width,
                },
            );
        }
        self.countries = data.countries;
        self.grid = SpatialGrid::build(&self.scene);
    }

    pub fn handle(&mut self, event: MapEvent) -> Changes {
        match event {
            MapEvent::PointerDown(p) => {
                self.drag_from = Some((p.x, p.y));
                self.last_pointer = Some(p);
                self.hover_at(p)
            }
            MapEvent::PointerMove(p) => {
                self.last_pointer = Some(p);
                match self.drag_from {
                    Some((x0, y0)) => {
                        self.drag_from = Some((p.x, p.y));
                        self.zoomed(|zoom| zoom.pan(p.x - x0, p.y - y0))
                    }
                    None => self.hover_at(p),
                }
            }
            MapEvent::PointerUp => {
                self.drag_from = None;
                Changes::NONE
            }
            MapEvent::PointerLeave => {
                self.drag_from = None;
                self.last_pointer = None;
                self.leave()
            }
            MapEvent::Wheel(input) => self.zoomed(|zoom| zoom.wheel(input)),
            MapEvent::DoubleClick { pointer, shift } => {
                self.zoomed(|zoom| zoom.double_click(pointer.x, pointer.y, shift))
            }
            MapEvent::Pinch { factor, x, y } => self.zoomed(|zoom| zoom.scale_at(factor, x, y)),
            MapEvent::ZoomIn => self.zoomed(ZoomController::zoom_in),
            MapEvent::ZoomOut => self.zoomed(ZoomController::zoom_out),
            MapEvent::Reset => self.zoomed(ZoomController::reset),
        }
    }

    fn zoomed(&mut self, apply: impl FnOnce(&mut ZoomController) -> bool) -> Changes {
        if !apply(&mut self.zoom) {
            return Changes::NONE;
        }
        self.refresh_strokes();
        // The content under a resting pointer may have changed.
        let hover = match self.last_pointer {
            Some(p) => self.hover_at(p),
            None => Changes::NONE,
        };
        Changes::REDRAW.merge(hover)
    }

    /// Re-derive every country stroke width from the current scale.
    fn refresh_strokes(&mut self) {
        let scale = self.zoom.scale();
        let widths = self.config.stroke;
        let hovered = self.hovered;
        for node in self.scene.thematic_mut() {
            node.style.stroke_width = widths.for_state(scale, Some(node.id) == hovered);
        }
    }

    fn hover_at(&mut self, pointer: PointerEvent) -> Changes {
        let (mx, my) = self.zoom.transform().invert(pointer.x, pointer.y);
        let hit = self.grid.find_at(&self.scene, mx, my);
        if hit == self.hovered {
            return Changes::NONE;
        }
        self.leave();
        if let Some(id) = hit {
            self.enter(id, pointer);
        }
        Changes::ALL
    }

    fn enter(&mut self, id: NodeId, pointer: PointerEvent) {
        let width = self.config.stroke.highlighted(self.zoom.scale());
        self.scene.bring_to_front(id);
        let Some(node) = self.scene.node_mut(id) else {
            return;
        };
        node.style.stroke = self.config.style.highlight_stroke.clone();
        node.style.stroke_width = width;
        let lines = node
            .feature
            .and_then(|idx| self.countries.get(idx))
            .map(Country::tooltip_lines)
            .unwrap_or_default();

        self.hovered = Some(id);
        self.tooltip = Tooltip {
            lines,
            left: pointer.page_x,
            top: pointer.page_y + self.config.tooltip.offset_y,
            opacity: self.config.tooltip.opacity,
            transition_ms: self.config.tooltip.fade_in_ms,
        };
    }

    fn leave(&mut self) -> Changes {
        let Some(id) = self.hovered.take() else {
            return Changes::NONE;
        };
        let width = self.config.stroke.normal(self.zoom.scale());
        if let Some(node) = self.scene.node_mut(id) {
            node.style.stroke = self.config.style.country_stroke.clone();
            node.style.stroke_width = width;
        }
        self.tooltip.opacity = 0.0;
        self.tooltip.transition_ms = self.config.tooltip.fade_out_ms;
        Changes::ALL
    }
}

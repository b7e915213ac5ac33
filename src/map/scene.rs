use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// `[latitude, longitude]` in degrees. Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LatLng(pub f64, pub f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
pub struct LayerId(u64);

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: LatLng(20.0, 0.0),
            zoom: 2,
            min_zoom: 2,
            max_zoom: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Icon {
    pub url: String,
    #[schema(value_type = Vec<u32>)]
    pub size: [u32; 2],
    #[schema(value_type = Vec<u32>)]
    pub anchor: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Marker {
    pub position: LatLng,
    pub icon: Icon,
    pub popup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Circle {
    pub center: LatLng,
    pub radius_m: f64,
    pub style: PathStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Polyline {
    pub points: Vec<LatLng>,
    pub style: PathStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Marker(Marker),
    Circle(Circle),
    Polyline(Polyline),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LayerEntry {
    pub id: LayerId,
    #[serde(flatten)]
    pub layer: Layer,
}

/// Serializable copy of the scene handed to the browser map widget.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SceneSnapshot {
    pub view: MapView,
    pub layers: Vec<LayerEntry>,
}

/// Retained-mode map: a view plus an ordered set of layers addressed by id.
#[derive(Debug, Default)]
pub struct MapScene {
    view: MapView,
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
}

impl MapScene {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            layers: BTreeMap::new(),
            next_id: 0,
        }
    }

    #[cfg(test)]
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Re-centers the view. Zoom is clamped to the view's bounds.
    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view.center = center;
        self.view.zoom = zoom.clamp(self.view.min_zoom, self.view.max_zoom);
    }

    pub fn add_marker(&mut self, marker: Marker) -> LayerId {
        self.insert(Layer::Marker(marker))
    }

    pub fn add_circle(&mut self, circle: Circle) -> LayerId {
        self.insert(Layer::Circle(circle))
    }

    pub fn add_polyline(&mut self, polyline: Polyline) -> LayerId {
        self.insert(Layer::Polyline(polyline))
    }

    /// Returns false if `id` is not a marker on this scene.
    pub fn move_marker(&mut self, id: LayerId, position: LatLng) -> bool {
        match self.layers.get_mut(&id) {
            Some(Layer::Marker(marker)) => {
                marker.position = position;
                true
            }
            _ => false,
        }
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.layers.remove(&id)
    }

    #[cfg(test)]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[cfg(test)]
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Polyline(p) => Some(p),
            _ => None,
        })
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            view: self.view.clone(),
            layers: self
                .layers
                .iter()
                .map(|(id, layer)| LayerEntry {
                    id: *id,
                    layer: layer.clone(),
                })
                .collect(),
        }
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }
}

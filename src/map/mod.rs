mod scene;

pub use scene::{
    Circle, Icon, LatLng, Layer, LayerId, MapScene, MapView, Marker, PathStyle, Polyline,
    SceneSnapshot,
};

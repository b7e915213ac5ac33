use std::collections::VecDeque;

use crate::map::{LatLng, LayerId, MapScene, PathStyle, Polyline};

const TRAIL_WEIGHT: f64 = 2.0;

/// One drawn piece of the trail between two consecutive points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSegment {
    pub from: LatLng,
    pub to: LatLng,
    pub opacity: f64,
}

/// Fixed-capacity FIFO of recent positions, oldest first.
#[derive(Debug)]
pub struct TrailBuffer {
    points: VecDeque<LatLng>,
    capacity: usize,
    layers: Vec<LayerId>,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
            layers: Vec::new(),
        }
    }

    pub fn append(&mut self, point: LatLng) {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn points(&self) -> impl Iterator<Item = &LatLng> {
        self.points.iter()
    }

    /// Segment `i` joins points `i` and `i + 1` with opacity `(i + 1) / len`;
    /// the oldest segment is the faintest.
    pub fn segments(&self) -> Vec<TrailSegment> {
        let len = self.points.len();
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .enumerate()
            .map(|(i, (from, to))| TrailSegment {
                from: *from,
                to: *to,
                opacity: (i + 1) as f64 / len as f64,
            })
            .collect()
    }

    /// Drops every previously drawn segment and draws the current trail.
    pub fn render(&mut self, scene: &mut MapScene) {
        for id in self.layers.drain(..) {
            scene.remove_layer(id);
        }

        for segment in self.segments() {
            let id = scene.add_polyline(Polyline {
                points: vec![segment.from, segment.to],
                style: PathStyle {
                    color: format!("rgba(0,0,0,{:.2})", segment.opacity),
                    weight: TRAIL_WEIGHT,
                    opacity: segment.opacity,
                    ..PathStyle::default()
                },
            });
            self.layers.push(id);
        }
    }
}

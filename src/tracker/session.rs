use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use super::display::DisplayState;
use super::history::OrbitHistory;
use super::toggle::{TrackingIndicator, TrackingToggle};
use super::trail::TrailBuffer;
use crate::map::{
    Circle, Icon, LatLng, LayerId, MapScene, MapView, Marker, PathStyle, SceneSnapshot,
};
use crate::provider::Position;

const ISS_ICON_URL: &str =
    "https://raw.githubusercontent.com/MicrosoftStudentChapter/ISS-Tracker/main/iss.png";
const ISS_POPUP: &str = "International Space Station 🛰️";
const FOOTPRINT_COLOR: &str = "#0ea5e9";
const FOLLOW_ZOOM: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    Polling,
    AwaitingAuxData,
    Rendering,
}

/// Result of committing a cycle's display update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// A newer position reached the map first.
    Stale,
    Applied { load_history: bool },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrackerStatus {
    pub phase: CyclePhase,
    pub tracking: TrackingIndicator,
    pub display: Option<DisplayState>,
    pub trail_points: usize,
    pub history_loaded: bool,
}

/// Everything the update cycle mutates: map layers, trail, display fields,
/// tracking gate and the generation counter that orders cycles.
#[derive(Debug)]
pub struct Session {
    scene: MapScene,
    marker: LayerId,
    footprint: Option<LayerId>,
    trail: TrailBuffer,
    history: OrbitHistory,
    display: Option<DisplayState>,
    tracking: TrackingToggle,
    phase: CyclePhase,
    generation: u64,
    // positions from cycles below this are discarded
    floor: u64,
    // generation whose position is on the map; only it may write the display
    applied: u64,
    centered: bool,
}

impl Session {
    pub fn new(trail_capacity: usize, tracking: bool) -> Self {
        let mut scene = MapScene::new(MapView::default());
        let marker = scene.add_marker(Marker {
            position: LatLng(0.0, 0.0),
            icon: Icon {
                url: ISS_ICON_URL.to_string(),
                size: [40, 40],
                anchor: [20, 20],
            },
            popup: Some(ISS_POPUP.to_string()),
        });

        Self {
            scene,
            marker,
            footprint: None,
            trail: TrailBuffer::new(trail_capacity),
            history: OrbitHistory::default(),
            display: None,
            tracking: TrackingToggle::new(tracking),
            phase: CyclePhase::Idle,
            generation: 0,
            floor: 0,
            applied: 0,
            centered: false,
        }
    }

    /// Starts a cycle and returns its generation, or `None` while paused.
    pub fn begin_cycle(&mut self) -> Option<u64> {
        if !self.tracking.is_enabled() {
            return None;
        }
        self.generation += 1;
        self.phase = CyclePhase::Polling;
        Some(self.generation)
    }

    pub fn abort_cycle(&mut self, generation: u64) {
        if generation == self.generation {
            self.phase = CyclePhase::Idle;
        }
    }

    /// Moves the marker, redraws the footprint and extends the trail.
    /// Returns false without touching the map if a newer position or a
    /// pause got there first.
    pub fn apply_position(&mut self, generation: u64, position: &Position) -> bool {
        if generation < self.floor {
            return false;
        }
        self.floor = generation;
        self.applied = generation;

        let here = LatLng(position.latitude, position.longitude);
        self.scene.move_marker(self.marker, here);
        if !self.centered {
            self.centered = true;
            self.scene.set_view(here, FOLLOW_ZOOM);
        }

        if let Some(previous) = self.footprint.take() {
            self.scene.remove_layer(previous);
        }
        self.footprint = Some(self.scene.add_circle(Circle {
            center: here,
            radius_m: footprint_radius_m(position.footprint),
            style: PathStyle {
                color: FOOTPRINT_COLOR.to_string(),
                weight: 1.0,
                opacity: 1.0,
                fill_color: Some(FOOTPRINT_COLOR.to_string()),
                fill_opacity: Some(0.08),
                dash_array: None,
            },
        }));

        self.trail.append(here);
        self.trail.render(&mut self.scene);

        self.phase = CyclePhase::AwaitingAuxData;
        true
    }

    /// Location label is in; display fields are being written.
    pub fn mark_rendering(&mut self, generation: u64) {
        if generation == self.applied {
            self.phase = CyclePhase::Rendering;
        }
    }

    /// Writes the display for the cycle whose position is on the map. A
    /// pause since `apply_position` does not block it, a newer position does.
    pub fn commit_display(&mut self, generation: u64, display: DisplayState) -> Commit {
        if generation != self.applied {
            return Commit::Stale;
        }
        self.display = Some(display);
        self.phase = CyclePhase::Idle;
        Commit::Applied {
            load_history: self.history.claim(),
        }
    }

    /// Flips tracking. Pausing drops every in-flight cycle that has not
    /// moved the map yet.
    pub fn toggle_tracking(&mut self) -> TrackingIndicator {
        if !self.tracking.toggle() {
            self.floor = self.generation + 1;
            self.phase = CyclePhase::Idle;
        }
        self.tracking.indicator()
    }

    pub fn set_history_task(&mut self, task: JoinHandle<()>) {
        self.history.set_task(task);
    }

    pub fn apply_history(&mut self, path: Vec<LatLng>) {
        self.history.render(&mut self.scene, path);
    }

    pub fn abort_history(&mut self) {
        self.history.abort();
    }

    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    #[cfg(test)]
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    #[cfg(test)]
    pub fn history(&self) -> &OrbitHistory {
        &self.history
    }

    #[cfg(test)]
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    #[cfg(test)]
    pub fn marker_position(&self) -> Option<LatLng> {
        use crate::map::Layer;
        match self.scene.layer(self.marker) {
            Some(Layer::Marker(marker)) => Some(marker.position),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn footprint(&self) -> Option<&Circle> {
        use crate::map::Layer;
        match self.footprint.and_then(|id| self.scene.layer(id)) {
            Some(Layer::Circle(circle)) => Some(circle),
            _ => None,
        }
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            phase: self.phase,
            tracking: self.tracking.indicator(),
            display: self.display.clone(),
            trail_points: self.trail.len(),
            history_loaded: self.history.is_rendered(),
        }
    }
}

/// Footprint is a diameter in km; the circle wants a radius in meters.
pub fn footprint_radius_m(footprint_km: f64) -> f64 {
    footprint_km * 1000.0 / 2.0
}

/// Cloneable handle to the session shared by the poller and web handlers.
#[derive(Debug, Clone)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> TrackerStatus {
        self.lock().status()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.lock().scene().snapshot()
    }

    pub fn toggle_tracking(&self) -> TrackingIndicator {
        self.lock().toggle_tracking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn position(lat: f64, lon: f64) -> Position {
        Position {
            latitude: lat,
            longitude: lon,
            altitude: 420.0,
            velocity: 27600.0,
            footprint: 4500.0,
            visibility: Some("eclipsed".into()),
        }
    }

    fn display(p: &Position) -> DisplayState {
        DisplayState::new(p, "Somewhere".into(), Utc::now())
    }

    #[test]
    fn footprint_radius_is_half_the_diameter_in_meters() {
        assert_eq!(footprint_radius_m(4500.0), 2_250_000.0);
    }

    #[test]
    fn paused_session_does_not_start_cycles() {
        let mut session = Session::new(50, false);
        assert_eq!(session.begin_cycle(), None);
        assert_eq!(session.phase(), CyclePhase::Idle);
    }

    #[test]
    fn full_cycle_updates_map_and_display() {
        let mut session = Session::new(50, true);
        let generation = session.begin_cycle().unwrap();
        assert_eq!(session.phase(), CyclePhase::Polling);

        let p = position(10.0, 20.0);
        assert!(session.apply_position(generation, &p));
        assert_eq!(session.phase(), CyclePhase::AwaitingAuxData);
        assert_eq!(session.marker_position(), Some(LatLng(10.0, 20.0)));
        assert_eq!(session.footprint().unwrap().radius_m, 2_250_000.0);
        assert_eq!(session.scene().view().center, LatLng(10.0, 20.0));
        assert_eq!(session.scene().view().zoom, 3);

        session.mark_rendering(generation);
        assert_eq!(session.phase(), CyclePhase::Rendering);

        let commit = session.commit_display(generation, display(&p));
        assert_eq!(commit, Commit::Applied { load_history: true });
        assert_eq!(session.phase(), CyclePhase::Idle);
        assert_eq!(session.display().unwrap().latitude, "10.00");
    }

    #[test]
    fn view_is_centered_only_on_first_position() {
        let mut session = Session::new(50, true);
        let first = session.begin_cycle().unwrap();
        session.apply_position(first, &position(10.0, 20.0));
        let second = session.begin_cycle().unwrap();
        session.apply_position(second, &position(11.0, 25.0));

        assert_eq!(session.scene().view().center, LatLng(10.0, 20.0));
        assert_eq!(session.marker_position(), Some(LatLng(11.0, 25.0)));
    }

    #[test]
    fn footprint_circle_is_replaced_not_accumulated() {
        let mut session = Session::new(50, true);
        for i in 0..3 {
            let generation = session.begin_cycle().unwrap();
            session.apply_position(generation, &position(i as f64, 0.0));
        }
        // marker + footprint + two trail segments
        assert_eq!(session.scene().len(), 4);
    }

    #[test]
    fn overtaken_cycle_is_discarded() {
        let mut session = Session::new(50, true);
        let slow = session.begin_cycle().unwrap();
        let fast = session.begin_cycle().unwrap();

        let newer = position(5.0, 5.0);
        assert!(session.apply_position(fast, &newer));
        assert!(matches!(
            session.commit_display(fast, display(&newer)),
            Commit::Applied { .. }
        ));

        let older = position(1.0, 1.0);
        assert!(!session.apply_position(slow, &older));
        assert_eq!(session.commit_display(slow, display(&older)), Commit::Stale);
        assert_eq!(session.marker_position(), Some(LatLng(5.0, 5.0)));
        assert_eq!(session.trail().len(), 1);
    }

    #[test]
    fn older_cycle_cannot_commit_after_newer_position() {
        let mut session = Session::new(50, true);
        let first = session.begin_cycle().unwrap();
        let p1 = position(1.0, 1.0);
        assert!(session.apply_position(first, &p1));

        let second = session.begin_cycle().unwrap();
        let p2 = position(2.0, 2.0);
        assert!(session.apply_position(second, &p2));

        // first cycle finishes geocoding late
        assert_eq!(session.commit_display(first, display(&p1)), Commit::Stale);
        assert!(session.display().is_none());
        session.commit_display(second, display(&p2));
        assert_eq!(session.display().unwrap().position, p2);
    }

    #[test]
    fn pausing_discards_in_flight_cycle() {
        let mut session = Session::new(50, true);
        let generation = session.begin_cycle().unwrap();

        let indicator = session.toggle_tracking();
        assert!(!indicator.tracking);

        assert!(!session.apply_position(generation, &position(1.0, 1.0)));
        assert_eq!(session.marker_position(), Some(LatLng(0.0, 0.0)));
        assert!(session.footprint().is_none());

        session.toggle_tracking();
        let resumed = session.begin_cycle().unwrap();
        assert!(session.apply_position(resumed, &position(3.0, 4.0)));
        assert_eq!(session.marker_position(), Some(LatLng(3.0, 4.0)));
    }

    #[test]
    fn pause_after_position_still_commits_display() {
        let mut session = Session::new(50, true);
        let first = session.begin_cycle().unwrap();
        let p1 = position(1.0, 1.0);
        assert!(session.apply_position(first, &p1));
        session.commit_display(first, display(&p1));

        let second = session.begin_cycle().unwrap();
        let p2 = position(9.0, 9.0);
        assert!(session.apply_position(second, &p2));
        session.toggle_tracking();

        session.mark_rendering(second);
        assert!(matches!(
            session.commit_display(second, display(&p2)),
            Commit::Applied { .. }
        ));
        assert_eq!(session.marker_position(), Some(LatLng(9.0, 9.0)));
        assert_eq!(session.trail().len(), 2);
        assert_eq!(session.display().unwrap().latitude, "9.00");
        assert_eq!(session.phase(), CyclePhase::Idle);

        // paused, so nothing new starts
        assert_eq!(session.begin_cycle(), None);
    }

    #[test]
    fn cycle_that_never_applied_cannot_commit() {
        let mut session = Session::new(50, true);
        let generation = session.begin_cycle().unwrap();
        let p = position(4.0, 4.0);
        assert_eq!(session.commit_display(generation, display(&p)), Commit::Stale);
        assert!(session.display().is_none());
    }
}

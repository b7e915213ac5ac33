use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::display::DisplayState;
use super::history::fetch_orbit_history;
use super::location::LocationResolver;
use super::session::{Commit, SharedSession};
use crate::provider::{ReverseGeocoder, SatelliteSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CycleOutcome {
    /// Tracking is paused.
    Skipped,
    /// Position fetch failed.
    Failed,
    /// A newer cycle or a pause overtook this one.
    Stale,
    Updated,
}

/// Runs update cycles against one session.
pub struct Controller<S, G> {
    source: Arc<S>,
    resolver: LocationResolver<G>,
    session: SharedSession,
}

impl<S: SatelliteSource, G: ReverseGeocoder> Controller<S, G> {
    pub fn new(source: S, geocoder: G, session: SharedSession) -> Self {
        Self {
            source: Arc::new(source),
            resolver: LocationResolver::new(geocoder),
            session,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let started = self.session.lock().begin_cycle();
        let Some(generation) = started else {
            debug!("Tracking paused, skipping tick");
            return CycleOutcome::Skipped;
        };

        let position = match self.source.current_position().await {
            Ok(position) => position,
            Err(e) => {
                error!("Failed to fetch ISS data: {}", e);
                self.session.lock().abort_cycle(generation);
                return CycleOutcome::Failed;
            }
        };

        let applied = self.session.lock().apply_position(generation, &position);
        if !applied {
            debug!("Discarding position from superseded cycle {}", generation);
            return CycleOutcome::Stale;
        }

        let label = self
            .resolver
            .resolve(position.latitude, position.longitude)
            .await;
        self.session.lock().mark_rendering(generation);
        let now = Utc::now();
        let display = DisplayState::new(&position, label, now);
        let summary = display.map_label.clone();

        let commit = self.session.lock().commit_display(generation, display);
        match commit {
            Commit::Stale => {
                debug!("Discarding display from superseded cycle {}", generation);
                CycleOutcome::Stale
            }
            Commit::Applied { load_history } => {
                info!("ISS over {}", summary);
                if load_history {
                    self.spawn_history(now);
                }
                CycleOutcome::Updated
            }
        }
    }

    /// Loads the past-orbit line in the background. Failures only log.
    fn spawn_history(&self, now: DateTime<Utc>) {
        let source = Arc::clone(&self.source);
        let session = self.session.clone();

        let task = tokio::spawn(async move {
            match fetch_orbit_history(source.as_ref(), now).await {
                Ok(path) => {
                    debug!("Loaded orbit history ({} points)", path.len());
                    session.lock().apply_history(path);
                }
                Err(e) => warn!("Failed to load orbit history: {}", e),
            }
        });

        self.session.lock().set_history_task(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LatLng;
    use crate::provider::{
        GeocodeResponse, HistoricalPosition, Position, ProviderError, Service,
    };
    use crate::tracker::display::format_timestamp;
    use crate::tracker::session::{CyclePhase, Session};
    use crate::tracker::location::UNKNOWN_LOCATION;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        positions: Mutex<VecDeque<Result<Position, ProviderError>>>,
        fetched_at: Arc<Mutex<Option<DateTime<Utc>>>>,
        history_calls: Arc<AtomicUsize>,
        history_requested: Arc<Mutex<Vec<i64>>>,
        history_fails: bool,
    }

    impl FakeSource {
        fn with(positions: Vec<Result<Position, ProviderError>>) -> Self {
            Self {
                positions: Mutex::new(positions.into()),
                ..Self::default()
            }
        }
    }

    impl SatelliteSource for FakeSource {
        async fn current_position(&self) -> Result<Position, ProviderError> {
            *self.fetched_at.lock().unwrap() = Some(Utc::now());
            self.positions
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline(Service::Position)))
        }

        async fn positions(
            &self,
            timestamps: &[i64],
        ) -> Result<Vec<HistoricalPosition>, ProviderError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            *self.history_requested.lock().unwrap() = timestamps.to_vec();
            if self.history_fails {
                return Err(offline(Service::History));
            }
            Ok(timestamps
                .iter()
                .enumerate()
                .map(|(i, _)| HistoricalPosition {
                    latitude: i as f64,
                    longitude: -(i as f64),
                })
                .collect())
        }
    }

    struct FakeGeocoder {
        country: Option<&'static str>,
    }

    impl ReverseGeocoder for FakeGeocoder {
        async fn reverse_geocode(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<GeocodeResponse, ProviderError> {
            match self.country {
                Some(country) => Ok(GeocodeResponse {
                    country_name: Some(country.to_string()),
                    ..GeocodeResponse::default()
                }),
                None => Err(offline(Service::Geocode)),
            }
        }
    }

    fn offline(service: Service) -> ProviderError {
        ProviderError::Network {
            service,
            message: "offline".into(),
        }
    }

    fn position(lat: f64, lon: f64) -> Position {
        Position {
            latitude: lat,
            longitude: lon,
            altitude: 415.0,
            velocity: 27550.0,
            footprint: 4480.0,
            visibility: None,
        }
    }

    fn controller(
        source: FakeSource,
        country: Option<&'static str>,
        tracking: bool,
    ) -> Controller<FakeSource, FakeGeocoder> {
        Controller::new(
            source,
            FakeGeocoder { country },
            SharedSession::new(Session::new(50, tracking)),
        )
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn successful_cycle_updates_everything() {
        let ctl = controller(FakeSource::with(vec![Ok(position(12.346, 67.891))]), Some("Peru"), true);

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);

        let session = ctl.session().lock();
        let display = session.display().unwrap();
        assert_eq!(display.latitude, "12.35");
        assert_eq!(display.longitude, "67.89");
        assert_eq!(display.location, "Peru");
        assert_eq!(display.visibility, "--");
        assert_eq!(session.marker_position(), Some(LatLng(12.346, 67.891)));
        assert_eq!(session.footprint().unwrap().radius_m, 2_240_000.0);
        assert_eq!(session.trail().len(), 1);
        assert_eq!(session.phase(), CyclePhase::Idle);
    }

    #[tokio::test]
    async fn display_and_history_are_stamped_after_the_fetch() {
        let source = FakeSource::with(vec![Ok(position(3.0, 4.0))]);
        let fetched_at = Arc::clone(&source.fetched_at);
        let requested = Arc::clone(&source.history_requested);
        let ctl = controller(source, Some("Niger"), true);

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);
        settle().await;

        let fetched_at = fetched_at.lock().unwrap().expect("position fetched");
        let updated_at = ctl.session().lock().display().unwrap().updated_at.clone();
        assert!(updated_at >= format_timestamp(fetched_at));

        let newest = *requested.lock().unwrap().last().expect("history requested");
        assert!(newest >= fetched_at.timestamp());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_display_untouched() {
        let ctl = controller(
            FakeSource::with(vec![Ok(position(1.0, 1.0)), Err(offline(Service::Position))]),
            Some("Chad"),
            true,
        );

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);
        let before = ctl.session().lock().display().cloned();

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Failed);
        let session = ctl.session().lock();
        assert_eq!(session.display().cloned(), before);
        assert_eq!(session.trail().len(), 1);
        assert_eq!(session.phase(), CyclePhase::Idle);
    }

    #[tokio::test]
    async fn geocode_failure_still_updates_with_fallback_label() {
        let ctl = controller(FakeSource::with(vec![Ok(position(0.5, 0.5))]), None, true);

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);
        let session = ctl.session().lock();
        assert_eq!(session.display().unwrap().location, UNKNOWN_LOCATION);
    }

    #[tokio::test]
    async fn paused_cycles_do_not_touch_the_map() {
        let ctl = controller(
            FakeSource::with(vec![Ok(position(1.0, 1.0)), Ok(position(2.0, 2.0))]),
            Some("Mali"),
            true,
        );

        ctl.run_cycle().await;
        ctl.session().toggle_tracking();
        let layers_before = ctl.session().snapshot().layers.len();

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Skipped);
        assert_eq!(ctl.run_cycle().await, CycleOutcome::Skipped);
        {
            let session = ctl.session().lock();
            assert_eq!(session.marker_position(), Some(LatLng(1.0, 1.0)));
            assert_eq!(session.trail().len(), 1);
            assert_eq!(session.footprint().unwrap().center, LatLng(1.0, 1.0));
        }
        assert_eq!(ctl.session().snapshot().layers.len(), layers_before);

        ctl.session().toggle_tracking();
        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);
        let session = ctl.session().lock();
        assert_eq!(session.marker_position(), Some(LatLng(2.0, 2.0)));
        assert_eq!(session.trail().len(), 2);
    }

    #[tokio::test]
    async fn history_is_fetched_once_per_session() {
        let source = FakeSource::with(vec![
            Ok(position(1.0, 1.0)),
            Ok(position(2.0, 2.0)),
            Ok(position(3.0, 3.0)),
        ]);
        let calls = Arc::clone(&source.history_calls);
        let ctl = controller(source, Some("Togo"), true);

        ctl.run_cycle().await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(ctl.session().lock().history().is_rendered());

        ctl.run_cycle().await;
        ctl.run_cycle().await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // dashed history line + trail segments + marker + footprint
        let session = ctl.session().lock();
        let history_lines = session
            .scene()
            .polylines()
            .filter(|p| p.style.dash_array.is_some())
            .count();
        assert_eq!(history_lines, 1);
    }

    #[tokio::test]
    async fn failed_first_poll_does_not_consume_history_load() {
        let source = FakeSource::with(vec![
            Err(offline(Service::Position)),
            Ok(position(1.0, 1.0)),
        ]);
        let calls = Arc::clone(&source.history_calls);
        let ctl = controller(source, Some("Oman"), true);

        ctl.run_cycle().await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        ctl.run_cycle().await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn history_failure_is_silent() {
        let source = FakeSource {
            history_fails: true,
            ..FakeSource::with(vec![Ok(position(1.0, 1.0))])
        };
        let ctl = controller(source, Some("Fiji"), true);

        assert_eq!(ctl.run_cycle().await, CycleOutcome::Updated);
        settle().await;

        let session = ctl.session().lock();
        assert!(session.history().is_loaded());
        assert!(!session.history().is_rendered());
        assert!(session.display().is_some());
    }
}

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

use crate::map::{LatLng, LayerId, MapScene, PathStyle, Polyline};
use crate::provider::{ProviderError, SatelliteSource};

pub const HISTORY_SAMPLES: i64 = 10;
pub const HISTORY_STEP: Duration = Duration::minutes(9);

/// Unix timestamps covering the preceding ~90 minutes, oldest first and
/// ending at `now`.
pub fn history_timestamps(now: DateTime<Utc>) -> Vec<i64> {
    let now_s = now.timestamp();
    let step = HISTORY_STEP.num_seconds();
    (0..HISTORY_SAMPLES)
        .rev()
        .map(|i| now_s - i * step)
        .collect()
}

pub async fn fetch_orbit_history<S: SatelliteSource>(
    source: &S,
    now: DateTime<Utc>,
) -> Result<Vec<LatLng>, ProviderError> {
    let timestamps = history_timestamps(now);
    let positions = source.positions(&timestamps).await?;
    Ok(positions
        .into_iter()
        .map(|p| LatLng(p.latitude, p.longitude))
        .collect())
}

/// One-shot state of the past-orbit line.
#[derive(Debug, Default)]
pub struct OrbitHistory {
    loaded: bool,
    layer: Option<LayerId>,
    task: Option<JoinHandle<()>>,
}

impl OrbitHistory {
    /// True the first time it is called in a session, false afterwards.
    pub fn claim(&mut self) -> bool {
        !std::mem::replace(&mut self.loaded, true)
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_rendered(&self) -> bool {
        self.layer.is_some()
    }

    pub fn set_task(&mut self, task: JoinHandle<()>) {
        self.task = Some(task);
    }

    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn render(&mut self, scene: &mut MapScene, path: Vec<LatLng>) {
        if let Some(previous) = self.layer.take() {
            scene.remove_layer(previous);
        }
        self.layer = Some(scene.add_polyline(Polyline {
            points: path,
            style: PathStyle {
                color: "black".to_string(),
                weight: 1.0,
                opacity: 0.5,
                dash_array: Some("4 4".to_string()),
                ..PathStyle::default()
            },
        }));
    }
}

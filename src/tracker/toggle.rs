use serde::Serialize;
use utoipa::ToSchema;

/// What the tracking button and status dot should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrackingIndicator {
    pub tracking: bool,
    pub label: String,
    pub button_text: String,
    pub button_active: bool,
    pub dot_paused: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackingToggle {
    enabled: bool,
}

impl TrackingToggle {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flips the gate and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn indicator(&self) -> TrackingIndicator {
        if self.enabled {
            TrackingIndicator {
                tracking: true,
                label: "Tracking".to_string(),
                button_text: "⏯ Pause Tracking".to_string(),
                button_active: true,
                dot_paused: false,
            }
        } else {
            TrackingIndicator {
                tracking: false,
                label: "Paused".to_string(),
                button_text: "▶ Resume Tracking".to_string(),
                button_active: false,
                dot_paused: true,
            }
        }
    }
}

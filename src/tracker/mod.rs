mod controller;
mod display;
mod history;
mod location;
mod poller;
mod session;
mod toggle;
mod trail;

pub use controller::Controller;
pub use display::DisplayState;
pub use poller::Poller;
pub use session::{CyclePhase, Session, SharedSession, TrackerStatus};
pub use toggle::TrackingIndicator;

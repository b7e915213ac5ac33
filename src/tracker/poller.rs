use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use super::controller::Controller;
use crate::provider::{ReverseGeocoder, SatelliteSource};

/// Background timer that starts one update cycle per tick.
#[derive(Debug)]
pub struct Poller {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl Poller {
    /// The first tick fires immediately.
    pub fn start<S, G>(controller: Arc<Controller<S, G>>, period: Duration) -> Self
    where
        S: SatelliteSource,
        G: ReverseGeocoder,
    {
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_poll_loop(controller, period, stop_rx));
        Self { stop_tx, join }
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

async fn run_poll_loop<S, G>(
    controller: Arc<Controller<S, G>>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) where
    S: SatelliteSource,
    G: ReverseGeocoder,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = JoinSet::new();

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            break;
        }

        while cycles.try_join_next().is_some() {}

        // Cycles run as their own tasks so a slow request never holds up the timer.
        let controller = Arc::clone(&controller);
        cycles.spawn(async move {
            let outcome = controller.run_cycle().await;
            log::trace!("Cycle finished: {}", outcome);
        });
    }

    // a cycle still in flight could start the history task
    cycles.shutdown().await;
    controller.session().lock().abort_history();
    log::info!("Poller stopped");
}

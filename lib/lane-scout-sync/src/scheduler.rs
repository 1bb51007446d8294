use crate::orchestrator::MatchSync;
use crate::riot_api::MatchGateway;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Source of sweep ticks. Resolves `true` when a sweep is due and `false` once no
/// further sweeps should run.
#[async_trait]
pub trait SweepTrigger: Send {
    async fn next(&mut self) -> bool;
}

/// Fires on a fixed period, starting immediately.
#[derive(Debug)]
pub struct IntervalTrigger {
    interval: Interval,
}

impl IntervalTrigger {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        // A sweep slower than the period pushes the next one back instead of bursting
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl SweepTrigger for IntervalTrigger {
    async fn next(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Run a sweep on every tick of the trigger until it is exhausted. Returns the
/// number of sweeps run.
pub async fn run_sweeps<G, T>(sync: &MatchSync<G>, mut trigger: T) -> usize
where
    G: MatchGateway,
    T: SweepTrigger,
{
    let mut sweeps = 0;
    while trigger.next().await {
        sweeps += 1;
        debug!("Sweep #{sweeps} due");
        match sync.run_scheduled_sweep().await {
            Ok(results) => {
                let added: u32 = results.iter().map(|r| r.added).sum();
                info!("Sweep #{sweeps}: {} players, {added} matches added", results.len());
            }
            Err(e) => error!("Sweep #{sweeps} failed: {e}"),
        }
    }
    info!("Sweep trigger exhausted after {sweeps} sweeps");
    sweeps
}

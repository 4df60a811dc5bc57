use std::sync::Arc;

use enroute_geo::{Coordinate, distance_km};
use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    error::LocationError,
    location::{LocationSource, PositionSample, WatchOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Tracking,
}

struct Subscription {
    // Held for the whole duration of a callback. `stop` flips it to false under the lock,
    // so once `stop` returns no callback is running and none will start.
    delivering: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl Subscription {
    fn cancel(self) {
        *self.delivering.lock() = false;
        self.task.abort();
    }
}

/// Owns at most one live subscription to a [`LocationSource`] and forwards filtered samples
/// to a callback.
pub struct LocationTracker<S> {
    source: S,
    options: WatchOptions,
    subscription: Option<Subscription>,
}

impl<S: LocationSource> LocationTracker<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, WatchOptions::default())
    }

    pub fn with_options(source: S, options: WatchOptions) -> Self {
        LocationTracker {
            source,
            options,
            subscription: None,
        }
    }

    pub fn options(&self) -> WatchOptions {
        self.options
    }

    pub fn state(&self) -> TrackerState {
        match &self.subscription {
            Some(subscription) if !subscription.task.is_finished() => TrackerState::Tracking,
            _ => TrackerState::Idle,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.state() == TrackerState::Tracking
    }

    #[tracing::instrument(skip(self))]
    pub async fn current_position(&self) -> Option<Coordinate> {
        let position = self.source.current_position().await;
        if position.is_none() {
            warn!("no current position available");
        }
        position
    }

    /// Subscribes to position updates, replacing any previous subscription.
    ///
    /// Must be called from within a tokio runtime. On error the tracker is left idle.
    #[tracing::instrument(skip_all)]
    pub async fn start<F>(&mut self, callback: F) -> Result<(), LocationError>
    where
        F: FnMut(Coordinate) + Send + 'static,
    {
        self.stop();

        let receiver = self.source.watch(self.options).await.inspect_err(|err| {
            warn!("failed to start location tracking: {}", err);
        })?;

        let delivering = Arc::new(Mutex::new(true));
        let task = tokio::spawn(deliver(
            receiver,
            self.options,
            delivering.clone(),
            callback,
        ));

        info!("location tracking started");
        self.subscription = Some(Subscription { delivering, task });
        Ok(())
    }

    /// Same as [`LocationTracker::start`], with updates pulled from a channel instead.
    /// The channel closes once tracking stops.
    pub async fn updates(&mut self) -> Result<PositionUpdates, LocationError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.start(move |coordinate| {
            // The consumer may have gone away, nothing to deliver to then.
            let _ = sender.send(coordinate);
        })
        .await?;

        Ok(PositionUpdates { receiver })
    }

    /// Cancels the subscription. No callback runs after this returns. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("location tracking stopped");
        }
    }
}

impl<S> Drop for LocationTracker<S> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}

pub struct PositionUpdates {
    receiver: mpsc::UnboundedReceiver<Coordinate>,
}

impl PositionUpdates {
    pub async fn next(&mut self) -> Option<Coordinate> {
        self.receiver.recv().await
    }
}

async fn deliver<F>(
    mut receiver: mpsc::Receiver<PositionSample>,
    options: WatchOptions,
    delivering: Arc<Mutex<bool>>,
    mut callback: F,
) where
    F: FnMut(Coordinate) + Send + 'static,
{
    let mut filter = SpacingFilter::new(options);

    while let Some(sample) = receiver.recv().await {
        if !filter.accept(&sample) {
            continue;
        }

        let active = delivering.lock();
        if !*active {
            break;
        }
        callback(sample.coordinate);
    }

    debug!("position stream closed");
}

/// Drops samples that arrive out of order or too close, in time or space, to the last one
/// delivered.
struct SpacingFilter {
    options: WatchOptions,
    last: Option<PositionSample>,
}

impl SpacingFilter {
    fn new(options: WatchOptions) -> Self {
        SpacingFilter {
            options,
            last: None,
        }
    }

    fn accept(&mut self, sample: &PositionSample) -> bool {
        if let Some(last) = &self.last {
            if sample.timestamp < last.timestamp {
                debug!("dropping out-of-order position sample");
                return false;
            }

            let elapsed = sample.timestamp.duration_since(last.timestamp);
            let moved_m = distance_km(last.coordinate, sample.coordinate) * 1000.0;
            if elapsed < self.options.min_interval || moved_m < self.options.min_distance_m {
                return false;
            }
        }

        self.last = Some(*sample);
        true
    }
}

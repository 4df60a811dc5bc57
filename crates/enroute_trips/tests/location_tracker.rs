use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use enroute_geo::Coordinate;
use enroute_trips::{
    LocationError, LocationSource, LocationTracker, PositionSample, TrackerState, WatchOptions,
};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Feed = Arc<Mutex<Option<mpsc::Sender<PositionSample>>>>;

#[derive(Default)]
struct FakeSource {
    feed: Feed,
    denied: bool,
    fix: Option<Coordinate>,
}

#[async_trait]
impl LocationSource for FakeSource {
    async fn current_position(&self) -> Option<Coordinate> {
        if self.denied { None } else { self.fix }
    }

    async fn watch(
        &self,
        _options: WatchOptions,
    ) -> Result<mpsc::Receiver<PositionSample>, LocationError> {
        if self.denied {
            return Err(LocationError::PermissionDenied);
        }

        let (sender, receiver) = mpsc::channel(16);
        *self.feed.lock() = Some(sender);
        Ok(receiver)
    }
}

fn unfiltered() -> WatchOptions {
    WatchOptions {
        min_distance_m: 0.0,
        min_interval: SignedDuration::ZERO,
    }
}

fn sample(latitude: f64, second: i64) -> PositionSample {
    PositionSample::new(
        Coordinate::new(latitude, -6.583),
        Timestamp::from_second(1_741_939_200 + second).unwrap(),
    )
}

async fn push(feed: &Feed, sample: PositionSample) -> bool {
    let sender = feed.lock().clone();
    match sender {
        Some(sender) => sender.send(sample).await.is_ok(),
        None => false,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn no_callback_runs_after_stop_returns() {
    let source = FakeSource::default();
    let feed = source.feed.clone();
    let mut tracker = LocationTracker::with_options(source, unfiltered());

    let entered = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));
    {
        let entered = entered.clone();
        let completed = completed.clone();
        tracker
            .start(move |_| {
                entered.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(100));
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
    }
    assert_eq!(tracker.state(), TrackerState::Tracking);

    assert!(push(&feed, sample(34.261, 0)).await);
    while !entered.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    tracker.stop();
    // The in-flight callback finished before stop returned.
    assert_eq!(completed.load(Ordering::SeqCst), 1);

    push(&feed, sample(34.262, 10)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.state(), TrackerState::Idle);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let mut tracker = LocationTracker::new(FakeSource::default());

    tracker.stop();
    tracker.start(|_| {}).await.unwrap();
    tracker.stop();
    tracker.stop();

    assert_eq!(tracker.state(), TrackerState::Idle);
}

#[tokio::test]
async fn restarting_cancels_the_previous_subscription() {
    let source = FakeSource::default();
    let feed = source.feed.clone();
    let mut tracker = LocationTracker::with_options(source, unfiltered());

    let first_calls = Arc::new(AtomicUsize::new(0));
    let counter = first_calls.clone();
    tracker
        .start(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
    let first_sender = feed.lock().clone().unwrap();

    let mut updates = tracker.updates().await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), first_sender.closed())
        .await
        .expect("first subscription should be released");

    assert!(push(&feed, sample(34.261, 0)).await);
    assert_eq!(updates.next().await, Some(Coordinate::new(34.261, -6.583)));
    assert_eq!(first_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn updates_are_spaced_out() {
    let source = FakeSource::default();
    let feed = source.feed.clone();
    let mut tracker = LocationTracker::new(source);
    let mut updates = tracker.updates().await.unwrap();

    push(&feed, sample(34.261, 0)).await;
    // Too close to the previous fix.
    push(&feed, sample(34.26101, 30)).await;
    // Too soon after the previous fix.
    push(&feed, sample(34.262, 3)).await;
    // Older than the previous fix.
    push(&feed, sample(34.270, -10)).await;
    push(&feed, sample(34.262, 6)).await;

    assert_eq!(updates.next().await, Some(Coordinate::new(34.261, -6.583)));
    assert_eq!(updates.next().await, Some(Coordinate::new(34.262, -6.583)));

    tracker.stop();
    let closed = tokio::time::timeout(Duration::from_secs(1), updates.next())
        .await
        .expect("updates should close after stop");
    assert_eq!(closed, None);
}

#[tokio::test]
async fn denied_permission_leaves_tracker_idle() {
    let source = FakeSource {
        denied: true,
        ..FakeSource::default()
    };
    let mut tracker = LocationTracker::new(source);

    let err = tracker.start(|_| {}).await.unwrap_err();

    assert_eq!(err, LocationError::PermissionDenied);
    assert_eq!(tracker.state(), TrackerState::Idle);
    assert_eq!(tracker.current_position().await, None);
}

#[tokio::test]
async fn current_position_comes_from_the_source() {
    let fix = Coordinate::new(34.2702, -6.5802);
    let tracker = LocationTracker::new(FakeSource {
        fix: Some(fix),
        ..FakeSource::default()
    });

    assert_eq!(tracker.current_position().await, Some(fix));
}

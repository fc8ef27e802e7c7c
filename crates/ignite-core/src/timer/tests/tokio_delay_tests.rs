use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::timer::{DelayFacility, TokioDelay};

fn counting(count: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send + 'static> {
    let count = Arc::clone(count);
    Box::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_new_requires_runtime() {
    assert!(TokioDelay::new().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_fires_after_delay() {
    let delay = TokioDelay::new().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let handle = delay.schedule(Duration::from_secs(5), counting(&fired));
    assert_eq!(delay.pending_count(), 1);
    assert_eq!(delay.remaining(handle), Some(Duration::from_secs(5)));

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(delay.pending_count(), 0);
    assert!(!delay.cancel(handle));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_deadline() {
    let delay = TokioDelay::new().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let handle = delay.schedule(Duration::from_secs(1), counting(&fired));

    assert!(delay.cancel(handle));
    assert!(!delay.cancel(handle));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(delay.active_timers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_active_timers_sorted_by_handle() {
    let delay = TokioDelay::new().unwrap();
    let fired = Arc::new(AtomicUsize::new(0));
    let first = delay.schedule(Duration::from_secs(3), counting(&fired));
    let second = delay.schedule(Duration::from_secs(1), counting(&fired));

    let active = delay.active_timers();
    assert_eq!(active.iter().map(|t| t.handle).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(active[0].remaining_ms, 3_000);
}

use crate::kernel::component::ComponentId;
use crate::kernel::error::Error;
use crate::registry::tests::advance;
use crate::registry::{LifecycleState, StateTracker};

fn tracker(ids: &[&str]) -> StateTracker {
    let mut tracker = StateTracker::new();
    for id in ids {
        tracker.track(ComponentId::from(*id));
    }
    tracker
}

#[test]
fn test_new_components_start_uninitialized() {
    let tracker = tracker(&["a", "b"]);
    assert_eq!(tracker.len(), 2);
    assert!(tracker.all_in(LifecycleState::UnInitialized));
    assert_eq!(tracker.state_of("a"), LifecycleState::UnInitialized);
}

#[test]
fn test_unknown_component_reads_uninitialized() {
    let tracker = tracker(&["a"]);
    assert!(!tracker.is_tracked("ghost"));
    assert_eq!(tracker.state_of("ghost"), LifecycleState::UnInitialized);
}

#[test]
fn test_legal_edges() {
    use LifecycleState::*;
    for from in LifecycleState::ALL {
        for to in LifecycleState::ALL {
            let legal = matches!(
                (from, to),
                (UnInitialized, Queued) | (Queued, Initializing) | (Initializing, Initialized) | (Initializing, Failed)
            );
            assert_eq!(from.can_transition_to(to), legal, "{} -> {}", from, to);
        }
    }
}

#[test]
fn test_transition_returns_previous_state() {
    let mut tracker = tracker(&["a"]);
    assert_eq!(tracker.transition("a", LifecycleState::Queued).unwrap(), LifecycleState::UnInitialized);
    assert_eq!(
        tracker.transition("a", LifecycleState::Initializing).unwrap(),
        LifecycleState::Queued
    );
    assert_eq!(tracker.state_of("a"), LifecycleState::Initializing);
}

#[test]
fn test_illegal_transition_leaves_state() {
    let mut tracker = tracker(&["a"]);
    advance(&mut tracker, "a", LifecycleState::Initialized);

    let err = tracker.transition("a", LifecycleState::Failed).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: LifecycleState::Initialized,
            to: LifecycleState::Failed,
            ..
        }
    ));
    assert_eq!(tracker.state_of("a"), LifecycleState::Initialized);
}

#[test]
fn test_transition_unknown_component() {
    let mut tracker = tracker(&[]);
    let err = tracker.transition("ghost", LifecycleState::Queued).unwrap_err();
    assert!(matches!(err, Error::UnknownComponent { .. }));
}

#[test]
fn test_reset_all_and_counts() {
    let mut tracker = tracker(&["a", "b", "c"]);
    advance(&mut tracker, "a", LifecycleState::Initialized);
    advance(&mut tracker, "b", LifecycleState::Failed);
    advance(&mut tracker, "c", LifecycleState::Queued);
    assert_eq!(tracker.count(LifecycleState::Initialized), 1);
    assert_eq!(tracker.count(LifecycleState::Failed), 1);
    assert_eq!(tracker.count(LifecycleState::Queued), 1);
    assert!(LifecycleState::Failed.is_terminal());
    assert!(!LifecycleState::Queued.is_terminal());

    tracker.reset_all();
    assert!(tracker.all_in(LifecycleState::UnInitialized));
    assert_eq!(tracker.len(), 3);
    assert_eq!(tracker.snapshot().get("b"), Some(&LifecycleState::UnInitialized));
}

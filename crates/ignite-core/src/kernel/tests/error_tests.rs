use std::time::Duration;

use crate::config::ConfigError;
use crate::kernel::completion::FailureReason;
use crate::kernel::component::ComponentId;
use crate::kernel::error::{panic_message, Error};
use crate::registry::LifecycleState;

#[test]
fn test_error_display_messages() {
    let err = Error::DuplicateRegistration { component: "store".into() };
    assert_eq!(err.to_string(), "Component 'store' is already registered");

    let err = Error::DependencyCycle {
        component: "b".into(),
        cycle: vec!["b".into(), "a".into(), "b".into()],
    };
    assert_eq!(
        err.to_string(),
        "Registering component 'b' would close a dependency cycle: b -> a -> b"
    );

    let err = Error::IncompleteBootstrap { initialized: 2, total: 5 };
    assert_eq!(err.to_string(), "Bootstrap incomplete: 2/5 components initialized");

    let err = Error::InvalidTransition {
        component: "a".into(),
        from: LifecycleState::Initialized,
        to: LifecycleState::Queued,
    };
    assert_eq!(err.to_string(), "Illegal lifecycle transition for 'a': Initialized -> Queued");
}

#[test]
fn test_failure_reason_to_error() {
    let id = ComponentId::from("player");
    let err = FailureReason::Timeout(Duration::from_secs(10)).to_error(&id);
    assert_eq!(err.to_string(), "Component 'player' initialization timed out after 10s");

    let err = FailureReason::Reported("no save".to_string()).to_error(&id);
    assert!(matches!(err, Error::ComponentStartFailure { ref message, .. } if message == "no save"));
}

#[test]
fn test_config_error_converts() {
    let err: Error = ConfigError::InvalidValue {
        key: "batch_cap".to_string(),
        reason: "must be at least 1".to_string(),
    }
    .into();
    assert_eq!(
        err.to_string(),
        "Configuration error: Invalid value for 'batch_cap': must be at least 1"
    );
}

#[test]
fn test_string_conversions() {
    assert!(matches!(Error::from("plain"), Error::Other(ref m) if m == "plain"));
    assert_eq!(Error::from(String::from("owned")).to_string(), "Error: owned");
}

#[test]
fn test_panic_message_extracts_payload() {
    fn static_panic() {
        panic!("static text");
    }
    fn formatted_panic() {
        panic!("formatted {}", 42);
    }

    let payload = std::panic::catch_unwind(static_panic).unwrap_err();
    assert_eq!(panic_message(&*payload), "static text");

    let payload = std::panic::catch_unwind(formatted_panic).unwrap_err();
    assert_eq!(panic_message(&*payload), "formatted 42");
}

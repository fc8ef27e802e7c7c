use crate::kernel::component::ComponentId;
use crate::kernel::error::Error;
use crate::registry::tests::Stub;
use crate::registry::{ComponentDescriptor, ComponentRegistry};

#[test]
fn test_register_preserves_order_and_dependencies() {
    let mut registry = ComponentRegistry::new();
    registry.register(Stub::new("player", &[])).unwrap();
    registry.register(Stub::new("achievement", &["player", "store"])).unwrap();
    registry.register(Stub::new("store", &[])).unwrap();

    assert_eq!(registry.len(), 3);
    let ids: Vec<String> = registry.ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["player", "achievement", "store"]);

    let descriptor = registry.get("achievement").unwrap();
    assert_eq!(descriptor.dependencies(), &[ComponentId::from("player"), ComponentId::from("store")]);
    assert!(descriptor.depends_on("store"));
    assert!(!registry.get("player").unwrap().has_dependencies());
    assert_eq!(registry.all().len(), 3);
}

#[test]
fn test_descriptor_collapses_repeated_dependencies() {
    let descriptor = ComponentDescriptor::new("a", ["b", "c", "b"]);
    assert_eq!(descriptor.id().as_str(), "a");
    assert_eq!(descriptor.dependencies(), &[ComponentId::from("b"), ComponentId::from("c")]);
}

#[test]
fn test_duplicate_registration_keeps_first() {
    let mut registry = ComponentRegistry::new();
    registry.register(Stub::new("a", &[])).unwrap();
    let err = registry.register(Stub::new("a", &["b"])).unwrap_err();

    assert!(matches!(err, Error::DuplicateRegistration { ref component } if component.as_str() == "a"));
    assert_eq!(registry.len(), 1);
    assert!(!registry.get("a").unwrap().has_dependencies());
}

#[test]
fn test_sealed_registry_rejects_registration() {
    let mut registry = ComponentRegistry::new();
    registry.seal();
    assert!(registry.is_sealed());

    let err = registry.register(Stub::new("late", &[])).unwrap_err();
    assert!(matches!(err, Error::RegistrationClosed { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_cycles_accepted_by_default() {
    let mut registry = ComponentRegistry::new();
    registry.register(Stub::new("a", &["b"])).unwrap();
    registry.register(Stub::new("b", &["a"])).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_strict_registry_rejects_closing_edge() {
    let mut registry = ComponentRegistry::new().with_cycle_check(true);
    registry.register(Stub::new("a", &["b"])).unwrap();
    registry.register(Stub::new("b", &["c"])).unwrap();
    let err = registry.register(Stub::new("c", &["a"])).unwrap_err();

    match err {
        Error::DependencyCycle { cycle, .. } => {
            let path: Vec<&str> = cycle.iter().map(ComponentId::as_str).collect();
            assert_eq!(path, vec!["c", "a", "b", "c"]);
        }
        other => panic!("expected a cycle error, got {:?}", other),
    }
    assert!(!registry.contains("c"));
}

#[test]
fn test_strict_registry_rejects_self_dependency() {
    let mut registry = ComponentRegistry::new().with_cycle_check(true);
    let err = registry.register(Stub::new("loop", &["loop"])).unwrap_err();
    assert!(matches!(err, Error::DependencyCycle { .. }));
}

#[test]
fn test_component_lookup() {
    let mut registry = ComponentRegistry::new();
    registry.register(Stub::new("a", &[])).unwrap();

    assert!(registry.component("a").is_some());
    assert!(registry.component("b").is_none());
    assert_eq!(registry.get_concrete::<Stub>().map(|s| s.id), Some("a"));
}

mod common;

use common::{ROOT_PUBLIC_ID, TestRoot};
use dd_binding::{DocumentType, Registry, RootKind};

#[test]
fn test_registration_is_idempotent() {
    let registry = common::dtd_registry();
    assert_eq!(
        registry.public_id_resource(ROOT_PUBLIC_ID).as_deref(),
        Some("root_1_0.dtd")
    );

    // A second kind with the same tag and a different resource is ignored.
    let again = RootKind::new(common::root_kind(), DocumentType::None)
        .with_public_id(ROOT_PUBLIC_ID, "other.dtd");
    assert!(!registry.register_if_absent(again));
    assert_eq!(
        registry.public_id_resource(ROOT_PUBLIC_ID).as_deref(),
        Some("root_1_0.dtd")
    );
    assert_eq!(registry.root_tags(), vec!["root"]);
}

#[test]
fn test_concurrent_registration_registers_once() {
    let registry = Registry::new();
    let registered: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    registry.register_if_absent(common::test_root(DocumentType::None))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(registered.iter().filter(|r| **r).count(), 1);
    assert!(registry.contains("root"));
    assert!(registry.preserves_whitespace("script"));
    assert!(registry.allows_empty("marker"));
}

#[test]
fn test_root_kind_lookup() {
    let registry = common::registry();
    let kind = registry.root_kind("root").unwrap();
    assert_eq!(kind.tag(), "root");
    assert_eq!(kind.document_type(), &DocumentType::None);
    assert_eq!(kind.upgrade_rules().len(), 2);
    assert!(registry.root_kind("ejb").is_none());

    let descriptor = TestRoot {
        version: Some("1".into()),
        ..Default::default()
    };
    let debug = kind.debug_descriptor(&descriptor).unwrap();
    assert!(debug.contains("TestRoot"));
    assert!(kind.debug_descriptor(&"not a root").is_none());
}

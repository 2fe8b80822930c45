//! The process-wide desk lives in its own test binary so no other test
//! observes it.


use deskroute_router::global;
use std::sync::Arc;

#[test]
fn test_init_barrier() {
    assert!(!global::is_initialized());
    assert!(global::desk().is_err());

    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::write_desk(dir.path());

    // a failed load installs nothing
    let good_model = config.model_path.clone();
    config.model_path = dir.path().join("absent.json");
    assert!(global::init(&config).unwrap_err().is_config());
    assert!(!global::is_initialized());

    config.model_path = good_model;
    let first = global::init(&config).unwrap();
    let again = global::init(&config).unwrap();
    let fetched = global::desk().unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert!(Arc::ptr_eq(&first, &fetched));

    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| global::desk().unwrap().classify("VPN не работает").unwrap()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().label, "network");
    }
}

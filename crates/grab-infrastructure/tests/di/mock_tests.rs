//! Mock Overlay Tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, mpsc};
use std::thread;
use std::time::Duration;

use grab_domain::{ContainerExt, Error, ProducedValue, Producer};
use grab_infrastructure::{MockOverlay, Resolver};
use once_cell::sync::Lazy;

#[derive(Debug)]
struct Config {
    name: String,
}

struct Service {
    greeting: String,
}

static LOOPING: Lazy<Producer<u8>> =
    Lazy::new(|| Producer::named("looping", |c| c.get(&LOOPING)));

fn config_producer() -> Producer<Config> {
    Producer::named("config", |_| {
        Ok(Arc::new(Config {
            name: "Hello".to_string(),
        }))
    })
}

fn service_producer(config: &Producer<Config>) -> Producer<Service> {
    let config = config.clone();
    Producer::named("service", move |c| {
        let config = c.get(&config)?;
        Ok(Arc::new(Service {
            greeting: config.name.clone(),
        }))
    })
}

fn mocked_config() -> Arc<Config> {
    Arc::new(Config {
        name: "Mocked".to_string(),
    })
}

#[test]
fn test_unmocked_producers_resolve_normally() {
    let config = config_producer();
    let service = service_producer(&config);
    let overlay = MockOverlay::new();

    assert_eq!(overlay.get(&service).unwrap().greeting, "Hello");
    assert!(Arc::ptr_eq(
        &overlay.get(&config).unwrap(),
        &overlay.inner().get(&config).unwrap()
    ));
}

#[test]
fn test_mock_takes_precedence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = {
        let calls = Arc::clone(&calls);
        Producer::owned(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Config {
                name: "Hello".to_string(),
            })
        })
    };
    let overlay = MockOverlay::new();
    let mocked = mocked_config();

    overlay.mock(&config, Arc::clone(&mocked)).unwrap();

    let mut dest = None;
    overlay.get_into(&mut dest, &config).unwrap();
    assert!(Arc::ptr_eq(&mocked, dest.as_ref().unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_mock_reaches_dependents() {
    let config = config_producer();
    let service = service_producer(&config);
    let overlay = MockOverlay::new();

    overlay.mock(&config, mocked_config()).unwrap();

    assert_eq!(overlay.get(&service).unwrap().greeting, "Mocked");
}

#[test]
fn test_second_mock_fails_and_first_stays() {
    let config = config_producer();
    let overlay = MockOverlay::new();
    let first = mocked_config();

    overlay.mock(&config, Arc::clone(&first)).unwrap();
    let err = overlay
        .mock(
            &config,
            Arc::new(Config {
                name: "Second".to_string(),
            }),
        )
        .unwrap_err();

    match err {
        Error::AlreadyMocked { producer } => assert!(producer.contains("config")),
        other => panic!("Expected AlreadyMocked error, got {other}"),
    }
    assert!(Arc::ptr_eq(&first, &overlay.get(&config).unwrap()));
}

#[test]
fn test_mock_bypasses_cached_value() {
    let config = config_producer();
    let overlay = MockOverlay::new();

    let cached = overlay.get(&config).unwrap();
    overlay.mock(&config, mocked_config()).unwrap();

    assert_eq!(overlay.get(&config).unwrap().name, "Mocked");
    assert!(Arc::ptr_eq(&cached, &overlay.inner().get(&config).unwrap()));
}

#[test]
fn test_wrap_existing_resolver() {
    let config = config_producer();
    let resolver = Resolver::new();
    let before = resolver.get(&config).unwrap();

    let overlay = MockOverlay::wrap(resolver);
    assert!(Arc::ptr_eq(&before, &overlay.get(&config).unwrap()));
}

#[test]
fn test_wrong_shaped_override_is_rejected_without_construction() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = {
        let calls = Arc::clone(&calls);
        Producer::owned(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Config {
                name: "Hello".to_string(),
            })
        })
    };
    let overlay = MockOverlay::new();
    overlay
        .mock_erased(config.erased(), ProducedValue::new(Arc::new(42_u32)))
        .unwrap();

    let mut dest = None;
    let err = overlay.get_into(&mut dest, &config).unwrap_err();

    assert!(matches!(err, Error::TypeMismatch { found: "u32", .. }));
    assert!(dest.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cycles_detected_through_overlay() {
    let overlay = MockOverlay::new();

    assert!(overlay.get(&LOOPING).unwrap_err().is_circular_dependency());
}

#[test]
fn test_cycle_through_captured_overlay() {
    let overlay = Arc::new(MockOverlay::new());
    let own: Arc<OnceLock<Producer<u8>>> = Arc::default();
    let producer = {
        let (overlay, own) = (Arc::clone(&overlay), Arc::clone(&own));
        Producer::owned(move |_| {
            let me = own
                .get()
                .ok_or_else(|| Error::producer("producer not registered"))?;
            Ok(*overlay.get(me)?)
        })
    };
    assert!(own.set(producer.clone()).is_ok());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(overlay.get(&producer));
    });
    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(result.unwrap_err().is_circular_dependency());
}

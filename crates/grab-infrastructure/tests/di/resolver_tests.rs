//! Resolver Tests

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, mpsc};
use std::thread;
use std::time::Duration;

use grab_domain::{ContainerExt, Error, Producer, Result};
use grab_infrastructure::{FirstUsePolicy, Resolver, ResolverConfig};
use once_cell::sync::Lazy;

trait Speak: Send + Sync {
    fn say(&self) -> String;
}

struct Foo {
    name: String,
}

impl Speak for Foo {
    fn say(&self) -> String {
        format!("foo:{}", self.name)
    }
}

struct Bar {
    name: String,
    speak: Arc<dyn Speak>,
}

impl Speak for Bar {
    fn say(&self) -> String {
        format!("{}{}", self.name, self.speak.say())
    }
}

static FOO: Lazy<Producer<dyn Speak>> = Lazy::new(|| {
    Producer::named("foo", |_| {
        Ok(Arc::new(Foo {
            name: "hello world".to_string(),
        }) as Arc<dyn Speak>)
    })
});

static BAR: Lazy<Producer<dyn Speak>> = Lazy::new(|| {
    Producer::named("bar", |c| {
        let speak = c.get(&FOO)?;
        Ok(Arc::new(Bar {
            name: "bar:".to_string(),
            speak,
        }) as Arc<dyn Speak>)
    })
});

static SELF_REFERENCING: Lazy<Producer<u32>> = Lazy::new(|| {
    Producer::named("self_referencing", |c| {
        let own = c.get(&SELF_REFERENCING)?;
        Ok(Arc::new(*own + 1))
    })
});

static PING: Lazy<Producer<String>> = Lazy::new(|| {
    Producer::named("ping", |c| {
        let pong = c.get(&PONG)?;
        Ok(Arc::new(format!("ping:{pong}")))
    })
});

static PONG: Lazy<Producer<String>> = Lazy::new(|| {
    Producer::named("pong", |c| {
        let ping = c.get(&PING)?;
        Ok(Arc::new(format!("pong:{ping}")))
    })
});

fn counting_producer(calls: &Arc<AtomicUsize>) -> Producer<String> {
    let calls = Arc::clone(calls);
    Producer::owned(move |_| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("instance-{call}"))
    })
}

#[test]
fn test_singleton_identity() {
    let calls = Arc::new(AtomicUsize::new(0));
    let producer = counting_producer(&calls);
    let resolver = Resolver::new();

    let first = resolver.get(&producer).unwrap();
    let second = resolver.get(&producer).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_get_into_aliases_stored_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let producer = counting_producer(&calls);
    let resolver = Resolver::new();

    let mut first = None;
    let mut second = None;
    resolver.get_into(&mut first, &producer).unwrap();
    resolver.get_into(&mut second, &producer).unwrap();

    assert!(Arc::ptr_eq(first.as_ref().unwrap(), second.as_ref().unwrap()));
}

#[test]
fn test_resolvers_do_not_share_instances() {
    let calls = Arc::new(AtomicUsize::new(0));
    let producer = counting_producer(&calls);

    let first = Resolver::new().get(&producer).unwrap();
    let second = Resolver::new().get(&producer).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_multiple_dependency() {
    let resolver = Resolver::new();

    let bar = resolver.get(&BAR).unwrap();
    assert_eq!(bar.say(), "bar:foo:hello world");
}

#[test]
fn test_chain_embeds_the_stored_dependency() {
    let config = Producer::owned(|_| Ok(String::from("Hello")));
    let service = {
        let config = config.clone();
        Producer::owned(move |c| Ok((c.get(&config)?, 7_u8)))
    };
    let resolver = Resolver::new();

    let resolved = resolver.get(&service).unwrap();
    let (embedded, _) = &*resolved;
    let direct = resolver.get(&config).unwrap();

    assert!(Arc::ptr_eq(embedded, &direct));
}

#[test]
fn test_self_cycle_detected() {
    let resolver = Resolver::new();

    let err = resolver.get(&SELF_REFERENCING).unwrap_err();
    match err {
        Error::CircularDependency { producer } => assert!(producer.contains("self_referencing")),
        other => panic!("Expected CircularDependency error, got {other}"),
    }

    // nothing was left pending: the next attempt fails the same way
    assert!(resolver.get(&SELF_REFERENCING).unwrap_err().is_circular_dependency());
}

#[test]
fn test_self_cycle_detected_under_race_policy() {
    let resolver = Resolver::with_config(ResolverConfig::with_first_use(FirstUsePolicy::Race));

    assert!(resolver.get(&SELF_REFERENCING).unwrap_err().is_circular_dependency());
    assert!(resolver.get(&SELF_REFERENCING).unwrap_err().is_circular_dependency());
}

/// Resolve a producer that re-enters through the resolver it captured
///
/// Runs on a worker thread so a hang fails the test instead of blocking it.
fn resolve_through_captured_resolver(policy: FirstUsePolicy) -> Result<Arc<u32>> {
    let resolver = Arc::new(Resolver::with_config(ResolverConfig::with_first_use(policy)));
    let own: Arc<OnceLock<Producer<u32>>> = Arc::default();
    let producer = {
        let (resolver, own) = (Arc::clone(&resolver), Arc::clone(&own));
        Producer::owned(move |_| {
            let me = own
                .get()
                .ok_or_else(|| Error::producer("producer not registered"))?;
            Ok(*resolver.get(me)? + 1)
        })
    };
    own.set(producer.clone())
        .map_err(|_| Error::producer("producer registered twice"))?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(resolver.get(&producer));
    });
    rx.recv_timeout(Duration::from_secs(5))
        .map_err(|_| Error::producer("resolution did not finish"))?
}

#[test]
fn test_self_cycle_through_captured_resolver() {
    for policy in [FirstUsePolicy::SingleFlight, FirstUsePolicy::Race] {
        let err = resolve_through_captured_resolver(policy).unwrap_err();
        assert!(err.is_circular_dependency(), "{policy}: {err}");
    }
}

#[test]
fn test_captured_resolver_resolves_other_producers() {
    let resolver = Arc::new(Resolver::new());
    let base = Producer::owned(|_| Ok(20_u32));
    let derived = {
        let (resolver, base) = (Arc::clone(&resolver), base.clone());
        Producer::owned(move |_| Ok(*resolver.get(&base)? + 1))
    };

    assert_eq!(*resolver.get(&derived).unwrap(), 21);
    assert_eq!(*resolver.get(&base).unwrap(), 20);
}

#[test]
fn test_transitive_cycle_detected() {
    let resolver = Resolver::new();

    let err = resolver.get(&PING).unwrap_err();
    match err {
        Error::CircularDependency { producer } => assert!(producer.contains("ping")),
        other => panic!("Expected CircularDependency error, got {other}"),
    }
    assert!(resolver.get(&PONG).unwrap_err().is_circular_dependency());
}

#[test]
fn test_initialization_fails_then_retries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let producer = {
        let calls = Arc::clone(&calls);
        Producer::owned(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::producer("Oops"))
            } else {
                Ok(String::from("recovered"))
            }
        })
    };
    let resolver = Resolver::new();

    let mut dest = None;
    let err = resolver.get_into(&mut dest, &producer).unwrap_err();
    match err {
        Error::Producer { message, .. } => assert_eq!(message, "Oops"),
        other => panic!("Expected the producer's error, got {other}"),
    }
    assert!(dest.is_none());

    resolver.get_into(&mut dest, &producer).unwrap();
    assert_eq!(dest.as_deref().map(String::as_str), Some("recovered"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dependency_failure_propagates_unchanged() {
    let failing: Producer<u8> = Producer::new(|_| Err(Error::configuration("missing key")));
    let dependent = {
        let failing = failing.clone();
        Producer::owned(move |c| Ok(*c.get(&failing)? + 1))
    };
    let resolver = Resolver::new();

    let err = resolver.get(&dependent).unwrap_err();
    assert!(matches!(err, Error::Configuration { ref message, .. } if message == "missing key"));
}

#[test]
fn test_panicking_producer_is_not_left_pending() {
    let calls = Arc::new(AtomicUsize::new(0));
    let producer = {
        let calls = Arc::clone(&calls);
        Producer::owned(move |_| {
            assert!(
                calls.fetch_add(1, Ordering::SeqCst) > 0,
                "first construction panics"
            );
            Ok(1_u64)
        })
    };
    let resolver = Resolver::new();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolver.get(&producer)));
    assert!(outcome.is_err());

    assert_eq!(*resolver.get(&producer).unwrap(), 1);
}

#[test]
fn test_dependencies_resolved_from_helper_threads() {
    let leaf = Producer::owned(|_| Ok(String::from("leaf")));
    let root = {
        let leaf = leaf.clone();
        Producer::owned(move |c| {
            let from_helper = std::thread::scope(|s| s.spawn(|| c.get(&leaf)).join())
                .map_err(|_| Error::producer("helper thread panicked"))??;
            Ok(format!("root:{from_helper}"))
        })
    };
    let resolver = Resolver::new();

    assert_eq!(resolver.get(&root).unwrap().as_str(), "root:leaf");
    assert!(Arc::ptr_eq(
        &resolver.get(&leaf).unwrap(),
        &resolver.get(&leaf).unwrap()
    ));
}

#[test]
fn test_cycle_detected_across_helper_threads() {
    static LOOPING: Lazy<Producer<u8>> = Lazy::new(|| {
        Producer::named("looping", |c| {
            let own = std::thread::scope(|s| s.spawn(|| c.get(&LOOPING)).join())
                .map_err(|_| Error::producer("helper thread panicked"))??;
            Ok(Arc::new(*own))
        })
    });
    let resolver = Resolver::new();

    assert!(resolver.get(&LOOPING).unwrap_err().is_circular_dependency());
}

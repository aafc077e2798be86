//! Integration tests for bootstrap management.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tideway_foundation::{Error, Result, StackContext, Value};
use tideway_runtime::{BootstrapManager, BootstrapProvider, NoBootstrap, StaticBootstrap};
use tideway_script::standard_registry;

#[test]
fn no_bootstrap_provides_an_empty_context() {
    let manager = BootstrapManager::new(NoBootstrap).unwrap();
    let context = manager.current();
    assert!(context.stack().is_empty());
    assert_eq!(context.symbols().len(), 0);
}

#[test]
fn static_bootstrap_runs_its_script_once_per_load() {
    let registry = Arc::new(standard_registry());
    let provider = StaticBootstrap::new("1 2 + 'three' STORE 'constant'", registry);
    let context = provider.load().unwrap();

    assert_eq!(
        context.symbols().get(&"three".into()),
        Some(&Value::Long(3))
    );
    // Values left on the bootstrap stack become the request's base stack
    assert_eq!(context.stack().len(), 1);
}

#[test]
fn initial_load_failure_is_fatal() {
    struct Broken;
    impl BootstrapProvider for Broken {
        fn load(&self) -> Result<StackContext> {
            Err(Error::backend("unreachable"))
        }
    }
    assert!(BootstrapManager::new(Broken).is_err());
}

#[test]
fn refresh_failure_keeps_the_previous_context() {
    struct FlakyProvider {
        fail: Arc<AtomicBool>,
    }
    impl BootstrapProvider for FlakyProvider {
        fn load(&self) -> Result<StackContext> {
            if self.fail.load(Ordering::Relaxed) {
                Err(Error::backend("source went away"))
            } else {
                let registry = Arc::new(standard_registry());
                StaticBootstrap::new("7 'lucky' STORE", registry).load()
            }
        }
    }

    let fail = Arc::new(AtomicBool::new(false));
    let manager = BootstrapManager::new(FlakyProvider {
        fail: Arc::clone(&fail),
    })
    .unwrap();

    fail.store(true, Ordering::Relaxed);
    manager.refresh();

    let context = manager.current();
    assert_eq!(context.symbols().get(&"lucky".into()), Some(&Value::Long(7)));
}

#[test]
fn stale_context_refreshes_on_access() {
    let registry = Arc::new(standard_registry());
    let provider = StaticBootstrap::new("1 'n' STORE", registry);
    let manager = BootstrapManager::with_period(provider, Some(Duration::ZERO)).unwrap();

    let first = manager.current();
    let second = manager.current();
    // Zero period forces a reload on every access; each is a new snapshot
    assert!(!Arc::ptr_eq(&first, &second));
}

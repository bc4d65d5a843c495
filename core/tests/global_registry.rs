//! The process-wide registry: one install, then lock-free reads from any
//! thread.

mod common;

use std::cmp::Ordering;
use std::thread;

use bumpalo::Bump;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use rtti_core::{Registry, RegistryBuilder, RegistryError, TypeTable};

use common::int_list;

static INSTALLED: Lazy<&'static Registry> = Lazy::new(|| {
    let mut builder = RegistryBuilder::new();
    builder.register_all(common::ctors()).unwrap();
    builder.install().unwrap()
});

#[test]
fn test_install_publishes_registry() {
    let installed = *INSTALLED;
    let global = Registry::global().unwrap();
    assert!(std::ptr::eq(installed, global));
    assert!(global.lookup("test", "item", 0).is_some());
}

#[test]
fn test_second_install_is_rejected() {
    Lazy::force(&INSTALLED);
    let err = RegistryBuilder::new().install().unwrap_err();
    assert_eq!(err, RegistryError::AlreadyInstalled);
}

#[test]
fn test_free_functions_use_global_registry() {
    let registry = *INSTALLED;
    let arena = Bump::new();
    let types = TypeTable::new(registry, &arena);
    let a = int_list(&arena, &types, &[1, 2]);
    let b = int_list(&arena, &types, &[1, 2]);
    let c = int_list(&arena, &types, &[2]);

    assert!(rtti_core::unify(a, b));
    assert_eq!(rtti_core::compare(a, c), Ordering::Less);
}

#[test]
fn test_concurrent_dispatch() {
    let registry = *INSTALLED;
    thread::scope(|scope| {
        for t in 0..8i64 {
            scope.spawn(move || {
                let arena = Bump::new();
                let types = TypeTable::new(registry, &arena);
                let items: Vec<i64> = (0..1_000).map(|n| n * t).collect();
                let a = int_list(&arena, &types, &items);
                let b = int_list(&arena, &types, &items);
                for _ in 0..10 {
                    assert!(rtti_core::unify(a, b));
                    assert_eq!(rtti_core::compare(a, b), Ordering::Equal);
                }
            });
        }
    });

    // Every thread sees the same descriptor.
    let handles: Vec<usize> = thread::scope(|scope| {
        let spawned: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let list = Registry::global().unwrap().lookup("test", "list", 1).unwrap();
                    list as *const _ as usize
                })
            })
            .collect();
        spawned.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(handles.windows(2).all(|w| w[0] == w[1]));
}

#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn namespace_clones_share_storage() {
    let a = Namespace::new();
    let b = a.clone();
    b.set("x", Value::Int(1));
    assert_eq!(a.get("x"), Some(Value::Int(1)));
    assert!(a.ptr_eq(&b));
}

#[test]
fn namespace_remove_and_names() {
    let ns = Namespace::new();
    ns.set("b", Value::None);
    ns.set("a", Value::None);
    assert_eq!(ns.names(), vec!["a".to_owned(), "b".to_owned()]);
    assert!(ns.remove("a").is_some());
    assert!(!ns.contains("a"));
    assert_eq!(ns.len(), 1);
}

#[test]
fn default_scopes_are_unified() {
    let scopes = Scopes::new();
    assert!(scopes.is_unified());
    scopes.local().set("x", Value::Int(3));
    assert_eq!(scopes.global().get("x"), Some(Value::Int(3)));
}

#[test]
fn distinct_mappings_fall_back_to_global() {
    let scopes = Scopes::with_mappings(Namespace::new(), Namespace::new());
    assert!(!scopes.is_unified());
    scopes.global().set("g", Value::str("global"));
    scopes.local().set("l", Value::str("local"));
    assert_eq!(scopes.get("g"), Some(Value::str("global")));
    assert_eq!(scopes.get("l"), Some(Value::str("local")));
    assert!(scopes.global().get("l").is_none());
    assert!(scopes.get("missing").is_none());
}

//! Behaviour of the declarer, both called directly and as dispatch middleware.
//! No host needed. MemoryDispatcher records what would have been dispatched.

use std::cell::Cell;

use anyhow::anyhow;
use datatree::{
    setup_tree, Action, DataTreeError, Deps, Dispatch, Event, Extractor, MemoryDispatcher,
    DATA_TREE_MARKER,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn payload() -> Value {
    json!({
        "entities": {
            "users": { "1": "foo", "2": "bar", "3": "baz" },
            "repos": {
                "1848": { "owner": 1, "name": "spring" },
                "1574": { "owner": 3, "name": "flower" },
                "1003": { "owner": 2, "name": "waterfall" }
            }
        }
    })
}

fn foo() -> Event {
    Event::new("FOO").with_payload(payload())
}

fn projections(memory: &MemoryDispatcher) -> Vec<Value> {
    memory.actions().iter().map(Action::to_value).collect()
}

/// Fails on the n-th dispatch (0-based), records the rest.
struct FailingDispatcher {
    fail_at: usize,
    seen: Cell<usize>,
    inner: MemoryDispatcher,
}

impl Dispatch for FailingDispatcher {
    fn dispatch(&self, action: Action) -> anyhow::Result<()> {
        let n = self.seen.get();
        self.seen.set(n + 1);
        if n == self.fail_at {
            return Err(anyhow!("host rejected action {n}"));
        }
        self.inner.dispatch(action)
    }
}

// =========================================================================
// declare()
// =========================================================================

#[test]
fn string_dependency_dispatches_satisfaction_then_original() {
    let memory = MemoryDispatcher::new();
    let tree = setup_tree(&memory);

    tree.declare(
        Event::new("FOO").with_payload(json!({ "entities": { "users": { "1": "a" } } })),
        &Deps::new().with("user", "payload.entities.users"),
    )
    .unwrap();

    assert_eq!(
        projections(&memory),
        vec![
            json!({ "dataTree.action": true, "type": "dataTree.user", "payload": { "1": "a" } }),
            json!({ "type": "FOO", "payload": { "entities": { "users": { "1": "a" } } } }),
        ]
    );
}

#[test]
fn function_and_string_dependencies_are_interchangeable() {
    let by_path = MemoryDispatcher::new();
    setup_tree(&by_path)
        .declare(foo(), &Deps::new().with("user", "payload.entities.users"))
        .unwrap();

    let by_func = MemoryDispatcher::new();
    setup_tree(&by_func)
        .declare(
            foo(),
            &Deps::new().with(
                "user",
                Extractor::func(|e: &Event| e.payload["entities"]["users"].clone()),
            ),
        )
        .unwrap();

    assert_eq!(by_path.actions(), by_func.actions());
    assert_eq!(by_path.actions()[0].to_value()["payload"], payload()["entities"]["users"]);
}

#[test]
fn satisfactions_carry_the_marker() {
    let memory = MemoryDispatcher::new();
    setup_tree(&memory)
        .declare(foo(), &Deps::new().with("user", "payload.entities.users"))
        .unwrap();

    let first = &projections(&memory)[0];
    assert_eq!(first[DATA_TREE_MARKER], json!(true));
    assert_eq!(first["type"], json!("dataTree.user"));
    assert!(projections(&memory)[1].get(DATA_TREE_MARKER).is_none());
}

#[test]
fn original_event_is_dispatched_last_and_returned_unchanged() {
    let memory = MemoryDispatcher::new();
    let deps = Deps::new()
        .with("user", "payload.entities.users")
        .with("repo", Extractor::func(|e: &Event| e.payload["entities"]["repos"].clone()))
        .with("missing", "payload.nothing.here");

    let returned = setup_tree(&memory).declare(foo(), &deps).unwrap();

    assert_eq!(returned, foo());
    let actions = memory.actions();
    assert_eq!(actions.len(), 4);
    assert_eq!(actions.last(), Some(&Action::Plain(foo())));

    let keys: Vec<_> = actions[..3]
        .iter()
        .map(|a| match a {
            Action::Satisfaction(sat) => sat.key().map(str::to_string),
            Action::Plain(_) => None,
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            Some("user".to_string()),
            Some("repo".to_string()),
            Some("missing".to_string())
        ]
    );
    assert_eq!(actions[2].to_value()["payload"], Value::Null);
}

#[test]
fn host_failure_stops_the_sequence() {
    let host = FailingDispatcher {
        fail_at: 1,
        seen: Cell::new(0),
        inner: MemoryDispatcher::new(),
    };
    let deps = Deps::new()
        .with("a", "payload")
        .with("b", "payload")
        .with("c", "payload");

    let err = setup_tree(&host).declare(foo(), &deps).unwrap_err();

    assert!(matches!(err, DataTreeError::Dispatch(_)));
    assert!(!err.is_configuration());
    assert_eq!(host.inner.actions().len(), 1);
}

// =========================================================================
// Middleware form (deps carried by the event)
// =========================================================================

#[test]
fn meta_deps_are_expanded() {
    let memory = MemoryDispatcher::new();
    let tree = setup_tree(&memory);
    let action = foo().with_field("meta", json!({ "deps": { "user": "payload.entities.users" } }));

    tree.dispatch(action.clone().into()).unwrap();

    let actions = memory.actions();
    assert_eq!(actions.len(), 2);
    assert_eq!(
        actions[0].to_value(),
        json!({
            "dataTree.action": true,
            "type": "dataTree.user",
            "payload": payload()["entities"]["users"]
        })
    );
    assert_eq!(actions[1], Action::Plain(action));
}

#[test]
fn out_of_band_deps_take_precedence() {
    let memory = MemoryDispatcher::new();
    let tree = setup_tree(&memory);
    let action = foo()
        .with_field("meta", json!({ "deps": { "ignored": "payload" } }))
        .with_deps(Deps::new().with(
            "user",
            Extractor::func(|e: &Event| e.payload["entities"]["users"].clone()),
        ));

    tree.dispatch(action.into()).unwrap();

    let addresses: Vec<_> = memory
        .actions()
        .iter()
        .map(|a| a.address().qualified())
        .collect();
    assert_eq!(addresses, vec!["dataTree.user", "FOO"]);
}

#[test]
fn non_string_meta_dep_fails_without_dispatching() {
    let memory = MemoryDispatcher::new();
    let tree = setup_tree(&memory);
    let action = Event::new("FOO").with_field("meta", json!({ "deps": { "user": 5 } }));

    let err = tree.dispatch(action.into()).unwrap_err();

    match err.downcast_ref::<DataTreeError>() {
        Some(DataTreeError::InvalidExtractor { key, found }) => {
            assert_eq!(key, "user");
            assert_eq!(*found, "number");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(memory.actions().is_empty());
}

#[test]
fn bad_entry_fails_even_alongside_valid_ones() {
    for bad in [json!(5), json!(true), json!({}), json!([]), json!(null)] {
        let memory = MemoryDispatcher::new();
        let tree = setup_tree(&memory);
        let action = foo().with_field(
            "meta",
            json!({ "deps": { "user": "payload.entities.users", "broken": bad } }),
        );

        let err = tree.dispatch(action.into()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DataTreeError>(),
            Some(DataTreeError::InvalidExtractor { .. })
        ));
        assert!(memory.actions().is_empty(), "dispatched before validating");
    }
}

#[test]
fn non_object_meta_deps_fails() {
    let memory = MemoryDispatcher::new();
    let action = foo().with_field("meta", json!({ "deps": "foo" }));

    let err = setup_tree(&memory).dispatch(action.into()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DataTreeError>(),
        Some(DataTreeError::InvalidDependencyMap { found: "string" })
    ));
    assert!(memory.actions().is_empty());
}

#[test]
fn events_without_deps_and_satisfactions_pass_through() {
    let memory = MemoryDispatcher::new();
    let tree = setup_tree(&memory);
    let sat = Action::from_value(
        json!({ "dataTree.action": true, "type": "dataTree.user", "payload": 1 }),
        &Default::default(),
    )
    .unwrap();

    tree.dispatch(Event::new("PLAIN").into()).unwrap();
    tree.dispatch(sat.clone()).unwrap();

    assert_eq!(memory.actions(), vec![Action::Plain(Event::new("PLAIN")), sat]);
}

#[test]
fn declarers_chain() {
    let memory = MemoryDispatcher::new();
    let inner = setup_tree(&memory);
    let outer = setup_tree(&inner);
    let action = foo().with_field("meta", json!({ "deps": { "user": "payload.entities.users" } }));

    outer.dispatch(action.into()).unwrap();

    // The inner declarer sees the original again and expands its meta.deps a second time.
    let addresses: Vec<_> = memory
        .actions()
        .iter()
        .map(|a| a.address().qualified())
        .collect();
    assert_eq!(addresses, vec!["dataTree.user", "dataTree.user", "FOO"]);
}

#[test]
fn out_of_band_deps_expand_once_across_chained_declarers() {
    let memory = MemoryDispatcher::new();
    let inner = setup_tree(&memory);
    let outer = setup_tree(&inner);
    let deps = Deps::new().with("user", "payload.u");

    let returned = outer
        .declare(
            Event::new("FOO")
                .with_payload(json!({ "u": 1 }))
                .with_deps(deps.clone()),
            &deps,
        )
        .unwrap();

    let addresses: Vec<_> = memory
        .actions()
        .iter()
        .map(|a| a.address().qualified())
        .collect();
    assert_eq!(addresses, vec!["dataTree.user", "FOO"]);
    assert!(returned.deps().is_some());
    match memory.actions().last() {
        Some(Action::Plain(event)) => assert!(event.deps().is_none()),
        other => panic!("expected the original event last, got {other:?}"),
    }
}

#[test]
fn out_of_band_deps_dispatched_through_chain_expand_once() {
    let memory = MemoryDispatcher::new();
    let inner = setup_tree(&memory);
    let outer = setup_tree(&inner);

    outer
        .dispatch(foo().with_deps(Deps::new().with("user", "payload.entities.users")).into())
        .unwrap();

    let addresses: Vec<_> = memory
        .actions()
        .iter()
        .map(|a| a.address().qualified())
        .collect();
    assert_eq!(addresses, vec!["dataTree.user", "FOO"]);
}

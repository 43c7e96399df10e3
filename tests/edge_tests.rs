mod common;

use common::{Person, memory_store, people};
use kvgraph::{AttrValue, Edge, KvGraphError, Traits};

#[test]
fn test_insert_and_get_edge_roundtrip() {
    let store = memory_store::<Person>(Traits::new().directed().weighted());
    let v = people(&store, &["a", "b"]);
    let edge = Edge::new(v[0].clone(), v[1].clone())
        .with_weight(0.75)
        .with_attribute('l', "knows")
        .with_attribute('s', 2015i64);
    let hash = store.add_edge(&edge).expect("edge");
    assert_eq!(hash, "evp:a-vp:b");
    let stored = store.edge(&hash).expect("stored");
    assert_eq!(stored.source, v[0]);
    assert_eq!(stored.target, v[1]);
    assert!(!stored.bidirectional);
    assert_eq!(stored.weight, Some(0.75));
    assert_eq!(stored.str_attr('l').as_deref(), Some("knows"));
    assert_eq!(stored.int_attr('s'), Some(2015));
    assert_eq!(stored.uint_attr('s'), Some(2015));
}

#[test]
fn test_edge_requires_both_endpoints() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a"]);
    let err = store
        .add_edge(&Edge::new(v[0].clone(), "vp:missing"))
        .unwrap_err();
    assert!(matches!(err, KvGraphError::VertexNotFound(ref h) if h == "vp:missing"));
    assert!(matches!(
        store.add_edge(&Edge::new("not-a-hash", v[0].clone())),
        Err(KvGraphError::InvalidInput(_))
    ));
    assert_eq!(store.size().unwrap(), 0);
}

#[test]
fn test_duplicate_edge_rejected() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a", "b"]);
    store.add_edge(&Edge::new(v[0].clone(), v[1].clone())).expect("first");
    assert!(matches!(
        store.add_edge(&Edge::new(v[0].clone(), v[1].clone())),
        Err(KvGraphError::EdgeAlreadyExists(_))
    ));
    store
        .add_edge(&Edge::new(v[1].clone(), v[0].clone()))
        .expect("reverse direction is a different edge");
    assert_eq!(store.size().unwrap(), 2);
}

#[test]
fn test_undirected_edges_are_symmetric() {
    let store = memory_store::<Person>(Traits::new());
    let v = people(&store, &["b", "a"]);
    let hash = store.add_edge(&Edge::new(v[0].clone(), v[1].clone())).expect("edge");
    assert_eq!(hash, store.edge_hash(&v[1], &v[0]));
    assert!(matches!(
        store.add_edge(&Edge::new(v[1].clone(), v[0].clone())),
        Err(KvGraphError::EdgeAlreadyExists(_))
    ));
    let stored = store.edge_between(&v[1], &v[0]).expect("either order");
    assert!(stored.bidirectional);
    assert_eq!(stored.source, v[0]);
    assert_eq!(store.size().unwrap(), 1);
}

#[test]
fn test_update_edge_changes_only_given_codes() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a", "b"]);
    let hash = store
        .add_edge(
            &Edge::new(v[0].clone(), v[1].clone())
                .with_weight(2.0)
                .with_attribute('l', "knows")
                .with_attribute('c', 1i64),
        )
        .expect("edge");
    store
        .update_edge(&hash, [('c', AttrValue::from(2)), ('n', AttrValue::from(true))])
        .expect("update");
    let stored = store.edge(&hash).expect("edge");
    assert_eq!(stored.int_attr('c'), Some(2));
    assert_eq!(stored.bool_attr('n'), Some(true));
    assert_eq!(stored.str_attr('l').as_deref(), Some("knows"));
    assert_eq!(stored.weight, Some(2.0));
    assert_eq!((stored.source, stored.target), (v[0].clone(), v[1].clone()));
    assert!(matches!(
        store.update_edge("evp:x-vp:y", [('c', AttrValue::from(1))]),
        Err(KvGraphError::EdgeNotFound(_))
    ));
}

#[test]
fn test_remove_edge_clears_record_and_index() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a", "b"]);
    let hash = store.add_edge(&Edge::new(v[0].clone(), v[1].clone())).expect("edge");
    assert!(store.contains_edge(&hash).unwrap());
    store.remove_edge(&hash).expect("remove");
    assert!(!store.contains_edge(&hash).unwrap());
    assert!(matches!(
        store.remove_edge(&hash),
        Err(KvGraphError::EdgeNotFound(_))
    ));
    let report = store.check_integrity().expect("report");
    assert!(!report.has_issues());
    store.remove_vertex(&v[1]).expect("no incident edges left");
}

#[test]
fn test_edges_enumerates_in_key_order() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a", "b", "c"]);
    for (s, t) in [(1, 2), (0, 2), (0, 1)] {
        store.add_edge(&Edge::new(v[s].clone(), v[t].clone())).expect("edge");
    }
    let listed: Vec<String> = store.edges().unwrap().into_iter().map(|(h, _)| h).collect();
    assert_eq!(
        listed,
        vec!["evp:a-vp:b", "evp:a-vp:c", "evp:b-vp:c"]
    );
    assert_eq!(store.size().unwrap(), 3);
}

#[test]
fn test_edge_lookups_ignore_vertex_keys() {
    let store = memory_store::<Person>(Traits::new().directed());
    let v = people(&store, &["a", "b"]);
    let hash = store.add_edge(&Edge::new(v[0].clone(), v[1].clone())).expect("edge");
    assert!(!store.contains_edge(&v[0]).unwrap());
    assert!(!store.contains_vertex(&hash).unwrap());
    assert!(matches!(
        store.edge(&v[0]),
        Err(KvGraphError::EdgeNotFound(ref h)) if h == &v[0]
    ));
    assert!(matches!(
        store.update_edge(&v[0], [('l', AttrValue::from("knows"))]),
        Err(KvGraphError::EdgeNotFound(_))
    ));
    assert!(matches!(
        store.remove_edge(&v[0]),
        Err(KvGraphError::InvalidInput(_))
    ));
    assert_eq!(store.vertex(&v[0]).expect("untouched"), Person::new("a", 20));
    assert_eq!(store.size().unwrap(), 1);
}

//! Structural updates through a schema declared as JSON.

use std::sync::Arc;

use serde_json::{json, Value};
use yanginst_model::{ContentType, DataModel, ErrorCategory, SchemaService};
use yanginst_path::path;

fn model() -> DataModel {
    DataModel::from_json(&json!({
        "kind": "container",
        "children": {
            "system": {
                "kind": "container",
                "children": {
                    "hostname": {"kind": "leaf", "type": {"base": "string", "length": [1, 63]}, "mandatory": true},
                    "dns": {"kind": "leaf-list", "type": {"base": "string"}}
                }
            },
            "interface": {
                "kind": "list",
                "key": ["name"],
                "children": {
                    "name": {"kind": "leaf", "type": {"base": "string", "pattern": "[a-z]+[0-9]*"}},
                    "mtu": {"kind": "leaf", "type": {"base": "uint16", "range": [68, 9000]}, "default": 1500},
                    "enabled": {"kind": "leaf", "type": {"base": "boolean"}}
                }
            },
            "counters": {
                "kind": "container",
                "config": false,
                "children": {
                    "rx": {"kind": "leaf", "type": {"base": "uint64"}}
                }
            }
        }
    }))
    .unwrap()
}

fn sample() -> Value {
    json!({
        "system": {"hostname": "edge1", "dns": ["10.0.0.1"]},
        "interface": [
            {"name": "eth0", "mtu": 1500},
            {"name": "eth1", "mtu": 9000}
        ]
    })
}

// ── Reads ─────────────────────────────────────────────────────────────────────

#[test]
fn goto_and_navigate() {
    let doc = model().from_raw(&sample()).unwrap();
    let eth1 = doc.goto(path!["interface", 1usize].steps()).unwrap();
    assert!(eth1.is_entry());
    assert_eq!(eth1.member("name").unwrap().raw_value(), json!("eth1"));
    assert_eq!(eth1.up().unwrap().path(), &path!["interface"]);
    assert_eq!(eth1.children().len(), 2);
}

#[test]
fn state_flag_reaches_leaves() {
    let m = model();
    let doc = m.from_raw(&json!({"counters": {"rx": "12"}})).unwrap();
    let rx = doc.goto(path!["counters", "rx"].steps()).unwrap();
    let err = m.validate(&rx, ContentType::Config).unwrap_err();
    assert_eq!(err.tag, "member-not-allowed");
}

// ── Updates ───────────────────────────────────────────────────────────────────

#[test]
fn append_entry_from_schema_default() {
    let m = model();
    let doc = m.from_raw(&sample()).unwrap();
    let list = doc.goto(path!["interface"].steps()).unwrap();
    let fresh = list.schema().entry_default_raw();
    let entry = list.append_entry(&fresh).unwrap();
    assert_eq!(entry.path(), &path!["interface", 2usize]);
    assert_eq!(entry.raw_value(), json!({"name": "", "mtu": 1500}));

    // the empty key fails the pattern
    let name = entry.member("name").unwrap();
    let err = m.validate(&name, ContentType::All).unwrap_err();
    assert_eq!(err.category, ErrorCategory::TypeError);
}

#[test]
fn delete_entry_shares_siblings() {
    let doc = model().from_raw(&sample()).unwrap();
    let system0 = doc.goto(path!["system"].steps()).unwrap();
    let next = doc
        .goto(path!["interface", 0usize].steps())
        .unwrap()
        .delete()
        .unwrap()
        .top();
    let system1 = next.goto(path!["system"].steps()).unwrap();
    assert!(Arc::ptr_eq(system0.value(), system1.value()));
    assert_eq!(
        next.goto(path!["interface"].steps()).unwrap().raw_value(),
        json!([{"name": "eth1", "mtu": 9000}])
    );
    // original version untouched
    assert_eq!(doc.raw_value(), sample());
}

#[test]
fn decode_error_on_wrong_shape() {
    let err = model()
        .from_raw(&json!({"system": {"dns": "8.8.8.8"}}))
        .unwrap_err();
    assert!(err.to_string().contains("/system/dns"));
}

#[test]
fn update_entry_in_place() {
    let doc = model().from_raw(&sample()).unwrap();
    let eth0 = doc.goto(path!["interface", 0usize].steps()).unwrap();
    let updated = eth0
        .update(&json!({"name": "eth0", "mtu": 1400}))
        .unwrap();
    assert_eq!(updated.path(), &path!["interface", 0usize]);
    let doc2 = updated.top();
    assert_eq!(
        doc2.goto(path!["interface", 0usize, "mtu"].steps())
            .unwrap()
            .raw_value(),
        json!(1400)
    );
    // the untouched name leaf is shared
    assert!(Arc::ptr_eq(
        eth0.member("name").unwrap().value(),
        updated.member("name").unwrap().value()
    ));
}

#[test]
fn canonical_string_keeps_member_order() {
    let m = model();
    let doc = m
        .from_raw(&json!({"interface": [{"mtu": 1500, "name": "eth0"}]}))
        .unwrap();
    let text = m.canonical_string(&doc).unwrap();
    let mtu = text.find("mtu").unwrap();
    let name = text.find("name").unwrap();
    assert!(mtu < name);
    assert!(text.contains("\n            \"mtu\": 1500"));
}

#[test]
fn mandatory_and_default_children() {
    let m = model();
    let system = m.schema().child("system").unwrap().clone();
    let mandatory: Vec<String> = m
        .mandatory_children(&system)
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(mandatory, vec!["hostname"]);
    let list = m.schema().child("interface").unwrap().clone();
    let defaults = m.default_children(&list);
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].1, json!(1500));
}

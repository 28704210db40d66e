//! Loading, saving, reading and validating through the repository.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::{json, Value};
use yanginst::{LoadOutcome, PathStep, RepoError, Repository, BASELINE_SLOT, DEFAULT_SLOT};
use yanginst_model::schema::builder::*;
use yanginst_model::schema::LeafType;
use yanginst_model::{DataModel, SchemaService};

fn model() -> DataModel {
    DataModel::new(root([
        leaf("hostname", LeafType::string()).mandatory(),
        list("interface", ["name"], [
            leaf("name", LeafType::string()),
            leaf("mtu", LeafType::uint16()),
            leaf("enabled", LeafType::boolean()),
        ]),
        leaf_list("dns", LeafType::string()),
    ]))
    .unwrap()
}

fn sample() -> Value {
    json!({
        "hostname": "edge1",
        "interface": [
            {"name": "eth0", "mtu": 1500, "enabled": true},
            {"name": "eth1", "mtu": 9000}
        ],
        "dns": ["10.0.0.1", "10.0.0.2"]
    })
}

// ── Load / save ───────────────────────────────────────────────────────────────

#[test]
fn save_of_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.json");
    let output = dir.path().join("out.json");
    fs::write(&input, serde_json::to_string(&sample()).unwrap()).unwrap();

    let repo = Repository::new(model());
    assert_eq!(repo.load(&input).unwrap(), LoadOutcome::Loaded);
    repo.save(&output).unwrap();

    let saved: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved, sample());
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("{\n    \"hostname\""));
}

#[test]
fn save_resets_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::new(model());
    repo.load_raw(&sample()).unwrap();
    let edited = repo
        .get_resource(&[PathStep::member("hostname")])
        .unwrap()
        .update(&json!("edge2"))
        .unwrap();
    repo.commit(edited.top()).unwrap();
    assert!(!repo.diff_baseline().unwrap().is_identical());

    repo.save(dir.path().join("saved.json")).unwrap();
    assert!(repo.diff_baseline().unwrap().is_identical());
    assert!(repo
        .slot(BASELINE_SLOT)
        .unwrap()
        .ptr_eq(&repo.slot(DEFAULT_SLOT).unwrap()));
}

#[test]
fn unreadable_file_falls_back_to_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();

    let repo = Repository::new(model());
    let outcome = repo.load(&broken).unwrap();
    assert!(matches!(outcome, LoadOutcome::Recovered { .. }));
    assert_eq!(repo.slot(DEFAULT_SLOT).unwrap().raw_value(), json!({}));
    assert_eq!(repo.error_log().len(), 1);

    let missing = repo.load(dir.path().join("nope.json")).unwrap();
    assert!(!missing.is_loaded());
}

#[test]
fn schema_mismatch_falls_back_too() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("wrong.json");
    fs::write(&file, r#"{"hostname": 42}"#).unwrap();
    let repo = Repository::new(model());
    match repo.load(&file).unwrap() {
        LoadOutcome::Recovered { reason } => assert!(reason.contains("/hostname")),
        LoadOutcome::Loaded => panic!("expected a fallback"),
    }
}

#[test]
fn diff_shows_changed_line() {
    let repo = Repository::new(model());
    repo.load_raw(&sample()).unwrap();
    let mtu = repo
        .get_resource(&[
            PathStep::member("interface"),
            PathStep::Index(1),
            PathStep::member("mtu"),
        ])
        .unwrap();
    repo.commit(mtu.update(&json!(1400)).unwrap().top())
        .unwrap();
    let diff = repo.diff(BASELINE_SLOT, DEFAULT_SLOT).unwrap();
    assert_eq!(diff.stats(), (1, 1));
    let text = diff.to_ndiff();
    assert!(text.contains("-             \"mtu\": 9000"));
    assert!(text.contains("+             \"mtu\": 1400"));
}

// ── Validation ────────────────────────────────────────────────────────────────

#[test]
fn invalid_documents_still_commit() {
    let repo = Repository::new(model());
    repo.load_raw(&sample()).unwrap();
    assert!(repo.is_valid());
    let dup = repo
        .get_resource(&[PathStep::member("interface")])
        .unwrap()
        .append_entry(&json!({"name": "eth0"}))
        .unwrap();
    repo.commit(dup.top()).unwrap();
    let log = repo.error_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].tag, "non-unique-key");
    assert_eq!(
        repo.slot(DEFAULT_SLOT).unwrap().raw_value()["interface"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn load_during_publication_is_rejected() {
    let repo = Rc::new(Repository::new(model()));
    let result = Rc::new(RefCell::new(None));
    let inner = Rc::clone(&repo);
    let sink = Rc::clone(&result);
    repo.subscribe_all(move |_| {
        if sink.borrow().is_none() {
            *sink.borrow_mut() = Some(inner.load_raw(&json!({})));
        }
    });
    repo.load_raw(&sample()).unwrap();
    assert!(matches!(
        result.borrow().as_ref(),
        Some(Err(RepoError::CommitInProgress))
    ));
    assert_eq!(repo.slot(DEFAULT_SLOT).unwrap().raw_value(), sample());
}

// ── Generated inputs ──────────────────────────────────────────────────────────

fn arb_step() -> impl Strategy<Value = PathStep> {
    prop_oneof![
        prop::sample::select(vec!["hostname", "interface", "dns", "name", "mtu", "x", ""])
            .prop_map(PathStep::member),
        (0usize..5).prop_map(PathStep::Index),
        any::<usize>().prop_map(PathStep::Index),
    ]
}

fn arb_entry() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec!["a", "b", "c"]),
        prop::option::of(0u32..70_000),
    )
        .prop_map(|(name, mtu)| match mtu {
            Some(mtu) => json!({"name": name, "mtu": mtu}),
            None => json!({"name": name}),
        })
}

fn arb_document() -> impl Strategy<Value = Value> {
    (
        prop::option::of("[a-z]{0,3}"),
        prop::collection::vec(arb_entry(), 0..5),
        prop::collection::vec(prop::sample::select(vec!["x", "y"]), 0..4),
    )
        .prop_map(|(hostname, interfaces, dns)| {
            let mut raw = json!({"interface": interfaces, "dns": dns});
            if let Some(h) = hostname {
                raw["hostname"] = json!(h);
            }
            raw
        })
}

proptest! {
    #[test]
    fn get_resource_never_panics(
        raw in arb_document(),
        path in prop::collection::vec(arb_step(), 0..5),
        slot in prop::sample::select(vec!["default", "load", "missing"]),
    ) {
        let repo = Repository::new(model());
        repo.load_raw(&raw).unwrap();
        if let Some(node) = repo.get_resource_in(slot, &path) {
            prop_assert_eq!(node.path().steps(), path.as_slice());
        }
    }

    #[test]
    fn error_log_is_sorted_and_unique(raw in arb_document()) {
        let repo = Repository::new(model());
        repo.load_raw(&raw).unwrap();
        let log = repo.error_log();
        for pair in log.windows(2) {
            prop_assert!(pair[0].path <= pair[1].path);
            prop_assert_ne!(pair[0].to_string(), pair[1].to_string());
        }
        let mut rendered: Vec<String> = log.iter().map(ToString::to_string).collect();
        rendered.sort();
        rendered.dedup();
        prop_assert_eq!(rendered.len(), log.len());
    }

    #[test]
    fn canonical_text_round_trips(raw in arb_document()) {
        let m = model();
        let doc = m.from_raw(&raw).unwrap();
        let text = m.canonical_string(&doc).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(m.from_raw(&reparsed).unwrap(), doc);
    }
}

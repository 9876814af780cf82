//! Integration tests for camdiff-core

use camdiff_core::{
    utils::MemorySnapshotStore, CheckConfig, DuplicatePolicy, MigrationCheck, RawCamRecord,
    ReconcileError, RunMode, RunOutcome, SnapshotPhase, SnapshotStore,
};

const PRE_JSON: &str = r#"[
    {"destination_address": "0050.7966.6800", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Gi1/0/1"]},
    {"destination_address": "0050.7966.6801", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Gi1/0/2"]},
    {"destination_address": "0050.7966.6802", "type": "DYNAMIC", "vlan": "20", "destination_port": ["Gi1/0/3"]}
]"#;

const POST_JSON: &str = r#"[
    {"destination_address": "0050.7966.6800", "type": "DYNAMIC", "vlan": "10", "destination_port": ["Te1/1/1"]},
    {"destination_address": "0050.7966.6802", "type": "STATIC", "vlan": "20", "destination_port": ["Gi1/0/3"]},
    {"destination_address": "0050.7966.6803", "type": "DYNAMIC", "vlan": "30", "destination_port": ["Gi1/0/4"]}
]"#;

#[tokio::test]
async fn test_complete_migration_workflow() {
    let store = MemorySnapshotStore::new();
    let mut check = MigrationCheck::new(store.clone());

    let pre = check
        .capture_json("access-sw1", SnapshotPhase::Pre, PRE_JSON)
        .await
        .unwrap();
    assert_eq!(pre.len(), 3);

    let post = check
        .capture_json("access-sw1", SnapshotPhase::Post, POST_JSON)
        .await
        .unwrap();
    assert_eq!(post.len(), 3);

    assert_eq!(store.list_devices().await.unwrap(), vec!["access-sw1"]);

    let report = check.diff("access-sw1").await.unwrap();
    assert_eq!(report.pre_snapshot_id, pre.id());
    assert_eq!(report.post_snapshot_id, post.id());
    assert!(!report.is_clean);

    let diff = &report.diff;
    assert_eq!(diff.only_in_pre.len(), 1);
    assert_eq!(diff.only_in_pre[0].address, "00:50:79:66:68:01");
    assert_eq!(diff.only_in_post.len(), 1);
    assert_eq!(diff.only_in_post[0].address, "00:50:79:66:68:03");
    assert_eq!(diff.moved.len(), 1);
    assert_eq!(diff.moved[0].address, "00:50:79:66:68:00");
    assert_eq!(diff.moved[0].old_port, "Gi1/0/1");
    assert_eq!(diff.moved[0].new_port, "Te1/1/1");

    // learning type changed but the port did not
    assert_eq!(diff.unchanged.len(), 1);
    assert_eq!(diff.unchanged[0].address, "00:50:79:66:68:02");
    assert_eq!(diff.unchanged[0].metadata.entry_type.as_deref(), Some("DYNAMIC"));
}

#[tokio::test]
async fn test_run_modes() {
    let mut check = MigrationCheck::new(MemorySnapshotStore::new());
    let records = vec![
        RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/1"),
        RawCamRecord::new("bb:bb:bb:bb:bb:bb", "Gi1/0/2"),
    ];

    let outcome = check
        .run(RunMode::Pre, "sw1", Some(records.clone()))
        .await
        .unwrap();
    match outcome {
        RunOutcome::Captured {
            device,
            phase,
            entries,
            duplicates,
            ..
        } => {
            assert_eq!(device, "sw1");
            assert_eq!(phase, SnapshotPhase::Pre);
            assert_eq!(entries, 2);
            assert_eq!(duplicates, 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    check
        .run(RunMode::Post, "sw1", Some(records))
        .await
        .unwrap();

    let outcome = check.run(RunMode::Diff, "sw1", None).await.unwrap();
    match outcome {
        RunOutcome::Diffed(report) => {
            assert!(report.is_clean);
            assert_eq!(report.summary.unchanged, 2);
            assert_eq!(report.summary.drift(), 0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_mode_and_options() {
    let config = CheckConfig::from_json(r#"{"mode": "post", "materialize_unchanged": false}"#)
        .unwrap();
    let mut check = MigrationCheck::with_config(MemorySnapshotStore::new(), config);

    check
        .capture(
            "sw1",
            SnapshotPhase::Pre,
            vec![RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/1")],
        )
        .await
        .unwrap();

    let outcome = check
        .run_configured(
            "sw1",
            Some(vec![RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/1")]),
        )
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RunOutcome::Captured {
            phase: SnapshotPhase::Post,
            ..
        }
    ));

    let report = check.diff("sw1").await.unwrap();
    assert!(report.is_clean);
    assert!(report.diff.unchanged.is_empty());
}

#[tokio::test]
async fn test_duplicate_policies() {
    let records = vec![
        RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/1"),
        RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/2"),
    ];

    let mut lenient = MigrationCheck::new(MemorySnapshotStore::new());
    let snapshot = lenient
        .capture("sw1", SnapshotPhase::Pre, records.clone())
        .await
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.entries()[0].port, "Gi1/0/2");
    assert_eq!(snapshot.duplicates()[0].discarded_port, "Gi1/0/1");

    let config = CheckConfig {
        duplicate_policy: DuplicatePolicy::Strict,
        ..Default::default()
    };
    let store = MemorySnapshotStore::new();
    let mut strict = MigrationCheck::with_config(store.clone(), config);
    let err = strict
        .capture("sw1", SnapshotPhase::Pre, records)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::ConflictingDuplicateAddress { .. }
    ));
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_empty_diff_is_distinct_from_collection_failure() {
    let mut check = MigrationCheck::new(MemorySnapshotStore::new());

    // nothing collected yet: an error, not an empty diff
    let err = check.diff("sw1").await.unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::SnapshotNotFound {
            phase: SnapshotPhase::Pre,
            ..
        }
    ));

    // empty tables on both sides: a clean diff
    check
        .capture_json("sw1", SnapshotPhase::Pre, "[]")
        .await
        .unwrap();
    check
        .capture_json("sw1", SnapshotPhase::Post, "[]")
        .await
        .unwrap();
    let report = check.diff("sw1").await.unwrap();
    assert!(report.is_clean);
    assert_eq!(report.summary.drift(), 0);
}

#[tokio::test]
async fn test_recapture_replaces_snapshot() {
    let store = MemorySnapshotStore::new();
    let mut check = MigrationCheck::new(store.clone());

    check
        .capture(
            "sw1",
            SnapshotPhase::Pre,
            vec![RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/1")],
        )
        .await
        .unwrap();
    let recaptured = check
        .capture(
            "sw1",
            SnapshotPhase::Pre,
            vec![RawCamRecord::new("aa:aa:aa:aa:aa:aa", "Gi1/0/7")],
        )
        .await
        .unwrap();

    let stored = store
        .get_snapshot("sw1", SnapshotPhase::Pre)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id(), recaptured.id());
    assert_eq!(stored.entries()[0].port, "Gi1/0/7");
}

#[test]
fn test_report_serializes_buckets() {
    let json = serde_json::json!({
        "device": "sw1",
        "preSnapshotId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "postSnapshotId": "67e55044-10b1-426f-9247-bb680e5fe0c9",
        "preCapturedAt": "2024-03-01T22:00:00",
        "postCapturedAt": "2024-03-02T04:00:00",
        "summary": {"onlyInPre": 0, "onlyInPost": 0, "moved": 1, "unchanged": 0},
        "isClean": false,
        "diff": {
            "onlyInPre": [],
            "onlyInPost": [],
            "moved": [{"address": "aa:aa:aa:aa:aa:aa", "oldPort": "Gi1/0/1", "newPort": "Gi1/0/5"}]
        }
    });

    let report: camdiff_core::DiffReport = serde_json::from_value(json).unwrap();
    assert_eq!(report.diff.moved[0].new_port, "Gi1/0/5");
    assert!(report.diff.unchanged.is_empty());
}

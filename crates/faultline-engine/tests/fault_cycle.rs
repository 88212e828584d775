//! End-to-end inject/restore cycles against a real fixture tree.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use faultline_engine::{
    EngineError, FaultKind, Harness, HarnessConfig, RestoreOutcome, TemplateStore,
};
use faultline_registry::{FaultDefinition, FaultRegistry};
use faultline_test_utils::{template_body, TreeFixture};

fn open_fixture(fixture: &TreeFixture) -> Harness {
    Harness::open(
        HarnessConfig::new(fixture.project_root()).with_templates_root(fixture.templates_root()),
    )
    .expect("open harness")
}

#[test]
fn inject_then_restore_round_trips_every_catalog_fault() {
    for kind in FaultKind::ALL {
        let fixture = TreeFixture::new();
        let harness = open_fixture(&fixture);
        let before = fixture.snapshot_tree();

        let report = harness.inject(kind).expect("inject");
        assert_eq!(report.fault_type, kind);
        assert!(!report.modified_paths.is_empty(), "{kind} modified nothing");
        assert_ne!(
            fixture.snapshot_tree(),
            before,
            "{kind} left the tree untouched"
        );
        assert!(!harness.status().unwrap().is_idle());

        let outcome = harness.restore().expect("restore");
        let RestoreOutcome::Restored { summary } = outcome else {
            panic!("{kind} restore reported idle");
        };
        assert!(summary.cleaned, "{kind} restore did not clean up");
        assert!(summary.verified, "{kind} restore failed verification");

        assert_eq!(fixture.snapshot_tree(), before, "{kind} tree not pristine");
        assert!(harness.status().unwrap().is_idle());
        assert!(!fixture.backup_root().exists(), "{kind} left backup state");
    }
}

#[test]
fn injected_file_carries_the_template_payload() {
    let fixture = TreeFixture::new();
    fixture.write_project_file("src/App.jsx", "export default 1;");
    let harness = open_fixture(&fixture);

    harness.inject(FaultKind::SyntaxError).expect("inject");
    assert_eq!(
        fixture.read_project_file("src/App.jsx"),
        template_body(FaultKind::SyntaxError)
    );

    harness.restore().expect("restore");
    assert_eq!(fixture.read_project_file("src/App.jsx"), "export default 1;");
}

#[test]
fn second_inject_is_refused_and_changes_nothing() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);

    harness.inject(FaultKind::SyntaxError).expect("first inject");
    let faulted = fixture.snapshot_tree();

    let err = harness.inject(FaultKind::CssSyntaxError).unwrap_err();
    match &err {
        EngineError::FaultAlreadyActive { fault, .. } => {
            assert_eq!(*fault, FaultKind::SyntaxError);
        }
        other => panic!("expected FaultAlreadyActive, got {other:?}"),
    }
    assert!(err.is_conflict());
    assert_eq!(
        fixture.snapshot_tree(),
        faulted,
        "refused inject must not touch the tree"
    );

    // restoring unblocks the next injection
    harness.restore().expect("restore");
    harness.inject(FaultKind::CssSyntaxError).expect("second inject");
    harness.restore().expect("second restore");
}

#[test]
fn created_targets_are_removed_on_restore() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);

    assert!(!fixture.project_file_exists("src/utils/cycleA.js"));
    let report = harness.inject(FaultKind::CircularDependency).expect("inject");
    assert_eq!(report.modified_paths.len(), 2);
    assert!(fixture.project_file_exists("src/utils/cycleA.js"));
    assert!(fixture.project_file_exists("src/utils/cycleB.js"));

    harness.restore().expect("restore");
    assert!(!fixture.project_file_exists("src/utils/cycleA.js"));
    assert!(!fixture.project_file_exists("src/utils/cycleB.js"));
}

#[test]
fn version_conflict_rewrites_only_the_manifest() {
    let fixture = TreeFixture::new();
    let lock_before = fixture.read_project_file("package-lock.json");
    let harness = open_fixture(&fixture);

    let report = harness
        .inject(FaultKind::DependencyVersionConflict)
        .expect("inject");
    // both targets are protected, only the manifest is overwritten
    assert_eq!(report.backed_up, 2);
    assert_eq!(report.modified_paths, vec![Path::new("package.json")]);
    assert!(fixture
        .read_project_file("package.json")
        .contains("__chaos_fault__"));
    assert_eq!(fixture.read_project_file("package-lock.json"), lock_before);

    // simulate the build rewriting the lockfile before restore runs
    fixture.write_project_file("package-lock.json", "{ \"mangled\": true }\n");

    harness.restore().expect("restore");
    assert_eq!(fixture.read_project_file("package-lock.json"), lock_before);
}

#[test]
fn restore_when_idle_is_a_noop() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);
    let before = fixture.snapshot_tree();

    let outcome = harness.restore().expect("restore");
    assert!(outcome.is_idle());
    assert!(outcome.summary().is_none());
    assert_eq!(fixture.snapshot_tree(), before);
}

#[test]
fn corrupt_record_blocks_operations_and_preserves_storage() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);
    harness.inject(FaultKind::SyntaxError).expect("inject");

    let metadata = fixture.backup_root().join("metadata.json");
    fs::write(&metadata, b"{ corrupted beyond recognition").expect("corrupt the record");

    let err = harness.restore().unwrap_err();
    assert!(err.is_corrupt_state(), "restore must refuse: {err}");
    assert!(harness.status().unwrap_err().is_corrupt_state());
    assert!(harness.inject(FaultKind::CssSyntaxError).is_err());

    // nothing was deleted: the evidence is intact for manual recovery
    assert!(metadata.is_file());
    let files_dir = fixture.backup_root().join("files");
    assert!(fs::read_dir(files_dir).expect("files dir").count() > 0);
}

#[test]
fn failed_apply_rolls_back_to_pristine() {
    let fixture = TreeFixture::new();
    // a regular file where the injection needs a directory
    fixture.write_project_file("blocked", "plain file\n");
    let before = fixture.snapshot_tree();

    let definition = FaultDefinition::new(
        FaultKind::BuildOutOfMemory,
        "build-errors/build-out-of-memory.js",
        vec!["blocked/out.js".into()],
    );
    let harness = open_fixture(&fixture)
        .with_registry(FaultRegistry::from_definitions([definition]).unwrap());

    let err = harness.inject(FaultKind::BuildOutOfMemory).unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }), "got {err:?}");

    assert_eq!(fixture.snapshot_tree(), before, "rollback left changes");
    assert!(harness.status().unwrap().is_idle());
    assert!(!fixture.backup_root().exists());
}

#[test]
fn missing_template_blocks_injection_before_any_change() {
    let fixture = TreeFixture::new();
    let empty_templates = fixture.project_root().join("no-templates-here");
    fs::create_dir_all(&empty_templates).unwrap();
    let harness = Harness::open(
        HarnessConfig::new(fixture.project_root()).with_templates_root(&empty_templates),
    )
    .expect("open harness");
    let before = fixture.snapshot_tree();

    let err = harness.inject(FaultKind::SyntaxError).unwrap_err();
    assert!(matches!(err, EngineError::Template(_)), "got {err:?}");
    assert_eq!(fixture.snapshot_tree(), before);
    assert!(harness.status().unwrap().is_idle());

    let report = harness.verify_templates();
    assert_eq!(report.checked, 12);
    assert_eq!(report.issues.len(), 12);
}

#[test]
fn status_reports_the_active_fault() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);

    let report = harness.inject(FaultKind::ImportError).expect("inject");
    let status = harness.status().expect("status");
    let active = status.active.expect("active fault");
    assert_eq!(active.fault_type, FaultKind::ImportError);
    assert_eq!(active.entry_count, report.backed_up);
    assert_eq!(active.injected_at, report.injected_at);
}

#[test]
fn repository_templates_pass_verification() {
    let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    let report = TemplateStore::new(templates).verify(&FaultRegistry::builtin());
    assert!(
        report.is_clean(),
        "shipped templates are unusable: {:?}",
        report.issues
    );
    assert_eq!(report.checked, 12);
}

#[test]
fn injection_report_serializes_for_automation() {
    let fixture = TreeFixture::new();
    let harness = open_fixture(&fixture);
    let report = harness.inject(FaultKind::SyntaxError).expect("inject");

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["fault_type"], "syntax-error");
    assert_eq!(json["severity"], "critical");
    assert_eq!(json["build_fails"], true);
    assert_eq!(json["modified_paths"][0], "src/App.jsx");
    assert!(json["expected_error"]
        .as_str()
        .unwrap()
        .contains("Unexpected end of file"));
}

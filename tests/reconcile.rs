//! End-to-end flow: parse two parameters files from disk, reconcile
//! them against each other, and run a follow-up command.

use deckhand::command::{execute, ExecOptions};
use deckhand::console::Console;
use deckhand::error::Error;
use deckhand::params::{load_str, reconcile};
use std::fs;

fn load(path: &std::path::Path) -> serde_yml::Value {
    load_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn parameters_files_reconcile_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("parameters.remote.yml");
    let local_path = dir.path().join("parameters.yml");

    fs::write(
        &remote_path,
        "parameters:\n  database_host: db.internal\n  database_port: 3306\n  mailer_dsn: smtp://mail\n",
    )
    .unwrap();
    fs::write(
        &local_path,
        "parameters:\n  database_host: 127.0.0.1\n  database_port: \"3306\"\n",
    )
    .unwrap();

    let remote = load(&remote_path);
    let local = load(&local_path);

    let mut console = Console::new(Vec::new()).with_fancy_border(false);
    let report = reconcile(&mut console, &remote, &local).unwrap();

    assert_eq!(report.missing_local.len(), 1);
    assert_eq!(report.missing_local[0].0, "mailer_dsn");
    assert_eq!(report.type_mismatches.len(), 1);
    assert_eq!(report.type_mismatches[0].key, "database_port");

    let output = String::from_utf8(console.into_inner()).unwrap();
    assert!(output.contains("Parameter Type Mismatch"));
    assert!(output.contains("Missing [Local] Params:"));
    assert!(output.contains("mailer_dsn"));
}

#[test]
fn local_overrides_missing_on_remote_abort_the_run() {
    let remote: serde_yml::Value =
        serde_yml::from_str("parameters:\n  database_host: db.internal\n").unwrap();
    let local: serde_yml::Value =
        serde_yml::from_str("parameters:\n  database_host: 127.0.0.1\n  secret: abc\n").unwrap();

    let mut console = Console::new(Vec::new());
    let err = reconcile(&mut console, &remote, &local).unwrap_err();
    assert!(matches!(err, Error::MissingParameter(_)));

    // The report is written before the failure, not rolled back.
    let output = String::from_utf8(console.into_inner()).unwrap();
    assert!(output.contains("secret"));
}

#[test]
fn reconcile_then_execute_shares_one_console() {
    let remote: serde_yml::Value = serde_yml::from_str("parameters:\n  a: 1\n").unwrap();
    let local: serde_yml::Value = serde_yml::from_str("parameters:\n  a: 1\n").unwrap();

    let mut console = Console::new(Vec::new());
    reconcile(&mut console, &remote, &local).unwrap();

    let stdout = execute(
        "echo reconciled",
        ExecOptions {
            output: Some(&mut console),
            command_description: Some("Applying parameters".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(stdout, "reconciled");
    let output = String::from_utf8(console.into_inner()).unwrap();
    assert_eq!(output, "Applying parameters\n");
}

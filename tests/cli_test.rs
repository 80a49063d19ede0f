use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_payouts_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("payouts").arg("tests/fixtures/amounts.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "team_id,recorded_amount,before_processing,processing_fee,organizer_fee,participant_take_home",
        ))
        // Net 9930 is exactly 10000 before the 0.7% processing fee
        .stdout(predicate::str::contains("team-1,9930,10000,70,1000,9000"))
        .stdout(predicate::str::contains("team-2,100.25,100.96,0.71,10.1,90.86"))
        // Nothing recorded yet
        .stdout(predicate::str::contains("team-3,0,0,0,0,0"));

    Ok(())
}

#[test]
fn test_cli_report_without_store_is_empty() {
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("report");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("team_id,recorded_amount").not());
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("payouts").arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}

#[test]
fn test_set_setting_requires_db_path() {
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("set-setting").arg("payment_gateway_key").arg("k-1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--db-path"));
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_set_setting_refuses_in_memory_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("set-setting")
        .arg("payment_gateway_key")
        .arg("k-1")
        .arg("--db-path")
        .arg(dir.path().join("settings_db"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("storage-rocksdb"))
        .stderr(predicate::str::contains("setting stored").not());
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_set_setting_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(cargo_bin!("teampay"));
    cmd.arg("set-setting")
        .arg("payment_gateway_key")
        .arg("k-1")
        .arg("--db-path")
        .arg(dir.path().join("settings_db"));

    cmd.assert().success();
}

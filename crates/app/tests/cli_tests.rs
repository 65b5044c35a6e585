//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn learn() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("learn").unwrap();
    cmd.env_remove("LMS_API_URL")
        .env_remove("LMS_ACCESS_TOKEN")
        .env_remove("LMS_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    learn()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modules"))
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("study"))
        .stdout(predicate::str::contains("result"));
}

#[test]
fn malformed_result_id_is_rejected_by_the_parser() {
    learn()
        .args(["result", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn unsupported_url_scheme_fails_before_any_request() {
    learn()
        .args(["--api-url", "ftp://lms.test/api/v1", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}

#[test]
fn unreachable_service_reports_connection_problem() {
    learn()
        .args(["--api-url", "http://127.0.0.1:9/api/v1", "--timeout-secs", "2", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not reach the learning service"));
}

#[test]
fn environment_supplies_the_base_url() {
    learn()
        .env("LMS_API_URL", "ftp://from-env.test")
        .arg("progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-env.test"));
}

#[test]
fn unparsable_timeout_in_environment_falls_back_to_default() {
    learn()
        .env("LMS_TIMEOUT_SECS", "soon")
        .args(["--api-url", "ftp://lms.test/api/v1", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}

#[test]
fn flags_override_the_environment() {
    learn()
        .env("LMS_API_URL", "http://127.0.0.1:9/api/v1")
        .args(["--api-url", "ftp://from-flag.test", "modules"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-flag.test"));
}

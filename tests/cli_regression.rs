// Regression tests for the `iimport` binary.
// Requires: assert_cmd, predicates, tempfile in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

const GOOD: &str = "%def twice(x) -> y\ny = 2 * x\n%end\nprint(y)\n";

fn iimport() -> Command {
    let mut cmd = Command::cargo_bin("iimport").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn transform_prints_hoisted_program() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("good.py");
    fs::write(&file, GOOD).unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("transform")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("def twice(x):").and(contains("y = twice(x)")));
}

#[test]
fn json_output_lists_procedures() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("good.py");
    fs::write(&file, GOOD).unwrap();

    iimport()
        .current_dir(dir.path())
        .args(["transform", "--format", "json"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"procedures\"").and(contains("\"twice\"")));
}

#[test]
fn passthrough_comments_out_markup() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("good.py");
    fs::write(&file, GOOD).unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("passthrough")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("# %def twice(x) -> y").and(contains("print(y)")));
}

#[test]
fn cli_reports_miette_diagnostics_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.py");
    fs::write(&file, "%def open_forever(a) -> b\nb = a\n").unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("transform")
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("iimport::unterminated_definition").or(contains("open_forever")));
}

#[test]
fn check_fails_when_any_document_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.py"), GOOD).unwrap();
    fs::write(dir.path().join("b.py"), "%end\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "%end\n").unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("check")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(contains("a.py").and(contains("b.py")).and(contains("notes.txt").not()));
}

#[test]
fn import_uses_include_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("helpers.py"), GOOD).unwrap();

    iimport()
        .args(["import", "helpers", "--as", "h", "-I"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("def twice(x):"));
}

#[test]
fn session_dispatches_commands_between_code_lines() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nb.py");
    fs::write(
        &file,
        "# %%\nx = 1\n%iimport_enabled 1\n# %%\n%iimport_debug 0\nx = 41\n%def f(a) -> b\nb = a + x\n%end\n",
    )
    .unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("session")
        .arg(&file)
        .assert()
        .success()
        .stdout(
            contains("x = 1")
                .and(contains("x = 41"))
                .and(contains("def f(a):"))
                .and(contains("%iimport").not()),
        );
}

#[test]
fn session_reports_bad_commands_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nb.py");
    fs::write(&file, "%iimport_enabled maybe\ny = 2\n# %%\nz = 3\n").unwrap();

    iimport()
        .current_dir(dir.path())
        .arg("session")
        .arg(&file)
        .assert()
        .failure()
        .stdout(contains("y = 2").and(contains("z = 3")))
        .stderr(contains("iimport::invalid_command").or(contains("expected 0 or 1")));
}

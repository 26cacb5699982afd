use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const SOURCE: &str = "Main\n====\n\nSome *emphasis* here.\n";

#[test]
fn test_inspect_defaults_to_treeviz() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path()).args(["inspect", "doc.rst"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("⧉ Document (1 items)\n└─ § Main\n"))
        .stdout(predicate::str::contains("𝐼 emphasis"));
}

#[test]
fn test_inspect_show_linum() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path())
        .args(["inspect", "doc.rst", "--extra-show-linum"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("04   └─ ¶ Some emphasis here."));
}

#[test]
fn test_inspect_show_linum_from_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();
    fs::write(
        dir.path().join("rstfmt.toml"),
        "[inspect]\nshow_line_numbers = true\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path()).args(["inspect", "doc.rst"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("01 └─ § Main"));

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path())
        .args(["inspect", "doc.rst", "--extra-show-linum", "false"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\n└─ § Main\n"));
}

#[test]
fn test_inspect_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path()).args(["inspect", "doc.rst", "json"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["children"][0]["type"], "section");
}

#[test]
fn test_inspect_rst_matches_format() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), "Main\n====\ntext   here").unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path()).args(["inspect", "doc.rst", "rst"]);

    cmd.assert()
        .success()
        .stdout("====\nMain\n====\n\ntext here\n");
}

#[test]
fn test_inspect_rejects_unknown_view() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path()).args(["inspect", "doc.rst", "xml"]);

    cmd.assert().failure().stderr(predicate::str::contains("xml"));
}

#[test]
fn test_inspect_rejects_unknown_extra() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("doc.rst"), SOURCE).unwrap();

    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.current_dir(dir.path())
        .args(["inspect", "doc.rst", "--extra-depth", "3"]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("treeviz does not take parameter 'depth'"));
}

#[test]
fn test_inspect_list_views() {
    let mut cmd = cargo_bin_cmd!("rstfmt");
    cmd.args(["inspect", "--list-views"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("treeviz"))
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("Canonical reStructuredText"));
}

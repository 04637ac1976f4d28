#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn afternil() -> Command {
    Command::cargo_bin("afternil").unwrap()
}

/// Copy of the fixture directory, so `--fix` and config files stay local.
fn workspace() -> tempfile::TempDir {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/refs");
    let dir = tempfile::tempdir().unwrap();
    for entry in fs::read_dir(fixtures).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    dir
}

#[test]
fn test_version() {
    afternil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"afternil \d+\.\d+\.\d+").unwrap());
}

#[test]
fn test_check_text_output() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "bad_return_nil_err.go"])
        .assert()
        .code(1)
        .stdout("Reference after nil check at bad_return_nil_err.go:8:9\n\treturn err\n");
}

#[test]
fn test_check_context_lines() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--context", "3", "bad_return_nil_err.go"])
        .assert()
        .code(1)
        .stdout(
            "Reference after nil check at bad_return_nil_err.go:8:9\n\t\treturn err\n\t}\n\treturn err\n",
        );

    afternil()
        .current_dir(dir.path())
        .args(["check", "--context", "0", "bad_return_nil_err.go"])
        .assert()
        .code(1)
        .stdout("Reference after nil check at bad_return_nil_err.go:8:9\n");
}

#[test]
fn test_check_machine_output_directory() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--format", "machine", "."])
        .assert()
        .code(1)
        .stdout(concat!(
            "./bad_conditional_print_nil_err.go:12:15\n",
            "./bad_else_branch.go:10:28\n",
            "./bad_multiple_refs.go:11:45\n",
            "./bad_multiple_refs.go:11:50\n",
            "./bad_print_nil_err.go:10:14\n",
            "./bad_return_nil_err.go:8:9\n",
        ));
}

#[test]
fn test_default_path_is_current_directory() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--format", "machine"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("./bad_print_nil_err.go:10:14"));
}

#[test]
fn test_clean_files_exit_zero() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "ok_shadowed.go", "ok_go_and_defer.go", "ok_address_of.go"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_custom_exit_code() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--exit-code", "7", "bad_print_nil_err.go"])
        .assert()
        .code(7);

    afternil()
        .current_dir(dir.path())
        .args(["check", "--exit-code", "0", "bad_print_nil_err.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reference after nil check"));
}

#[test]
fn test_config_file_is_honored() {
    let dir = workspace();
    fs::write(
        dir.path().join("afternil.toml"),
        "[afternil]\nformat = \"machine\"\nexit_code = 3\n",
    )
    .unwrap();
    afternil()
        .current_dir(dir.path())
        .args(["check", "bad_return_nil_err.go"])
        .assert()
        .code(3)
        .stdout("bad_return_nil_err.go:8:9\n");

    // Flags override the file.
    afternil()
        .current_dir(dir.path())
        .args(["check", "--format", "text", "--exit-code", "4", "bad_return_nil_err.go"])
        .assert()
        .code(4)
        .stdout(predicate::str::starts_with("Reference after nil check at"));
}

#[test]
fn test_json_output() {
    let dir = workspace();
    let output = afternil()
        .current_dir(dir.path())
        .args(["check", "--format", "json", "bad_else_branch.go"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.trim_start().starts_with('['), "{stdout}");
    assert!(stdout.contains("\"rule\": \"REF001\""), "{stdout}");
    assert!(stdout.contains("\"line\": 10"), "{stdout}");
}

#[test]
fn test_pretty_output() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--format", "pretty", "--no-color", "bad_return_nil_err.go"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("REF001"))
        .stdout(predicate::str::contains("Found 1 reference(s) after nil check in 1 file(s)"));
}

#[test]
fn test_unknown_format_is_usage_error() {
    afternil()
        .args(["check", "--format", "sarif", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn test_fix_rewrites_files() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--fix", "bad_print_nil_err.go", "bad_return_nil_err.go"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Fixed 2 reference(s) in 2 file(s)"));

    let fixed = fs::read_to_string(dir.path().join("bad_return_nil_err.go")).unwrap();
    assert!(fixed.ends_with("\t}\n\treturn nil\n}\n"), "{fixed}");

    afternil()
        .current_dir(dir.path())
        .args(["check", "bad_print_nil_err.go", "bad_return_nil_err.go"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_fix_clears_every_reference_in_one_run() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .args(["check", "--fix", "bad_multiple_refs.go"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Fixed 3 reference(s) in 1 file(s)"));

    afternil()
        .current_dir(dir.path())
        .args(["check", "bad_multiple_refs.go"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_suppression_comment() {
    let dir = workspace();
    let path = dir.path().join("bad_return_nil_err.go");
    let source = fs::read_to_string(&path).unwrap();
    let suppressed = source.replace("\treturn err\n}", "\treturn err // afternil:ignore\n}");
    assert_ne!(source, suppressed);
    fs::write(&path, suppressed).unwrap();

    afternil()
        .current_dir(dir.path())
        .args(["check", "bad_return_nil_err.go"])
        .assert()
        .success();
}

#[test]
fn test_syntax_error_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.go"), "package p\n\nfunc f( {\n").unwrap();
    afternil()
        .current_dir(dir.path())
        .args(["check", "broken.go"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: broken.go:"));
}

#[test]
fn test_consistency_fault_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("blank.go"),
        "package p\n\nfunc f() {\n\tif _ != nil {\n\t\treturn\n\t}\n}\n",
    )
    .unwrap();
    afternil()
        .current_dir(dir.path())
        .args(["check", "blank.go"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("error: internal consistency fault"));
}

#[test]
fn test_missing_path_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    afternil()
        .current_dir(dir.path())
        .args(["check", "nope.go"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: nope.go: no such file or directory"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(["check", "--verbose", "ok_shadowed.go"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("checking file"));
}

#[test]
fn test_debug_log_shows_resolved_configuration() {
    let dir = workspace();
    afternil()
        .current_dir(dir.path())
        .env("RUST_LOG", "debug")
        .args(["check", "--format", "machine", "ok_shadowed.go"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("resolved configuration"))
        .stderr(predicate::str::contains("Machine"));
}

#[test]
fn test_explain_ref001() {
    afternil()
        .args(["explain", "ref001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REF001: Reference after nil check"))
        .stdout(predicate::str::contains("return nil"));
}

#[test]
fn test_explain_unknown_rule() {
    afternil()
        .args(["explain", "NIL001"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown rule: NIL001"));
}

#[test]
fn test_init_creates_config_once() {
    let dir = tempfile::tempdir().unwrap();
    afternil()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created afternil.toml"));

    let content = fs::read_to_string(dir.path().join("afternil.toml")).unwrap();
    assert!(content.contains("[afternil]"));

    afternil()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

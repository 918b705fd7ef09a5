use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;

#[test]
fn repairs_shredded_markup_from_an_argument() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["repair", "f_r a_c 1 n"]);
    cmd.assert()
        .success()
        .stdout(contains("\\frac{1}{n}"))
        .stdout(contains("valid:   true"));
}

#[test]
fn reads_from_stdin_when_no_input_is_given() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.arg("repair").write_stdin("x+1");
    cmd.assert().success().stdout(contains("markup:  x+1"));
}

#[test]
fn reads_from_a_file_with_the_file_flag() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "e_q u_i v s_u m").unwrap();

    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["repair", "--file"]).arg(file.path());
    cmd.assert()
        .success()
        .stdout(contains("\\equiv"))
        .stdout(contains("\\sum"));
}

#[test]
fn json_output_carries_the_full_result() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["repair", "--json", "x+1"]);
    cmd.assert()
        .success()
        .stdout(contains("\"clean_markup\":\"x+1\""))
        .stdout(contains("\"is_valid\":true"));
}

#[test]
fn invalid_results_exit_nonzero_with_diagnostics() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["repair", "x }}}}"]);
    cmd.assert()
        .code(2)
        .stdout(contains("unbalanced-braces"));
}

#[test]
fn gate_lists_violations_without_repairing() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["gate", "f_r a_c 1 n"]);
    cmd.assert().code(2).stdout(contains("shredded-command"));
}

#[test]
fn gate_reports_clean_input_as_clean() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["gate", "x+1"]);
    cmd.assert().success().stdout(contains("clean"));
}

#[test]
fn tree_input_is_normalized_and_emitted() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["tree", "<math><mi>x</mi><mo>+</mo><mn>1</mn></math>"]);
    cmd.assert()
        .success()
        .stdout(contains("markup:  x + 1"))
        .stdout(contains("valid:   true"));
}

#[test]
fn verbose_output_includes_the_repair_log() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.args(["repair", "--verbose", "f_r a_c 1 n"]);
    cmd.assert().success().stdout(contains("log:"));
}

#[test]
fn help_lists_the_subcommands() {
    let mut cmd = Command::cargo_bin("mathmend").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("repair"))
        .stdout(contains("tree"))
        .stdout(contains("gate"));
}

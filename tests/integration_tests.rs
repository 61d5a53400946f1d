use assert_cmd::Command;
use predicates::str::{contains, diff};

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.assert().success();
}

#[test]
fn runs_hello_world() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run").arg("tests/files/hello.bin");

    cmd.assert()
        .success()
        .stdout(contains("Hello, world!\nStopped.\n"))
        .stdout(contains("Halted"));
}

#[test]
fn runs_path_shorthand() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("tests/files/hello.bin");
    cmd.assert().success().stdout(contains("Hello, world!"));
}

#[test]
fn minimal_output_is_program_only() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run").arg("tests/files/hello.bin").arg("--minimal");

    cmd.assert()
        .success()
        .stdout(diff("Hello, world!\nStopped.\n"))
        .stderr(diff(""));
}

#[test]
fn echoes_piped_input() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run")
        .arg("tests/files/echo.bin")
        .arg("--minimal")
        .write_stdin("x");

    cmd.assert().success().stdout(diff("xStopped.\n"));
}

#[test]
fn prints_registers() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run")
        .arg("tests/files/echo.bin")
        .arg("--minimal")
        .arg("--registers")
        .write_stdin("A");

    cmd.assert()
        .success()
        .stderr(contains("R0 65\n"))
        .stderr(contains("PC 12291\n"));
}

#[test]
fn unknown_trap_fails() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run").arg("tests/files/bad_trap.bin").arg("--minimal");

    cmd.assert()
        .failure()
        .code(1)
        .stdout(diff(""))
        .stderr(diff("Error: Unknown trap vector 0x99 at address 0x3000\n"));
}

#[test]
fn rejects_unaligned_image() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("run").arg("tests/files/odd.bin");

    cmd.assert()
        .failure()
        .stderr(contains("not aligned to 16 bits"));
}

#[test]
fn dumps_disassembly() {
    let mut cmd = Command::cargo_bin("lc3").unwrap();
    cmd.arg("dump").arg("tests/files/hello.bin");

    cmd.assert()
        .success()
        .stdout(contains("0x3000  0xe002  LEA R0, #2\n"))
        .stdout(contains("0x3001  0xf022  PUTS\n"))
        .stdout(contains("0x3002  0xf025  HALT\n"));
}

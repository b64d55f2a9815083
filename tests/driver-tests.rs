use std::fs;

use tempfile::tempdir;

use wabc::{driver, Options};

#[test]
fn writes_next_to_the_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.wb");
    fs::write(&input, include_str!("testfiles/program1.wb")).unwrap();

    let out = driver::compile_file(&input, None, &Options::default()).unwrap();
    assert_eq!(out, dir.path().join("program.ll"));

    let llvm = fs::read_to_string(out).unwrap();
    assert_eq!(llvm, include_str!("goldenfiles/compilation/program1.golden"));
}

#[test]
fn overwrites_the_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.wb");
    let output = dir.path().join("elsewhere.ll");
    fs::write(&input, "print 1;").unwrap();
    fs::write(&output, "stale").unwrap();

    let out = driver::compile_file(&input, Some(&output), &Options::default()).unwrap();
    assert_eq!(out, output);
    assert!(fs::read_to_string(output)
        .unwrap()
        .starts_with("declare i32 @_print_int(i32)"));
}

#[test]
fn missing_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("missing.wb");
    assert!(driver::compile_file(&input, None, &Options::default()).is_err());
}

#[test]
fn bad_source_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.wb");
    fs::write(&input, include_str!("fails/fail_typechecking.wb")).unwrap();

    assert!(driver::compile_file(&input, None, &Options::default()).is_err());
    assert!(!dir.path().join("bad.ll").exists());
}

#[test]
fn stages_are_written() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.wb");
    fs::write(&input, include_str!("testfiles/control.wb")).unwrap();

    let mut out = Vec::new();
    driver::write_stages(&input, &Options::default(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let headers = text.lines().filter(|line| line.starts_with("=== ")).count();
    assert_eq!(headers, 12);
    assert!(text.contains("=== constant folding ==="));
    assert!(text.contains("=== entry blocks ==="));
}

#[test]
fn parse_tree_is_written() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.wb");
    fs::write(&input, include_str!("testfiles/floats.wb")).unwrap();

    let mut out = Vec::new();
    driver::write_parse_tree(&input, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("func scale(x: float, n: int) float"));
}

use clap::Parser;
use stackgen::cli::Args;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("stackgen")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./stack", "./output", "--framework", "nextjs"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.stack_dir, PathBuf::from("./stack"));
    assert_eq!(parsed.output_dir, PathBuf::from("./output"));
    assert_eq!(parsed.framework, "nextjs");
    assert_eq!(parsed.database, "none");
    assert_eq!(parsed.auth, "none");
    assert_eq!(parsed.provider, None);
    assert!(parsed.features.is_empty());
    assert!(!parsed.force);
    assert!(!parsed.verbose);
}

#[test]
fn test_all_options() {
    let args = make_args(&[
        "--framework",
        "nextjs",
        "--database",
        "prisma",
        "--provider",
        "mysql",
        "--auth",
        "next-auth",
        "--feature",
        "docker,testing",
        "--feature",
        "eslint",
        "--force",
        "--verbose",
        "./stack",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
    assert_eq!(parsed.features, vec!["docker", "testing", "eslint"]);

    let selection = parsed.selection();
    assert_eq!(selection.database, "prisma");
    assert_eq!(selection.auth, "next-auth");
    assert_eq!(selection.provider.as_deref(), Some("mysql"));
    assert_eq!(selection.features, vec!["docker", "testing", "eslint"]);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-v", "--framework", "nextjs", "./stack", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.verbose);
}

#[test]
fn test_missing_framework() {
    let args = make_args(&["./stack", "./output"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_missing_args() {
    let args = make_args(&["./stack", "--framework", "nextjs"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./stack", "./output", "extra", "--framework", "nextjs"]);
    assert!(Args::try_parse_from(args).is_err());
}

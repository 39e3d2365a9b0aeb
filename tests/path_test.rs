use stackgen::path::{classify, PathMode};

#[test]
fn test_single_paths() {
    assert_eq!(classify("lib/prisma.ts"), ("lib/prisma.ts", PathMode::Single));
    assert_eq!(classify("lib"), ("lib", PathMode::Single));
    assert!(!PathMode::Single.is_wildcard());
}

#[test]
fn test_wildcards() {
    assert_eq!(classify("db/*"), ("db", PathMode::Flat));
    assert_eq!(classify("app/api/**"), ("app/api", PathMode::Recursive));
    assert_eq!(classify("**"), ("", PathMode::Recursive));
    assert_eq!(classify("*"), ("", PathMode::Flat));
    assert!(PathMode::Flat.is_wildcard());
    assert!(PathMode::Recursive.is_wildcard());
}

#[test]
fn test_inner_stars_are_literal() {
    assert_eq!(classify("lib/*.ts"), ("lib/*.ts", PathMode::Single));
}

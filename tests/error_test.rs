use std::io;

use stackgen::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::TemplateError("rendering failed".to_string());
    assert_eq!(err.to_string(), "Template error: rendering failed.");

    let err = Error::MissingPatchTarget { path: "app/layout.tsx".to_string() };
    assert_eq!(err.to_string(), "Cannot patch 'app/layout.tsx': file does not exist.");

    let err = Error::MissingSource {
        module: "prisma".to_string(),
        source_path: "lib/db.ts".to_string(),
    };
    assert_eq!(err.to_string(), "Module 'prisma' has no source file 'lib/db.ts'.");
}

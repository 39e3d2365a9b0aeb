//! Common constants used throughout stackgen.

/// Generator descriptor file names, tried in order
pub const GENERATOR_FILES: [&str; 3] = ["generator.json", "generator.yml", "generator.yaml"];

/// Companion module descriptor file names, tried in order
pub const MODULE_FILES: [&str; 3] = ["module.json", "module.yml", "module.yaml"];

/// Directory inside a module holding the files its operations copy from
pub const BUNDLE_DIR: &str = "files";

/// Directory of a stack root holding one base skeleton per framework
pub const SKELETONS_DIR: &str = "templates";

/// Directory of a stack root holding `<type>/<name>` module directories
pub const MODULES_DIR: &str = "modules";

/// Package manifest merged by dependency and script operations
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Environment file merged by env operations
pub const ENV_FILE: &str = ".env";

/// Environment template copied to [`ENV_FILE`] when the skeleton lacks one
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Optional ignore file in a skeleton root
pub const IGNORE_FILE: &str = ".stackignore";

/// Patterns never copied from a skeleton
pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] =
    ["**/.git/**", "**/.DS_Store", "**/node_modules/**", IGNORE_FILE];

/// Dotfiles that skeletons may ship under a `_` prefix instead
pub const DOTFILE_FALLBACKS: [&str; 7] = [
    "gitignore",
    "env",
    "env.example",
    "env.local",
    "eslintrc.json",
    "prettierrc",
    "npmrc",
];

/// Value used by the selection source for "no module of this type"
pub const NONE_SELECTION: &str = "none";

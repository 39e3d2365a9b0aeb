use stackgen::config::{GeneratorConfig, ModuleType};
use stackgen::context::{GenerationContext, Selection};
use stackgen::error::Error;
use stackgen::executor::{Effect, Executor};
use stackgen::operation::Operation;
use stackgen::renderer::DirectiveRenderer;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn module(files: &[(&str, &str)]) -> (TempDir, GeneratorConfig) {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = dir.path().join("files").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    let mut config = GeneratorConfig::new("prisma", ModuleType::Database);
    config.module_dir = dir.path().to_path_buf();
    (dir, config)
}

fn operation(json: &str) -> Operation {
    serde_json::from_str(json).unwrap()
}

fn context() -> GenerationContext {
    GenerationContext::from_selection(
        &Selection::new("nextjs").with_database("prisma").with_provider("mysql"),
    )
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

#[test]
fn test_create_file_from_source_is_rendered() {
    let (_module_dir, owner) = module(&[("lib/db.ts", "// {{database}} on {{provider}}\n")]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "lib/db.ts", "destination": "lib/{{database}}.ts"}"#);
    let effect = executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(effect, Effect::Written(vec![output.path().join("lib/prisma.ts")]));
    assert_eq!(read(output.path(), "lib/prisma.ts"), "// prisma on mysql\n");
}

#[test]
fn test_inline_content_wins_over_source() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(
        r#"{"type": "create-file", "source": "missing.ts", "destination": "x.ts", "content": "{{framework}}"}"#,
    );
    executor.apply(&op, &owner, &mut context()).unwrap();
    assert_eq!(read(output.path(), "x.ts"), "nextjs");
}

#[test]
fn test_recursive_wildcard_preserves_structure() {
    let (_module_dir, owner) = module(&[
        ("api/auth/route.ts", "auth"),
        ("api/users/[id]/route.ts", "user"),
    ]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "api/**", "destination": "app/api/**"}"#);
    let effect = executor.apply(&op, &owner, &mut context()).unwrap();

    match effect {
        Effect::Written(paths) => assert_eq!(paths.len(), 2),
        other => panic!("Expected written files, got {:?}", other),
    }
    assert_eq!(read(output.path(), "app/api/auth/route.ts"), "auth");
    assert_eq!(read(output.path(), "app/api/users/[id]/route.ts"), "user");
}

#[test]
fn test_flat_wildcard_takes_immediate_files() {
    let (_module_dir, owner) = module(&[
        ("db/index.ts", "index"),
        ("db/schema.ts", "schema"),
        ("db/seed/seed.ts", "seed"),
    ]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "db/*", "destination": "src/db"}"#);
    executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(read(output.path(), "src/db/index.ts"), "index");
    assert_eq!(read(output.path(), "src/db/schema.ts"), "schema");
    assert!(!output.path().join("src/db/seed").exists());
}

#[test]
fn test_flat_destination_discards_structure() {
    let (_module_dir, owner) = module(&[("types/a/one.d.ts", "1"), ("types/b/two.d.ts", "2")]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "types/**", "destination": "types/*"}"#);
    executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(read(output.path(), "types/one.d.ts"), "1");
    assert_eq!(read(output.path(), "types/two.d.ts"), "2");
}

#[test]
fn test_binary_files_are_copied_verbatim() {
    let (module_dir, owner) = module(&[]);
    let bytes = [0x89u8, 0x50, 0x4e, 0x47, 0xff, 0xfe, b'{', b'{'];
    fs::create_dir_all(module_dir.path().join("files/public")).unwrap();
    fs::write(module_dir.path().join("files/public/logo.png"), bytes).unwrap();

    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "public/**", "destination": "public/**"}"#);
    executor.apply(&op, &owner, &mut context()).unwrap();
    assert_eq!(fs::read(output.path().join("public/logo.png")).unwrap(), bytes);
}

#[test]
fn test_missing_source_is_fatal() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "create-file", "source": "lib/nope.ts", "destination": "lib/nope.ts"}"#);
    match executor.apply(&op, &owner, &mut context()) {
        Err(Error::MissingSource { module, source_path }) => {
            assert_eq!(module, "prisma");
            assert_eq!(source_path, "lib/nope.ts");
        }
        other => panic!("Expected MissingSource, got {:?}", other),
    }
}

#[test]
fn test_missing_patch_target_is_fatal() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "patch-file", "file": "app/layout.tsx", "operations": []}"#);
    assert!(matches!(
        executor.apply(&op, &owner, &mut context()),
        Err(Error::MissingPatchTarget { .. })
    ));
}

#[test]
fn test_patch_file_appends_content_then_patches() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    fs::write(output.path().join("index.ts"), "import a from 'a';\n\nrun(a);\n").unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(
        r#"{"type": "patch-file", "file": "index.ts", "content": "// {{database}}",
            "operations": [{"type": "add-import", "imports": ["import b from 'b';"]}]}"#,
    );
    let effect = executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(effect, Effect::Patched(output.path().join("index.ts")));
    assert_eq!(
        read(output.path(), "index.ts"),
        "import a from 'a';\nimport b from 'b';\n\nrun(a);\n// prisma\n"
    );
}

#[test]
fn test_run_command_is_queued_not_run() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "run-command", "command": "npx {{database}} generate"}"#);
    let effect = executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(effect, Effect::Queued("npx prisma generate".to_string()));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_add_env_merges_existing_file() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    fs::write(output.path().join(".env"), "# app\nPORT=3000\nDATABASE_URL=\n").unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(
        r#"{"type": "add-env", "envVars": {"DATABASE_URL": "{{provider}}://localhost", "SHADOW_URL": "x"}}"#,
    );
    executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(
        read(output.path(), ".env"),
        "# app\nPORT=3000\nDATABASE_URL=mysql://localhost\nSHADOW_URL=x\n"
    );
}

#[test]
fn test_add_dependency_and_script_merge_manifest() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    fs::write(
        output.path().join("package.json"),
        r#"{"name": "app", "dependencies": {"next": "15.0.3"}}"#,
    )
    .unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(
        r#"{"type": "add-dependency", "dependencies": {"@prisma/client": "^5.22.0"},
            "devDependencies": {"prisma": "^5.22.0"}}"#,
    );
    executor.apply(&op, &owner, &mut context()).unwrap();
    let op = operation(r#"{"type": "add-script", "scripts": {"db:push": "{{database}} db push"}}"#);
    executor.apply(&op, &owner, &mut context()).unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&read(output.path(), "package.json")).unwrap();
    assert_eq!(manifest["name"], "app");
    assert_eq!(manifest["dependencies"]["next"], "15.0.3");
    assert_eq!(manifest["dependencies"]["@prisma/client"], "^5.22.0");
    assert_eq!(manifest["devDependencies"]["prisma"], "^5.22.0");
    assert_eq!(manifest["scripts"]["db:push"], "prisma db push");
}

#[test]
fn test_add_dependency_creates_missing_manifest() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "add-dependency", "dependencies": {"zod": "^3.23.0"}}"#);
    executor.apply(&op, &owner, &mut context()).unwrap();

    assert_eq!(
        read(output.path(), "package.json"),
        "{\n  \"dependencies\": {\n    \"zod\": \"^3.23.0\"\n  }\n}\n"
    );
}

#[test]
fn test_unknown_operation_is_skipped() {
    let (_module_dir, owner) = module(&[]);
    let output = TempDir::new().unwrap();
    let engine = DirectiveRenderer::new();
    let executor = Executor::new(&engine, output.path());

    let op = operation(r#"{"type": "deploy", "target": "vercel"}"#);
    assert_eq!(executor.apply(&op, &owner, &mut context()).unwrap(), Effect::Skipped);
}

use stackgen::condition::{Condition, ConditionValue};
use stackgen::config::{GeneratorConfig, ModuleType};
use stackgen::context::{GenerationContext, Selection};
use stackgen::operation::PatchOperation;
use stackgen::patch::{
    add_code, add_imports, add_to_bottom, add_to_top, apply_patches, replace_code, PatchOutcome,
};
use stackgen::renderer::DirectiveRenderer;
use std::fs;
use tempfile::TempDir;

const LAYOUT: &str = "import type { Metadata } from 'next';
import './globals.css';

export const metadata: Metadata = {
  title: 'App',
};
";

fn changed(outcome: PatchOutcome) -> String {
    match outcome {
        PatchOutcome::Changed(text) => text,
        other => panic!("Expected a change, got {:?}", other),
    }
}

#[test]
fn test_add_imports_keeps_crlf_line_endings() {
    let out = changed(add_imports(
        "import a from 'a';\r\n\r\nconst x = 1;\r\n",
        &["import b from 'b';".to_string()],
    ));
    assert_eq!(out, "import a from 'a';\r\nimport b from 'b';\r\n\r\nconst x = 1;\r\n");
}

#[test]
fn test_add_imports_after_last_import() {
    let out = changed(add_imports(
        LAYOUT,
        &["import { SessionProvider } from 'next-auth/react';".to_string()],
    ));
    assert_eq!(
        out,
        "import type { Metadata } from 'next';
import './globals.css';
import { SessionProvider } from 'next-auth/react';

export const metadata: Metadata = {
  title: 'App',
};
"
    );
}

#[test]
fn test_add_imports_is_idempotent() {
    let imports = vec![
        "import { prisma } from '@/lib/prisma';".to_string(),
        "import { prisma } from '@/lib/prisma';".to_string(),
    ];
    let once = changed(add_imports(LAYOUT, &imports));
    assert_eq!(once.matches("@/lib/prisma").count(), 1);
    assert_eq!(add_imports(&once, &imports), PatchOutcome::Unchanged);
}

#[test]
fn test_add_imports_keeps_directive_prologue_first() {
    let text = "'use client';\n\nexport function Button() {}\n";
    let out = changed(add_imports(text, &["import { useState } from 'react';".to_string()]));
    assert_eq!(
        out,
        "'use client';\n\nimport { useState } from 'react';\n\nexport function Button() {}\n"
    );
}

#[test]
fn test_add_imports_without_existing_imports() {
    let out = changed(add_imports("const x = 1;\n", &["import a from 'a';".to_string()]));
    assert_eq!(out, "import a from 'a';\n\nconst x = 1;\n");
}

#[test]
fn test_add_code_after_anchor() {
    let text = "const a = 1;\nconst b = 2;\n";
    let out = changed(add_code(text, "const c = 3;", Some("const a = 1;"), None));
    assert_eq!(out, "const a = 1;\n\nconst c = 3;\n\nconst b = 2;\n");
}

#[test]
fn test_add_code_before_anchor() {
    let text = "const a = 1;\n\nexport default a;\n";
    let out = changed(add_code(text, "console.log(a);", None, Some("export default")));
    assert_eq!(out, "const a = 1;\n\nconsole.log(a);\n\nexport default a;\n");
}

#[test]
fn test_add_code_is_idempotent() {
    let text = "const a = 1;\n";
    let once = changed(add_code(text, "const b = 2;\n", Some("const a = 1;"), None));
    assert_eq!(
        add_code(&once, "const b = 2;\n", Some("const a = 1;"), None),
        PatchOutcome::Unchanged
    );
}

#[test]
fn test_add_code_missing_anchor_is_reported() {
    let outcome = add_code("const a = 1;\n", "const b = 2;", Some("nowhere"), None);
    assert_eq!(outcome, PatchOutcome::AnchorNotFound("nowhere".to_string()));
}

#[test]
fn test_add_code_without_anchor_appends() {
    let out = changed(add_code("const a = 1;\n", "const b = 2;", None, None));
    assert_eq!(out, "const a = 1;\nconst b = 2;\n");
}

#[test]
fn test_replace_code_first_match_only() {
    let out = changed(replace_code("a a a", "a", "b"));
    assert_eq!(out, "b a a");
    assert_eq!(
        replace_code("abc", "x", "y"),
        PatchOutcome::AnchorNotFound("x".to_string())
    );
}

#[test]
fn test_add_to_top_and_bottom() {
    assert_eq!(add_to_top("body\n", "// header\n"), "// header\nbody\n");
    assert_eq!(add_to_bottom("body\n\n", "\nfooter"), "body\nfooter\n");
    assert_eq!(add_to_bottom("", "only"), "only\n");
}

#[test]
fn test_apply_patches_renders_and_gates() {
    let module_dir = TempDir::new().unwrap();
    fs::create_dir_all(module_dir.path().join("files")).unwrap();
    fs::write(module_dir.path().join("files/footer.ts"), "// {{database}} footer\n").unwrap();

    let mut owner = GeneratorConfig::new("next-auth", ModuleType::Auth);
    owner.module_dir = module_dir.path().to_path_buf();

    let operations: Vec<PatchOperation> = serde_json::from_str(
        r#"[
            {"type": "add-import", "import": "import { {{database}} } from './db';"},
            {"type": "add-code", "code": "// drizzle only", "condition": {"database": "drizzle"}},
            {"type": "replace-code", "search": "'App'", "code": "'{{framework}} app'"},
            {"type": "add-to-bottom", "source": "footer.ts"},
            {"type": "add-missing-semicolons"}
        ]"#,
    )
    .unwrap();
    assert_eq!(operations[4], PatchOperation::Unknown);

    let mut ctx =
        GenerationContext::from_selection(&Selection::new("nextjs").with_database("prisma"));
    let out = apply_patches(
        LAYOUT,
        &operations,
        &DirectiveRenderer::new(),
        &mut ctx,
        &owner,
        "app/layout.tsx",
    )
    .unwrap();

    assert!(out.contains("import { prisma } from './db';"));
    assert!(!out.contains("drizzle only"));
    assert!(out.contains("title: 'nextjs app',"));
    assert!(out.ends_with("};\n// prisma footer\n"));
}

#[test]
fn test_apply_patches_missing_companion_file() {
    let owner = GeneratorConfig::new("prisma", ModuleType::Database);
    let operations = vec![PatchOperation::AddToTop {
        content: None,
        source: Some("missing.ts".to_string()),
        condition: Some(Condition::new().with("database", ConditionValue::Bool(true))),
    }];
    let mut ctx =
        GenerationContext::from_selection(&Selection::new("nextjs").with_database("prisma"));

    let result = apply_patches(
        LAYOUT,
        &operations,
        &DirectiveRenderer::new(),
        &mut ctx,
        &owner,
        "app/layout.tsx",
    );
    assert!(result.is_err());
}

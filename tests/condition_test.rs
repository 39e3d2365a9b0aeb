use stackgen::condition::{matches, Condition, ConditionValue};
use stackgen::context::{GenerationContext, Selection};

fn context(selection: Selection) -> GenerationContext {
    GenerationContext::from_selection(&selection)
}

fn text(value: &str) -> ConditionValue {
    ConditionValue::Text(value.to_string())
}

fn any_of(values: &[&str]) -> ConditionValue {
    ConditionValue::AnyOf(values.iter().map(|v| v.to_string()).collect())
}

#[test]
fn test_absent_condition_matches() {
    let ctx = context(Selection::new("nextjs"));
    assert!(matches(None, &ctx));
    assert!(matches(Some(&Condition::new()), &ctx));
}

#[test]
fn test_scalar_and_any_of() {
    let ctx = context(Selection::new("nextjs").with_database("prisma"));

    assert!(Condition::new().with("database", text("prisma")).matches(&ctx));
    assert!(!Condition::new().with("database", text("drizzle")).matches(&ctx));
    assert!(Condition::new().with("database", any_of(&["drizzle", "prisma"])).matches(&ctx));
    assert!(!Condition::new().with("database", any_of(&["drizzle", "mongoose"])).matches(&ctx));
}

#[test]
fn test_all_keys_must_match() {
    let ctx = context(Selection::new("nextjs").with_database("prisma").with_auth("next-auth"));

    let condition = Condition::new()
        .with("database", text("prisma"))
        .with("auth", text("next-auth"));
    assert!(condition.matches(&ctx));

    let condition = condition.with("framework", text("remix"));
    assert!(!condition.matches(&ctx));
}

#[test]
fn test_features_require_every_listed_feature() {
    let condition = Condition::new().with("features", any_of(&["docker", "testing"]));

    let both = context(Selection::new("nextjs").with_features(["docker", "testing", "eslint"]));
    assert!(condition.matches(&both));

    let one = context(Selection::new("nextjs").with_features(["docker"]));
    assert!(!condition.matches(&one));

    let single = Condition::new().with("features", text("docker"));
    assert!(single.matches(&one));
}

#[test]
fn test_boolean_values_test_truthiness() {
    let ctx = context(Selection::new("nextjs").with_database("prisma"));

    assert!(Condition::new().with("database", ConditionValue::Bool(true)).matches(&ctx));
    assert!(Condition::new().with("auth", ConditionValue::Bool(false)).matches(&ctx));
    assert!(!Condition::new().with("auth", ConditionValue::Bool(true)).matches(&ctx));
}

#[test]
fn test_missing_key_only_matches_false() {
    let ctx = context(Selection::new("nextjs"));

    assert!(!Condition::new().with("orm", text("prisma")).matches(&ctx));
    assert!(!Condition::new().with("orm", any_of(&["prisma"])).matches(&ctx));
    assert!(Condition::new().with("orm", ConditionValue::Bool(false)).matches(&ctx));
}

#[test]
fn test_deserialize_from_descriptor() {
    let condition: Condition =
        serde_json::from_str(r#"{"database": ["prisma", "drizzle"], "features": ["docker"], "auth": false}"#)
            .unwrap();

    let ctx = context(Selection::new("nextjs").with_database("drizzle").with_features(["docker"]));
    assert!(condition.matches(&ctx));

    let ctx = context(Selection::new("nextjs").with_database("drizzle"));
    assert!(!condition.matches(&ctx));
}

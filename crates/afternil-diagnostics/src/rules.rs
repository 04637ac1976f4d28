//! Rule catalog.
//!
//! Single source of truth for rule metadata shown by `afternil explain` and
//! attached to diagnostics.

use serde::Serialize;

/// Information about a single analysis rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleInfo {
    pub code: String,
    pub name: String,
    pub description: String,
    pub severity: String,
    /// Example Go code that triggers this rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_bad: Option<String>,
    /// Example Go code that does not trigger this rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_good: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_idiom: Option<String>,
}

/// Code of the reference-after-nil-check rule.
pub const REF001: &str = "REF001";

/// Look up a single rule by code. Codes are matched case-insensitively.
pub fn get_rule(code: &str) -> Option<RuleInfo> {
    get_all_rules()
        .into_iter()
        .find(|r| r.code.eq_ignore_ascii_case(code))
}

/// Return all available analysis rules.
pub fn get_all_rules() -> Vec<RuleInfo> {
    vec![RuleInfo {
        code: REF001.into(),
        name: "Reference after nil check".into(),
        description: "A variable is read after a guard `if v != nil { ... return }`. \
            Past the guard the variable is always nil, so the read almost certainly \
            meant to use a different variable or the check is inverted."
            .into(),
        severity: "error".into(),
        example_bad: Some(
            "if err != nil {\n    return err\n}\nreturn fmt.Errorf(\"load: %w\", err) // err is nil"
                .into(),
        ),
        example_good: Some(
            "if err != nil {\n    return fmt.Errorf(\"load: %w\", err)\n}\nreturn nil".into(),
        ),
        go_idiom: Some(
            "Past `if err != nil { return }` write `nil` explicitly, or check the variable you meant"
                .into(),
        ),
    }]
}

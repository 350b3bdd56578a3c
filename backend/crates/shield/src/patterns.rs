//! Pattern Guards
//!
//! Two fixed rule sets, declared as `(label, pattern)` tables and compiled
//! once. Every pattern is case-insensitive. A single match classifies the
//! input; the label of the first matching rule is reported.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Markup / script injection. Strings matching any of these are blanked by
/// the sanitizer.
pub const XSS_RULES: &[(&str, &str)] = &[
    ("script-tag", r"<script\b"),
    ("javascript-uri", r"javascript:"),
    ("inline-handler", r"on\w+\s*="),
    ("data-uri", r"data:"),
    ("vbscript-uri", r"vbscript:"),
    ("css-expression", r"expression\s*\("),
    ("css-url", r"url\s*\("),
];

/// Template / code injection. A match rejects the request and penalizes the
/// client IP.
pub const RCE_RULES: &[(&str, &str)] = &[
    ("template-dollar", r"\$\{.*\}"),
    ("template-mustache", r"\{\{.*\}\}"),
    ("template-literal", r"`[^`]*\$\{[^`]*`"),
    ("eval", r"eval\s*\("),
    ("function-constructor", r"Function\s*\("),
    ("set-timeout", r"setTimeout\s*\([^,]*,"),
    ("set-interval", r"setInterval\s*\([^,]*,"),
    ("exec", r"exec\s*\("),
    ("spawn", r"spawn\s*\("),
    ("child-process", r"child_process"),
    ("require", r#"require\s*\(['"][^'"]+['"]\)"#),
    ("dynamic-import", r"import\s*\("),
    ("process-env", r"process\.env"),
    ("process-exit", r"process\.exit"),
    ("dirname", r"__dirname"),
    ("filename", r"__filename"),
    ("hex-escape", r"\\x[0-9a-f]{2}"),
    ("unicode-escape", r"\\u[0-9a-f]{4}"),
    ("constructor-call", r"\.constructor\s*\("),
    ("constructor-index", r#"\[\s*['"]constructor['"]\s*\]"#),
    ("proto", r"__proto__"),
];

/// A compiled rule table
#[derive(Debug)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<(&'static str, Regex)>,
}

impl RuleSet {
    /// Compile a table. Fails on the first invalid pattern.
    pub fn compile(
        name: &'static str,
        table: &[(&'static str, &'static str)],
    ) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|(label, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*label, re))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, rules })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Label of the first matching rule, if any
    pub fn classify(&self, surface: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(surface))
            .map(|(label, _)| *label)
    }

    pub fn is_match(&self, surface: &str) -> bool {
        self.classify(surface).is_some()
    }
}

static XSS: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile("xss", XSS_RULES).expect("built-in XSS rules compile"));

static RCE: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile("rce", RCE_RULES).expect("built-in RCE rules compile"));

pub fn xss() -> &'static RuleSet {
    &XSS
}

pub fn rce() -> &'static RuleSet {
    &RCE
}

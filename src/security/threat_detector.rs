//! Heuristic attack-pattern detection
//!
//! Four pattern families are scanned in a fixed order (SQL injection, XSS,
//! path traversal, command injection), case-insensitively; the first
//! pattern that matches decides the result. Each family is compiled into a
//! [`RegexSet`], so a scan is linear in the input length.
//!
//! The HTML entities produced by the generic sanitizer are decoded before
//! scanning. An escaped value is therefore judged by the text it stands
//! for, and the `;` that ends `&amp;` is not read as a statement or shell
//! separator.

use once_cell::sync::Lazy;
use regex::{RegexSet, RegexSetBuilder};
use unicode_normalization::UnicodeNormalization;

use crate::domain::value_objects::{ThreatCategory, ThreatMatch};
use crate::security::sanitizers::unescape_html;

/// Where a pattern applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Individual field values only
    Field,
    /// Fully substituted statement text only
    Statement,
    Both,
}

struct ThreatPattern {
    name: &'static str,
    source: &'static str,
    scope: Scope,
}

const fn p(name: &'static str, source: &'static str, scope: Scope) -> ThreatPattern {
    ThreatPattern {
        name,
        source,
        scope,
    }
}

const SQL_PATTERNS: &[ThreatPattern] = &[
    p(
        "sql_tautology",
        r"'\s*(or|and)\s+('[^']*'|\d+|\w+)\s*(=|<|>|like\b)",
        Scope::Both,
    ),
    p(
        "sql_boolean_tautology",
        r"\b(or|and)\s+(1\s*=\s*1|true)\b",
        Scope::Both,
    ),
    p(
        "sql_union_select",
        r"\bunion(\s+all|\s+distinct)?\s+select\b",
        Scope::Both,
    ),
    p(
        "sql_stacked_statement",
        r";\s*(select|insert|update|delete|drop|alter|create|truncate|exec|execute|declare|shutdown|grant|revoke|merge|replace)\b",
        Scope::Field,
    ),
    p("sql_statement_separator", r";\s*\S", Scope::Statement),
    p("sql_quote_comment", r"'\s*(--|#|/\*)", Scope::Field),
    p("sql_line_comment", r"--", Scope::Statement),
    p("sql_block_comment", r"/\*", Scope::Both),
    p(
        "sql_ddl",
        r"\b(drop|truncate|alter)\s+(table|database|schema|index|view|user)\b",
        Scope::Both,
    ),
    p(
        "sql_dml",
        r"\binsert\s+into\b|\bdelete\s+from\b|\bupdate\s+\w+\s+set\b",
        Scope::Field,
    ),
    p(
        "sql_exec",
        r"\b(exec|execute)\s*(\(|\s+(xp_|sp_))|\bxp_cmdshell\b",
        Scope::Both,
    ),
    p(
        "sql_time_based",
        r"\b(sleep|benchmark|pg_sleep)\s*\(|\bwaitfor\s+delay\b",
        Scope::Both,
    ),
    p(
        "sql_system_catalog",
        r"\b(information_schema|pg_catalog|sysobjects|syscolumns|mysql\.user)\b",
        Scope::Both,
    ),
    p("sql_char_encoding", r"\b(char|nchar)\s*\(\s*\d+", Scope::Field),
];

const XSS_PATTERNS: &[ThreatPattern] = &[
    p("script_tag", r"<\s*/?\s*script\b", Scope::Both),
    p("script_uri", r"\b(java|vb)script\s*:", Scope::Both),
    p("data_uri_html", r"\bdata\s*:\s*text/html", Scope::Both),
    p(
        "event_handler",
        r"\bon(abort|blur|change|click|dblclick|error|focus|input|keydown|keypress|keyup|load|mousedown|mousemove|mouseout|mouseover|mouseup|reset|resize|scroll|select|submit|unload|toggle|animationstart|pointerover|beforeunload|hashchange|message)\s*=",
        Scope::Both,
    ),
    p(
        "dangerous_tag",
        r"<\s*(iframe|frame|frameset|object|embed|applet|meta|link|style|base|form|svg|img|math|video|audio|body)\b",
        Scope::Both,
    ),
    p(
        "script_eval",
        r"\b(eval|expression|settimeout|setinterval)\s*\(",
        Scope::Both,
    ),
    p(
        "dom_access",
        r"\bdocument\s*\.\s*(cookie|write|location|domain)\b|\bwindow\s*\.\s*location\b",
        Scope::Both,
    ),
    p(
        "encoded_script",
        r"(&lt;|&#0*60;?|&#x0*3c;?|%3c|\\x3c|\\u003c)\s*/?\s*script",
        Scope::Both,
    ),
];

const TRAVERSAL_PATTERNS: &[ThreatPattern] = &[
    p("dot_dot_slash", r"\.\.[/\\]", Scope::Both),
    p("slash_dot_dot", r"[/\\]\.\.([/\\]|$)", Scope::Both),
    p(
        "encoded_traversal",
        r"(%2e|%252e|%c0%ae|\.)(%2e|%252e|%c0%ae|\.)(%2f|%5c|%252f|%255c|%c0%af|%c1%9c|/|\\)",
        Scope::Both,
    ),
    p(
        "sensitive_path",
        r"/etc/(passwd|shadow|hosts|group|sudoers)\b|/proc/self\b|\b[a-z]:\\windows\\|\\windows\\system32\b|\bboot\.ini\b",
        Scope::Both,
    ),
    p("encoded_null_byte", r"%00", Scope::Both),
];

const COMMAND_PATTERNS: &[ThreatPattern] = &[
    p(
        "shell_chain",
        r"(;|&&|\|\|?)\s*(rm|cat|ls|wget|curl|nc|ncat|netcat|bash|sh|zsh|ksh|csh|chmod|chown|kill|pkill|python[0-9.]*|perl|php|ruby|node|powershell|pwsh|cmd|whoami|id|uname|ps|mkfifo|telnet|ping|nslookup|shutdown|reboot|sudo|su|echo|touch|mv|cp|dd|nohup|sleep|base64)(\s|$)",
        Scope::Field,
    ),
    p("command_substitution_backtick", r"`[^`]*`", Scope::Field),
    p("command_substitution", r"\$\([^)]*\)|\$\{[^}]*\}", Scope::Both),
    p(
        "shell_binary_path",
        r"(/usr/local/bin/|/usr/bin/|/bin/)(ba|z|k|c|da)?sh\b|\bcmd(\.exe)?\s+/c\b|\bpowershell(\.exe)?\s+-",
        Scope::Both,
    ),
    p(
        "destructive_command",
        r"\brm\s+-[a-z]*[rf]|\bnc\s+-[a-z]*e\b|\bwget\s+https?://|\bcurl\s+(-[a-z]+\s+)*https?://",
        Scope::Both,
    ),
    p("redirection", r"[<>]\s*/(dev|etc|tmp|bin)/", Scope::Field),
];

/// One compiled family, split by scope
struct PatternFamily {
    category: ThreatCategory,
    field_names: Vec<&'static str>,
    field_set: RegexSet,
    statement_names: Vec<&'static str>,
    statement_set: RegexSet,
}

impl PatternFamily {
    fn compile(category: ThreatCategory, patterns: &[ThreatPattern]) -> Self {
        let build = |scope: Scope| {
            let selected: Vec<&ThreatPattern> = patterns
                .iter()
                .filter(|pattern| pattern.scope == scope || pattern.scope == Scope::Both)
                .collect();

            let set = RegexSetBuilder::new(selected.iter().map(|pattern| pattern.source))
                .case_insensitive(true)
                .build()
                .expect("Invalid built-in threat pattern");
            let names: Vec<&'static str> = selected.iter().map(|pattern| pattern.name).collect();
            (names, set)
        };

        let (field_names, field_set) = build(Scope::Field);
        let (statement_names, statement_set) = build(Scope::Statement);

        Self {
            category,
            field_names,
            field_set,
            statement_names,
            statement_set,
        }
    }

    fn first_match(&self, input: &str, scope: Scope) -> Option<&'static str> {
        let (names, set) = match scope {
            Scope::Statement => (&self.statement_names, &self.statement_set),
            _ => (&self.field_names, &self.field_set),
        };
        // SetMatches iterates in pattern order, so the lowest index wins
        set.matches(input).iter().next().map(|index| names[index])
    }
}

/// Stateless threat classifier
pub struct ThreatDetector {
    families: Vec<PatternFamily>,
}

static DETECTOR: Lazy<ThreatDetector> = Lazy::new(ThreatDetector::new);

impl ThreatDetector {
    pub fn new() -> Self {
        let families = vec![
            PatternFamily::compile(ThreatCategory::SqlInjection, SQL_PATTERNS),
            PatternFamily::compile(ThreatCategory::Xss, XSS_PATTERNS),
            PatternFamily::compile(ThreatCategory::PathTraversal, TRAVERSAL_PATTERNS),
            PatternFamily::compile(ThreatCategory::CommandInjection, COMMAND_PATTERNS),
        ];
        Self { families }
    }

    /// Shared, lazily compiled instance
    pub fn global() -> &'static ThreatDetector {
        &DETECTOR
    }

    /// Classify a single field value.
    ///
    /// Callers bound the input size before calling this; the detector itself
    /// scans whatever it is given.
    pub fn detect(&self, raw: &str) -> Option<ThreatMatch> {
        self.scan(raw, Scope::Field)
    }

    /// Re-scan a fully substituted statement. Statement verbs such as
    /// `DELETE FROM` are expected here, while statement separators and
    /// comments are not.
    pub fn scan_statement(&self, sql: &str) -> Option<ThreatMatch> {
        self.scan(sql, Scope::Statement)
    }

    fn scan(&self, input: &str, scope: Scope) -> Option<ThreatMatch> {
        let input = unescape_html(input);
        let input = input.as_ref();

        if let Some(found) = self.scan_once(input, scope) {
            return Some(found);
        }

        // Compatibility forms (full-width brackets, ligatures) can hide a
        // payload from the ASCII patterns above
        if !input.is_ascii() {
            let folded: String = input.nfkc().collect();
            if folded != input {
                return self.scan_once(&folded, scope);
            }
        }

        None
    }

    fn scan_once(&self, input: &str, scope: Scope) -> Option<ThreatMatch> {
        self.families.iter().find_map(|family| {
            family
                .first_match(input, scope)
                .map(|name| ThreatMatch::new(family.category, name))
        })
    }
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

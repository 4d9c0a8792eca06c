use crate::report::kind::ReportKind;
use crate::report::templates::Template;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

// `:` `!` `.` `[` would start a spec or lookup
static FIELD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:!.\[]+$").expect("valid field name regex"));

/// Final prompt handed to a generation provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Name -> value bindings for placeholder substitution
pub type RenderingContext = HashMap<String, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("Single '{{' encountered at byte {0}")]
    UnclosedBrace(usize),

    #[error("Single '}}' encountered at byte {0}")]
    StrayClosingBrace(usize),

    #[error("Positional placeholder '{{{0}}}' has no argument")]
    Positional(String),

    #[error("Unsupported placeholder '{{{0}}}'")]
    UnsupportedField(String),
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

/// Split a `{name}` pattern into literal text and placeholders
///
/// `{{` and `}}` are literal braces. Any other field text is a keyword name,
/// so `{report-period}` or `{ name }` are fine. Positional `{}`/`{0}`, format
/// specs, conversions, attribute access and indexing are rejected.
fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, PatternError> {
    let mut segments = Vec::new();
    let bytes = pattern.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                segments.push(Segment::Literal(&pattern[literal_start..i]));
                segments.push(Segment::Brace(bytes[i] as char));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = pattern[i + 1..]
                    .find(|c| c == '{' || c == '}')
                    .map(|offset| i + 1 + offset)
                    .filter(|&end| bytes[end] == b'}')
                    .ok_or(PatternError::UnclosedBrace(i))?;
                let name = &pattern[i + 1..close];
                if name.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PatternError::Positional(name.to_string()));
                }
                if !FIELD_NAME.is_match(name) {
                    return Err(PatternError::UnsupportedField(name.to_string()));
                }
                segments.push(Segment::Literal(&pattern[literal_start..i]));
                segments.push(Segment::Placeholder(name));
                i = close + 1;
                literal_start = i;
            }
            b'}' => return Err(PatternError::StrayClosingBrace(i)),
            _ => i += 1,
        }
    }
    segments.push(Segment::Literal(&pattern[literal_start..]));

    Ok(segments)
}

/// Placeholder names in order of first appearance
pub fn placeholder_names(pattern: &str) -> Result<Vec<String>, PatternError> {
    let mut names: Vec<String> = Vec::new();
    for segment in parse_pattern(pattern)? {
        if let Segment::Placeholder(name) = segment {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Substitute bound values; unbound placeholders become empty strings
pub fn substitute(pattern: &str, context: &RenderingContext) -> Result<String, PatternError> {
    let mut out = String::with_capacity(pattern.len());
    for segment in parse_pattern(pattern)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Brace(ch) => out.push(ch),
            Segment::Placeholder(name) => {
                if let Some(value) = context.get(name) {
                    out.push_str(value);
                }
            }
        }
    }
    Ok(out)
}

/// Resolve the variables for a template
///
/// Priority, lowest first: declared defaults, timeframe, extra variables.
/// Audience role and data digest are always bound.
pub fn build_context(
    template: &Template,
    audience_role: &str,
    data_text: &str,
    timeframe: Option<&str>,
    extra_vars: Option<&RenderingContext>,
) -> RenderingContext {
    let mut context = RenderingContext::new();
    context.insert("audience_role".to_string(), audience_role.to_string());

    let names = placeholder_names(template.user_prompt_pattern()).unwrap_or_default();
    for kind in ReportKind::ALL {
        if names.iter().any(|name| name == kind.data_key()) {
            context.insert(kind.data_key().to_string(), data_text.to_string());
        }
    }

    if let Some(timeframe) = timeframe.filter(|t| !t.is_empty()) {
        context.insert("timeframe".to_string(), timeframe.to_string());
    }

    if let Some(extra) = extra_vars {
        context.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    for (name, spec) in &template.variables {
        if context.contains_key(name) {
            continue;
        }
        if let Some(default) = spec.default_text() {
            context.insert(name.clone(), default);
        }
    }

    context
}

/// Render a template into a prompt pair
///
/// Never fails: a malformed user pattern is returned unrendered.
pub fn render(
    template: &Template,
    audience_role: &str,
    data_text: &str,
    timeframe: Option<&str>,
    extra_vars: Option<&RenderingContext>,
) -> PromptPair {
    let context = build_context(template, audience_role, data_text, timeframe, extra_vars);
    let pattern = template.user_prompt_pattern();

    let user = match substitute(pattern, &context) {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!("Template '{}' could not be rendered: {}", template.name, e);
            pattern.to_string()
        }
    };

    PromptPair {
        system: template.system_prompt().to_string(),
        user,
    }
}

//! Edit abstraction and per-category fix strategies
//!
//! A fix is a list of tagged [`Edit`]s computed from the finding and the
//! current file content. Keeping edits as data leaves the executor's
//! snapshot/apply/validate logic independent of how a fix is computed, and
//! new strategies slot in per finding category.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Finding, FindingCategory};

/// One textual change to a file. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    DeleteLine { line: u32 },
    ReplaceLine { line: u32, content: String },
    InsertLine { line: u32, content: String },
    DeleteImportMember { line: u32, member: String },
}

impl Edit {
    fn line(&self) -> u32 {
        match self {
            Edit::DeleteLine { line }
            | Edit::ReplaceLine { line, .. }
            | Edit::InsertLine { line, .. }
            | Edit::DeleteImportMember { line, .. } => *line,
        }
    }
}

/// Apply edits to `content`, bottom-up so earlier edits never shift the
/// line numbers of later ones. An edit referencing a line outside the file
/// is an error: the finding and the file have diverged.
pub fn apply_edits(content: &str, edits: &[Edit]) -> anyhow::Result<String> {
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    let trailing_newline = content.ends_with('\n');

    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.line().cmp(&a.line()));

    for edit in ordered {
        let idx = edit.line() as usize;
        if idx == 0 || idx > lines.len() {
            anyhow::bail!(
                "edit targets line {} but file has {} lines",
                edit.line(),
                lines.len()
            );
        }
        match edit {
            Edit::DeleteLine { .. } => {
                lines.remove(idx - 1);
            }
            Edit::ReplaceLine { content, .. } => {
                lines[idx - 1] = content.clone();
            }
            Edit::InsertLine { content, .. } => {
                lines.insert(idx - 1, content.clone());
            }
            Edit::DeleteImportMember { member, .. } => {
                match remove_import_member(&lines[idx - 1], member) {
                    Some(new_line) => lines[idx - 1] = new_line,
                    None => {
                        lines.remove(idx - 1);
                    }
                }
            }
        }
    }

    let mut result = lines.join("\n");
    if trailing_newline && !result.is_empty() {
        result.push('\n');
    }
    Ok(result)
}

/// Remove one named member from an import list. Returns the rewritten line,
/// or `None` when the member was the only import and the line should go.
fn remove_import_member(line: &str, member: &str) -> Option<String> {
    let (open, close) = (line.find('{')?, line.find('}')?);
    if close <= open {
        return None;
    }
    let members: Vec<&str> = line[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();

    let kept: Vec<&str> = members
        .iter()
        .copied()
        // Handles both `name` and `name as alias`
        .filter(|m| *m != member && m.split_whitespace().next() != Some(member))
        .collect();

    if kept.is_empty() {
        return None;
    }
    if kept.len() == members.len() {
        // Member not found; leave the line untouched rather than guessing
        return Some(line.to_string());
    }
    Some(format!(
        "{}{{ {} }}{}",
        &line[..open],
        kept.join(", "),
        &line[close + 1..]
    ))
}

fn await_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bawait\s+").expect("valid regex"))
}

/// Matches a bare callback reference handed to a timer, capturing the timer
/// name, the callback identifier, and the delimiter that follows it.
fn timer_callback_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(setInterval|setTimeout)\(\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*(,|\))")
            .expect("valid regex")
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Find the first occurrence of `ident` that stands alone as an identifier.
/// Plain substring search would also hit occurrences inside longer names
/// (`x` inside `exports`).
fn find_identifier(line: &str, ident: &str) -> Option<usize> {
    for (pos, _) in line.match_indices(ident) {
        let before_ok = line[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c));
        let after_ok = line[pos + ident.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        if before_ok && after_ok {
            return Some(pos);
        }
    }
    None
}

/// Compute the edits for one finding, per its category.
///
/// Returns an empty list when no safe automatic rewrite exists; such
/// findings stay in the report but nothing is applied for them.
pub fn plan_edits(finding: &Finding, content: &str) -> Vec<Edit> {
    let Some(line_text) = content.lines().nth(finding.line as usize - 1) else {
        return Vec::new();
    };

    match finding.category {
        FindingCategory::UnusedImport => {
            if finding.subject_name.is_empty() {
                return Vec::new();
            }
            vec![Edit::DeleteImportMember {
                line: finding.line,
                member: finding.subject_name.clone(),
            }]
        }
        FindingCategory::UnusedVariable => plan_unused_variable(finding, line_text),
        FindingCategory::TypeSafety => plan_type_safety(finding, line_text),
        // Formatting and uncategorized findings have no automatic rewrite
        FindingCategory::Formatting | FindingCategory::Other => Vec::new(),
    }
}

fn plan_unused_variable(finding: &Finding, line_text: &str) -> Vec<Edit> {
    let subject = &finding.subject_name;
    if subject.is_empty() {
        return Vec::new();
    }
    let Some(pos) = find_identifier(line_text, subject) else {
        return Vec::new();
    };

    let trimmed = line_text.trim();
    let is_pure_declaration = (trimmed.starts_with("const ")
        || trimmed.starts_with("let ")
        || trimmed.starts_with("var "))
        && trimmed.ends_with(';')
        && !trimmed.contains('{')
        && !trimmed.contains('[')
        && !trimmed.contains("=>");

    if is_pure_declaration {
        vec![Edit::DeleteLine { line: finding.line }]
    } else {
        // Not safe to delete (parameter, loop binding, expression with
        // side effects): mark intentionally unused instead.
        let renamed = format!("{}_{}", &line_text[..pos], &line_text[pos..]);
        vec![Edit::ReplaceLine {
            line: finding.line,
            content: renamed,
        }]
    }
}

fn plan_type_safety(finding: &Finding, line_text: &str) -> Vec<Edit> {
    let rule = finding.rule_id.as_str();

    if rule.contains("await-thenable") {
        // Drop the redundant await of a non-Promise value
        if !line_text.contains("await ") {
            return Vec::new();
        }
        let rewritten = await_regex().replacen(line_text, 1, "").to_string();
        return vec![Edit::ReplaceLine {
            line: finding.line,
            content: rewritten,
        }];
    }

    if rule.contains("no-floating-promises") {
        // Discard the promise explicitly with the void operator
        if line_text.contains("void ") {
            return Vec::new();
        }
        let indent: String = line_text.chars().take_while(|c| c.is_whitespace()).collect();
        let rewritten = format!("{}void {}", indent, line_text.trim_start());
        return vec![Edit::ReplaceLine {
            line: finding.line,
            content: rewritten,
        }];
    }

    if rule.contains("no-misused-promises") {
        // An async callback handed straight to a timer returns a promise
        // nothing awaits; wrap it so the promise is explicitly discarded.
        if line_text.contains("() => void") || !timer_callback_regex().is_match(line_text) {
            return Vec::new();
        }
        let rewritten = timer_callback_regex()
            .replacen(line_text, 1, "${1}(() => void ${2}()${3}")
            .to_string();
        return vec![Edit::ReplaceLine {
            line: finding.line,
            content: rewritten,
        }];
    }

    // Other type-safety rules (no-explicit-any, no-unsafe-*) need a human
    Vec::new()
}

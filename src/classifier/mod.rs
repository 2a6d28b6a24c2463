//! Preservation Classifier
//!
//! Labels each finding preserve/eliminate/review by walking one ordered
//! table of domain pattern groups. Consolidating the vocabulary here keeps
//! a single authoritative pattern source instead of lists drifting across
//! scripts.
//!
//! `classify` is a pure function of (subject name, file path, file content)
//! plus the static table and any configured extras: identical inputs always
//! yield identical output, so batches are reproducible.

use std::path::Path;

use crate::config::PreserveConfig;
use crate::models::{ClassificationResult, Domain, Finding};

/// One domain vocabulary group. Patterns are case-insensitive substrings
/// checked against the subject name and the file path separately, because
/// a name match is more specific than a path match.
struct DomainPatternGroup {
    domain: Domain,
    name_patterns: &'static [&'static str],
    path_patterns: &'static [&'static str],
}

/// Confidence policy: exact-name match > name substring > path-only match.
const CONFIDENCE_EXACT_NAME: f64 = 0.95;
const CONFIDENCE_NAME: f64 = 0.9;
const CONFIDENCE_PATH: f64 = 0.7;
const CONFIDENCE_UNDERSCORE: f64 = 0.95;
const CONFIDENCE_REVIEW: f64 = 0.5;
const CONFIDENCE_DEFAULT: f64 = 0.3;

/// Ordered domain vocabulary. First matching group wins.
const DOMAIN_PATTERNS: &[DomainPatternGroup] = &[
    DomainPatternGroup {
        domain: Domain::Astrological,
        name_patterns: &[
            "planet",
            "planetary",
            "lunar",
            "zodiac",
            "transit",
            "celestial",
            "ephemeris",
            "astro",
            "natal",
            "retrograde",
            "elemental",
            "alchem",
            "horoscope",
            "solstice",
            "equinox",
        ],
        path_patterns: &["astrolog", "celestial", "ephemeris", "planetary", "alchem"],
    },
    DomainPatternGroup {
        domain: Domain::Campaign,
        name_patterns: &[
            "campaign",
            "telemetry",
            "tracking",
            "analytic",
            "workflow",
            "experiment",
            "funnel",
            "cohort",
            "segment",
        ],
        path_patterns: &["campaign", "telemetry", "analytics", "workflow"],
    },
    DomainPatternGroup {
        domain: Domain::Culinary,
        name_patterns: &[
            "ingredient",
            "recipe",
            "cuisine",
            "nutrient",
            "nutrition",
            "flavor",
            "culinary",
            "kitchen",
            "cooking",
            "dish",
            "meal",
            "seasoning",
        ],
        path_patterns: &["ingredient", "recipe", "culinary", "kitchen", "nutrition"],
    },
    DomainPatternGroup {
        domain: Domain::Test,
        name_patterns: &["mock", "stub", "fixture", "harness", "testdata", "spy"],
        path_patterns: &["__tests__", "__mocks__", ".test.", ".spec.", "/tests/", "/test/"],
    },
    DomainPatternGroup {
        domain: Domain::Service,
        name_patterns: &[
            "apiclient",
            "endpoint",
            "request",
            "response",
            "handler",
            "middleware",
            "controller",
            "webhook",
            "session",
        ],
        path_patterns: &["/services/", "/api/", "/server/", "/backend/"],
    },
];

/// Classify one finding.
///
/// Decision order:
/// 1. First domain group matching the subject name or file path preserves.
/// 2. Configured extra patterns preserve (generic domain).
/// 3. A conventional `_` prefix marks the binding intentionally unused:
///    eliminate with high confidence.
/// 4. Simple SCREAMING_CASE constants and destructuring remnants are
///    ambiguous: review-required, excluded from batches.
/// 5. Everything else: eliminate with low confidence.
pub fn classify(
    finding: &Finding,
    file_content: &str,
    preserve: &PreserveConfig,
) -> ClassificationResult {
    let subject = finding.subject_name.to_lowercase();
    let path = finding.file_path.to_string_lossy().to_lowercase();

    for group in DOMAIN_PATTERNS {
        if let Some(result) = match_group(finding, group, &subject, &path) {
            return result;
        }
    }

    // Project-specific additions from lintsweep.toml
    for pattern in &preserve.extra_patterns {
        let pat = pattern.to_lowercase();
        if !pat.is_empty() && (subject.contains(&pat) || path.contains(&pat)) {
            return ClassificationResult {
                finding_id: finding.id.clone(),
                should_preserve: true,
                domain: Domain::Generic,
                confidence: if subject.contains(&pat) {
                    CONFIDENCE_NAME
                } else {
                    CONFIDENCE_PATH
                },
                reason: format!("matches configured preservation pattern '{}'", pattern),
                matched_pattern: Some(pattern.clone()),
                review_required: false,
            };
        }
    }

    if finding.subject_name.starts_with('_') {
        return ClassificationResult {
            finding_id: finding.id.clone(),
            should_preserve: false,
            domain: Domain::Generic,
            confidence: CONFIDENCE_UNDERSCORE,
            reason: "underscore prefix marks the binding intentionally unused".into(),
            matched_pattern: None,
            review_required: false,
        };
    }

    if is_simple_constant(&finding.subject_name) {
        return ClassificationResult {
            finding_id: finding.id.clone(),
            should_preserve: false,
            domain: Domain::Generic,
            confidence: CONFIDENCE_REVIEW,
            reason: "ambiguous module-level constant; manual review required".into(),
            matched_pattern: None,
            review_required: true,
        };
    }

    if is_destructuring_remnant(finding, file_content) {
        return ClassificationResult {
            finding_id: finding.id.clone(),
            should_preserve: false,
            domain: Domain::Generic,
            confidence: CONFIDENCE_REVIEW,
            reason: "unused binding inside a destructuring pattern; removal would \
                     reshape the pattern"
                .into(),
            matched_pattern: None,
            review_required: true,
        };
    }

    ClassificationResult {
        finding_id: finding.id.clone(),
        should_preserve: false,
        domain: Domain::Generic,
        confidence: CONFIDENCE_DEFAULT,
        reason: "no preservation pattern matched".into(),
        matched_pattern: None,
        review_required: false,
    }
}

fn match_group(
    finding: &Finding,
    group: &DomainPatternGroup,
    subject: &str,
    path: &str,
) -> Option<ClassificationResult> {
    for pattern in group.name_patterns {
        if !subject.is_empty() && subject.contains(pattern) {
            let confidence = if subject == *pattern {
                CONFIDENCE_EXACT_NAME
            } else {
                CONFIDENCE_NAME
            };
            return Some(ClassificationResult {
                finding_id: finding.id.clone(),
                should_preserve: true,
                domain: group.domain,
                confidence,
                reason: format!("subject name matches {} vocabulary", group.domain),
                matched_pattern: Some((*pattern).to_string()),
                review_required: false,
            });
        }
    }
    for pattern in group.path_patterns {
        if path.contains(pattern) {
            return Some(ClassificationResult {
                finding_id: finding.id.clone(),
                should_preserve: true,
                domain: group.domain,
                confidence: CONFIDENCE_PATH,
                reason: format!("file path matches {} vocabulary", group.domain),
                matched_pattern: Some((*pattern).to_string()),
                review_required: false,
            });
        }
    }
    None
}

/// SCREAMING_SNAKE_CASE names are usually shared constants whose consumers
/// the analyzer cannot always see (string-keyed lookups, re-exports).
fn is_simple_constant(subject: &str) -> bool {
    !subject.is_empty()
        && subject.len() >= 2
        && subject
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && subject.chars().any(|c| c.is_ascii_uppercase())
}

/// Whether the finding's line declares the subject inside a destructuring
/// pattern with sibling bindings. Deleting one member reshapes positional
/// patterns, so these go to review instead.
fn is_destructuring_remnant(finding: &Finding, file_content: &str) -> bool {
    if finding.subject_name.is_empty() || finding.line == 0 {
        return false;
    }
    let Some(line) = file_content.lines().nth(finding.line as usize - 1) else {
        return false;
    };
    if !line.contains(&finding.subject_name) {
        return false;
    }
    let trimmed = line.trim_start();
    let is_pattern = (trimmed.starts_with("const ")
        || trimmed.starts_with("let ")
        || trimmed.starts_with("var "))
        && line.contains('=')
        && (line.contains('{') || line.contains('['));
    is_pattern && line.contains(',')
}

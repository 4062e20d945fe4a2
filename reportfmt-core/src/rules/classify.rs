//! Shared semantic classification.
//!
//! Both rule engines and the validator classify through these functions —
//! a paragraph or column means the same thing on the formatting side and
//! the checking side. Classification is pure text → tag: deterministic,
//! no document state.

use crate::types::{ColumnRole, Section};
use regex::Regex;
use std::sync::LazyLock;

// Pre-compiled section patterns
static TITLE_WITH_FORMERLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)(\(formerly)(.*?)(\))$").unwrap());

static FORMERLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\(formerly\b").unwrap());

static FORMERLY_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(formerly\b[^)]*\)?").unwrap());

static STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)financial statements").unwrap());

static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec|q[1-4])\b.*?\b(19|20)\d{2}\b",
    )
    .unwrap()
});

static UNAUDITED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunaudited\b|\bexpressed in\b").unwrap());

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec|q[1-4])\b",
    )
    .unwrap()
});

// Column-role header literals
static CURRENT_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)current\s+period").unwrap());

static PRIOR_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(prior|previous)\s+period").unwrap());

/// Classify one cover paragraph by its text.
///
/// Checks run in the fixed priority order Title > FormerlyName >
/// FinancialStatementType > Period > UnauditedNotice; the first matching
/// pattern wins. Empty text is Blank, unmatched text is Other.
pub fn classify_section(text: &str) -> Section {
    let t = text.trim();
    if t.is_empty() {
        return Section::Blank;
    }
    if is_title(t) {
        return Section::Title;
    }
    if FORMERLY_RE.is_match(t) {
        return Section::FormerlyName;
    }
    if STATEMENT_RE.is_match(t) {
        return Section::FinancialStatementType;
    }
    if PERIOD_RE.is_match(t) {
        return Section::Period;
    }
    if UNAUDITED_RE.is_match(t) {
        return Section::UnauditedNotice;
    }
    Section::Other
}

fn is_title(t: &str) -> bool {
    // "NAME (formerly Old Name)" — a formerly tail with a non-empty name
    // in front is the title line; a bare "(formerly …)" line is not.
    if let Some(caps) = TITLE_WITH_FORMERLY_RE.captures(t) {
        return !caps[1].trim().is_empty();
    }
    // Bare company-name line: upper-case lettering and none of the
    // keywords that mark the lower-priority sections.
    is_caps_name(t)
        && !STATEMENT_RE.is_match(t)
        && !PERIOD_RE.is_match(t)
        && !UNAUDITED_RE.is_match(t)
}

fn is_caps_name(t: &str) -> bool {
    let has_lower = t.chars().any(|c| c.is_lowercase());
    let upper_count = t.chars().filter(|c| c.is_uppercase()).count();
    let allowed = t
        .chars()
        .all(|c| c.is_alphanumeric() || " .,&'()-/".contains(c));
    !has_lower && upper_count >= 3 && allowed
}

/// The four spans of a "NAME (formerly Old Name)" title, for per-run
/// treatment of the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts<'a> {
    pub name: &'a str,
    pub formerly: &'a str,
    pub old_name: &'a str,
    pub close: &'a str,
}

pub fn title_parts(text: &str) -> Option<TitleParts<'_>> {
    let caps = TITLE_WITH_FORMERLY_RE.captures(text)?;
    Some(TitleParts {
        name: caps.get(1).unwrap().as_str(),
        formerly: caps.get(2).unwrap().as_str(),
        old_name: caps.get(3).unwrap().as_str(),
        close: caps.get(4).unwrap().as_str(),
    })
}

/// Byte range of a "(formerly …)" span inside a line, if present.
pub fn formerly_span(text: &str) -> Option<(usize, usize)> {
    FORMERLY_SPAN_RE.find(text).map(|m| (m.start(), m.end()))
}

/// Comparable (year, month) key of a dated header. Quarter markers map to
/// their closing month so "Q3 2025" sorts with "Sep 2025".
pub fn period_key(text: &str) -> Option<(i32, u32)> {
    let year: i32 = YEAR_RE.find(text)?.as_str().parse().ok()?;
    let month = MONTH_RE
        .find(text)
        .and_then(|m| month_number(m.as_str()))
        .unwrap_or(0);
    Some((year, month))
}

fn month_number(token: &str) -> Option<u32> {
    let t = token.to_lowercase();
    let n = match t.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        "q1" => 3,
        "q2" => 6,
        "q3" => 9,
        "q4" => 12,
        _ => return None,
    };
    Some(n)
}

/// Fallback column order fixed by the style guide, used for headers no
/// pattern can place. Known limitation: a table whose header text deviates
/// AND whose columns are shuffled will be formatted positionally.
const POSITIONAL_ROLES: [ColumnRole; 4] = [
    ColumnRole::Description,
    ColumnRole::Other,
    ColumnRole::CurrentPeriod,
    ColumnRole::PriorPeriod,
];

/// Assign a role to every column from the header-row texts.
///
/// Column 0 is always Description. Explicit "current period" / "prior
/// period" literals win; otherwise dated headers are ranked so the latest
/// (year, month) becomes CurrentPeriod and the runner-up PriorPeriod, ties
/// resolved toward the lower column index. Headers matching nothing fall
/// back to the positional order.
pub fn assign_column_roles(headers: &[String]) -> Vec<ColumnRole> {
    let n = headers.len();
    if n == 0 {
        return Vec::new();
    }

    let mut roles: Vec<Option<ColumnRole>> = vec![None; n];
    roles[0] = Some(ColumnRole::Description);

    for (i, header) in headers.iter().enumerate().skip(1) {
        if CURRENT_LITERAL_RE.is_match(header) {
            roles[i] = Some(ColumnRole::CurrentPeriod);
        } else if PRIOR_LITERAL_RE.is_match(header) {
            roles[i] = Some(ColumnRole::PriorPeriod);
        }
    }

    // Rank dated headers, latest first.
    let mut dated: Vec<(usize, (i32, u32))> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, _)| roles[*i].is_none())
        .filter_map(|(i, h)| period_key(h).map(|key| (i, key)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut dated = dated.into_iter();
    if !roles.contains(&Some(ColumnRole::CurrentPeriod)) {
        if let Some((i, _)) = dated.next() {
            roles[i] = Some(ColumnRole::CurrentPeriod);
        }
    }
    if !roles.contains(&Some(ColumnRole::PriorPeriod)) {
        if let Some((i, _)) = dated.next() {
            roles[i] = Some(ColumnRole::PriorPeriod);
        }
    }
    for (i, _) in dated {
        roles[i] = Some(ColumnRole::Other);
    }

    for i in 1..n {
        if roles[i].is_none() {
            let fallback = POSITIONAL_ROLES.get(i).copied().unwrap_or(ColumnRole::Other);
            roles[i] = Some(match fallback {
                ColumnRole::CurrentPeriod
                    if roles.contains(&Some(ColumnRole::CurrentPeriod)) =>
                {
                    ColumnRole::Other
                }
                ColumnRole::PriorPeriod if roles.contains(&Some(ColumnRole::PriorPeriod)) => {
                    ColumnRole::Other
                }
                role => role,
            });
        }
    }

    roles.into_iter().map(|r| r.expect("every column assigned")).collect()
}

// ===== CASE TRANSFORMS =====
// The engines rewrite text through these and the validator checks with the
// same functions, so "correctly cased" means one thing.

/// Capitalize Each Word, lowercasing the rest of it.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

pub fn is_title_case(text: &str) -> bool {
    text == title_case(text)
}

/// Sentence case: first letter upper, every later letter lower, everything
/// else untouched. Works through a leading "(" the way the notice lines
/// are written.
pub fn sentence_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut seen_first = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if seen_first {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
                seen_first = true;
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn is_sentence_case(text: &str) -> bool {
    text == sentence_case(text)
}

//! Structured challenge goals.
//!
//! Catalog requirements are human-readable strings such as `"0/5 recipes"`.
//! They are parsed exactly once, when a challenge is generated, into a
//! [`Requirement`] so event matching is a typed comparison rather than text
//! scanning on every event.

use serde::{Deserialize, Serialize};

/// What kind of participant activity advances a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Recipes,
    Shares,
    Ratings,
    /// Only five-star ratings count.
    PerfectRatings,
    Photos,
    Scans,
    /// Elapsed minutes under an active tracking session.
    Timed,
    /// No activity matches; advanced only by an explicit submission.
    Generic,
}

impl RequirementKind {
    /// Classify free text by keyword. Order matters: "perfect ratings" must
    /// not fall through to plain ratings, "shared recipes" is a share goal.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["perfect", "5-star", "five-star"]) {
            RequirementKind::PerfectRatings
        } else if has(&["minute"]) {
            RequirementKind::Timed
        } else if has(&["share"]) {
            RequirementKind::Shares
        } else if has(&["rating", "rate"]) {
            RequirementKind::Ratings
        } else if has(&["photo", "snap"]) {
            RequirementKind::Photos
        } else if has(&["recipe", "meal", "dish", "cook"]) {
            RequirementKind::Recipes
        } else if has(&["scan", "fridge", "ingredient"]) {
            RequirementKind::Scans
        } else {
            RequirementKind::Generic
        }
    }
}

/// The tracked goal of a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Source text the goal was parsed from.
    pub text: String,
    pub kind: RequirementKind,
    /// Always at least 1.
    pub target: u32,
    pub unit: String,
}

impl Requirement {
    /// Parse a single requirement string.
    ///
    /// Recognises `"<count>/<target> <noun>"`. Anything else degrades to a
    /// target of 1 with the kind inferred from the whole text.
    pub fn parse(text: &str) -> Self {
        match parse_fraction(text) {
            Some((target, noun)) => Requirement {
                text: text.to_string(),
                kind: RequirementKind::classify(noun),
                target,
                unit: noun
                    .split_whitespace()
                    .next()
                    .unwrap_or("entries")
                    .to_string(),
            },
            None => Requirement::fallback(text),
        }
    }

    /// Pick the first parseable entry of a requirement list as the goal.
    pub fn from_list<S: AsRef<str>>(requirements: &[S]) -> Self {
        requirements
            .iter()
            .find(|r| parse_fraction(r.as_ref()).is_some())
            .map(|r| Requirement::parse(r.as_ref()))
            .unwrap_or_else(|| {
                requirements
                    .first()
                    .map(|r| Requirement::fallback(r.as_ref()))
                    .unwrap_or_else(|| Requirement::fallback(""))
            })
    }

    fn fallback(text: &str) -> Self {
        Requirement {
            text: text.to_string(),
            kind: RequirementKind::classify(text),
            target: 1,
            unit: "entry".to_string(),
        }
    }

    /// Render the goal with live progress, e.g. `"3/5 recipes"`.
    pub fn describe(&self, units: u32) -> String {
        format!("{}/{} {}", units.min(self.target), self.target, self.unit)
    }
}

/// Find `<digits>/<digits>` and return the target with the trailing noun.
fn parse_fraction(text: &str) -> Option<(u32, &str)> {
    for (slash, _) in text.match_indices('/') {
        let before = &text[..slash];
        let count_start = before
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .len();
        if count_start == slash {
            continue;
        }

        let after = &text[slash + 1..];
        let rest = after.trim_start_matches(|c: char| c.is_ascii_digit());
        let digits = &after[..after.len() - rest.len()];
        match digits.parse::<u32>() {
            Ok(target) if target > 0 => return Some((target, rest.trim())),
            _ => continue,
        }
    }
    None
}

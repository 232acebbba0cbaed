use crate::domain::model::TemplateType;
use crate::utils::error::{MetricsError, Result};
use regex::Regex;
use std::collections::HashSet;

const ACTIVITY_PATTERN: &str = r"^activity ([a-zA-Z][a-zA-Z0-9 _]*)$";

fn constraint_pattern() -> String {
    let alternation = TemplateType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join("|");
    format!(
        r"^({alternation})\[([a-zA-Z][a-zA-Z0-9 _]*(?:, [a-zA-Z][a-zA-Z0-9 _]*)*)\]( *\| *)+$"
    )
}

/// Checks every line of model text against the activity/constraint grammar.
///
/// Single pass, left to right, failing fast on the first offending line.
/// Three recognized forms: blank lines (skipped), `activity <name>`
/// declarations, and `Template[a, b] | | |` constraint lines. Constraints
/// may only reference activities declared on earlier lines.
pub fn validate(text: &str) -> Result<()> {
    let activity_re = Regex::new(ACTIVITY_PATTERN).unwrap();
    let constraint_re = Regex::new(&constraint_pattern()).unwrap();

    let mut defined: HashSet<&str> = HashSet::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_number = index + 1;

        if let Some(caps) = activity_re.captures(line) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if !defined.insert(name) {
                return Err(MetricsError::DuplicateActivity {
                    name: name.to_string(),
                    line: line_number,
                    text: line.to_string(),
                });
            }
            continue;
        }

        if let Some(caps) = constraint_re.captures(line) {
            let arguments = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            for term in arguments.split(", ") {
                let term = term.trim();
                if !defined.contains(term) {
                    return Err(MetricsError::UndefinedActivity {
                        name: term.to_string(),
                        line: line_number,
                        text: line.to_string(),
                    });
                }
            }
            continue;
        }

        return Err(MetricsError::InvalidLine {
            line: line_number,
            text: line.to_string(),
        });
    }

    Ok(())
}

use crate::domain::model::{Constraint, DeclareModel, TemplateType};
use std::collections::HashSet;

/// Extracts the activity set and constraint list from model text.
///
/// Assumes the text already passed [`crate::core::grammar::validate`] and
/// does not re-validate: lines that fit neither form, unknown templates and
/// duplicate declarations are skipped with a warning instead of failing.
/// Callers that need correctness guarantees must validate first.
pub fn parse(text: &str) -> DeclareModel {
    let mut activities: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut constraints: Vec<Constraint> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix("activity ") {
            let name = name.trim();
            if seen.insert(name.to_string()) {
                activities.push(name.to_string());
            } else {
                tracing::warn!(activity = name, "skipping duplicate activity declaration");
            }
            continue;
        }

        if line.contains('[') {
            if let Some(constraint) = parse_constraint(line) {
                constraints.push(constraint);
            }
            continue;
        }

        tracing::warn!(line, "skipping unrecognized line");
    }

    DeclareModel::new(activities, constraints)
}

/// Parses `Template[a, b] | | |` into a constraint, taking only the portion
/// before the first `|` (the trailing pipe markers carry no semantics here).
fn parse_constraint(line: &str) -> Option<Constraint> {
    let head = line.split('|').next().unwrap_or("").trim();

    let open = head.find('[')?;
    let close = head.rfind(']')?;
    if close <= open {
        tracing::warn!(line, "skipping malformed constraint line");
        return None;
    }

    let name = head[..open].trim();
    let template = match TemplateType::from_name(name) {
        Some(template) => template,
        None => {
            tracing::warn!(template = name, "skipping constraint with unknown template");
            return None;
        }
    };

    let arguments = head[open + 1..close]
        .split(", ")
        .map(|term| term.trim().to_string())
        .collect();

    Some(Constraint::new(template, arguments))
}

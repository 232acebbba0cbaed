use crate::domain::model::{Component, DeclareModel, MetricValue, TemplateType};
use std::collections::BTreeMap;

/// Placeholder for the author-supplied qualitative metrics (SO1 purpose,
/// SO2 application domain). Those are never derived from model text.
pub const QUALITATIVE_SENTINEL: &str = "N/A";

/// Computes the structural metrics SN1-SN6 over one component analysis.
///
/// All numeric outputs are rounded to 3 decimal places. A model without
/// activities produces no numeric metrics at all; the caller falls back to
/// the qualitative sentinels.
pub fn structural_metrics(
    model: &DeclareModel,
    components: &[Component],
) -> BTreeMap<String, MetricValue> {
    let mut mapping = BTreeMap::new();

    let activities = model.activities().len();
    let constraints = model.constraints().len();
    if activities == 0 {
        return mapping;
    }
    let size = activities + constraints;

    let density = components
        .iter()
        .map(|c| {
            if c.activity_count() == 0 {
                0.0
            } else {
                c.constraint_count() as f64 / c.activity_count() as f64
            }
        })
        .fold(0.0_f64, f64::max);

    let variability = components
        .iter()
        .map(component_entropy)
        .fold(0.0_f64, f64::max);

    let separability = components.len() as f64 / size as f64;

    mapping.insert("SN1".to_string(), MetricValue::Number(size as f64));
    mapping.insert("SN2".to_string(), MetricValue::Number(round3(density)));
    mapping.insert("SN3".to_string(), MetricValue::Number(round3(variability)));
    mapping.insert("SN4".to_string(), MetricValue::Number(activities as f64));
    mapping.insert("SN5".to_string(), MetricValue::Number(constraints as f64));
    mapping.insert("SN6".to_string(), MetricValue::Number(round3(separability)));
    mapping
}

/// The two qualitative sentinels, present in every metric mapping.
pub fn sentinel_metrics() -> BTreeMap<String, MetricValue> {
    let mut mapping = BTreeMap::new();
    mapping.insert(
        "SO1".to_string(),
        MetricValue::Text(QUALITATIVE_SENTINEL.to_string()),
    );
    mapping.insert(
        "SO2".to_string(),
        MetricValue::Text(QUALITATIVE_SENTINEL.to_string()),
    );
    mapping
}

/// Shannon entropy of the template distribution within one component,
/// normalized by the log of the template vocabulary size. A component with
/// no constraints, or with a single template type, contributes 0.
fn component_entropy(component: &Component) -> f64 {
    let total = component.constraint_count();
    if total == 0 {
        return 0.0;
    }
    let base = (TemplateType::VOCABULARY_SIZE as f64).ln();

    component
        .template_counts()
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -(p * p.ln()) / base
        })
        .sum()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

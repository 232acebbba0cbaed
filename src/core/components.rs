use crate::domain::model::{Component, DeclareModel};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Partitions a model into weakly connected components.
///
/// Two activities are connected when some constraint references both, so
/// every constraint with two or more arguments contributes a clique over
/// its argument list. Unary constraints add no edges; their lone activity
/// still anchors them to a component. Components come out in discovery
/// order, which is the declaration order of their first activity.
pub fn analyze(model: &DeclareModel) -> Vec<Component> {
    let activities = model.activities();
    let index: HashMap<&str, usize> = activities
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); activities.len()];
    for constraint in model.constraints() {
        // Arguments not present in the activity set can only appear on
        // unvalidated input; they contribute nothing to adjacency.
        let ids: Vec<usize> = constraint
            .activities
            .iter()
            .filter_map(|name| index.get(name.as_str()).copied())
            .collect();
        for (position, &a) in ids.iter().enumerate() {
            for &b in &ids[position + 1..] {
                if a != b {
                    adjacency[a].insert(b);
                    adjacency[b].insert(a);
                }
            }
        }
    }

    // Breadth-first traversal from each unvisited activity, in declaration
    // order. `membership` doubles as the visited set.
    let mut membership: Vec<Option<usize>> = vec![None; activities.len()];
    let mut component_activities: Vec<Vec<usize>> = Vec::new();
    for start in 0..activities.len() {
        if membership[start].is_some() {
            continue;
        }
        let component_id = component_activities.len();
        membership[start] = Some(component_id);
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &neighbor in &adjacency[current] {
                if membership[neighbor].is_none() {
                    membership[neighbor] = Some(component_id);
                    members.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }
        component_activities.push(members);
    }

    // Attribute each constraint to the component owning its first declared
    // argument. Clique edges guarantee all arguments share one component,
    // so no constraint can be counted twice.
    let mut component_constraints = vec![Vec::new(); component_activities.len()];
    for constraint in model.constraints() {
        let owner = constraint
            .activities
            .iter()
            .filter_map(|name| index.get(name.as_str()))
            .find_map(|&id| membership[id]);
        match owner {
            Some(component_id) => {
                debug_assert!(constraint
                    .activities
                    .iter()
                    .filter_map(|name| index.get(name.as_str()))
                    .all(|&id| membership[id] == Some(component_id)));
                component_constraints[component_id].push(constraint.clone());
            }
            None => {
                tracing::debug!(
                    template = %constraint.template,
                    "dropping constraint with no declared activities"
                );
            }
        }
    }

    component_activities
        .into_iter()
        .zip(component_constraints)
        .map(|(members, constraints)| Component {
            activities: members
                .into_iter()
                .map(|id| activities[id].clone())
                .collect(),
            constraints,
        })
        .collect()
}

//! Flood-list reconciliation.
//!
//! Computes the ordered action list that converges the configured flood list
//! (`actual`) onto the BGP-advertised VTEPs (`desired`). All removals come
//! before all additions so flood-list capacity is freed first; each pass runs
//! in numeric address order.

use crate::types::{FloodAction, VtepSet};

/// Returns the actions that turn `actual` into `desired`.
///
/// Addresses present in both sets produce no action.
pub fn plan(desired: &VtepSet, actual: &VtepSet) -> Vec<FloodAction> {
    let mut actions = Vec::new();

    for addr in actual.iter() {
        if desired.contains(addr) {
            tracing::debug!(vtep = %addr, "VTEP still valid");
        } else {
            actions.push(FloodAction::Remove(*addr));
        }
    }

    for addr in desired.iter() {
        if actual.contains(addr) {
            tracing::debug!(vtep = %addr, "VTEP already configured");
        } else {
            actions.push(FloodAction::Add(*addr));
        }
    }

    actions
}

/// Applies `actions` to `set` in order.
pub fn apply(set: &VtepSet, actions: &[FloodAction]) -> VtepSet {
    let mut result = set.clone();
    for action in actions {
        match action {
            FloodAction::Remove(addr) => {
                result.remove(addr);
            }
            FloodAction::Add(addr) => {
                result.insert(*addr);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VtepAddress;
    use pretty_assertions::assert_eq;

    fn set(addrs: &[&str]) -> VtepSet {
        addrs.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn addr(s: &str) -> VtepAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_plan_removes_then_adds() {
        let desired = set(&["10.0.0.1", "10.0.0.3"]);
        let actual = set(&["10.0.0.2", "10.0.0.3", "10.0.0.4"]);

        assert_eq!(
            plan(&desired, &actual),
            vec![
                FloodAction::Remove(addr("10.0.0.2")),
                FloodAction::Remove(addr("10.0.0.4")),
                FloodAction::Add(addr("10.0.0.1")),
            ]
        );
    }

    #[test]
    fn test_plan_equal_sets_is_empty() {
        let desired = set(&["10.0.0.1", "10.0.0.2"]);
        assert!(plan(&desired, &desired.clone()).is_empty());
        assert!(plan(&VtepSet::new(), &VtepSet::new()).is_empty());
    }

    #[test]
    fn test_plan_order_is_numeric_within_pass() {
        let desired = set(&["10.0.0.10", "10.0.0.9", "9.0.0.1"]);
        let actions = plan(&desired, &VtepSet::new());
        assert_eq!(
            actions,
            vec![
                FloodAction::Add(addr("9.0.0.1")),
                FloodAction::Add(addr("10.0.0.9")),
                FloodAction::Add(addr("10.0.0.10")),
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let desired = set(&["10.0.0.7", "10.0.0.1", "10.0.0.4"]);
        let actual = set(&["10.0.0.4", "10.0.0.8", "10.0.0.2"]);
        assert_eq!(plan(&desired, &actual), plan(&desired, &actual));
    }

    #[test]
    fn test_plan_matches_set_differences() {
        let cases = [
            (vec!["1.1.1.1", "2.2.2.2"], vec![]),
            (vec![], vec!["1.1.1.1", "2.2.2.2"]),
            (vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"], vec!["2.2.2.2", "4.4.4.4"]),
            (vec!["5.5.5.5"], vec!["5.5.5.5"]),
        ];

        for (d, a) in cases {
            let desired = set(&d);
            let actual = set(&a);
            let actions = plan(&desired, &actual);

            let removed: VtepSet = actions
                .iter()
                .filter_map(|a| match a {
                    FloodAction::Remove(addr) => Some(*addr),
                    FloodAction::Add(_) => None,
                })
                .collect();
            let added: VtepSet = actions
                .iter()
                .filter_map(|a| match a {
                    FloodAction::Add(addr) => Some(*addr),
                    FloodAction::Remove(_) => None,
                })
                .collect();

            let stale: VtepSet = actual.difference(&desired).copied().collect();
            let missing: VtepSet = desired.difference(&actual).copied().collect();
            assert_eq!(removed, stale);
            assert_eq!(added, missing);

            let converged = apply(&actual, &actions);
            assert_eq!(converged, desired);
            assert!(plan(&desired, &converged).is_empty());
        }
    }
}

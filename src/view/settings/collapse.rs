//! Collapse-state tracking across rebuilds
//!
//! Module groups are recreated on every rebuild, so their collapsed flags
//! are carried over as an *exception set*: the names of modules whose flag
//! differs from the global default.

use super::filter::FilterState;
use super::grouping::ModuleGroup;
use std::collections::HashSet;

/// Names of groups that deviate from `collapsed_default`
pub fn exception_set(groups: &[ModuleGroup], collapsed_default: bool) -> HashSet<String> {
    groups
        .iter()
        .filter(|g| g.collapsed() != collapsed_default)
        .map(|g| g.info.name.clone())
        .collect()
}

/// Assign collapsed flags to freshly built groups
pub fn apply_collapse(
    groups: &mut [ModuleGroup],
    collapsed_default: bool,
    exceptions: &HashSet<String>,
) {
    for group in groups {
        let collapsed = collapsed_default ^ exceptions.contains(&group.info.name);
        group.set_collapsed(collapsed);
    }
}

/// Flip one group. Only this group's height cache is dropped.
pub fn toggle_collapse(group: &mut ModuleGroup) {
    let collapsed = !group.collapsed();
    group.set_collapsed(collapsed);
}

/// Expand-all / collapse-all.
///
/// Flips the global default and applies it to every visible group, which
/// leaves no exceptions behind. Returns the new default.
pub fn collapse_all(groups: &mut [ModuleGroup], filter: &mut FilterState) -> bool {
    filter.collapsed_default = !filter.collapsed_default;
    for group in groups.iter_mut() {
        if group.collapsed() != filter.collapsed_default {
            group.set_collapsed(filter.collapsed_default);
        }
    }
    filter.collapsed_default
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::setting::ModuleInfo;
    use crate::view::ui::VirtualItem;
    use std::rc::Rc;

    fn group(name: &str, collapsed: bool) -> ModuleGroup {
        ModuleGroup::new(
            Rc::new(ModuleInfo::new(name.to_lowercase(), name, "1")),
            Vec::new(),
            None,
            collapsed,
        )
    }

    #[test]
    fn test_exceptions_roundtrip() {
        let old = vec![group("A", true), group("B", false), group("C", true)];
        let exceptions = exception_set(&old, true);
        assert_eq!(exceptions, HashSet::from(["B".to_string()]));

        let mut rebuilt = vec![group("A", false), group("B", false), group("C", false)];
        apply_collapse(&mut rebuilt, true, &exceptions);
        let flags: Vec<bool> = rebuilt.iter().map(|g| g.collapsed()).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_toggle_resets_only_that_height() {
        let mut groups = vec![group("A", true), group("B", true)];
        groups[0].record_height(3);
        groups[1].record_height(3);

        toggle_collapse(&mut groups[0]);
        assert!(!groups[0].collapsed());
        assert_eq!(groups[0].height(), 0);
        assert_eq!(groups[1].height(), 3);
    }

    #[test]
    fn test_collapse_all_clears_exceptions() {
        let mut filter = FilterState::default();
        assert!(filter.collapsed_default);
        let mut groups = vec![group("A", true), group("B", false)];
        groups[0].record_height(1);
        groups[1].record_height(9);

        let new_default = collapse_all(&mut groups, &mut filter);
        assert!(!new_default);
        assert!(groups.iter().all(|g| !g.collapsed()));
        // B was already expanded, its cache survives
        assert_eq!(groups[0].height(), 0);
        assert_eq!(groups[1].height(), 9);
        assert!(exception_set(&groups, filter.collapsed_default).is_empty());
    }
}

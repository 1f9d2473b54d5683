//! Grouping and ungrouping.
//!
//! A group is a top-level element whose children are held outside the
//! element sequence, positioned relative to the group's origin.

use crate::element::{Element, ElementId, ElementKind, union_bounds};
use kurbo::Vec2;
use std::collections::BTreeSet;

/// Result of a successful [`group_elements`].
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped {
    /// New top-level sequence with the group in place of its children.
    pub elements: Vec<Element>,
    pub group: Element,
    /// Children in their former relative z-order, relative to the group origin.
    pub children: Vec<Element>,
}

/// Result of a successful [`ungroup_element`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ungrouped {
    pub elements: Vec<Element>,
    /// Ids of the restored children, bottom to top.
    pub child_ids: Vec<ElementId>,
}

/// Group the selected, unlocked top-level elements.
///
/// Returns `None` when fewer than two elements qualify. The group takes the
/// z-position of the topmost grouped element.
pub fn group_elements(elements: &[Element], selected: &BTreeSet<ElementId>) -> Option<Grouped> {
    let picked: Vec<(usize, &Element)> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| selected.contains(&e.id) && !e.locked)
        .collect();
    if picked.len() < 2 {
        return None;
    }

    let bounds = union_bounds(picked.iter().map(|(_, e)| *e))?;
    let max_idx = picked.iter().map(|(idx, _)| *idx).max()?;
    let origin = Vec2::new(bounds.x0, bounds.y0);

    let children: Vec<Element> = picked
        .iter()
        .map(|(_, e)| {
            let mut child = (*e).clone();
            child.translate(-origin);
            child
        })
        .collect();
    let child_ids: Vec<ElementId> = children.iter().map(|c| c.id).collect();

    let mut group = Element::new(ElementKind::Group { child_ids: child_ids.clone() }, bounds);
    group.style.fill = "none".to_string();

    let grouped: BTreeSet<ElementId> = child_ids.into_iter().collect();
    let mut remaining: Vec<Element> = elements
        .iter()
        .filter(|e| !grouped.contains(&e.id))
        .cloned()
        .collect();
    let insert_at = (max_idx + 1 - picked.len()).min(remaining.len());
    remaining.insert(insert_at, group.clone());

    Some(Grouped {
        elements: remaining,
        group,
        children,
    })
}

/// Dissolve `group_id`, restoring `children` (relative to the group origin)
/// to absolute positions at the group's z-position.
///
/// Returns `None` if the id is not an unlocked top-level group.
pub fn ungroup_element(elements: &[Element], group_id: ElementId, children: &[Element]) -> Option<Ungrouped> {
    let pos = elements.iter().position(|e| e.id == group_id)?;
    let group = &elements[pos];
    if !group.is_group() || group.locked {
        return None;
    }
    let origin = group.position().to_vec2();

    // Child order follows the group's child list.
    let restored: Vec<Element> = group
        .child_ids()
        .iter()
        .filter_map(|id| children.iter().find(|c| c.id == *id))
        .map(|c| {
            let mut child = c.clone();
            child.translate(origin);
            child
        })
        .collect();
    let child_ids = restored.iter().map(|c| c.id).collect();

    let mut result = elements.to_vec();
    result.splice(pos..=pos, restored);
    Some(Ungrouped {
        elements: result,
        child_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rectangle, Rect::new(x, y, x + w, y + h))
    }

    #[test]
    fn test_group_builds_union_box() {
        let els = vec![rect(10.0, 20.0, 30.0, 30.0), rect(100.0, 5.0, 10.0, 10.0)];
        let sel: BTreeSet<_> = els.iter().map(|e| e.id).collect();
        let grouped = group_elements(&els, &sel).unwrap();
        assert_eq!(grouped.group.bounds(), Rect::new(10.0, 5.0, 110.0, 50.0));
        assert_eq!(grouped.elements.len(), 1);
        assert!((grouped.children[0].x - 0.0).abs() < 1e-9);
        assert!((grouped.children[0].y - 15.0).abs() < 1e-9);
        assert!((grouped.children[1].x - 90.0).abs() < 1e-9);
        assert_eq!(grouped.group.child_ids(), &[els[0].id, els[1].id]);
    }

    #[test]
    fn test_group_takes_topmost_position() {
        let els: Vec<Element> = (0..5).map(|i| rect(i as f64, 0.0, 1.0, 1.0)).collect();
        let sel: BTreeSet<_> = [els[1].id, els[3].id].into_iter().collect();
        let grouped = group_elements(&els, &sel).unwrap();
        let order: Vec<ElementId> = grouped.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![els[0].id, els[2].id, grouped.group.id, els[4].id]);
    }

    #[test]
    fn test_group_requires_two_unlocked() {
        let mut els = vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)];
        let sel: BTreeSet<_> = els.iter().map(|e| e.id).collect();
        els[1].locked = true;
        assert!(group_elements(&els, &sel).is_none());
        assert!(group_elements(&els, &BTreeSet::new()).is_none());
    }

    #[test]
    fn test_ungroup_restores_positions_and_order() {
        let els = vec![
            rect(0.0, 0.0, 5.0, 5.0),
            rect(12.5, 7.25, 30.0, 10.0),
            rect(-40.0, 33.3, 8.0, 9.0),
            rect(60.0, 60.0, 5.0, 5.0),
        ];
        let sel: BTreeSet<_> = [els[1].id, els[2].id].into_iter().collect();
        let grouped = group_elements(&els, &sel).unwrap();
        let ungrouped = ungroup_element(&grouped.elements, grouped.group.id, &grouped.children).unwrap();

        assert_eq!(ungrouped.child_ids, vec![els[1].id, els[2].id]);
        let order: Vec<ElementId> = ungrouped.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, els.iter().map(|e| e.id).collect::<Vec<_>>());
        for (restored, original) in ungrouped.elements.iter().zip(&els) {
            assert!((restored.x - original.x).abs() < 1e-9);
            assert!((restored.y - original.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ungroup_follows_moved_group() {
        let els = vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)];
        let sel: BTreeSet<_> = els.iter().map(|e| e.id).collect();
        let mut grouped = group_elements(&els, &sel).unwrap();
        grouped.elements[0].translate(Vec2::new(5.0, 7.0));
        let ungrouped = ungroup_element(&grouped.elements, grouped.group.id, &grouped.children).unwrap();
        assert!((ungrouped.elements[1].x - 25.0).abs() < 1e-9);
        assert!((ungrouped.elements[1].y - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_ungroup_rejects_non_group_and_locked() {
        let els = vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)];
        assert!(ungroup_element(&els, els[0].id, &[]).is_none());

        let sel: BTreeSet<_> = els.iter().map(|e| e.id).collect();
        let mut grouped = group_elements(&els, &sel).unwrap();
        grouped.elements[0].locked = true;
        assert!(ungroup_element(&grouped.elements, grouped.group.id, &grouped.children).is_none());
    }
}

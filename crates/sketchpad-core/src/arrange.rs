//! Z-order operations on the positional element sequence.
//!
//! Later elements are drawn on top. Every function returns a new sequence
//! and leaves the input untouched.

use crate::element::{Element, ElementId};
use std::collections::BTreeSet;

/// Move the selected elements above everything else, preserving the relative
/// order within both the selected and non-selected partitions.
pub fn bring_to_front(elements: &[Element], selected: &BTreeSet<ElementId>) -> Vec<Element> {
    let (picked, rest): (Vec<Element>, Vec<Element>) =
        elements.iter().cloned().partition(|e| selected.contains(&e.id));
    rest.into_iter().chain(picked).collect()
}

/// Move the selected elements below everything else, preserving relative
/// order within each partition.
pub fn send_to_back(elements: &[Element], selected: &BTreeSet<ElementId>) -> Vec<Element> {
    let (picked, rest): (Vec<Element>, Vec<Element>) =
        elements.iter().cloned().partition(|e| selected.contains(&e.id));
    picked.into_iter().chain(rest).collect()
}

/// Move each selected run one step up past the adjacent non-selected element.
pub fn bring_forward(elements: &[Element], selected: &BTreeSet<ElementId>) -> Vec<Element> {
    let mut result = elements.to_vec();
    if result.len() < 2 {
        return result;
    }
    // Top-down so a selected run moves as a block.
    for i in (0..result.len() - 1).rev() {
        if selected.contains(&result[i].id) && !selected.contains(&result[i + 1].id) {
            result.swap(i, i + 1);
        }
    }
    result
}

/// Move each selected run one step down past the adjacent non-selected element.
pub fn send_backward(elements: &[Element], selected: &BTreeSet<ElementId>) -> Vec<Element> {
    let mut result = elements.to_vec();
    for i in 1..result.len() {
        if selected.contains(&result[i].id) && !selected.contains(&result[i - 1].id) {
            result.swap(i - 1, i);
        }
    }
    result
}

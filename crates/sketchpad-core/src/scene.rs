//! Scene state: ordered elements, selection, viewport and group children.

use crate::element::{Element, ElementId, ElementKind, union_bounds};
use crate::error::{SceneError, SceneResult};
use crate::viewport::ViewportState;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The whole editable scene.
///
/// Element order is z-order (later draws on top). Children of groups are
/// kept out of `elements`, in `group_children`, positioned relative to
/// their group's origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub selected_ids: BTreeSet<ElementId>,
    #[serde(default)]
    pub viewport: ViewportState,
    #[serde(default)]
    pub group_children: BTreeMap<ElementId, Vec<Element>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the scene to pretty JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Parse a scene document.
    ///
    /// Duplicate ids are rejected. Rotations are normalized, negative sizes
    /// clamp to zero and selection entries that do not name a top-level
    /// element are dropped.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let mut scene: Scene =
            serde_json::from_str(json).map_err(|e| SceneError::Serialization(e.to_string()))?;

        let mut seen = BTreeSet::new();
        let all = scene
            .elements
            .iter()
            .chain(scene.group_children.values().flatten());
        for element in all {
            if !seen.insert(element.id) {
                return Err(SceneError::Serialization(format!("duplicate element id {}", element.id)));
            }
        }
        for element in scene.elements.iter_mut().chain(scene.group_children.values_mut().flatten()) {
            element.set_rotation(element.rotation);
            element.width = element.width.max(0.0);
            element.height = element.height.max(0.0);
        }

        let top_level: BTreeSet<ElementId> = scene.elements.iter().map(|e| e.id).collect();
        scene.selected_ids.retain(|id| top_level.contains(id));
        Ok(scene)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Top-level element by id.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Z-position of a top-level element.
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Children of a group (relative to the group origin).
    pub fn children_of(&self, group_id: ElementId) -> &[Element] {
        self.group_children
            .get(&group_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Selected elements in z-order.
    pub fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| self.selected_ids.contains(&e.id))
    }

    /// Union box of all visible elements.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.elements.iter().filter(|e| e.visible))
    }

    /// Union box of the selection.
    pub fn selection_bounds(&self) -> Option<Rect> {
        union_bounds(self.selected_elements())
    }

    /// Topmost visible element under a canvas point, honoring rotation.
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .filter(|e| e.visible)
            .find(|e| {
                let local = Affine::rotate_about(-e.rotation.to_radians(), e.center()) * point;
                e.bounds().contains(local)
            })
            .map(|e| e.id)
    }

    /// Visible elements whose box intersects `rect` (marquee selection).
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.elements
            .iter()
            .filter(|e| e.visible && rect.intersect(e.bounds()).area() > 0.0)
            .map(|e| e.id)
            .collect()
    }

    /// Remove elements by id at any nesting level.
    ///
    /// Ids are pruned from the selection and from every group's child list;
    /// removed groups take their children with them. Returns how many
    /// elements were removed, children included.
    pub fn remove(&mut self, ids: &BTreeSet<ElementId>) -> usize {
        let mut doomed: Vec<ElementId> = ids.iter().copied().collect();
        let mut removed = 0;
        let mut visited = BTreeSet::new();

        while let Some(id) = doomed.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(children) = self.group_children.remove(&id) {
                removed += children.len();
                doomed.extend(children.iter().map(|c| c.id));
            }
            let before = self.elements.len();
            self.elements.retain(|e| e.id != id);
            removed += before - self.elements.len();

            for children in self.group_children.values_mut() {
                let before = children.len();
                children.retain(|c| c.id != id);
                removed += before - children.len();
            }
        }

        let gone = &visited;
        for element in self
            .elements
            .iter_mut()
            .chain(self.group_children.values_mut().flatten())
        {
            if let ElementKind::Group { child_ids } = &mut element.kind {
                child_ids.retain(|c| !gone.contains(c));
            }
        }
        self.selected_ids.retain(|id| !gone.contains(id));
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rectangle, Rect::new(x, y, x + w, y + h))
    }

    #[test]
    fn test_scene_json_roundtrip() {
        let mut scene = Scene::new();
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let child = rect(1.0, 1.0, 2.0, 2.0);
        let group = Element::new(
            ElementKind::Group { child_ids: vec![child.id] },
            Rect::new(50.0, 50.0, 60.0, 60.0),
        );
        scene.selected_ids.insert(a.id);
        scene.group_children.insert(group.id, vec![child]);
        scene.elements = vec![a, group];
        scene.viewport = ViewportState::new(kurbo::Vec2::new(3.0, 4.0), 1.5);

        let json = scene.to_json().unwrap();
        assert!(json.contains("selectedIds"));
        assert!(json.contains("groupChildren"));
        let back = Scene::from_json(&json).unwrap();
        assert_eq!(back, scene);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let scene = Scene {
            elements: vec![a.clone(), a],
            ..Default::default()
        };
        let json = serde_json::to_string(&scene).unwrap();
        assert!(matches!(Scene::from_json(&json), Err(SceneError::Serialization(_))));
    }

    #[test]
    fn test_from_json_normalizes_and_prunes() {
        let json = r#"{
            "elements": [{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "kind": "rectangle",
                "x": 0, "y": 0, "width": 10, "height": 10,
                "rotation": -90
            }, {
                "id": "67e55044-10b1-426f-9247-bb680e5fe0ca",
                "kind": "ellipse",
                "x": 0, "y": 0, "width": -40, "height": 50
            }],
            "selectedIds": ["67e55044-10b1-426f-9247-bb680e5fe0c9"]
        }"#;
        let scene = Scene::from_json(json).unwrap();
        assert!((scene.elements[0].rotation - 270.0).abs() < 1e-9);
        assert!(scene.elements[0].visible);
        assert!(scene.selected_ids.is_empty());
        assert_eq!(scene.viewport, ViewportState::default());
        assert!(scene.elements[1].width.abs() < f64::EPSILON);
        assert!((scene.elements[1].height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_json_is_stable() {
        let elements: Vec<Element> = (0..8).map(|i| rect(i as f64 * 10.0, 0.0, 5.0, 5.0)).collect();
        let mut scene = Scene {
            selected_ids: elements.iter().map(|e| e.id).collect(),
            elements,
            ..Default::default()
        };
        for element in &scene.elements {
            scene.group_children.insert(element.id, Vec::new());
        }
        let first = scene.to_json().unwrap();
        let reloaded = Scene::from_json(&first).unwrap();
        assert_eq!(reloaded.to_json().unwrap(), first);

        let mut ids: Vec<ElementId> = scene.elements.iter().map(|e| e.id).collect();
        ids.sort();
        let json: serde_json::Value = serde_json::from_str(&first).unwrap();
        let saved: Vec<ElementId> = serde_json::from_value(json["selectedIds"].clone()).unwrap();
        assert_eq!(saved, ids);
    }

    #[test]
    fn test_bounds_skip_hidden() {
        let mut hidden = rect(1000.0, 1000.0, 1.0, 1.0);
        hidden.visible = false;
        let scene = Scene {
            elements: vec![rect(0.0, 0.0, 10.0, 10.0), hidden],
            ..Default::default()
        };
        assert_eq!(scene.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(Scene::new().bounds(), None);
    }

    #[test]
    fn test_element_at_topmost_and_rotated() {
        let bottom = rect(0.0, 0.0, 100.0, 100.0);
        let mut top = rect(40.0, 0.0, 20.0, 100.0);
        let scene_ids = (bottom.id, top.id);
        let mut scene = Scene {
            elements: vec![bottom, top.clone()],
            ..Default::default()
        };
        assert_eq!(scene.element_at(Point::new(50.0, 50.0)), Some(scene_ids.1));
        assert_eq!(scene.element_at(Point::new(10.0, 50.0)), Some(scene_ids.0));
        assert_eq!(scene.element_at(Point::new(500.0, 50.0)), None);

        // Turned a quarter, the tall bar lies across (0..100, 40..60).
        top.rotation = 90.0;
        scene.elements[1] = top;
        assert_eq!(scene.element_at(Point::new(5.0, 50.0)), Some(scene_ids.1));
    }

    #[test]
    fn test_remove_prunes_selection_and_groups() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let c1 = rect(0.0, 0.0, 1.0, 1.0);
        let c2 = rect(2.0, 0.0, 1.0, 1.0);
        let group = Element::new(
            ElementKind::Group { child_ids: vec![c1.id, c2.id] },
            Rect::new(10.0, 10.0, 13.0, 11.0),
        );
        let (a_id, c1_id, group_id) = (a.id, c1.id, group.id);
        let mut scene = Scene {
            elements: vec![a, group],
            ..Default::default()
        };
        scene.group_children.insert(group_id, vec![c1, c2]);
        scene.selected_ids.extend([a_id, group_id]);

        // Deleting a child only touches its group.
        assert_eq!(scene.remove(&[c1_id].into_iter().collect()), 1);
        assert_eq!(scene.get(group_id).unwrap().child_ids().len(), 1);
        assert_eq!(scene.children_of(group_id).len(), 1);

        // Deleting the group drops its remaining child too.
        assert_eq!(scene.remove(&[a_id, group_id].into_iter().collect()), 3);
        assert!(scene.is_empty());
        assert!(scene.group_children.is_empty());
        assert!(scene.selected_ids.is_empty());
    }

    #[test]
    fn test_elements_in_rect() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(100.0, 100.0, 10.0, 10.0);
        let a_id = a.id;
        let scene = Scene {
            elements: vec![a, b],
            ..Default::default()
        };
        assert_eq!(scene.elements_in_rect(Rect::new(20.0, 20.0, 5.0, 5.0)), vec![a_id]);
    }
}

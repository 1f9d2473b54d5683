//! The scene store: owns the scene and exposes every editing command.
//!
//! Each command builds the next scene from the current one and swaps it in
//! whole, so callers never observe a half-applied edit.

use crate::animation::ViewportTween;
use crate::arrange;
use crate::config::SceneConfig;
use crate::element::{Element, ElementId, ElementKind, ElementPatch};
use crate::error::{SceneError, SceneResult};
use crate::group::{group_elements, ungroup_element};
use crate::interaction::{DragMode, DragState, DragUpdate, Modifiers, moved_position};
use crate::resize::{ResizeOptions, resize_snapped};
use crate::rotate::RotationDrag;
use crate::scene::Scene;
use crate::selection::{HandleKind, ResizeHandle, hit_test_handles};
use crate::snap::normalize_degrees;
use crate::svg::{ExportOptions, elements_to_svg};
use crate::viewport::{ViewportState, screen_to_canvas};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Padding (screen pixels) kept around content by zoom-to-fit.
pub const FIT_PADDING: f64 = 50.0;

/// Size used when a drop payload carries no usable default size.
const FALLBACK_DROP_SIZE: f64 = 100.0;

/// Drag-and-drop element creation request from a palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default_width: f64,
    #[serde(default)]
    pub default_height: f64,
}

impl DropPayload {
    pub fn parse(json: &str) -> SceneResult<Self> {
        serde_json::from_str(json).map_err(|e| SceneError::Payload(e.to_string()))
    }
}

/// Hands out palette colors, never the same one twice in a row.
#[derive(Debug, Clone, Default)]
struct AccentPicker {
    counter: u32,
    last: Option<usize>,
}

impl AccentPicker {
    fn next(&mut self, palette_len: usize) -> Option<usize> {
        if palette_len == 0 {
            return None;
        }
        self.counter = self.counter.wrapping_add(1);

        // splitmix32-style mixing of the counter.
        let mut x = self.counter.wrapping_mul(0x9E37_79B9);
        x ^= x >> 16;
        x = x.wrapping_mul(0x85EB_CA6B);
        x ^= x >> 13;
        x = x.wrapping_mul(0xC2B2_AE35);
        x ^= x >> 16;

        let mut idx = x as usize % palette_len;
        if palette_len > 1 && self.last == Some(idx) {
            idx = (idx + 1) % palette_len;
        }
        self.last = Some(idx);
        Some(idx)
    }
}

/// Owner of the scene, the active gesture and any viewport animation.
#[derive(Debug, Clone)]
pub struct Store {
    scene: Scene,
    config: SceneConfig,
    drag: DragState,
    tween: Option<ViewportTween>,
    container_origin: Point,
    container_size: Size,
    accents: AccentPicker,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Store {
    pub fn new(config: SceneConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    pub fn with_scene(scene: Scene, config: SceneConfig) -> Self {
        Self {
            scene,
            config,
            drag: DragState::Idle,
            tween: None,
            container_origin: Point::ORIGIN,
            container_size: Size::new(800.0, 600.0),
            accents: AccentPicker::default(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SceneConfig) {
        self.config = config;
    }

    pub fn elements(&self) -> &[Element] {
        &self.scene.elements
    }

    pub fn selected_ids(&self) -> &BTreeSet<ElementId> {
        &self.scene.selected_ids
    }

    pub fn viewport(&self) -> ViewportState {
        self.scene.viewport
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Screen position and size of the viewport container.
    pub fn set_container(&mut self, origin: Point, size: Size) {
        self.container_origin = origin;
        self.container_size = size;
    }

    /// Container-relative position of an absolute screen point.
    fn local(&self, screen: Point) -> Point {
        screen - self.container_origin.to_vec2()
    }

    /// Canvas position of an absolute screen point.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen_to_canvas(screen, &self.scene.viewport, self.container_origin)
    }

    /// Apply `edit` to a copy of the scene and swap it in if it reports a change.
    fn commit(&mut self, action: &str, edit: impl FnOnce(&mut Scene) -> bool) -> bool {
        let mut next = self.scene.clone();
        if !edit(&mut next) {
            return false;
        }
        self.scene = next;
        log::debug!(
            "{action}: {} elements, {} selected",
            self.scene.elements.len(),
            self.scene.selected_ids.len()
        );
        true
    }

    // --- Elements ---

    /// Append an element on top. A colliding id is replaced with a fresh one.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let taken = self.scene.get(element.id).is_some()
            || self
                .scene
                .group_children
                .values()
                .flatten()
                .any(|c| c.id == element.id);
        if taken {
            element.regenerate_id();
        }
        element.set_rotation(element.rotation);
        element.width = element.width.max(0.0);
        element.height = element.height.max(0.0);
        let id = element.id;
        self.commit("add element", |scene| {
            scene.elements.push(element);
            true
        });
        id
    }

    /// Create an element from a palette drop at an absolute screen point.
    ///
    /// The element is centered on the drop point, gets an accent fill and
    /// becomes the selection. Unknown kinds are logged and dropped.
    pub fn drop_payload(&mut self, payload: &DropPayload, screen_point: Point) -> Option<ElementId> {
        let Some(kind) = ElementKind::from_name(&payload.kind) else {
            log::warn!("Ignoring drop of unknown element kind {:?}", payload.kind);
            return None;
        };
        let size = |v: f64| if v > 0.0 && v.is_finite() { v } else { FALLBACK_DROP_SIZE };
        let (w, h) = (size(payload.default_width), size(payload.default_height));
        let center = self.screen_to_canvas(screen_point);

        let mut element = Element::new(kind, Rect::from_center_size(center, (w, h)));
        if let Some(label) = &payload.label {
            element.name = label.clone();
        }
        if let Some(idx) = self.accents.next(self.config.accent_palette.len()) {
            element.style.fill = self.config.accent_palette[idx].clone();
        }
        let id = self.add_element(element);
        self.select(id);
        Some(id)
    }

    /// Parse a drop payload at the boundary; malformed input is logged and dropped.
    pub fn drop_json(&mut self, json: &str, screen_point: Point) -> Option<ElementId> {
        match DropPayload::parse(json) {
            Ok(payload) => self.drop_payload(&payload, screen_point),
            Err(e) => {
                log::warn!("Dropping malformed payload: {e}");
                None
            }
        }
    }

    /// Shallow-merge `patch` into a top-level element.
    ///
    /// Locked elements ignore geometry fields but still accept style, name,
    /// visibility and lock changes.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(current) = self.scene.get(id) else {
            return false;
        };
        let patch = if current.locked {
            ElementPatch {
                x: None,
                y: None,
                width: None,
                height: None,
                rotation: None,
                ..patch.clone()
            }
        } else {
            patch.clone()
        };
        self.commit("update element", |scene| {
            let Some(element) = scene.get_mut(id) else {
                return false;
            };
            let before = element.clone();
            element.apply_patch(&patch);
            *element != before
        })
    }

    /// Delete elements (at any nesting level).
    pub fn delete(&mut self, ids: &BTreeSet<ElementId>) -> usize {
        let mut removed = 0;
        self.commit("delete", |scene| {
            removed = scene.remove(ids);
            removed > 0
        });
        removed
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.scene.selected_ids.clone();
        self.delete(&ids)
    }

    /// Copy the selected elements (groups with their children) under fresh
    /// ids, one grid cell down and right, and select the copies.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let offset = Vec2::new(self.config.snap.grid_size, self.config.snap.grid_size);
        let mut copies = Vec::new();
        self.commit("duplicate", |scene| {
            let originals: Vec<Element> = scene.selected_elements().cloned().collect();
            if originals.is_empty() {
                return false;
            }
            for original in &originals {
                let mut copy = copy_with_children(original, scene);
                copy.translate(offset);
                copies.push(copy.id);
                scene.elements.push(copy);
            }
            scene.selected_ids = copies.iter().copied().collect();
            true
        });
        copies
    }

    // --- Selection ---

    pub fn select(&mut self, id: ElementId) -> bool {
        self.commit("select", |scene| {
            if scene.get(id).is_none() {
                return false;
            }
            scene.selected_ids = [id].into_iter().collect();
            true
        })
    }

    pub fn add_to_selection(&mut self, id: ElementId) -> bool {
        self.commit("add to selection", |scene| scene.get(id).is_some() && scene.selected_ids.insert(id))
    }

    pub fn toggle_selection(&mut self, id: ElementId) -> bool {
        self.commit("toggle selection", |scene| {
            if scene.get(id).is_none() {
                return false;
            }
            if !scene.selected_ids.remove(&id) {
                scene.selected_ids.insert(id);
            }
            true
        })
    }

    pub fn clear_selection(&mut self) -> bool {
        self.commit("clear selection", |scene| {
            let changed = !scene.selected_ids.is_empty();
            scene.selected_ids.clear();
            changed
        })
    }

    /// Select every visible, unlocked element.
    pub fn select_all(&mut self) -> bool {
        self.commit("select all", |scene| {
            let all: BTreeSet<ElementId> = scene
                .elements
                .iter()
                .filter(|e| e.visible && !e.locked)
                .map(|e| e.id)
                .collect();
            let changed = all != scene.selected_ids;
            scene.selected_ids = all;
            changed
        })
    }

    /// Select the unlocked elements intersecting a canvas-space box.
    pub fn select_in_rect(&mut self, rect: Rect) -> bool {
        self.commit("marquee select", |scene| {
            let hits: BTreeSet<ElementId> = scene
                .elements_in_rect(rect)
                .into_iter()
                .filter(|id| scene.get(*id).is_some_and(|e| !e.locked))
                .collect();
            let changed = hits != scene.selected_ids;
            scene.selected_ids = hits;
            changed
        })
    }

    /// Topmost element under an absolute screen point.
    pub fn element_at(&self, screen_point: Point) -> Option<ElementId> {
        self.scene.element_at(self.screen_to_canvas(screen_point))
    }

    // --- Transforms ---

    /// Move the selected unlocked elements by a canvas-space delta.
    pub fn move_selected(&mut self, delta: Vec2) -> bool {
        let config = self.config.clone();
        self.commit("move", |scene| {
            let selected = scene.selected_ids.clone();
            let mut moved = false;
            for element in scene.elements.iter_mut() {
                if selected.contains(&element.id) && !element.locked {
                    let p = moved_position(element.position(), delta, &config);
                    element.x = p.x;
                    element.y = p.y;
                    moved = true;
                }
            }
            moved
        })
    }

    /// Keyboard nudge of the selection.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        self.move_selected(Vec2::new(dx, dy))
    }

    /// Resize an element by dragging `handle` by a canvas-space delta.
    pub fn resize_element(&mut self, id: ElementId, handle: ResizeHandle, delta: Vec2, keep_aspect: bool) -> bool {
        let (min_size, snap) = (self.config.min_element_size, self.config.snap);
        self.commit("resize", |scene| {
            let Some(element) = scene.get_mut(id).filter(|e| !e.locked) else {
                return false;
            };
            let opts = ResizeOptions::for_rotation(element.rotation)
                .with_aspect_lock(keep_aspect)
                .with_min_size(min_size);
            let bounds = resize_snapped(element.bounds(), handle, delta, &opts, &snap);
            element.set_bounds(bounds);
            true
        })
    }

    /// Set an element's rotation in degrees.
    pub fn rotate_element(&mut self, id: ElementId, degrees: f64) -> bool {
        self.commit("rotate", |scene| {
            let Some(element) = scene.get_mut(id).filter(|e| !e.locked) else {
                return false;
            };
            element.set_rotation(degrees);
            true
        })
    }

    /// Rotate the selected unlocked elements by `degrees` about their own centers.
    pub fn rotate_selected_by(&mut self, degrees: f64) -> bool {
        self.commit("rotate selection", |scene| {
            let selected = scene.selected_ids.clone();
            let mut rotated = false;
            for element in scene.elements.iter_mut() {
                if selected.contains(&element.id) && !element.locked {
                    element.set_rotation(normalize_degrees(element.rotation + degrees));
                    rotated = true;
                }
            }
            rotated
        })
    }

    /// Handle under an absolute screen point, for a single selected element.
    pub fn handle_at(&self, screen_point: Point) -> Option<(ElementId, HandleKind)> {
        let element = self.single_selected()?;
        let kind = hit_test_handles(
            element.bounds(),
            element.rotation,
            self.config.rotate_handle_offset,
            self.screen_to_canvas(screen_point),
            self.scene.viewport.zoom(),
        )?;
        Some((element.id, kind))
    }

    fn single_selected(&self) -> Option<&Element> {
        if self.scene.selected_ids.len() != 1 {
            return None;
        }
        self.scene.selected_elements().next().filter(|e| !e.locked)
    }

    // --- Z-order and grouping ---

    pub fn bring_to_front(&mut self) -> bool {
        self.reorder("bring to front", arrange::bring_to_front)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.reorder("send to back", arrange::send_to_back)
    }

    pub fn bring_forward(&mut self) -> bool {
        self.reorder("bring forward", arrange::bring_forward)
    }

    pub fn send_backward(&mut self) -> bool {
        self.reorder("send backward", arrange::send_backward)
    }

    fn reorder(&mut self, action: &str, op: fn(&[Element], &BTreeSet<ElementId>) -> Vec<Element>) -> bool {
        self.commit(action, |scene| {
            let reordered = op(&scene.elements, &scene.selected_ids);
            let changed = reordered.iter().map(|e| e.id).ne(scene.elements.iter().map(|e| e.id));
            scene.elements = reordered;
            changed
        })
    }

    /// Group the selected unlocked elements; the group becomes the selection.
    pub fn group_selected(&mut self) -> Option<ElementId> {
        let mut group_id = None;
        self.commit("group", |scene| {
            let Some(grouped) = group_elements(&scene.elements, &scene.selected_ids) else {
                return false;
            };
            scene.elements = grouped.elements;
            scene.group_children.insert(grouped.group.id, grouped.children);
            scene.selected_ids = [grouped.group.id].into_iter().collect();
            group_id = Some(grouped.group.id);
            true
        });
        group_id
    }

    /// Dissolve every selected group; the restored children become the selection.
    pub fn ungroup_selected(&mut self) -> Vec<ElementId> {
        let mut restored = Vec::new();
        self.commit("ungroup", |scene| {
            let groups: Vec<ElementId> = scene
                .selected_elements()
                .filter(|e| e.is_group() && !e.locked)
                .map(|e| e.id)
                .collect();
            for group_id in groups {
                let children = scene.children_of(group_id).to_vec();
                if let Some(ungrouped) = ungroup_element(&scene.elements, group_id, &children) {
                    scene.elements = ungrouped.elements;
                    scene.group_children.remove(&group_id);
                    scene.selected_ids.remove(&group_id);
                    restored.extend(ungrouped.child_ids);
                }
            }
            if restored.is_empty() {
                return false;
            }
            scene.selected_ids = restored.iter().copied().collect();
            true
        });
        restored
    }

    // --- Viewport ---

    /// Replace the viewport, superseding any running animation.
    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.cancel_animation();
        self.scene.viewport = viewport;
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.set_viewport(self.scene.viewport.panned_by(delta));
    }

    /// Zoom to `zoom` keeping the content under an absolute screen point fixed.
    pub fn zoom_at(&mut self, zoom: f64, screen_point: Point) {
        let local = self.local(screen_point);
        self.set_viewport(self.scene.viewport.zoom_to_point(zoom, local));
    }

    pub fn zoom_in(&mut self, screen_point: Point) {
        let local = self.local(screen_point);
        self.set_viewport(self.scene.viewport.zoom_in(local));
    }

    pub fn zoom_out(&mut self, screen_point: Point) {
        let local = self.local(screen_point);
        self.set_viewport(self.scene.viewport.zoom_out(local));
    }

    pub fn reset_view(&mut self) {
        self.set_viewport(ViewportState::default());
    }

    /// Start animating towards `target`. `now` is on the clock later passed to [`Store::tick`].
    pub fn animate_viewport(&mut self, target: ViewportState, now: Duration) {
        let duration = Duration::from_millis(self.config.animation_duration_ms);
        self.tween = Some(ViewportTween::new(self.scene.viewport, target, duration, now));
    }

    /// Animate so all visible content fits the container.
    pub fn zoom_to_fit(&mut self, now: Duration) {
        let target = match self.scene.bounds() {
            Some(bounds) => ViewportState::fit_to_bounds(bounds, self.container_size, FIT_PADDING),
            None => ViewportState::default(),
        };
        self.animate_viewport(target, now);
    }

    /// Advance the viewport animation. Returns true while more frames are needed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        let frame = tween.tick(now);
        self.scene.viewport = frame.viewport;
        if frame.done {
            self.tween = None;
        }
        !frame.done
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }

    // --- Drag gestures ---

    /// Start a gesture at an absolute screen point.
    ///
    /// Move needs an unlocked selection; resize and rotate need exactly one
    /// selected unlocked element. Returns false if the gesture cannot start.
    pub fn begin_drag(&mut self, mode: DragMode, screen_point: Point) -> bool {
        let pointer = self.local(screen_point);
        let viewport = self.scene.viewport;
        let state = match mode {
            DragMode::Pan => {
                self.cancel_animation();
                DragState::Panning {
                    start_pointer: pointer,
                    start_viewport: viewport,
                }
            }
            DragMode::Move => {
                let origins: Vec<(ElementId, Point)> = self
                    .scene
                    .selected_elements()
                    .filter(|e| !e.locked)
                    .map(|e| (e.id, e.position()))
                    .collect();
                if origins.is_empty() {
                    return false;
                }
                DragState::Moving {
                    start_pointer: pointer,
                    viewport,
                    origins,
                }
            }
            DragMode::Resize(handle) => {
                let Some(element) = self.single_selected() else {
                    return false;
                };
                DragState::Resizing {
                    start_pointer: pointer,
                    viewport,
                    id: element.id,
                    handle,
                    start_bounds: element.bounds(),
                    rotation: element.rotation,
                }
            }
            DragMode::Rotate => {
                let Some(element) = self.single_selected() else {
                    return false;
                };
                let canvas_pointer = viewport.inverse_transform() * pointer;
                DragState::Rotating {
                    viewport,
                    id: element.id,
                    drag: RotationDrag::begin(element.center(), canvas_pointer, element.rotation),
                }
            }
        };
        log::debug!("begin drag: {mode:?}");
        self.drag = state;
        true
    }

    /// Recompute the active gesture for the pointer at an absolute screen point.
    pub fn update_drag(&mut self, screen_point: Point, modifiers: Modifiers) -> bool {
        let pointer = self.local(screen_point);
        match self.drag.update(pointer, modifiers, &self.config) {
            DragUpdate::None => false,
            DragUpdate::Viewport(viewport) => {
                self.scene.viewport = viewport;
                true
            }
            DragUpdate::Positions(positions) => {
                let mut next = self.scene.clone();
                for (id, position) in positions {
                    if let Some(element) = next.get_mut(id) {
                        element.x = position.x;
                        element.y = position.y;
                    }
                }
                self.scene = next;
                true
            }
            DragUpdate::Bounds { id, bounds } => {
                let mut next = self.scene.clone();
                let Some(element) = next.get_mut(id) else {
                    return false;
                };
                element.set_bounds(bounds);
                self.scene = next;
                true
            }
            DragUpdate::Rotation { id, rotation } => {
                let mut next = self.scene.clone();
                let Some(element) = next.get_mut(id) else {
                    return false;
                };
                element.set_rotation(rotation);
                self.scene = next;
                true
            }
        }
    }

    /// Finish the active gesture and discard its captured state.
    pub fn end_drag(&mut self) {
        if let Some(mode) = self.drag.mode() {
            log::debug!("end drag: {mode:?}");
        }
        self.drag = DragState::Idle;
    }

    // --- Export ---

    /// Export with explicit options.
    pub fn export_svg_with(&self, options: &ExportOptions) -> String {
        elements_to_svg(&self.scene.elements, options)
    }

    /// Export all visible elements with the configured padding.
    pub fn export_svg(&self) -> String {
        self.export_svg_with(&ExportOptions {
            padding: self.config.export_padding,
            ..Default::default()
        })
    }

    /// Export only the selection.
    pub fn export_selection_svg(&self) -> String {
        self.export_svg_with(&ExportOptions {
            padding: self.config.export_padding,
            selected_ids: Some(self.scene.selected_ids.clone()),
            ..Default::default()
        })
    }
}

/// Clone an element under a fresh id. Groups get fresh copies of their
/// children (recursively) registered in the scene's side table.
fn copy_with_children(original: &Element, scene: &mut Scene) -> Element {
    let mut copy = original.clone();
    copy.regenerate_id();
    if original.is_group() {
        let originals = scene.children_of(original.id).to_vec();
        let children: Vec<Element> = originals
            .iter()
            .map(|child| copy_with_children(child, scene))
            .collect();
        if let ElementKind::Group { child_ids } = &mut copy.kind {
            *child_ids = children.iter().map(|c| c.id).collect();
        }
        scene.group_children.insert(copy.id, children);
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::SnapSettings;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rectangle, Rect::new(x, y, x + w, y + h))
    }

    fn store_with(elements: Vec<Element>) -> Store {
        let mut store = Store::default();
        for element in elements {
            store.add_element(element);
        }
        store
    }

    #[test]
    fn test_add_element_assigns_unique_id() {
        let mut store = Store::default();
        let el = rect(0.0, 0.0, 10.0, 10.0);
        let first = store.add_element(el.clone());
        let second = store.add_element(el);
        assert_ne!(first, second);
        assert_eq!(store.elements().len(), 2);
    }

    #[test]
    fn test_drop_centers_on_canvas_point() {
        let mut store = Store::default();
        store.set_container(Point::new(100.0, 50.0), Size::new(800.0, 600.0));
        store.set_viewport(ViewportState::new(Vec2::new(20.0, 10.0), 2.0));
        let payload = DropPayload {
            kind: "rectangle".into(),
            label: Some("Card".into()),
            default_width: 80.0,
            default_height: 40.0,
        };
        let id = store.drop_payload(&payload, Point::new(320.0, 260.0)).unwrap();
        let el = store.scene().get(id).unwrap();
        // (320 - 100 - 20) / 2 = 100, (260 - 50 - 10) / 2 = 100
        assert_eq!(el.center(), Point::new(100.0, 100.0));
        assert_eq!(el.name, "Card");
        assert!(store.config().accent_palette.contains(&el.style.fill));
        assert_eq!(store.selected_ids().len(), 1);
    }

    #[test]
    fn test_drop_colors_never_repeat_consecutively() {
        let mut store = Store::default();
        let payload = DropPayload {
            kind: "ellipse".into(),
            label: None,
            default_width: 10.0,
            default_height: 10.0,
        };
        let mut last = String::new();
        for _ in 0..50 {
            let id = store.drop_payload(&payload, Point::ZERO).unwrap();
            let fill = store.scene().get(id).unwrap().style.fill.clone();
            assert_ne!(fill, last);
            last = fill;
        }
    }

    #[test]
    fn test_malformed_drop_is_dropped() {
        let mut store = Store::default();
        assert_eq!(store.drop_json("{oops", Point::ZERO), None);
        assert_eq!(store.drop_json(r#"{"kind": "hexagon"}"#, Point::ZERO), None);
        assert!(store.elements().is_empty());
        let id = store.drop_json(r#"{"kind": "frame", "defaultWidth": 0}"#, Point::ZERO).unwrap();
        assert!((store.scene().get(id).unwrap().width - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_element_respects_lock() {
        let mut store = store_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let id = store.elements()[0].id;
        assert!(store.update_element(id, &ElementPatch { locked: Some(true), ..Default::default() }));
        let moved = store.update_element(id, &ElementPatch { x: Some(50.0), ..Default::default() });
        assert!(!moved);
        assert!(store.update_element(id, &ElementPatch { fill: Some("red".into()), ..Default::default() }));
        assert!(store.update_element(id, &ElementPatch { locked: Some(false), ..Default::default() }));
        assert!(store.update_element(id, &ElementPatch { x: Some(50.0), ..Default::default() }));
        assert!((store.elements()[0].x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_move_skips_locked_and_snaps() {
        let mut a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(50.0, 50.0, 10.0, 10.0);
        a.locked = true;
        let mut store = store_with(vec![a, b]);
        store.set_config(SceneConfig {
            snap: SnapSettings::grid(10.0),
            ..Default::default()
        });
        store.select_all();
        // Locked elements are not selectable through select-all.
        assert_eq!(store.selected_ids().len(), 1);
        let a_id = store.elements()[0].id;
        store.add_to_selection(a_id);
        assert!(store.move_selected(Vec2::new(13.0, 4.0)));
        assert_eq!(store.elements()[0].position(), Point::new(0.0, 0.0));
        assert_eq!(store.elements()[1].position(), Point::new(60.0, 50.0));
    }

    #[test]
    fn test_selection_commands() {
        let mut store = store_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
        let (a, b) = (store.elements()[0].id, store.elements()[1].id);
        assert!(store.select(a));
        assert!(store.toggle_selection(b));
        assert_eq!(store.selected_ids().len(), 2);
        assert!(store.toggle_selection(a));
        assert_eq!(store.selected_ids().iter().copied().collect::<Vec<_>>(), vec![b]);
        assert!(store.clear_selection());
        assert!(!store.clear_selection());
        assert!(!store.select(uuid::Uuid::new_v4()));
        assert!(store.select_in_rect(Rect::new(-1.0, -1.0, 2.0, 2.0)));
        assert!(store.scene().is_selected(a));
    }

    #[test]
    fn test_delete_selected() {
        let mut store = store_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
        let a = store.elements()[0].id;
        store.select(a);
        assert_eq!(store.delete_selected(), 1);
        assert_eq!(store.elements().len(), 1);
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_duplicate_group_copies_children() {
        let mut store = store_with(vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)]);
        store.select_all();
        let group_id = store.group_selected().unwrap();
        let copies = store.duplicate_selected();
        assert_eq!(copies.len(), 1);
        let copy = store.scene().get(copies[0]).unwrap();
        assert_ne!(copy.id, group_id);
        assert!((copy.x - 20.0).abs() < f64::EPSILON);
        let original_children = store.scene().children_of(group_id);
        let copied_children = store.scene().children_of(copy.id);
        assert_eq!(copied_children.len(), 2);
        assert_ne!(copied_children[0].id, original_children[0].id);
        assert_eq!(copy.child_ids(), &[copied_children[0].id, copied_children[1].id]);
        assert!(store.scene().is_selected(copy.id));
    }

    #[test]
    fn test_group_and_ungroup_selection() {
        let mut store = store_with(vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(20.0, 30.0, 10.0, 10.0),
            rect(90.0, 90.0, 5.0, 5.0),
        ]);
        let ids: Vec<ElementId> = store.elements().iter().map(|e| e.id).collect();
        store.select(ids[0]);
        store.add_to_selection(ids[1]);
        let group = store.group_selected().unwrap();
        assert_eq!(store.elements().len(), 2);
        assert_eq!(store.selected_ids().iter().copied().collect::<Vec<_>>(), vec![group]);

        let restored = store.ungroup_selected();
        assert_eq!(restored, vec![ids[0], ids[1]]);
        assert_eq!(store.elements().iter().map(|e| e.id).collect::<Vec<_>>(), ids);
        assert!(store.scene().group_children.is_empty());
        assert_eq!(store.selected_ids().len(), 2);
    }

    #[test]
    fn test_group_with_single_selection_is_noop() {
        let mut store = store_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 5.0, 1.0, 1.0)]);
        let a = store.elements()[0].id;
        store.select(a);
        let before = store.scene().clone();
        assert_eq!(store.group_selected(), None);
        assert_eq!(store.ungroup_selected(), Vec::<ElementId>::new());
        assert_eq!(store.scene(), &before);
    }

    #[test]
    fn test_z_order_commands() {
        let mut store = store_with(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 1.0, 1.0), rect(2.0, 0.0, 1.0, 1.0)]);
        let ids: Vec<ElementId> = store.elements().iter().map(|e| e.id).collect();
        store.select(ids[0]);
        assert!(store.bring_forward());
        assert_eq!(store.elements()[1].id, ids[0]);
        assert!(store.bring_to_front());
        assert_eq!(store.elements()[2].id, ids[0]);
        assert!(!store.bring_to_front());
        assert!(store.send_backward());
        assert!(store.send_to_back());
        assert_eq!(store.elements()[0].id, ids[0]);
    }

    #[test]
    fn test_resize_and_rotate_commands() {
        let mut store = store_with(vec![rect(10.0, 10.0, 100.0, 50.0)]);
        let id = store.elements()[0].id;
        assert!(store.resize_element(id, ResizeHandle::Se, Vec2::new(20.0, 10.0), false));
        assert_eq!(store.elements()[0].bounds(), Rect::new(10.0, 10.0, 130.0, 70.0));
        assert!(store.rotate_element(id, -45.0));
        assert!((store.elements()[0].rotation - 315.0).abs() < 1e-9);
        store.select(id);
        assert!(store.rotate_selected_by(90.0));
        assert!((store.elements()[0].rotation - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_move_is_recomputed_from_start() {
        let mut store = store_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let id = store.elements()[0].id;
        store.select(id);
        assert!(store.begin_drag(DragMode::Move, Point::new(5.0, 5.0)));
        store.update_drag(Point::new(15.0, 5.0), Modifiers::NONE);
        store.update_drag(Point::new(25.0, 15.0), Modifiers::NONE);
        store.update_drag(Point::new(25.0, 15.0), Modifiers::NONE);
        store.end_drag();
        assert_eq!(store.elements()[0].position(), Point::new(20.0, 10.0));
        assert!(store.drag_state().is_idle());
        assert!(!store.update_drag(Point::new(100.0, 100.0), Modifiers::NONE));
    }

    #[test]
    fn test_drag_requires_selection() {
        let mut store = store_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        assert!(!store.begin_drag(DragMode::Move, Point::ZERO));
        assert!(!store.begin_drag(DragMode::Rotate, Point::ZERO));
        assert!(store.begin_drag(DragMode::Pan, Point::ZERO));
    }

    #[test]
    fn test_drag_resize_and_rotate() {
        let mut store = store_with(vec![rect(0.0, 0.0, 100.0, 100.0)]);
        let id = store.elements()[0].id;
        store.select(id);

        assert!(store.begin_drag(DragMode::Resize(ResizeHandle::E), Point::new(100.0, 50.0)));
        store.update_drag(Point::new(150.0, 80.0), Modifiers::NONE);
        store.end_drag();
        assert_eq!(store.elements()[0].bounds(), Rect::new(0.0, 0.0, 150.0, 100.0));

        // Center is (75, 50); start east of it and move to due south.
        assert!(store.begin_drag(DragMode::Rotate, Point::new(175.0, 50.0)));
        store.update_drag(Point::new(75.0, 150.0), Modifiers::NONE);
        store.end_drag();
        assert!((store.elements()[0].rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_handle_at_uses_zoom() {
        let mut store = store_with(vec![rect(0.0, 0.0, 100.0, 100.0)]);
        let id = store.elements()[0].id;
        assert_eq!(store.handle_at(Point::new(100.0, 100.0)), None);
        store.select(id);
        assert_eq!(
            store.handle_at(Point::new(100.0, 100.0)),
            Some((id, HandleKind::Resize(ResizeHandle::Se)))
        );
        store.set_viewport(ViewportState::new(Vec2::ZERO, 2.0));
        assert_eq!(
            store.handle_at(Point::new(200.0, 100.0)),
            Some((id, HandleKind::Resize(ResizeHandle::E)))
        );
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut store = Store::default();
        store.set_container(Point::new(40.0, 30.0), Size::new(800.0, 600.0));
        let screen = Point::new(300.0, 200.0);
        let before = store.screen_to_canvas(screen);
        store.zoom_at(2.5, screen);
        let after = store.screen_to_canvas(screen);
        assert!((before - after).hypot() < 1e-6);
        store.zoom_in(screen);
        assert!((store.viewport().zoom() - 3.0).abs() < f64::EPSILON);
        store.reset_view();
        assert_eq!(store.viewport(), ViewportState::default());
    }

    #[test]
    fn test_zoom_to_fit_animates_and_input_cancels() {
        let mut store = store_with(vec![rect(0.0, 0.0, 200.0, 100.0)]);
        store.set_container(Point::ORIGIN, Size::new(500.0, 300.0));
        let t0 = Duration::from_secs(10);
        store.zoom_to_fit(t0);
        assert!(store.is_animating());
        assert!(store.tick(t0 + Duration::from_millis(100)));
        assert!(!store.tick(t0 + Duration::from_millis(300)));
        assert!(!store.is_animating());
        assert!((store.viewport().zoom() - 2.0).abs() < 1e-9);

        store.zoom_to_fit(t0);
        store.pan_by(Vec2::new(1.0, 1.0));
        assert!(!store.is_animating());
        assert!(!store.tick(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_export_uses_config_padding() {
        let mut store = store_with(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        store.set_config(SceneConfig {
            export_padding: 5.0,
            ..Default::default()
        });
        assert!(store.export_svg().contains(r#"viewBox="0 0 20 20""#));
        assert_eq!(store.export_selection_svg(), crate::svg::EMPTY_SVG);
    }
}

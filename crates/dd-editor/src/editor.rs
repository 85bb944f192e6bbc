//! The editor controller.
//!
//! Owns the scene, view, selection, tools, undo history and bitmap cache.
//! A host feeds it `InputEvent`s and acts on the returned `EventOutcome`:
//! redraw when asked, run the requested effects, and call `render` to get
//! a display list for the attached surface.

use crate::config::{ConfigError, EditorConfig};
use crate::history::History;
use crate::input::{InputEvent, Modifiers};
use crate::interaction::{AxisLock, Interaction};
use crate::outcome::{Effect, EventOutcome, Panels};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{ToolKind, ToolState};
use dd_core::geometry::normalize_rect;
use dd_core::{
    Color, ImageSourceId, Point, Scene, Shape, ShapeId, ShapeKind, Style, SurfaceMetrics, Vec2,
    ViewTransform, ZoomDirection,
};
use dd_render::{
    BitmapCache, DecodeError, Frame, ImageDecoder, Lookup, RasterDecoder, RenderInput, Theme,
    hit_test, hit_test_rect, render_scene,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key that holds the temporary hand tool.
const TEMPORARY_HAND_KEY: &str = " ";

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub id: ShapeId,
    pub display_name: String,
    pub kind: String,
    pub stack_index: usize,
    pub selected: bool,
}

/// A pen press waiting to become a tap.
#[derive(Debug, Clone, Copy)]
struct PendingTap {
    token: u64,
    at: Point,
}

#[derive(Debug, Clone, Copy)]
struct DecodeJob {
    source: ImageSourceId,
    /// Append an image shape once decoded (an import, not a re-decode).
    place: bool,
}

pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    view: ViewTransform,
    /// Selected shapes, in hit order.
    selection: Vec<ShapeId>,
    interaction: Interaction,
    tools: ToolState,
    history: History,
    surface: Option<SurfaceMetrics>,
    theme: Theme,
    panels: Panels,
    cache: BitmapCache,
    decoder: Box<dyn ImageDecoder>,
    /// Encoded bytes of every imported source.
    sources: HashMap<ImageSourceId, Vec<u8>>,
    decode_queue: Vec<DecodeJob>,
    tap: Option<PendingTap>,
    timer_serial: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::build(EditorConfig::default(), Box::new(RasterDecoder))
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_decoder(config, Box::new(RasterDecoder))
    }

    /// Build an editor around a host-supplied decoder. The config is
    /// validated first.
    pub fn with_decoder(
        config: EditorConfig,
        decoder: Box<dyn ImageDecoder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, decoder))
    }

    fn build(config: EditorConfig, decoder: Box<dyn ImageDecoder>) -> Self {
        Self {
            history: History::new(config.history_depth),
            config,
            scene: Scene::new(),
            view: ViewTransform::default(),
            selection: Vec::new(),
            interaction: Interaction::Idle,
            tools: ToolState::default(),
            surface: None,
            theme: Theme::default(),
            panels: Panels::default(),
            cache: BitmapCache::new(),
            decoder,
            sources: HashMap::new(),
            decode_queue: Vec::new(),
            tap: None,
            timer_serial: 0,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Tool that pointer events currently go to.
    pub fn tool(&self) -> ToolKind {
        self.tools.effective()
    }

    pub fn panels(&self) -> Panels {
        self.panels
    }

    pub fn cache(&self) -> &BitmapCache {
        &self.cache
    }

    pub fn surface(&self) -> Option<&SurfaceMetrics> {
        self.surface.as_ref()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // ─── Surface lifecycle ───────────────────────────────────────────────

    pub fn attach_surface(&mut self, metrics: SurfaceMetrics) -> EventOutcome {
        log::debug!(
            "surface attached: {}x{} px",
            metrics.pixel_size.width,
            metrics.pixel_size.height
        );
        self.surface = Some(metrics);
        EventOutcome::redraw()
    }

    /// Drop the surface. Any gesture in progress is abandoned.
    pub fn detach_surface(&mut self) -> EventOutcome {
        let mut outcome = self.cancel_tap();
        outcome.merge(self.abandon_gesture());
        self.surface = None;
        log::debug!("surface detached");
        outcome
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    /// Current scene positions of the selected shapes, in selection order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection
            .iter()
            .filter_map(|id| self.scene.index_of(*id))
            .collect()
    }

    /// Replace the selection. Unknown ids are ignored.
    pub fn select(&mut self, ids: &[ShapeId]) -> bool {
        let next: Vec<ShapeId> = ids
            .iter()
            .copied()
            .filter(|id| self.scene.contains(*id))
            .collect();
        let changed = next != self.selection;
        self.selection = next;
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = !self.selection.is_empty();
        self.selection.clear();
        changed
    }

    /// Forget selected shapes that no longer exist.
    fn prune_selection(&mut self) {
        let scene = &self.scene;
        self.selection.retain(|id| scene.contains(*id));
    }

    /// Layer list, topmost first.
    pub fn layers(&self) -> Vec<LayerEntry> {
        let mut entries: Vec<LayerEntry> = self
            .scene
            .iter()
            .map(|shape| LayerEntry {
                id: shape.id,
                display_name: shape.display_name.clone(),
                kind: shape.kind.tag().to_string(),
                stack_index: shape.stack_index,
                selected: self.selection.contains(&shape.id),
            })
            .collect();
        entries.sort_by(|a, b| b.stack_index.cmp(&a.stack_index));
        entries
    }

    // ─── Scene commands ──────────────────────────────────────────────────

    /// Append a shape on top and record it for undo.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.scene.push(shape);
        self.history.record(id);
        id
    }

    /// Remove the most recently added shape still in the scene.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.scene) {
            Some(shape) => {
                self.prune_selection();
                self.release_images(std::iter::once(&shape));
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let removed: Vec<Shape> = self
            .selection
            .iter()
            .filter_map(|id| self.scene.get_by_id(*id).cloned())
            .collect();
        self.scene.remove_all(&self.selection);
        log::debug!("deleted {} selected shape(s)", removed.len());
        self.selection.clear();
        self.release_images(removed.iter());
        !removed.is_empty()
    }

    /// Layer-list drag and drop, in scene positions.
    pub fn reorder_layer(&mut self, from: usize, to: usize) -> bool {
        let moved = self.scene.reorder(from, to);
        if moved {
            log::debug!("layer reorder {from} -> {to}");
        }
        moved
    }

    pub fn bring_forward(&mut self) -> bool {
        self.scene.bring_forward(&self.selection)
    }

    pub fn send_backward(&mut self) -> bool {
        self.scene.send_backward(&self.selection)
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.scene.bring_to_front(&self.selection)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.scene.send_to_back(&self.selection)
    }

    /// Switch tools. Choosing the image tool asks the host for a file.
    pub fn set_tool(&mut self, kind: ToolKind) -> EventOutcome {
        if !self.interaction.is_idle() {
            log::debug!("tool change to {kind:?} ignored during {}", self.interaction.name());
            return EventOutcome::none();
        }
        self.tools.select(kind);
        if kind == ToolKind::Image {
            return EventOutcome::effect(Effect::OpenImagePicker);
        }
        EventOutcome::none()
    }

    // ─── Images ──────────────────────────────────────────────────────────

    /// Register image bytes and queue their decode. The image shape is
    /// appended once `poll_decodes` has decoded it.
    pub fn import_image(&mut self, bytes: Vec<u8>) -> (ImageSourceId, EventOutcome) {
        let source = ImageSourceId::next();
        log::debug!("import {source:?}: {} bytes", bytes.len());
        self.sources.insert(source, bytes);
        self.cache.mark_pending(source);
        self.decode_queue.push(DecodeJob {
            source,
            place: true,
        });
        (source, EventOutcome::effect(Effect::ScheduleDecode))
    }

    /// Queue decodes for sources a render pass found missing from the cache.
    pub fn request_decodes(&mut self, sources: &[ImageSourceId]) -> EventOutcome {
        let mut outcome = EventOutcome::none();
        for &source in sources {
            if !self.sources.contains_key(&source) {
                // Nothing can ever decode it; fail it so it draws a placeholder.
                if matches!(self.cache.lookup(source), Lookup::Missing) {
                    let _ = self
                        .cache
                        .complete(source, Err(DecodeError::UnknownSource(source)));
                    outcome.redraw = true;
                }
                continue;
            }
            if self.cache.mark_pending(source) {
                self.decode_queue.push(DecodeJob {
                    source,
                    place: false,
                });
            }
        }
        if !self.decode_queue.is_empty() {
            outcome.push(Effect::ScheduleDecode);
        }
        outcome
    }

    /// Imported sources whose encoded bytes are still held for a decode.
    pub fn held_image_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn has_pending_decodes(&self) -> bool {
        !self.decode_queue.is_empty()
    }

    /// Run every queued decode and publish the results.
    pub fn poll_decodes(&mut self) -> EventOutcome {
        if self.decode_queue.is_empty() {
            return EventOutcome::none();
        }
        for job in std::mem::take(&mut self.decode_queue) {
            let result = match self.sources.get(&job.source) {
                Some(bytes) => self.decoder.decode(bytes),
                None => Err(DecodeError::UnknownSource(job.source)),
            };
            match self.cache.complete(job.source, result) {
                Ok(bitmap) => {
                    // The cache entry now stands in for the encoded bytes.
                    self.sources.remove(&job.source);
                    if job.place {
                        let scale = self.config.image_scale;
                        let shape = Shape::image(
                            job.source,
                            self.config.image_origin,
                            bitmap.width as f64 * scale,
                            bitmap.height as f64 * scale,
                        );
                        self.add_shape(shape);
                    }
                }
                Err(err) => {
                    self.sources.remove(&job.source);
                    if job.place {
                        log::warn!("dropping image {:?}: {err}", job.source);
                    }
                }
            }
        }
        EventOutcome::redraw()
    }

    /// Free the bitmap and bytes of image sources no remaining shape uses.
    fn release_images<'a>(&mut self, removed: impl Iterator<Item = &'a Shape>) {
        for shape in removed {
            let ShapeKind::Image { source, .. } = shape.kind else {
                continue;
            };
            let still_used = self
                .scene
                .iter()
                .any(|s| matches!(s.kind, ShapeKind::Image { source: other, .. } if other == source));
            if !still_used {
                self.cache.evict(source);
                self.sources.remove(&source);
                log::debug!("released image {source:?}");
            }
        }
    }

    // ─── Render ──────────────────────────────────────────────────────────

    /// Paint the current state. `None` while no surface is attached.
    pub fn render(&self) -> Option<Frame> {
        let surface = self.surface.as_ref()?;
        let input = RenderInput {
            scene: &self.scene,
            view: &self.view,
            selection: &self.selection,
            marquee: self.interaction.marquee_rect(),
            surface: surface.pixel_size,
            theme: &self.theme,
            selection_margin: self.config.selection_margin,
        };
        Some(render_scene(&input, &self.cache))
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> EventOutcome {
        let Some(surface) = self.surface else {
            log::trace!("no surface; ignoring {event:?}");
            return EventOutcome::none();
        };

        match event {
            InputEvent::PointerDown { pos, modifiers } => {
                self.pointer_down(surface.client_to_surface(*pos), *modifiers)
            }
            InputEvent::PointerMove { pos, modifiers } => {
                self.pointer_move(surface.client_to_surface(*pos), *modifiers)
            }
            InputEvent::PointerUp { pos, modifiers } => {
                self.pointer_up(surface.client_to_surface(*pos), *modifiers)
            }
            InputEvent::Wheel {
                pos,
                delta,
                modifiers,
            } => self.wheel(surface.client_to_surface(*pos), *delta, *modifiers),
            InputEvent::KeyDown {
                key,
                modifiers,
                repeat,
            } => self.key_down(key, *modifiers, *repeat),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
            InputEvent::Resize {
                client_rect,
                pixel_size,
            } => {
                self.surface = Some(SurfaceMetrics::new(*client_rect, *pixel_size));
                EventOutcome::redraw()
            }
            InputEvent::TimerElapsed { token } => self.timer_elapsed(*token),
        }
    }

    /// Run a shortcut action as if its key had been pressed.
    pub fn apply(&mut self, action: ShortcutAction) -> EventOutcome {
        if self.surface.is_none() {
            return EventOutcome::none();
        }
        self.dispatch_action(action)
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(&mut self, at: Point, modifiers: Modifiers) -> EventOutcome {
        if !self.interaction.is_idle() {
            return EventOutcome::none();
        }
        let scene_pt = self.view.surface_to_scene(at);

        match self.tools.effective() {
            ToolKind::Pen => self.begin_stroke(scene_pt),
            ToolKind::Hand => {
                self.interaction = Interaction::Panning { last: at };
                EventOutcome::none()
            }
            ToolKind::Image => EventOutcome::effect(Effect::OpenImagePicker),
            ToolKind::Pointer => self.begin_select(at, scene_pt, modifiers),
        }
    }

    fn pointer_move(&mut self, at: Point, modifiers: Modifiers) -> EventOutcome {
        let scene_pt = self.view.surface_to_scene(at);
        if matches!(self.interaction, Interaction::Drawing { .. }) {
            return self.extend_stroke(scene_pt, modifiers);
        }

        match &mut self.interaction {
            Interaction::Idle | Interaction::Drawing { .. } => EventOutcome::none(),
            Interaction::Panning { last } => {
                let delta = at - *last;
                *last = at;
                self.view.pan_by(delta);
                EventOutcome::redraw()
            }
            Interaction::MovingSelection { start, originals } => {
                // Always relative to gesture start, never cumulative.
                let delta = scene_pt - *start;
                for original in originals.iter() {
                    self.scene.replace_shape(original.translated(delta));
                }
                EventOutcome::redraw()
            }
            Interaction::Marquee { current, .. } => {
                *current = at;
                EventOutcome::redraw()
            }
        }
    }

    fn pointer_up(&mut self, at: Point, modifiers: Modifiers) -> EventOutcome {
        let interaction = std::mem::take(&mut self.interaction);
        match interaction {
            Interaction::Idle => EventOutcome::none(),
            Interaction::Drawing { id, .. } => self.finish_stroke(id),
            Interaction::Panning { .. } => EventOutcome::none(),
            Interaction::MovingSelection { start, originals } => {
                // Commit at the release point, which may differ from the last move.
                let delta = self.view.surface_to_scene(at) - start;
                for original in &originals {
                    self.scene.replace_shape(original.translated(delta));
                }
                log::debug!(
                    "moved {} shape(s) by ({:.1}, {:.1})",
                    originals.len(),
                    delta.x,
                    delta.y
                );
                EventOutcome::redraw()
            }
            Interaction::Marquee { start, .. } => {
                let area = normalize_rect(
                    self.view.surface_to_scene(start),
                    self.view.surface_to_scene(at),
                );
                let hits: Vec<ShapeId> = hit_test_rect(&self.scene, area)
                    .into_iter()
                    .filter_map(|i| self.scene.get(i).map(|s| s.id))
                    .collect();
                log::debug!("marquee {area:?} selected {}", hits.len());
                if modifiers.shift {
                    for id in hits {
                        if !self.selection.contains(&id) {
                            self.selection.push(id);
                        }
                    }
                } else {
                    self.selection = hits;
                }
                EventOutcome::redraw()
            }
        }
    }

    fn begin_select(&mut self, at: Point, scene_pt: Point, modifiers: Modifiers) -> EventOutcome {
        let hits: Vec<ShapeId> = hit_test(&self.scene, scene_pt, self.config.hit_tolerance)
            .into_iter()
            .filter_map(|i| self.scene.get(i).map(|s| s.id))
            .collect();

        let Some(&top) = hits.first() else {
            if !modifiers.shift {
                self.selection.clear();
            }
            self.interaction = Interaction::Marquee {
                start: at,
                current: at,
            };
            return EventOutcome::redraw();
        };

        if modifiers.shift {
            // Shift+click: toggle the topmost hit
            if let Some(pos) = self.selection.iter().position(|id| *id == top) {
                self.selection.remove(pos);
            } else {
                self.selection.push(top);
            }
        } else if !hits.iter().any(|id| self.selection.contains(id)) {
            // Every shape under the pointer, topmost first.
            self.selection = hits;
        }

        if self.selection.is_empty() {
            return EventOutcome::redraw();
        }
        let originals: Vec<Shape> = self
            .selection
            .iter()
            .filter_map(|id| self.scene.get_by_id(*id).cloned())
            .collect();
        self.interaction = Interaction::MovingSelection {
            start: scene_pt,
            originals,
        };
        EventOutcome::redraw()
    }

    // ─── Pen strokes ─────────────────────────────────────────────────────

    fn begin_stroke(&mut self, scene_pt: Point) -> EventOutcome {
        let mut outcome = self.cancel_tap();

        let shape = Shape::polyline(scene_pt).with_style(self.config.pen_style.clone());
        let id = self.add_shape(shape);
        self.interaction = Interaction::Drawing {
            id,
            axis_lock: None,
        };

        self.timer_serial += 1;
        let token = self.timer_serial;
        self.tap = Some(PendingTap {
            token,
            at: scene_pt,
        });
        outcome.push(Effect::StartTimer {
            token,
            delay_ms: self.config.tap_dwell_ms,
        });
        log::trace!("stroke {id} started at {scene_pt:?}");
        outcome.with_redraw(true)
    }

    fn extend_stroke(&mut self, scene_pt: Point, modifiers: Modifiers) -> EventOutcome {
        let Interaction::Drawing { id, axis_lock } = &mut self.interaction else {
            return EventOutcome::none();
        };
        let Some(ShapeKind::Polyline { points }) =
            self.scene.get_by_id_mut(*id).map(|shape| &mut shape.kind)
        else {
            return EventOutcome::none();
        };
        let (Some(&seed), Some(&previous)) = (points.first(), points.last()) else {
            return EventOutcome::none();
        };

        let mut outcome = EventOutcome::none();
        if scene_pt != seed
            && let Some(tap) = self.tap.take()
        {
            outcome.push(Effect::CancelTimer { token: tap.token });
        }

        let next = if modifiers.shift {
            let lock = *axis_lock.get_or_insert_with(|| AxisLock::from_delta(scene_pt - previous));
            lock.snap(previous, scene_pt)
        } else {
            *axis_lock = None;
            scene_pt
        };

        if next != previous {
            points.push(next);
            outcome.redraw = true;
        }
        outcome
    }

    fn finish_stroke(&mut self, id: ShapeId) -> EventOutcome {
        let points = self
            .scene
            .get_by_id(id)
            .and_then(|shape| shape.points())
            .map_or(0, <[Point]>::len);
        if points >= 2 {
            log::debug!("stroke {id} finished with {points} points");
            return EventOutcome::none();
        }
        // A seed with nothing after it. A pending tap timer may still
        // turn this press into a dot.
        self.scene.remove(id);
        self.history.forget(id);
        log::trace!("stroke {id} discarded");
        EventOutcome::redraw()
    }

    fn timer_elapsed(&mut self, token: u64) -> EventOutcome {
        match self.tap {
            Some(tap) if tap.token == token => {
                self.tap = None;
                let color = self.config.pen_style.stroke.unwrap_or(Color::WHITE);
                let dot = Shape::circle(tap.at, self.config.tap_dot_radius).with_style(Style {
                    fill: Some(color),
                    stroke: None,
                    stroke_width: 0.0,
                });
                let id = self.add_shape(dot);
                log::debug!("tap placed {id} at {:?}", tap.at);
                EventOutcome::redraw()
            }
            _ => {
                log::trace!("stale timer {token} ignored");
                EventOutcome::none()
            }
        }
    }

    fn cancel_tap(&mut self) -> EventOutcome {
        match self.tap.take() {
            Some(tap) => EventOutcome::effect(Effect::CancelTimer { token: tap.token }),
            None => EventOutcome::none(),
        }
    }

    /// Leave whatever gesture is active without committing it.
    fn abandon_gesture(&mut self) -> EventOutcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => EventOutcome::none(),
            Interaction::Drawing { id, .. } => self.finish_stroke(id),
            Interaction::MovingSelection { originals, .. } => {
                for original in originals {
                    self.scene.replace_shape(original);
                }
                EventOutcome::redraw()
            }
            Interaction::Panning { .. } | Interaction::Marquee { .. } => EventOutcome::redraw(),
        }
    }

    // ─── Wheel ───────────────────────────────────────────────────────────

    fn wheel(&mut self, at: Point, delta: Vec2, modifiers: Modifiers) -> EventOutcome {
        if modifiers.command() {
            self.zoom_step(at, ZoomDirection::from_wheel(delta.y));
        } else {
            self.view.pan_by(-delta);
        }
        EventOutcome::redraw()
    }

    fn zoom_step(&mut self, anchor: Point, direction: ZoomDirection) {
        self.view.zoom_step(
            anchor,
            direction,
            self.config.zoom_factors(),
            self.config.min_zoom,
            self.config.max_zoom,
        );
        log::trace!("zoom {:.3} pan {:?}", self.view.zoom, self.view.pan);
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn key_down(&mut self, key: &str, modifiers: Modifiers, repeat: bool) -> EventOutcome {
        if key == TEMPORARY_HAND_KEY {
            self.tools.begin_temporary_hand();
            return EventOutcome::none();
        }
        if repeat {
            return EventOutcome::none();
        }
        match ShortcutMap::resolve(key, modifiers) {
            Some(action) => self.dispatch_action(action),
            None => EventOutcome::none(),
        }
    }

    fn key_up(&mut self, key: &str) -> EventOutcome {
        match key {
            TEMPORARY_HAND_KEY => {
                self.tools.end_temporary_hand();
            }
            "Shift" => {
                if let Interaction::Drawing { axis_lock, .. } = &mut self.interaction {
                    *axis_lock = None;
                }
            }
            _ => {}
        }
        EventOutcome::none()
    }

    fn dispatch_action(&mut self, action: ShortcutAction) -> EventOutcome {
        let redraw = |changed: bool| EventOutcome::none().with_redraw(changed);
        match action {
            ShortcutAction::ToolPointer => self.set_tool(ToolKind::Pointer),
            ShortcutAction::ToolPen => self.set_tool(ToolKind::Pen),
            ShortcutAction::ToolHand => self.set_tool(ToolKind::Hand),
            ShortcutAction::ToolImage => self.set_tool(ToolKind::Image),
            ShortcutAction::ToggleLastTool => {
                if self.interaction.is_idle() {
                    self.tools.toggle_last();
                }
                EventOutcome::none()
            }

            ShortcutAction::Undo => redraw(self.undo()),
            ShortcutAction::Delete => redraw(self.delete_selected()),
            ShortcutAction::Deselect => redraw(self.clear_selection()),

            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut => {
                let Some(center) = self.surface.map(|s| s.center()) else {
                    return EventOutcome::none();
                };
                let direction = if action == ShortcutAction::ZoomIn {
                    ZoomDirection::In
                } else {
                    ZoomDirection::Out
                };
                self.zoom_step(center, direction);
                EventOutcome::redraw()
            }
            ShortcutAction::ResetView => {
                self.view.reset();
                EventOutcome::redraw()
            }

            ShortcutAction::SendBackward => redraw(self.send_backward()),
            ShortcutAction::BringForward => redraw(self.bring_forward()),
            ShortcutAction::SendToBack => redraw(self.send_to_back()),
            ShortcutAction::BringToFront => redraw(self.bring_to_front()),

            ShortcutAction::TogglePanels => {
                let both = !(self.panels.left || self.panels.right);
                self.panels = Panels {
                    left: both,
                    right: both,
                };
                EventOutcome::effect(Effect::PanelsChanged(self.panels))
            }
            ShortcutAction::Export => EventOutcome::effect(Effect::Export),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_render::Bitmap;
    use pretty_assertions::assert_eq;

    /// Decodes `[w, h]` into a blank `w×h` bitmap; anything else fails.
    struct FakeDecoder;

    impl ImageDecoder for FakeDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError> {
            match bytes {
                [w, h] => {
                    let (w, h) = (*w as u32, *h as u32);
                    Bitmap::from_rgba8(w, h, vec![0; (w * h * 4) as usize])
                }
                _ => Err(DecodeError::Format("fake".into())),
            }
        }
    }

    fn editor() -> Editor {
        let mut editor =
            Editor::with_decoder(EditorConfig::default(), Box::new(FakeDecoder)).unwrap();
        editor.attach_surface(SurfaceMetrics::unscaled(800.0, 600.0));
        editor
    }

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        editor.handle(&InputEvent::pointer_down(from.0, from.1));
        editor.handle(&InputEvent::pointer_move(to.0, to.1));
        editor.handle(&InputEvent::pointer_up(to.0, to.1));
    }

    #[test]
    fn detached_editor_ignores_input() {
        let mut editor = Editor::default();
        editor.set_tool(ToolKind::Pen);
        let outcome = editor.handle(&InputEvent::pointer_down(10.0, 10.0));
        assert!(outcome.is_empty());
        assert!(editor.scene().is_empty());
        assert!(editor.render().is_none());
    }

    #[test]
    fn constructors_validate_config() {
        let swapped = EditorConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            ..EditorConfig::default()
        };
        let err = Editor::with_decoder(swapped, Box::new(FakeDecoder)).err();
        assert!(matches!(
            err,
            Some(ConfigError::Invalid {
                field: "max_zoom",
                ..
            })
        ));
        assert!(Editor::new(EditorConfig::default()).is_ok());
    }

    #[test]
    fn move_commits_at_release_point() {
        let mut editor = editor();
        let id = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 20.0, 20.0));

        editor.handle(&InputEvent::pointer_down(10.0, 10.0));
        editor.handle(&InputEvent::pointer_move(15.0, 12.0));
        let outcome = editor.handle(&InputEvent::pointer_up(40.0, 30.0));

        assert!(outcome.redraw);
        assert_eq!(
            editor.scene().get_by_id(id).unwrap().position,
            Point::new(30.0, 20.0)
        );
    }

    #[test]
    fn click_selects_every_hit_topmost_first() {
        let mut editor = editor();
        let a = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 100.0, 100.0));
        let b = editor.add_shape(Shape::rect(Point::new(50.0, 50.0), 100.0, 100.0));

        editor.handle(&InputEvent::pointer_down(75.0, 75.0));
        editor.handle(&InputEvent::pointer_up(75.0, 75.0));
        assert_eq!(editor.selection(), &[b, a]);
        assert_eq!(editor.selected_indices(), vec![1, 0]);
    }

    #[test]
    fn shift_click_toggles_topmost() {
        let mut editor = editor();
        let a = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0));
        let b = editor.add_shape(Shape::rect(Point::new(20.0, 0.0), 10.0, 10.0));
        let shift_click = |editor: &mut Editor, x: f64| {
            for event in [
                InputEvent::PointerDown {
                    pos: Point::new(x, 5.0),
                    modifiers: Modifiers::SHIFT,
                },
                InputEvent::PointerUp {
                    pos: Point::new(x, 5.0),
                    modifiers: Modifiers::SHIFT,
                },
            ] {
                editor.handle(&event);
            }
        };

        shift_click(&mut editor, 5.0);
        shift_click(&mut editor, 25.0);
        assert_eq!(editor.selection(), &[a, b]);
        shift_click(&mut editor, 5.0);
        assert_eq!(editor.selection(), &[b]);
    }

    #[test]
    fn pen_drag_draws_polyline() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        let down = editor.handle(&InputEvent::pointer_down(10.0, 10.0));
        assert!(matches!(down.effects[0], Effect::StartTimer { token: 1, .. }));

        let moved = editor.handle(&InputEvent::pointer_move(20.0, 10.0));
        assert_eq!(moved.effects.as_slice(), &[Effect::CancelTimer { token: 1 }]);
        // Duplicate point is skipped.
        editor.handle(&InputEvent::pointer_move(20.0, 10.0));
        editor.handle(&InputEvent::pointer_move(30.0, 15.0));
        editor.handle(&InputEvent::pointer_up(30.0, 15.0));

        assert_eq!(editor.scene().len(), 1);
        let points = editor.scene().shapes()[0].points().unwrap().to_vec();
        assert_eq!(
            points,
            vec![
                Point::new(10.0, 10.0),
                Point::new(20.0, 10.0),
                Point::new(30.0, 15.0)
            ]
        );
        assert!(editor.interaction().is_idle());

        // The cancelled timer firing late does nothing.
        assert!(editor.handle(&InputEvent::TimerElapsed { token: 1 }).is_empty());
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn shift_locks_stroke_to_dominant_axis() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        let shift_move = |x: f64, y: f64| InputEvent::PointerMove {
            pos: Point::new(x, y),
            modifiers: Modifiers::SHIFT,
        };
        editor.handle(&InputEvent::pointer_down(0.0, 0.0));
        editor.handle(&shift_move(10.0, 2.0));
        editor.handle(&shift_move(20.0, 30.0));
        // Releasing Shift clears the lock.
        editor.handle(&InputEvent::key_up("Shift"));
        editor.handle(&InputEvent::pointer_move(25.0, 30.0));
        editor.handle(&InputEvent::pointer_up(25.0, 30.0));

        let points = editor.scene().shapes()[0].points().unwrap().to_vec();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(20.0, 0.0),
                Point::new(25.0, 30.0)
            ]
        );
    }

    #[test]
    fn pen_tap_places_dot_after_dwell() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.handle(&InputEvent::pointer_down(40.0, 40.0));
        editor.handle(&InputEvent::pointer_up(40.0, 40.0));
        assert!(editor.scene().is_empty(), "seed polyline is discarded");

        let fired = editor.handle(&InputEvent::TimerElapsed { token: 1 });
        assert!(fired.redraw);
        let dot = &editor.scene().shapes()[0];
        assert_eq!(dot.kind, ShapeKind::Circle { radius: 3.0 });
        assert_eq!(dot.position, Point::new(40.0, 40.0));

        // Only once.
        assert!(editor.handle(&InputEvent::TimerElapsed { token: 1 }).is_empty());
        assert!(editor.undo());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn new_press_supersedes_pending_tap() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.handle(&InputEvent::pointer_down(40.0, 40.0));
        editor.handle(&InputEvent::pointer_up(40.0, 40.0));
        let second = editor.handle(&InputEvent::pointer_down(60.0, 60.0));
        assert_eq!(second.effects[0], Effect::CancelTimer { token: 1 });
        assert!(matches!(second.effects[1], Effect::StartTimer { token: 2, .. }));
        editor.handle(&InputEvent::pointer_up(60.0, 60.0));

        assert!(editor.handle(&InputEvent::TimerElapsed { token: 1 }).is_empty());
        assert!(editor.handle(&InputEvent::TimerElapsed { token: 2 }).redraw);
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn hand_drag_pans_view() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Hand);
        drag(&mut editor, (100.0, 100.0), (130.0, 90.0));
        assert_eq!(editor.view().pan, Vec2::new(30.0, -10.0));
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn space_holds_temporary_hand() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.handle(&InputEvent::key(" ", Modifiers::NONE));
        assert_eq!(editor.tool(), ToolKind::Hand);
        drag(&mut editor, (0.0, 0.0), (5.0, 5.0));
        assert!(editor.scene().is_empty());
        editor.handle(&InputEvent::key_up(" "));
        assert_eq!(editor.tool(), ToolKind::Pen);
    }

    #[test]
    fn plain_wheel_pans_and_modified_wheel_zooms() {
        let mut editor = editor();
        editor.handle(&InputEvent::Wheel {
            pos: Point::new(0.0, 0.0),
            delta: Vec2::new(0.0, 40.0),
            modifiers: Modifiers::NONE,
        });
        assert_eq!(editor.view().pan, Vec2::new(0.0, -40.0));
        assert_eq!(editor.view().zoom, 1.0);

        editor.handle(&InputEvent::Wheel {
            pos: Point::new(200.0, 100.0),
            delta: Vec2::new(0.0, -1.0),
            modifiers: Modifiers::CTRL,
        });
        assert!((editor.view().zoom - 1.1).abs() < 1e-12);
    }

    #[test]
    fn delete_and_escape() {
        let mut editor = editor();
        let a = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0));
        editor.add_shape(Shape::rect(Point::new(50.0, 0.0), 10.0, 10.0));

        editor.select(&[a]);
        assert!(editor.handle(&InputEvent::key("Escape", Modifiers::NONE)).redraw);
        assert!(editor.selection().is_empty());

        editor.select(&[a]);
        assert!(editor.handle(&InputEvent::key("Delete", Modifiers::NONE)).redraw);
        assert_eq!(editor.scene().len(), 1);
        assert!(editor.selection().is_empty());
        assert!(editor.scene().check_stack_order().is_ok());
    }

    #[test]
    fn z_order_shortcuts_keep_selection() {
        let mut editor = editor();
        let a = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0));
        let b = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0));
        editor.select(&[a]);

        editor.handle(&InputEvent::key("]", Modifiers::CTRL));
        assert_eq!(editor.scene().index_of(a), Some(1));
        assert_eq!(editor.selected_indices(), vec![1]);

        editor.handle(&InputEvent::key(
            "{",
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::NONE
            },
        ));
        assert_eq!(editor.scene().index_of(a), Some(0));
        assert_eq!(editor.scene().index_of(b), Some(1));
    }

    #[test]
    fn host_effects() {
        let mut editor = editor();
        let toggled = editor.handle(&InputEvent::key("\\", Modifiers::CTRL));
        let hidden = Panels {
            left: false,
            right: false,
        };
        assert_eq!(toggled.effects.as_slice(), &[Effect::PanelsChanged(hidden)]);
        assert_eq!(editor.panels(), hidden);

        let export = editor.handle(&InputEvent::key(
            "e",
            Modifiers {
                meta: true,
                shift: true,
                ..Modifiers::NONE
            },
        ));
        assert_eq!(export.effects.as_slice(), &[Effect::Export]);

        let picker = editor.handle(&InputEvent::key("i", Modifiers::NONE));
        assert_eq!(picker.effects.as_slice(), &[Effect::OpenImagePicker]);
        assert_eq!(editor.tool(), ToolKind::Image);
    }

    #[test]
    fn imported_image_lands_at_half_size() {
        let mut editor = editor();
        let (source, outcome) = editor.import_image(vec![40, 20]);
        assert_eq!(outcome.effects.as_slice(), &[Effect::ScheduleDecode]);
        assert!(editor.scene().is_empty(), "nothing until decoded");
        assert!(editor.has_pending_decodes());

        assert!(editor.poll_decodes().redraw);
        let shape = &editor.scene().shapes()[0];
        assert_eq!(
            shape.kind,
            ShapeKind::Image {
                source,
                width: 20.0,
                height: 10.0
            }
        );
        assert_eq!(shape.position, editor.config().image_origin);
        assert!(editor.cache().bitmap(source).is_some());
    }

    #[test]
    fn failed_import_is_dropped() {
        let mut editor = editor();
        let (source, _) = editor.import_image(b"garbage".to_vec());
        editor.poll_decodes();
        assert!(editor.scene().is_empty());
        assert!(matches!(
            editor.cache().lookup(source),
            dd_render::Lookup::Failed(_)
        ));
    }

    #[test]
    fn layers_are_topmost_first() {
        let mut editor = editor();
        let a = editor.add_shape(Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0));
        let b = editor.add_shape(Shape::circle(Point::new(0.0, 0.0), 10.0));
        editor.select(&[a]);

        let layers = editor.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].id, b);
        assert_eq!(layers[0].kind, "circle");
        assert!(!layers[0].selected);
        assert_eq!(layers[1].id, a);
        assert_eq!(layers[1].stack_index, 0);
        assert!(layers[1].selected);
    }

    #[test]
    fn detach_mid_stroke_discards_seed() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.handle(&InputEvent::pointer_down(5.0, 5.0));
        let outcome = editor.detach_surface();
        assert_eq!(outcome.effects.as_slice(), &[Effect::CancelTimer { token: 1 }]);
        assert!(editor.scene().is_empty());
        assert!(editor.interaction().is_idle());
    }
}

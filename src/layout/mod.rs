//! Split-pane geometry and the divider drag state machine.
//!
//! The editor pane's share of the width is kept as a percentage so it
//! survives terminal resizes. Bounds are recomputed from the container
//! width on every drag step, so a pane never shrinks below
//! `min_pane_width` columns while the user is dragging.

use crate::store::StoreAdapter;

pub const DEFAULT_EDITOR_PERCENT: f64 = 50.0;
pub const DEFAULT_MIN_PANE_WIDTH: u16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

/// Horizontal extent of the area the two panes share, in terminal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub left: u16,
    pub width: u16,
}

impl Container {
    pub const fn new(left: u16, width: u16) -> Self {
        Self { left, width }
    }
}

/// Owns the editor/preview split and persists it when a drag ends.
#[derive(Debug)]
pub struct PaneLayout {
    editor_percent: f64,
    state: DragState,
    min_pane_width: u16,
    store: StoreAdapter,
}

impl PaneLayout {
    /// `restored` is the percentage read from the store, already validated.
    pub fn new(store: StoreAdapter, min_pane_width: u16, restored: Option<f64>) -> Self {
        Self {
            editor_percent: restored.unwrap_or(DEFAULT_EDITOR_PERCENT),
            state: DragState::Idle,
            min_pane_width,
            store,
        }
    }

    pub const fn editor_percent(&self) -> f64 {
        self.editor_percent
    }

    pub const fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    pub const fn min_pane_width(&self) -> u16 {
        self.min_pane_width
    }

    /// Pointer pressed on the divider. The split itself does not move yet.
    pub fn pointer_down(&mut self) {
        if self.state == DragState::Idle {
            tracing::debug!(percent = self.editor_percent, "divider drag started");
            self.state = DragState::Dragging;
        }
    }

    /// Follow the pointer while dragging. Returns whether the split changed.
    pub fn pointer_move(&mut self, x: u16, container: Container) -> bool {
        if self.state != DragState::Dragging || container.width == 0 {
            return false;
        }
        let offset = i32::from(x) - i32::from(container.left);
        let raw = f64::from(offset) / f64::from(container.width) * 100.0;
        let next = clamp_percent(raw, self.min_pane_width, container.width);
        if (next - self.editor_percent).abs() < f64::EPSILON {
            return false;
        }
        self.editor_percent = next;
        true
    }

    /// End the drag and persist the final split. Returns whether a drag ended.
    pub fn pointer_up(&mut self) -> bool {
        if self.state != DragState::Dragging {
            return false;
        }
        self.state = DragState::Idle;
        tracing::debug!(percent = self.editor_percent, "divider drag finished");
        self.store.save_editor_percent(self.editor_percent);
        true
    }

    /// Abandon any drag in progress without persisting it.
    pub fn release(&mut self) {
        if self.state == DragState::Dragging {
            tracing::debug!("divider drag abandoned");
        }
        self.state = DragState::Idle;
    }

    /// Column widths `(editor, preview)` for a container `width` wide.
    ///
    /// The two always sum to `width`.
    pub fn split(&self, width: u16) -> (u16, u16) {
        let percent = clamp_percent(self.editor_percent, self.min_pane_width, width);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let editor = ((f64::from(width) * percent / 100.0).round() as u16).min(width);
        (editor, width - editor)
    }
}

/// Clamp a split percentage so both panes keep `min_pane_width` columns.
///
/// When the container is too narrow for two minimum-width panes the split
/// collapses to an even 50/50.
pub fn clamp_percent(raw: f64, min_pane_width: u16, container_width: u16) -> f64 {
    let width = f64::from(container_width);
    let min_width = f64::from(min_pane_width);
    if container_width == 0 || width < 2.0 * min_width {
        return DEFAULT_EDITOR_PERCENT;
    }
    let min_percent = min_width / width * 100.0;
    if raw.is_nan() {
        return DEFAULT_EDITOR_PERCENT;
    }
    raw.clamp(min_percent, 100.0 - min_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EDITOR_PERCENT_KEY, MemoryStore};
    use proptest::prelude::*;

    fn layout_with(medium: &MemoryStore) -> PaneLayout {
        PaneLayout::new(StoreAdapter::new(medium.clone()), 20, None)
    }

    const WIDE: Container = Container::new(0, 200);

    #[test]
    fn test_defaults_to_even_split() {
        let layout = layout_with(&MemoryStore::new());
        assert!((layout.editor_percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(layout.split(100), (50, 50));
    }

    #[test]
    fn test_restored_percent_is_used() {
        let layout = PaneLayout::new(StoreAdapter::new(MemoryStore::new()), 20, Some(30.0));
        assert_eq!(layout.split(200), (60, 140));
    }

    #[test]
    fn test_drag_persists_exactly_once() {
        let medium = MemoryStore::new();
        let mut layout = layout_with(&medium);

        layout.pointer_down();
        assert!(layout.pointer_move(60, WIDE));
        assert!(layout.pointer_move(80, WIDE));
        assert!(layout.pointer_move(100, WIDE));
        assert_eq!(medium.write_count(), 0);

        assert!(layout.pointer_up());
        assert_eq!(medium.write_count(), 1);
        assert_eq!(medium.peek(EDITOR_PERCENT_KEY).as_deref(), Some("50"));
    }

    #[test]
    fn test_pointer_down_does_not_move_divider() {
        let mut layout = layout_with(&MemoryStore::new());
        layout.pointer_down();
        assert!(layout.is_dragging());
        assert!((layout.editor_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_up_without_down_is_noop() {
        let medium = MemoryStore::new();
        let mut layout = layout_with(&medium);
        assert!(!layout.pointer_up());
        assert_eq!(medium.write_count(), 0);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut layout = layout_with(&MemoryStore::new());
        assert!(!layout.pointer_move(150, WIDE));
        assert!((layout.editor_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_width_container_is_ignored() {
        let mut layout = layout_with(&MemoryStore::new());
        layout.pointer_down();
        assert!(!layout.pointer_move(10, Container::new(0, 0)));
        assert!(layout.is_dragging());
    }

    #[test]
    fn test_move_is_relative_to_container_left() {
        let mut layout = layout_with(&MemoryStore::new());
        layout.pointer_down();
        layout.pointer_move(110, Container::new(10, 200));
        assert!((layout.editor_percent() - 50.0).abs() < f64::EPSILON);
        layout.pointer_move(90, Container::new(10, 200));
        assert!((layout.editor_percent() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_clamps_to_minimum_width() {
        let mut layout = layout_with(&MemoryStore::new());
        layout.pointer_down();
        layout.pointer_move(0, WIDE);
        assert!((layout.editor_percent() - 10.0).abs() < 1e-9);
        layout.pointer_move(199, WIDE);
        assert!((layout.editor_percent() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_container_shrinking_mid_drag_raises_minimum() {
        let mut layout = layout_with(&MemoryStore::new());
        layout.pointer_down();
        layout.pointer_move(20, WIDE);
        assert!((layout.editor_percent() - 10.0).abs() < 1e-9);

        let narrow = Container::new(0, 60);
        assert!(layout.pointer_move(0, narrow));
        assert!(layout.editor_percent() >= 20.0 / 60.0 * 100.0 - 1e-9);
        let (editor, preview) = layout.split(60);
        assert!(editor >= 20 && preview >= 20);
    }

    #[test]
    fn test_release_abandons_without_persisting() {
        let medium = MemoryStore::new();
        let mut layout = layout_with(&medium);
        layout.pointer_down();
        layout.pointer_move(120, WIDE);
        layout.release();
        assert!(!layout.is_dragging());
        assert!(!layout.pointer_up());
        assert_eq!(medium.write_count(), 0);
    }

    #[test]
    fn test_store_failure_still_ends_drag() {
        let medium = MemoryStore::new();
        medium.fail_writes(true);
        let mut layout = layout_with(&medium);
        layout.pointer_down();
        layout.pointer_move(120, WIDE);
        assert!(layout.pointer_up());
        assert_eq!(layout.state(), DragState::Idle);
        assert!((layout.editor_percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_container_collapses_to_even_split() {
        assert!((clamp_percent(10.0, 20, 39) - 50.0).abs() < f64::EPSILON);
        assert!((clamp_percent(90.0, 20, 0) - 50.0).abs() < f64::EPSILON);
        assert!((clamp_percent(10.0, 20, 40) - 50.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn prop_clamp_keeps_both_panes_wide_enough(
            raw in -500.0f64..600.0,
            min_width in 0u16..200,
            width in 0u16..2000,
        ) {
            let clamped = clamp_percent(raw, min_width, width);
            if f64::from(width) < 2.0 * f64::from(min_width) || width == 0 {
                prop_assert!((clamped - 50.0).abs() < f64::EPSILON);
            } else {
                let min_percent = f64::from(min_width) / f64::from(width) * 100.0;
                prop_assert!(clamped >= min_percent - 1e-9);
                prop_assert!(clamped <= 100.0 - min_percent + 1e-9);
            }
        }

        #[test]
        fn prop_split_sums_to_width(
            percent in 0.0f64..100.0,
            width in 0u16..2000,
        ) {
            let layout = PaneLayout::new(StoreAdapter::new(MemoryStore::new()), 20, Some(percent));
            let (editor, preview) = layout.split(width);
            prop_assert_eq!(editor + preview, width);
        }
    }
}

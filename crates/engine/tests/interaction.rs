//! End-to-end interaction tests: a real engine wired to in-memory
//! collaborator doubles.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use gridkit_core::column::{ColumnSpec, ColumnVariant};
use gridkit_core::position::CellPosition;
use gridkit_core::row::{Row, RowRef};
use gridkit_core::value::CellValue;

use gridkit_engine::config::{GridConfig, PasteOverflowPolicy};
use gridkit_engine::host::{
    Align, Clipboard, ClipboardError, RowBounds, RowSource, Viewport, Virtualizer,
};
use gridkit_engine::keys::{Key, KeyInput};
use gridkit_engine::navigation::NavDirection;
use gridkit_engine::GridEngine;

// =============================================================================
// Collaborator doubles
// =============================================================================

#[derive(Default)]
struct SourceInner {
    rows: Vec<RowRef>,
    /// Rows appended but not yet visible in `rows` — simulates a data
    /// source that reflects growth asynchronously.
    deferred: Vec<RowRef>,
    next_id: usize,
    waits: usize,
}

#[derive(Clone)]
struct TestSource {
    inner: Rc<RefCell<SourceInner>>,
    can_append: bool,
    can_delete: bool,
    defer_growth: bool,
    text_input: Rc<Cell<bool>>,
}

impl TestSource {
    fn new(rows: Vec<RowRef>) -> Self {
        let next_id = rows.len() + 1;
        Self {
            inner: Rc::new(RefCell::new(SourceInner {
                rows,
                deferred: Vec::new(),
                next_id,
                waits: 0,
            })),
            can_append: false,
            can_delete: false,
            defer_growth: false,
            text_input: Rc::new(Cell::new(false)),
        }
    }

    fn current(&self) -> Vec<RowRef> {
        self.inner.borrow().rows.clone()
    }

    fn replace(&self, rows: Vec<RowRef>) {
        self.inner.borrow_mut().rows = rows;
    }

    fn waits(&self) -> usize {
        self.inner.borrow().waits
    }
}

impl RowSource for TestSource {
    fn rows(&self) -> Vec<RowRef> {
        self.inner.borrow().rows.clone()
    }

    fn on_data_change(&mut self, rows: Vec<RowRef>) {
        self.inner.borrow_mut().rows = rows;
    }

    fn can_append_rows(&self) -> bool {
        self.can_append
    }

    fn append_rows(&mut self, count: usize) {
        let mut inner = self.inner.borrow_mut();
        let fresh: Vec<RowRef> = (0..count)
            .map(|_| {
                let id = format!("r{}", inner.next_id);
                inner.next_id += 1;
                Arc::new(Row::new(id))
            })
            .collect();
        if self.defer_growth {
            inner.deferred.extend(fresh);
        } else {
            inner.rows.extend(fresh);
        }
    }

    fn can_delete_rows(&self) -> bool {
        self.can_delete
    }

    fn delete_rows(&mut self, ids: &[gridkit_core::position::RowId], _indices: &[usize]) {
        let mut inner = self.inner.borrow_mut();
        inner.rows.retain(|r| !ids.contains(&r.id));
    }

    fn is_text_input_context(&self) -> bool {
        self.text_input.get()
    }

    fn wait(&mut self, _delay: std::time::Duration) {
        // Deferred rows land after one poll tick; never actually sleep
        let mut inner = self.inner.borrow_mut();
        inner.waits += 1;
        let landed: Vec<RowRef> = inner.deferred.drain(..).collect();
        inner.rows.extend(landed);
    }
}

#[derive(Clone, Default)]
struct TestClipboard {
    text: Rc<RefCell<Option<String>>>,
    fail: Rc<Cell<bool>>,
}

impl TestClipboard {
    fn contents(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    fn put(&self, text: &str) {
        *self.text.borrow_mut() = Some(text.to_string());
    }
}

impl Clipboard for TestClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        if self.fail.get() {
            return Err(ClipboardError::Denied);
        }
        self.text.borrow().clone().ok_or(ClipboardError::Empty)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail.get() {
            return Err(ClipboardError::Denied);
        }
        *self.text.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scroll {
    By(f64),
    ToIndex(usize, Align),
}

#[derive(Clone, Default)]
struct TestVirtualizer {
    viewport: Viewport,
    rendered: Rc<RefCell<HashMap<usize, RowBounds>>>,
    visible_count: Option<usize>,
    scrolls: Rc<RefCell<Vec<Scroll>>>,
    measures: Rc<Cell<usize>>,
}

impl TestVirtualizer {
    /// Viewport of 120px with a 20px header, 20px rows, rows `first..last`
    /// rendered.
    fn windowed(first: usize, last: usize) -> Self {
        let rendered: HashMap<usize, RowBounds> = (first..=last)
            .map(|i| {
                let top = 20.0 + i as f64 * 20.0;
                (i, RowBounds { top, bottom: top + 20.0 })
            })
            .collect();
        Self {
            viewport: Viewport {
                scroll_top: 0.0,
                height: 120.0,
                header_height: 20.0,
                footer_height: 0.0,
                row_height: 20.0,
            },
            rendered: Rc::new(RefCell::new(rendered)),
            visible_count: Some(5),
            scrolls: Rc::new(RefCell::new(Vec::new())),
            measures: Rc::new(Cell::new(0)),
        }
    }

    fn scroll_log(&self) -> Vec<Scroll> {
        self.scrolls.borrow().clone()
    }
}

impl Virtualizer for TestVirtualizer {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn row_bounds(&self, index: usize) -> Option<RowBounds> {
        self.rendered.borrow().get(&index).copied()
    }

    fn visible_row_count(&self) -> Option<usize> {
        self.visible_count
    }

    fn scroll_by(&mut self, delta: f64) {
        self.scrolls.borrow_mut().push(Scroll::By(delta));
    }

    fn scroll_to_index(&mut self, index: usize, align: Align) {
        self.scrolls.borrow_mut().push(Scroll::ToIndex(index, align));
    }

    fn measure(&mut self) {
        self.measures.set(self.measures.get() + 1);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn skater_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("pick", "Pick", ColumnVariant::Checkbox).non_navigable(),
        ColumnSpec::new("name", "Name", ColumnVariant::Text),
        ColumnSpec::new("trick", "Trick", ColumnVariant::Text),
        ColumnSpec::new("score", "Score", ColumnVariant::Number),
    ]
}

fn skater_rows() -> Vec<RowRef> {
    let data = [
        ("1", "Tony Hawk", "900", 95.0),
        ("2", "Rodney Mullen", "Casper Flip", 99.0),
        ("3", "Elissa Steamer", "Frontside Flip", 91.0),
        ("4", "Bob Burnquist", "Fakie 900", 92.0),
    ];
    data.iter()
        .map(|(id, name, trick, score)| {
            Arc::new(
                Row::new(*id)
                    .with_cell("name", CellValue::Text((*name).into()))
                    .with_cell("trick", CellValue::Text((*trick).into()))
                    .with_cell("score", CellValue::Number(*score)),
            )
        })
        .collect()
}

struct Rig {
    engine: GridEngine,
    source: TestSource,
    clipboard: TestClipboard,
    virtualizer: TestVirtualizer,
}

fn rig_with(source: TestSource, config: GridConfig) -> Rig {
    let clipboard = TestClipboard::default();
    let virtualizer = TestVirtualizer::windowed(0, 3);
    let engine = GridEngine::new(
        skater_columns(),
        config,
        Box::new(source.clone()),
        Box::new(virtualizer.clone()),
        Box::new(clipboard.clone()),
    );
    Rig { engine, source, clipboard, virtualizer }
}

fn rig() -> Rig {
    rig_with(TestSource::new(skater_rows()), GridConfig::default())
}

fn pos(row: usize, col: &str) -> CellPosition {
    CellPosition::new(row, col)
}

fn text_of(rows: &[RowRef], row: usize, col: &str) -> String {
    rows[row].value(&col.into()).clipboard_text()
}

// =============================================================================
// Selection & pointer handlers
// =============================================================================

#[test]
fn test_drag_selection_rectangle() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(1, "name"), false);
    assert!(rig.engine.state().selection.is_selecting);
    rig.engine.on_cell_mouse_enter(pos(3, "score"));
    rig.engine.on_cell_mouse_up();

    let state = rig.engine.state();
    assert!(!state.selection.is_selecting);
    assert_eq!(state.selection.selected_cells.len(), 9);
    assert!(state.is_cell_selected(&pos(2, "trick")));
    assert!(!state.is_cell_selected(&pos(0, "name")));
    // The gutter column never joins a range
    assert!(!state.is_cell_selected(&pos(2, "pick")));
}

#[test]
fn test_shift_click_extends_from_original_anchor() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(2, "trick"));
    rig.engine.on_cell_mouse_down(pos(0, "name"), true);
    // Anchor stays at the original click, not at the shift-click corner
    let range = rig.engine.state().selection.range.clone().unwrap();
    assert_eq!(range.start, pos(2, "trick"));
    assert_eq!(range.end, pos(0, "name"));
    assert!(rig.engine.state().is_cell_selected(&pos(1, "name")));
}

#[test]
fn test_row_and_cell_selection_are_mutually_exclusive() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(0, "name"), false);
    rig.engine.on_cell_mouse_up();
    rig.engine.on_row_select("2".into(), false);
    assert!(rig.engine.state().selection.is_empty());
    assert!(rig.engine.state().is_row_selected(&"2".into()));

    rig.engine.on_cell_click(pos(0, "name"));
    assert!(rig.engine.state().selected_rows.is_empty());
    assert!(rig.engine.state().is_cell_selected(&pos(0, "name")));
}

#[test]
fn test_column_click_selects_column() {
    let mut rig = rig();
    rig.engine.on_column_click("trick".into());
    let state = rig.engine.state();
    assert_eq!(state.selection.selected_cells.len(), 4);
    assert_eq!(state.focused, Some(pos(0, "trick")));
    // Gutter header: no-op
    rig.engine.on_column_click("pick".into());
    assert_eq!(rig.engine.state().focused, Some(pos(0, "trick")));
}

#[test]
fn test_one_notification_per_gesture() {
    let mut rig = rig();
    let notifications = Rc::new(Cell::new(0));
    let seen = notifications.clone();
    rig.engine.subscribe(move |_| seen.set(seen.get() + 1));

    // Click mutates focus, editing, selection, and row selection — one update
    rig.engine.on_cell_click(pos(1, "trick"));
    assert_eq!(notifications.get(), 1);
    // Re-click with identical outcome: nothing to observe
    rig.engine.on_cell_click(pos(1, "trick"));
    assert_eq!(notifications.get(), 1);
}

// =============================================================================
// Keyboard navigation
// =============================================================================

#[test]
fn test_arrow_clamp_is_idempotent() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(0, "name"));
    rig.engine.navigate(NavDirection::End, false);
    assert_eq!(rig.engine.state().focused, Some(pos(0, "score")));
    for _ in 0..3 {
        rig.engine.navigate(NavDirection::Right, false);
        assert_eq!(rig.engine.state().focused, Some(pos(0, "score")));
    }
}

#[test]
fn test_ctrl_home_lands_on_first_navigable() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(3, "score"));
    rig.engine.navigate(NavDirection::CtrlHome, false);
    assert_eq!(rig.engine.state().focused, Some(pos(0, "name")));
}

#[test]
fn test_shift_arrow_extends_then_tab_collapses() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(1, "name"));
    rig.engine.handle_key(KeyInput::shifted(Key::ArrowDown));
    rig.engine.handle_key(KeyInput::shifted(Key::ArrowRight));
    let state = rig.engine.state();
    assert_eq!(state.selection.selected_cells.len(), 4);
    assert_eq!(state.selection.range.as_ref().unwrap().start, pos(1, "name"));
    // Focus stayed on the anchor while extending
    assert_eq!(state.focused, Some(pos(1, "name")));

    // Tab shares the direction code but never extends
    rig.engine.handle_key(KeyInput::shifted(Key::Tab));
    let state = rig.engine.state();
    assert_eq!(state.selection.selected_cells.len(), 1);
}

#[test]
fn test_rtl_swaps_physical_arrows() {
    let config = GridConfig { right_to_left: true, ..GridConfig::default() };
    let mut rig = rig_with(TestSource::new(skater_rows()), config);
    rig.engine.on_cell_click(pos(0, "trick"));
    rig.engine.navigate(NavDirection::Left, false);
    assert_eq!(rig.engine.state().focused, Some(pos(0, "score")));
}

#[test]
fn test_single_step_fully_visible_does_not_scroll() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(1, "name"));
    rig.virtualizer.scrolls.borrow_mut().clear();
    rig.engine.navigate(NavDirection::Down, false);
    assert_eq!(rig.engine.state().focused, Some(pos(2, "name")));
    assert!(rig.virtualizer.scroll_log().is_empty());
}

#[test]
fn test_single_step_partially_visible_nudges_by_overflow() {
    // Row 3 renders at [80, 100]; shrink the window so it pokes out 11px
    let mut rig = rig();
    rig.virtualizer.viewport.height = 90.0;
    let virt = rig.virtualizer.clone();
    let mut engine = GridEngine::new(
        skater_columns(),
        GridConfig::default(),
        Box::new(rig.source.clone()),
        Box::new(virt.clone()),
        Box::new(rig.clipboard.clone()),
    );
    engine.on_cell_click(pos(2, "name"));
    virt.scrolls.borrow_mut().clear();
    engine.navigate(NavDirection::Down, false);
    // visible bottom = 0 + 90 - 0 - 1 = 89; row bottom = 100 → overflow 11
    assert_eq!(virt.scroll_log(), vec![Scroll::By(11.0)]);
}

#[test]
fn test_single_step_unrendered_scrolls_one_row_height() {
    let mut rig = rig();
    // Row 4 exists in data but pretend more rows; only 0..=3 rendered
    rig.source.replace({
        let mut rows = skater_rows();
        rows.push(Arc::new(Row::new("5").with_cell("name", CellValue::Text("Daewon Song".into()))));
        rows
    });
    rig.engine.on_cell_click(pos(3, "name"));
    rig.virtualizer.scrolls.borrow_mut().clear();
    rig.engine.navigate(NavDirection::Down, false);
    // Focus moves immediately so the ring shows as soon as the row mounts
    assert_eq!(rig.engine.state().focused, Some(pos(4, "name")));
    assert_eq!(rig.virtualizer.scroll_log(), vec![Scroll::By(20.0)]);
}

#[test]
fn test_page_down_delegates_and_refocuses_next_frame() {
    let mut rig = rig();
    let notifications = Rc::new(Cell::new(0));
    let seen = notifications.clone();
    rig.engine.subscribe(move |_| seen.set(seen.get() + 1));

    rig.engine.on_cell_click(pos(0, "name"));
    rig.virtualizer.scrolls.borrow_mut().clear();
    rig.engine.handle_key(KeyInput::plain(Key::PageDown));
    assert_eq!(rig.engine.state().focused, Some(pos(3, "name")));
    assert_eq!(
        rig.virtualizer.scroll_log(),
        vec![Scroll::ToIndex(3, Align::End)]
    );

    // The next frame re-applies focus with a forced notification
    let before = notifications.get();
    rig.engine.on_frame();
    assert_eq!(notifications.get(), before + 1);
    // Drained: a second frame is quiet
    rig.engine.on_frame();
    assert_eq!(notifications.get(), before + 1);
}

#[test]
fn test_page_step_uses_fallback_when_viewport_unknown() {
    let source = TestSource::new(
        (0..30)
            .map(|i| Arc::new(Row::new(format!("r{}", i))))
            .collect(),
    );
    let mut rig = rig_with(source, GridConfig::default());
    rig.virtualizer.visible_count = None;
    let mut engine = GridEngine::new(
        skater_columns(),
        GridConfig::default(),
        Box::new(rig.source.clone()),
        Box::new(rig.virtualizer.clone()),
        Box::new(rig.clipboard.clone()),
    );
    engine.on_cell_click(pos(0, "name"));
    engine.navigate(NavDirection::PageDown, false);
    assert_eq!(engine.state().focused, Some(pos(10, "name")));
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_editing_implies_focus() {
    let mut rig = rig();
    rig.engine.start_editing(pos(2, "trick"));
    let state = rig.engine.state();
    assert_eq!(state.editing, Some(pos(2, "trick")));
    assert_eq!(state.focused, Some(pos(2, "trick")));

    // Gutter cells cannot edit
    rig.engine.stop_editing();
    rig.engine.start_editing(pos(2, "pick"));
    assert_eq!(rig.engine.state().editing, None);
}

#[test]
fn test_commit_replaces_only_the_touched_row() {
    let mut rig = rig();
    let before = rig.source.current();
    rig.engine.start_editing(pos(0, "trick"));
    rig.engine.commit_value(CellValue::Text("McTwist".into()));

    let after = rig.source.current();
    assert_eq!(text_of(&after, 0, "trick"), "McTwist");
    assert!(!Arc::ptr_eq(&after[0], &before[0]));
    for i in 1..4 {
        assert!(Arc::ptr_eq(&after[i], &before[i]));
    }
    assert_eq!(rig.engine.state().editing, None);
}

#[test]
fn test_delete_selection_clears_to_variant_empties() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(0, "trick"), false);
    rig.engine.on_cell_mouse_enter(pos(1, "score"));
    rig.engine.on_cell_mouse_up();
    rig.engine.handle_key(KeyInput::plain(Key::Delete));

    let rows = rig.source.current();
    assert_eq!(rows[0].value(&"trick".into()), CellValue::Text(String::new()));
    assert_eq!(rows[1].value(&"score".into()), CellValue::Null);
    assert_eq!(text_of(&rows, 0, "name"), "Tony Hawk"); // outside selection

    // One undo restores the whole batch
    rig.engine.undo();
    let rows = rig.source.current();
    assert_eq!(text_of(&rows, 0, "trick"), "900");
    assert_eq!(rows[1].value(&"score".into()), CellValue::Number(99.0));
}

// =============================================================================
// Clipboard
// =============================================================================

#[test]
fn test_copy_focused_cell() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(0, "name"));
    rig.engine.copy();
    assert_eq!(rig.clipboard.contents().as_deref(), Some("Tony Hawk"));
    assert_eq!(
        rig.engine.state().status_message.as_deref(),
        Some("Copied to clipboard")
    );
}

#[test]
fn test_copy_selection_serializes_rows_by_columns() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(0, "name"), false);
    rig.engine.on_cell_mouse_enter(pos(1, "score"));
    rig.engine.on_cell_mouse_up();
    rig.engine.copy();
    assert_eq!(
        rig.clipboard.contents().as_deref(),
        Some("Tony Hawk\t900\t95\nRodney Mullen\tCasper Flip\t99")
    );
}

#[test]
fn test_copy_failure_leaves_state_unchanged() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(0, "name"));
    rig.clipboard.fail.set(true);
    rig.engine.copy();
    assert_eq!(rig.clipboard.contents(), None);
    assert_eq!(
        rig.engine.state().status_message.as_deref(),
        Some("Copy failed: clipboard access denied")
    );
}

#[test]
fn test_copy_round_trips_through_parse_tsv() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(0, "name"), false);
    rig.engine.on_cell_mouse_enter(pos(3, "score"));
    rig.engine.on_cell_mouse_up();
    rig.engine.copy();

    let text = rig.clipboard.contents().unwrap();
    let parsed = gridkit_engine::clipboard::parse_tsv(&text, 3);
    let rows = rig.source.current();
    for (r, parsed_row) in parsed.iter().enumerate() {
        assert_eq!(parsed_row[0], text_of(&rows, r, "name"));
        assert_eq!(parsed_row[1], text_of(&rows, r, "trick"));
        assert_eq!(parsed_row[2], text_of(&rows, r, "score"));
    }
}

#[test]
fn test_paste_coerces_by_variant_and_selects_written_rect() {
    let mut rig = rig();
    rig.clipboard.put("Daewon Song\tDarkslide\t97\nChad Muska\tOllie\tnot a number");
    rig.engine.on_cell_click(pos(2, "name"));
    rig.engine.paste();

    let rows = rig.source.current();
    assert_eq!(text_of(&rows, 2, "name"), "Daewon Song");
    assert_eq!(rows[2].value(&"score".into()), CellValue::Number(97.0));
    // Malformed number coerces to null; the row still lands
    assert_eq!(rows[3].value(&"score".into()), CellValue::Null);
    assert_eq!(text_of(&rows, 3, "trick"), "Ollie");

    // Selection covers exactly the written rectangle
    let state = rig.engine.state();
    assert_eq!(state.focused, Some(pos(2, "name")));
    assert_eq!(state.selection.selected_cells.len(), 6);
    assert!(state.is_cell_selected(&pos(3, "score")));
    assert!(!state.is_cell_selected(&pos(1, "name")));
}

#[test]
fn test_paste_truncates_silently_without_appender() {
    let mut rig = rig();
    rig.clipboard.put("a\nb\nc\nd");
    rig.engine.on_cell_click(pos(2, "trick"));
    rig.engine.paste();

    let rows = rig.source.current();
    assert_eq!(rows.len(), 4);
    assert_eq!(text_of(&rows, 2, "trick"), "a");
    assert_eq!(text_of(&rows, 3, "trick"), "b");
}

#[test]
fn test_paste_auto_grows_with_deferred_poll() {
    let mut source = TestSource::new(skater_rows());
    source.can_append = true;
    source.defer_growth = true;
    let config = GridConfig {
        paste_overflow: PasteOverflowPolicy::AutoGrow,
        ..GridConfig::default()
    };
    let mut rig = rig_with(source, config);

    rig.clipboard.put("a\nb\nc");
    rig.engine.on_cell_click(pos(3, "trick"));
    rig.engine.paste();

    let rows = rig.source.current();
    assert_eq!(rows.len(), 6);
    assert_eq!(text_of(&rows, 4, "trick"), "b");
    assert_eq!(text_of(&rows, 5, "trick"), "c");
    // Growth landed via the bounded poll, not synchronously
    assert!(rig.source.waits() >= 1);

    // Undoing the paste, then the growth, returns to the original shape
    rig.engine.undo(); // cells
    rig.engine.undo(); // rows added
    assert_eq!(rig.source.current().len(), 4);
}

#[test]
fn test_paste_overflow_confirm_defers_until_confirmed() {
    let mut source = TestSource::new(skater_rows());
    source.can_append = true;
    let config = GridConfig {
        paste_overflow: PasteOverflowPolicy::Confirm,
        ..GridConfig::default()
    };
    let mut rig = rig_with(source, config);

    rig.clipboard.put("a\nb\nc");
    rig.engine.on_cell_click(pos(3, "trick"));
    rig.engine.paste();

    // Nothing written yet; the dialog holds the payload
    let state = rig.engine.state();
    assert!(state.paste_dialog.open);
    assert_eq!(state.paste_dialog.rows_needed, 2);
    assert_eq!(state.paste_dialog.clipboard_text, "a\nb\nc");
    assert_eq!(text_of(&rig.source.current(), 3, "trick"), "Fakie 900");

    rig.engine.confirm_paste();
    let rows = rig.source.current();
    assert_eq!(rows.len(), 6);
    assert_eq!(text_of(&rows, 5, "trick"), "c");
    assert!(!rig.engine.state().paste_dialog.open);
}

#[test]
fn test_close_paste_dialog_discards_payload() {
    let mut source = TestSource::new(skater_rows());
    source.can_append = true;
    let config = GridConfig {
        paste_overflow: PasteOverflowPolicy::Confirm,
        ..GridConfig::default()
    };
    let mut rig = rig_with(source, config);

    rig.clipboard.put("a\nb\nc");
    rig.engine.on_cell_click(pos(3, "trick"));
    rig.engine.paste();
    rig.engine.close_paste_dialog();
    assert_eq!(rig.engine.state().paste_dialog.clipboard_text, "");
    assert_eq!(rig.source.current().len(), 4);
}

#[test]
fn test_cut_paste_clears_original_once() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(0, "name"));
    rig.engine.copy();
    assert_eq!(rig.clipboard.contents().as_deref(), Some("Tony Hawk"));

    rig.engine.cut();
    // Cut leaves the clipboard content unchanged and the cell intact
    assert_eq!(rig.clipboard.contents().as_deref(), Some("Tony Hawk"));
    assert_eq!(text_of(&rig.source.current(), 0, "name"), "Tony Hawk");
    assert!(rig.engine.state().is_cell_cut(&pos(0, "name")));

    // Pasting the cut payload elsewhere completes the move
    rig.engine.on_cell_click(pos(2, "trick"));
    rig.engine.paste();
    let rows = rig.source.current();
    assert_eq!(text_of(&rows, 2, "trick"), "Tony Hawk");
    assert_eq!(text_of(&rows, 0, "name"), "");
    assert!(rig.engine.state().cut_cells.is_empty());

    // A second paste is an ordinary copy-paste: nothing else clears
    rig.engine.on_cell_click(pos(3, "trick"));
    rig.engine.paste();
    let rows = rig.source.current();
    assert_eq!(text_of(&rows, 3, "trick"), "Tony Hawk");
    assert_eq!(text_of(&rows, 2, "trick"), "Tony Hawk");
}

#[test]
fn test_paste_of_unrelated_content_does_not_complete_cut() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(0, "name"));
    rig.engine.cut();
    rig.clipboard.put("external content");
    rig.engine.on_cell_click(pos(2, "trick"));
    rig.engine.paste();

    // The cut source survives; only the marking clears
    assert_eq!(text_of(&rig.source.current(), 0, "name"), "Tony Hawk");
    assert!(rig.engine.state().cut_cells.is_empty());
}

// =============================================================================
// Undo / redo
// =============================================================================

#[test]
fn test_burst_of_edits_undoes_to_pre_burst_value() {
    let mut rig = rig();
    for value in ["9", "90", "900 again"] {
        rig.engine.start_editing(pos(0, "trick"));
        rig.engine.commit_value(CellValue::Text(value.into()));
    }
    assert!(rig.engine.can_undo());

    rig.engine.undo();
    assert_eq!(text_of(&rig.source.current(), 0, "trick"), "900");
    assert!(!rig.engine.can_undo());
    assert_eq!(
        rig.engine.state().status_message.as_deref(),
        Some("Undid 1 cell edit(s)")
    );

    rig.engine.undo();
    assert_eq!(
        rig.engine.state().status_message.as_deref(),
        Some("Nothing to undo")
    );
}

#[test]
fn test_row_delete_undo_survives_resort() {
    let mut source = TestSource::new(skater_rows());
    source.can_delete = true;
    let mut rig = rig_with(source, GridConfig::default());

    rig.engine.on_row_select("2".into(), false);
    rig.engine.on_row_select("4".into(), true);
    rig.engine.delete_selected_rows();
    assert_eq!(rig.source.current().len(), 2);

    // External resort of the survivors
    let mut resorted = rig.source.current();
    resorted.reverse();
    rig.source.replace(resorted);
    rig.engine.data_changed();

    rig.engine.undo();
    let current = rig.source.current();
    let ids: Vec<&str> = current.iter().map(|r| r.id.as_str()).collect();
    // Deleted rows return to their original indices in the resorted list
    assert_eq!(ids, vec!["3", "2", "1", "4"]);
}

#[test]
fn test_undo_chord_defers_to_text_inputs() {
    let mut rig = rig();
    rig.engine.start_editing(pos(0, "trick"));
    rig.engine.commit_value(CellValue::Text("X".into()));

    rig.source.text_input.set(true);
    let consumed = rig.engine.handle_key(KeyInput::primary(Key::Char('z')));
    assert!(!consumed);
    assert_eq!(text_of(&rig.source.current(), 0, "trick"), "X");

    rig.source.text_input.set(false);
    assert!(rig.engine.handle_key(KeyInput::primary(Key::Char('z'))));
    assert_eq!(text_of(&rig.source.current(), 0, "trick"), "900");

    let mut redo = KeyInput::primary(Key::Char('z'));
    redo.shift = true;
    assert!(rig.engine.handle_key(redo));
    assert_eq!(text_of(&rig.source.current(), 0, "trick"), "X");
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_search_matches_row_major_and_wraps() {
    let mut rig = rig();
    rig.engine.open_search();
    rig.engine.set_search_query("flip");

    let state = rig.engine.state();
    assert_eq!(state.search.matches, vec![pos(1, "trick"), pos(2, "trick")]);
    assert_eq!(state.search.match_index, Some(0));
    assert!(state.is_active_search_match(&pos(1, "trick")));

    rig.engine.next_search_match();
    assert_eq!(rig.engine.state().focused, Some(pos(2, "trick")));
    rig.engine.next_search_match();
    // Wraparound
    assert_eq!(rig.engine.state().search.match_index, Some(0));
    assert_eq!(rig.engine.state().focused, Some(pos(1, "trick")));
}

#[test]
fn test_search_refreshes_on_data_change() {
    let mut rig = rig();
    rig.engine.open_search();
    rig.engine.set_search_query("900");
    assert_eq!(rig.engine.state().search.matches.len(), 2);

    rig.engine.start_editing(pos(0, "trick"));
    rig.engine.commit_value(CellValue::Text("McTwist".into()));
    assert_eq!(rig.engine.state().search.matches, vec![pos(3, "trick")]);
}

// =============================================================================
// Dialogs & menus
// =============================================================================

#[test]
fn test_context_menu_coordinates_persist_across_close() {
    let mut rig = rig();
    rig.engine.on_cell_context_menu(pos(1, "trick"), 240.0, 96.0);
    let state = rig.engine.state();
    assert!(state.context_menu.open);
    assert!(state.is_cell_selected(&pos(1, "trick")));

    rig.engine.close_context_menu();
    let menu = &rig.engine.state().context_menu;
    assert!(!menu.open);
    assert_eq!((menu.x, menu.y), (240.0, 96.0));
}

#[test]
fn test_context_menu_inside_selection_keeps_it() {
    let mut rig = rig();
    rig.engine.on_cell_mouse_down(pos(0, "name"), false);
    rig.engine.on_cell_mouse_enter(pos(2, "score"));
    rig.engine.on_cell_mouse_up();
    rig.engine.on_cell_context_menu(pos(1, "trick"), 10.0, 10.0);
    assert_eq!(rig.engine.state().selection.selected_cells.len(), 9);
}

// =============================================================================
// External data changes
// =============================================================================

#[test]
fn test_data_changed_clamps_focus_and_remeasures() {
    let mut rig = rig();
    rig.engine.on_cell_click(pos(3, "name"));
    rig.source.replace(rig.source.current()[..2].to_vec());
    let before = rig.virtualizer.measures.get();
    rig.engine.data_changed();
    assert_eq!(rig.engine.state().focused, Some(pos(1, "name")));
    assert_eq!(rig.virtualizer.measures.get(), before + 1);
}

#[test]
fn test_empty_grid_select_all_is_empty() {
    let mut rig = rig();
    rig.source.replace(Vec::new());
    rig.engine.data_changed();
    rig.engine.select_all();
    assert!(rig.engine.state().selection.is_empty());
    rig.engine.navigate(NavDirection::Down, false);
    assert_eq!(rig.engine.state().focused, None);
}

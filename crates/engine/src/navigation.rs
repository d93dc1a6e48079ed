//! Keyboard navigation and scroll-into-view coordination.
//!
//! Rows are virtualized: a target row may have a rendered element, a
//! partially visible one, or none at all. Single-row steps therefore nudge
//! the scroll offset by exactly the overflow instead of re-aligning the
//! whole viewport (which visibly janks on arrow keys), while multi-row
//! jumps delegate to the virtualizer's scroll-to-index and re-apply focus
//! on the next frame once the target row has had a chance to mount.

use gridkit_core::position::CellPosition;
use gridkit_core::selection::select_range;
use rustc_hash::FxHashSet;

use crate::engine::GridEngine;
use crate::host::Align;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    CtrlHome,
    CtrlEnd,
    PageUp,
    PageDown,
}

impl GridEngine {
    /// Move or extend focus by one directional command.
    ///
    /// `extend` grows the selection from its original anchor and leaves
    /// focus in place; a plain move collapses selection to the target.
    pub fn navigate(&mut self, direction: NavDirection, extend: bool) {
        if self.store.state().is_editing() {
            return;
        }
        let row_count = self.row_count();
        let nav_count = self.columns.navigable_count();
        if row_count == 0 || nav_count == 0 {
            return;
        }

        // First focus: land on the top-left navigable cell
        let current = if extend {
            self.store
                .state()
                .selection
                .range
                .as_ref()
                .map(|r| r.end.clone())
                .or_else(|| self.store.state().focused.clone())
        } else {
            self.store.state().focused.clone()
        };
        let Some(current) = current else {
            let first = self.columns.first_navigable().expect("nav_count > 0").id.clone();
            let pos = CellPosition::new(0, first);
            self.store.begin_batch();
            self.store.set_focused(Some(pos.clone()));
            self.store
                .set_selection(select_range(&self.columns, pos.clone(), pos, false));
            self.store.end_batch();
            return;
        };
        let Some(current_col) = self.columns.navigable_index_of(&current.column_id) else {
            return;
        };

        // Physical left/right swap under right-to-left layout
        let direction = if self.config.right_to_left {
            match direction {
                NavDirection::Left => NavDirection::Right,
                NavDirection::Right => NavDirection::Left,
                other => other,
            }
        } else {
            direction
        };

        let page = self
            .virtualizer
            .visible_row_count()
            .unwrap_or(self.config.page_fallback_rows)
            .max(1);
        let last_row = row_count - 1;
        let last_col = nav_count - 1;
        let row = current.row_index;

        let (target_row, target_col) = match direction {
            NavDirection::Up => (row.saturating_sub(1), current_col),
            NavDirection::Down => ((row + 1).min(last_row), current_col),
            NavDirection::Left => (row, current_col.saturating_sub(1)),
            NavDirection::Right => (row, (current_col + 1).min(last_col)),
            NavDirection::Home => (row, 0),
            NavDirection::End => (row, last_col),
            NavDirection::CtrlHome => (0, 0),
            NavDirection::CtrlEnd => (last_row, last_col),
            NavDirection::PageUp => (row.saturating_sub(page), current_col),
            NavDirection::PageDown => ((row + page).min(last_row), current_col),
        };

        let target_id = self
            .columns
            .navigable_at(target_col)
            .expect("clamped to navigable range")
            .id
            .clone();
        let target = CellPosition::new(target_row, target_id);

        self.store.begin_batch();
        if extend {
            let anchor = self
                .store
                .state()
                .selection
                .range
                .as_ref()
                .map(|r| r.start.clone())
                .unwrap_or_else(|| current.clone());
            self.store
                .set_selection(select_range(&self.columns, anchor, target.clone(), false));
        } else {
            self.store.set_focused(Some(target.clone()));
            self.store
                .set_selection(select_range(&self.columns, target.clone(), target.clone(), false));
            self.store.set_selected_rows(FxHashSet::default());
        }
        self.store.end_batch();

        let travel = target_row as i64 - row as i64;
        if travel.abs() <= 1 {
            self.nudge_row_into_view(target_row, travel);
        } else {
            let align = match direction {
                NavDirection::PageUp | NavDirection::CtrlHome => Align::Start,
                NavDirection::PageDown | NavDirection::CtrlEnd => Align::End,
                _ => Align::Center,
            };
            self.virtualizer.scroll_to_index(target_row, align);
            if !extend {
                self.pending_refocus = Some(target);
            }
        }
    }

    /// Single-row-step scrolling: inspect the rendered element for the
    /// target row. Fully inside the viewport (1px inset, header/footer
    /// honored): move focus only. Partially visible: nudge by the exact
    /// overflow. Not rendered: focus has already moved (so the ring shows
    /// the instant the row appears) and the offset shifts one row-height.
    fn nudge_row_into_view(&mut self, row: usize, travel: i64) {
        let vp = self.virtualizer.viewport();
        let visible_top = vp.scroll_top + vp.header_height + 1.0;
        let visible_bottom = vp.scroll_top + vp.height - vp.footer_height - 1.0;

        match self.virtualizer.row_bounds(row) {
            Some(bounds) if bounds.top >= visible_top && bounds.bottom <= visible_bottom => {}
            Some(bounds) => {
                let overflow = if bounds.top < visible_top {
                    bounds.top - visible_top
                } else {
                    bounds.bottom - visible_bottom
                };
                self.virtualizer.scroll_by(overflow);
            }
            None => {
                let sign = if travel >= 0 { 1.0 } else { -1.0 };
                self.virtualizer.scroll_by(vp.row_height * sign);
            }
        }
    }

    /// Bring an arbitrary cell into view (search jumps, dialog-driven
    /// focus). Always takes the scroll-to-index path with deferred refocus.
    pub(crate) fn scroll_cell_into_view(&mut self, pos: CellPosition, align: Align) {
        self.virtualizer.scroll_to_index(pos.row_index, align);
        self.pending_refocus = Some(pos);
    }
}

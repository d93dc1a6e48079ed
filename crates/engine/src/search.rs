//! In-grid search: query → row-major match list with an active cursor.

use gridkit_core::position::CellPosition;
use gridkit_core::selection::select_range;

use crate::engine::GridEngine;
use crate::host::Align;
use crate::state::SearchState;

impl GridEngine {
    /// Fresh open: previous query and matches are cleared.
    pub fn open_search(&mut self) {
        self.store.set_search(SearchState {
            open: true,
            ..SearchState::default()
        });
    }

    /// Close the panel. Query and matches persist for a quick reopen.
    pub fn close_search(&mut self) {
        let mut search = self.store.state().search.clone();
        if search.open {
            search.open = false;
            self.store.set_search(search);
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let matches = self.compute_matches(&query);
        self.store.set_search(SearchState {
            open: true,
            match_index: if matches.is_empty() { None } else { Some(0) },
            matches,
            query,
        });
    }

    pub fn next_search_match(&mut self) {
        self.step_search(1);
    }

    pub fn prev_search_match(&mut self) {
        self.step_search(-1);
    }

    fn step_search(&mut self, delta: isize) {
        let search = self.store.state().search.clone();
        let len = search.matches.len();
        if len == 0 {
            return;
        }
        let current = search.match_index.unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        let target = search.matches[next].clone();

        self.store.begin_batch();
        let mut updated = search;
        updated.match_index = Some(next);
        self.store.set_search(updated);
        self.store.set_focused(Some(target.clone()));
        self.store.set_selection(select_range(
            &self.columns,
            target.clone(),
            target.clone(),
            false,
        ));
        self.store.end_batch();

        self.scroll_cell_into_view(target, Align::Center);
    }

    /// Case-insensitive substring scan over the clipboard string form of
    /// every navigable cell, row-major.
    fn compute_matches(&self, query: &str) -> Vec<CellPosition> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let rows = self.source.rows();
        let mut matches = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            for spec in self.columns.navigable() {
                let haystack = row.value(&spec.id).clipboard_text().to_lowercase();
                if haystack.contains(&needle) {
                    matches.push(CellPosition::new(row_index, spec.id.clone()));
                }
            }
        }
        matches
    }

    /// Recompute matches against the current data while the panel is open.
    pub(crate) fn refresh_search_matches(&mut self) {
        let search = self.store.state().search.clone();
        if !search.open || search.query.is_empty() {
            return;
        }
        let matches = self.compute_matches(&search.query);
        let match_index = match search.match_index {
            _ if matches.is_empty() => None,
            Some(i) => Some(i.min(matches.len() - 1)),
            None => Some(0),
        };
        self.store.set_search(SearchState {
            open: true,
            query: search.query,
            matches,
            match_index,
        });
    }
}

//! Clipboard transfer: copy, cut, paste.
//!
//! Serialization writes the selection as tab-separated values. Parsing is
//! the interesting half: pasted text from naive copy sources can carry
//! unquoted embedded newlines, so `parse_tsv` tries standard quoted-TSV
//! splitting first and only falls back to tab-counting repair when the
//! quoted pass demonstrably fails to produce the expected shape. That
//! ordering is what keeps JSON-looking values with stray quote characters
//! from being mis-parsed.

use chrono::{DateTime, NaiveDate};
use gridkit_core::column::ColumnVariant;
use gridkit_core::position::{CellPosition, ColumnId};
use gridkit_core::selection::select_range;
use gridkit_core::value::CellValue;
use rustc_hash::FxHashSet;

use crate::config::PasteOverflowPolicy;
use crate::engine::GridEngine;
use crate::state::PasteDialogState;

impl GridEngine {
    // =========================================================================
    // Copy / cut
    // =========================================================================

    pub fn copy(&mut self) {
        let Some(text) = self.serialize_selection() else {
            return;
        };
        self.store.begin_batch();
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                // A fresh copy supersedes any pending cut
                self.cut_text = None;
                self.store.set_cut_cells(FxHashSet::default());
                self.set_status("Copied to clipboard");
            }
            Err(err) => {
                log::warn!("clipboard write failed: {}", err);
                self.set_status(format!("Copy failed: {}", err));
            }
        }
        self.store.end_batch();
    }

    /// Copy, then mark the source cells for a destructive move. The cells
    /// are cleared by the paste that completes the cut, not here.
    pub fn cut(&mut self) {
        let Some(text) = self.serialize_selection() else {
            return;
        };
        let keys: FxHashSet<_> = self
            .selection_positions()
            .iter()
            .map(|pos| pos.key())
            .collect();

        self.store.begin_batch();
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                self.cut_text = Some(text);
                self.store.set_cut_cells(keys);
                self.set_status("Cut to clipboard");
            }
            Err(err) => {
                log::warn!("clipboard write failed: {}", err);
                self.set_status(format!("Cut failed: {}", err));
            }
        }
        self.store.end_batch();
    }

    /// Serialize the selection (or the focused cell) as TSV: rows
    /// ascending, involved columns in navigable order, per-cell clipboard
    /// string forms.
    fn serialize_selection(&self) -> Option<String> {
        let (row_indices, column_ids) = self.selection_grid()?;
        let rows = self.source.rows();
        let mut text = String::new();
        for (i, &r) in row_indices.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            for (j, column_id) in column_ids.iter().enumerate() {
                if j > 0 {
                    text.push('\t');
                }
                if let Some(row) = rows.get(r) {
                    text.push_str(&row.value(column_id).clipboard_text());
                }
            }
        }
        Some(text)
    }

    // =========================================================================
    // Paste
    // =========================================================================

    pub fn paste(&mut self) {
        let Some(anchor) = self.paste_anchor() else {
            return;
        };
        let text = match self.clipboard.read_text() {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                self.set_status("Clipboard is empty");
                return;
            }
            Err(err) => {
                log::warn!("clipboard read failed: {}", err);
                self.set_status(format!("Paste failed: {}", err));
                return;
            }
        };
        self.apply_paste(anchor, &text);
    }

    /// Top-left corner of the selection, or the focused cell.
    fn paste_anchor(&self) -> Option<CellPosition> {
        if let Some((rows, columns)) = self.selection_grid() {
            return Some(CellPosition::new(*rows.first()?, columns.first()?.clone()));
        }
        self.store.state().focused.clone()
    }

    fn apply_paste(&mut self, anchor: CellPosition, text: &str) {
        let Some(anchor_col) = self.columns.navigable_index_of(&anchor.column_id) else {
            return;
        };
        let expected = self.columns.navigable_count() - anchor_col;
        let parsed = parse_tsv(text, expected);
        if parsed.is_empty() {
            return;
        }

        let needed = anchor.row_index + parsed.len();
        if needed > self.row_count() {
            // AutoGrow/Confirm need a growable data source; otherwise the
            // paste silently fills what fits.
            let policy = if self.source.can_append_rows() {
                self.config.paste_overflow
            } else {
                PasteOverflowPolicy::Truncate
            };
            match policy {
                PasteOverflowPolicy::Truncate => {}
                PasteOverflowPolicy::AutoGrow => {
                    self.grow_rows(needed);
                }
                PasteOverflowPolicy::Confirm => {
                    self.store.set_paste_dialog(PasteDialogState {
                        open: true,
                        rows_needed: needed - self.row_count(),
                        clipboard_text: text.to_string(),
                    });
                    return;
                }
            }
        }

        self.write_paste(anchor, anchor_col, &parsed, text);
    }

    /// Confirmed overflow paste: grow, then apply the cached payload
    /// without re-reading the clipboard.
    pub fn confirm_paste(&mut self) {
        let dialog = self.store.state().paste_dialog.clone();
        if !dialog.open {
            return;
        }
        self.store.set_paste_dialog(PasteDialogState::default());

        let Some(anchor) = self.paste_anchor() else {
            return;
        };
        let Some(anchor_col) = self.columns.navigable_index_of(&anchor.column_id) else {
            return;
        };
        let expected = self.columns.navigable_count() - anchor_col;
        let parsed = parse_tsv(&dialog.clipboard_text, expected);
        if parsed.is_empty() {
            return;
        }
        self.grow_rows(anchor.row_index + parsed.len());
        self.write_paste(anchor, anchor_col, &parsed, &dialog.clipboard_text);
    }

    /// Close the paste dialog, discarding the cached clipboard text.
    pub fn close_paste_dialog(&mut self) {
        self.store.set_paste_dialog(PasteDialogState::default());
    }

    fn write_paste(
        &mut self,
        anchor: CellPosition,
        anchor_col: usize,
        parsed: &[Vec<String>],
        source_text: &str,
    ) {
        let row_count = self.row_count();
        let mut writes: Vec<(usize, ColumnId, CellValue)> = Vec::new();
        let mut max_row = anchor.row_index;
        let mut max_col = anchor_col;

        for (dr, line) in parsed.iter().enumerate() {
            let r = anchor.row_index + dr;
            if r >= row_count {
                break; // fills what fits
            }
            for (dc, raw) in line.iter().enumerate() {
                let c = anchor_col + dc;
                let Some(spec) = self.columns.navigable_at(c) else {
                    break;
                };
                writes.push((r, spec.id.clone(), coerce_value(raw, spec.variant)));
                max_row = max_row.max(r);
                max_col = max_col.max(c);
            }
        }
        if writes.is_empty() {
            return;
        }

        // A paste whose payload matches the recorded cut completes the cut:
        // source cells clear to their variant empties, exactly once. Cells
        // inside the freshly written rectangle hold pasted content and are
        // left alone.
        let completes_cut = self
            .cut_text
            .as_deref()
            .is_some_and(|cut| normalize_clipboard_text(cut) == normalize_clipboard_text(source_text));
        if completes_cut {
            for key in self.store.state().cut_cells.clone() {
                let Some(pos) = key.decode() else { continue };
                let inside_paste = pos.row_index >= anchor.row_index
                    && pos.row_index <= max_row
                    && self
                        .columns
                        .navigable_index_of(&pos.column_id)
                        .is_some_and(|c| c >= anchor_col && c <= max_col);
                if inside_paste || pos.row_index >= row_count {
                    continue;
                }
                let empty = self.columns.variant_of(&pos.column_id).empty_value();
                writes.push((pos.row_index, pos.column_id, empty));
            }
        }

        self.store.begin_batch();
        let patches = self.write_cells(&writes);
        self.history.record_cells(patches);

        // The cut marking is consumed by any successful paste
        self.cut_text = None;
        self.store.set_cut_cells(FxHashSet::default());

        // Select exactly the rectangle that was written
        let start = CellPosition::new(
            anchor.row_index,
            self.columns.navigable_at(anchor_col).expect("anchor is navigable").id.clone(),
        );
        let end = CellPosition::new(
            max_row,
            self.columns.navigable_at(max_col).expect("within navigable range").id.clone(),
        );
        self.store.set_focused(Some(start.clone()));
        self.store
            .set_selection(select_range(&self.columns, start, end, false));
        self.set_status("Pasted from clipboard");
        self.store.end_batch();

        self.after_data_mutation();
    }
}

/// Normalize clipboard text for comparison (line endings, outer whitespace).
/// Some clipboard managers transform line endings or add trailing newlines.
pub fn normalize_clipboard_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

// =============================================================================
// TSV parsing
// =============================================================================

/// Split pasted text into logical rows of cells.
///
/// 1. Standard quoted-TSV splitting (doubled `"` escapes a literal quote, a
///    field beginning with `"` may span newlines, `\r\n` survives inside
///    quotes) is used exclusively when any row matches `expected_columns`.
/// 2. Otherwise tab-counting repair: physical lines accumulate into one
///    logical row until `expected_columns` fields worth of tabs have been
///    seen, with the extra newlines kept literal in the trailing field.
/// 3. Tab-free input degenerates to one cell per line.
/// 4. Blank rows in the middle of the input are skipped, not treated as
///    empty records.
pub fn parse_tsv(text: &str, expected_columns: usize) -> Vec<Vec<String>> {
    if text.is_empty() {
        return Vec::new();
    }

    let quoted = split_quoted(text);
    if expected_columns > 0 && quoted.iter().any(|row| row.len() == expected_columns) {
        return drop_blank_rows(quoted);
    }

    if !text.contains('\t') {
        return text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(|line| vec![line.to_string()])
            .collect();
    }

    repair_rows(text, expected_columns)
}

fn drop_blank_rows(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter(|row| row.len() > 1 || row.first().is_some_and(|f| !f.is_empty()))
        .collect()
}

/// Standard quoted-TSV splitting. Quoting only engages when a field BEGINS
/// with `"` — quote characters elsewhere (JSON tokens, inch marks) are
/// literal.
fn split_quoted(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c); // newlines and \r\n preserved verbatim
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                at_field_start = true;
            }
            other => {
                field.push(other);
                at_field_start = false;
            }
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Tab-counting repair for unquoted embedded newlines: a physical line with
/// too few tabs is not a complete row yet, so the following line belongs to
/// its last field.
fn repair_rows(text: &str, expected_columns: usize) -> Vec<Vec<String>> {
    let needed_tabs = expected_columns.saturating_sub(1);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let merged = match pending.take() {
            Some(mut acc) => {
                acc.push('\n');
                acc.push_str(line);
                acc
            }
            None => {
                if line.is_empty() {
                    continue; // blank row between records
                }
                line.to_string()
            }
        };
        if merged.matches('\t').count() >= needed_tabs {
            rows.push(merged.split('\t').map(str::to_string).collect());
        } else {
            pending = Some(merged);
        }
    }
    if let Some(rest) = pending {
        if !rest.is_empty() {
            rows.push(rest.split('\t').map(str::to_string).collect());
        }
    }
    rows
}

// =============================================================================
// Paste coercion
// =============================================================================

/// Coerce one pasted cell string by column variant. Malformed values become
/// the variant's safe null/default — a bad number or date never fails the
/// row, per the error-handling contract.
pub fn coerce_value(raw: &str, variant: ColumnVariant) -> CellValue {
    match variant {
        ColumnVariant::Number => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return CellValue::Null;
            }
            match trimmed.parse::<f64>() {
                Ok(n) if !n.is_nan() => CellValue::Number(n),
                _ => CellValue::Null,
            }
        }
        ColumnVariant::Checkbox => {
            let trimmed = raw.trim().to_ascii_lowercase();
            match trimmed.as_str() {
                "" => CellValue::Bool(false),
                "true" | "1" | "yes" => CellValue::Bool(true),
                "false" | "0" | "no" => CellValue::Bool(false),
                _ => CellValue::Bool(true), // any other text reads as set
            }
        }
        ColumnVariant::Date => {
            let trimmed = raw.trim();
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
                return CellValue::Date(dt.date_naive());
            }
            CellValue::Null
        }
        ColumnVariant::MultiSelect | ColumnVariant::File => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return CellValue::List(Vec::new());
            }
            if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
                return CellValue::List(items);
            }
            CellValue::List(
                trimmed
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            )
        }
        ColumnVariant::None | ColumnVariant::Text | ColumnVariant::Select => {
            CellValue::Text(raw.to_string())
        }
    }
}

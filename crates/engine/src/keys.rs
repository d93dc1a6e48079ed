//! Keyboard dispatch: one entry point the host binds its keydown stream to.
//!
//! Returns whether the key was consumed so the host can fall through to
//! native behavior. Undo/redo chords defer to focused text-input /
//! content-editable / popover contexts — intercepting undo while the user
//! edits text inside a native input is never acceptable.

use rustc_hash::FxHashSet;

use crate::engine::GridEngine;
use crate::navigation::NavDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Escape,
    Delete,
    Backspace,
    F2,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false, ctrl: false, alt: false, meta: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { shift: true, ..Self::plain(key) }
    }

    /// Ctrl on Linux/Windows, the conventional primary modifier.
    pub fn primary(key: Key) -> Self {
        Self { ctrl: true, ..Self::plain(key) }
    }

    fn has_primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

impl GridEngine {
    pub fn handle_key(&mut self, input: KeyInput) -> bool {
        if input.has_primary() {
            if let Key::Char(c) = input.key {
                match c.to_ascii_lowercase() {
                    'z' | 'y' if self.source.is_text_input_context() => return false,
                    'z' if input.shift => {
                        self.redo();
                        return true;
                    }
                    'z' => {
                        self.undo();
                        return true;
                    }
                    'y' => {
                        self.redo();
                        return true;
                    }
                    'c' => {
                        self.copy();
                        return true;
                    }
                    'x' => {
                        self.cut();
                        return true;
                    }
                    'v' => {
                        self.paste();
                        return true;
                    }
                    'a' => {
                        self.select_all();
                        return true;
                    }
                    'f' => {
                        self.open_search();
                        return true;
                    }
                    _ => return false,
                }
            }
            match input.key {
                Key::Home => {
                    self.navigate(NavDirection::CtrlHome, input.shift);
                    return true;
                }
                Key::End => {
                    self.navigate(NavDirection::CtrlEnd, input.shift);
                    return true;
                }
                _ => return false,
            }
        }

        if self.store.state().is_editing() {
            // The editor widget owns the keystroke; only Escape cancels here
            return match input.key {
                Key::Escape => {
                    self.stop_editing();
                    true
                }
                _ => false,
            };
        }

        match input.key {
            Key::ArrowUp => self.navigate(NavDirection::Up, input.shift),
            Key::ArrowDown => self.navigate(NavDirection::Down, input.shift),
            Key::ArrowLeft => self.navigate(NavDirection::Left, input.shift),
            Key::ArrowRight => self.navigate(NavDirection::Right, input.shift),
            Key::Home => self.navigate(NavDirection::Home, input.shift),
            Key::End => self.navigate(NavDirection::End, input.shift),
            Key::PageUp => self.navigate(NavDirection::PageUp, input.shift),
            Key::PageDown => self.navigate(NavDirection::PageDown, input.shift),
            // Tab shares the left/right direction codes but is
            // navigation-only: it never extends a range
            Key::Tab if input.shift => self.navigate(NavDirection::Left, false),
            Key::Tab => self.navigate(NavDirection::Right, false),
            Key::Enter | Key::F2 => {
                let Some(focused) = self.store.state().focused.clone() else {
                    return false;
                };
                self.start_editing(focused);
            }
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::Escape => return self.handle_escape(),
            Key::Char(_) => return false,
        }
        true
    }

    /// Escape cascade: context menu, search panel, cut marking, selection.
    fn handle_escape(&mut self) -> bool {
        if self.store.state().context_menu.open {
            self.close_context_menu();
            return true;
        }
        if self.store.state().paste_dialog.open {
            self.close_paste_dialog();
            return true;
        }
        if self.store.state().search.open {
            self.close_search();
            return true;
        }
        if !self.store.state().cut_cells.is_empty() {
            self.cut_text = None;
            self.store.set_cut_cells(FxHashSet::default());
            return true;
        }
        if !self.store.state().selection.is_empty()
            || !self.store.state().selected_rows.is_empty()
        {
            self.clear_selection();
            return true;
        }
        false
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
}

/// Cursor and scroll state for the two views. Invariants for a non-empty
/// collection: `selected_index < len` and `offset <= selected_index`; the
/// selected row stays inside `[offset, offset + viewport_height)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewMode,
    pub selected_index: usize,
    pub offset: usize,
    pub detail_scroll: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: ViewMode::List,
            selected_index: 0,
            offset: 0,
            detail_scroll: 0,
        }
    }
}

impl AppState {
    /// One row of list navigation; clamps at both ends, no wraparound. The
    /// viewport scrolls by the minimum amount that keeps the selection
    /// visible.
    pub fn navigate_list(&mut self, nav: Nav, len: usize, viewport_height: usize) {
        if len == 0 {
            return;
        }
        match nav {
            Nav::Up => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                    if self.selected_index < self.offset {
                        self.offset = self.selected_index;
                    }
                }
            }
            Nav::Down => {
                if self.selected_index + 1 < len {
                    self.selected_index += 1;
                    let viewport = viewport_height.max(1);
                    if self.selected_index >= self.offset + viewport {
                        self.offset = self.selected_index + 1 - viewport;
                    }
                }
            }
        }
    }

    /// Re-establishes the cursor invariants after the collection is replaced;
    /// required whenever a refresh shrinks the collection.
    pub fn clamp_list(&mut self, len: usize, viewport_height: usize) {
        if len == 0 {
            self.selected_index = 0;
            self.offset = 0;
            return;
        }
        self.selected_index = self.selected_index.min(len - 1);
        self.offset = self.offset.min(self.selected_index);
        let viewport = viewport_height.max(1);
        if self.selected_index >= self.offset + viewport {
            self.offset = self.selected_index + 1 - viewport;
        }
    }

    pub fn scroll_detail(&mut self, nav: Nav, field_count: usize) {
        match nav {
            Nav::Up => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            Nav::Down => {
                let last = field_count.saturating_sub(1);
                self.detail_scroll = (self.detail_scroll + 1).min(last);
            }
        }
    }

    pub fn open_detail(&mut self) {
        self.view = ViewMode::Detail;
        self.detail_scroll = 0;
    }

    pub fn back_to_list(&mut self) {
        self.view = ViewMode::List;
        self.detail_scroll = 0;
    }
}

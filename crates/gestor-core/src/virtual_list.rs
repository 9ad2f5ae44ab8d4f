//! Visible-window computation for long lists

use gestor_config::ListConfig;
use serde::{Deserialize, Serialize};

/// Geometry of the list container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    pub row_height: u32,
    pub viewport_height: u32,
    pub buffer: usize,
    /// Lists with at most this many rows are rendered in full
    pub threshold: usize,
}

impl WindowParams {
    pub fn from_config(list: &ListConfig, viewport_height: Option<u32>) -> Self {
        Self {
            row_height: list.row_height,
            viewport_height: viewport_height.unwrap_or(list.viewport_height),
            buffer: list.buffer,
            threshold: list.virtualization_threshold,
        }
    }
}

/// Rows `start..end` are rendered; the spacers stand in for the rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWindow {
    pub start: usize,
    pub end: usize,
    pub padding_top: u64,
    pub padding_bottom: u64,
    pub virtualized: bool,
}

impl ListWindow {
    fn full(count: usize) -> Self {
        Self {
            start: 0,
            end: count,
            padding_top: 0,
            padding_bottom: 0,
            virtualized: false,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the window for `count` rows at `scroll_offset` pixels
pub fn compute_window(count: usize, scroll_offset: u64, params: &WindowParams) -> ListWindow {
    if count <= params.threshold || params.row_height == 0 {
        return ListWindow::full(count);
    }

    let row = u64::from(params.row_height);
    let viewport = u64::from(params.viewport_height);
    let total = count as u64 * row;

    // Keep at least the last row in view when scrolled past the end
    let max_scroll = total.saturating_sub(viewport).min(total - 1);
    let scroll = scroll_offset.min(max_scroll);

    let first_visible = (scroll / row) as usize;
    let last_visible = (scroll + viewport.max(1)).div_ceil(row) as usize;

    let start = first_visible.saturating_sub(params.buffer);
    let end = (last_visible + params.buffer).min(count);

    ListWindow {
        start,
        end,
        padding_top: start as u64 * row,
        padding_bottom: total.saturating_sub(end as u64 * row),
        virtualized: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WindowParams {
        WindowParams {
            row_height: 73,
            viewport_height: 600,
            buffer: 5,
            threshold: 50,
        }
    }

    fn rows_accounted(window: &ListWindow, count: usize, row: u64) -> bool {
        let top_rows = window.padding_top / row;
        let bottom_rows = window.padding_bottom / row;
        top_rows + window.len() as u64 + bottom_rows == count as u64
    }

    #[test]
    fn test_small_list_renders_all() {
        let window = compute_window(50, 1000, &params());
        assert_eq!(window, ListWindow::full(50));
        assert!(!window.virtualized);
    }

    #[test]
    fn test_top_of_list() {
        let window = compute_window(1000, 0, &params());
        assert_eq!(window.start, 0);
        // ceil(600 / 73) = 9, plus buffer
        assert_eq!(window.end, 14);
        assert_eq!(window.padding_top, 0);
        assert!(rows_accounted(&window, 1000, 73));
    }

    #[test]
    fn test_middle_of_list() {
        let window = compute_window(1000, 7300, &params());
        // floor(7300 / 73) = 100, ceil(7900 / 73) = 109
        assert_eq!(window.start, 95);
        assert_eq!(window.end, 114);
        assert_eq!(window.padding_top, 95 * 73);
        assert_eq!(window.padding_bottom, (1000 - 114) * 73);
        assert!(rows_accounted(&window, 1000, 73));
    }

    #[test]
    fn test_covers_viewport_for_any_offset() {
        let p = params();
        for scroll in [0u64, 1, 72, 73, 5000, 12345, 72_999, 73_000] {
            let window = compute_window(1000, scroll, &p);
            let first_visible = (scroll.min(73_000 - 600) / 73) as usize;
            let last_visible = (((scroll.min(73_000 - 600)) + 600 + 72) / 73) as usize;
            assert!(window.start <= first_visible);
            assert!(window.end >= last_visible.min(1000));
            assert!(rows_accounted(&window, 1000, 73));
        }
    }

    #[test]
    fn test_scroll_past_end_is_clamped() {
        let window = compute_window(100, 1_000_000, &params());
        assert!(!window.is_empty());
        assert_eq!(window.end, 100);
        assert_eq!(window.padding_bottom, 0);
        assert!(rows_accounted(&window, 100, 73));
    }

    #[test]
    fn test_zero_row_height_renders_all() {
        let p = WindowParams { row_height: 0, ..params() };
        assert_eq!(compute_window(500, 100, &p), ListWindow::full(500));
    }

    #[test]
    fn test_zero_viewport_still_shows_a_row() {
        let p = WindowParams { viewport_height: 0, buffer: 0, ..params() };
        let window = compute_window(100, 730, &p);
        assert_eq!(window.len(), 1);
        assert_eq!(window.start, 10);
    }
}

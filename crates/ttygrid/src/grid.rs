//! The grid itself: buffers, write path, and the frame diff.

use ttyansi::{attr_sequence, build_sgr, move_to, seq::RESET_ATTRS};
use ttycell::{Cell, CellAttrs, Style, decode_color};

use crate::cache::DeltaCache;

/// Live ANSI state tracked across one frame.
///
/// Reset at the start of every diff; mirrors exactly what the emitted
/// bytes have told the terminal so far.
#[derive(Debug)]
struct FrameState {
    attrs: CellAttrs,
    fg: u16,
    bg: u16,
    /// Whether any non-default background was asserted this frame. Runs
    /// returning to the default background need an explicit `49` even when
    /// the immediately previous run already had default, or colors bleed.
    bg_touched: bool,
    /// Whether any style bytes were emitted at all; gates the trailing
    /// reset.
    styled: bool,
}

impl FrameState {
    fn new() -> FrameState {
        FrameState {
            attrs: CellAttrs::empty(),
            fg: 0,
            bg: 0,
            bg_touched: false,
            styled: false,
        }
    }

    /// Emit whatever style bytes move the terminal from the current state
    /// to the style of `cell`, and record the new state.
    fn transition(&mut self, out: &mut String, cache: &mut DeltaCache, cell: Cell) {
        let attrs = cell.attrs();
        let fg = cell.fg_raw();
        let bg = cell.bg_raw();

        let attr_changed = attrs != self.attrs;
        let color_changed = fg != self.fg || bg != self.bg;
        if !attr_changed && !color_changed {
            return;
        }

        if attr_changed && fg == 0 && bg == 0 {
            // The LUT entry leads with 0, so it also clears colors; with
            // default colors wanted, that is the whole delta.
            out.push_str(attr_sequence(attrs));
        } else if attr_changed || (fg == 0 && self.fg != 0) {
            // Attribute change with live colors, or a foreground dropping
            // back to default: both need the full rebuild.
            out.push_str(&build_sgr(attrs, decode_color(fg), decode_color(bg)));
        } else {
            let bg_reset = bg == 0 && (self.bg != 0 || self.bg_touched);
            out.push_str(cache.delta(fg, bg, bg_reset));
        }

        self.styled = true;
        self.attrs = attrs;
        self.fg = fg;
        self.bg = bg;
        if bg != 0 {
            self.bg_touched = true;
        }
    }
}

/// A double-buffered grid of packed cells with per-row dirty flags.
///
/// `front` is what the terminal last received, `back` is the frame being
/// composed. [`Grid::compute_diff`] reconciles the two.
#[derive(Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    front: Vec<Cell>,
    back: Vec<Cell>,
    dirty: Vec<bool>,
    cache: DeltaCache,
}

impl Grid {
    /// Create a grid filled with empty cells, every row dirty.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Grid {
        Grid {
            rows,
            cols,
            front: vec![Cell::EMPTY; rows * cols],
            back: vec![Cell::EMPTY; rows * cols],
            dirty: vec![true; rows],
            cache: DeltaCache::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Write one styled character into the back buffer.
    ///
    /// Out-of-range coordinates are ignored. Writing a cell equal to what
    /// the back buffer already holds does not mark the row dirty, so idle
    /// frames emit nothing.
    pub fn set_cell(&mut self, row: usize, col: usize, ch: char, style: Style) {
        self.set_cell_packed(row, col, Cell::styled(ch, style));
    }

    /// [`Grid::set_cell`] over an already-packed cell.
    pub fn set_cell_packed(&mut self, row: usize, col: usize, cell: Cell) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        let idx = row * self.cols + col;
        if self.back[idx] == cell {
            return;
        }
        self.back[idx] = cell;
        self.dirty[row] = true;
    }

    /// The back-buffer cell at `(row, col)`; the empty cell out of range.
    #[must_use]
    pub fn get_cell(&self, row: usize, col: usize) -> Cell {
        if row >= self.rows || col >= self.cols {
            return Cell::EMPTY;
        }
        self.back[row * self.cols + col]
    }

    /// Fill the back buffer with empty cells and mark every row dirty.
    pub fn clear(&mut self) {
        self.back.fill(Cell::EMPTY);
        self.dirty.fill(true);
    }

    /// Mark a row dirty. Advisory; out-of-range rows are ignored.
    pub fn mark_dirty(&mut self, row: usize) {
        if let Some(flag) = self.dirty.get_mut(row) {
            *flag = true;
        }
    }

    /// Mark every row dirty.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Reallocate both buffers to the new dimensions.
    ///
    /// Contents are not preserved: the host redraws after a resize. Both
    /// buffers come back empty with every row dirty, so resizing twice to
    /// the same dimensions is the same as resizing once.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.front = vec![Cell::EMPTY; rows * cols];
        self.back = vec![Cell::EMPTY; rows * cols];
        self.dirty = vec![true; rows];
    }

    /// Compute the escape stream that reconciles the front buffer with the
    /// back buffer, update the front buffer, and clear the dirty flags.
    ///
    /// Dirty rows are walked left to right and grouped into runs of cells
    /// sharing a style; a run is emitted only if one of its cells actually
    /// differs from the front buffer. Cursor motion jumps over clean runs,
    /// and a new row always starts with an explicit move (never relying on
    /// wrap).
    pub fn compute_diff(&mut self) -> String {
        let mut out = String::new();
        let mut state = FrameState::new();
        // Position the next character would land on, if known.
        let mut cursor: Option<(usize, usize)> = None;

        for row in 0..self.rows {
            if !self.dirty[row] {
                continue;
            }
            let base = row * self.cols;
            let mut col = 0;
            while col < self.cols {
                let key = self.back[base + col].style_key();
                let mut end = col + 1;
                while end < self.cols && self.back[base + end].style_key() == key {
                    end += 1;
                }

                let run_changed = (col..end).any(|c| self.back[base + c] != self.front[base + c]);
                if run_changed {
                    if cursor != Some((row, col)) {
                        #[allow(clippy::cast_possible_truncation)]
                        out.push_str(&move_to(row as u16 + 1, col as u16 + 1));
                    }
                    state.transition(&mut out, &mut self.cache, self.back[base + col]);
                    for c in col..end {
                        out.push(self.back[base + c].ch());
                    }
                    self.front[base + col..base + end]
                        .copy_from_slice(&self.back[base + col..base + end]);
                    cursor = Some((row, end));
                }
                col = end;
            }
            self.dirty[row] = false;
        }

        if state.styled {
            out.push_str(RESET_ATTRS);
        }
        out
    }

    /// Compute the frame diff and push it straight into the byte sink.
    ///
    /// Idle frames write nothing at all.
    ///
    /// # Errors
    ///
    /// Propagates sink errors; the front buffer is already updated by
    /// then, so the host should redraw fully after an error.
    pub fn render_into<W: std::io::Write>(&mut self, sink: &mut W) -> std::io::Result<()> {
        let diff = self.compute_diff();
        if diff.is_empty() {
            return Ok(());
        }
        sink.write_all(diff.as_bytes())
    }

    /// The characters of one back-buffer row as a `String`. Debug/test
    /// helper; out-of-range rows render empty.
    #[must_use]
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let base = row * self.cols;
        self.back[base..base + self.cols].iter().map(|c| c.ch()).collect()
    }

    #[cfg(test)]
    fn buffers_match(&self) -> bool {
        self.front == self.back
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ttycell::Color;

    fn style(fg: &str, bg: &str) -> Style {
        Style::new(CellAttrs::empty(), Color::parse(fg), Color::parse(bg))
    }

    #[test]
    fn first_frame_emits_only_changed_cells() {
        let mut grid = Grid::new(2, 4);
        grid.set_cell(0, 0, 'h', Style::default());
        grid.set_cell(0, 1, 'i', Style::default());
        let diff = grid.compute_diff();
        assert_eq!(diff, "\x1b[1;1Hhi");
        assert!(grid.buffers_match());
    }

    #[test]
    fn second_diff_without_writes_is_empty() {
        let mut grid = Grid::new(5, 20);
        for col in 0..20 {
            grid.set_cell(2, col, 'x', style("#00ff00", ""));
        }
        assert!(!grid.compute_diff().is_empty());
        assert_eq!(grid.compute_diff(), "");
    }

    #[test]
    fn rewriting_identical_cells_keeps_rows_clean() {
        let mut grid = Grid::new(1, 4);
        grid.set_cell(0, 0, 'a', Style::default());
        grid.compute_diff();
        grid.set_cell(0, 0, 'a', Style::default());
        assert_eq!(grid.compute_diff(), "");
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let mut grid = Grid::new(3, 3);
        grid.compute_diff();
        grid.set_cell(3, 0, 'x', Style::default());
        grid.set_cell(0, 3, 'x', Style::default());
        grid.set_cell(usize::MAX, 0, 'x', Style::default());
        assert_eq!(grid.compute_diff(), "");
        assert_eq!(grid.get_cell(3, 0), Cell::EMPTY);
        assert_eq!(grid.get_cell(0, 3), Cell::EMPTY);
    }

    #[test]
    fn background_reset_is_emitted_between_runs() {
        let mut grid = Grid::new(1, 2);
        grid.set_cell(0, 0, 'X', style("", "#ff0000"));
        grid.set_cell(0, 1, 'Y', Style::default());
        let diff = grid.compute_diff();
        let x = diff.find('X').unwrap();
        let y = diff.find('Y').unwrap();
        // The run carrying Y must be preceded by a 49 reset.
        assert!(diff[x..y].contains("49"), "no bg reset in {diff:?}");
    }

    #[test]
    fn background_reset_after_default_bg_interlude() {
        // Colored bg mid-frame, then default-bg runs: the later default run
        // still carries the 49 when its predecessor changed colors.
        let mut grid = Grid::new(1, 3);
        grid.set_cell(0, 0, 'a', style("", "#0000ff"));
        grid.set_cell(0, 1, 'b', style("#ff0000", ""));
        grid.set_cell(0, 2, 'c', style("#00ff00", ""));
        let diff = grid.compute_diff();
        let a = diff.find('a').unwrap();
        let b = diff.find('b').unwrap();
        assert!(diff[a..b].contains("49"), "no bg reset in {diff:?}");
    }

    #[test]
    fn attr_only_changes_use_the_lut() {
        let mut grid = Grid::new(1, 2);
        grid.set_cell(0, 0, 'n', Style::default());
        grid.set_cell(0, 1, 'b', Style::new(CellAttrs::BOLD, Color::Default, Color::Default));
        let diff = grid.compute_diff();
        assert_eq!(diff, "\x1b[1;1Hn\x1b[0;1mb\x1b[0m");
    }

    #[test]
    fn clean_runs_are_jumped_over() {
        let mut grid = Grid::new(1, 3);
        grid.set_cell(0, 0, 'A', style("#ff0000", ""));
        grid.set_cell(0, 1, 'B', Style::default());
        grid.set_cell(0, 2, 'C', style("#ff0000", ""));
        grid.compute_diff();
        // Only the last run changes; the first two are skipped and the
        // cursor jumps straight to column 3.
        grid.set_cell(0, 2, 'c', style("#ff0000", ""));
        let diff = grid.compute_diff();
        assert!(!diff.contains('A') && !diff.contains('B'));
        assert!(diff.starts_with("\x1b[1;3H"), "unexpected {diff:?}");
        assert!(diff.contains('c'));
    }

    #[test]
    fn changed_run_resends_its_whole_extent() {
        // Runs are style-delimited: touching one cell of a uniform row
        // resends the row's run in full, left to right.
        let mut grid = Grid::new(1, 6);
        for col in 0..6 {
            grid.set_cell(0, col, '.', Style::default());
        }
        grid.compute_diff();
        grid.set_cell(0, 3, 'x', Style::default());
        assert_eq!(grid.compute_diff(), "\x1b[1;1H...x..");
    }

    #[test]
    fn rows_never_rely_on_wrap() {
        let mut grid = Grid::new(2, 2);
        grid.set_cell(0, 0, 'a', Style::default());
        grid.set_cell(0, 1, 'b', Style::default());
        grid.set_cell(1, 0, 'c', Style::default());
        grid.set_cell(1, 1, 'd', Style::default());
        let diff = grid.compute_diff();
        assert_eq!(diff, "\x1b[1;1Hab\x1b[2;1Hcd");
    }

    #[test]
    fn clear_marks_everything_dirty() {
        let mut grid = Grid::new(2, 2);
        grid.set_cell(0, 0, 'a', Style::default());
        grid.compute_diff();
        grid.clear();
        let diff = grid.compute_diff();
        // The previously written cell is rewritten as a space.
        assert!(diff.starts_with("\x1b[1;1H "));
        assert!(grid.buffers_match());
    }

    #[test]
    fn resize_resets_contents_and_is_idempotent() {
        let mut grid = Grid::new(2, 2);
        grid.set_cell(0, 0, 'a', Style::default());
        grid.compute_diff();

        grid.resize(3, 5);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 5);
        assert_eq!(grid.get_cell(0, 0), Cell::EMPTY);
        let after_once = grid.compute_diff();

        let mut twice = Grid::new(2, 2);
        twice.set_cell(0, 0, 'a', Style::default());
        twice.compute_diff();
        twice.resize(3, 5);
        twice.resize(3, 5);
        assert_eq!(twice.compute_diff(), after_once);
    }

    #[test]
    fn mark_dirty_alone_emits_nothing_but_clears() {
        let mut grid = Grid::new(2, 2);
        grid.compute_diff();
        grid.mark_dirty(1);
        grid.mark_dirty(100);
        assert_eq!(grid.compute_diff(), "");
    }

    #[test]
    fn same_style_split_rows_each_get_a_move() {
        let mut grid = Grid::new(2, 1);
        let s = Style::new(CellAttrs::BOLD, Color::Indexed(2), Color::Default);
        grid.set_cell(0, 0, 'x', s);
        grid.set_cell(1, 0, 'y', s);
        let diff = grid.compute_diff();
        // Style bytes once, but an explicit move for the second row.
        assert_eq!(diff.matches("\x1b[0;1;38;5;2m").count(), 1);
        assert!(diff.contains("\x1b[2;1H"));
    }

    #[test]
    fn frame_with_styles_ends_with_reset() {
        let mut grid = Grid::new(1, 1);
        grid.set_cell(0, 0, 'x', style("#123456", ""));
        let diff = grid.compute_diff();
        assert!(diff.ends_with("\x1b[0m"));
    }

    #[test]
    fn plain_frame_has_no_trailing_reset() {
        let mut grid = Grid::new(1, 1);
        grid.set_cell(0, 0, 'x', Style::default());
        let diff = grid.compute_diff();
        assert_eq!(diff, "\x1b[1;1Hx");
    }

    #[test]
    fn foreground_back_to_default_rebuilds() {
        let mut grid = Grid::new(1, 2);
        grid.set_cell(0, 0, 'a', style("#ff0000", ""));
        grid.set_cell(0, 1, 'b', Style::default());
        let diff = grid.compute_diff();
        let a = diff.find('a').unwrap();
        let b = diff.find('b').unwrap();
        // The colored foreground must not bleed into 'b'.
        assert!(diff[a..b].contains("\x1b[0m") || diff[a..b].contains("\x1b[0;"));
    }

    #[test]
    fn render_into_writes_the_diff() {
        let mut grid = Grid::new(1, 2);
        grid.set_cell(0, 0, 'o', Style::default());
        grid.set_cell(0, 1, 'k', Style::default());
        let mut sink = Vec::new();
        grid.render_into(&mut sink).unwrap();
        assert_eq!(sink, b"\x1b[1;1Hok");
        // Idle frame: the sink is untouched.
        sink.clear();
        grid.render_into(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn row_text_snapshots_the_back_buffer() {
        let mut grid = Grid::new(1, 5);
        grid.set_cell(0, 1, 'h', Style::default());
        grid.set_cell(0, 2, 'i', Style::default());
        assert_eq!(grid.row_text(0), " hi  ");
        assert_eq!(grid.row_text(9), "");
    }
}

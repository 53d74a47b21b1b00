use graph::{color_index, CommitGraph, EdgeKind, GraphNode, LaneIdx};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::walker::CommitMeta;

/// Box drawing characters for graph rendering
pub mod chars {
    pub const COMMIT: char = '●';
    pub const VERTICAL: char = '│';
    pub const OPEN: char = '┆';
    pub const FORK_RIGHT: char = '╮';
    pub const FORK_LEFT: char = '╭';
    pub const MERGE_LEFT: char = '┤';
    pub const MERGE_RIGHT: char = '├';
    pub const SPACE: char = ' ';
}

/// Terminal color codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

impl Color {
    pub fn to_ansi(&self) -> &'static str {
        match self {
            Color::Default => "\x1b[0m",
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
            Color::Cyan => "\x1b[36m",
            Color::White => "\x1b[37m",
            Color::Gray => "\x1b[90m",
        }
    }
}

const PALETTE: [Color; 8] = [
    Color::Blue,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::White,
    Color::Gray,
];

/// A cell in the rendered grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    pub fn new(ch: char, color: Color) -> Self {
        Self { ch, color }
    }

    pub fn empty() -> Self {
        Self {
            ch: chars::SPACE,
            color: Color::Default,
        }
    }
}

/// Plain-text renderer: one line per commit, two characters per lane
pub struct TextRenderer {
    color: bool,
    summary_width: usize,
}

impl TextRenderer {
    pub fn new(color: bool, summary_width: usize) -> Self {
        Self { color, summary_width }
    }

    fn lane_color(&self, lane: LaneIdx, graph: &CommitGraph) -> Color {
        PALETTE[color_index(lane, graph.config().palette_size) % PALETTE.len()]
    }

    /// Graph cells for the row holding `node`
    pub fn render_cells(&self, graph: &CommitGraph, node: &GraphNode) -> Vec<Cell> {
        let width = graph.lane_width().max(node.lane() + 1);
        let mut cells = vec![Cell::empty(); width];
        let row = node.row();

        // Between its endpoints every line runs in the lane reserved for the parent
        for edge in graph.edges_through_row(row) {
            cells[edge.end_lane] = Cell::new(chars::VERTICAL, self.lane_color(edge.end_lane, graph));
        }

        // Edges leave the child's row already in their target lane
        for edge in graph.edges_for_row(row) {
            if edge.end_lane == node.lane() {
                continue;
            }
            let right = edge.end_lane > node.lane();
            let cell = match edge.kind {
                EdgeKind::Merge => {
                    let ch = if right { chars::FORK_RIGHT } else { chars::FORK_LEFT };
                    Cell::new(ch, self.lane_color(edge.end_lane, graph))
                }
                EdgeKind::Converging => {
                    let ch = if right { chars::MERGE_LEFT } else { chars::MERGE_RIGHT };
                    let color = edge.color_index(graph.config().palette_size);
                    Cell::new(ch, PALETTE[color % PALETTE.len()])
                }
                EdgeKind::Straight => continue,
            };
            cells[edge.end_lane] = cell;
        }

        cells[node.lane()] = Cell::new(chars::COMMIT, self.lane_color(node.lane(), graph));
        cells
    }

    pub fn render_row(&self, graph: &CommitGraph, node: &GraphNode, meta: Option<&CommitMeta>) -> String {
        let mut line = String::new();
        for cell in self.render_cells(graph, node) {
            if self.color && cell.ch != chars::SPACE {
                line.push_str(cell.color.to_ansi());
                line.push(cell.ch);
                line.push_str(Color::Default.to_ansi());
            } else {
                line.push(cell.ch);
            }
            line.push(chars::SPACE);
        }

        match meta {
            Some(meta) => {
                line.push_str(&format!(
                    " {} {} {} {}",
                    meta.short_id,
                    meta.timestamp.format("%Y-%m-%d"),
                    truncate_to_width(&meta.author, 16),
                    truncate_to_width(&meta.summary, self.summary_width),
                ));
            }
            None => {
                line.push(' ');
                line.push_str(node.id());
            }
        }
        line
    }

    /// Trailing line for lanes that continue past the loaded history
    pub fn render_truncation(&self, graph: &CommitGraph) -> Option<String> {
        let open = graph.open_parent_ids();
        if open.is_empty() {
            return None;
        }

        let active = graph.active_lanes();
        let width = active.last().map_or(0, |&top| top + 1);
        let mut line = String::new();
        for lane in 0..width {
            line.push(if active.contains(&lane) { chars::OPEN } else { chars::SPACE });
            line.push(chars::SPACE);
        }
        line.push_str(&format!(" … {} parent(s) not loaded", open.len()));
        Some(line)
    }

    pub fn render<'m>(&self, graph: &CommitGraph, meta_for: impl Fn(&str) -> Option<&'m CommitMeta>) -> String {
        let mut out = String::new();
        for node in graph.nodes() {
            out.push_str(&self.render_row(graph, node, meta_for(node.id())));
            out.push('\n');
        }
        if let Some(tail) = self.render_truncation(graph) {
            out.push_str(&tail);
            out.push('\n');
        }
        out
    }
}

/// Truncate to a display width, keeping grapheme clusters whole
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for grapheme in text.graphemes(true) {
        let grapheme_width = UnicodeWidthStr::width(grapheme);
        if current_width + grapheme_width + 1 > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }
    result.push('…');
    result
}

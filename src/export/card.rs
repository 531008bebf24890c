//! Declaration card template
//!
//! Builds a fixed-layout [`RenderTree`] from a declaration. The layout only
//! depends on the declaration fields and the profile, so the same declaration
//! always produces the same tree (and the same PNG).

use crate::catalog::Rgb;
use crate::models::Declaration;

/// Logical card size, before the raster scale factor
pub const CARD_WIDTH: u32 = 360;
pub const CARD_HEIGHT: u32 = 600;

/// Width of one glyph cell at text size 8
pub const GLYPH_CELL: u32 = 8;

const MARGIN: u32 = 24;
const HEADER_HEIGHT: u32 = 190;
const FOOTER_HEIGHT: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Rgb,
    },
    /// A single line of text. `size` is the glyph height in logical pixels
    /// (a multiple of 8); glyphs are square.
    Text {
        x: u32,
        y: u32,
        size: u32,
        color: Rgb,
        text: String,
    },
}

/// Everything a rasterizer needs to draw the card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTree {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub nodes: Vec<Node>,
}

impl RenderTree {
    fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            nodes: Vec::new(),
        }
    }

    fn rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb) {
        self.nodes.push(Node::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn text(&mut self, x: u32, y: u32, size: u32, color: Rgb, text: impl Into<String>) {
        self.nodes.push(Node::Text {
            x,
            y,
            size,
            color,
            text: text.into(),
        });
    }

    /// Wrapped paragraph; returns the y just below the last line
    #[allow(clippy::too_many_arguments)]
    fn paragraph(
        &mut self,
        x: u32,
        y: u32,
        size: u32,
        color: Rgb,
        text: &str,
        max_width: u32,
        max_lines: usize,
    ) -> u32 {
        let line_height = size + size / 2;
        let max_chars = (max_width / size.max(1)) as usize;
        let mut cursor = y;
        for line in wrap(text, max_chars, max_lines) {
            self.text(x, cursor, size, color, line);
            cursor += line_height;
        }
        cursor
    }

    /// All text on the card, top to bottom (used for assertions and debugging)
    pub fn texts(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Text { text, .. } => Some(text.as_str()),
                Node::Rect { .. } => None,
            })
            .collect()
    }
}

/// Render the declaration card
pub fn render(declaration: &Declaration) -> RenderTree {
    let profile = declaration.profile();
    let accent = Rgb::from_hex(&profile.color).unwrap_or(Rgb::INDIGO);
    let content_width = CARD_WIDTH - 2 * MARGIN;

    let mut tree = RenderTree::new(CARD_WIDTH, CARD_HEIGHT, Rgb::WHITE);

    // Header band
    tree.rect(0, 0, CARD_WIDTH, HEADER_HEIGHT, accent);
    tree.text(MARGIN, 24, 8, accent.mix(Rgb::WHITE, 0.7), "LIMITLESS BRAIN DECLARATION");
    tree.paragraph(MARGIN, 44, 24, Rgb::WHITE, &profile.english_name, content_width, 1);
    tree.paragraph(MARGIN, 80, 16, Rgb::WHITE, &profile.name, content_width, 1);
    tree.paragraph(
        MARGIN,
        110,
        8,
        Rgb::WHITE,
        &profile.description,
        content_width,
        6,
    );

    // Pledge
    let mut y = HEADER_HEIGHT + 22;
    y = tree.paragraph(
        MARGIN,
        y,
        16,
        Rgb::INK,
        &format!("I, {},", declaration.display_name()),
        content_width,
        2,
    );
    tree.text(MARGIN, y, 8, Rgb::MUTED, "COMMIT TO THIS PROMISE:");

    let panel_top = y + 16;
    let panel_height = 128;
    tree.rect(
        MARGIN - 8,
        panel_top,
        content_width + 16,
        panel_height,
        accent.mix(Rgb::WHITE, 0.88),
    );
    tree.rect(MARGIN - 8, panel_top, 4, panel_height, accent);
    tree.paragraph(
        MARGIN + 4,
        panel_top + 12,
        16,
        Rgb::INK,
        &format!("\"{}\"", declaration.commitment()),
        content_width - 8,
        5,
    );

    // Strategy highlights: the first entry of each list
    let mut y = panel_top + panel_height + 20;
    tree.text(MARGIN, y, 8, accent, "BRAIN MASTER STRATEGIES");
    y += 18;
    let highlights = [
        ("READ", profile.reading_strategy.first()),
        ("REMEMBER", profile.memory_strategy.first()),
        ("DECIDE", profile.decision_strategy.first()),
    ];
    for (label, strategy) in highlights {
        let Some(strategy) = strategy else {
            continue;
        };
        let line = format!("{label}: {}", strategy_label(strategy));
        y = tree.paragraph(MARGIN, y, 8, Rgb::INK, &line, content_width, 1) + 4;
    }

    y += 6;
    tree.paragraph(
        MARGIN,
        y,
        8,
        Rgb::MUTED,
        &profile.recommended_action,
        content_width,
        3,
    );

    // Footer
    let footer_top = CARD_HEIGHT - FOOTER_HEIGHT;
    tree.rect(0, footer_top, CARD_WIDTH, FOOTER_HEIGHT, Rgb::INK);
    let footer = "C.O.D.E BRAIN TYPE - DIGITAL CERTIFICATION";
    let footer_width = footer.chars().count() as u32 * GLYPH_CELL;
    tree.text(
        CARD_WIDTH.saturating_sub(footer_width) / 2,
        footer_top + 16,
        8,
        Rgb::WHITE,
        footer,
    );

    tree
}

/// "Label: detail" -> "Label"
pub fn strategy_label(strategy: &str) -> &str {
    strategy.split(':').next().unwrap_or(strategy).trim()
}

/// Greedy word wrap by character count. Words longer than a line are split;
/// text that does not fit in `max_lines` ends with "...".
pub fn wrap(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed <= max_chars {
                if current_len > 0 {
                    current.push(' ');
                }
                current.extend(word.iter());
                current_len = needed;
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Word alone is too long for a line
            let rest = word.split_off(max_chars);
            lines.push(word.iter().collect());
            word = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = max_chars.saturating_sub(3);
            let mut truncated: String = last.chars().take(keep).collect();
            truncated.push_str("...");
            *last = truncated;
        }
    }
    lines
}

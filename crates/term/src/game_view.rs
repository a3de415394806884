//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O) and allocation-free when rendering into a
//! reused framebuffer.

use crate::core::{ActiveSnapshot, CellView, GameSnapshot, Half, PieceView};
use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::palette::{coords_color, contrast};
use crate::types::{BlochCoords, Position, BOARD_HEIGHT, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const PLAYFIELD_BG: Rgb = Rgb::new(30, 30, 40);
const ENTANGLED: Rgb = Rgb::new(200, 90, 220);
const GATE_BG: Rgb = Rgb::new(70, 70, 85);
const PANEL_MIN_WIDTH: u16 = 12;

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // Two columns per cell roughly squares the glyph aspect ratio.
        Self {
            cell_w: 2,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Top-left corner of the board frame inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub frame_x: u16,
    pub frame_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn layout(&self, viewport: Viewport) -> Layout {
        let frame_w = BOARD_WIDTH as u16 * self.cell_w + 2;
        let frame_h = BOARD_HEIGHT as u16 + 2;
        Layout {
            frame_x: viewport.width.saturating_sub(frame_w) / 2,
            frame_y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
                AnchorY::Top => 0,
            },
            frame_w,
            frame_h,
        }
    }

    /// Terminal column and row of the left half of board cell `pos`.
    pub fn cell_origin(&self, layout: Layout, pos: Position) -> (u16, u16) {
        (
            layout.frame_x + 1 + pos.x as u16 * self.cell_w,
            layout.frame_y + 1 + pos.y as u16,
        )
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let layout = self.layout(viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::BLACK);
        fb.fill_rect(
            layout.frame_x + 1,
            layout.frame_y + 1,
            layout.frame_w - 2,
            layout.frame_h - 2,
            ' ',
            CellStyle::new(Rgb::new(90, 90, 100), PLAYFIELD_BG),
        );
        draw_border(fb, layout, border);

        for y in 0..BOARD_HEIGHT as i8 {
            for x in 0..BOARD_WIDTH as i8 {
                let pos = Position::new(x, y);
                let (px, py) = self.cell_origin(layout, pos);
                match snap.cell(pos) {
                    Some(view) => {
                        let pending = snap.pending_clear[y as usize][x as usize];
                        self.draw_cell(fb, px, py, view, pending);
                    }
                    None => self.fill_cell(fb, px, py, '·', CellStyle::new(Rgb::new(90, 90, 100), PLAYFIELD_BG)),
                }
            }
        }

        if let Some(active) = snap.active {
            self.draw_active(fb, layout, &active);
        }

        self.draw_side_panel(fb, snap, viewport, layout);

        if snap.game_over() {
            draw_overlay_text(fb, layout, "GAME OVER");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, px: u16, py: u16, ch: char, style: CellStyle) {
        fb.fill_rect(px, py, self.cell_w, 1, ch, style);
    }

    fn draw_cell(&self, fb: &mut FrameBuffer, px: u16, py: u16, view: CellView, pending: bool) {
        let color = match view {
            CellView::Qubit { bloch } => coords_color(bloch),
            CellView::Entangled { .. } => ENTANGLED,
        };
        let style = CellStyle::new(contrast(color), color);
        if pending {
            self.fill_cell(fb, px, py, '*', style.bold());
            return;
        }
        match view {
            CellView::Qubit { .. } => self.fill_cell(fb, px, py, ' ', style),
            CellView::Entangled { half, .. } => {
                self.fill_cell(fb, px, py, ' ', style);
                let mark = match half {
                    Half::First => '(',
                    Half::Second => ')',
                };
                fb.put_char(px, py, mark, style);
            }
        }
    }

    fn draw_active(&self, fb: &mut FrameBuffer, layout: Layout, active: &ActiveSnapshot) {
        let on_board = |pos: Position| {
            pos.x >= 0 && pos.y >= 0 && pos.x < BOARD_WIDTH as i8 && pos.y < BOARD_HEIGHT as i8
        };
        let mut paint = |pos: Position, glyph: [Cell; 2]| {
            if on_board(pos) {
                let (px, py) = self.cell_origin(layout, pos);
                for (i, cell) in glyph.iter().take(self.cell_w as usize).enumerate() {
                    fb.set(px + i as u16, py, *cell);
                }
            }
        };
        match active.piece {
            PieceView::QubitPair { first, second, .. } => {
                paint(active.anchor, qubit_glyph(first));
                if let Some(pos) = active.second {
                    paint(pos, qubit_glyph(second));
                }
            }
            PieceView::Entangled { anchor_half, .. } => {
                let style = CellStyle::new(contrast(ENTANGLED), ENTANGLED);
                let glyph = |first: bool| {
                    [
                        Cell { ch: if first { '(' } else { ')' }, style },
                        Cell { ch: ' ', style },
                    ]
                };
                let anchor_first = anchor_half == Half::First;
                paint(active.anchor, glyph(anchor_first));
                if let Some(pos) = active.second {
                    paint(pos, glyph(!anchor_first));
                }
            }
            PieceView::Gate { axis, turns } => {
                let style = CellStyle::new(Rgb::WHITE, GATE_BG).bold();
                let label = axis.as_str().chars().next().unwrap_or('?');
                paint(
                    active.anchor,
                    [
                        Cell { ch: label, style },
                        Cell { ch: turn_digit(turns), style },
                    ],
                );
            }
            PieceView::Measurement { base, ortho } => {
                paint(active.anchor, probe_glyph(base, ortho));
            }
        }
    }

    fn draw_side_panel(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, viewport: Viewport, layout: Layout) {
        let panel_x = layout.frame_x.saturating_add(layout.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < PANEL_MIN_WIDTH {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), Rgb::BLACK).bold();
        let value = CellStyle::default();

        let mut y = layout.frame_y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u64(panel_x, y + 1, snap.score, value);
        y += 3;

        fb.put_str(panel_x, y, "LEVEL", label);
        fb.put_u64(panel_x, y + 1, snap.level as u64 + 1, value);
        y += 3;

        fb.put_str(panel_x, y, "PHASE", label);
        fb.put_str(panel_x, y + 1, snap.phase.as_str(), value);
        y += 3;

        fb.put_str(panel_x, y, "HOLD", label);
        match snap.hold {
            Some(view) => draw_piece_preview(fb, panel_x, y + 1, view),
            None => fb.put_str(panel_x, y + 1, "-", value),
        }
        if !snap.can_hold {
            fb.put_str(panel_x + 5, y, "x", value);
        }
        y += 3;

        fb.put_str(panel_x, y, "NEXT", label);
        for view in snap.next_queue.iter().flatten() {
            y += 1;
            if y >= viewport.height {
                break;
            }
            draw_piece_preview(fb, panel_x, y, *view);
        }
    }
}

fn qubit_glyph(bloch: BlochCoords) -> [Cell; 2] {
    let color = coords_color(bloch);
    let style = CellStyle::new(contrast(color), color);
    [Cell { ch: ' ', style }, Cell { ch: ' ', style }]
}

/// Left half in the measured basis state, right half in its orthogonal.
fn probe_glyph(base: BlochCoords, ortho: BlochCoords) -> [Cell; 2] {
    let left = coords_color(base);
    let right = coords_color(ortho);
    [
        Cell {
            ch: '[',
            style: CellStyle::new(contrast(left), left).bold(),
        },
        Cell {
            ch: ']',
            style: CellStyle::new(contrast(right), right).bold(),
        },
    ]
}

fn turn_digit(turns: u8) -> char {
    char::from_digit(turns as u32 % 10, 10).unwrap_or('?')
}

/// One-line rendering of a piece outside the board.
fn draw_piece_preview(fb: &mut FrameBuffer, x: u16, y: u16, view: PieceView) {
    let cells: [Cell; 4] = match view {
        PieceView::QubitPair { first, second, .. } => {
            let [a, b] = qubit_glyph(first);
            let [c, d] = qubit_glyph(second);
            [a, b, c, d]
        }
        PieceView::Entangled { .. } => {
            let style = CellStyle::new(contrast(ENTANGLED), ENTANGLED);
            [
                Cell { ch: '(', style },
                Cell { ch: ' ', style },
                Cell { ch: ')', style },
                Cell { ch: ' ', style },
            ]
        }
        PieceView::Gate { axis, turns } => {
            let style = CellStyle::new(Rgb::WHITE, GATE_BG).bold();
            let blank = Cell::default();
            [
                Cell {
                    ch: axis.as_str().chars().next().unwrap_or('?'),
                    style,
                },
                Cell {
                    ch: turn_digit(turns),
                    style,
                },
                blank,
                blank,
            ]
        }
        PieceView::Measurement { base, ortho } => {
            let [a, b] = probe_glyph(base, ortho);
            let blank = Cell::default();
            [a, b, blank, blank]
        }
    };
    for (i, cell) in cells.iter().enumerate() {
        fb.set(x + i as u16, y, *cell);
    }
}

fn draw_border(fb: &mut FrameBuffer, layout: Layout, style: CellStyle) {
    let Layout {
        frame_x: x,
        frame_y: y,
        frame_w: w,
        frame_h: h,
    } = layout;
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, layout: Layout, text: &str) {
    let mid_y = layout.frame_y.saturating_add(layout.frame_h / 2);
    let text_w = text.chars().count() as u16;
    let x = layout.frame_x.saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
    fb.put_str(x, mid_y, text, CellStyle::new(Rgb::WHITE, Rgb::BLACK).bold());
}

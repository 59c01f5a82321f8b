use crossterm::{cursor, queue, style};
use rand::Rng;
use std::io::{self, Write};

use crate::game::{BODY_SIZE, BODY_X, Game, OBSTACLE_W, PLAYFIELD_H, PLAYFIELD_W, State};
use crate::sprite::Sprite;

// ── Palette ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const PAPER: Rgb = Rgb(250, 249, 247);
const INK: Rgb = Rgb(25, 24, 28);
const INK_LIGHT: Rgb = Rgb(110, 108, 115);
const PENCIL: Rgb = Rgb(185, 182, 178);
const PANEL: Rgb = Rgb(240, 236, 228);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

/// Terminal-resolution RGB canvas. Each character cell carries two vertically
/// stacked pixels via the upper-half-block glyph.
pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        let w = w.max(1);
        let h = h.max(2);
        Self {
            w,
            h,
            px: vec![PAPER; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w.max(1);
        self.h = h.max(2);
        self.px.clear();
        self.px.resize(self.w * self.h, PAPER);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Plain DDA line, good enough for short sketch segments.
    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, c: Rgb) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0);
        let n = steps as i32;
        for i in 0..=n {
            let t = i as f64 / steps;
            self.set(
                (x0 + (x1 - x0) * t).round() as i32,
                (y0 + (y1 - y0) * t).round() as i32,
                c,
            );
        }
    }

    /// Wash everything toward pencil gray; ink stays dark.
    fn dim(&mut self) {
        for p in &mut self.px {
            *p = Rgb(
                p.0 - (p.0.saturating_sub(PENCIL.0)) / 2,
                p.1 - (p.1.saturating_sub(PENCIL.1)) / 2,
                p.2 - (p.2.saturating_sub(PENCIL.2)) / 2,
            );
        }
    }

    /// Flush to the terminal, coalescing color escape runs.
    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if bg != Some(top) {
                        queue!(out, style::SetBackgroundColor(color(top)))?;
                        bg = Some(top);
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(color(top)))?;
                        fg = Some(top);
                    }
                    if bg != Some(bot) {
                        queue!(out, style::SetBackgroundColor(color(bot)))?;
                        bg = Some(bot);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn color(c: Rgb) -> style::Color {
    style::Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Sketch strokes ──────────────────────────────────────────────────────────

const SKETCH_STEPS: i32 = 8;
const SKETCH_PASSES: usize = 2;

/// Hand-drawn rectangle outline: each edge is subdivided and every point
/// jittered by bounded noise, traced twice so the strokes double up like a
/// pencil sketch. Callers may only rely on it staying within the
/// wobble-inflated bounds.
fn sketch_rect(
    buf: &mut PixelBuf,
    rng: &mut impl Rng,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    wobble: f64,
    c: Rgb,
) {
    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
    for _ in 0..SKETCH_PASSES {
        let mut from = (
            x + rng.gen_range(-wobble..=wobble),
            y + rng.gen_range(-wobble..=wobble),
        );
        for seg in corners.windows(2) {
            let (sx, sy) = seg[0];
            let (tx, ty) = seg[1];
            for s in 1..=SKETCH_STEPS {
                let t = s as f64 / SKETCH_STEPS as f64;
                let to = (
                    sx + (tx - sx) * t + rng.gen_range(-wobble..=wobble),
                    sy + (ty - sy) * t + rng.gen_range(-wobble..=wobble),
                );
                buf.line(from.0, from.1, to.0, to.1, c);
                from = to;
            }
        }
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
fn glyph(ch: char) -> Option<[u8; 15]> {
    let g = match ch {
        '0'..='9' => DIGITS[ch as usize - '0' as usize],
        'A' => [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'C' => [1,1,1, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'E' => [1,1,1, 1,0,0, 1,1,1, 1,0,0, 1,1,1],
        'F' => [1,1,1, 1,0,0, 1,1,1, 1,0,0, 1,0,0],
        'G' => [1,1,1, 1,0,0, 1,0,1, 1,0,1, 1,1,1],
        'L' => [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'M' => [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1],
        'O' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        'P' => [1,1,1, 1,0,1, 1,1,1, 1,0,0, 1,0,0],
        'R' => [1,1,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'V' => [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        'Y' => [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0],
        _ => return None,
    };
    Some(g)
}

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, g: &[u8; 15], k: i32, c: Rgb) {
    for row in 0..5 {
        for col in 0..3 {
            if g[row * 3 + col] == 1 {
                buf.fill_rect(x + col as i32 * k, y + row as i32 * k, k, k, c);
            }
        }
    }
}

/// Centered 3x5 text. Spaces and unknown characters render blank.
fn draw_text(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, k: i32, c: Rgb) {
    let total_w = text.len() as i32 * 4 * k - k;
    let mut x = cx - total_w / 2;
    for ch in text.chars() {
        if let Some(g) = glyph(ch) {
            draw_glyph(buf, x, y, &g, k, c);
        }
        x += 4 * k;
    }
}

fn draw_number(buf: &mut PixelBuf, x: i32, y: i32, n: u32, k: i32, c: Rgb) {
    let mut x = x;
    for ch in n.to_string().chars() {
        let d = (ch as u8 - b'0') as usize;
        draw_glyph(buf, x, y, &DIGITS[d], k, c);
        x += 4 * k;
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Maps the fixed 800x600 logical surface onto the current pixel buffer.
/// Axes scale independently, like a stretched canvas.
struct View {
    sx: f64,
    sy: f64,
}

impl View {
    fn new(buf: &PixelBuf) -> Self {
        View {
            sx: buf.w as f64 / PLAYFIELD_W,
            sy: buf.h as f64 / PLAYFIELD_H,
        }
    }

    fn x(&self, lx: f64) -> f64 {
        lx * self.sx
    }

    fn y(&self, ly: f64) -> f64 {
        ly * self.sy
    }
}

pub fn draw(game: &Game, sprite: Option<&Sprite>, buf: &mut PixelBuf, rng: &mut impl Rng) {
    buf.clear(PAPER);
    let view = View::new(buf);
    let (bw, bh) = (buf.w as i32, buf.h as i32);
    let k = (bh / 90).max(1); // glyph pixel scale

    draw_obstacles(game, buf, &view, rng);
    draw_body(game, sprite, buf, &view, rng);

    match game.state {
        State::Ready => {
            draw_text(buf, bw / 2, bh / 4, "FLAPPY", k * 2, INK);
            draw_text(buf, bw / 2, bh / 4 + 14 * k, "SPACE TO FLAP", k, INK_LIGHT);
        }
        State::Playing => {
            let (x, y) = (view.x(30.0) as i32, view.y(30.0) as i32);
            draw_number(buf, x, y, game.score, k, INK);
        }
        State::Over => {
            buf.dim();
            draw_game_over(game, buf, rng, k);
        }
    }
}

fn draw_obstacles(game: &Game, buf: &mut PixelBuf, view: &View, rng: &mut impl Rng) {
    let floor = buf.h as f64;
    let wobble = view.y(4.0).clamp(1.0, 3.0);
    for ob in &game.obstacles {
        let x = view.x(ob.x);
        let w = view.x(OBSTACLE_W);
        // Upper column runs from the top edge down to the gap, the lower one
        // from the gap bottom to the floor.
        sketch_rect(buf, rng, x, 0.0, w, view.y(ob.gap_top), wobble, INK);
        let bot = view.y(ob.gap_bottom());
        sketch_rect(buf, rng, x, bot, w, floor - bot, wobble, INK);
    }
}

fn draw_body(
    game: &Game,
    sprite: Option<&Sprite>,
    buf: &mut PixelBuf,
    view: &View,
    rng: &mut impl Rng,
) {
    let x0 = view.x(BODY_X);
    let y0 = view.y(game.y);
    let w = view.x(BODY_SIZE).round().max(2.0) as i32;
    let h = view.y(BODY_SIZE).round().max(2.0) as i32;

    match sprite {
        Some(sp) => {
            // Mirror while falling; purely cosmetic.
            let mirror = game.vy > 0.0;
            for dy in 0..h {
                for dx in 0..w {
                    let u = if mirror { w - 1 - dx } else { dx };
                    if let Some(c) = sp.sample(u as f64 / w as f64, dy as f64 / h as f64) {
                        buf.set(x0 as i32 + dx, y0 as i32 + dy, Rgb(c[0], c[1], c[2]));
                    }
                }
            }
        }
        None => {
            // Degraded mode: a sketched square with an eye dot stands in.
            buf.fill_rect(x0 as i32, y0 as i32, w, h, PENCIL);
            sketch_rect(buf, rng, x0, y0, w as f64, h as f64, 1.5, INK);
            let ex = x0 as i32 + w * 2 / 3;
            let ey = y0 as i32 + h / 3;
            buf.fill_rect(ex, ey, (w / 8).max(1), (h / 8).max(1), INK);
        }
    }
}

fn draw_game_over(game: &Game, buf: &mut PixelBuf, rng: &mut impl Rng, k: i32) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 2;
    let pw = (34 * k).min(buf.w as i32 - 4);
    let ph = 26 * k;

    let px = cx - pw / 2;
    let py = cy - ph / 2;
    buf.fill_rect(px, py, pw, ph, PANEL);
    sketch_rect(buf, rng, px as f64, py as f64, pw as f64, ph as f64, 2.0, INK);

    draw_text(buf, cx, py + 3 * k, "GAME OVER", k, INK);
    draw_text(buf, cx, py + 10 * k, "SCORE", k, INK_LIGHT);
    let digits = game.score.to_string().len() as i32;
    draw_number(buf, cx - (digits * 4 * k - k) / 2, py + 16 * k, game.score, k, INK);
    draw_text(buf, cx, py + 22 * k, "R TO RESET", k, INK_LIGHT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sketch_stays_inside_inflated_bounds() {
        let mut buf = PixelBuf::new(120, 120);
        let mut rng = StdRng::seed_from_u64(9);
        let (x, y, w, h, wobble) = (30.0, 40.0, 50.0, 25.0, 3.0);
        sketch_rect(&mut buf, &mut rng, x, y, w, h, wobble, INK);

        let slack = wobble + 1.0; // rounding
        for py in 0..120usize {
            for px in 0..120usize {
                if buf.get(px, py) != PAPER {
                    assert!(px as f64 >= x - slack && px as f64 <= x + w + slack);
                    assert!(py as f64 >= y - slack && py as f64 <= y + h + slack);
                }
            }
        }
    }

    #[test]
    fn view_maps_logical_corners_to_buffer_corners() {
        let buf = PixelBuf::new(200, 120);
        let view = View::new(&buf);
        assert_eq!(view.x(0.0), 0.0);
        assert_eq!(view.y(0.0), 0.0);
        assert_eq!(view.x(PLAYFIELD_W) as usize, 200);
        assert_eq!(view.y(PLAYFIELD_H) as usize, 120);
    }

    #[test]
    fn drawing_never_panics_on_tiny_buffers() {
        let mut buf = PixelBuf::new(2, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = Game::new();
        draw(&game, None, &mut buf, &mut rng);
        game.jump();
        game.step(&mut rng);
        draw(&game, None, &mut buf, &mut rng);
        game.state = State::Over;
        draw(&game, None, &mut buf, &mut rng);
    }
}

/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// World geometry is in pixels. A tile is drawn as a block of `2k × k`
/// terminal cells, where `k` is 2 when the terminal is large enough for the
/// configured view and 1 otherwise. Culling and placement go through
/// `Viewport`, so the player stays centred and the map scrolls under it.

use std::io::{self, BufWriter, Write};
use std::time::Instant;

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableFocusChange, EnableFocusChange},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::audio::VolumeScale;
use crate::domain::entity::Facing;
use crate::domain::object::ObjectKind;
use crate::domain::screen::{
    OptionsScreen, ScreenState, TitleScreen, CONFIRM_COMMANDS, OPTIONS_COMMANDS, OPTIONS_MUSIC,
    OPTIONS_SE, TITLE_COMMANDS,
};
use crate::domain::tile::Rgb;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, also used
    /// for `Clear` so row gaps match cell colour.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Layout ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, message + gap + help below.
const RESERVED_ROWS: usize = MAP_ROW + 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const BOX_BG: Color = Color::Rgb { r: 30, g: 30, b: 45 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };

/// Terminal rectangle the world view is drawn into.
#[derive(Clone, Copy, Debug)]
struct MapArea {
    x0: usize,
    y0: usize,
    w: usize,
    h: usize,
    /// A tile is `2k` columns by `k` rows.
    k: usize,
    tile_px: i32,
}

impl MapArea {
    fn tile_cols(&self) -> usize { 2 * self.k }
    fn tile_rows(&self) -> usize { self.k }

    /// Screen pixel → terminal cell (may be outside the area).
    fn to_term(&self, sx: i32, sy: i32) -> (i32, i32) {
        let cx = (sx * self.tile_cols() as i32).div_euclid(self.tile_px);
        let cy = (sy * self.tile_rows() as i32).div_euclid(self.tile_px);
        (self.x0 as i32 + cx, self.y0 as i32 + cy)
    }

    fn contains(&self, tx: i32, ty: i32) -> bool {
        tx >= self.x0 as i32
            && ty >= self.y0 as i32
            && tx < (self.x0 + self.w) as i32
            && ty < (self.y0 + self.h) as i32
    }
}

// ── Sprites ──

fn player_sprite(facing: Facing, frame: u8, k: usize) -> [&'static str; 2] {
    if k == 1 {
        let s = match facing {
            Facing::Up => "/\\",
            Facing::Down => "\\/",
            Facing::Left => "<@",
            Facing::Right => "@>",
        };
        return [s, ""];
    }
    let head = match facing {
        Facing::Up => "(  )",
        Facing::Down => "(oo)",
        Facing::Left => "(o )",
        Facing::Right => "( o)",
    };
    const LEGS: [&str; 4] = [" /\\ ", "/  \\", " /\\ ", " || "];
    [head, LEGS[frame as usize % LEGS.len()]]
}

fn object_sprite(kind: ObjectKind, k: usize) -> ([&'static str; 2], Color) {
    let key_c = Color::Rgb { r: 255, g: 215, b: 0 };
    let boots_c = Color::Rgb { r: 170, g: 90, b: 30 };
    let chest_c = Color::Rgb { r: 190, g: 120, b: 50 };
    match (kind, k) {
        (ObjectKind::Key, 1) => (["o┐", ""], key_c),
        (ObjectKind::Key, _) => (["o─┬┐", "    "], key_c),
        (ObjectKind::Boots, 1) => (["▙▖", ""], boots_c),
        (ObjectKind::Boots, _) => ([" ▐▌ ", " ██▖"], boots_c),
        (ObjectKind::Chest { open: false }, 1) => (["[]", ""], chest_c),
        (ObjectKind::Chest { open: false }, _) => (["┌──┐", "└──┘"], chest_c),
        (ObjectKind::Chest { open: true }, 1) => (["$$", ""], GOLD),
        (ObjectKind::Chest { open: true }, _) => (["┌$$┐", "└──┘"], GOLD),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<ScreenState>,
    last_draw_us: u128,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            last_draw_us: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableFocusChange,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableFocusChange,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Forget what is on screen; next frame repaints everything.
    pub fn invalidate(&mut self) {
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen change → clear for clean transition
        let screen = world.screen.state();
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        let started = Instant::now();
        self.front.clear();

        match screen {
            ScreenState::Title(TitleScreen::MainMenu) => self.compose_title(world),
            ScreenState::Title(TitleScreen::Commands) => self.compose_commands(),
            ScreenState::Playing => self.compose_game(world),
            ScreenState::Paused => {
                self.compose_game(world);
                self.compose_pause_overlay(world);
            }
            ScreenState::Options(sub) => {
                self.compose_game(world);
                match sub {
                    OptionsScreen::Main => self.compose_options(world),
                    OptionsScreen::ConfirmQuit => self.compose_confirm_quit(world),
                }
            }
            ScreenState::Ending => {
                self.compose_game(world);
                self.compose_ending(world);
            }
        }
        self.last_draw_us = started.elapsed().as_micros();

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Map area ──

    fn map_area(&self, w: &WorldState) -> MapArea {
        let vp = &w.viewport;
        let tiles_w = (vp.width / vp.tile_size).max(1) as usize;
        let tiles_h = (vp.height / vp.tile_size).max(1) as usize;
        let k = if self.term_w >= tiles_w * 4 && self.term_h >= tiles_h * 2 + RESERVED_ROWS { 2 } else { 1 };
        let w_cells = (tiles_w * 2 * k).min(self.term_w);
        let h_cells = (tiles_h * k).min(self.term_h.saturating_sub(RESERVED_ROWS));
        MapArea {
            x0: (self.term_w.saturating_sub(w_cells)) / 2,
            y0: MAP_ROW,
            w: w_cells,
            h: h_cells,
            k,
            tile_px: vp.tile_size,
        }
    }

    /// Fill the terminal block of a tile-sized thing at screen pixel (sx, sy).
    fn fill_block(&mut self, area: &MapArea, sx: i32, sy: i32, ch: char, fg: Color, bg: Color) {
        let (tx, ty) = area.to_term(sx, sy);
        for dy in 0..area.tile_rows() as i32 {
            for dx in 0..area.tile_cols() as i32 {
                let (x, y) = (tx + dx, ty + dy);
                if area.contains(x, y) {
                    self.front.set(x as usize, y as usize, Cell::new(ch, fg, bg));
                }
            }
        }
    }

    /// Draw sprite art at screen pixel (sx, sy). Spaces are transparent.
    fn draw_sprite(&mut self, area: &MapArea, sx: i32, sy: i32, art: &[&str], fg: Color) {
        let (tx, ty) = area.to_term(sx, sy);
        for (dy, line) in art.iter().enumerate().take(area.tile_rows()) {
            for (dx, ch) in line.chars().enumerate().take(area.tile_cols()) {
                let (x, y) = (tx + dx as i32, ty + dy as i32);
                if ch == ' ' || !area.contains(x, y) {
                    continue;
                }
                let bg = self.front.get(x as usize, y as usize).bg;
                self.front.set(x as usize, y as usize, Cell::new(ch, fg, bg));
            }
        }
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let area = self.map_area(w);
        let vp = &w.viewport;
        let t = w.tile_size;
        let focal = (w.player.body.x, w.player.body.y);

        // ── HUD row ──
        let hud = format!(
            " Keys {}/{}   Time {:>7.2}s   Speed {} ",
            w.player.keys, w.required_keys, w.hud.play_time, w.player.body.speed(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(area.x0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Tiles ──
        let cols = w.grid.cols() as i32;
        let rows = w.grid.rows() as i32;
        for (col, row) in vp.visible_cells(focal, cols, rows) {
            let Some(tile) = w.grid.get(col, row).and_then(|i| w.tiles.get(i)) else { continue };
            let (sx, sy) = vp.project(col * t, row * t, focal);
            self.fill_block(&area, sx, sy, tile.glyph, rgb(tile.fg), rgb(tile.bg));
        }

        // ── Objects ──
        for obj in w.objects.iter() {
            if !vp.visible(obj.x, obj.y, focal) {
                continue;
            }
            let (sx, sy) = vp.project(obj.x, obj.y, focal);
            let (art, fg) = object_sprite(obj.kind, area.k);
            self.draw_sprite(&area, sx, sy, &art, fg);
        }

        // ── Player (always at the focal screen position) ──
        let (px, py) = vp.focal_screen();
        let art = player_sprite(w.player.body.facing, w.player.anim_frame(), area.k);
        self.draw_sprite(&area, px, py, &art, Color::White);

        // ── Message bar ──
        let msg_row = area.y0 + area.h + 1;
        if w.hud.message_visible() && msg_row < self.front.height {
            let msg = format!(" ◈ {} ", w.hud.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(area.x0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = msg_row + 1;
        if help_row < self.front.height {
            let help = " WASD/←→↑↓ Move  P Pause  ESC Options  ' Debug  K Reload map";
            self.front.put_str(area.x0, help_row, help, Color::DarkGrey, Color::Reset);
        }

        if w.debug {
            self.compose_debug(w, &area);
        }
    }

    fn compose_debug(&mut self, w: &WorldState, area: &MapArea) {
        let body = &w.player.body;
        let hb = body.world_hitbox();
        let lines = [
            format!("WorldX: {}", body.x),
            format!("WorldY: {}", body.y),
            format!("Col: {}", hb.x.div_euclid(w.tile_size)),
            format!("Row: {}", hb.y.div_euclid(w.tile_size)),
            format!("Draw: {}µs", self.last_draw_us),
        ];
        let bg = Color::Rgb { r: 0, g: 0, b: 0 };
        for (i, line) in lines.iter().enumerate() {
            let y = area.y0 + i;
            if y >= area.y0 + area.h { break; }
            self.front.put_str(area.x0, y, &format!(" {line:<14}"), Color::White, bg);
        }
    }

    /// Filled box centred in the map area; returns its top-left corner.
    fn compose_box(&mut self, area: &MapArea, bw: usize, bh: usize, title: &str) -> (usize, usize) {
        let bw = bw.min(self.term_w);
        let bx = area.x0 + area.w.saturating_sub(bw) / 2;
        let by = area.y0 + area.h.saturating_sub(bh) / 2;
        self.front.fill_rect(bx, by, bw, bh, BOX_BG);

        let inner = bw.saturating_sub(2);
        let top = format!("╔{}╗", "═".repeat(inner));
        let bottom = format!("╚{}╝", "═".repeat(inner));
        self.front.put_str(bx, by, &top, GOLD, BOX_BG);
        for y in by + 1..by + bh.saturating_sub(1) {
            self.front.put_str(bx, y, "║", GOLD, BOX_BG);
            self.front.put_str(bx + bw - 1, y, "║", GOLD, BOX_BG);
        }
        self.front.put_str(bx, by + bh - 1, &bottom, GOLD, BOX_BG);

        let tx = bx + bw.saturating_sub(title.chars().count()) / 2;
        self.front.put_str(tx, by + 1, title, GOLD, BOX_BG);
        (bx, by)
    }

    fn menu_line(&mut self, x: usize, y: usize, label: &str, selected: bool, bg: Color) {
        let (marker, fg) = if selected { ("▸ ", GREEN) } else { ("  ", Color::White) };
        self.front.put_str(x, y, marker, fg, bg);
        self.front.put_str(x + 2, y, label, fg, bg);
    }

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r" _  __            ___                  _   ",
            r"| |/ /___ _  _   / _ \ _  _  ___  ___| |_ ",
            r"| ' </ -_) || | | (_) | || |/ -_)(_-<|  _|",
            r"|_|\_\___|\_, |  \__\_\\_,_|\___|/__/ \__|",
            r"          |__/                             ",
        ];
        let width = title[1].len();
        let x0 = self.term_w.saturating_sub(width) / 2;
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(x0, 2 + i, line, GOLD, Color::Reset);
        }

        let tagline = "━━━ find the keys, open the chest ━━━";
        let tx = self.term_w.saturating_sub(tagline.chars().count()) / 2;
        self.front.put_str(tx, 8, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        let cursor = w.screen.cursor();
        let mx = self.term_w.saturating_sub(10) / 2;
        for (i, label) in TITLE_COMMANDS.iter().enumerate() {
            self.menu_line(mx, 11 + i * 2, label, i == cursor, Color::Reset);
        }

        let hint = "↑↓ select   ENTER confirm";
        let hx = self.term_w.saturating_sub(hint.chars().count()) / 2;
        self.front.put_str(hx, 16, hint, Color::DarkGrey, Color::Reset);
    }

    fn compose_commands(&mut self) {
        let lines = [
            ("Controls", GOLD),
            ("", Color::White),
            ("WASD / ←→↑↓    Move", Color::White),
            ("P              Pause / resume", Color::White),
            ("ESC            Options", Color::White),
            ("'              Debug info", Color::White),
            ("K              Reload map", Color::White),
            ("Ctrl+C         Quit", Color::White),
            ("", Color::White),
            ("Collect the keys and open the chest.", Color::Rgb { r: 180, g: 180, b: 180 }),
            ("Boots make you faster.", Color::Rgb { r: 180, g: 180, b: 180 }),
            ("", Color::White),
            ("Press ENTER to start", GREEN),
        ];
        let x0 = self.term_w.saturating_sub(38) / 2;
        for (i, (line, fg)) in lines.iter().enumerate() {
            self.front.put_str(x0, 3 + i, line, *fg, Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let area = self.map_area(w);
        let (bx, by) = self.compose_box(&area, 24, 5, "PAUSED");
        self.front.put_str(bx + 3, by + 3, "P  Resume", Color::Rgb { r: 100, g: 200, b: 255 }, BOX_BG);
    }

    fn compose_options(&mut self, w: &WorldState) {
        let area = self.map_area(w);
        let (bx, by) = self.compose_box(&area, 30, 4 + OPTIONS_COMMANDS.len() * 2, "OPTIONS");
        let cursor = w.screen.cursor();
        for (i, label) in OPTIONS_COMMANDS.iter().enumerate() {
            let y = by + 3 + i * 2;
            self.menu_line(bx + 2, y, label, i == cursor, BOX_BG);
            let scale = match i {
                OPTIONS_MUSIC => Some(w.music_volume),
                OPTIONS_SE => Some(w.se_volume),
                _ => None,
            };
            if let Some(scale) = scale {
                self.front.put_str(bx + 14, y, &volume_bar(scale), GREEN, BOX_BG);
            }
        }
    }

    fn compose_confirm_quit(&mut self, w: &WorldState) {
        let area = self.map_area(w);
        let (bx, by) = self.compose_box(&area, 30, 8, "Quit the game?");
        let cursor = w.screen.cursor();
        for (i, label) in CONFIRM_COMMANDS.iter().enumerate() {
            self.menu_line(bx + 11, by + 3 + i * 2, label, i == cursor, BOX_BG);
        }
    }

    fn compose_ending(&mut self, w: &WorldState) {
        let area = self.map_area(w);
        let (bx, by) = self.compose_box(&area, 36, 8, "★ You found the treasure! ★");
        let time = format!("Your time: {:.2}s", w.hud.play_time);
        self.front.put_str(bx + 3, by + 3, &time, Color::White, BOX_BG);
        self.front.put_str(bx + 3, by + 5, "ENTER  Back to title", GREEN, BOX_BG);
    }
}

fn volume_bar(scale: VolumeScale) -> String {
    (1..=VolumeScale::MAX)
        .map(|i| if i <= scale.level() { '█' } else { '░' })
        .collect()
}

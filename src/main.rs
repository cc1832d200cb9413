use std::env;
use std::fs;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use muncher::game::{GameState, GhostName, GhostState, Mode};
use muncher::geometry::{Direction, Point};
use muncher::levels;
use muncher::maze::{move_from, no_walls, Maze, Tile};
use muncher::path::path_between;
use muncher::scores;

const CELL_W: usize = 2;
const DEFAULT_TICK_MS: u64 = 140;
const DEFAULT_RENDER_FPS: u64 = 60;
const GHOST_MOVE_INTERVAL: u32 = 2;
const EATEN_GHOST_SCORE: u32 = 200;
const SCORES_FILE: &str = ".muncher_scores";

#[derive(Parser, Debug)]
#[command(name = "muncher", version, about = "Terminal maze-chase arcade game")]
struct Options {
    /// Level number to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Path to a level file overriding the built-in level-1 layout.
    #[arg(long)]
    maze: Option<PathBuf>,
    /// Terminal identifier; defaults to $TERM. Dumb terminals get plain
    /// ASCII glyphs.
    #[arg(long)]
    term: Option<String>,
    /// Seed for the run's random generator (random when omitted).
    #[arg(long)]
    seed: Option<u64>,
}

struct Session {
    state: GameState,
    pending_dir: Option<Direction>,
    ghost_tick: u32,
    charset: Charset,
    player_name: String,
    level_one_override: Option<String>,
    score_recorded: bool,
}

impl Session {
    fn level_text(&self, level: u32) -> &str {
        match (&self.level_one_override, level) {
            (Some(text), 1) => text,
            _ => levels::level_text(level),
        }
    }
}

fn main() -> io::Result<()> {
    let options = Options::parse();

    let level_one_override = match &options.maze {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };
    let term = options
        .term
        .clone()
        .or_else(|| env::var("TERM").ok())
        .unwrap_or_default();
    let player_name = env::var("USER").unwrap_or_else(|_| "player".to_string());

    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let table = scores::load(&scores_path());
    let level = options.level.max(1);
    let text = match (&level_one_override, level) {
        (Some(text), 1) => text.as_str(),
        _ => levels::level_text(level),
    };
    let state = GameState::new(rng, table, level, text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut session = Session {
        state,
        pending_dir: None,
        ghost_tick: 0,
        charset: Charset::for_term(&term),
        player_name,
        level_one_override,
        score_recorded: false,
    };

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut session);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    // Persist the table regardless of how the run ended.
    scores::save(&scores_path(), &session.state.scores)?;
    result
}

fn scores_path() -> PathBuf {
    match env::var("MUNCHER_SCORES") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from(SCORES_FILE),
    }
}

fn read_speed_settings() -> (u64, u64) {
    let tick_ms = env::var("MUNCHER_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TICK_MS);
    let render_fps = env::var("MUNCHER_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (tick_ms, render_fps)
}

fn run(stdout: &mut Stdout, session: &mut Session) -> io::Result<()> {
    let (tick_ms, render_fps) = read_speed_settings();
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));
    let dt = tick_ms as f64 / 1000.0;
    let mut renderer = Renderer::new(
        session.state.maze.cols() as usize,
        session.state.maze.rows() as usize,
    );
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('r') if session.state.mode == Mode::GameOver => {
                        restart(session)?;
                        renderer.needs_full = true;
                    }
                    _ => {
                        if let Some(dir) = dir_for_key(key.code) {
                            session.pending_dir = Some(dir);
                            if session.state.mode == Mode::StartScreen {
                                session.state.mode = Mode::Running;
                            }
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(tick_ms) {
            last_tick = Instant::now();
            tick(session, dt)?;
        }
        render(stdout, session, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Direction::North),
        KeyCode::Down | KeyCode::Char('j') => Some(Direction::South),
        KeyCode::Left | KeyCode::Char('h') => Some(Direction::West),
        KeyCode::Right | KeyCode::Char('l') => Some(Direction::East),
        _ => None,
    }
}

fn restart(session: &mut Session) -> io::Result<()> {
    let text = session.level_text(1).to_string();
    let state = std::mem::replace(&mut session.state, placeholder_state());
    session.state = state
        .restart(&text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    session.pending_dir = None;
    session.ghost_tick = 0;
    session.score_recorded = false;
    Ok(())
}

/// Stand-in used while a state is moved through a consuming transition.
/// Built from a statically known-good layout, so construction cannot fail.
fn placeholder_state() -> GameState {
    match GameState::new(
        StdRng::seed_from_u64(0),
        Vec::new(),
        1,
        levels::level_text(1),
    ) {
        Ok(state) => state,
        Err(_) => unreachable!("built-in level must load"),
    }
}

/// Whether an actor can commit a step from `from` in `dir`.
fn passable(maze: &Maze, from: Point, dir: Direction) -> bool {
    let next = move_from(maze, from, dir);
    if next == from {
        return false;
    }
    matches!(maze.tile(next), Some(tile) if !tile.is_wall())
}

fn tick(session: &mut Session, dt: f64) -> io::Result<()> {
    session.state.elapsed += dt;
    if session.state.mode != Mode::Running {
        return Ok(());
    }
    session.state.level_clock += dt;

    // Player: turn when the queued direction is open, then keep rolling.
    if let Some(dir) = session.pending_dir {
        if passable(&session.state.maze, session.state.player.pos, dir) {
            session.state.player.dir = dir;
            session.pending_dir = None;
        }
    }
    let player_dir = session.state.player.dir;
    if passable(&session.state.maze, session.state.player.pos, player_dir) {
        session.state.player.pos =
            move_from(&session.state.maze, session.state.player.pos, player_dir);
    }

    consume_tile(&mut session.state);
    consume_fruit(&mut session.state);

    if session.state.pellets_remaining == 0 {
        let next_text = session.level_text(session.state.level + 1).to_string();
        let prior = std::mem::replace(&mut session.state, placeholder_state());
        session.state = prior
            .advance_level(&next_text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        session.pending_dir = None;
        session.ghost_tick = 0;
        return Ok(());
    }

    session.ghost_tick = session.ghost_tick.wrapping_add(1);
    step_ghosts(&mut session.state, session.ghost_tick);

    if session.state.power_timer > 0.0 {
        session.state.power_timer = (session.state.power_timer - dt).max(0.0);
        if session.state.power_timer == 0.0 {
            for ghost in &mut session.state.ghosts {
                if ghost.state == GhostState::Edible {
                    ghost.state = GhostState::Normal;
                }
            }
        }
    }

    handle_collisions(session);
    Ok(())
}

fn consume_tile(state: &mut GameState) {
    let here = state.maze.tile(state.player.pos).copied();
    match here {
        Some(Tile::Pellet) => {
            state.maze.clear_tile(state.player.pos);
            state.counters.pellets_eaten += 1;
            state.pellets_remaining = state.pellets_remaining.saturating_sub(1);
        }
        Some(Tile::PowerPellet) => {
            state.maze.clear_tile(state.player.pos);
            state.counters.power_pellets_eaten += 1;
            state.pellets_remaining = state.pellets_remaining.saturating_sub(1);
            state.power_timer = state.power_secs;
            state.power_multiplier = 1;
            for ghost in &mut state.ghosts {
                if ghost.state == GhostState::Normal {
                    ghost.state = GhostState::Edible;
                }
            }
        }
        _ => {}
    }
}

fn fruit_visible(state: &GameState) -> bool {
    match &state.fruit {
        Some(fruit) => {
            state.level_clock >= fruit.appear_after
                && state.level_clock < fruit.appear_after + fruit.shown_for
        }
        None => false,
    }
}

fn consume_fruit(state: &mut GameState) {
    let Some(fruit) = state.fruit else {
        return;
    };
    if state.level_clock >= fruit.appear_after + fruit.shown_for {
        state.fruit = None;
        return;
    }
    if fruit_visible(state) && state.player.pos == fruit.pos {
        state.counters.fruit_score += fruit.kind.score();
        state.fruit = None;
    }
}

/// Blinky skips the every-other-tick slowdown while he has a clear corridor
/// view of the player on his own row.
fn sees_player(maze: &Maze, ghost: Point, player: Point) -> bool {
    if ghost.row != player.row {
        return false;
    }
    let row = maze.row_tiles(ghost.row);
    no_walls(ghost.col as usize - 1, player.col as usize - 1, row)
}

fn step_ghosts(state: &mut GameState, ghost_tick: u32) {
    let player_pos = state.player.pos;
    let maze = state.maze.clone();

    for ghost in &mut state.ghosts {
        let pos = ghost.placement.pos;
        let next = match ghost.state {
            GhostState::Normal => {
                let rushing =
                    ghost.name == GhostName::Blinky && sees_player(&maze, pos, player_pos);
                if !rushing && ghost_tick % GHOST_MOVE_INTERVAL != 0 {
                    continue;
                }
                step_toward(&maze, pos, player_pos)
            }
            GhostState::Edible => {
                if ghost_tick % GHOST_MOVE_INTERVAL != 0 {
                    continue;
                }
                step_away(&maze, pos, player_pos)
            }
            GhostState::Returning => step_toward(&maze, pos, ghost.placement.home.0),
        };
        if let Some(next) = next {
            if let Some(dir) = Direction::ALL
                .into_iter()
                .find(|d| move_from(&maze, pos, *d) == next)
            {
                ghost.placement.dir = dir;
            }
            ghost.placement.pos = next;
        }
        if ghost.state == GhostState::Returning && ghost.placement.pos == ghost.placement.home.0 {
            ghost.respawn();
        }
    }
}

/// Next point along the discovered path toward `target`, if one exists.
fn step_toward(maze: &Maze, from: Point, target: Point) -> Option<Point> {
    match path_between(maze, from, target) {
        Ok(path) => path.get(1).copied(),
        Err(_) => None,
    }
}

/// A legal step that maximizes distance from the player.
fn step_away(maze: &Maze, from: Point, player: Point) -> Option<Point> {
    Direction::ALL
        .into_iter()
        .filter(|dir| passable(maze, from, *dir))
        .map(|dir| move_from(maze, from, dir))
        .max_by_key(|p| p.manhattan(player))
}

fn handle_collisions(session: &mut Session) {
    let state = &mut session.state;
    let player_pos = state.player.pos;
    let mut killed = false;

    for ghost in &mut state.ghosts {
        if ghost.placement.pos != player_pos {
            continue;
        }
        match ghost.state {
            GhostState::Edible => {
                state.counters.ghost_score += EATEN_GHOST_SCORE * state.power_multiplier;
                state.power_multiplier *= 2;
                ghost.state = GhostState::Returning;
            }
            GhostState::Normal => killed = true,
            GhostState::Returning => {}
        }
    }

    if !killed {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    if state.lives == 0 {
        state.mode = Mode::GameOver;
        if !session.score_recorded {
            let score = state.score();
            let name = session.player_name.clone();
            scores::record(&mut state.scores, &name, score);
            session.score_recorded = true;
        }
        return;
    }
    state.player.respawn();
    for ghost in &mut state.ghosts {
        ghost.respawn();
    }
    state.power_timer = 0.0;
    session.pending_dir = None;
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Charset {
    Fancy,
    Plain,
}

impl Charset {
    fn for_term(term: &str) -> Charset {
        if term == "dumb" || term.starts_with("vt") {
            Charset::Plain
        } else {
            Charset::Fancy
        }
    }

    fn player(self) -> char {
        match self {
            Charset::Fancy => '😃',
            Charset::Plain => 'C',
        }
    }

    fn ghost(self, state: GhostState) -> char {
        match (self, state) {
            (Charset::Fancy, GhostState::Normal) => '👻',
            (Charset::Fancy, GhostState::Edible) => '😱',
            (Charset::Fancy, GhostState::Returning) => '°',
            (Charset::Plain, GhostState::Normal) => 'M',
            (Charset::Plain, GhostState::Edible) => 'W',
            (Charset::Plain, GhostState::Returning) => 'o',
        }
    }

    fn fruit(self, kind: muncher::fruit::FruitKind) -> char {
        use muncher::fruit::FruitKind;
        match self {
            Charset::Plain => '%',
            Charset::Fancy => match kind {
                FruitKind::Cherry => '🍒',
                FruitKind::Strawberry => '🍓',
                FruitKind::Orange => '🍊',
                FruitKind::Apple => '🍎',
                FruitKind::Melon => '🍈',
                FruitKind::Galaxian => '🚀',
                FruitKind::Bell => '🔔',
                FruitKind::Key => '🔑',
            },
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_footer: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    ch: ' ',
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_footer: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

fn cell_for(session: &Session, pos: Point) -> Cell {
    let state = &session.state;
    let charset = session.charset;
    if pos == state.player.pos {
        return Cell {
            ch: charset.player(),
            color: Color::Yellow,
        };
    }
    for ghost in &state.ghosts {
        if ghost.placement.pos == pos {
            let color = match ghost.state {
                GhostState::Normal => Color::Red,
                GhostState::Edible => Color::Blue,
                GhostState::Returning => Color::Grey,
            };
            return Cell {
                ch: charset.ghost(ghost.state),
                color,
            };
        }
    }
    if let Some(fruit) = &state.fruit {
        if fruit_visible(state) && fruit.pos == pos {
            return Cell {
                ch: charset.fruit(fruit.kind),
                color: Color::Green,
            };
        }
    }
    match state.maze.tile(pos) {
        Some(&Tile::Wall(glyph)) => Cell {
            ch: glyph,
            color: Color::DarkBlue,
        },
        Some(Tile::Pellet) => Cell {
            ch: '·',
            color: Color::White,
        },
        Some(Tile::PowerPellet) => Cell {
            ch: '●',
            color: Color::Magenta,
        },
        Some(Tile::Warp { .. }) => Cell {
            ch: '≈',
            color: Color::Cyan,
        },
        Some(&Tile::OneWay(dir)) => Cell {
            ch: match dir {
                Direction::North => '↑',
                Direction::South => '↓',
                Direction::East => '→',
                Direction::West => '←',
            },
            color: Color::DarkGrey,
        },
        Some(Tile::Empty) | None => Cell {
            ch: ' ',
            color: Color::Reset,
        },
    }
}

fn render(stdout: &mut Stdout, session: &Session, renderer: &mut Renderer) -> io::Result<()> {
    let state = &session.state;
    let height = state.maze.rows() as usize;
    let width = state.maze.cols() as usize;
    let needed_h = (height + 3) as u16;
    let needed_w = (width * CELL_W) as u16;

    if renderer.last.len() != width * height {
        *renderer = Renderer::new(width, height);
    }

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Score: {}  Lives: {}  Level: {}  Pellets: {}  Power: {:.0}  (q to quit)",
        state.score(),
        state.lives,
        state.level,
        state.pellets_remaining,
        state.power_timer,
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for row in 1..=height {
        for col in 1..=width {
            let pos = Point::new(row as i32, col as i32);
            let cell = cell_for(session, pos);
            let idx = (row - 1) * width + (col - 1);
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, col - 1, row - 1, cell)?;
            }
        }
    }

    let footer = match state.mode {
        Mode::StartScreen => "Press an arrow key to start".to_string(),
        Mode::GameOver => format!(
            "GAME OVER - Final score: {} (r to restart, q to quit)",
            state.score()
        ),
        Mode::Running => String::new(),
    };
    if renderer.needs_full || footer != renderer.last_footer {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + height as u16))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Print(&footer))?;
        stdout.queue(ResetColor)?;
        renderer.last_footer = footer;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn draw_cell(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    cell: Cell,
) -> io::Result<()> {
    use unicode_width::UnicodeWidthStr;

    let mut buf = [0u8; 4];
    let text: &str = cell.ch.encode_utf8(&mut buf);
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    for _ in 0..CELL_W.saturating_sub(w) {
        stdout.queue(Print(' '))?;
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

mod config;
mod render;
mod sim;

use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};

use render::{Canvas, ColorMode, RenderMode};
use sim::{Show, ShowOptions};

#[derive(Parser)]
#[command(name = "skywrite", about = "Terminal fireworks that spell out a message")]
struct Cli {
    /// Message the fireworks spell out (spaces pause the show)
    message: Option<String>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Disable spark trails
    #[arg(long)]
    no_trails: bool,

    /// Disable smoke puffs
    #[arg(long)]
    no_smoke: bool,

    /// Single color per burst instead of a 3-color palette
    #[arg(long)]
    no_color_mix: bool,

    /// Hide the status bar for pure animation mode
    #[arg(long)]
    clean: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let file_config = config::load_config();

    if cli.show_config {
        match config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No config directory available on this platform"),
        }
        return Ok(());
    }

    if cli.init_config {
        let Some(path) = config::config_path() else {
            eprintln!("No config directory available on this platform");
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, config::default_config_string())?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    // CLI overrides config, config overrides defaults
    let message = cli
        .message
        .clone()
        .or(file_config.message)
        .unwrap_or_else(|| sim::DEFAULT_MESSAGE.to_string());
    let render_mode = cli
        .render
        .or(file_config.render.map(Into::into))
        .unwrap_or(RenderMode::Braille);
    let color_mode = cli
        .color
        .or(file_config.color.map(Into::into))
        .unwrap_or(ColorMode::TrueColor);
    let fps = cli.fps.or(file_config.fps).unwrap_or(60).clamp(1, 120);
    let options = ShowOptions {
        trails: !cli.no_trails && file_config.trails.unwrap_or(true),
        smoke: !cli.no_smoke && file_config.smoke.unwrap_or(true),
        colorful: !cli.no_color_mix && file_config.colorful.unwrap_or(true),
    };
    let hide_status = cli.clean || file_config.clean.unwrap_or(false);
    let frame_dur = Duration::from_secs_f64(1.0 / fps as f64);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(
        &mut writer,
        &message,
        options,
        render_mode,
        color_mode,
        hide_status,
        frame_dur,
    );

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

const RENDER_MODES: [RenderMode; 2] = [RenderMode::Braille, RenderMode::HalfBlock];
const COLOR_MODES: [ColorMode; 4] = [
    ColorMode::TrueColor,
    ColorMode::Ansi256,
    ColorMode::Ansi16,
    ColorMode::Mono,
];

#[allow(clippy::too_many_arguments)]
fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    message: &str,
    options: ShowOptions,
    mut render_mode: RenderMode,
    mut color_mode: ColorMode,
    mut hide_status: bool,
    frame_dur: Duration,
) -> io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let display_rows = |rows: u16, hide: bool| {
        if hide {
            rows as usize
        } else {
            (rows as usize).saturating_sub(1)
        }
    };

    let mut canvas = Canvas::new(
        cols as usize,
        display_rows(rows, hide_status),
        render_mode,
        color_mode,
    );
    // The show runs in its own fixed simulation space, so it survives
    // resizes and render mode changes untouched.
    let mut show = Show::new(message, options);
    let mut rng = rand::rng();

    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('n') => show.restart(),
                    KeyCode::Char('r') => {
                        let idx = RENDER_MODES
                            .iter()
                            .position(|&m| m == render_mode)
                            .unwrap_or(0);
                        render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('c') => {
                        let idx = COLOR_MODES
                            .iter()
                            .position(|&m| m == color_mode)
                            .unwrap_or(0);
                        color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            canvas = Canvas::new(
                cols as usize,
                display_rows(rows, hide_status),
                render_mode,
                color_mode,
            );
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        let frame_start = Instant::now();

        // One simulation tick, then render
        show.tick(&mut canvas, frame_start, &mut rng);
        let frame = canvas.render();

        // Skip the frame if the terminal changed size mid-render
        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        // Build entire frame into buffer before flushing
        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let phase = if show.message_done() { "idle" } else { "spelling" };
            let status = format!(
                " skywrite | {:?} | {:?} | {:.0} fps | {} ({} live) | [r] render  [c] color  [n] replay  [h] hide  [q] quit ",
                render_mode, color_mode, actual_fps, phase, show.firework_count(),
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

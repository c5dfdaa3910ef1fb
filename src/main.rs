//! Beatgrid terminal player
//!
//! Usage: `beatgrid [LEVEL.json | --campaign PACK.json] [x,y,DIR ...]`
//!
//! Loads a level, a campaign pack or the built-in demo and applies the
//! given arrows to each level. Runs play in real time with the board
//! printed after every beat; a solved level moves on to the next one.

use std::time::{Duration, Instant};

use glam::IVec2;

use beatgrid::audio::AudioManager;
use beatgrid::render::TextRenderer;
use beatgrid::sim::{Color, Direction, SimPhase};
use beatgrid::{Campaign, LevelConfig, Session, Settings};

const SETTINGS_FILE: &str = "beatgrid_settings.json";
/// Host frame length; beats are paced by the session clock, not by this
const FRAME: Duration = Duration::from_millis(50);

type Player = Session<TextRenderer, AudioManager>;

/// Blue and Green walk North side by side; solvable without edits
fn demo_level() -> LevelConfig {
    LevelConfig::new(5, 5)
        .named("Demo")
        .with_color(Color::Blue, IVec2::new(0, 4), IVec2::new(0, 2), IVec2::new(0, 0))
        .with_color(Color::Green, IVec2::new(4, 4), IVec2::new(4, 2), IVec2::new(4, 0))
}

/// Parse `x,y,DIR` where DIR is one of N, E, S, W
fn parse_edit(arg: &str) -> Option<(i32, i32, Direction)> {
    let mut parts = arg.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    let mut dir = parts.next()?.trim().chars();
    let dir = Direction::from_char(dir.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y, dir))
}

fn draw(player: &mut Player) {
    if !player.view_mut().take_dirty() {
        return;
    }
    if let Some(board) = player.board() {
        print!("{}", player.view().render(board));
        println!(
            "beat {} | {:?}\n",
            player.engine().beat(),
            player.phase()
        );
    }
}

fn exit_with(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

/// Pick the level source from the leading arguments
fn open_campaign(args: &mut std::iter::Peekable<impl Iterator<Item = String>>) -> Campaign {
    if args.next_if(|a| a == "--campaign").is_some() {
        let Some(path) = args.next() else {
            exit_with("--campaign needs a file");
        };
        return Campaign::load(&path)
            .unwrap_or_else(|e| exit_with(format!("Cannot read campaign {path}: {e}")));
    }
    let level = match args.next_if(|a| a.ends_with(".json")) {
        Some(path) => LevelConfig::load(&path)
            .unwrap_or_else(|e| exit_with(format!("Cannot read level {path}: {e}"))),
        None => demo_level(),
    };
    Campaign::new(vec![vec![level]])
}

/// Apply the arrows, start, and run until the outcome is revealed
fn play(player: &mut Player, edits: &[(i32, i32, Direction)]) -> SimPhase {
    for &(x, y, dir) in edits {
        if let Err(e) = player.set_arrow_at(x, y, dir) {
            log::warn!("Skipping arrow {x},{y}: {e}");
        }
    }

    draw(player);
    if let Err(e) = player.start_simulation() {
        exit_with(format!("Cannot start: {e}"));
    }

    let mut last = Instant::now();
    loop {
        std::thread::sleep(FRAME);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        if let Some(report) = player.update(dt) {
            for failure in &report.failures {
                println!(
                    "{} token failed at ({}, {}): {:?}",
                    failure.color.as_str(),
                    failure.cell.x,
                    failure.cell.y,
                    failure.kind
                );
            }
        }
        draw(player);

        if let Some(status) = player.view().status_line() {
            println!("{status}");
            return player.phase();
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Beatgrid starting...");

    let settings = Settings::load(SETTINGS_FILE);
    let mut args = std::env::args().skip(1).peekable();
    let mut campaign = open_campaign(&mut args);

    let edits: Vec<_> = args
        .filter_map(|arg| {
            let edit = parse_edit(&arg);
            if edit.is_none() {
                log::warn!("Ignoring '{arg}', expected x,y,N|E|S|W");
            }
            edit
        })
        .collect();

    let mut audio = AudioManager::new();
    audio.apply_settings(&settings);
    let renderer = TextRenderer::new(settings.show_coordinates);
    let mut player = Session::new(&settings, renderer, audio);

    if let Err(e) = player.load_current(&campaign) {
        exit_with(format!("Invalid level: {e}"));
    }
    loop {
        println!("== {} ==", campaign.display_name());
        if play(&mut player, &edits) != SimPhase::Succeeded {
            break;
        }
        match player.next_level(&mut campaign) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => exit_with(format!("Invalid level: {e}")),
        }
    }
    println!(
        "{} of {} levels completed",
        campaign.completed_count(),
        campaign.level_count()
    );
}

use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;
use std::time::Duration;
use tilepop_core::*;

mod scenario;
mod view;

use scenario::{Action, Scenario};
use view::{LogPresenter, LogView};

/// Plays a scripted scenario against the piece and score core, frame by frame.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Scenario TOML file, the built-in demo when omitted
    scenario: Option<PathBuf>,

    /// Override the scenario's piece move speed (units per second)
    #[arg(short, long)]
    speed: Option<f32>,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60)]
    fps: u16,

    /// Seconds to simulate, defaults to one second past the last action
    #[arg(short, long)]
    duration: Option<f32>,

    /// Pace frames against the wall clock instead of stepping instantly
    #[arg(long)]
    realtime: bool,
}

struct Sim {
    pieces: Vec<Piece<LogView>>,
    board: Board,
    notifiers: Vec<ScoreNotifier<LogPresenter>>,
}

impl Sim {
    fn new(scenario: &Scenario) -> anyhow::Result<Self> {
        let pieces = scenario
            .pieces
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Piece::with_config(
                    spec.kind,
                    spec.hardened,
                    spec.position,
                    scenario.piece_config,
                    LogView::new(format!("piece {}", index)),
                )
            })
            .collect();

        let board = Board::new();
        let notifiers = (0..scenario.notifiers)
            .map(|index| {
                ScoreNotifier::builder(LogPresenter::new(format!("score text {}", index)))
                    .board(&board)
                    .build()
                    .with_context(|| format!("wiring score text {}", index))
            })
            .collect::<anyhow::Result<_>>()?;

        Ok(Self {
            pieces,
            board,
            notifiers,
        })
    }

    fn apply(&mut self, piece: Option<usize>, action: Action, now: Seconds) {
        match (action, piece.and_then(|index| self.pieces.get_mut(index))) {
            (Action::Award(points), _) => {
                self.board.award_points(points);
            }
            (Action::MoveTo(target), Some(piece)) => {
                if !piece.move_to(target, now).has_update() {
                    log::info!("{} is still moving, move to {} dropped", piece, target);
                }
            }
            (Action::SetState(state), Some(piece)) => piece.set_state(state),
            (action, None) => log::warn!("no piece {:?} for {:?}", piece, action),
        }
    }

    fn tick(&mut self, now: Seconds) {
        for (index, piece) in self.pieces.iter_mut().enumerate() {
            if piece.tick(now) == MotionOutcome::Arrived {
                log::info!("piece {} ({}) settled at {}", index, piece, piece.position());
            }
        }
    }
}

/// Requested run length, or one second past the last scheduled action.
fn resolve_duration(requested: Option<Seconds>, scenario: &Scenario) -> anyhow::Result<Seconds> {
    let duration = requested.unwrap_or_else(|| scenario.last_action_at() + 1.0);
    anyhow::ensure!(
        duration.is_finite() && duration >= 0.0,
        "duration must be a finite, non-negative number of seconds, got {}",
        duration
    );
    Ok(duration)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::parse(scenario::DEMO).context("loading built-in demo")?,
    };
    if let Some(speed) = args.speed {
        scenario.piece_config.move_speed = speed;
        scenario.validate()?;
    }
    anyhow::ensure!(args.fps > 0, "fps must be positive");

    let duration = resolve_duration(args.duration, &scenario)?;
    let frame_time = 1.0 / f32::from(args.fps);
    log::debug!(
        "running {} pieces for {}s at {} fps",
        scenario.pieces.len(),
        duration,
        args.fps
    );

    let mut sim = Sim::new(&scenario)?;
    let clock = FrameClock::start();
    let mut pending = scenario.actions.iter().peekable();
    let mut frame: u32 = 0;
    loop {
        let now = frame as f32 * frame_time;
        if now > duration {
            break;
        }
        if args.realtime {
            let ahead = now - clock.now();
            if ahead > 0.0 {
                std::thread::sleep(Duration::from_secs_f32(ahead));
            }
        }

        while let Some(scheduled) = pending.next_if(|scheduled| scheduled.at <= now) {
            sim.apply(scheduled.piece, scheduled.action, now);
        }
        sim.tick(now);
        frame += 1;
    }

    for (index, piece) in sim.pieces.iter().enumerate() {
        println!(
            "piece {}: {} {:?} at {} (hardened: {}, hit testing: {})",
            index,
            piece,
            piece.state(),
            piece.position(),
            piece.is_hardened(),
            piece.view().hit_testing()
        );
    }
    println!(
        "board: score {} over {} awards",
        sim.board.score(),
        sim.board.awards()
    );
    for (index, notifier) in sim.notifiers.iter().enumerate() {
        let presenter = notifier.presenter();
        println!(
            "score text {}: {:?} ({} cues)",
            index,
            presenter.label(),
            presenter.cues_played()
        );
    }
    Ok(())
}

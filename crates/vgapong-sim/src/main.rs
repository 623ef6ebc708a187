//! vgapong-sim - run the Pong engine against a fake board
//!
//! Usage: vgapong-sim [OPTIONS]

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vgapong::prelude::*;
use vgapong_sim::report;
use vgapong_sim::{InputScript, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "vgapong-sim")]
#[command(author = "VGA Pong Team")]
#[command(version)]
#[command(about = "Drive the vgapong engine with fake hardware and report the tick budget", long_about = None)]
struct Args {
    /// Display width reported by the resolution register
    #[arg(long, default_value_t = 320, value_parser = clap::value_parser!(u32).range(1..=0xFFFF))]
    width: u32,

    /// Display height reported by the resolution register
    #[arg(long, default_value_t = 240, value_parser = clap::value_parser!(u32).range(1..=0xFFFF))]
    height: u32,

    /// Number of timer interrupts to deliver
    #[arg(short = 'n', long, default_value_t = 250)]
    ticks: u32,

    /// Busy polls the display controller takes per flip
    #[arg(long, default_value_t = 0)]
    flip_latency: u32,

    /// Give up on a flip after this many busy polls (default: wait forever)
    #[arg(long)]
    max_polls: Option<u32>,

    /// Cycles charged per pixel write
    #[arg(long, default_value_t = CostModel::DEFAULT.cycles_per_pixel)]
    cycles_per_pixel: u32,

    /// Cycles charged per busy status poll
    #[arg(long, default_value_t = CostModel::DEFAULT.cycles_per_poll)]
    cycles_per_poll: u32,

    /// Timer period in cycles
    #[arg(long, default_value_t = vgapong::config::DEFAULT_TIMER_PERIOD)]
    period: u32,

    /// Ball displacement per tick on both axes
    #[arg(long, default_value_t = Rules::DEFAULT.ball_step_x, value_parser = clap::value_parser!(i32).range(1..))]
    ball_speed: i32,

    /// Input script (`<tick> <switches> <buttons>` per line)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Write the final displayed frame as a PGM image
    #[arg(long)]
    dump_frame: Option<PathBuf>,

    /// Draw the score as digits instead of pips
    #[arg(long)]
    digits: bool,

    /// Draw a dashed centre net
    #[arg(long)]
    net: bool,

    /// Print a text preview of the final frame
    #[arg(long)]
    preview: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn session_config(args: &Args) -> SessionConfig {
    let mut game = GameConfig::DEFAULT;
    game.rules.ball_step_x = args.ball_speed;
    game.rules.ball_step_y = args.ball_speed;
    game.timer_period = args.period;
    game.cost_model = CostModel {
        cycles_per_pixel: args.cycles_per_pixel,
        cycles_per_poll: args.cycles_per_poll,
    };
    game.flip_policy = match args.max_polls {
        Some(max_polls) => FlipPolicy::Bounded { max_polls },
        None => FlipPolicy::Unbounded,
    };
    game.render.center_net = args.net;
    if args.digits {
        game.render.score_style = ScoreStyle::Digits;
    }

    SessionConfig {
        geometry: Geometry::new(args.width, args.height),
        ticks: args.ticks,
        flip_latency: args.flip_latency,
        game,
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let script = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            InputScript::parse(&source).with_context(|| format!("invalid script {}", path.display()))?
        }
        None => InputScript::default(),
    };

    let config = session_config(args);
    let summary = vgapong_sim::run(&config, &script).context("engine failed to initialize")?;

    print!("{}", report::summary_text(&summary));

    if args.preview {
        let background = config.game.render.palette.background;
        print!("{}", report::ascii_preview(summary.geometry, &summary.frame, background, 80));
    }

    if let Some(path) = &args.dump_frame {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        report::write_pgm(BufWriter::new(file), summary.geometry, &summary.frame)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "frame written");
    }

    if let Some(err) = summary.halted {
        bail!("display halted: {err}");
    }
    Ok(())
}

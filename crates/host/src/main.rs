mod config;
mod device;
mod events;
mod link;
mod runner;

use anyhow::{Result, ensure};
use clap::{Parser, ValueEnum};

use config::HostConfig;
use rally::{BonusToggles, GameMode, LinkSimulation, MatchSettings};
use runner::{MatchSummary, run_match};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Competitive,
    Cooperative,
    Solo,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Competitive => GameMode::Competitive,
            ModeArg::Cooperative => GameMode::Cooperative,
            ModeArg::Solo => GameMode::Solo,
        }
    }
}

#[derive(Parser)]
#[command(name = "rally-host")]
#[command(about = "Plays a bot-driven table tennis match between two simulated devices")]
struct Args {
    #[arg(short, long, value_enum, default_value_t = ModeArg::Competitive)]
    mode: ModeArg,

    #[arg(short, long, default_value_t = rally::settings::DEFAULT_DIFFICULTY, help = "0 easy to 3 expert")]
    difficulty: i32,

    #[arg(long, default_value_t = rally::settings::DEFAULT_FLIGHT_TIME_MS)]
    flight_time: i64,

    #[arg(long, help = "Disable the spin, copy, grid effect and overuse bonuses")]
    no_bonuses: bool,

    #[arg(long)]
    no_rally_shrink: bool,

    #[arg(long, default_value_t = 40, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 40, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, default_value_t = 8, help = "Virtual milliseconds per real millisecond")]
    speed: u32,

    #[arg(long, default_value_t = 0.85, help = "Chance the bot swings inside the window")]
    accuracy: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 30, help = "Give up after this many virtual minutes")]
    max_minutes: i64,

    #[arg(long, help = "Print the match summary as JSON")]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<HostConfig> {
        ensure!(
            (0.0..=1.0).contains(&self.accuracy),
            "accuracy must be between 0 and 1, got {}",
            self.accuracy
        );
        ensure!(
            self.min_latency <= self.max_latency,
            "min latency {} exceeds max latency {}",
            self.min_latency,
            self.max_latency
        );
        ensure!(self.flight_time > 0, "flight time must be positive");

        let settings = MatchSettings {
            flight_time_ms: self.flight_time,
            difficulty: self.difficulty,
            rally_shrink_enabled: !self.no_rally_shrink,
            bonuses: if self.no_bonuses {
                BonusToggles::NONE
            } else {
                BonusToggles::ALL
            },
            ..MatchSettings::for_mode(self.mode.into())
        };

        Ok(HostConfig {
            settings,
            link: LinkSimulation {
                min_latency_ms: self.min_latency,
                max_latency_ms: self.max_latency,
                jitter_ms: self.jitter,
            },
            speed: self.speed,
            accuracy: self.accuracy,
            seed: self.seed,
            max_match_ms: self.max_minutes.max(1) * 60 * 1000,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let json = args.json;
    let config = args.into_config()?;

    log::info!(
        "{:?} match, difficulty {}, seed {}",
        config.settings.game_mode,
        config.settings.difficulty,
        config.seed
    );
    let summary = run_match(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &MatchSummary) {
    for device in &summary.devices {
        let score = match (device.rally_score, device.lives) {
            (Some(score), Some(lives)) => format!("team score {score}, {lives} lives"),
            _ => format!("{}-{}", device.scores[0], device.scores[1]),
        };
        let winner = device
            .winner
            .map(|side| format!(", {side} won"))
            .unwrap_or_default();
        println!(
            "{} ({:?}): {}{winner}, longest rally {}, peak tiers {:?}, {} swings, {} sent / {} received / {} dropped",
            device.side,
            device.role,
            score,
            device.longest_rally,
            device.peak_tiers,
            device.swings,
            device.link.messages_sent,
            device.link.messages_received,
            device.link.messages_dropped,
        );
        println!("  finished: {}", device.finish.as_str());
    }
    println!(
        "{} events, devices {}",
        summary.events,
        if summary.consistent { "agree" } else { "disagree" }
    );
}

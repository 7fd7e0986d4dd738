//! Switch - servo-driven wall switch
//! Host control loop: ticks the state machine, feeds commands, publishes state changes

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use switch_actuator::{ServoActuator, ServoStateMachine, SwitchState};
use switch_core::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "switch")]
#[command(author = "Silvano Neto <dev@silvanoneto.com>")]
#[command(version = "2026.1.16")]
#[command(about = "Servo-driven wall switch controller", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to environment / .env)
    #[arg(long, global = true, env = "SWITCH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control loop, feeding position commands in order
    Run {
        /// Position to switch to (top, bottom, neutral); repeatable
        #[arg(short = 'c', long = "command", value_name = "POSITION")]
        commands: Vec<Position>,

        #[command(flatten)]
        pacing: Pacing,
    },

    /// Sweep raw angles in manual mode to find calibration values
    Calibrate {
        /// First angle (degrees)
        #[arg(long, default_value_t = 0)]
        from: i32,

        /// Last angle (degrees)
        #[arg(long, default_value_t = 180)]
        to: i32,

        /// Angle increment (degrees)
        #[arg(long, default_value_t = 5)]
        step: usize,

        /// Time to hold each angle (ms)
        #[arg(long, default_value_t = 500)]
        hold_ms: u64,

        #[command(flatten)]
        pacing: Pacing,
    },

    /// Print the resolved configuration
    Config,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Pacing {
    /// Control loop period (ms)
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Follow the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,

    /// Abort after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
}

impl Pacing {
    fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switch=info,switch_actuator=info,switch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { commands, pacing } => {
            let published = with_machine(config, pacing, |machine, pace| {
                run_loop(machine, commands, pacing, pace)
            })?;
            tracing::info!(changes = published.len(), "Run finished");
        }

        Commands::Calibrate {
            from,
            to,
            step,
            hold_ms,
            pacing,
        } => {
            let sweep = Sweep {
                from,
                to,
                step,
                hold: Duration::from_millis(hold_ms),
            };
            with_machine(config, pacing, |machine, pace| {
                calibrate(machine, sweep, pacing, pace)
            })?;
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SwitchConfig> {
    match path {
        Some(path) => SwitchConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => SwitchConfig::from_env().context("loading configuration from environment"),
    }
}

/// Builds a machine on a simulated servo and the requested clock, then hands it to `body`
fn with_machine<T>(
    config: SwitchConfig,
    pacing: Pacing,
    body: impl FnOnce(&mut dyn Host, &mut dyn FnMut()) -> Result<T>,
) -> Result<T> {
    let servo = ServoActuator::named(&config.name);
    let tick = pacing.tick();

    if pacing.realtime {
        let mut machine = ServoStateMachine::new(config, servo, MonotonicClock::new())?;
        body(&mut machine, &mut || thread::sleep(tick))
    } else {
        let clock = ManualClock::new();
        let mut machine = ServoStateMachine::new(config, servo, clock.clone())?;
        body(&mut machine, &mut || clock.advance(tick))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST LOOP
// ═══════════════════════════════════════════════════════════════════════════════

/// What the control loop needs from a machine, independent of its clock
trait Host {
    fn setup(&mut self) -> bool;
    fn tick(&mut self);
    fn set_pos(&mut self, position: Position) -> bool;
    fn set_manual_pos(&mut self, degrees: i32) -> bool;
    fn has_position_changed(&mut self) -> bool;
    fn phase(&self) -> Phase;
    fn snapshot(&self) -> SwitchState;
    fn pulse_width_us(&self) -> u32;
}

impl<C: Clock> Host for ServoStateMachine<ServoActuator, C> {
    fn setup(&mut self) -> bool {
        ServoStateMachine::setup(self)
    }

    fn tick(&mut self) {
        ServoStateMachine::tick(self)
    }

    fn set_pos(&mut self, position: Position) -> bool {
        ServoStateMachine::set_pos(self, position)
    }

    fn set_manual_pos(&mut self, degrees: i32) -> bool {
        ServoStateMachine::set_manual_pos(self, degrees)
    }

    fn has_position_changed(&mut self) -> bool {
        ServoStateMachine::has_position_changed(self)
    }

    fn phase(&self) -> Phase {
        ServoStateMachine::phase(self)
    }

    fn snapshot(&self) -> SwitchState {
        ServoStateMachine::snapshot(self)
    }

    fn pulse_width_us(&self) -> u32 {
        self.driver().pulse_width_us()
    }
}

/// One loop iteration: tick, publish on change, wait one period
fn step(
    host: &mut dyn Host,
    pace: &mut dyn FnMut(),
    published: &mut Vec<SwitchState>,
) -> Result<()> {
    host.tick();
    if host.has_position_changed() {
        let state = host.snapshot();
        println!("{}", serde_json::to_string(&state)?);
        published.push(state);
    }
    pace();
    Ok(())
}

/// Feeds `commands` in order, retrying each until accepted, and stops once
/// the queue is drained and the machine is idle again.
fn run_loop(
    host: &mut dyn Host,
    commands: Vec<Position>,
    pacing: Pacing,
    pace: &mut dyn FnMut(),
) -> Result<Vec<SwitchState>> {
    let mut queue: VecDeque<Position> = commands.into();
    let mut published = Vec::new();
    let mut in_flight = false;

    host.setup();

    for _ in 0..pacing.max_ticks {
        if let Some(&next) = queue.front() {
            if host.set_pos(next) {
                tracing::info!(position = %next, "Command accepted");
                queue.pop_front();
                in_flight = next != Position::Neutral;
            }
        } else if host.phase() == Phase::Idle && !in_flight {
            return Ok(published);
        }

        step(host, pace, &mut published)?;

        if host.phase() != Phase::Idle {
            in_flight = false;
        }
    }

    bail!("machine did not settle within {} ticks", pacing.max_ticks)
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    from: i32,
    to: i32,
    step: usize,
    hold: Duration,
}

impl Sweep {
    fn angles(&self) -> Vec<i32> {
        let step = self.step.max(1);
        if self.from <= self.to {
            (self.from..=self.to).step_by(step).collect()
        } else {
            (self.to..=self.from).rev().step_by(step).collect()
        }
    }
}

/// Manual-mode sweep; leaves the machine idle
fn calibrate(
    host: &mut dyn Host,
    sweep: Sweep,
    pacing: Pacing,
    pace: &mut dyn FnMut(),
) -> Result<()> {
    let mut published = Vec::new();
    let hold_ticks = (sweep.hold.as_millis() as u64).div_ceil(pacing.tick_ms.max(1)).max(1);
    let mut budget = pacing.max_ticks;

    host.setup();

    for degrees in sweep.angles() {
        if Angle::try_from_deg(degrees).is_none() {
            bail!("angle {}° is outside the servo range", degrees);
        }
        while !host.set_manual_pos(degrees) {
            if budget == 0 {
                bail!("manual mode unavailable in phase {}", host.phase());
            }
            step(host, pace, &mut published)?;
            budget -= 1;
        }
        for _ in 0..hold_ticks {
            step(host, pace, &mut published)?;
        }
        tracing::info!(degrees, pulse_us = host.pulse_width_us(), "Holding angle");
    }

    host.set_manual_pos(-1);
    while host.phase() != Phase::Idle {
        if budget == 0 {
            bail!("machine did not leave manual mode");
        }
        step(host, pace, &mut published)?;
        budget -= 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn fast_config() -> SwitchConfig {
        SwitchConfig::default().with_timing(TimingProfile {
            init_ms: 100,
            attach_ms: 20,
            engage_ms: 30,
            return_ms: 30,
            detach_ms: 20,
        })
    }

    fn pacing() -> Pacing {
        Pacing {
            tick_ms: 10,
            realtime: false,
            max_ticks: 10_000,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_author_is_crate_author() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_author(), Some("Silvano Neto <dev@silvanoneto.com>"));
    }

    #[test]
    fn test_parse_run_commands() {
        let cli = Cli::parse_from(["switch", "run", "-c", "top", "--command", "bottom"]);
        match cli.command {
            Commands::Run { commands, pacing } => {
                assert_eq!(commands, vec![Position::Top, Position::Bottom]);
                assert_eq!(pacing.tick_ms, 10);
                assert!(!pacing.realtime);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_position() {
        assert!(Cli::try_parse_from(["switch", "run", "-c", "sideways"]).is_err());
    }

    #[test]
    fn test_run_loop_publishes_each_change() {
        let published = with_machine(fast_config(), pacing(), |machine, pace| {
            run_loop(machine, vec![Position::Top, Position::Bottom], pacing(), pace)
        })
        .unwrap();

        let currents: Vec<Position> = published.iter().map(|s| s.current).collect();
        assert_eq!(
            currents,
            vec![Position::Top, Position::Neutral, Position::Bottom, Position::Neutral]
        );
        assert_eq!(published.last().unwrap().latest, Position::Bottom);
    }

    #[test]
    fn test_run_loop_without_commands_settles() {
        let published = with_machine(fast_config(), pacing(), |machine, pace| {
            run_loop(machine, Vec::new(), pacing(), pace)
        })
        .unwrap();
        assert!(published.is_empty());
    }

    #[test]
    fn test_run_loop_gives_up() {
        let tight = Pacing {
            max_ticks: 3,
            ..pacing()
        };
        let result = with_machine(fast_config(), tight, |machine, pace| {
            run_loop(machine, vec![Position::Top], tight, pace)
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_angles() {
        let up = Sweep { from: 80, to: 100, step: 10, hold: Duration::ZERO };
        assert_eq!(up.angles(), vec![80, 90, 100]);

        let down = Sweep { from: 100, to: 85, step: 10, hold: Duration::ZERO };
        assert_eq!(down.angles(), vec![100, 90]);
    }

    #[test]
    fn test_calibrate_returns_to_idle() {
        let sweep = Sweep { from: 40, to: 140, step: 50, hold: Duration::from_millis(30) };
        with_machine(fast_config(), pacing(), |machine, pace| {
            calibrate(machine, sweep, pacing(), pace)?;
            assert_eq!(machine.phase(), Phase::Idle);
            assert_eq!(machine.snapshot().manual_deg, None);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_calibrate_rejects_out_of_range() {
        let sweep = Sweep { from: 170, to: 200, step: 20, hold: Duration::ZERO };
        let result = with_machine(fast_config(), pacing(), |machine, pace| {
            calibrate(machine, sweep, pacing(), pace)
        });
        assert!(result.is_err());
    }
}

//! Interactive focus session.
//!
//! Owns one timer driven by a real one-second interval and reads commands
//! from stdin, one per line. Ticks and commands are multiplexed with
//! `tokio::select!` on a current-thread runtime.

use std::io::Write;

use clap::Args;
use focuscycle_core::timer::{format_mm_ss, MODE_SWITCH_PROMPT};
use focuscycle_core::{
    request_mode_switch, Config, ConfigPatch, Database, Event, FocusCycleTimer, FocusTimeSink,
    IntervalScheduler, ModeSwitch, NullSink, TimerMode,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

type Timer = FocusCycleTimer<IntervalScheduler>;
type BoxError = Box<dyn std::error::Error>;

const BAR_WIDTH: usize = 20;

const CONFIG_USAGE: &str = "usage: config <focus|short|long|rounds> <value>";

/// `focus|short|long`
fn mode_keywords() -> String {
    TimerMode::ALL.map(TimerMode::keyword).join("|")
}

fn help_text() -> String {
    format!(
        "commands: start | pause | resume | reset | mode <{}> \
| config <focus|short|long|rounds> <value> | status | help | quit",
        mode_keywords()
    )
}

#[derive(Args)]
pub struct RunArgs {
    /// Focus phase length in minutes (overrides config for this session)
    #[arg(long)]
    focus: Option<u32>,
    /// Short break length in minutes
    #[arg(long)]
    short_break: Option<u32>,
    /// Long break length in minutes
    #[arg(long)]
    long_break: Option<u32>,
    /// Focus rounds before a long break
    #[arg(long)]
    rounds: Option<u32>,
    /// Start the first focus phase right away
    #[arg(long)]
    start: bool,
    /// Print events and snapshots as JSON lines instead of a status line
    #[arg(long)]
    json: bool,
    /// Do not record completed focus time in the ledger
    #[arg(long)]
    no_ledger: bool,
}

impl RunArgs {
    fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            focus_minutes: self.focus,
            short_break_minutes: self.short_break,
            long_break_minutes: self.long_break,
            rounds_per_cycle: self.rounds,
        }
    }
}

/// A line typed into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Mode(TimerMode),
    Config(ConfigPatch),
    Status,
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command".to_string());
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "start" | "s" => Command::Start,
            "pause" | "p" => Command::Pause,
            "resume" | "r" => Command::Resume,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            "mode" | "m" => {
                let mode = words
                    .next()
                    .ok_or_else(|| format!("usage: mode <{}>", mode_keywords()))?;
                Command::Mode(mode.parse()?)
            }
            "config" | "set" => {
                let key = words.next().ok_or(CONFIG_USAGE)?;
                let value: u32 = words
                    .next()
                    .ok_or(CONFIG_USAGE)?
                    .parse()
                    .map_err(|_| format!("not a whole number: {line}"))?;
                let mut patch = ConfigPatch::default();
                match key.to_ascii_lowercase().as_str() {
                    "focus" | "focus_minutes" => patch.focus_minutes = Some(value),
                    "short" | "short_break_minutes" => patch.short_break_minutes = Some(value),
                    "long" | "long_break_minutes" => patch.long_break_minutes = Some(value),
                    "rounds" | "rounds_per_cycle" => patch.rounds_per_cycle = Some(value),
                    other => return Err(format!("unknown setting: {other}")),
                }
                Command::Config(patch)
            }
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };
        if words.next().is_some() {
            return Err(format!("unexpected arguments: {line}"));
        }
        Ok(command)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Terminal rendering of timer events and status.
struct Output {
    json: bool,
    bell: bool,
}

impl Output {
    fn event(&self, event: &Event) -> Result<(), BoxError> {
        let mut stdout = std::io::stdout().lock();
        if self.json {
            writeln!(stdout, "{}", serde_json::to_string(event)?)?;
            return Ok(());
        }
        if let Some(text) = describe(event) {
            writeln!(stdout, "\r\x1b[2K{text}")?;
        }
        if self.bell && matches!(event, Event::PhaseCompleted { .. }) {
            write!(stdout, "\x07")?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn status(&self, timer: &Timer) -> Result<(), BoxError> {
        if self.json {
            return Ok(());
        }
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "\r\x1b[2K{}", render_status(timer))?;
        stdout.flush()?;
        Ok(())
    }

    fn snapshot(&self, timer: &Timer) -> Result<(), BoxError> {
        if self.json {
            return self.event(&timer.snapshot());
        }
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\r\x1b[2K{}", render_status(timer))?;
        Ok(())
    }

    /// Prose for humans. Goes to stderr in JSON mode so stdout stays parseable.
    fn message(&self, text: &str) -> Result<(), BoxError> {
        if self.json {
            eprintln!("{text}");
        } else {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "\r\x1b[2K{text}")?;
        }
        Ok(())
    }
}

fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::TimerStarted {
            mode,
            round,
            remaining_secs,
            ..
        } => format!("{mode} started (round {round}, {} left)", format_mm_ss(*remaining_secs)),
        Event::TimerPaused { remaining_secs, .. } => {
            format!("paused at {}", format_mm_ss(*remaining_secs))
        }
        Event::TimerResumed { remaining_secs, .. } => {
            format!("resumed at {}", format_mm_ss(*remaining_secs))
        }
        Event::TimerReset { mode, .. } => format!("{mode} reset"),
        Event::ModeChanged { to, .. } => format!("switched to {to}"),
        Event::ConfigUpdated { config, .. } => format!(
            "durations now {}/{}/{} min, {} rounds",
            config.focus_minutes,
            config.short_break_minutes,
            config.long_break_minutes,
            config.rounds_per_cycle
        ),
        Event::PhaseCompleted {
            completed,
            next,
            credited_minutes,
            ..
        } => {
            let logged = credited_minutes
                .map(|minutes| format!(", {minutes} min logged"))
                .unwrap_or_default();
            let cue = if next.is_break() { "time for a break" } else { "back to focus" };
            format!("{completed} complete{logged}. Next: {next}, {cue} ('start' to begin)")
        }
        Event::StateSnapshot { .. } => return None,
    };
    Some(text)
}

/// `Focus 1/4  24:59  ███████████████████░  99%`
fn render_status(timer: &Timer) -> String {
    let fraction = timer.progress_fraction().clamp(0.0, 1.0);
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    let state = if timer.is_paused() {
        "  (paused)"
    } else if !timer.is_running() {
        "  (stopped)"
    } else {
        ""
    };
    format!(
        "{} {}/{}  {}  {}{} {:>3.0}%{}",
        timer.mode(),
        timer.current_round(),
        timer.configuration().rounds_per_cycle,
        timer.formatted_time(),
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        fraction * 100.0,
        state
    )
}

pub fn run(args: RunArgs) -> Result<(), BoxError> {
    let config = Config::load()?;
    let sink: Box<dyn FocusTimeSink> = if args.no_ledger {
        Box::new(NullSink)
    } else {
        Box::new(Database::open()?)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(config, args, sink));
    // A blocking stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn session(config: Config, args: RunArgs, sink: Box<dyn FocusTimeSink>) -> Result<(), BoxError> {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut timer = FocusCycleTimer::new(config.timer, scheduler, sink)?;
    let out = Output {
        json: args.json,
        bell: config.notifications.bell,
    };

    let patch = args.patch();
    if !patch.is_empty() {
        timer.update_config(&patch)?;
    }
    info!(config = ?timer.configuration(), "session started");

    out.message(&help_text())?;
    if args.start {
        if let Some(event) = timer.start() {
            out.event(&event)?;
        }
    }
    out.status(&timer)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                if let Some(event) = timer.on_tick(tick) {
                    out.event(&event)?;
                }
                out.status(&timer)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if let Flow::Quit = execute(&mut timer, command, &out, &mut lines).await? {
                            break;
                        }
                    }
                    Err(e) => out.message(&format!("error: {e}"))?,
                }
                out.status(&timer)?;
            }
        }
    }

    if !args.json {
        println!();
    }
    info!(
        mode = ?timer.mode(),
        round = timer.current_round(),
        "session ended"
    );
    Ok(())
}

async fn execute(
    timer: &mut Timer,
    command: Command,
    out: &Output,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<Flow, BoxError> {
    let event = match command {
        Command::Start => timer.start(),
        Command::Pause => timer.pause(),
        Command::Resume => timer.resume(),
        Command::Reset => timer.reset(),
        Command::Mode(mode) => {
            let confirmed = if timer.is_active() {
                out.message(&format!("{MODE_SWITCH_PROMPT} [y/N]"))?;
                let answer = lines.next_line().await?.unwrap_or_default();
                matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
            } else {
                true
            };
            match request_mode_switch(timer, mode, |_| confirmed) {
                ModeSwitch::Switched => Some(timer.snapshot()),
                ModeSwitch::Declined => {
                    out.message("kept current session")?;
                    None
                }
            }
        }
        Command::Config(patch) => match timer.update_config(&patch) {
            Ok(event) => Some(event),
            Err(e) => {
                out.message(&format!("error: {e}"))?;
                None
            }
        },
        Command::Status => {
            out.snapshot(timer)?;
            None
        }
        Command::Help => {
            out.message(&help_text())?;
            None
        }
        Command::Quit => return Ok(Flow::Quit),
    };

    if let Some(event) = event {
        out.event(&event)?;
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!("start".parse::<Command>().unwrap(), Command::Start);
        assert_eq!("  p ".parse::<Command>().unwrap(), Command::Pause);
        assert_eq!("RESUME".parse::<Command>().unwrap(), Command::Resume);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn parses_mode_switch() {
        assert_eq!(
            "mode short".parse::<Command>().unwrap(),
            Command::Mode(TimerMode::ShortBreak)
        );
        assert!("mode".parse::<Command>().is_err());
        assert!("mode nap".parse::<Command>().is_err());
    }

    #[test]
    fn parses_setting_update() {
        let short_ten = Command::Config(ConfigPatch {
            short_break_minutes: Some(10),
            ..Default::default()
        });
        assert_eq!("config short 10".parse::<Command>().unwrap(), short_ten);
        assert_eq!("config short_break_minutes 10".parse::<Command>().unwrap(), short_ten);
        assert_eq!("set short 10".parse::<Command>().unwrap(), short_ten);
        assert!("config short ten".parse::<Command>().is_err());
        assert!("config nap 10".parse::<Command>().is_err());
        assert!("config focus 10 extra".parse::<Command>().is_err());
        assert!("config".parse::<Command>().is_err());
    }

    #[test]
    fn help_lists_every_mode() {
        let help = help_text();
        for mode in TimerMode::ALL {
            assert!(help.contains(mode.keyword()));
        }
        assert!(help.contains("config <"));
    }

    #[test]
    fn status_bar_uses_block_glyphs() {
        let (scheduler, _ticks) = IntervalScheduler::new();
        let timer = FocusCycleTimer::new(Default::default(), scheduler, Box::new(NullSink)).unwrap();
        let line = render_status(&timer);
        assert!(line.starts_with("Focus 1/4  25:00  "));
        assert!(line.contains(&"█".repeat(BAR_WIDTH)));
        assert!(!line.contains('░'));
        assert!(line.contains("100%"));
        assert!(line.ends_with("(stopped)"));
    }

    #[test]
    fn rejects_unknown_command() {
        assert!("dance".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn describes_completion_with_credit() {
        let text = describe(&Event::PhaseCompleted {
            completed: TimerMode::Focus,
            next: TimerMode::ShortBreak,
            round: 2,
            credited_minutes: Some(25),
            at: chrono::Utc::now(),
        })
        .unwrap();
        assert!(text.contains("25 min logged"));
        assert!(text.contains("Short Break"));
        assert!(text.contains("time for a break"));
    }

    #[test]
    fn describes_break_completion_without_credit() {
        let text = describe(&Event::PhaseCompleted {
            completed: TimerMode::LongBreak,
            next: TimerMode::Focus,
            round: 1,
            credited_minutes: None,
            at: chrono::Utc::now(),
        })
        .unwrap();
        assert!(!text.contains("logged"));
        assert!(text.contains("back to focus"));
    }
}

use std::path::Path;
use std::sync::Arc;

use clap::Args;
use pomobar_core::{
    Config, ConfigError, Notifier, SessionLength, SessionTimer, TimerHandle, TimerService,
    TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_config;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Session length in minutes (15, 20, 25, 30 or 50)
    #[arg(long, value_name = "MINUTES")]
    duration: Option<u32>,
    /// Go idle after a session completes
    #[arg(long, conflicts_with = "repeat")]
    no_repeat: bool,
    /// Start the next session automatically after one completes
    #[arg(long)]
    repeat: bool,
    /// Disable audio cues
    #[arg(long)]
    mute: bool,
    /// Cue volume between 0.0 and 1.0
    #[arg(long, value_name = "LEVEL")]
    volume: Option<f64>,
    /// Do not post session events
    #[arg(long)]
    offline: bool,
    /// Start a session right away
    #[arg(long)]
    start: bool,
}

impl RunArgs {
    /// Overlay these flags on `config` for this run only.
    fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(minutes) = self.duration {
            config.timer.duration_minutes = minutes;
        }
        if self.repeat {
            config.timer.auto_repeat = true;
        }
        if self.no_repeat {
            config.timer.auto_repeat = false;
        }
        if self.mute {
            config.sound.enabled = false;
        }
        if let Some(volume) = self.volume {
            config.sound.volume = volume;
        }
        if self.offline {
            config.endpoint.enabled = false;
        }
        config.validate()
    }
}

/// A line typed into the running host.
#[derive(Debug, Clone, PartialEq)]
enum HostCommand {
    Start,
    Pause,
    Toggle,
    Stop,
    Status,
    Duration(SessionLength),
    Repeat(bool),
    Sound(bool),
    Volume(f32),
    Help,
    Quit,
}

impl HostCommand {
    /// `Ok(None)` for blank lines.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments: {}", line.trim()));
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("start" | "resume", None) => HostCommand::Start,
            ("pause", None) => HostCommand::Pause,
            ("toggle" | "t", None) => HostCommand::Toggle,
            ("stop", None) => HostCommand::Stop,
            ("status" | "s", None) => HostCommand::Status,
            ("duration", Some(value)) => {
                let minutes: u32 = value
                    .parse()
                    .map_err(|_| format!("not a number of minutes: {value}"))?;
                let length = SessionLength::try_from(minutes).map_err(|e| e.to_string())?;
                HostCommand::Duration(length)
            }
            ("repeat", Some(value)) => HostCommand::Repeat(parse_switch(value)?),
            ("sound", Some(value)) => HostCommand::Sound(parse_switch(value)?),
            ("volume", Some(value)) => HostCommand::Volume(
                value
                    .parse()
                    .map_err(|_| format!("not a volume level: {value}"))?,
            ),
            ("help" | "?", None) => HostCommand::Help,
            ("quit" | "exit" | "q", None) => HostCommand::Quit,
            _ => return Err(format!("unrecognized command: {}", line.trim())),
        };
        Ok(Some(command))
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got: {value}")),
    }
}

const HELP: &str = "\
commands:
  start | resume      start a session or resume a paused one
  pause               pause the running session
  toggle              pause when running, otherwise start
  stop                end the current session
  status              print the timer state as JSON
  duration <minutes>  15, 20, 25, 30 or 50 (applies to the next session)
  repeat on|off       start the next session automatically
  sound on|off        audio cues
  volume <0.0-1.0>    audio cue volume
  quit";

pub fn run(explicit: Option<&Path>, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(explicit)?;
    args.apply(&mut config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config, args.start))
}

async fn serve(config: Config, start: bool) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = Notifier::from_config(&config)?;
    let timer = SessionTimer::new(config.timer_settings()?, Arc::new(notifier));
    let handle = TimerService::spawn(timer);
    let mut updates = handle.subscribe();

    tracing::info!(
        duration_minutes = config.timer.duration_minutes,
        auto_repeat = config.timer.auto_repeat,
        sound = config.sound.enabled,
        endpoint = %config.endpoint.url,
        delivery = config.endpoint.enabled,
        "timer ready"
    );
    render(&handle.snapshot());
    if start {
        handle.start().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                // EOF ends the session host like `quit`.
                let Some(line) = line? else { break };
                match HostCommand::parse(&line) {
                    Ok(Some(HostCommand::Quit)) => break,
                    Ok(Some(command)) => execute(&handle, command).await?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message} (type \"help\" for commands)"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                render(&snapshot);
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

async fn execute(handle: &TimerHandle, command: HostCommand) -> pomobar_core::Result<()> {
    match command {
        HostCommand::Start => {
            handle.start().await?;
        }
        HostCommand::Pause => {
            handle.pause().await?;
        }
        HostCommand::Toggle => {
            handle.toggle().await?;
        }
        HostCommand::Stop => {
            handle.stop().await?;
        }
        HostCommand::Status => {
            let snapshot = handle.status().await?;
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        HostCommand::Duration(length) => {
            handle.set_length(length).await?;
        }
        HostCommand::Repeat(enabled) => {
            handle.set_auto_repeat(enabled).await?;
        }
        HostCommand::Sound(enabled) => {
            handle.set_sound_enabled(enabled).await?;
        }
        HostCommand::Volume(volume) => {
            let snapshot = handle.set_sound_volume(volume).await?;
            eprintln!("volume {:.2}", snapshot.sound_volume);
        }
        HostCommand::Help => eprintln!("{HELP}"),
        HostCommand::Quit => {}
    }
    Ok(())
}

fn render(snapshot: &TimerSnapshot) {
    eprintln!("{}", snapshot.state_description);
}

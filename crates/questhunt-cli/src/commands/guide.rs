use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Args};
use questhunt_core::feedback::{AudioCue, LogVibrator, NoVibrator, SilentCue, TerminalBell, Vibrator};
use questhunt_core::geo::{LineSource, Track, TrackSource};
use questhunt_core::{
    run_session, Config, Coordinate, Event, FeedbackDevices, GuidanceSession, PositionSource,
    RunOptions, StopReason, Subscription, ValidationClient,
};
use tokio::io::BufReader;

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["track", "stdin", "walk_from"]),
))]
pub struct GuideArgs {
    /// Quest id
    pub id: u32,
    /// Replay a recorded JSON track
    #[arg(long, value_name = "FILE")]
    pub track: Option<PathBuf>,
    /// Read positions from stdin ("lat,lon", "heading <deg>", "error <code>")
    #[arg(long)]
    pub stdin: bool,
    /// Simulate a straight walk from this point to the target
    #[arg(long, value_name = "LAT,LON", allow_hyphen_values = true)]
    pub walk_from: Option<Coordinate>,
    /// Number of steps of the simulated walk
    #[arg(long, default_value_t = 20, requires = "walk_from")]
    pub steps: u32,
    /// Milliseconds between simulated fixes
    #[arg(long, default_value_t = 1000, requires = "walk_from")]
    pub interval_ms: u64,
    /// One JSON event per line
    #[arg(long)]
    pub json: bool,
    /// No terminal bell
    #[arg(long)]
    pub silent: bool,
    /// Notify the validation service on unlock
    #[arg(long)]
    pub validate: bool,
    /// Stop as soon as the quest unlocks
    #[arg(long)]
    pub exit_on_unlock: bool,
    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,
}

const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

enum Feed {
    Track(Track),
    Stdin,
}

impl Feed {
    fn watch(self, config: &Config) -> Subscription {
        let options = config.geolocation.clone();
        match self {
            Feed::Track(track) => TrackSource::new(track).watch(options),
            Feed::Stdin => LineSource::new(BufReader::new(tokio::io::stdin())).watch(options),
        }
    }
}

pub fn run(args: GuideArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = super::load_catalog(&config)?;
    let target = catalog.find(args.id)?.location;

    let feed = if let Some(path) = &args.track {
        Feed::Track(Track::load(path)?)
    } else if let Some(from) = args.walk_from {
        from.validate()?;
        Feed::Track(Track::straight_walk(from, target, args.steps, args.interval_ms)?)
    } else {
        Feed::Stdin
    };

    let audio: Box<dyn AudioCue> = if args.silent || !config.feedback.audio_enabled {
        Box::new(SilentCue)
    } else {
        Box::new(TerminalBell::new())
    };
    let vibrator: Box<dyn Vibrator> = if config.feedback.haptics_enabled {
        Box::new(LogVibrator)
    } else {
        Box::new(NoVibrator)
    };
    let validator = if args.validate {
        Some(ValidationClient::new(&config.validation)?)
    } else {
        None
    };

    let (mut session, opened) = GuidanceSession::open(
        &catalog,
        args.id,
        FeedbackDevices::new(audio, vibrator),
        &config.feedback,
    )?;
    let json = args.json;
    render(&opened, json);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let reason = runtime.block_on(async {
        let subscription = feed.watch(&config);
        let options = RunOptions {
            exit_on_unlock: args.exit_on_unlock,
            validator,
        };
        run_session(
            &mut session,
            subscription,
            options,
            shutdown_signal(args.duration),
            |event| render(event, json),
        )
        .await
    });
    // Stdin reads park a blocking thread that a plain drop would wait on.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    render(&session.snapshot(), json);
    if !json && reason == StopReason::Shutdown && !session.state().unlocked {
        println!("quest not found yet");
    }
    Ok(())
}

async fn shutdown_signal(duration: Option<u64>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    match duration {
        Some(secs) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            }
        }
        None => ctrl_c.await,
    }
}

fn render(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "cannot encode event"),
        }
        return;
    }

    match event {
        Event::SessionOpened {
            quest_name, target, ..
        } => println!("quest: {quest_name} ({target})"),
        Event::PositionUpdated {
            distance_m,
            bearing_deg,
            cardinal,
            tier,
            ..
        } => println!("{distance_m:>9.1} m  {cardinal:<2} {bearing_deg:>4.0}°  {tier}"),
        Event::TierChanged { from, to, .. } => println!("  {from} -> {to}"),
        Event::Unlocked { distance_m, .. } => {
            println!("*** quest unlocked ({distance_m:.1} m from target) ***")
        }
        Event::PositionError { message, .. } => println!("  position error: {message}"),
        Event::HeadingUpdated {
            heading_deg,
            arrow_angle_deg,
            ..
        } => match arrow_angle_deg {
            Some(angle) => println!("  heading {heading_deg:.0}°, target at {angle:.0}°"),
            None => println!("  heading {heading_deg:.0}°"),
        },
        Event::ValidationSent { endpoint, .. } => println!("  validation sent to {endpoint}"),
        Event::SessionClosed { unlocked, fixes, .. } => {
            let status = if *unlocked { "unlocked" } else { "locked" };
            println!("session closed: {status}, {fixes} fixes");
        }
        Event::StateSnapshot {
            distance_m, tier, ..
        } => match distance_m {
            Some(d) => println!("final: {d:.1} m, {tier}"),
            None => println!("final: no position, {tier}"),
        },
        Event::HapticFired { .. } | Event::CuePlayed { .. } | Event::CueCancelled { .. } => {}
    }
}

use std::sync::Arc;

use clap::Args;
use circuitroom_core::{
    AudioCueScheduler, Config, Event, Phase, SessionEngine, SessionRunner, SessionView,
    StepSequence, WorkoutStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

#[derive(Args)]
pub struct RunArgs {
    /// Run without cue sounds
    #[arg(long)]
    mute: bool,
    /// Print session events as JSON lines instead of the countdown
    #[arg(long)]
    json: bool,
}

pub fn run(args: RunArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = WorkoutStore::open()?;
    let sequence = store.load_draft()?.sequence();

    let mut cues = AudioCueScheduler::system();
    cues.set_enabled(config.sound.enabled && !args.mute);
    cues.set_volume(config.volume_gain());
    let engine = SessionEngine::with_config(config.engine_config(), Box::new(cues));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(SessionRunner::new(engine), sequence, args.json));
    // The stdin reader may still be blocked on a read.
    runtime.shutdown_background();
    result
}

async fn drive(
    runner: SessionRunner,
    sequence: StepSequence,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runner = Arc::new(runner);
    let mut views = runner.subscribe_views();
    let mut events = runner.subscribe_events();
    runner.start(sequence)?;

    if !json {
        eprintln!("p = pause, r = resume, s/q = stop");
    }
    tokio::spawn(read_commands(runner.clone()));
    tokio::spawn({
        let runner = runner.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                runner.stop();
            }
        }
    });

    if !json {
        render(&views.borrow_and_update());
    }
    let outcome = loop {
        tokio::select! {
            changed = views.changed(), if !json => {
                if changed.is_err() {
                    break Outcome::Stopped;
                }
                render(&views.borrow_and_update());
            }
            received = events.recv() => {
                let event = match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event output fell behind");
                        continue;
                    }
                    Err(RecvError::Closed) => break Outcome::Stopped,
                };
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                }
                match event {
                    Event::SessionCompleted { .. } => break Outcome::Completed,
                    Event::SessionStopped { .. } => break Outcome::Stopped,
                    _ => {}
                }
            }
        }
    };

    if !json {
        match outcome {
            Outcome::Completed => println!("Workout complete."),
            Outcome::Stopped => println!("Workout stopped."),
        }
    }
    Ok(())
}

/// How a session ended, taken from the terminal event rather than the last
/// phase seen: a stop during finishing is still a stop.
enum Outcome {
    Completed,
    Stopped,
}

fn render(view: &SessionView) {
    if view.state.phase == Phase::Idle {
        return;
    }
    println!("{:<28} {:>5}", view.title(), view.clock());
}

async fn read_commands(runner: Arc<SessionRunner>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "p" => runner.pause(),
            "r" => runner.resume(),
            "s" | "q" => {
                runner.stop();
                break;
            }
            "" => {}
            other => eprintln!("unknown command '{other}' (p, r, s, q)"),
        }
    }
}

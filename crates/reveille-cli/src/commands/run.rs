//! The live host: reconcile the stored alarms, then serve triggers until
//! interrupted. Plays audio through rodio when an output device exists,
//! otherwise rings silently (console notification only).

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use reveille_core::{
    AlarmManager, Effects, JsonFileStore, RuntimeOptions, TokioScheduler,
};

use crate::effectors::{ConsoleNotification, ConsoleVibration, HostVolume, PrintSink, RodioAudio};

#[derive(Args)]
pub struct RunArgs {
    /// Re-run the reconciliation pass every this many seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    check_interval: u64,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(args))
}

async fn serve(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = RuntimeOptions::load_or_default();
    let store = Arc::new(JsonFileStore::open_default()?);
    info!(path = %store.path().display(), "alarm store opened");

    // The output stream is tied to this thread; keep it alive for the
    // whole serve loop or playback dies with it.
    let rodio_output = rodio::OutputStream::try_default();
    let audio: Arc<dyn reveille_core::AudioBackend> = match &rodio_output {
        Ok((_stream, handle)) => Arc::new(RodioAudio::new(handle.clone())),
        Err(e) => {
            warn!(error = %e, "no audio output; alarms will ring silently");
            Arc::new(reveille_core::effects::NullAudio)
        }
    };

    let effects = Effects {
        audio,
        notification: Arc::new(ConsoleNotification),
        vibration: Arc::new(ConsoleVibration),
        system_volume: Arc::new(HostVolume::new()),
    };

    let manager = AlarmManager::new(
        store,
        Arc::new(TokioScheduler::new()),
        effects,
        Arc::new(PrintSink),
        options,
    );

    let summary = manager.check_alarms()?;
    info!(
        rearmed = summary.rearmed,
        rung = summary.rung,
        dropped = summary.dropped,
        "startup reconciliation complete"
    );
    println!("reveille serving; ctrl-c to exit");

    let check_interval = Duration::from_secs(args.check_interval.max(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            // Periodic background wake: best-effort repair, like the
            // platform background-task hooks this host stands in for.
            _ = tokio::time::sleep(check_interval) => {
                if let Err(e) = manager.check_alarms() {
                    warn!(error = %e, "periodic reconciliation failed");
                }
            }
        }
    }

    println!("shutting down; stored alarms persist for the next run");
    Ok(())
}

//! `run` command: real-time simulator driven by stdin.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::cli::commands::{event_emitter, print_snapshot, resolve_settings};
use crate::cli::console::{self, HELP, OperatorCommand};
use crate::error::SignalError;
use crate::scheduler::{Simulator, SimulatorOptions};

/// Runs the simulator until `quit`, end of input, or cancellation.
///
/// The duration fields start from the resolved settings and are replaced by
/// each `set`; `start` always hands the current fields to the controller.
///
/// # Errors
///
/// Returns an error if configuration, metrics setup, the event file, or
/// the tick task fails.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), SignalError> {
    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let settings = resolve_settings(&args.source)?;
    let options = SimulatorOptions {
        tick_interval: args.tick_interval.unwrap_or(settings.tick_interval),
        ..SimulatorOptions::default()
    };
    let events = event_emitter(args.events_file.as_deref())?;
    let simulator = Simulator::new(options, events)?;
    let mut snapshots = simulator.subscribe();
    let mut fields = settings.requested;

    tracing::info!(
        tick_interval = %humantime::format_duration(simulator.tick_interval()),
        "simulator ready"
    );
    print_snapshot(args.format, &simulator.snapshot().await)?;
    if args.autostart {
        simulator.start(fields).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("shutdown requested");
                break;
            }
            received = snapshots.recv() => match received {
                Ok(snapshot) => print_snapshot(args.format, &snapshot)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "output fell behind, snapshots dropped");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("end of input");
                    break;
                };
                let command = match console::parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                match command {
                    OperatorCommand::Start => {
                        simulator.start(fields).await?;
                    }
                    OperatorCommand::Stop => {
                        simulator.stop().await?;
                    }
                    OperatorCommand::Reset => simulator.reset().await?,
                    OperatorCommand::Set(requested) => {
                        fields = requested;
                        simulator.set_durations(requested.resolve()).await;
                    }
                    OperatorCommand::Status => {
                        print_snapshot(args.format, &simulator.snapshot().await)?;
                    }
                    OperatorCommand::Help => eprintln!("{HELP}"),
                    OperatorCommand::Quit => break,
                }
            }
        }
    }

    simulator.shutdown().await?;
    while let Ok(snapshot) = snapshots.try_recv() {
        print_snapshot(args.format, &snapshot)?;
    }
    Ok(())
}

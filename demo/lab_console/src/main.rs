mod commands;
mod config;
mod console;

use commands::{Command, HELP};
use config::ConsoleConfig;
use console::{render_screen, ChartCanvas, TextChartBackend};
use dhcp_lab_core::{Dashboard, DashboardView, HttpDashboardApi, SharedView, StatusPoller};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they do not interleave with the screen
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,dhcp_lab_core=info,lab_console=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cfg = ConsoleConfig::load();
    info!(
        target: "lab_console",
        base_url = %cfg.backend.base_url,
        rows = cfg.page.attack_rows.len(),
        "Starting lab console"
    );

    let canvas = ChartCanvas::default();
    let view = SharedView::new(DashboardView::bind(
        &cfg.layout(),
        Box::new(TextChartBackend::new(canvas.clone(), cfg.page.chart_width)),
    ));
    let api = HttpDashboardApi::new(&cfg.backend)?;
    let dashboard = Dashboard::new(Arc::new(api), view.clone(), cfg.backend.clone());

    let poller = StatusPoller::new(dashboard.clone()).start();

    // Redraw whenever the view changes
    let redraw_task = {
        let view = view.clone();
        let canvas = canvas.clone();
        let mut revisions = view.subscribe();
        tokio::spawn(async move {
            let mut last_screen = String::new();
            loop {
                let alerts = if view.read(|v| v.pending_alerts().next().is_some()) {
                    view.update(|v| v.drain_alerts())
                } else {
                    Vec::new()
                };
                for alert in alerts {
                    println!("\n*** {} ***", alert);
                }

                let screen = view.read(|v| render_screen(v, &canvas));
                if screen != last_screen {
                    println!("{}", screen);
                    last_screen = screen;
                }

                if revisions.changed().await.is_err() {
                    break;
                }
            }
        })
    };

    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                info!(target: "lab_console", "Interrupted");
                break;
            }
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(target: "lab_console", error = %e, "Failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{} (try 'help')", e);
                continue;
            }
        };

        let dash = dashboard.clone();
        match command {
            Command::Simulate(kind) => {
                tokio::spawn(async move { dash.run_simulation(&kind).await });
            }
            Command::Start(kind) => {
                tokio::spawn(async move { dash.start_attack(&kind).await });
            }
            Command::Stop(kind) => {
                tokio::spawn(async move { dash.stop_attack(&kind).await });
            }
            Command::Recon => {
                tokio::spawn(async move { dash.run_recon().await });
            }
            Command::Iface(iface) => view.update(|v| v.inputs.iface = iface),
            Command::Target(target_ip) => view.update(|v| v.inputs.target_ip = target_ip),
            Command::Show => {
                let (screen, last_poll) =
                    view.read(|v| (render_screen(v, &canvas), v.last_poll));
                println!("{}", screen);
                match last_poll {
                    Some(at) => println!("Last status poll: {}", at.format("%H:%M:%S")),
                    None => println!("Last status poll: never"),
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    info!(target: "lab_console", "Shutting down...");
    if let Some(poller) = poller {
        poller.shutdown().await;
    }
    redraw_task.abort();
    Ok(())
}

use std::path::{Path, PathBuf};

use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{error, info};

use simgraph::{EngineConfig, EngineState, FileFeed, ViewSession};

use crate::{ViewArgs, render_session, title_for};

/// Re-fetch the feed and write fresh output
///
/// A failed fetch still writes a page: the session is in its error state and
/// the page shows the message instead of a graph.
async fn regenerate(
    session: &mut ViewSession,
    feed: &FileFeed,
    view: &ViewArgs,
    output: &Path,
) -> anyhow::Result<()> {
    session.refresh(feed).await;
    if let EngineState::Error(message) = session.state() {
        error!(input = %feed.path().display(), %message, "feed could not be loaded");
    }
    render_session(session, view, &title_for(feed.path()), output)
}

/// Start the development server with hot reload
pub async fn serve(
    input: &Path,
    output: &Path,
    port: u16,
    view: ViewArgs,
    config: EngineConfig,
) -> anyhow::Result<()> {
    let feed = FileFeed::new(input);
    let mut session = ViewSession::new(config);
    session.set_mode(view.mode);

    // Generate initial output
    regenerate(&mut session, &feed, &view, output).await?;
    println!("Rendered initial graph in {}", output.display());

    // Create channel for file change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                // Notify the regeneration task
                let _ = tx.blocking_send(());
            }
        }
    })?;

    // Watch the input file's parent directory
    let watch_path = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    // The session lives in this task from now on
    let output_for_regen = output.to_path_buf();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}

            match regenerate(&mut session, &feed, &view, &output_for_regen).await {
                Ok(()) => {
                    let metrics = session.metrics();
                    info!(
                        nodes = metrics.node_count,
                        edges = metrics.edge_count,
                        "regenerated graph"
                    );
                }
                Err(e) => error!(error = %e, "regeneration failed"),
            }
        }
    });

    // Create live reload layer
    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Set up file watcher for output directory to trigger browser reload
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    let app = Router::new()
        .fallback_service(ServeDir::new(output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Development server running at http://localhost:{port}");
    println!("Watching {} for changes...", input.display());
    println!("Press Ctrl+C to stop");

    // Keep watchers alive
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}

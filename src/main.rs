use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use simgraph::render::svg::write_site;
use simgraph::{
    EngineConfig, FeedSource, FileFeed, GraphMetrics, GraphSnapshot, LayoutMode, ViewSession,
};

mod server;

/// Lay out and render semantic-similarity knowledge graphs.
#[derive(Parser)]
#[command(name = "simgraph")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file (defaults apply to anything it leaves out)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a feed to graph.svg and index.html
    Render {
        /// Input feed file (.json)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the rendered files
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print snapshot metrics as JSON
    Stats {
        /// Input feed file (.json)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Start development server with hot reload
    Serve {
        /// Input feed file (.json)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the rendered files
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Options shared by the commands that render
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Layout strategy
    #[arg(short, long, value_enum, default_value_t = LayoutMode::Force)]
    pub mode: LayoutMode,

    /// Surface width in pixels (overrides the config file)
    #[arg(long)]
    pub width: Option<f32>,

    /// Surface height in pixels (overrides the config file)
    #[arg(long)]
    pub height: Option<f32>,

    /// Zoom the output so the whole graph is visible
    #[arg(long)]
    pub fit: bool,

    /// Upper bound on simulation ticks before rendering
    #[arg(long, default_value = "2000")]
    pub max_ticks: usize,
}

#[derive(Serialize)]
struct Stats {
    #[serde(flatten)]
    metrics: GraphMetrics,
    dropped_edges: usize,
    duplicate_nodes: usize,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("simgraph=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>, view: Option<&ViewArgs>) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(view) = view {
        if let Some(width) = view.width {
            config.viewport.width = width;
        }
        if let Some(height) = view.height {
            config.viewport.height = height;
        }
        config.validate()?;
    }
    Ok(config)
}

/// Page title derived from the feed file name
fn title_for(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string())
}

/// Settle the layout and write both output files
pub fn render_session(
    session: &mut ViewSession,
    view: &ViewArgs,
    title: &str,
    output: &Path,
) -> anyhow::Result<()> {
    session.run_until_settled(view.max_ticks);
    if view.fit {
        session.fit_to_view(40.0);
        session.finish_animation();
    }
    let (svg, page) = session.export(title)?;
    write_site(output, &svg, &page)?;
    Ok(())
}

async fn render(
    input: &Path,
    output: &Path,
    view: &ViewArgs,
    config: EngineConfig,
) -> anyhow::Result<()> {
    let payload = FileFeed::new(input).fetch().await?;

    let mut session = ViewSession::new(config);
    session.set_mode(view.mode);
    session.load(Ok(payload));
    render_session(&mut session, view, &title_for(input), output)?;

    let metrics = session.metrics();
    println!(
        "Rendered {} nodes and {} edges ({} layout) to {}",
        metrics.node_count,
        metrics.edge_count,
        view.mode,
        output.display()
    );
    Ok(())
}

async fn stats(input: &Path, config: &EngineConfig) -> anyhow::Result<()> {
    let payload = FileFeed::new(input).fetch().await?;
    let (snapshot, report) = GraphSnapshot::from_feed(&config.feed.apply(&payload));
    let stats = Stats {
        metrics: snapshot.metrics(),
        dropped_edges: report.dropped_edges.len(),
        duplicate_nodes: report.duplicate_nodes.len(),
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            view,
        } => {
            let config = load_config(cli.config.as_deref(), Some(&view))?;
            render(&input, &output, &view, config).await?;
        }
        Commands::Stats { input } => {
            let config = load_config(cli.config.as_deref(), None)?;
            stats(&input, &config).await?;
        }
        Commands::Serve {
            input,
            output,
            port,
            view,
        } => {
            let config = load_config(cli.config.as_deref(), Some(&view))?;
            server::serve(&input, &output, port, view, config).await?;
        }
    }

    Ok(())
}

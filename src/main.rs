use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kgpipe::config::{Overrides, Settings};
use kgpipe::controller::PipelineController;
use kgpipe::gateway::HttpGateway;
use kgpipe::model::{Layout, VizKind};
use kgpipe::report::{self, RunOptions};
use kgpipe::server;

/// Drive a knowledge-graph backend: upload, build, visualize, analyze.
#[derive(Parser)]
#[command(name = "kgpipe")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (default http://localhost:5000)
    #[arg(short, long, global = true)]
    backend: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the pipeline console
    Serve {
        /// Port to run the console on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the pipeline once and write reports
    Run {
        /// Document to upload
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Visualization to render after the build
        #[arg(long)]
        viz: Option<VizKind>,

        /// Layout for interactive visualizations
        #[arg(long, default_value = "semantic")]
        layout: Layout,

        /// Skip graph analytics
        #[arg(long)]
        no_analytics: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "kgpipe=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn settings(cli: &Cli, port: Option<u16>) -> anyhow::Result<Settings> {
    let settings = Settings::load(cli.config.as_deref())
        .with_context(|| format!("loading settings from {:?}", cli.config))?
        .apply(Overrides {
            backend_url: cli.backend.clone(),
            timeout_secs: cli.timeout,
            port,
        });
    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { port } => {
            let settings = settings(&cli, *port)?;
            server::serve(&settings).await?;
        }
        Commands::Run {
            input,
            output,
            viz,
            layout,
            no_analytics,
        } => {
            let settings = settings(&cli, None)?;
            let gateway = HttpGateway::new(settings.gateway())?;
            let mut controller = PipelineController::new(gateway);
            let options = RunOptions {
                input: input.clone(),
                output: output.clone(),
                viz: *viz,
                layout: *layout,
                analytics: !no_analytics,
            };

            let summary = report::run(&mut controller, &options, &settings.backend_url).await?;
            println!(
                "Built knowledge graph for '{}' in {}",
                summary.artifact_id,
                output.display()
            );
            for path in &summary.written {
                println!("  wrote {}", path.display());
            }
            if let Some(url) = summary.visualization {
                println!("  visualization: {url}");
            }
        }
    }

    Ok(())
}

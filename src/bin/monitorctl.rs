use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use monitor_config::api::{HttpMonitorApi, MonitorApi, SelectorCache};
use monitor_config::config::ClientConfig;
use monitor_config::error::SubmitError;
use monitor_config::form::{FormDraft, FormSession};
use monitor_config::monitor::{MonitorType, detection, registry};
use monitor_config::version::VERSION;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Edit and submit monitor configurations", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every monitor type with its family, config block and default port
    Types {
        /// Print registry metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest a monitor type for a URL or host
    Detect {
        input: String,
        /// Type the form is currently set to
        #[arg(long)]
        current: Option<MonitorType>,
    },
    /// Validate a draft file and print the payload it would submit
    Render {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Write an existing monitor out as a draft file
    Export {
        monitor_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Create a monitor from a draft, or update one with --monitor
    Submit {
        #[arg(long)]
        draft: PathBuf,
        /// Update this monitor instead of creating a new one
        #[arg(long)]
        monitor: Option<String>,
        /// Upstream monitor to depend on (edit only)
        #[arg(long = "add-upstream", requires = "monitor")]
        add_upstream: Vec<String>,
        /// Upstream monitor to stop depending on (edit only)
        #[arg(long = "remove-upstream", requires = "monitor")]
        remove_upstream: Vec<String>,
    },
    /// List monitors, optionally only those a monitor may depend on
    Monitors {
        #[arg(long = "upstream-for")]
        upstream_for: Option<String>,
    },
    /// List the regions checks can run from
    Regions,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "monitorctl.log");
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).json();

    // stdout carries command output, so human-readable logs go to stderr
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

fn read_draft(path: &Path) -> Result<FormDraft, BoxError> {
    let contents = fs::read_to_string(path).map_err(|e| format!("Failed to read draft {}: {e}", path.display()))?;
    let draft = toml::from_str(&contents).map_err(|e| format!("Failed to parse draft {}: {e}", path.display()))?;
    Ok(draft)
}

fn print_types(json: bool) -> Result<(), BoxError> {
    if json {
        let entries: Vec<serde_json::Value> = MonitorType::ALL
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": t.as_str(),
                    "configBlock": t.config_block().key(),
                    "metadata": registry::metadata_for(*t),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for t in MonitorType::ALL {
        let metadata = t.metadata();
        let port = metadata.default_port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:<16} {:<15} {:>6}  {}",
            t.as_str(),
            format!("{:?}", t.family()),
            t.config_block().key(),
            port,
            metadata.label
        );
    }
    Ok(())
}

fn print_detection(input: &str, current: Option<MonitorType>) {
    let suggestion = match current {
        Some(current) => detection::suggest_monitor_type(input, current),
        None => detection::detect_monitor_type(input),
    };
    match suggestion {
        Some(t) => println!("{t}"),
        None => println!("no suggestion"),
    }
}

fn render(path: &Path) -> Result<(), BoxError> {
    let session = FormSession::from_draft(read_draft(path)?);
    match session.build_payload() {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(errors) => {
            for e in errors.iter() {
                eprintln!("{}: {}", e.field, e.message);
            }
            Err(format!("{} validation error(s) in {}", errors.len(), path.display()).into())
        }
    }
}

async fn export(api: &dyn MonitorApi, monitor_id: &str, output: Option<&Path>) -> Result<(), BoxError> {
    let session = FormSession::load(api, monitor_id).await?;
    let text = toml::to_string(&session.to_draft())?;
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!(monitor_id, path = %path.display(), "Exported monitor draft");
        }
        None => print!("{text}"),
    }
    Ok(())
}

async fn submit(
    api: &dyn MonitorApi,
    draft_path: &Path,
    monitor_id: Option<&str>,
    add_upstream: Vec<String>,
    remove_upstream: Vec<String>,
) -> Result<(), BoxError> {
    let draft = read_draft(draft_path)?;
    let mut session = match monitor_id {
        Some(id) => {
            let mut session = FormSession::load(api, id).await?;
            session.apply_draft(draft);
            session
        }
        None => FormSession::from_draft(draft),
    };

    if let Some(dependencies) = session.dependencies_mut() {
        for upstream in &remove_upstream {
            dependencies.mark_removed(None, upstream);
        }
        dependencies.add_pending(add_upstream);
    }

    match session.submit(api).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome.monitor)?);
            Ok(())
        }
        Err(SubmitError::Validation(errors)) => {
            for e in errors.iter() {
                eprintln!("{}: {}", e.field, e.message);
            }
            Err(format!("{} validation error(s) in {}", errors.len(), draft_path.display()).into())
        }
        Err(e @ SubmitError::Dependency { .. }) => {
            error!(error = %e, "Monitor saved with unapplied dependency changes; re-run to retry them");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_monitors(
    cache: &SelectorCache<HttpMonitorApi>,
    api: &HttpMonitorApi,
    upstream_for: Option<&str>,
) -> Result<(), BoxError> {
    let monitors = match upstream_for {
        Some(id) => {
            let session = FormSession::load(api, id).await?;
            let excluded: Vec<String> = session
                .dependencies()
                .map(|deps| deps.excluded_ids().into_iter().collect())
                .unwrap_or_default();
            cache.monitors_excluding(&excluded).await?
        }
        None => cache.monitors().await?,
    };
    for monitor in monitors {
        println!("{:<24} {:<16} {}", monitor.id, monitor.monitor_type.as_str(), monitor.name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    let config = ClientConfig::load(args.config.as_deref());
    let log_dir = config.as_ref().map(|c| c.log_dir.as_str()).unwrap_or("logs");
    init_logging(log_dir);
    info!("monitorctl version {}", VERSION);

    // Offline commands need neither the API nor a base URL.
    match &args.command {
        Command::Types { json } => return print_types(*json),
        Command::Detect { input, current } => {
            print_detection(input, *current);
            return Ok(());
        }
        Command::Render { draft } => return render(draft),
        _ => {}
    }

    let config = config?;
    let api = Arc::new(HttpMonitorApi::new(&config)?);
    let cache = SelectorCache::new(api.clone(), Duration::from_secs(config.selector_cache_ttl_secs));

    match args.command {
        Command::Export { monitor_id, output } => export(api.as_ref(), &monitor_id, output.as_deref()).await,
        Command::Submit {
            draft,
            monitor,
            add_upstream,
            remove_upstream,
        } => submit(api.as_ref(), &draft, monitor.as_deref(), add_upstream, remove_upstream).await,
        Command::Monitors { upstream_for } => list_monitors(&cache, api.as_ref(), upstream_for.as_deref()).await,
        Command::Regions => {
            let regions = cache.regions().await?;
            if regions.is_empty {
                println!("no regions available");
            }
            for region in &regions.regions {
                let marker = if *region == regions.default { " (default)" } else { "" };
                println!("{region}{marker}");
            }
            Ok(())
        }
        Command::Types { .. } | Command::Detect { .. } | Command::Render { .. } => Ok(()),
    }
}

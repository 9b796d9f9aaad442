use akamai_provider::config::{EdgeRc, DEFAULT_SECTION};
use akamai_provider::edgegrid::{format_api_error, EdgeGridClient};
use akamai_provider::framework::{Plan, ResourceData};
use akamai_provider::resource::builtin_schemas;
use akamai_provider::state::{DesiredResource, Manifest, State};
use akamai_provider::{Diagnostic, Provider, ProviderError};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage Akamai application security and property resources declaratively
#[derive(Parser, Debug)]
#[command(name = "akamai-provider", version, about, long_about = None)]
struct Args {
    /// Path to the .edgerc credentials file
    #[arg(long, env = "AKAMAI_EDGERC")]
    edgerc: Option<PathBuf>,

    /// Section of the .edgerc file to use
    #[arg(long, env = "AKAMAI_SECTION", default_value = DEFAULT_SECTION)]
    section: String,

    /// State file recording managed resources
    #[arg(long, default_value = "akamai.state.json")]
    state: PathBuf,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print resource schemas as JSON
    Schema {
        /// Only this resource type
        resource_type: Option<String>,
    },
    /// Show what apply would change
    Plan {
        #[arg(short, long, default_value = "akamai.yaml")]
        manifest: PathBuf,
    },
    /// Create, update, replace or delete resources to match the manifest
    Apply {
        #[arg(short, long, default_value = "akamai.yaml")]
        manifest: PathBuf,
    },
    /// Re-read every resource in the state file
    Refresh,
    /// Adopt an existing remote entity into the state file
    Import {
        /// Name to record the resource under
        name: String,
        /// Resource type, e.g. akamai_appsec_eval_rule
        resource_type: String,
        /// Resource identity, e.g. 43253:AAAA_81230:1
        id: String,
    },
    /// Delete one resource, or every resource in the state file
    Destroy {
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("akamai-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("akamai-provider").join("akamai-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".akamai-provider").join("akamai-provider.log");
    }
    PathBuf::from("akamai-provider.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = setup_logging(args.log_level)?;

    match &args.command {
        Command::Schema { resource_type } => print_schema(resource_type.as_deref()),
        Command::Plan { manifest } => {
            let provider = connect(&args)?;
            let manifest = Manifest::load(manifest)?;
            let state = State::load(&args.state)?;
            print_json(&plan_all(&provider, &manifest, &state)?)
        }
        Command::Apply { manifest } => {
            let provider = connect(&args)?;
            let manifest = Manifest::load(manifest)?;
            apply_all(&provider, &manifest, &args.state).await
        }
        Command::Refresh => {
            let provider = connect(&args)?;
            refresh_all(&provider, &args.state).await
        }
        Command::Import {
            name,
            resource_type,
            id,
        } => {
            let provider = connect(&args)?;
            import_one(&provider, &args.state, name, resource_type, id).await
        }
        Command::Destroy { name } => {
            let provider = connect(&args)?;
            destroy(&provider, &args.state, name.as_deref()).await
        }
    }
}

fn connect(args: &Args) -> Result<Provider> {
    let credentials = EdgeRc::load(args.edgerc.as_deref(), &args.section)?;
    tracing::info!("Using API host {}", credentials.host);
    let client = EdgeGridClient::new(credentials)?;
    Ok(Provider::new(Arc::new(client)))
}

/// Log an operation failure as a diagnostic and turn it into a CLI error
fn failed(op: &str, name: &str, err: ProviderError) -> anyhow::Error {
    let diagnostic = Diagnostic::from(&err);
    tracing::error!(
        resource = name,
        op,
        attribute = ?diagnostic.attribute,
        "{}",
        diagnostic.summary
    );
    match diagnostic.attribute {
        Some(attribute) => anyhow!("{} {} ({}): {}", op, name, attribute, format_api_error(&err)),
        None => anyhow!("{} {}: {}", op, name, format_api_error(&err)),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_schema(resource_type: Option<&str>) -> Result<()> {
    let schemas = builtin_schemas();
    match resource_type {
        None => print_json(&schemas),
        Some(name) => match schemas.get(name) {
            Some(schema) => print_json(schema),
            None => bail!("unknown resource type: {}", name),
        },
    }
}

/// Desired record for a manifest entry, carrying prior state when it exists
fn desired_record(
    provider: &Provider,
    name: &str,
    desired: &DesiredResource,
    state: &State,
) -> Result<ResourceData> {
    let lifecycle = provider
        .resource(&desired.type_name)
        .map_err(|e| failed("plan", name, e))?;
    let d = ResourceData::from_config(lifecycle.schema(), &desired.attributes)
        .map_err(|e| failed("plan", name, e))?;

    Ok(match state.get(name) {
        Some(prior) if prior.type_name == desired.type_name => {
            d.with_prior(prior.id.clone(), prior.attributes.clone())
        }
        _ => d,
    })
}

fn plan_all(provider: &Provider, manifest: &Manifest, state: &State) -> Result<Map<String, Value>> {
    let mut plans = Map::new();

    for (name, desired) in &manifest.resources {
        let d = desired_record(provider, name, desired, state)?;
        let lifecycle = provider
            .resource(&desired.type_name)
            .map_err(|e| failed("plan", name, e))?;
        let plan = match state.get(name) {
            Some(prior) if prior.type_name != desired.type_name => Plan::Replace(Vec::new()),
            _ => lifecycle.plan(&d).map_err(|e| failed("plan", name, e))?,
        };
        plans.insert(name.clone(), serde_json::to_value(plan)?);
    }

    for name in state.resources.keys() {
        if !manifest.resources.contains_key(name) {
            plans.insert(name.clone(), json!({"action": "delete"}));
        }
    }

    Ok(plans)
}

async fn apply_all(provider: &Provider, manifest: &Manifest, state_path: &Path) -> Result<()> {
    let mut state = State::load(state_path)?;

    for (name, desired) in &manifest.resources {
        let lifecycle = provider
            .resource(&desired.type_name)
            .map_err(|e| failed("apply", name, e))?;
        let mut d = desired_record(provider, name, desired, &state)?;

        let plan = match state.get(name) {
            None => Plan::Create,
            Some(prior) if prior.type_name != desired.type_name => Plan::Replace(Vec::new()),
            Some(_) => lifecycle.plan(&d).map_err(|e| failed("plan", name, e))?,
        };

        match plan {
            Plan::NoChange => {
                println!("{}: no changes", name);
                continue;
            }
            Plan::Create => {
                lifecycle
                    .create(&mut d)
                    .await
                    .map_err(|e| failed("create", name, e))?;
                println!("{}: created {}", name, d.id());
            }
            Plan::Update(_) => {
                lifecycle
                    .update(&mut d)
                    .await
                    .map_err(|e| failed("update", name, e))?;
                println!("{}: updated {}", name, d.id());
            }
            Plan::Replace(_) => {
                destroy_one(provider, &mut state, name).await?;
                state.save(state_path)?;
                d = ResourceData::from_config(lifecycle.schema(), &desired.attributes)
                    .map_err(|e| failed("create", name, e))?;
                lifecycle
                    .create(&mut d)
                    .await
                    .map_err(|e| failed("create", name, e))?;
                println!("{}: replaced, now {}", name, d.id());
            }
        }

        let id = d.id().to_string();
        state.put(name, &desired.type_name, &id, d.into_attributes());
        state.save(state_path)?;
    }

    let removed: Vec<String> = state
        .resources
        .keys()
        .filter(|name| !manifest.resources.contains_key(*name))
        .cloned()
        .collect();
    for name in removed {
        destroy_one(provider, &mut state, &name).await?;
        state.save(state_path)?;
        println!("{}: deleted", name);
    }

    Ok(())
}

async fn destroy_one(provider: &Provider, state: &mut State, name: &str) -> Result<()> {
    let Some(prior) = state.get(name).cloned() else {
        return Ok(());
    };
    let lifecycle = provider
        .resource(&prior.type_name)
        .map_err(|e| failed("delete", name, e))?;
    let mut d = ResourceData::from_state(lifecycle.schema(), prior.id, prior.attributes);
    lifecycle
        .delete(&mut d)
        .await
        .map_err(|e| failed("delete", name, e))?;
    state.remove(name);
    Ok(())
}

async fn refresh_all(provider: &Provider, state_path: &Path) -> Result<()> {
    let mut state = State::load(state_path)?;
    let entries: Vec<_> = state
        .resources
        .iter()
        .map(|(name, r)| (name.clone(), r.clone()))
        .collect();

    for (name, prior) in entries {
        let lifecycle = provider
            .resource(&prior.type_name)
            .map_err(|e| failed("read", &name, e))?;
        let mut d = ResourceData::from_state(lifecycle.schema(), prior.id, prior.attributes);
        lifecycle
            .read(&mut d)
            .await
            .map_err(|e| failed("read", &name, e))?;

        if d.id().is_empty() {
            println!("{}: no longer exists, removed from state", name);
        } else {
            println!("{}: refreshed {}", name, d.id());
        }
        let id = d.id().to_string();
        state.put(&name, &prior.type_name, &id, d.into_attributes());
    }

    state.save(state_path)
}

async fn import_one(
    provider: &Provider,
    state_path: &Path,
    name: &str,
    resource_type: &str,
    id: &str,
) -> Result<()> {
    let mut state = State::load(state_path)?;
    if state.get(name).is_some() {
        bail!("{} is already managed; destroy or rename it first", name);
    }

    let lifecycle = provider
        .resource(resource_type)
        .map_err(|e| failed("import", name, e))?;
    let d = lifecycle
        .import(id)
        .await
        .map_err(|e| failed("import", name, e))?;

    println!("{}: imported {}", name, d.id());
    let id = d.id().to_string();
    state.put(name, resource_type, &id, d.into_attributes());
    state.save(state_path)
}

async fn destroy(provider: &Provider, state_path: &Path, name: Option<&str>) -> Result<()> {
    let mut state = State::load(state_path)?;
    let names: Vec<String> = match name {
        Some(name) => {
            if state.get(name).is_none() {
                bail!("{} is not in the state file", name);
            }
            vec![name.to_string()]
        }
        None => state.resources.keys().cloned().collect(),
    };

    for name in names {
        destroy_one(provider, &mut state, &name).await?;
        state.save(state_path)?;
        println!("{}: deleted", name);
    }
    Ok(())
}

//! Bindery CLI - inspect and resolve resource bindings

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use bindery::binding::{build_view, parse_declaration, validate_bindings, ResourceType};
use bindery::context::{Context, Resource, SharedContext};
use bindery::error::{BinderyError, FixSuggestion};
use bindery::provider::{env::WELL_KNOWN, LocalPlatform};
use bindery::Manifest;

static CONTEXT: SharedContext<LocalPlatform> = SharedContext::new();

#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "Bindery - lazily-resolved resource bindings")]
#[command(version)]
struct Cli {
    /// Manifest file (default: $BINDERY_MANIFEST, then ./bindery.toml)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the manifest and every binding declaration
    Check,

    /// Resolve bindings against the manifest resources
    Resolve {
        /// Symbolic names to resolve (default: every declared binding)
        names: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show well-known platform environment variables
    Env,
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let manifest_path = Manifest::resolve_path(cli.manifest);

    let result = Manifest::load(&manifest_path).and_then(|manifest| match cli.command {
        Commands::Check => check(&manifest, &manifest_path),
        Commands::Resolve { names, json } => resolve(&manifest, names, json),
        Commands::Env => show_env(&manifest),
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn context(manifest: &Manifest) -> Arc<Context<LocalPlatform>> {
    CONTEXT.get_or_init(|| Arc::new(LocalPlatform::from_manifest(manifest)))
}

fn check(manifest: &Manifest, path: &std::path::Path) -> Result<(), BinderyError> {
    let bindings = manifest.binding_map();
    validate_bindings(&bindings)?;

    println!(
        "{} Manifest '{}' is valid",
        "✓".green(),
        path.display()
    );
    println!("  Bindings: {}", bindings.len());
    for category in ResourceType::ALL {
        let count = bindings
            .values()
            .filter_map(|decl| parse_declaration(decl))
            .filter(|decl| decl.resource_type == category)
            .count();
        if count > 0 {
            println!("    {}: {}", category, count);
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Resolved,
    Absent,
    Undeclared,
}

#[derive(Debug, Serialize)]
struct BindingReport {
    name: String,
    declaration: Option<String>,
    resource_type: Option<ResourceType>,
    provider_name: Option<String>,
    status: Status,
    detail: Option<String>,
}

fn describe(resource: &Resource<LocalPlatform>) -> String {
    match resource {
        Resource::Acl(acl) => acl.name().to_string(),
        Resource::Backend(backend) => match backend.host() {
            Some(host) => format!("{} (host: {})", backend.url(), host),
            None => backend.url().to_string(),
        },
        Resource::ConfigStore(store) => store.name().to_string(),
        Resource::Env(value) => value.clone(),
        Resource::KvStore(store) => format!("{} ({} keys)", store.name(), store.keys().count()),
        Resource::Logger(logger) => logger.name().to_string(),
        Resource::SecretStore(store) => store.name().to_string(),
    }
}

fn resolve(manifest: &Manifest, names: Vec<String>, json: bool) -> Result<(), BinderyError> {
    let bindings = manifest.binding_map();
    let ctx = context(manifest);
    let view = build_view(&ctx, &bindings);

    let names = if names.is_empty() {
        view.keys().into_iter().map(str::to_string).collect()
    } else {
        names
    };

    let reports: Vec<BindingReport> = names
        .into_iter()
        .map(|name| {
            let declaration = view.declaration(&name);
            let parsed = declaration.and_then(parse_declaration);
            let resolved = view.get(&name);
            let status = match (&declaration, &resolved) {
                (None, _) => Status::Undeclared,
                (Some(_), Some(_)) => Status::Resolved,
                (Some(_), None) => Status::Absent,
            };
            BindingReport {
                declaration: declaration.map(str::to_string),
                resource_type: parsed.as_ref().map(|d| d.resource_type),
                provider_name: parsed.as_ref().map(|d| d.resource_name_or(&name).to_string()),
                status,
                detail: resolved.as_ref().map(describe),
                name,
            }
        })
        .collect();

    debug!(context = ?ctx, "resolution finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        let declaration = report.declaration.as_deref().unwrap_or("-");
        match report.status {
            Status::Resolved => println!(
                "{} {} = {} → {}",
                "✓".green(),
                report.name.bold(),
                declaration,
                report.detail.as_deref().unwrap_or_default().cyan()
            ),
            Status::Absent => println!(
                "{} {} = {} → {}",
                "✗".red(),
                report.name.bold(),
                declaration,
                "absent".red()
            ),
            Status::Undeclared => println!(
                "{} {} → {}",
                "?".yellow(),
                report.name.bold(),
                "not declared".yellow()
            ),
        }
    }

    Ok(())
}

fn show_env(manifest: &Manifest) -> Result<(), BinderyError> {
    let ctx = context(manifest);

    for name in WELL_KNOWN {
        match ctx.env().get(name) {
            Some(value) => println!("{}={}", name.bold(), value),
            None => println!("{}={}", name.bold(), "(unset)".dimmed()),
        }
    }

    Ok(())
}

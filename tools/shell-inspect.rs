//! Inspect the routes a manifest produces and the access decision for a role
//!
//! ```text
//! shell-inspect --manifest public/config.json --role member /booking/list /reporting/dashboard
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use remote_shell::module::registry::{source_for_location, ManifestStore};
use remote_shell::module::security::AccessPolicy;
use remote_shell::router::{decide, RouteDecision, RouteTable, ShellPaths};
use remote_shell::session::{HistoryNavigator, MemorySessionStorage, SessionState};
use remote_shell::utils::init_logging_from_config;
use remote_shell::ShellConfig;

#[derive(Parser, Debug)]
#[command(name = "shell-inspect", about = "Show routes and access decisions for a module manifest")]
struct Args {
    /// Shell config file (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Manifest location (overrides the config)
    #[arg(short, long)]
    manifest: Option<String>,

    /// Role to evaluate as; omit to evaluate signed out
    #[arg(short, long)]
    role: Option<String>,

    /// Username for the simulated session
    #[arg(long, default_value = "inspector")]
    username: String,

    /// Paths to evaluate; omit to evaluate every route in the manifest
    paths: Vec<String>,
}

fn describe(decision: &RouteDecision) -> String {
    match decision {
        RouteDecision::Home => "home".to_string(),
        RouteDecision::Checking => "checking session".to_string(),
        RouteDecision::AllowAuthPath(entry) => {
            format!("allow (auth path) -> {} {}", entry.scope, entry.export_name)
        }
        RouteDecision::RequireAuth { login_path } => {
            format!("authentication required (login at {})", login_path)
        }
        RouteDecision::Allow(entry) => format!("allow -> {} {}", entry.scope, entry.export_name),
        RouteDecision::Deny => "access denied".to_string(),
        RouteDecision::NotFound => "404 not found".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ShellConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ShellConfig::default(),
    };
    init_logging_from_config(Some(&config.logging));

    let location = args
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest_location.clone());
    let manifest = ManifestStore::new();
    let loaded = manifest.load(source_for_location(&location).as_ref()).await;

    let session = SessionState::new(
        Arc::new(MemorySessionStorage::new()),
        Arc::new(HistoryNavigator::default()),
        config.session_key.clone(),
        config.root_path.clone(),
    );
    session.restore();
    if let Some(role) = &args.role {
        session.login(args.username.clone(), role.clone());
    }

    let routes = RouteTable::from_manifest(&manifest.snapshot().await);
    println!("Manifest: {} ({} modules, {} routes)", location, loaded, routes.len());
    for entry in routes.entries() {
        let permissions: Vec<&str> = entry.permissions.iter().map(String::as_str).collect();
        println!(
            "  {:<28} {:<12} {:<16} [{}]",
            entry.path,
            entry.scope,
            entry.export_name,
            permissions.join(", ")
        );
    }

    let paths: Vec<String> = if args.paths.is_empty() {
        routes.entries().iter().map(|e| e.path.clone()).collect()
    } else {
        args.paths.clone()
    };

    let policy = AccessPolicy::new(config.admin_role.clone());
    let shell_paths = ShellPaths {
        root: config.root_path.clone(),
        login: config.login_path.clone(),
    };
    let phase = session.phase();

    println!();
    println!("Role: {}", args.role.as_deref().unwrap_or("(signed out)"));
    for path in paths {
        let decision = decide(&path, &routes, &phase, &policy, &shell_paths);
        println!("  {:<28} {}", path, describe(&decision));
    }

    Ok(())
}

use crate::endpoint::OwnerContext;
use crate::ids::EndpointId;
use crate::manifest::load_registry;
use crate::sitemap::{MatchOutcome, SearchContext, SitemapManager};
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command-line interface for inspecting sitemap manifests
#[derive(Parser, Debug)]
#[command(name = "sitemap-cli")]
#[command(about = "Inspect, search and reverse-resolve a sitemap manifest", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merged sitemap tree
    Dump {
        /// Path to the manifest (YAML or JSON)
        #[arg(short, long, env = "SITEMAP_MANIFEST")]
        manifest: PathBuf,
    },
    /// Route a request path against the sitemap
    Search {
        #[arg(short, long, env = "SITEMAP_MANIFEST")]
        manifest: PathBuf,

        /// Request path, optionally with query and fragment
        path: String,

        /// Requested culture passed through to the search context
        #[arg(long)]
        culture: Option<String>,
    },
    /// Build the URI of an endpoint
    Uri {
        #[arg(short, long, env = "SITEMAP_MANIFEST")]
        manifest: PathBuf,

        #[arg(short, long)]
        endpoint: String,

        /// Restrict the lookup to endpoints of this application
        #[arg(short, long)]
        application: Option<String>,

        /// Restrict the lookup to endpoints of this module (needs --application)
        #[arg(long, requires = "application")]
        module: Option<String>,

        /// Variable value, repeatable
        #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid NAME=VALUE: empty name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn load_manager(manifest: &Path) -> anyhow::Result<SitemapManager> {
    let (config, registry) = load_registry(manifest)?;
    let manager = SitemapManager::new(config);
    manager.refresh(&registry);
    Ok(manager)
}

/// Execute `cli`, writing the command output to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Dump { manifest } => {
            let tree = load_manager(manifest)?.snapshot();
            writeln!(
                out,
                "# {} nodes, {} endpoints",
                tree.len(),
                tree.endpoint_count()
            )?;
            write!(out, "{}", tree.dump())?;
        }
        Commands::Search {
            manifest,
            path,
            culture,
        } => {
            let manager = load_manager(manifest)?;
            let context = SearchContext {
                culture: culture.clone(),
                ..SearchContext::default()
            };
            let result = manager.search(path, context);
            let outcome = match result.outcome {
                MatchOutcome::Exact => "exact",
                MatchOutcome::SubPath => "sub_path",
                MatchOutcome::NotFound => "not_found",
            };
            writeln!(out, "outcome: {outcome}")?;
            if let Some(binding) = &result.binding {
                writeln!(
                    out,
                    "endpoint: {} ({}, {})",
                    binding.endpoint_id, binding.owner, binding.kind
                )?;
            } else if let Some(fallback) = &result.fallback {
                writeln!(out, "fallback: {} ({})", fallback.endpoint_id, fallback.owner)?;
            }
            writeln!(out, "uri: {}", result.uri)?;
            for (name, value) in &result.params {
                writeln!(out, "param {name} = {value}")?;
            }
            if !result.remaining.is_empty() {
                writeln!(out, "remaining: /{}", result.remaining.join("/"))?;
            }
            if !result.is_match() {
                bail!("no endpoint serves {path}");
            }
        }
        Commands::Uri {
            manifest,
            endpoint,
            application,
            module,
            params,
        } => {
            let manager = load_manager(manifest)?;
            let endpoint_id = EndpointId::new(endpoint);
            let params: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let uri = match (application, module) {
                (Some(app), Some(module)) => manager.get_uri_for_owner(
                    &endpoint_id,
                    &OwnerContext::module(app.as_str(), module.as_str()),
                    &params,
                ),
                (Some(app), None) => manager.get_uri_for_owner(
                    &endpoint_id,
                    &OwnerContext::application(app.as_str()),
                    &params,
                ),
                _ => manager.get_uri(&endpoint_id, &params),
            }
            .ok_or_else(|| {
                anyhow!("endpoint '{endpoint}' is not registered or parameters are missing or invalid")
            })?;
            writeln!(out, "{uri}")?;
        }
    }
    Ok(())
}

/// Parse the process arguments and run against stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out).context("sitemap-cli failed")
}

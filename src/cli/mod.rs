//! Command-line interface for the artifact catalog.
//!
//! Provides commands for creating and loading a catalog, adding artifacts,
//! faceted search, tag listings and the Hydrogen feed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ResolvedConfig;
use crate::domain::{Artifact, License, NewArtifact};
use crate::hydrogen::hydrogen_feed;
use crate::library::format::{resolve_effective_format, ResolutionPolicy};
use crate::library::{ArtifactStore, Catalog, LocalFile};
use crate::search::{self, ArtifactQuery, FacetTokens, SearchParams};

/// musical-artifacts - Catalog of downloadable music production artifacts
#[derive(Parser, Debug)]
#[command(name = "musical-artifacts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the catalog database and seed the default licenses
    Init,

    /// Load licenses and artifacts from a JSON catalog file
    Import {
        /// Catalog file to read
        file: PathBuf,
    },

    /// Write every license and artifact to a JSON catalog file
    Export {
        /// Catalog file to write
        file: PathBuf,
    },

    /// Add a single artifact
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        #[arg(long)]
        author: String,

        /// License short code (by, by-sa, public, ...)
        #[arg(short, long)]
        license: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Local file to attach (its digest is recorded)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Mirror URL (repeatable)
        #[arg(short, long)]
        mirror: Vec<String>,

        /// Tags to apply (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,

        /// Compatible software (comma-separated)
        #[arg(short, long)]
        apps: Option<String>,

        /// Declared file formats (comma-separated)
        #[arg(long)]
        formats: Option<String>,
    },

    /// Search the catalog; facets combine with AND
    Search {
        /// Require every tag (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,

        /// Require every application (comma-separated)
        #[arg(short, long)]
        apps: Option<String>,

        /// Any of these license codes (comma-separated)
        #[arg(short, long)]
        license: Option<String>,

        /// Any of these file formats (comma-separated)
        #[arg(short, long)]
        formats: Option<String>,

        /// Any of these file hashes (comma-separated)
        #[arg(long)]
        hash: Option<String>,

        /// Text in name, description or author
        #[arg(short, long)]
        query: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tags in use
    Tags {
        /// Only tags containing this text
        filter: Option<String>,

        /// List software tags instead of free-form tags
        #[arg(long)]
        apps: bool,

        /// Show the most recently applied tags instead
        #[arg(long, value_name = "LIMIT", num_args = 0..=1, default_missing_value = "20")]
        recent: Option<usize>,
    },

    /// List known licenses
    Licenses,

    /// Render the Hydrogen drumkit feed
    Hydrogen {
        /// Output format (only "xml" is supported)
        #[arg(short, long, default_value = "xml")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self, config: &ResolvedConfig) -> Result<()> {
        match self.command {
            Commands::Init => init(config),
            Commands::Import { file } => import(config, file).await,
            Commands::Export { file } => export(config, file).await,
            Commands::Add {
                name,
                author,
                license,
                description,
                file,
                mirror,
                tags,
                apps,
                formats,
            } => {
                let artifact = NewArtifact::new(name, author, license)
                    .with_description(description)
                    .with_tags(FacetTokens::parse(tags.as_deref()).into_vec())
                    .with_software(FacetTokens::parse(apps.as_deref()).into_vec())
                    .with_file_formats(FacetTokens::parse(formats.as_deref()).into_vec());
                let artifact = mirror
                    .into_iter()
                    .fold(artifact, |artifact, url| artifact.with_mirror(url));
                add(config, artifact, file).await
            }
            Commands::Search {
                tags,
                apps,
                license,
                formats,
                hash,
                query,
                json,
            } => {
                let params = SearchParams {
                    tags,
                    apps,
                    license,
                    formats,
                    hash,
                    q: query,
                };
                search_catalog(config, &params, json)
            }
            Commands::Tags {
                filter,
                apps,
                recent,
            } => list_tags(config, filter.as_deref(), apps, recent),
            Commands::Licenses => list_licenses(config),
            Commands::Hydrogen { format, output } => render_hydrogen(config, &format, output).await,
            Commands::Config => show_config(config),
        }
    }
}

fn open_store(config: &ResolvedConfig) -> Result<ArtifactStore> {
    ArtifactStore::open(&config.database)
        .with_context(|| format!("Failed to open catalog: {}", config.database.display()))
}

/// Create the database and seed licenses
fn init(config: &ResolvedConfig) -> Result<()> {
    let store = open_store(config)?;

    let mut added = 0;
    for license in License::defaults() {
        if store.add_license(&license)? {
            added += 1;
        }
    }

    println!("Catalog ready at {}", config.database.display());
    println!("{} licenses added", added);
    Ok(())
}

/// Import a catalog file
async fn import(config: &ResolvedConfig, file: PathBuf) -> Result<()> {
    let catalog = Catalog::load(&file)
        .await
        .with_context(|| format!("Failed to load catalog file: {}", file.display()))?;

    let mut store = open_store(config)?;
    let summary = catalog.import_into(&mut store)?;

    println!(
        "Imported {} licenses and {} artifacts",
        summary.licenses_added, summary.artifacts_added
    );
    for name in &summary.skipped {
        eprintln!("  skipped (unknown license): {}", name);
    }
    Ok(())
}

/// Export the catalog to a file
async fn export(config: &ResolvedConfig, file: PathBuf) -> Result<()> {
    let store = open_store(config)?;
    let catalog = Catalog::export(&store)?;

    catalog
        .save(&file)
        .await
        .with_context(|| format!("Failed to write catalog file: {}", file.display()))?;

    println!(
        "Exported {} artifacts to {}",
        catalog.artifacts.len(),
        file.display()
    );
    Ok(())
}

/// Add one artifact, hashing its local file if given
async fn add(config: &ResolvedConfig, artifact: NewArtifact, file: Option<PathBuf>) -> Result<()> {
    let artifact = match file {
        Some(path) => {
            let local = LocalFile::read(&path).await?;
            tracing::info!(
                "Attaching {} ({} bytes, sha256 {})",
                local.file_name,
                local.size_bytes,
                local.file_hash
            );
            artifact
                .with_file(local.file_name)
                .with_file_hash(local.file_hash)
        }
        None => artifact,
    };

    let mut store = open_store(config)?;
    let stored = store.insert(&artifact)?;

    println!("Added artifact {}: {}", stored.id, stored.name);
    Ok(())
}

/// Run a faceted search and print the matches
fn search_catalog(config: &ResolvedConfig, params: &SearchParams, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let query = params.apply(&ArtifactQuery::all());
    let results = store.fetch(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No artifacts found");
        return Ok(());
    }

    println!(
        "{:<6} {:<32} {:<20} {:<10} {:<10}",
        "ID", "NAME", "AUTHOR", "LICENSE", "FORMAT"
    );
    println!("{}", "-".repeat(82));

    for artifact in &results {
        println!(
            "{:<6} {:<32} {:<20} {:<10} {:<10}",
            artifact.id,
            truncate(&artifact.name, 32),
            truncate(&artifact.author, 20),
            artifact.license.short_name,
            display_format(artifact)
        );
    }

    println!("\n{} artifacts", results.len());
    Ok(())
}

fn display_format(artifact: &Artifact) -> String {
    resolve_effective_format(artifact, ResolutionPolicy::CATALOG)
        .map(|f| f.extension)
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// List tags, software tags or recent tags
fn list_tags(
    config: &ResolvedConfig,
    filter: Option<&str>,
    apps: bool,
    recent: Option<usize>,
) -> Result<()> {
    let store = open_store(config)?;

    if let Some(limit) = recent {
        for tag in search::recent_tags(&store, Some(limit))? {
            println!("{}", tag);
        }
        return Ok(());
    }

    let counts = if apps {
        search::app_tags(&store, filter)?
    } else {
        search::tags(&store, filter)?
    };

    if counts.is_empty() {
        println!("No tags found");
        return Ok(());
    }

    for tag in counts {
        println!("{:<32} {}", tag.name, tag.count);
    }
    Ok(())
}

fn list_licenses(config: &ResolvedConfig) -> Result<()> {
    let store = open_store(config)?;

    for license in store.licenses()? {
        println!("{:<12} {}", license.short_name, license.name);
    }
    Ok(())
}

/// Render the Hydrogen feed
async fn render_hydrogen(
    config: &ResolvedConfig,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(config)?;
    let (format, feed) = hydrogen_feed(&store, &config.settings, format)?;
    let document = feed.render(format);

    match output {
        Some(path) => {
            tokio::fs::write(&path, document)
                .await
                .with_context(|| format!("Failed to write feed: {}", path.display()))?;
            eprintln!(
                "[{} entries written to {} as {}]",
                feed.len(),
                path.display(),
                format.content_type()
            );
        }
        None => print!("{}", document),
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Home:     {}", config.home.display());
    println!("Database: {}", config.database.display());
    match &config.config_file {
        Some(path) => println!("Config:   {}", path.display()),
        None => println!("Config:   (none, using defaults)"),
    }

    let settings = &config.settings;
    println!("\nSettings:");
    println!("  hostname:                {}", settings.hostname);
    println!("  site_name:               {}", settings.site_name);
    println!("  api_throttle_per_minute: {}", settings.api_throttle_per_minute);
    println!(
        "  comments:                {} ({:?}, css: {})",
        settings.comments.server_url.as_deref().unwrap_or("disabled"),
        settings.comments.order,
        settings.comments.include_css
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long name", 10), "a rathe...");
    }

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "musical-artifacts",
            "search",
            "--tags",
            "synth, preset",
            "--license",
            "by",
        ])
        .unwrap();

        match cli.command {
            Commands::Search { tags, license, apps, .. } => {
                assert_eq!(tags.as_deref(), Some("synth, preset"));
                assert_eq!(license.as_deref(), Some("by"));
                assert_eq!(apps, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_hydrogen_defaults_to_xml() {
        let cli = Cli::try_parse_from(["musical-artifacts", "hydrogen"]).unwrap();
        match cli.command {
            Commands::Hydrogen { format, output } => {
                assert_eq!(format, "xml");
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_recent_tags_default_limit() {
        let cli = Cli::try_parse_from(["musical-artifacts", "tags", "--recent"]).unwrap();
        match cli.command {
            Commands::Tags { recent, .. } => assert_eq!(recent, Some(20)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

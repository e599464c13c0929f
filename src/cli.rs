use clap::Parser;
use std::path::PathBuf;

/// Import a CycloneDX SBOM into the dependency graph store
#[derive(Parser, Debug)]
#[command(name = "depvis-import")]
#[command(version)]
#[command(
    about = "Import a CycloneDX SBOM into the dependency graph store",
    long_about = None
)]
pub struct Args {
    /// Path to the SBOM document (JSON)
    #[arg(value_name = "SBOM")]
    pub sbom: PathBuf,

    /// Project to import into (created when no project has this name)
    #[arg(short = 'n', long)]
    pub project_name: Option<String>,

    /// Id of an existing project to import into; takes precedence over --project-name
    #[arg(long)]
    pub project_id: Option<String>,

    /// Version string for this import (defaults to the SBOM's main component version)
    #[arg(long)]
    pub project_version: Option<String>,

    /// Store snapshot file (read before and written after the import)
    #[arg(short, long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Config file (defaults to depvis-import.config.yml in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not look up or store vulnerabilities
    #[arg(long)]
    pub skip_vulnerabilities: bool,

    /// Delete the partially imported project version when the import fails
    #[arg(long)]
    pub compensate_on_failure: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

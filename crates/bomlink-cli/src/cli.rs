use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bomlink_pickup::PackageType;
use bomlink_types::ReleaseId;

#[derive(Parser)]
#[command(
    name = "bomlink",
    about = "Yocto SPDX resolution, component pickup, and FOSSology scan triggering",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve an SPDX document and its cross-document references
    Resolve(ResolveArgs),
    /// List the components of an image build
    Pickup(PickupArgs),
    /// Trigger FOSSology scans for SW360 releases and poll their status
    Trigger(TriggerArgs),
    /// Register an image's components in SW360, attach their sources, and
    /// scan them
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// The SPDX JSON document to resolve
    pub document: PathBuf,
    /// Yocto deploy directory holding `spdx/<machine>/`
    #[arg(long)]
    pub deploy_dir: Option<PathBuf>,
    /// Machine partitions to search; all of them when omitted
    #[arg(long = "machine")]
    pub machines: Vec<String>,
}

#[derive(Args)]
pub struct PickupArgs {
    #[arg(long)]
    pub deploy_dir: Option<PathBuf>,
    #[arg(long)]
    pub machine: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    /// rpm, ipk, or deb; detected when omitted
    #[arg(long)]
    pub package_type: Option<PackageType>,
    /// NVD CPE dictionary (JSON) used to fill wildcard CPE vendors
    #[arg(long)]
    pub cpe_catalog: Option<PathBuf>,
}

/// SW360 connection and scan queue settings.
#[derive(Args)]
pub struct ScanArgs {
    /// SW360 base URL
    #[arg(long)]
    pub url: Option<String>,
    /// SW360 REST token
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub workers: Option<usize>,
    /// Seconds between attempts
    #[arg(long)]
    pub interval: Option<u64>,
    /// Retries per phase
    #[arg(long)]
    pub retries: Option<u32>,
    /// Ask FOSSology to rescan releases with an existing process
    #[arg(long)]
    pub mark_outdated: bool,
}

#[derive(Args)]
pub struct TriggerArgs {
    /// SW360 release ids
    #[arg(required = true)]
    pub releases: Vec<ReleaseId>,
    #[command(flatten)]
    pub scan: ScanArgs,
}

#[derive(Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub pickup: PickupArgs,
    #[command(flatten)]
    pub scan: ScanArgs,
    /// SW360 project the image's releases are linked to
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub project_version: Option<String>,
    /// Register and attach only; trigger no scans
    #[arg(long)]
    pub no_scan: bool,
}

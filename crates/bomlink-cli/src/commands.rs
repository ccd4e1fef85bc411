use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use bomlink_pickup::{Component, CpeCatalog, Pickup};
use bomlink_spdx::{NameIndex, Resolver};
use bomlink_sw360::{SourceUpload, Sw360Client, UploadSummary, Uploader};
use bomlink_trigger::{ScanService, TriggerOutcome, TriggerQueue, TriggerSummary};

use crate::cli::*;
use crate::config::Config;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Resolve(args) => cmd_resolve(&config, args, cli.format),
        Command::Pickup(args) => cmd_pickup(&config, args, cli.format),
        Command::Trigger(args) => cmd_trigger(&config, args, cli.format),
        Command::Upload(args) => cmd_upload(&config, args, cli.format),
    }
}

fn cmd_resolve(config: &Config, args: ResolveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let deploy_dir: PathBuf = args
        .deploy_dir
        .unwrap_or_else(|| config.deploy.deploy_dir.clone());
    let index = NameIndex::from_deploy_dir(&deploy_dir, args.machines.as_slice())?;
    let mut resolver = Resolver::new(index);
    let doc = resolver
        .resolve_with_refs(&args.document)
        .with_context(|| format!("resolving {}", args.document.display()))?;

    let ns = doc.namespace();
    let source = resolver.generated_from(ns);
    let deps = resolver.build_dependencies(ns);

    match format {
        OutputFormat::Json => {
            let out = json!({
                "namespace": ns,
                "name": doc.primary_package().name,
                "generatedFrom": source.as_ref().map(|d| d.namespace()),
                "buildDependencies": deps,
                "documentsLoaded": resolver.store().len(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{} Resolved {}", "✓".green().bold(), ns.as_str().bold());
            println!("  Package: {}", doc.primary_package().name.cyan());
            match &source {
                Some(src) => println!(
                    "  Generated from: {} ({})",
                    src.primary_package().name.yellow(),
                    src.namespace()
                ),
                None => println!("  Generated from: {}", "-".dimmed()),
            }
            if deps.is_empty() {
                println!("  Build dependencies: {}", "none".dimmed());
            } else {
                println!("  Build dependencies:");
                for dep in deps {
                    println!("    {}", dep.as_str().blue());
                }
            }
            println!("  Documents loaded: {}", resolver.store().len().to_string().bold());
        }
    }
    Ok(())
}

/// Run component pickup for the deploy settings in `args`.
fn collect_components(config: &Config, args: &PickupArgs) -> anyhow::Result<Vec<Component>> {
    let deploy = config.deploy_for(args);
    let mut pickup = Pickup::open(deploy)?;
    if let Some(path) = &args.cpe_catalog {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        pickup = pickup.with_vendor_lookup(Box::new(CpeCatalog::from_nvd_json(&bytes)?));
    }
    Ok(pickup.components()?)
}

fn cmd_pickup(config: &Config, args: PickupArgs, format: OutputFormat) -> anyhow::Result<()> {
    let components = collect_components(config, &args)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&components)?),
        OutputFormat::Text => {
            for c in &components {
                print_component(c);
            }
            println!(
                "\n{} {} components ({} with SPDX metadata)",
                "✓".green().bold(),
                components.len(),
                components.iter().filter(|c| c.has_spdx_metadata()).count()
            );
        }
    }
    Ok(())
}

fn print_component(c: &Component) {
    println!("{} {} ({})", c.name.bold(), c.version.yellow(), c.arch.dimmed());
    println!("  Package: {}", c.path.display());
    if let Some(src) = &c.src_path {
        println!("  Source: {}", src.display());
    }
    if let Some(license) = &c.license {
        println!("  License: {}", license.cyan());
    }
    if let Some(recipe) = &c.recipe {
        println!("  Recipe: {}", recipe);
    }
    if let Some(cpe) = &c.cpe_id {
        println!("  CPE: {}", cpe.blue());
    }
}

fn cmd_trigger(config: &Config, args: TriggerArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (sw360, trigger) = config.trigger_for(&args.scan);
    let client: Arc<dyn ScanService> = Arc::new(Sw360Client::new(sw360)?);
    let queue = TriggerQueue::new(client, trigger)?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let summary = runtime.block_on(queue.run(args.releases));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_summary(&summary),
    }
    Ok(())
}

fn cmd_upload(config: &Config, args: UploadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let components = collect_components(config, &args.pickup)?;
    let (sw360, trigger) = config.trigger_for(&args.scan);
    let client = Arc::new(Sw360Client::new(sw360)?);
    let uploader = Uploader::new(&client, config.upload_for(&args))?;
    let queue = if args.no_scan {
        None
    } else {
        let service: Arc<dyn ScanService> = client.clone();
        Some(TriggerQueue::new(service, trigger)?)
    };

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let (uploaded, scans) = runtime.block_on(async {
        let uploaded = uploader
            .upload(&components)
            .await
            .context("uploading components to SW360")?;
        let scans = match &queue {
            Some(queue) => Some(queue.run(uploaded.scan_targets()).await),
            None => None,
        };
        Ok::<_, anyhow::Error>((uploaded, scans))
    })?;

    match format {
        OutputFormat::Json => {
            let out = json!({"upload": uploaded, "scans": scans});
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            print_upload(&uploaded);
            if let Some(scans) = &scans {
                println!();
                print_summary(scans);
            }
        }
    }
    Ok(())
}

fn print_upload(summary: &UploadSummary) {
    for r in &summary.releases {
        let source = match r.source {
            SourceUpload::Uploaded => "source uploaded".green(),
            SourceUpload::AlreadyAttached => "source already attached".normal(),
            SourceUpload::NoSource => "no source".dimmed(),
        };
        println!(
            "{} {} {}  release {}  {}",
            "✓".green().bold(),
            r.component.bold(),
            r.version.yellow(),
            r.release,
            source
        );
    }
    println!(
        "\n{} releases linked to project {}, {} to scan",
        summary.release_ids().len().to_string().bold(),
        summary.project.cyan(),
        summary.scan_targets().len().to_string().bold()
    );
}

fn print_summary(summary: &TriggerSummary) {
    for report in &summary.reports {
        let mark = if report.is_error() { "✗".red().bold() } else { "✓".green().bold() };
        let status = report.status.as_deref().unwrap_or("-");
        println!(
            "{} {}  {}  status: {}",
            mark,
            report.release.as_str().yellow(),
            report.outcome(),
            status
        );
    }
    println!(
        "\n{} completed, {} trigger failed, {} status unresolved",
        summary.count(TriggerOutcome::Completed).to_string().green(),
        summary.count(TriggerOutcome::TriggerFailed).to_string().red(),
        summary.count(TriggerOutcome::StatusUnresolved).to_string().yellow(),
    );
}

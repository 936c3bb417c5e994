use std::fmt::{self, Write as _};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use iwr_refs::{AssemblyDescription, DeployableDescription, RecordReport, Resolution};
use iwr_sdk::{parse_target, Relations};
use iwr_server::{IwrServer, ServerConfig};
use iwr_types::{Direction, EntityId, EntityType, LEVELS};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = settings(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Parents(args) => cmd_resolve(&config, format, args, Direction::Parents).await,
        Command::Children(args) => cmd_resolve(&config, format, args, Direction::Children).await,
        Command::RecordAssembly(args) => cmd_record_assembly(&config, format, &args.file).await,
        Command::RecordDeployable(args) => cmd_record_deployable(&config, format, &args.file).await,
        Command::Hierarchy => cmd_hierarchy(format),
        Command::Serve(args) => cmd_serve(config, args).await,
    }
}

/// Configuration file values with command-line overrides applied.
fn settings(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(url) = &cli.store_url {
        config.store.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(limit) = cli.concurrency {
        config.scan_concurrency = limit;
    }
    Ok(config)
}

fn connect(config: &ServerConfig) -> anyhow::Result<Relations> {
    Ok(Relations::connect(&config.store, config.scan_concurrency)?)
}

async fn cmd_resolve(
    config: &ServerConfig,
    format: OutputFormat,
    args: TargetArgs,
    direction: Direction,
) -> anyhow::Result<()> {
    let (entity, id) = parse_target(&args.collection, &args.id)?;
    let resolution = connect(config)?.resolve(entity, &id, direction).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolution)?),
        OutputFormat::Text => print!("{}", render_resolution(entity, &id, direction, &resolution)?),
    }
    Ok(())
}

async fn cmd_record_assembly(config: &ServerConfig, format: OutputFormat, file: &Path) -> anyhow::Result<()> {
    let text = read_payload(file)?;
    let assembly = if is_json_file(file) {
        serde_json::from_str::<AssemblyDescription>(&text)
            .with_context(|| format!("parsing {}", file.display()))?
    } else {
        AssemblyDescription::from_xml(&text)?
    };
    let report = connect(config)?.record_assembly(&assembly).await?;
    print_report(format, &report)
}

async fn cmd_record_deployable(config: &ServerConfig, format: OutputFormat, file: &Path) -> anyhow::Result<()> {
    let text = read_payload(file)?;
    let deployable = if is_json_file(file) {
        serde_json::from_str::<DeployableDescription>(&text)
            .with_context(|| format!("parsing {}", file.display()))?
    } else {
        DeployableDescription::from_xml(&text)?
    };
    let report = connect(config)?.record_deployable(&deployable).await?;
    print_report(format, &report)
}

fn cmd_hierarchy(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let levels: Vec<_> = LEVELS
                .iter()
                .map(|level| {
                    serde_json::json!({
                        "type": level.entity,
                        "collection": level.entity.collection(),
                        "parent": level.parent,
                        "child": level.child,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&levels)?);
        }
        OutputFormat::Text => print!("{}", render_hierarchy()?),
    }
    Ok(())
}

async fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!(
        "iwr server on {} (store: {})",
        config.bind_addr.to_string().bold(),
        config.store.base_url
    );
    IwrServer::new(config)?.serve().await?;
    Ok(())
}

fn read_payload(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn is_json_file(file: &Path) -> bool {
    file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn print_report(format: OutputFormat, report: &RecordReport) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", render_report(report)?),
    }
    Ok(())
}

fn render_resolution(
    entity: EntityType,
    id: &EntityId,
    direction: Direction,
    resolution: &Resolution,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} of {}/{} ({})",
        direction.as_str(),
        entity.collection(),
        id.as_str().yellow(),
        resolution.len()
    )?;
    if resolution.is_empty() {
        writeln!(out, "  {}", "none".dimmed())?;
    }
    for relation in &resolution.relations {
        writeln!(out, "  {:<16} {}", relation.entity.singular().cyan(), relation.id.as_str())?;
    }
    if resolution.skipped > 0 {
        writeln!(
            out,
            "{} {} scan members could not be read; results may be incomplete",
            "warning:".yellow().bold(),
            resolution.skipped
        )?;
    }
    Ok(out)
}

fn render_report(report: &RecordReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} Recorded {} {}",
        "✓".green().bold(),
        report.recorded.entity.singular(),
        report.recorded.id.as_str().yellow()
    )?;
    if report.targets.is_empty() {
        writeln!(out, "  no template references its assemblies yet")?;
    }
    for target in &report.targets {
        writeln!(out, "  {} {}", "template:".green(), target.id.as_str())?;
    }
    if report.skipped > 0 {
        writeln!(
            out,
            "{} {} templates could not be read",
            "warning:".yellow().bold(),
            report.skipped
        )?;
    }
    Ok(out)
}

fn render_hierarchy() -> Result<String, fmt::Error> {
    let mut out = String::new();
    for level in LEVELS.iter().rev() {
        writeln!(out, "{}", level.entity.collection().bold())?;
        for direction in [Direction::Parents, Direction::Children] {
            let neighbour = match level.neighbour(direction) {
                Some(neighbour) if level.supports(direction) => neighbour.collection().normal(),
                _ => "-".dimmed(),
            };
            writeln!(out, "  {:<9} {}", direction.as_str(), neighbour)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use iwr_refs::Relation;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "iwr", "--store-url", "http://warehouse:9090/", "--concurrency", "3", "hierarchy",
        ])
        .unwrap();
        let config = settings(&cli).unwrap();
        assert_eq!(config.store.base_url, "http://warehouse:9090");
        assert_eq!(config.scan_concurrency, 3);
        assert_eq!(config.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn missing_config_file_fails() {
        let cli = Cli::try_parse_from(["iwr", "--config", "/nonexistent/iwr.toml", "hierarchy"]).unwrap();
        assert!(settings(&cli).is_err());
    }

    #[test]
    fn json_payloads_are_detected_by_extension() {
        assert!(is_json_file(Path::new("a1.json")));
        assert!(is_json_file(Path::new("A1.JSON")));
        assert!(!is_json_file(Path::new("a1.xml")));
        assert!(!is_json_file(Path::new("a1")));
    }

    #[test]
    fn resolution_text_lists_relations_and_skips() {
        let resolution = Resolution {
            relations: vec![Relation::new(EntityType::Deployable, id("D1"))],
            skipped: 2,
        };
        let text =
            render_resolution(EntityType::Assembly, &id("A1"), Direction::Parents, &resolution).unwrap();
        assert!(text.contains("assemblies/"));
        assert!(text.contains("D1"));
        assert!(text.contains("could not be read"));
    }

    #[test]
    fn empty_resolution_says_none() {
        let text = render_resolution(
            EntityType::Template,
            &id("T1"),
            Direction::Children,
            &Resolution::default(),
        )
        .unwrap();
        assert!(text.contains("none"));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn report_text_names_targets() {
        let mut report = RecordReport::new(Relation::new(EntityType::Assembly, id("A1")));
        report.targets.push(Relation::new(EntityType::Template, id("T1")));
        let text = render_report(&report).unwrap();
        assert!(text.contains("A1"));
        assert!(text.contains("T1"));
    }

    #[test]
    fn report_text_warns_about_skipped_templates() {
        let mut report = RecordReport::new(Relation::new(EntityType::Deployable, id("D1")));
        report.skipped = 2;
        let text = render_report(&report).unwrap();
        assert!(text.contains("no template references"));
        assert!(text.contains("2 templates could not be read"));
    }

    #[test]
    fn hierarchy_text_covers_every_collection() {
        let text = render_hierarchy().unwrap();
        for entity in EntityType::ALL {
            assert!(text.contains(entity.collection()));
        }
    }
}

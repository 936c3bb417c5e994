use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "iwr",
    about = "Image Warehouse Relations: walk and record links between warehouse objects",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Warehouse base URL, overriding the configuration file
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// Member fetches in flight per collection scan
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the parents of an object
    Parents(TargetArgs),
    /// List the children of an object
    Children(TargetArgs),
    /// Record an assembly description (XML, or JSON with a .json extension)
    RecordAssembly(PayloadArgs),
    /// Record a deployable description (XML, or JSON with a .json extension)
    RecordDeployable(PayloadArgs),
    /// Print the type hierarchy and the supported relations
    Hierarchy,
    /// Start the relations REST server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct TargetArgs {
    /// Collection or type name, e.g. `templates` or `template`
    pub collection: String,
    pub id: String,
}

#[derive(Args)]
pub struct PayloadArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

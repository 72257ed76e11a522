//! Command-line arguments and subcommands for the `iimport` binary.
//!
//! Declared with clap's derive API.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::EmitOrder;

#[derive(Debug, Parser)]
#[command(
    name = "iimport",
    version,
    about = "Turn annotated notebook scripts into importable procedures."
)]
pub struct IimportArgs {
    /// Settings file. Defaults to `iimport.yaml` in the working directory, if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    ProceduresFirst,
    Interleaved,
}

impl From<Order> for EmitOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::ProceduresFirst => EmitOrder::ProceduresFirst,
            Order::Interleaved => EmitOrder::Interleaved,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract every frame and print the hoisted program.
    Transform {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
        /// Overrides the configured emit order.
        #[arg(long, value_enum)]
        order: Option<Order>,
    },
    /// Print the script as it runs top to bottom, markup hidden.
    Passthrough {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List extracted procedures with their signatures.
    Procedures {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show a colored diff between passthrough and transformed output.
    Diff {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Transform every document under a directory and report failures.
    Check {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Resolve a document by name and print the module it produces.
    Import {
        name: String,
        #[arg(long = "as")]
        alias: Option<String>,
        /// Extra search directories, tried after the configured ones.
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },
    /// Replay a document cell by cell through an interactive session.
    Session {
        #[arg(required = true)]
        file: PathBuf,
        /// Start with extraction enabled.
        #[arg(long)]
        enabled: bool,
    },
}

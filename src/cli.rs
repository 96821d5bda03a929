use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::context::ConverterContext;
use crate::errors::CristalError;
use crate::hierarchy::hierarchy;
use crate::markdown;
use crate::reference::{EntityReference, EntityType};

/// Parse, serialize and resolve wiki entity references
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Wiki to use, as named in the `[wikis]` table. Defaults to `default_wiki`.
    #[arg(short, long, global = true, value_name = "NAME")]
    pub wiki: Option<String>,

    /// Directory to start searching for `.cristal/config.toml` from
    #[arg(long, global = true, default_value = ".", value_name = "PATH")]
    pub root: PathBuf,

    /// Increase logging verbosity (-v = info, -vv = debug, -vvv = trace).
    /// Default is warn level. Can also set RUST_LOG env var.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Parse a reference string and print it as JSON
    Parse {
        reference: String,
        /// Expected entity type: wiki, space, document or attachment
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        entity_type: Option<EntityType>,
    },
    /// Serialize a JSON reference to the string form of the backend
    Serialize {
        /// The reference, as printed by `parse`
        json: String,
    },
    /// Print the backend URL of a reference string
    Url {
        reference: String,
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        entity_type: Option<EntityType>,
    },
    /// Parse a backend URL and print the reference as JSON
    FromUrl { url: String },
    /// Print the breadcrumb trail of a reference string as JSON
    Breadcrumbs {
        reference: String,
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        entity_type: Option<EntityType>,
    },
    /// Render a Markdown file to HTML, resolving internal links
    Render {
        file: PathBuf,
        /// List the links as JSON instead of rendering
        #[arg(long)]
        links: bool,
    },
}

impl Args {
    /// Get the log level filter string based on verbosity flags.
    /// Returns a filter suitable for tracing_subscriber::EnvFilter.
    pub fn log_level_filter(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        format!("{}={}", env!("CARGO_CRATE_NAME"), level)
    }
}

fn parse(
    ctx: &ConverterContext,
    reference: &str,
    entity_type: Option<EntityType>,
) -> Result<EntityReference, CristalError> {
    ctx.parse_reference(reference, entity_type)
        .ok_or_else(|| unresolved(ctx, reference))
}

fn unresolved(ctx: &ConverterContext, input: &str) -> CristalError {
    CristalError::Unresolved {
        input: input.to_string(),
        backend: ctx.backend_type().to_string(),
    }
}

/// Runs one subcommand and returns what should be printed.
pub fn run(ctx: &ConverterContext, command: &Command) -> Result<String, CristalError> {
    match command {
        Command::Parse {
            reference,
            entity_type,
        } => {
            let parsed = parse(ctx, reference, *entity_type)?;
            Ok(serde_json::to_string_pretty(&parsed)?)
        }
        Command::Serialize { json } => {
            let reference: EntityReference = serde_json::from_str(json)?;
            ctx.serialize_reference(&reference)
                .ok_or_else(|| unresolved(ctx, json))
        }
        Command::Url {
            reference,
            entity_type,
        } => {
            let parsed = parse(ctx, reference, *entity_type)?;
            ctx.get_url_from_reference(&parsed)
                .ok_or_else(|| unresolved(ctx, reference))
        }
        Command::FromUrl { url } => {
            let parsed = ctx
                .parse_reference_from_url(url)
                .ok_or_else(|| unresolved(ctx, url))?;
            Ok(serde_json::to_string_pretty(&parsed)?)
        }
        Command::Breadcrumbs {
            reference,
            entity_type,
        } => {
            let parsed = parse(ctx, reference, *entity_type)?;
            Ok(serde_json::to_string_pretty(&hierarchy(ctx, &parsed))?)
        }
        Command::Render { file, links } => {
            let input = std::fs::read_to_string(file)?;
            if *links {
                Ok(serde_json::to_string_pretty(&markdown::resolve_links(
                    ctx, &input,
                ))?)
            } else {
                Ok(markdown::render(ctx, &input))
            }
        }
    }
}

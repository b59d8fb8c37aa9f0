//! Command line surface
//!
//! clap parses the flags; the order-sensitive ones are then replayed as an
//! ordered list of [`CliOption`]s so the [`OptionCollector`] can bind
//! properties to the section opened most recently before them.

pub mod collector;

pub use collector::{Collected, HelpFormat, HelpRequest, OptionCollector};

use crate::error::CliError;
use crate::plugin::PluginKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "fluxbit", version)]
#[command(about = "Fast data collector: configuration, plugin topology and schema introspection")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Main configuration file (classic or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root path for filesystem buffering
    #[arg(short = 'b', long = "storage_path", value_name = "PATH")]
    pub storage_path: Option<String>,

    /// Flush interval in seconds
    #[arg(short, long, value_name = "SECONDS")]
    pub flush: Option<String>,

    /// Write log messages to FILE
    #[arg(short, long = "log_file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Parsers definition file (recorded, loaded elsewhere)
    #[arg(short = 'R', long, value_name = "FILE")]
    pub parser: Vec<String>,

    /// Enable a custom plugin
    #[arg(short = 'C', long, value_name = "NAME")]
    pub custom: Vec<String>,

    /// Enable an input plugin
    #[arg(short, long, value_name = "NAME")]
    pub input: Vec<String>,

    /// Enable a filter plugin
    #[arg(short = 'F', long, value_name = "NAME")]
    pub filter: Vec<String>,

    /// Enable an output plugin
    #[arg(short, long, value_name = "NAME")]
    pub output: Vec<String>,

    /// Set a property on the most recently enabled plugin
    #[arg(short, long = "prop", value_name = "KEY=VALUE")]
    pub prop: Vec<String>,

    /// Tag of the most recently enabled plugin
    #[arg(short, long, value_name = "TAG")]
    pub tag: Vec<String>,

    /// Match rule of the most recently enabled filter or output
    #[arg(short, long = "match", value_name = "MATCH")]
    pub match_rule: Vec<String>,

    /// Run in the background (recorded as `daemon on`)
    #[arg(short, long)]
    pub daemon: bool,

    /// Enable the monitoring interface
    #[arg(short = 'H', long)]
    pub http: bool,

    /// Monitoring interface listen address
    #[arg(short = 'L', long = "http_listen", value_name = "ADDR")]
    pub http_listen: Option<String>,

    /// Monitoring interface TCP port
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<String>,

    /// Coroutine stack size in bytes
    #[arg(short = 's', long = "coro_stack_size", value_name = "BYTES")]
    pub coro_stack_size: Option<String>,

    /// Change to DIR before loading anything
    #[arg(short, long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(short = 'D', long = "dry-run")]
    pub dry_run: bool,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version and exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Print help, or the schema of the plugin enabled just before
    #[arg(short, long)]
    pub help: bool,

    /// Like --help, as JSON
    #[arg(short = 'J', long = "help-json")]
    pub help_json: bool,
}

/// One order-sensitive option, in command line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliOption {
    Plugin { kind: PluginKind, name: String },
    Prop(String),
    Tag(String),
    Match(String),
    StoragePath(String),
    Flush(String),
    LogFile(String),
    Parser(String),
    Daemon,
    Http,
    HttpListen(String),
    HttpPort(String),
    CoroStackSize(String),
    Help,
    HelpJson,
}

/// Parses `argv` (program name first).
pub fn parse_from<I, T>(argv: I) -> Result<(Args, Vec<CliOption>), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Args::command().try_get_matches_from(argv)?;
    let args = Args::from_arg_matches(&matches)?;
    Ok((args, ordered_options(&matches)))
}

fn ordered_options(matches: &ArgMatches) -> Vec<CliOption> {
    let mut indexed = Vec::new();

    values(matches, "custom", &mut indexed, |name| CliOption::Plugin {
        kind: PluginKind::Custom,
        name,
    });
    values(matches, "input", &mut indexed, |name| CliOption::Plugin {
        kind: PluginKind::Input,
        name,
    });
    values(matches, "filter", &mut indexed, |name| CliOption::Plugin {
        kind: PluginKind::Filter,
        name,
    });
    values(matches, "output", &mut indexed, |name| CliOption::Plugin {
        kind: PluginKind::Output,
        name,
    });
    values(matches, "prop", &mut indexed, CliOption::Prop);
    values(matches, "tag", &mut indexed, CliOption::Tag);
    values(matches, "match_rule", &mut indexed, CliOption::Match);
    values(matches, "storage_path", &mut indexed, CliOption::StoragePath);
    values(matches, "flush", &mut indexed, CliOption::Flush);
    values(matches, "log_file", &mut indexed, CliOption::LogFile);
    values(matches, "parser", &mut indexed, CliOption::Parser);
    values(matches, "http_listen", &mut indexed, CliOption::HttpListen);
    values(matches, "port", &mut indexed, CliOption::HttpPort);
    values(matches, "coro_stack_size", &mut indexed, CliOption::CoroStackSize);
    flag(matches, "daemon", &mut indexed, CliOption::Daemon);
    flag(matches, "http", &mut indexed, CliOption::Http);
    flag(matches, "help", &mut indexed, CliOption::Help);
    flag(matches, "help_json", &mut indexed, CliOption::HelpJson);

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, option)| option).collect()
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

fn values(
    matches: &ArgMatches,
    id: &str,
    out: &mut Vec<(usize, CliOption)>,
    build: fn(String) -> CliOption,
) {
    if !from_command_line(matches, id) {
        return;
    }
    let (Some(indices), Some(items)) = (matches.indices_of(id), matches.get_many::<String>(id))
    else {
        return;
    };
    out.extend(indices.zip(items).map(|(index, v)| (index, build(v.clone()))));
}

fn flag(matches: &ArgMatches, id: &str, out: &mut Vec<(usize, CliOption)>, option: CliOption) {
    if !from_command_line(matches, id) {
        return;
    }
    if let Some(index) = matches.index_of(id) {
        out.push((index, option));
    }
}

//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. The `Cli` struct doubles as a figment provider so that flags
//! such as `--log-level` override the file and environment layers.

use crate::core::{Message, Priority};
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send a notification to one or all configured backends.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the configuration file).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Send only to this provider instead of broadcasting.
    #[arg(short, long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Message title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// Message priority: high, normal or low.
    #[arg(long)]
    pub priority: Option<String>,

    /// Channel or chat override.
    #[arg(long)]
    pub channel: Option<String>,

    /// Stream per-provider results as they complete.
    #[arg(long = "async")]
    pub stream: bool,

    /// Print the registered providers and exit.
    #[arg(long)]
    pub list: bool,

    /// The message text.
    #[arg(required_unless_present = "list")]
    pub message: Option<String>,
}

impl Cli {
    /// Returns `true` if any flag asks for the structured send path.
    pub fn wants_options(&self) -> bool {
        self.title.is_some() || self.priority.is_some() || self.channel.is_some()
    }

    /// Builds the structured message described by the flags.
    pub fn to_message(&self) -> Message {
        Message {
            text: self.message.clone().unwrap_or_default(),
            title: self.title.clone(),
            priority: self.priority.as_deref().map(Priority::from),
            channel: self.channel.clone(),
            ..Default::default()
        }
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

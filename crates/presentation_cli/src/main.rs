//! chaosctl
//!
//! Command-line client for a running chaos controller: add, inspect,
//! and delete route chaos specs.

#![allow(clippy::print_stdout)]

mod client;

use clap::{Parser, Subcommand};
use presentation_http::DEFAULT_BIND_ADDR;

use crate::client::{Client, SpecBuilder};

/// Chaos controller CLI
#[derive(Parser)]
#[command(name = "chaosctl")]
#[command(author, version, about = "Manage route chaos specs on a running controller", long_about = None)]
struct Cli {
    /// Chaos controller address
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    controller_addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add (or replace) route chaos
    Add {
        /// HTTP route method (e.g. "POST")
        method: String,

        /// HTTP route URL path (e.g. "/api/a")
        path: String,

        /// Delay injection duration in milliseconds
        #[arg(long)]
        delay_duration: Option<i64>,

        /// Delay injection probability (0 <= p <= 1)
        #[arg(long, default_value_t = 1.0)]
        delay_probability: f64,

        /// Error injection status code
        #[arg(long)]
        error_status_code: Option<u16>,

        /// Error injection message
        #[arg(long, default_value = "")]
        error_message: String,

        /// Error injection probability (0 <= p <= 1)
        #[arg(long, default_value_t = 1.0)]
        error_probability: f64,

        /// Limit the chaos spec to a relative duration (e.g. "3s")
        #[arg(long)]
        duration: Option<String>,
    },

    /// Show the route chaos currently set
    Get {
        /// HTTP route method
        method: String,

        /// HTTP route URL path
        path: String,
    },

    /// Delete route chaos
    #[command(alias = "del")]
    Delete {
        /// HTTP route method
        method: String,

        /// HTTP route URL path
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new(&cli.controller_addr);

    match cli.command {
        Commands::Add {
            method,
            path,
            delay_duration,
            delay_probability,
            error_status_code,
            error_message,
            error_probability,
            duration,
        } => {
            let mut spec = SpecBuilder::new();
            if let Some(millis) = delay_duration {
                spec = spec.delay(millis, delay_probability);
            }
            if let Some(status_code) = error_status_code {
                spec = spec.error(status_code, error_message, error_probability);
            }
            if let Some(duration) = duration {
                spec = spec.during(duration);
            }
            client.add_route_chaos(&method, &path, &spec).await?;
            println!("OK");
        },
        Commands::Get { method, path } => {
            print!("{}", client.get_route_chaos(&method, &path).await?);
        },
        Commands::Delete { method, path } => {
            client.delete_route_chaos(&method, &path).await?;
            println!("OK");
        },
    }

    Ok(())
}

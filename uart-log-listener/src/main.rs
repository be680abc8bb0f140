//! `uart-log-listener` reads the frames a `uart-log` target sends over a serial port and reports them through
//! `tracing`, until the target shuts down or stops sending heartbeats.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use uart_log_std::config::ListenerConfig;
use uart_log_std::listener::Listener;
use uart_log_std::{open_port, open_with_retries};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// Serial device the target is connected to.
    #[arg(short, long, env = "UART_LOG_PORT")]
    port: Option<String>,

    /// Baud rate of the serial link.
    #[arg(short, long)]
    baud: Option<u32>,

    /// TOML file with listener settings, overridden by the other arguments.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds to wait for a byte before counting a missed heartbeat.
    #[arg(long)]
    read_timeout_secs: Option<u64>,

    /// Consecutive missed heartbeats before giving up on the target.
    #[arg(long)]
    no_ping_tries: Option<u32>,

    /// Longest frame accepted, in bytes.
    #[arg(long)]
    max_frame_len: Option<usize>,

    /// Additional attempts at opening the port after the first one fails.
    #[arg(long)]
    reconnect_tries: Option<u32>,

    /// Seconds to wait between attempts at opening the port.
    #[arg(long)]
    reconnect_delay_secs: Option<u64>,
}

impl Arguments {
    /// Loads the configuration file, if any, and applies the command line overrides on top.
    fn config(&self) -> anyhow::Result<ListenerConfig> {
        let mut config = match &self.config {
            Some(path) => ListenerConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ListenerConfig::default(),
        };

        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(secs) = self.read_timeout_secs {
            config.read_timeout_secs = secs;
        }
        if let Some(tries) = self.no_ping_tries {
            config.no_ping_tries = tries;
        }
        if let Some(len) = self.max_frame_len {
            config.max_frame_len = len;
        }
        if let Some(tries) = self.reconnect_tries {
            config.reconnect_tries = tries;
        }
        if let Some(secs) = self.reconnect_delay_secs {
            config.reconnect_delay_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .with_env_var("UART_LOG_LISTENER_LOG")
                    .from_env()?,
            )
            .with_writer(std::io::stderr)
            .compact()
            .finish(),
    )?;

    let config = args.config()?;
    let path = config
        .port
        .clone()
        .context("no serial port given, pass --port or set `port` in the configuration file")?;

    let port = open_with_retries(config.reconnect_tries, config.reconnect_delay(), || {
        open_port(&path, config.baud_rate, config.read_timeout())
    })
    .with_context(|| format!("opening {path}"))?;
    tracing::info!(%path, baud_rate = config.baud_rate, "listening");

    let summary = Listener::new(config)
        .run(port)
        .with_context(|| format!("listening on {path}"))?;
    tracing::info!(
        messages = summary.messages,
        presences = summary.presences,
        rejected = summary.rejected,
        interrupted = summary.interrupted,
        ended_by = ?summary.ended_by,
        "done"
    );

    Ok(())
}

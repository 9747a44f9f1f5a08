//! CLI for the PIC image cache console.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use pic_core::config;
use pic_core::service::PicService;

use commands::{
    run_clear, run_completions, run_fetch, run_prefetch, run_resolve, run_status, run_urls,
};

/// Top-level CLI for the PIC image cache.
#[derive(Debug, Parser)]
#[command(name = "pic")]
#[command(about = "PIC: product image resolver and disk cache for pickup points", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Arguments shared by the single-image commands.
#[derive(Debug, clap::Args)]
pub struct ImageArgs {
    /// Image number within the product gallery (1-10).
    #[arg(long, default_value = "1")]
    pub num: u32,

    /// Image size: thumb, small or big.
    #[arg(long, default_value = "small")]
    pub size: String,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the predicted URL and the full fallback sweep for a product.
    Urls {
        /// Numeric vendor code of the product.
        code: String,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Probe the basket hosts and print the first one serving the image.
    Resolve {
        /// Numeric vendor code of the product.
        code: String,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Download one image into the cache and print its path.
    Fetch {
        /// Numeric vendor code of the product.
        code: String,

        #[command(flatten)]
        image: ImageArgs,

        /// Re-download even when the image is already cached.
        #[arg(long)]
        force: bool,
    },

    /// Warm the cache for a list of vendor codes (image #1 each).
    Prefetch {
        /// Vendor codes to fetch.
        #[arg(required = true)]
        codes: Vec<String>,

        /// Image size: thumb, small or big.
        #[arg(long, default_value = "small")]
        size: String,
    },

    /// Show cache statistics.
    Status {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove every cached image.
    Clear,

    /// Generate a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Completions never need config or network wiring.
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {cfg:?}");
        let service = PicService::with_default_transport(&cfg)?;

        match cli.command {
            CliCommand::Urls { code, image } => run_urls(&service, &code, &image)?,
            CliCommand::Resolve { code, image } => run_resolve(&service, &code, &image)?,
            CliCommand::Fetch { code, image, force } => run_fetch(&service, &code, &image, force)?,
            CliCommand::Prefetch { codes, size } => run_prefetch(&service, &codes, &size)?,
            CliCommand::Status { json } => run_status(&service, json)?,
            CliCommand::Clear => run_clear(&service)?,
            CliCommand::Completions { .. } => unreachable!("handled above"),
        }

        Ok(())
    }
}

// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "ar-backdrop")]
#[command(about = "Background camera-feed and occlusion renderer demo")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render synthetic frames offscreen and write the composite to a PNG
    Render {
        /// Render target width in pixels
        #[arg(long, default_value = "960")]
        width: u32,

        /// Render target height in pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Number of frames to drive through the per-frame contract
        #[arg(long, default_value = "8")]
        frames: u32,

        /// Enable depth-based occlusion of the virtual scene
        #[arg(long)]
        occlusion: bool,

        /// Render the depth image instead of the camera feed
        #[arg(long)]
        depth_visualization: bool,

        /// Renderer options file (JSON); command-line flags enable modes on
        /// top of it
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "backdrop.png")]
        output: PathBuf,
    },

    /// Write a palette lookup strip to a PNG
    Palette {
        /// Palette style (turbo or grayscale)
        #[arg(long, default_value = "turbo")]
        style: String,

        /// Output file path
        #[arg(short, long, default_value = "palette.png")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=ar_backdrop=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            width,
            height,
            frames,
            occlusion,
            depth_visualization,
            options,
            output,
        }) => cli::run_render(
            width,
            height,
            frames,
            occlusion,
            depth_visualization,
            options.as_deref(),
            &output,
        ),
        Some(Commands::Palette { style, output }) => cli::run_palette(&style, &output),
        None => cli::run_render(960, 720, 8, false, false, None, std::path::Path::new("backdrop.png")),
    }
}

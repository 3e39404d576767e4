//! Vaultport CLI

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vaultport_core::{CopyFrontmatter, ExportConfig, MathOptions};

/// Export an Obsidian vault as pages and assets for a documentation site
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the Obsidian vault directory
    #[arg(short, long, env = "VAULTPORT_VAULT")]
    vault: PathBuf,

    /// Root of the documentation site to write into
    #[arg(short, long, default_value = ".")]
    site_dir: PathBuf,

    /// Name of the output directory inside each output tree
    #[arg(short, long, default_value = "notes")]
    output: String,

    /// Glob pattern excluding vault files from the export (repeatable)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Which source frontmatter keys to copy into pages (none, known, all)
    #[arg(long, default_value = "none")]
    copy_frontmatter: CopyFrontmatter,

    /// Name of the vault settings folder
    #[arg(long, default_value = ".obsidian")]
    config_folder: String,

    /// Treat a single pair of dollar signs as inline math
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    single_dollar_math: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    log::info!("vaultport v{}", env!("CARGO_PKG_VERSION"));

    let config = ExportConfig {
        vault_dir: args.vault,
        site_dir: args.site_dir,
        output: args.output,
        ignore: args.ignore,
        config_folder: args.config_folder,
        copy_frontmatter: args.copy_frontmatter,
        math: MathOptions {
            single_dollar: args.single_dollar_math,
        },
    };

    match vaultport::run_export(&config).await {
        Ok(report) => {
            log::info!(
                "export complete: {} pages, {} assets, {} files, {} aliases ({} notes skipped)",
                report.pages,
                report.assets,
                report.files,
                report.aliases,
                report.skipped
            );
        }
        Err(error) => {
            log::error!("{error}");
            std::process::exit(1);
        }
    }
}

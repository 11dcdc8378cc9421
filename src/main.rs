//! CLI entry point for tesa-blog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tesa-blog")]
#[command(version)]
#[command(about = "Blog content pipeline and sitemap feed for the TESA website", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List blog content
    List {
        /// Type of content to list (post, slug, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Only list posts with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render a single post
    Show {
        /// Slug of the post (its file name without extension)
        slug: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate sitemap.xml
    Sitemap {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the read-only content API
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "tesa_blog=debug,info"
    } else {
        "tesa_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    match cli.command {
        Commands::List { r#type, tag, json } => {
            let site = tesa_blog::Site::new(&base_dir)?;
            tesa_blog::commands::list::run(&site, &r#type, tag.as_deref(), json)?;
        }

        Commands::Show { slug, json } => {
            let site = tesa_blog::Site::new(&base_dir)?;
            tesa_blog::commands::show::run(&site, &slug, json)?;
        }

        Commands::Sitemap { output } => {
            let site = tesa_blog::Site::new(&base_dir)?;
            tracing::info!("Generating sitemap...");
            tesa_blog::commands::sitemap::run(&site, output.as_deref())?;
        }

        Commands::Server { port, ip } => {
            let site = tesa_blog::Site::new(&base_dir)?;
            tracing::info!("Serving {:?} at http://{}:{}", site.content_dir, ip, port);
            tesa_blog::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("tesa-blog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

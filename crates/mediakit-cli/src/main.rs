//! mediakit CLI: run the attachment pipeline on local files.
//!
//! Configuration comes from the environment (see `ProcessingConfig::from_env`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediakit_cli::{declared_content_type, init_tracing, wants_json_logs};
use mediakit_core::ProcessingConfig;
use mediakit_processing::{
    classify, sniff_mime, AttachmentService, Container, MimeTable, NewAttachment, RawInput,
    SystemCodec,
};
use mediakit_storage::create_storage;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mediakit", about = "Media attachment processing pipeline")]
struct Cli {
    /// Emit logs as JSON (also enabled by LOG_FORMAT=json)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a file into stored styles and print the attachment record
    Process {
        /// Path to the media file
        file: PathBuf,
        /// Public shortcode for the attachment
        #[arg(long)]
        shortcode: Option<String>,
        /// Alt text
        #[arg(long)]
        description: Option<String>,
        /// Focal point as "x,y", both in [-1.0, 1.0]
        #[arg(long, allow_hyphen_values = true)]
        focus: Option<String>,
    },
    /// Print the media kind a file is classified as
    Classify {
        /// Path to the media file
        file: PathBuf,
    },
    /// Verify the serving MIME table covers every emitted extension
    CheckMime,
}

#[derive(Serialize)]
struct Classification {
    kind: String,
    sniffed_content_type: Option<String>,
    declared_content_type: Option<String>,
    size_bytes: usize,
}

#[derive(Serialize)]
struct MimeEntry {
    extension: &'static str,
    content_type: Option<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(wants_json_logs(
        cli.json_logs,
        std::env::var("LOG_FORMAT").ok().as_deref(),
    ));

    match cli.command {
        Commands::Process {
            file,
            shortcode,
            description,
            focus,
        } => {
            let config = ProcessingConfig::from_env().context("Invalid configuration")?;
            let storage = create_storage(&config)
                .await
                .context("Failed to initialize storage")?;
            let codec = Arc::new(SystemCodec::new(&config));
            let service = AttachmentService::new(&config, codec, storage)?;

            let data = read_file(&file).await?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            let input = RawInput::upload(data, declared_content_type(&file), file_name);

            let attachment = service
                .create(NewAttachment {
                    input: Some(input),
                    remote_url: None,
                    shortcode,
                    description,
                    focus,
                })
                .await?;
            print_json(&attachment)?;
        }
        Commands::Classify { file } => {
            let data = read_file(&file).await?;
            let declared = declared_content_type(&file);
            let kind = classify(&data, declared.as_deref());
            print_json(&Classification {
                kind: kind.to_string(),
                sniffed_content_type: sniff_mime(&data).map(str::to_string),
                declared_content_type: declared,
                size_bytes: data.len(),
            })?;
        }
        Commands::CheckMime => {
            let table = MimeTable::new();
            let entries: Vec<MimeEntry> = Container::ALL
                .into_iter()
                .map(|container| MimeEntry {
                    extension: container.extension(),
                    content_type: table.lookup(container.extension()),
                })
                .collect();
            print_json(&entries)?;
            table.verify()?;
        }
    }

    Ok(())
}

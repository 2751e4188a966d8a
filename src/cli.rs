//! Command-line front end over the storage client.
use crate::error::Result;
use crate::storage::StorageClient;
use crate::storage::allocator::Allocation;
use crate::storage::constants::CAT_CONFIRM_SIZE_MB;
use crate::storage::utils::OutputFormat;
use crate::storage::utils::size::format_size;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docstore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Resolve, allocate and serve stored document files")]
pub struct Args {
    /// Storage root directory (overrides STORAGE_ROOT)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Public media URL prefix (overrides MEDIA_URL_PREFIX)
    #[arg(long, global = true)]
    pub media_prefix: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the absolute storage path of a stored reference
    Resolve {
        path: String,
        /// Fail unless the path stays under the storage root and exists
        #[arg(long)]
        check: bool,
    },
    /// Print the public URL of a stored reference
    Url { path: String },
    /// Show which name an upload would receive, without writing anything
    Alloc {
        file_name: String,
        /// Logical subdirectory; hyphens in its slug become nested folders
        #[arg(long)]
        subdir: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Store a local file under a collision-free name
    Put {
        local_path: String,
        /// File name to allocate from instead of the local file name
        #[arg(long)]
        name: Option<String>,
        /// Logical subdirectory; hyphens in its slug become nested folders
        #[arg(long)]
        subdir: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Print a stored file
    Cat {
        path: String,
        /// Ask for confirmation above this size, in MB
        #[arg(long, default_value_t = CAT_CONFIRM_SIZE_MB)]
        size_limit: u64,
        /// Print regardless of size
        #[arg(short, long)]
        force: bool,
    },
    /// Show metadata of a stored file or directory
    Stat {
        path: String,
        #[arg(long, conflicts_with = "raw")]
        json: bool,
        #[arg(long)]
        raw: bool,
    },
    /// List stored files
    Ls {
        path: Option<String>,
        /// Show type, size and modification time
        #[arg(short, long)]
        long: bool,
        #[arg(short = 'R', long)]
        recursive: bool,
    },
}

pub async fn run(args: Args, client: StorageClient) -> Result<()> {
    match args.command {
        Command::Resolve { path, check } => {
            let absolute = client.resolve(&path, check)?;
            println!("{}", absolute.display());
        }
        Command::Url { path } => {
            println!("{}", client.public_url(&path));
        }
        Command::Alloc {
            file_name,
            subdir,
            json,
        } => {
            let allocation = client.allocate(&file_name, subdir.as_deref())?;
            print_allocation(&client, &allocation, json)?;
        }
        Command::Put {
            local_path,
            name,
            subdir,
            json,
        } => {
            let receipt = client
                .upload_file(&local_path, name.as_deref(), subdir.as_deref(), !json)
                .await?;
            if json {
                println!("{}", serde_json::to_string(&receipt)?);
            } else {
                println!(
                    "✅ Upload: {} → {} ({} bytes)",
                    receipt.local_path, receipt.relative_path, receipt.size
                );
                println!("   url: {}", receipt.url);
            }
        }
        Command::Cat {
            path,
            size_limit,
            force,
        } => client.cat_file(&path, size_limit, force).await?,
        Command::Stat { path, json, raw } => {
            let meta = client.stat(&path).await?;
            match OutputFormat::from_flags(json, raw) {
                OutputFormat::Json => println!("{}", serde_json::to_string(&meta)?),
                OutputFormat::Raw => {
                    println!("path={}", meta.path);
                    println!("type={}", meta.entry_type);
                    println!("size={}", meta.size);
                    if let Some(modified) = &meta.last_modified {
                        println!("last_modified={modified}");
                    }
                    println!("url={}", meta.url);
                }
                OutputFormat::Human => {
                    println!("{}", if meta.path.is_empty() { "/" } else { meta.path.as_str() });
                    println!(
                        "  type={} size={} ({})",
                        meta.entry_type,
                        meta.size,
                        format_size(meta.size)
                    );
                    println!(
                        "  modified={}",
                        meta.last_modified.as_deref().unwrap_or("unknown")
                    );
                    println!("  url={}", meta.url);
                }
            }
        }
        Command::Ls {
            path,
            long,
            recursive,
        } => {
            client
                .list_directory(path.as_deref().unwrap_or_default(), long, recursive)
                .await?
        }
    }
    Ok(())
}

fn print_allocation(client: &StorageClient, allocation: &Allocation, json: bool) -> Result<()> {
    let url = client.public_url(&allocation.relative_path);
    if json {
        let value = json!({
            "relative_path": allocation.relative_path,
            "absolute_path": allocation.absolute_path.display().to_string(),
            "url": url,
        });
        println!("{}", serde_json::to_string(&value)?);
    } else {
        println!("relative={}", allocation.relative_path);
        println!("absolute={}", allocation.absolute_path.display());
        println!("url={url}");
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "avatarctl", about = "CLI for the avatar generation server", version)]
struct Cli {
    /// Base URL of a running server
    #[arg(global = true, long, default_value = "http://127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check server health
    Health,
    /// Convert a local photo into an avatar
    Convert {
        /// Path to the photo to upload
        file: PathBuf,
        /// Download the generated avatar to this path
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Fetch a previously generated file by name
    Fetch {
        /// Filename under /outputs
        filename: String,
        /// Write the bytes to this path instead of stdout info
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

async fn fetch_output(
    client: &reqwest::Client,
    server: &str,
    filename: &str,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/outputs/{}", server.trim_end_matches('/'), filename);
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(format!("Fetch failed: {}", response.status()).into());
    }
    let bytes = response.bytes().await?;
    match out {
        Some(path) => {
            tokio::fs::write(&path, &bytes).await?;
            println!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => println!("{} ({} bytes)", filename, bytes.len()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let server = cli.server.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Health => {
            let body: Value = client
                .get(format!("{}/health", server))
                .send()
                .await?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Convert { file, out } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or("Invalid file path")?
                .to_string();
            let bytes = tokio::fs::read(&file).await?;
            let part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
            let form = reqwest::multipart::Form::new().part("image", part);

            let response = client
                .post(format!("{}/convert", server))
                .multipart(form)
                .send()
                .await?;
            let status = response.status();
            let body: Value = response.json().await?;
            if !status.is_success() {
                return Err(format!(
                    "Convert failed ({}): {}",
                    status,
                    body.get("error").and_then(|e| e.as_str()).unwrap_or("unknown error")
                )
                .into());
            }
            println!("{}", serde_json::to_string_pretty(&body)?);

            if let Some(out_path) = out {
                let generated = body
                    .pointer("/results/0/fileName")
                    .and_then(|v| v.as_str())
                    .ok_or("Response contained no fileName")?;
                fetch_output(&client, &server, generated, Some(out_path)).await?;
            }
        }
        Commands::Fetch { filename, out } => {
            fetch_output(&client, &server, &filename, out).await?;
        }
    }
    Ok(())
}

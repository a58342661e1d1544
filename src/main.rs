use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};

use imge_uploader::host::local::{default_settings_path, LocalHost};
use imge_uploader::host::Host;
use imge_uploader::uploader::ImgeClient;
use imge_uploader::{ImageRecord, ImgePlugin, CONFIG_KEY};

/// Upload images to im.ge and print a markdown link for each one
#[derive(Debug, Parser)]
#[command(name = "imge-upload", version)]
struct Cli {
    /// Settings file (defaults to <config dir>/imge-uploader/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// API key, overriding the settings file
    #[arg(long, env = "IMGE_API_KEY")]
    api_key: Option<String>,

    /// Size limit in megabytes, overriding the settings file
    #[arg(long)]
    max_size: Option<f64>,

    /// Upload endpoint, for self-hosted mirrors
    #[arg(long)]
    endpoint: Option<String>,

    /// Images to upload, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings_path = match cli.settings {
        Some(path) => path,
        None => default_settings_path()?,
    };
    let mut host = LocalHost::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    apply_overrides(&mut host, cli.api_key, cli.max_size);

    let client = match cli.endpoint {
        Some(endpoint) => ImgeClient::with_endpoint(endpoint)?,
        None => ImgeClient::new()?,
    };
    let plugin = ImgePlugin::with_client(client);
    plugin.register(&mut host);

    let mut images = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let image = ImageRecord::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        images.push(image);
    }

    let succeeded = host.run(plugin.uploader(), &mut images).await?;
    if succeeded {
        for image in &images {
            if let Some(text) = image.display_text.as_deref().or(image.img_url.as_deref()) {
                println!("{}", text);
            }
        }
    } else {
        for notification in host.notifications() {
            eprintln!("{}: {}", notification.title, notification.body);
        }
    }

    Ok(succeeded)
}

fn apply_overrides(host: &mut LocalHost, api_key: Option<String>, max_size: Option<f64>) {
    if api_key.is_none() && max_size.is_none() {
        return;
    }

    let mut settings = match host.get_config(CONFIG_KEY) {
        Some(Value::Object(settings)) => settings,
        _ => serde_json::Map::new(),
    };
    if let Some(api_key) = api_key {
        settings.insert("apiKey".to_string(), json!(api_key));
    }
    if let Some(max_size) = max_size {
        settings.insert("imageMaxSize".to_string(), json!(max_size));
    }
    host.set_config(CONFIG_KEY, Value::Object(settings));
}

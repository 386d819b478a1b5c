//! hts-client — 向 HTS 合成服务发送文本并保存返回的音频
//!
//! Usage:
//!   hts-client --language taiwanese --model M10 --data "gua2 kin1-a2-jit8" --o output.wav
//!   hts-client --language hakka_pinyin --data "客家話"      (prints the transcription)
//!   hts-client --backend http --data "gua2 kin1-a2-jit8" --o output.mp3
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hts_client::config::parse_secs;
use hts_client::{ClientConfig, HtsClient, HttpSynthesisClient, SynthesisOutput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Length-prefixed TCP channels, one port per language
    Tcp,
    /// JSON endpoint returning base64 MP3
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "hts-client", version, about = "Request speech synthesis from an HTS server")]
struct Cli {
    /// chinese, taiwanese, taiwanese_sandhi, tailuo, tailuo_sandhi or any *hakka* variant
    #[arg(long, default_value = "tailuo_sandhi")]
    language: String,

    /// HTS synthesis model name (ignored for chinese)
    #[arg(long, default_value = "M10")]
    model: String,

    /// Text to be synthesized
    #[arg(long, default_value = "gua2 kin1-a2-jit8 kho2-tshi3 te7-ji7-mia5")]
    data: String,

    /// File the audio is stored in
    #[arg(long = "o", visible_alias = "output", default_value = "output2.wav")]
    output: PathBuf,

    /// Server host (overrides HTS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// YAML endpoint table (overrides HTS_ENDPOINTS_FILE)
    #[arg(long, value_name = "FILE")]
    endpoints: Option<PathBuf>,

    /// Connect timeout in seconds, 0 disables (overrides HTS_CONNECT_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<String>,

    /// Per-receive timeout in seconds, 0 disables (overrides HTS_READ_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<String>,

    /// Which service to talk to
    #[arg(long, value_enum, default_value_t = Backend::Tcp)]
    backend: Backend,

    /// Base URL of the HTTP backend
    #[arg(long, value_name = "URL", default_value = hts_client::tts::DEFAULT_BASE_URL)]
    backend_url: String,

    /// Voice selector for the HTTP backend
    #[arg(long, default_value = hts_client::tts::DEFAULT_TTS_LANG)]
    tts_lang: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(path) = &self.endpoints {
            config.endpoints_path = Some(path.clone());
        }
        if let Some(raw) = &self.connect_timeout {
            config.connect_timeout = parse_secs("--connect-timeout", raw)?;
        }
        if let Some(raw) = &self.read_timeout {
            config.read_timeout = parse_secs("--read-timeout", raw)?;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let output = match cli.backend {
        Backend::Tcp => synthesize_tcp(&cli).await?,
        Backend::Http => synthesize_http(&cli).await?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    match output {
        SynthesisOutput::Transcription { text } => println!("{text}"),
        SynthesisOutput::Audio {
            path,
            bytes_written,
        } => println!("File received complete: {} ({} bytes)", path.display(), bytes_written),
    }
    Ok(())
}

async fn synthesize_tcp(cli: &Cli) -> Result<SynthesisOutput> {
    let config = cli.client_config()?;

    let client = HtsClient::builder()
        .config(config)
        .build()
        .context("Failed to set up client")?;
    let endpoint = client.configure(&cli.language, &cli.model)?;
    tracing::info!(language = %cli.language, model = endpoint.model(), "requesting synthesis");

    client
        .ask_for_service(&endpoint, &cli.data, &cli.output)
        .await
        .with_context(|| format!("Synthesis request to {} failed", client.host()))
}

async fn synthesize_http(cli: &Cli) -> Result<SynthesisOutput> {
    let client = HttpSynthesisClient::builder()
        .base_url(&cli.backend_url)
        .tts_lang(&cli.tts_lang)
        .build()
        .context("Failed to set up HTTP client")?;
    tracing::info!(tts_lang = client.tts_lang(), "requesting synthesis over HTTP");

    client
        .synthesize_to_file(&cli.data, &cli.output)
        .await
        .with_context(|| format!("Synthesis request to {} failed", client.endpoint()))
}

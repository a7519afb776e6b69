//! The voice conversation.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;
use skytalk_audio::{portaudio, Format, FRAME_SAMPLES};
use skytalk_realtime::{Client, ConnectConfig};
use skytalk_voice::{Devices, FunctionBridge, SessionController, SessionHandle};
use tracing::{info, warn};

use super::{get_config, open_timeline};
use crate::config::mask_api_key;
use crate::Cli;

#[derive(Args, Default)]
pub struct ChatCommand {
    /// Model to use (overrides config file)
    #[arg(long)]
    model: Option<String>,

    /// Voice for audio output (overrides config file)
    #[arg(long)]
    voice: Option<String>,
}

impl ChatCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = get_config(cli)?;
        cfg.require_openai()?;
        cfg.require_bluesky()?;
        if let Some(model) = &self.model {
            cfg.openai.model = model.clone();
        }
        if let Some(voice) = &self.voice {
            cfg.voice.voice = voice.clone();
        }

        info!(
            api_key = %mask_api_key(&cfg.openai.api_key),
            model = %cfg.openai.model,
            handle = %cfg.bluesky.handle,
            "starting"
        );

        let timeline = open_timeline(&cfg).await?;

        let mut builder = Client::builder(cfg.openai.api_key.clone());
        if let Some(url) = &cfg.openai.ws_url {
            builder = builder.websocket_url(url.clone());
        }
        if let Some(org) = &cfg.openai.organization {
            builder = builder.organization(org.clone());
        }
        let client = builder.build()?;

        let devices = tokio::task::spawn_blocking(open_devices).await??;

        let bridge = FunctionBridge::new(Arc::new(timeline));
        let (controller, handle) = SessionController::new(cfg.voice.clone(), bridge);
        spawn_ctrl_c(handle.clone());
        spawn_stdin(handle.clone());

        println!("Listening. Speak, or type a message and press Enter. Ctrl-C to quit.");

        let connect = ConnectConfig {
            model: cfg.openai.model.clone(),
        };
        controller
            .run(client.connect_websocket(Some(&connect)), devices)
            .await
            .context("voice session ended")?;
        Ok(())
    }
}

fn open_devices() -> anyhow::Result<Devices> {
    let format = Format::MONO_24K;
    let input = portaudio::open_input(format, FRAME_SAMPLES).context("failed to open microphone")?;
    let output = portaudio::open_output(format, FRAME_SAMPLES).context("failed to open speaker")?;
    Ok(Devices {
        input: Box::new(input),
        output: Box::new(output),
    })
}

fn spawn_ctrl_c(handle: SessionHandle) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("interrupted; closing session");
        handle.stop();
    });
}

/// Forwards typed lines as user messages. Runs on a plain thread since
/// stdin reads cannot be cancelled.
fn spawn_stdin(handle: SessionHandle) {
    let spawned = std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                if !handle.send_text(text) {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "typed input unavailable");
    }
}

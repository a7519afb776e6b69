//! Lists the audio devices PortAudio can see.

use clap::Args;
use skytalk_audio::portaudio;

use crate::Cli;

#[derive(Args)]
pub struct DevicesCommand {}

impl DevicesCommand {
    pub async fn run(&self, _cli: &Cli) -> anyhow::Result<()> {
        let devices = tokio::task::spawn_blocking(portaudio::list_devices).await??;
        if devices.is_empty() {
            println!("No audio devices found.");
            return Ok(());
        }
        for d in devices {
            let mut marks = Vec::new();
            if d.is_default_input {
                marks.push("default input");
            }
            if d.is_default_output {
                marks.push("default output");
            }
            let marks = if marks.is_empty() {
                String::new()
            } else {
                format!(" [{}]", marks.join(", "))
            };
            println!(
                "{:>3}  {}  (in: {}, out: {}, {} Hz){}",
                d.index,
                d.name,
                d.max_input_channels,
                d.max_output_channels,
                d.default_sample_rate,
                marks
            );
        }
        Ok(())
    }
}

//! 扫描命令
//!
//! 只找到一个 Hub 时自动保存为默认；找到多个时交互式选择。

use anyhow::{Result, bail};
use clap::Args;
use inquire::Select;
use movehub_transport::{Discovery, HubAdvertisement};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct ScanCommand {
    /// 扫描时长（秒）
    #[arg(short, long, default_value_t = 5.0)]
    pub timeout: f64,

    /// 不保存默认 Hub
    #[arg(long)]
    pub no_save: bool,
}

/// 交互选择项
enum Choice<'a> {
    Hub(&'a HubAdvertisement),
    Skip,
}

impl fmt::Display for Choice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Hub(hub) => write!(f, "{} ({})", hub.display_name(), hub.address),
            Choice::Skip => write!(f, "Skip"),
        }
    }
}

impl ScanCommand {
    pub async fn execute<D: Discovery>(&self, discovery: &D, config_path: &Path) -> Result<()> {
        let timeout = super::seconds(self.timeout, "--timeout")?;
        println!("Scanning for LEGO hubs ({:?})...", timeout);
        let hubs = discovery.scan(timeout).await?;

        if hubs.is_empty() {
            bail!("No LEGO hubs found.");
        }

        println!("\nFound {} hub(s):\n", hubs.len());
        for (i, hub) in hubs.iter().enumerate() {
            print!("  {}. {} ({})", i + 1, hub.display_name(), hub.address);
            if let Some(rssi) = hub.rssi {
                print!("  {} dBm", rssi);
            }
            println!();
            if let Some(data) = &hub.manufacturer {
                debug!(
                    "{}: system type 0x{:02x}, button {}",
                    hub.address,
                    data.system_type_id(),
                    data.button_pressed
                );
            }
        }

        if self.no_save {
            return Ok(());
        }

        let selected = if let [only] = hubs.as_slice() {
            Some(only)
        } else {
            select(&hubs)
        };

        if let Some(hub) = selected {
            let mut config = CliConfig::load_from(config_path)?;
            config.remember_hub(&hub.address, hub.name.as_deref());
            config.save_to(config_path)?;
            println!("\n✅ Saved '{}' as default hub.", hub.display_name());
        }
        Ok(())
    }
}

fn select(hubs: &[HubAdvertisement]) -> Option<&HubAdvertisement> {
    let mut options: Vec<Choice<'_>> = hubs.iter().map(Choice::Hub).collect();
    options.push(Choice::Skip);

    match Select::new("Select hub to save as default:", options).prompt() {
        Ok(Choice::Hub(hub)) => Some(hub),
        Ok(Choice::Skip) => None,
        Err(e) => {
            debug!("Hub selection skipped: {}", e);
            None
        },
    }
}

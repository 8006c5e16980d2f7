//! 配置管理命令

use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use crate::config::CliConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置默认 Hub
    Set {
        /// Hub 地址
        #[arg(long)]
        address: Option<String>,

        /// Hub 名称
        #[arg(long)]
        name: Option<String>,
    },

    /// 读取配置项（address / name / all）
    Get {
        #[arg(default_value = "all")]
        key: String,
    },

    /// 显示配置文件路径与内容
    Check,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Set { address, name } => set_(path, address, name),
            ConfigCommand::Get { key } => get_(path, &key),
            ConfigCommand::Check => check_(path),
        }
    }
}

fn set_(path: &Path, address: Option<String>, name: Option<String>) -> Result<()> {
    let mut config = CliConfig::load_from(path)?;

    if address.is_none() && name.is_none() {
        println!("Nothing to set. Use --address and/or --name.");
        return Ok(());
    }
    if let Some(address) = address {
        println!("✅ Default hub address: {}", address);
        config.hub.address = Some(address);
    }
    if let Some(name) = name {
        println!("✅ Default hub name: {}", name);
        config.hub.name = Some(name);
    }

    config.save_to(path)
}

fn get_(path: &Path, key: &str) -> Result<()> {
    let config = CliConfig::load_from(path)?;
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".into());

    match key {
        "address" => println!("{}", show(&config.hub.address)),
        "name" => println!("{}", show(&config.hub.name)),
        _ => {
            println!("address: {}", show(&config.hub.address));
            println!("name:    {}", show(&config.hub.name));
        },
    }
    Ok(())
}

fn check_(path: &Path) -> Result<()> {
    println!("Config file: {}", path.display());
    if !path.exists() {
        println!("  (not created yet)");
        return Ok(());
    }
    let config = CliConfig::load_from(path)?;
    println!("  address: {:?}", config.hub.address);
    println!("  name:    {:?}", config.hub.name);
    Ok(())
}

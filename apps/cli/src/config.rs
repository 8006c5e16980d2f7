//! CLI 持久化配置
//!
//! 默认位置 `<config_dir>/movehub/config.toml`，可通过环境变量
//! `MOVEHUB_CONFIG` 指定其它路径：
//!
//! ```toml
//! [hub]
//! address = "AA:BB:CC:DD:EE:FF"
//! name = "Technic Move"
//! ```

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 覆盖配置文件路径的环境变量
pub const CONFIG_ENV: &str = "MOVEHUB_CONFIG";

/// 找不到 Hub 地址时的提示
pub const NO_ADDRESS_MESSAGE: &str = "No hub address. Run 'scan' first or use --address.";

/// 配置文件路径
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let mut path = dirs::config_dir().ok_or_else(|| anyhow!("无法确定配置目录"))?;
    path.push("movehub");
    path.push("config.toml");
    Ok(path)
}

/// 默认 Hub
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub hub: HubSection,
}

impl CliConfig {
    /// 读取配置；文件不存在时返回默认值
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 写入配置，自动创建父目录
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).with_context(|| format!("写入配置文件失败: {}", path.display()))
    }

    /// 记录默认 Hub
    pub fn remember_hub(&mut self, address: &str, name: Option<&str>) {
        self.hub.address = Some(address.to_string());
        self.hub.name = name.map(str::to_string);
    }
}

/// 确定目标地址：命令行参数优先，其次是已保存的默认 Hub
pub fn resolve_address(cli_address: Option<&str>, config: &CliConfig) -> Result<String> {
    match cli_address.or(config.hub.address.as_deref()) {
        Some(address) if !address.trim().is_empty() => Ok(address.trim().to_string()),
        _ => bail!(NO_ADDRESS_MESSAGE),
    }
}

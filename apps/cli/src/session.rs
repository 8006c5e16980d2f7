//! 连接管理
//!
//! 每个命令独立执行：连接 → 执行 → 断开。蓝牙后端由 `ble` feature 提供。

use anyhow::Result;
use std::path::Path;

use crate::commands::{HubCommand, ScanCommand};

#[cfg(not(feature = "ble"))]
const NO_BACKEND: &str =
    "movehub-cli was built without Bluetooth support; rebuild with `--features ble`";

/// 连接 Hub 执行一个命令；无论成败都会断开
#[cfg(feature = "ble")]
pub async fn run_hub_command(address: &str, command: HubCommand) -> Result<()> {
    use anyhow::Context;
    use movehub_driver::Hub;
    use movehub_transport::ble::BleConnector;

    let connector = BleConnector::new().await.context("Bluetooth adapter unavailable")?;

    println!("Connecting to {}...", address);
    let calibrate = command.calibrate_on_connect();
    if calibrate {
        println!("Calibrating steering...");
    }
    let mut hub = Hub::connect(&connector, address, calibrate)
        .await
        .with_context(|| format!("Failed to connect to {}", address))?;

    let result = command.execute(&mut hub).await;
    let closed = hub.disconnect().await;
    result?;
    closed?;
    Ok(())
}

#[cfg(not(feature = "ble"))]
pub async fn run_hub_command(_address: &str, _command: HubCommand) -> Result<()> {
    anyhow::bail!(NO_BACKEND)
}

/// 扫描附近的 Hub
#[cfg(feature = "ble")]
pub async fn scan(command: &ScanCommand, config_path: &Path) -> Result<()> {
    use anyhow::Context;
    use movehub_transport::ble::BleDiscovery;

    let discovery = BleDiscovery::new().await.context("Bluetooth adapter unavailable")?;
    command.execute(&discovery, config_path).await
}

#[cfg(not(feature = "ble"))]
pub async fn scan(_command: &ScanCommand, _config_path: &Path) -> Result<()> {
    anyhow::bail!(NO_BACKEND)
}

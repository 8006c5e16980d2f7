//! 单次动作命令：行驶、转向、灯光
//!
//! 这些命令都在已连接的 [`Hub`] 上执行，连接与断开由调用方负责。

use anyhow::{Result, bail};
use movehub_driver::Hub;
use movehub_transport::Transport;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 动作保持时间（转向、灯光命令结束前的等待）
pub const HOLD: Duration = Duration::from_secs(2);

/// 等待中断期间的检查周期
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 行驶
///
/// 给定 `duration` 时行驶指定时长后滑行停车；否则一直行驶到 `interrupt`
/// 完成（Ctrl+C）再停车。等待期间连接丢失时返回错误。
pub async fn drive<T, F>(
    hub: &mut Hub<T>,
    speed: i32,
    duration: Option<Duration>,
    interrupt: F,
) -> Result<()>
where
    T: Transport,
    F: Future<Output = ()>,
{
    println!("Driving at speed {}...", speed);
    hub.drive(speed).await?;

    match duration {
        Some(duration) => hub.settle(duration).await,
        None => {
            println!("Press Ctrl+C to stop.");
            if !hold_until(hub, interrupt).await {
                bail!("Connection to {} lost", hub.address());
            }
        },
    }

    hub.stop().await?;
    println!("Stopped.");
    Ok(())
}

/// 转向并保持
pub async fn steer<T: Transport>(hub: &mut Hub<T>, angle: i32) -> Result<()> {
    println!("Steering to angle {}...", angle);
    hub.steer(angle).await?;
    hub.settle(HOLD).await;
    Ok(())
}

/// 设置灯光并保持
pub async fn lights<T: Transport>(hub: &mut Hub<T>, brightness: i32) -> Result<()> {
    println!("Setting lights to {}%...", brightness);
    hub.set_lights(brightness).await?;
    hub.settle(HOLD).await;
    Ok(())
}

/// 分派通知直到 `interrupt` 完成（返回 true）或连接丢失（返回 false）
async fn hold_until<T, F>(hub: &mut Hub<T>, interrupt: F) -> bool
where
    T: Transport,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => return true,
            _ = hub.settle(POLL_INTERVAL) => {},
        }
        if !hub.is_connected().await {
            warn!("Connection to {} lost", hub.address());
            return false;
        }
    }
}

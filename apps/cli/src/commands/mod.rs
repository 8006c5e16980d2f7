//! 命令定义和实现

pub mod config;
pub mod motion;
pub mod run;
pub mod scan;
pub mod status;

pub use config::ConfigCommand;
pub use scan::ScanCommand;

use anyhow::{Context, Result};
use clap::Subcommand;
use movehub_driver::Hub;
use movehub_transport::Transport;
use std::time::Duration;

/// 需要连接 Hub 的命令
#[derive(Subcommand, Debug)]
pub enum HubCommand {
    /// 显示 Hub 信息（名称、电量、固件、外设）
    Status {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 前进 / 后退（-100 ~ 100）
    Drive {
        #[arg(allow_negative_numbers = true)]
        speed: i32,

        /// 行驶时长（秒）；省略时一直行驶到 Ctrl+C
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// 转向（-100 左 ~ 100 右，自动校准）
    Steer {
        #[arg(allow_negative_numbers = true)]
        angle: i32,
    },

    /// 滑行停车
    Stop,

    /// 刹车
    Brake,

    /// 松开刹车
    ReleaseBrake,

    /// 车灯亮度（0 ~ 100）
    Lights { brightness: i32 },

    /// 校准转向（寻找两端极限后回中）
    Calibrate,

    /// 键盘交互驾驶
    Run,

    /// 关闭 Hub 电源
    Shutdown,
}

impl HubCommand {
    /// 连接时是否先校准转向
    ///
    /// 组合端口的驱动帧只有在校准完成后才会生效。
    pub fn calibrate_on_connect(&self) -> bool {
        matches!(
            self,
            HubCommand::Drive { .. } | HubCommand::Steer { .. } | HubCommand::Stop | HubCommand::Run
        )
    }

    pub async fn execute<T: Transport>(self, hub: &mut Hub<T>) -> Result<()> {
        match self {
            HubCommand::Status { json } => status::execute(hub, json).await,
            HubCommand::Drive { speed, duration } => {
                let duration = duration.map(|s| seconds(s, "--duration")).transpose()?;
                let interrupt = async {
                    let _ = tokio::signal::ctrl_c().await;
                };
                motion::drive(hub, speed, duration, interrupt).await
            },
            HubCommand::Steer { angle } => motion::steer(hub, angle).await,
            HubCommand::Stop => {
                hub.stop().await?;
                println!("Stopped.");
                Ok(())
            },
            HubCommand::Brake => {
                hub.brake().await?;
                println!("Braking.");
                Ok(())
            },
            HubCommand::ReleaseBrake => {
                hub.release_brake().await?;
                println!("Brake released.");
                Ok(())
            },
            HubCommand::Lights { brightness } => motion::lights(hub, brightness).await,
            HubCommand::Calibrate => {
                println!("Calibrating steering (finding end stops)...");
                hub.calibrate().await?;
                println!("Calibration complete. Steering centered.");
                Ok(())
            },
            HubCommand::Run => run::execute(hub).await,
            HubCommand::Shutdown => {
                hub.shutdown().await?;
                println!("Hub switched off.");
                Ok(())
            },
        }
    }
}

/// 秒数 → `Duration`；负数、NaN 与溢出都报错
pub fn seconds(secs: f64, name: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid {} value: {}", name, secs))
}

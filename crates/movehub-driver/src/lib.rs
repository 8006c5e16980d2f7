//! # MoveHub Driver
//!
//! 驱动层：在传输层之上维护一个 Hub 会话，包括：
//! - 有状态的命令编码（速度 / 转向 / 灯光合并 + 限幅）
//! - 转向校准状态机
//! - 入站通知分派（属性、外设挂载、编码器读数、错误）
//! - 钩子系统：入站消息 / 出站帧回调
//!
//! # 示例
//!
//! ```no_run
//! # async fn run() -> Result<(), movehub_driver::DriverError> {
//! use movehub_driver::Hub;
//! use movehub_transport::MockConnector;
//!
//! let connector = MockConnector::default();
//! let mut hub = Hub::connect(&connector, "AA:BB:CC:DD:EE:FF", true).await?;
//! hub.drive(50).await?;
//! hub.settle(std::time::Duration::from_secs(1)).await;
//! hub.stop().await?;
//! hub.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod calibration;
pub mod command;
mod config;
mod error;
pub mod hooks;
mod hub;
pub mod state;

pub use calibration::{Calibration, CalibrationState, CalibrationStep};
pub use command::{CommandBatch, CommandEncoder, MotorState};
pub use config::*;
pub use error::DriverError;
pub use hooks::{HookManager, MessageCallback};
pub use hub::{Hub, SessionPhase};
pub use state::{AttachedDevice, Dispatched, HubState, HubStatus};

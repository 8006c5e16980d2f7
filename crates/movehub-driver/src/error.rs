//! 驱动层错误类型定义

use movehub_protocol::EncodeError;
use movehub_transport::TransportError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 未连接，或连接建立后对端报告已断开
    #[error("Not connected to hub: {0}")]
    NotConnected(String),

    /// 未校准时拒绝转向（`SteeringPolicy::Reject`）
    #[error("Steering rejected: hub is not calibrated")]
    NotCalibrated,

    /// 帧编码错误
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

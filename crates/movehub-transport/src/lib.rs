//! # MoveHub Transport Layer
//!
//! 传输层抽象：Hub 的线上帧经由一个 GATT characteristic 读写。
//! driver 层只依赖本 crate 的 trait，不关心具体后端。
//!
//! ## 后端
//!
//! - `ble`（feature `ble`）：基于 `btleplug` 的系统蓝牙栈
//! - `mock`（feature `mock`）：内存后端，可注入通知、记录写入

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

pub use movehub_protocol::{LEGO_MANUFACTURER_ID, ManufacturerData};

#[cfg(feature = "ble")]
pub mod ble;

#[cfg(feature = "ble")]
pub use ble::{BleConnector, BleDiscovery, BleTransport};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockConnector, MockDiscovery, MockHub, MockTransport};

/// Hub 的 GATT 服务 UUID
pub const HUB_SERVICE_UUID: &str = "00001623-1212-efde-1623-785feabcd123";

/// Hub 的读写 characteristic UUID（写命令 + 通知共用）
pub const HUB_CHARACTERISTIC_UUID: &str = "00001624-1212-efde-1623-785feabcd123";

/// 通知通道的默认容量
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,
    #[error("Transport closed")]
    Closed,
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
}

/// 扫描到的 Hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubAdvertisement {
    /// 平台相关的设备地址（Linux/Windows 为 MAC，macOS 为 UUID）
    pub address: String,
    /// 广播名称
    pub name: Option<String>,
    /// 信号强度
    pub rssi: Option<i16>,
    /// 厂商数据（0x0397 之后的字节）
    pub manufacturer: Option<ManufacturerData>,
}

impl HubAdvertisement {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name,
            rssi: None,
            manufacturer: None,
        }
    }

    /// 名称，缺失时为 "Unknown"
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// 已建立的 Hub 连接
///
/// 所有写操作由调用方串行化（`&mut self`）。通知通过 [`Transport::subscribe`]
/// 返回的有界通道送达，每条通知是一帧完整的线上字节。
#[async_trait]
pub trait Transport: Send {
    /// 写入一帧
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// 订阅通知
    ///
    /// 重复订阅会替换之前的通道。
    async fn subscribe(&mut self, capacity: usize) -> Result<mpsc::Receiver<Bytes>, TransportError>;

    /// 取消订阅
    async fn unsubscribe(&mut self) -> Result<(), TransportError>;

    /// 连接是否仍然有效
    async fn is_connected(&self) -> bool;

    /// 关闭连接
    async fn close(&mut self) -> Result<(), TransportError>;

    /// 对端地址
    fn address(&self) -> &str;
}

/// 建立连接的工厂
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, address: &str) -> Result<Self::Transport, TransportError>;
}

/// 设备发现
#[async_trait]
pub trait Discovery: Send + Sync {
    /// 扫描 `timeout` 时长，返回按地址去重后的 Hub 列表
    async fn scan(&self, timeout: Duration) -> Result<Vec<HubAdvertisement>, TransportError>;
}

//! 入站 payload 解析
//!
//! 包含 Hub 主动上报或应答的各类 payload 结构体：
//! - HUB_PROPERTIES (0x01) → [`HubProperty`]
//! - HUB_ATTACHED_IO (0x04) → [`AttachedIoEvent`]
//! - GENERIC_ERROR_MESSAGES (0x05) → [`GenericError`]
//! - PORT_VALUE_SINGLE (0x45) → [`PortValue`]

use crate::device::DeviceType;
use crate::ids::*;
use crate::{DecodeError, bytes_to_i32_le, bytes_to_u16_le, require_len};
use bilge::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// 版本号
// ============================================================================

/// 版本号最高字节的位域
///
/// 低 4 位为 minor，高 4 位为 major。bilge 默认 LSB first，
/// 第一个字段对应 Bit 0-3。
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct VersionMajorMinor {
    pub minor: u4, // Bit 0-3
    pub major: u4, // Bit 4-7
}

/// 版本号（固件 / 硬件 / 外设修订）
///
/// 线上 4 字节小端：
/// - Byte 0-1: build
/// - Byte 2: bugfix
/// - Byte 3: major (高 4 位) / minor (低 4 位)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionNumber {
    pub major: u8,
    pub minor: u8,
    pub bugfix: u8,
    pub build: u16,
}

impl VersionNumber {
    /// 从 4 字节解析
    pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
        let high = VersionMajorMinor::from(u8::new(bytes[3]));
        Self {
            major: high.major().value(),
            minor: high.minor().value(),
            bugfix: bytes[2],
            build: bytes_to_u16_le([bytes[0], bytes[1]]),
        }
    }

    /// 从切片解析，不足 4 字节返回 `Truncated`
    pub fn decode(value: &[u8]) -> Result<Self, DecodeError> {
        require_len(value, 4)?;
        Ok(Self::from_le_bytes([value[0], value[1], value[2], value[3]]))
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{:02}.{:04}",
            self.major, self.minor, self.bugfix, self.build
        )
    }
}

// ============================================================================
// Hub 属性
// ============================================================================

/// Hub 属性应答 (0x01)
///
/// payload: `[property_id, operation, value...]`，operation 字节不参与解析。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HubProperty {
    Name(String),
    FirmwareVersion(VersionNumber),
    HardwareVersion(VersionNumber),
    /// 电量百分比（0-100，原样保留）
    Battery(u8),
    Manufacturer(String),
    /// 未知属性，按原始 ID 保存
    Raw { id: u8, value: Vec<u8> },
}

impl HubProperty {
    /// 属性 ID
    pub fn id(&self) -> u8 {
        match self {
            HubProperty::Name(_) => PROPERTY_NAME,
            HubProperty::FirmwareVersion(_) => PROPERTY_FIRMWARE_VERSION,
            HubProperty::HardwareVersion(_) => PROPERTY_HARDWARE_VERSION,
            HubProperty::Battery(_) => PROPERTY_BATTERY,
            HubProperty::Manufacturer(_) => PROPERTY_MANUFACTURER,
            HubProperty::Raw { id, .. } => *id,
        }
    }

    /// 解析属性 payload
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        require_len(payload, 2)?;
        let id = payload[0];
        let value = &payload[2..];

        let property = match id {
            PROPERTY_NAME => HubProperty::Name(decode_string(value)),
            PROPERTY_MANUFACTURER => HubProperty::Manufacturer(decode_string(value)),
            PROPERTY_FIRMWARE_VERSION => {
                HubProperty::FirmwareVersion(VersionNumber::decode(value)?)
            },
            PROPERTY_HARDWARE_VERSION => {
                HubProperty::HardwareVersion(VersionNumber::decode(value)?)
            },
            PROPERTY_BATTERY => {
                require_len(value, 1)?;
                HubProperty::Battery(value[0])
            },
            _ => HubProperty::Raw {
                id,
                value: value.to_vec(),
            },
        };
        Ok(property)
    }
}

/// UTF-8 解码（非法序列替换），去掉尾部空白与 NUL 填充
fn decode_string(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

// ============================================================================
// 外设挂载
// ============================================================================

/// 外设挂载事件代码
pub const IO_EVENT_DETACHED: u8 = 0x00;
pub const IO_EVENT_ATTACHED: u8 = 0x01;
pub const IO_EVENT_ATTACHED_VIRTUAL: u8 = 0x02;

/// 外设挂载通知 (0x04)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachedIoEvent {
    /// 外设卸载
    Detached { port: u8 },
    /// 外设挂载（物理端口）
    Attached {
        port: u8,
        device: DeviceType,
        /// 硬件修订（payload ≥ 12 字节时才有）
        hardware_revision: Option<VersionNumber>,
        /// 软件修订（payload ≥ 12 字节时才有）
        software_revision: Option<VersionNumber>,
    },
    /// 外设挂载到虚拟端口（两个子端口合并）
    AttachedVirtual {
        port: u8,
        device: DeviceType,
        port_a: u8,
        port_b: u8,
    },
}

impl AttachedIoEvent {
    /// 事件涉及的端口
    pub fn port(&self) -> u8 {
        match *self {
            AttachedIoEvent::Detached { port }
            | AttachedIoEvent::Attached { port, .. }
            | AttachedIoEvent::AttachedVirtual { port, .. } => port,
        }
    }

    /// 解析挂载通知 payload
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        require_len(payload, 2)?;
        let port = payload[0];
        let event = payload[1];

        match event {
            IO_EVENT_DETACHED => Ok(AttachedIoEvent::Detached { port }),
            IO_EVENT_ATTACHED => {
                require_len(payload, 4)?;
                let device = DeviceType::from(bytes_to_u16_le([payload[2], payload[3]]));
                // 修订字段是尽力解析，缺失不报错
                let (hardware_revision, software_revision) = if payload.len() >= 12 {
                    (
                        VersionNumber::decode(&payload[4..8]).ok(),
                        VersionNumber::decode(&payload[8..12]).ok(),
                    )
                } else {
                    (None, None)
                };
                Ok(AttachedIoEvent::Attached {
                    port,
                    device,
                    hardware_revision,
                    software_revision,
                })
            },
            IO_EVENT_ATTACHED_VIRTUAL => {
                require_len(payload, 6)?;
                Ok(AttachedIoEvent::AttachedVirtual {
                    port,
                    device: DeviceType::from(bytes_to_u16_le([payload[2], payload[3]])),
                    port_a: payload[4],
                    port_b: payload[5],
                })
            },
            _ => Err(DecodeError::InvalidValue {
                field: "AttachedIoEvent",
                value: event,
            }),
        }
    }
}

/// 端口 → 外设类型映射
///
/// 挂载（含虚拟端口）时插入或覆盖，卸载时删除。卸载不存在的端口是空操作。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachedIo {
    devices: BTreeMap<u8, DeviceType>,
}

impl AttachedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一个挂载事件
    pub fn apply(&mut self, event: &AttachedIoEvent) {
        match *event {
            AttachedIoEvent::Detached { port } => {
                self.devices.remove(&port);
            },
            AttachedIoEvent::Attached { port, device, .. }
            | AttachedIoEvent::AttachedVirtual { port, device, .. } => {
                self.devices.insert(port, device);
            },
        }
    }

    pub fn get(&self, port: u8) -> Option<DeviceType> {
        self.devices.get(&port).copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// 按端口号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (u8, DeviceType)> + '_ {
        self.devices.iter().map(|(port, device)| (*port, *device))
    }
}

// ============================================================================
// 端口数值
// ============================================================================

/// 单模式端口数值 (0x45)
///
/// payload: `[port, i32 LE]`。转向端口 (52) 上报的是编码器位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortValue {
    pub port: u8,
    pub value: i32,
}

impl PortValue {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        require_len(payload, 5)?;
        Ok(Self {
            port: payload[0],
            value: bytes_to_i32_le([payload[1], payload[2], payload[3], payload[4]]),
        })
    }

    /// 是否来自转向端口
    pub fn is_steering(&self) -> bool {
        self.port == PORT_STEERING
    }
}

// ============================================================================
// 通用错误
// ============================================================================

/// 通用错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::FromPrimitive, num_enum::IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GenericErrorCode {
    Ack = 0x01,
    Mack = 0x02,
    BufferOverflow = 0x03,
    Timeout = 0x04,
    CommandNotRecognized = 0x05,
    InvalidUse = 0x06,
    Overcurrent = 0x07,
    InternalError = 0x08,
    #[num_enum(catch_all)]
    Other(u8),
}

/// 通用错误消息 (0x05)
///
/// payload: `[command_type, error_code]`，command_type 是触发错误的消息类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericError {
    pub command_type: u8,
    pub code: GenericErrorCode,
}

impl GenericError {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        require_len(payload, 2)?;
        Ok(Self {
            command_type: payload[0],
            code: GenericErrorCode::from(payload[1]),
        })
    }
}

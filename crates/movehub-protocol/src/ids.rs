//! 消息类型、端口号与属性 ID 常量
//!
//! 定义协议中所有消息类型代码，以及 Technic Move Hub 上实际使用的端口号。

use num_enum::{IntoPrimitive, TryFromPrimitive};

// ============================================================================
// 消息类型
// ============================================================================

/// 消息类型（帧头第 3 字节）
///
/// 封闭枚举：未知代码在 [`HubFrame::decode`](crate::HubFrame::decode) 中返回
/// `DecodeError::UnknownMessageType`，在 [`Message::parse`](crate::Message::parse)
/// 中落入 `Message::Unrecognized`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    // Hub 相关
    /// 设置或查询 Hub 属性
    HubProperties = 0x01,
    /// Hub 动作（关机、断开等）
    HubActions = 0x02,
    /// Hub 告警
    HubAlerts = 0x03,
    /// 外设挂载/卸载通知
    HubAttachedIo = 0x04,
    /// 通用错误消息
    GenericErrorMessages = 0x05,
    /// 硬件组网命令
    HwNetworkCommands = 0x08,
    /// 固件升级：进入 Boot Loader
    FwUpdateBootMode = 0x10,
    /// 固件升级：锁定内存
    FwUpdateLockMemory = 0x11,
    /// 固件升级：查询锁定状态
    FwUpdateLockStatusRequest = 0x12,
    /// 固件升级：锁定状态应答
    FwLockStatus = 0x13,

    // 端口相关
    /// 端口信息请求
    PortInformationRequest = 0x21,
    /// 端口模式信息请求
    PortModeInformationRequest = 0x22,
    /// 单模式输入格式设置
    PortInputFormatSetupSingle = 0x41,
    /// 组合模式输入格式设置
    PortInputFormatSetupCombined = 0x42,
    /// 端口信息（0x21 的应答）
    PortInformation = 0x43,
    /// 端口模式信息（0x22 的应答）
    PortModeInformation = 0x44,
    /// 单模式端口数值
    PortValueSingle = 0x45,
    /// 组合模式端口数值
    PortValueCombined = 0x46,
    /// 单模式输入格式应答
    PortInputFormatSingle = 0x47,
    /// 组合模式输入格式应答
    PortInputFormatCombined = 0x48,

    // 输出命令
    /// 端口输出命令
    PortOutputCommand = 0x81,
    /// 端口输出命令反馈
    PortOutputCommandFeedback = 0x82,
}

// ============================================================================
// 端口号（Technic Move Hub）
// ============================================================================

/// 左驱动电机端口
pub const PORT_DRIVE_LEFT: u8 = 0x32; // 50

/// 右驱动电机端口
pub const PORT_DRIVE_RIGHT: u8 = 0x33; // 51

/// 转向电机端口（编码器读数来源）
pub const PORT_STEERING: u8 = 0x34; // 52

/// 车灯端口（未校准时也可用）
pub const PORT_LIGHTS: u8 = 0x35; // 53

/// 组合控制端口（驱动 + 转向 + 车灯）
pub const PORT_COMBINED: u8 = 0x36; // 54

/// 两个驱动电机端口（刹车 / 滑行命令按此顺序发送）
pub const DRIVE_MOTOR_PORTS: [u8; 2] = [PORT_DRIVE_LEFT, PORT_DRIVE_RIGHT];

// ============================================================================
// Hub 属性 ID
// ============================================================================

/// 名称
pub const PROPERTY_NAME: u8 = 0x01;

/// 固件版本
pub const PROPERTY_FIRMWARE_VERSION: u8 = 0x03;

/// 硬件版本
pub const PROPERTY_HARDWARE_VERSION: u8 = 0x04;

/// 电池电量（百分比）
pub const PROPERTY_BATTERY: u8 = 0x06;

/// 制造商名称
pub const PROPERTY_MANUFACTURER: u8 = 0x08;

/// 连接时需要查询的属性（按查询顺序）
pub const KNOWN_PROPERTIES: [u8; 5] = [
    PROPERTY_NAME,
    PROPERTY_FIRMWARE_VERSION,
    PROPERTY_HARDWARE_VERSION,
    PROPERTY_BATTERY,
    PROPERTY_MANUFACTURER,
];

// ============================================================================
// Hub 动作
// ============================================================================

/// 关闭 Hub
pub const HUB_ACTION_SWITCH_OFF: u8 = 0x01;

/// 断开连接
pub const HUB_ACTION_DISCONNECT: u8 = 0x02;

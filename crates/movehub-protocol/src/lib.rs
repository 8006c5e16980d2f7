//! # MoveHub Protocol
//!
//! LEGO Wireless Protocol 3.0 子集（无硬件依赖、无异步）
//!
//! ## 模块
//!
//! - `ids`: 消息类型、端口号、属性 ID 常量
//! - `advertising`: 广播包厂商数据
//! - `constants`: 协议常量（功率保留值、校准子命令等）
//! - `device`: 外设类型表
//! - `feedback`: 入站 payload 解析（属性 / 外设挂载 / 传感器 / 错误）
//! - `control`: 出站帧构建（组合端口、单端口、校准、属性查询）
//! - `message`: 按消息类型分派的类型化解析
//!
//! ## 帧格式
//!
//! ```text
//! [length, hub_id(0x00), message_type] + payload
//! ```
//!
//! 多字节整数一律为小端字节序（与 CAN 侧的 Motorola 大端相反）。

pub mod advertising;
pub mod constants;
pub mod control;
pub mod device;
pub mod feedback;
pub mod ids;
pub mod message;

// 重新导出常用类型
pub use advertising::*;
pub use constants::*;
pub use control::*;
pub use device::*;
pub use feedback::*;
pub use ids::*;
pub use message::*;

use thiserror::Error;

/// 帧头长度（length + hub_id + message_type）
pub const HEADER_LEN: usize = 3;

/// 单字节长度编码下允许的最大帧长
pub const MAX_FRAME_LEN: usize = u8::MAX as usize;

/// 单字节长度编码下允许的最大 payload 长度
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - HEADER_LEN;

/// Hub 线上帧的统一抽象
///
/// # 在架构中的位置
///
/// ```text
/// Protocol Layer (movehub-protocol)
///     ↓ HubFrame::decode() 解析 / HubFrame::new() 构建
/// HubFrame (此类型)
///     ↓ to_bytes()
/// Transport Layer (movehub-transport)
///     ↓ BLE characteristic write / notify
/// Hub
/// ```
///
/// # 限制
///
/// - **仅支持单字节长度**：两字节长度编码未实现，length 字节始终按 u8 解释，
///   payload 上限为 252 字节
/// - `hub_id` 恒为 0
///
/// # 示例
///
/// ```rust
/// use movehub_protocol::{HubFrame, MessageType};
///
/// let frame = HubFrame::new(MessageType::HubActions, vec![0x01]).unwrap();
/// assert_eq!(frame.to_bytes(), vec![0x04, 0x00, 0x02, 0x01]);
///
/// let decoded = HubFrame::decode(&frame.to_bytes()).unwrap();
/// assert_eq!(decoded, frame);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HubFrame {
    /// 消息类型
    pub message_type: MessageType,
    /// 帧数据（不含帧头）
    pub payload: Vec<u8>,
}

impl HubFrame {
    /// 创建帧，校验 payload 长度
    ///
    /// # 错误
    /// - `EncodeError::PayloadTooLarge`: `3 + payload.len() > 255`
    pub fn new(message_type: MessageType, payload: impl Into<Vec<u8>>) -> Result<Self, EncodeError> {
        let payload = payload.into();
        if HEADER_LEN + payload.len() > MAX_FRAME_LEN {
            return Err(EncodeError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self {
            message_type,
            payload,
        })
    }

    /// 帧总长度（length 字段的值）
    pub fn length(&self) -> u8 {
        // new() 已保证不超过 255
        (HEADER_LEN + self.payload.len()) as u8
    }

    /// Hub ID（恒为 0）
    pub fn hub_id(&self) -> u8 {
        0
    }

    /// 获取 payload 切片
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// 序列化为线上字节
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.push(self.length());
        bytes.push(self.hub_id());
        bytes.push(self.message_type.into());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// 从线上字节解析
    ///
    /// length 字段之后的多余字节会被忽略。
    ///
    /// # 错误
    /// - `TooShort`: 不足 3 字节
    /// - `InvalidLength`: length 字段小于帧头长度
    /// - `Truncated`: length 字段声明的字节数多于实际收到的
    /// - `UnknownMessageType`: 第三个字节不是已知的消息类型
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (code, payload) = split_frame(bytes)?;
        let message_type =
            MessageType::try_from(code).map_err(|_| DecodeError::UnknownMessageType { code })?;
        Ok(Self {
            message_type,
            payload: payload.to_vec(),
        })
    }
}

/// 编码帧的便捷函数：`[length, 0x00, message_type] + payload`
pub fn encode(message_type: MessageType, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    Ok(HubFrame::new(message_type, payload)?.to_bytes())
}

/// 校验帧头并切出 (消息类型字节, payload)
///
/// 不检查消息类型是否已知，供 [`Message::parse`] 构造 `Unrecognized` 变体使用。
pub(crate) fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TooShort {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let length = bytes[0] as usize;
    if length < HEADER_LEN {
        return Err(DecodeError::InvalidLength { length });
    }
    if length > bytes.len() {
        return Err(DecodeError::Truncated {
            expected: length,
            actual: bytes.len(),
        });
    }

    Ok((bytes[2], &bytes[HEADER_LEN..length]))
}

/// 编码错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },
}

/// 解码错误
///
/// 所有变体都是可恢复的：出错的帧被丢弃，会话继续。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Invalid frame length byte: {length}")]
    InvalidLength { length: usize },

    #[error("Unknown message type: 0x{code:02X}")]
    UnknownMessageType { code: u8 },

    #[error("Truncated payload: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid value for field {field}: 0x{value:02X}")]
    InvalidValue { field: &'static str, value: u8 },
}

/// 协议层统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// 字节序转换工具函数（小端）
pub fn bytes_to_i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// 小端字节序转 u16
pub fn bytes_to_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// 校验 payload 最小长度
pub(crate) fn require_len(payload: &[u8], expected: usize) -> Result<(), DecodeError> {
    if payload.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_header_layout() {
        let bytes = encode(MessageType::HubProperties, &[0x01, 0x05]).unwrap();
        assert_eq!(bytes, vec![0x05, 0x00, 0x01, 0x01, 0x05]);
    }

    #[test]
    fn test_encode_empty_payload() {
        let bytes = encode(MessageType::HubActions, &[]).unwrap();
        assert_eq!(bytes, vec![0x03, 0x00, 0x02]);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let payload = vec![0u8; 253];
        let err = encode(MessageType::PortOutputCommand, &payload).unwrap_err();
        assert_eq!(err, EncodeError::PayloadTooLarge { len: 253, max: 252 });
    }

    #[test]
    fn test_encode_max_payload() {
        let payload = vec![0xAB; MAX_PAYLOAD_LEN];
        let frame = HubFrame::new(MessageType::PortOutputCommand, payload).unwrap();
        assert_eq!(frame.length(), 255);
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(
            HubFrame::decode(&[0x03, 0x00]),
            Err(DecodeError::TooShort {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(
            HubFrame::decode(&[]),
            Err(DecodeError::TooShort { actual: 0, .. })
        ));
    }

    #[test]
    fn test_decode_unknown_message_type() {
        let err = HubFrame::decode(&[0x03, 0x00, 0x7F]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownMessageType { code: 0x7F });
    }

    #[test]
    fn test_decode_truncated() {
        // length 声明 8 字节，实际只有 5 字节
        let err = HubFrame::decode(&[0x08, 0x00, 0x45, 0x34, 0x01]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                expected: 8,
                actual: 5
            }
        );
    }

    #[test]
    fn test_decode_large_single_byte_length() {
        let mut bytes = vec![0xFF, 0x00, 0x81];
        bytes.extend(std::iter::repeat_n(0x11, 252));
        let frame = HubFrame::decode(&bytes).unwrap();
        assert_eq!(frame.payload().len(), 252);
    }

    #[test]
    fn test_decode_invalid_length() {
        let err = HubFrame::decode(&[0x02, 0x00, 0x01]).unwrap_err();
        assert_eq!(err, DecodeError::InvalidLength { length: 2 });
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let frame = HubFrame::decode(&[0x04, 0x00, 0x02, 0x01, 0xFF, 0xFF]).unwrap();
        assert_eq!(frame.message_type, MessageType::HubActions);
        assert_eq!(frame.payload(), &[0x01]);
    }

    #[test]
    fn test_little_endian_helpers() {
        assert_eq!(bytes_to_i32_le([0x78, 0x56, 0x34, 0x12]), 0x12345678);
        assert_eq!(bytes_to_i32_le([0xFF, 0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(bytes_to_u16_le([0x2E, 0x00]), 0x002E);
    }

    #[test]
    fn test_protocol_error_from() {
        let err: ProtocolError = DecodeError::UnknownMessageType { code: 0x99 }.into();
        assert!(format!("{}", err).contains("0x99"));
        let err: ProtocolError = EncodeError::PayloadTooLarge { len: 300, max: 252 }.into();
        assert!(matches!(err, ProtocolError::Encode(_)));
    }

    proptest! {
        /// 任意 ≤252 字节 payload 编码后可以原样解码
        #[test]
        fn frame_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..=252usize)) {
            let bytes = encode(MessageType::PortOutputCommand, &payload).unwrap();
            let frame = HubFrame::decode(&bytes).unwrap();
            prop_assert_eq!(frame.payload, payload);
            prop_assert_eq!(frame.message_type, MessageType::PortOutputCommand);
        }

        /// length 字段总是等于 3 + payload 长度
        #[test]
        fn frame_length_invariant(payload in proptest::collection::vec(any::<u8>(), 0..=252usize)) {
            let frame = HubFrame::new(MessageType::HubProperties, payload.clone()).unwrap();
            prop_assert_eq!(frame.length() as usize, 3 + payload.len());
            prop_assert_eq!(frame.to_bytes().len(), 3 + payload.len());
        }

        /// 解码器不会在任意输入上 panic
        #[test]
        fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64usize)) {
            let _ = HubFrame::decode(&bytes);
            let _ = Message::parse(&bytes);
        }
    }
}

//! 按消息类型分派的类型化解析
//!
//! [`Message::parse`] 在 [`HubFrame::decode`](crate::HubFrame::decode) 之上
//! 把 payload 交给对应的解析器。未知消息类型不是错误，而是
//! `Message::Unrecognized`。

use crate::feedback::*;
use crate::ids::MessageType;
use crate::{DecodeError, split_frame};

/// 一条解析后的入站消息
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Hub 属性应答
    Property(HubProperty),
    /// 外设挂载 / 卸载
    AttachedIo(AttachedIoEvent),
    /// 单模式端口数值
    PortValue(PortValue),
    /// 通用错误
    GenericError(GenericError),
    /// 已知类型但本库不解析其 payload
    Other {
        message_type: MessageType,
        payload: Vec<u8>,
    },
    /// 未知的消息类型代码
    Unrecognized { code: u8, payload: Vec<u8> },
}

impl Message {
    /// 解析一帧完整的线上字节
    ///
    /// 帧头错误（`TooShort` / `InvalidLength` / `Truncated`）和 payload 错误
    /// 原样返回；未知消息类型返回 `Ok(Message::Unrecognized)`。
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (code, payload) = split_frame(bytes)?;
        match MessageType::try_from(code) {
            Ok(message_type) => Self::from_payload(message_type, payload),
            Err(_) => Ok(Message::Unrecognized {
                code,
                payload: payload.to_vec(),
            }),
        }
    }

    /// 按已知消息类型解析 payload
    pub fn from_payload(message_type: MessageType, payload: &[u8]) -> Result<Self, DecodeError> {
        let message = match message_type {
            MessageType::HubProperties => Message::Property(HubProperty::decode(payload)?),
            MessageType::HubAttachedIo => Message::AttachedIo(AttachedIoEvent::decode(payload)?),
            MessageType::PortValueSingle => Message::PortValue(PortValue::decode(payload)?),
            MessageType::GenericErrorMessages => {
                Message::GenericError(GenericError::decode(payload)?)
            },
            _ => Message::Other {
                message_type,
                payload: payload.to_vec(),
            },
        };
        Ok(message)
    }

    /// 线上的消息类型代码
    pub fn code(&self) -> u8 {
        match self {
            Message::Property(_) => MessageType::HubProperties.into(),
            Message::AttachedIo(_) => MessageType::HubAttachedIo.into(),
            Message::PortValue(_) => MessageType::PortValueSingle.into(),
            Message::GenericError(_) => MessageType::GenericErrorMessages.into(),
            Message::Other { message_type, .. } => (*message_type).into(),
            Message::Unrecognized { code, .. } => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::*;

    #[test]
    fn test_parse_battery() {
        let message = Message::parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A]).unwrap();
        assert_eq!(message, Message::Property(HubProperty::Battery(90)));
        assert_eq!(message.code(), 0x01);
    }

    #[test]
    fn test_parse_attached_io() {
        let message = Message::parse(&[0x05, 0x00, 0x04, 0x32, 0x00]).unwrap();
        assert_eq!(message, Message::AttachedIo(AttachedIoEvent::Detached { port: 0x32 }));
    }

    #[test]
    fn test_parse_port_value() {
        let message = Message::parse(&[0x08, 0x00, 0x45, 0x34, 0x2A, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(
            message,
            Message::PortValue(PortValue {
                port: PORT_STEERING,
                value: 42
            })
        );
    }

    #[test]
    fn test_parse_generic_error() {
        let message = Message::parse(&[0x05, 0x00, 0x05, 0x81, 0x06]).unwrap();
        assert_eq!(
            message,
            Message::GenericError(GenericError {
                command_type: 0x81,
                code: GenericErrorCode::InvalidUse
            })
        );
    }

    #[test]
    fn test_parse_unrecognized_type() {
        let message = Message::parse(&[0x05, 0x00, 0x7E, 0xAA, 0xBB]).unwrap();
        assert_eq!(
            message,
            Message::Unrecognized {
                code: 0x7E,
                payload: vec![0xAA, 0xBB]
            }
        );
        assert_eq!(message.code(), 0x7E);
    }

    #[test]
    fn test_parse_known_but_unhandled_type() {
        let message = Message::parse(&[0x05, 0x00, 0x82, 0x36, 0x0A]).unwrap();
        assert_eq!(
            message,
            Message::Other {
                message_type: MessageType::PortOutputCommandFeedback,
                payload: vec![0x36, 0x0A]
            }
        );
    }

    #[test]
    fn test_parse_payload_error_propagates() {
        // 端口数值只有 3 字节
        let err = Message::parse(&[0x06, 0x00, 0x45, 0x34, 0x01, 0x02]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                expected: 5,
                actual: 3
            }
        );
    }

    #[test]
    fn test_parse_header_error_propagates() {
        assert!(matches!(
            Message::parse(&[0x01]),
            Err(DecodeError::TooShort { .. })
        ));
    }
}

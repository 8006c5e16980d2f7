//! 出站帧构建
//!
//! 所有构建函数都是纯函数：输入数值，输出 [`HubFrame`]。状态合并
//! （速度 / 转向 / 灯光）由 driver 层的 `CommandEncoder` 负责。

use crate::constants::*;
use crate::ids::*;
use crate::{DecodeError, HubFrame, require_len};

// ============================================================================
// 数值范围
// ============================================================================

/// 速度限幅到 [-100, 100]
pub fn clamp_speed(speed: i32) -> i8 {
    speed.clamp(SIGNED_RANGE.0, SIGNED_RANGE.1) as i8
}

/// 转向角限幅到 [-100, 100]
pub fn clamp_steering(angle: i32) -> i8 {
    angle.clamp(SIGNED_RANGE.0, SIGNED_RANGE.1) as i8
}

/// 灯光亮度限幅到 [0, 100]
pub fn clamp_lights(brightness: i32) -> u8 {
    brightness.clamp(LIGHTS_RANGE.0, LIGHTS_RANGE.1) as u8
}

// ============================================================================
// 组合端口 (0x36)
// ============================================================================

/// 组合端口 payload 长度（不含帧头）
pub const COMBINED_PAYLOAD_LEN: usize = 10;

/// 组合端口驱动帧
///
/// ```text
/// [0x0D, 0x00, 0x81, 0x36, 0x11, 0x51, 0x00, 0x03, 0x00, speed, steering, lights, 0x00]
/// ```
///
/// speed / steering 以补码写入单字节。
pub fn combined_frame(speed: i8, steering: i8, lights: u8) -> HubFrame {
    combined_with_tail([0x00, speed as u8, steering as u8, lights, 0x00])
}

/// 从组合端口驱动帧还原 (speed, steering, lights)
///
/// # 错误
/// - `InvalidValue`: 不是输出命令，或端口 / 命令头不匹配
/// - `Truncated`: payload 不足 10 字节
pub fn decode_combined(frame: &HubFrame) -> Result<(i8, i8, u8), DecodeError> {
    if frame.message_type != MessageType::PortOutputCommand {
        return Err(DecodeError::InvalidValue {
            field: "message_type",
            value: frame.message_type.into(),
        });
    }
    let payload = frame.payload();
    require_len(payload, COMBINED_PAYLOAD_LEN)?;
    if payload[0] != PORT_COMBINED {
        return Err(DecodeError::InvalidValue {
            field: "port",
            value: payload[0],
        });
    }
    if payload[1..5] != COMBINED_COMMAND_HEADER {
        return Err(DecodeError::InvalidValue {
            field: "command_header",
            value: payload[4],
        });
    }
    Ok((payload[6] as i8, payload[7] as i8, payload[8]))
}

/// 校准帧（组合端口，子命令位于数据区第 4 字节）
///
/// `[0x0D, 0x00, 0x81, 0x36, 0x11, 0x51, 0x00, 0x03, 0x00, 0x00, 0x00, sub, 0x00]`
pub fn calibration_frame(subcommand: u8) -> HubFrame {
    combined_with_tail([0x00, 0x00, 0x00, subcommand, 0x00])
}

fn combined_with_tail(tail: [u8; 5]) -> HubFrame {
    let mut payload = Vec::with_capacity(COMBINED_PAYLOAD_LEN);
    payload.push(PORT_COMBINED);
    payload.extend_from_slice(&COMBINED_COMMAND_HEADER);
    payload.extend_from_slice(&tail);
    HubFrame {
        message_type: MessageType::PortOutputCommand,
        payload,
    }
}

// ============================================================================
// 单端口
// ============================================================================

/// 单端口功率帧
///
/// `[0x08, 0x00, 0x81, port, 0x11, 0x51, 0x00, value]`
///
/// value 为 127 时刹车，为 0 时滑行；车灯端口上为亮度。
pub fn port_power_frame(port: u8, value: u8) -> HubFrame {
    HubFrame {
        message_type: MessageType::PortOutputCommand,
        payload: vec![
            port,
            STARTUP_AND_COMPLETION,
            SUBCMD_WRITE_DIRECT_MODE_DATA,
            MODE_POWER,
            value,
        ],
    }
}

// ============================================================================
// Hub 级命令
// ============================================================================

/// 属性查询帧：`[0x05, 0x00, 0x01, id, 0x05]`
pub fn property_request_frame(property_id: u8) -> HubFrame {
    HubFrame {
        message_type: MessageType::HubProperties,
        payload: vec![property_id, PROPERTY_OP_REQUEST_UPDATE],
    }
}

/// Hub 动作帧：`[0x04, 0x00, 0x02, action]`
pub fn hub_action_frame(action: u8) -> HubFrame {
    HubFrame {
        message_type: MessageType::HubActions,
        payload: vec![action],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_combined_frame_layout() {
        let frame = combined_frame(50, -30, 100);
        assert_eq!(
            frame.to_bytes(),
            vec![0x0D, 0x00, 0x81, 0x36, 0x11, 0x51, 0x00, 0x03, 0x00, 50, 0xE2, 100, 0x00]
        );
    }

    #[test]
    fn test_combined_frame_zero() {
        let frame = combined_frame(0, 0, 0);
        assert_eq!(frame.length(), 13);
        assert_eq!(&frame.to_bytes()[9..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_calibration_frames() {
        assert_eq!(
            calibration_frame(CALIBRATION_START).to_bytes(),
            vec![0x0D, 0x00, 0x81, 0x36, 0x11, 0x51, 0x00, 0x03, 0x00, 0x00, 0x00, 0x10, 0x00]
        );
        assert_eq!(calibration_frame(CALIBRATION_END).to_bytes()[11], 0x08);
    }

    #[test]
    fn test_port_power_frame() {
        assert_eq!(
            port_power_frame(PORT_DRIVE_LEFT, POWER_BRAKE).to_bytes(),
            vec![0x08, 0x00, 0x81, 0x32, 0x11, 0x51, 0x00, 0x7F]
        );
        assert_eq!(
            port_power_frame(PORT_LIGHTS, 40).to_bytes(),
            vec![0x08, 0x00, 0x81, 0x35, 0x11, 0x51, 0x00, 40]
        );
    }

    #[test]
    fn test_property_request_frame() {
        assert_eq!(
            property_request_frame(PROPERTY_BATTERY).to_bytes(),
            vec![0x05, 0x00, 0x01, 0x06, 0x05]
        );
    }

    #[test]
    fn test_hub_action_frame() {
        assert_eq!(
            hub_action_frame(HUB_ACTION_SWITCH_OFF).to_bytes(),
            vec![0x04, 0x00, 0x02, 0x01]
        );
    }

    #[test]
    fn test_decode_combined_rejects_single_port_frame() {
        let frame = port_power_frame(PORT_DRIVE_LEFT, 0);
        assert!(decode_combined(&frame).is_err());
    }

    #[test]
    fn test_decode_combined_rejects_wrong_message_type() {
        let frame = property_request_frame(PROPERTY_NAME);
        assert!(matches!(
            decode_combined(&frame),
            Err(DecodeError::InvalidValue {
                field: "message_type",
                ..
            })
        ));
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_speed(150), 100);
        assert_eq!(clamp_speed(-150), -100);
        assert_eq!(clamp_steering(i32::MIN), -100);
        assert_eq!(clamp_lights(-5), 0);
        assert_eq!(clamp_lights(250), 100);
    }

    proptest! {
        /// 组合帧编码后可还原（限幅之后）
        #[test]
        fn combined_roundtrip(speed in any::<i32>(), steering in any::<i32>(), lights in any::<i32>()) {
            let (s, a, l) = (clamp_speed(speed), clamp_steering(steering), clamp_lights(lights));
            let frame = combined_frame(s, a, l);
            let decoded = decode_combined(&HubFrame::decode(&frame.to_bytes()).unwrap()).unwrap();
            prop_assert_eq!(decoded, (s, a, l));
        }

        /// 限幅是幂等的
        #[test]
        fn clamp_idempotent(x in any::<i32>()) {
            prop_assert_eq!(clamp_speed(clamp_speed(x) as i32), clamp_speed(x));
            prop_assert_eq!(clamp_steering(clamp_steering(x) as i32), clamp_steering(x));
            prop_assert_eq!(clamp_lights(clamp_lights(x) as i32), clamp_lights(x));
        }
    }
}

//! Hub 状态
//!
//! [`HubState`] 是入站消息累积出的只读视图：属性只覆盖不删除，外设表随
//! 挂载/卸载变化，转向编码器只保留最新值。状态只在会话任务内修改。

use crate::command::MotorState;
use movehub_protocol::{
    AttachedIo, AttachedIoEvent, GenericError, HubProperty, Message, PORT_STEERING,
    PROPERTY_BATTERY, PROPERTY_FIRMWARE_VERSION, PROPERTY_HARDWARE_VERSION,
    PROPERTY_MANUFACTURER, PROPERTY_NAME, PortValue,
};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// 一条入站消息对状态产生的影响
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// 更新了某个属性
    Property(u8),
    /// 外设表发生变化
    AttachedIo(AttachedIoEvent),
    /// 转向编码器读数
    SteeringEncoder(i32),
    /// 其他端口的数值（不保留）
    PortValue(PortValue),
    /// Hub 报告的错误
    HubError(GenericError),
    /// 未处理的消息（包括未知类型），状态未改变
    Ignored,
}

/// 入站消息累积出的 Hub 状态
#[derive(Debug, Clone, Default)]
pub struct HubState {
    properties: BTreeMap<u8, HubProperty>,
    attached_io: AttachedIo,
    steering_encoder: Option<i32>,
    last_error: Option<GenericError>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一条消息应用到状态上
    pub fn apply(&mut self, message: &Message) -> Dispatched {
        match message {
            Message::Property(property) => {
                let id = property.id();
                debug!("Hub property 0x{:02X}: {:?}", id, property);
                self.properties.insert(id, property.clone());
                Dispatched::Property(id)
            },
            Message::AttachedIo(event) => {
                debug!("Attached IO: {:?}", event);
                self.attached_io.apply(event);
                Dispatched::AttachedIo(*event)
            },
            Message::PortValue(value) if value.port == PORT_STEERING => {
                trace!("Steering encoder: {}", value.value);
                self.steering_encoder = Some(value.value);
                Dispatched::SteeringEncoder(value.value)
            },
            Message::PortValue(value) => Dispatched::PortValue(*value),
            Message::GenericError(error) => {
                warn!(
                    "Hub reported error for command 0x{:02X}: {:?}",
                    error.command_type, error.code
                );
                self.last_error = Some(*error);
                Dispatched::HubError(*error)
            },
            Message::Other { message_type, .. } => {
                trace!("Ignoring message {:?}", message_type);
                Dispatched::Ignored
            },
            Message::Unrecognized { code, .. } => {
                debug!("Ignoring unrecognized message type 0x{:02X}", code);
                Dispatched::Ignored
            },
        }
    }

    pub fn property(&self, id: u8) -> Option<&HubProperty> {
        self.properties.get(&id)
    }

    /// 所有已收到的属性（按 ID 升序）
    pub fn properties(&self) -> impl Iterator<Item = &HubProperty> {
        self.properties.values()
    }

    pub fn name(&self) -> Option<&str> {
        match self.property(PROPERTY_NAME) {
            Some(HubProperty::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn manufacturer(&self) -> Option<&str> {
        match self.property(PROPERTY_MANUFACTURER) {
            Some(HubProperty::Manufacturer(name)) => Some(name),
            _ => None,
        }
    }

    pub fn battery(&self) -> Option<u8> {
        match self.property(PROPERTY_BATTERY) {
            Some(HubProperty::Battery(level)) => Some(*level),
            _ => None,
        }
    }

    /// 固件版本（点分字符串）
    pub fn firmware_version(&self) -> Option<String> {
        match self.property(PROPERTY_FIRMWARE_VERSION) {
            Some(HubProperty::FirmwareVersion(v)) => Some(v.to_string()),
            _ => None,
        }
    }

    /// 硬件版本（点分字符串）
    pub fn hardware_version(&self) -> Option<String> {
        match self.property(PROPERTY_HARDWARE_VERSION) {
            Some(HubProperty::HardwareVersion(v)) => Some(v.to_string()),
            _ => None,
        }
    }

    pub fn attached_io(&self) -> &AttachedIo {
        &self.attached_io
    }

    /// 最近一次转向编码器读数（仅供参考）
    pub fn steering_encoder(&self) -> Option<i32> {
        self.steering_encoder
    }

    pub fn last_error(&self) -> Option<GenericError> {
        self.last_error
    }
}

/// 挂载在某端口上的外设
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachedDevice {
    pub port: u8,
    /// 类型名称（未知类型为 `UNKNOWN_0xXXXX`）
    pub device: String,
}

/// Hub 状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HubStatus {
    pub name: Option<String>,
    pub address: String,
    pub battery: Option<u8>,
    pub firmware: Option<String>,
    pub hardware: Option<String>,
    pub manufacturer: Option<String>,
    pub attached_io: Vec<AttachedDevice>,
    pub steering_encoder: Option<i32>,
    pub calibrated: bool,
    pub motor: MotorState,
}

impl HubStatus {
    pub(crate) fn from_state(
        state: &HubState,
        address: &str,
        calibrated: bool,
        motor: MotorState,
    ) -> Self {
        Self {
            name: state.name().map(str::to_string),
            address: address.to_string(),
            battery: state.battery(),
            firmware: state.firmware_version(),
            hardware: state.hardware_version(),
            manufacturer: state.manufacturer().map(str::to_string),
            attached_io: state
                .attached_io()
                .iter()
                .map(|(port, device)| AttachedDevice {
                    port,
                    device: device.to_string(),
                })
                .collect(),
            steering_encoder: state.steering_encoder(),
            calibrated,
            motor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Message {
        Message::parse(bytes).unwrap()
    }

    #[test]
    fn test_apply_properties() {
        let mut state = HubState::new();
        assert_eq!(
            state.apply(&parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A])),
            Dispatched::Property(PROPERTY_BATTERY)
        );
        state.apply(&parse(&[0x09, 0x00, 0x01, 0x03, 0x06, 0x00, 0x00, 0x03, 0x11]));
        state.apply(&parse(&[0x08, 0x00, 0x01, 0x01, 0x06, b'M', b'o', b'v']));

        assert_eq!(state.battery(), Some(90));
        assert_eq!(state.firmware_version().as_deref(), Some("1.1.03.0000"));
        assert_eq!(state.name(), Some("Mov"));
        assert_eq!(state.hardware_version(), None);
    }

    #[test]
    fn test_property_overwritten() {
        let mut state = HubState::new();
        state.apply(&parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A]));
        state.apply(&parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x50]));
        assert_eq!(state.battery(), Some(80));
        assert_eq!(state.properties().count(), 1);
    }

    #[test]
    fn test_unknown_property_kept_raw() {
        let mut state = HubState::new();
        state.apply(&parse(&[0x06, 0x00, 0x01, 0x0B, 0x06, 0x01]));
        assert_eq!(
            state.property(0x0B),
            Some(&HubProperty::Raw {
                id: 0x0B,
                value: vec![0x01]
            })
        );
    }

    #[test]
    fn test_attach_then_detach() {
        let mut state = HubState::new();
        state.apply(&parse(&[0x07, 0x00, 0x04, 0x32, 0x01, 0x2E, 0x00]));
        assert_eq!(state.attached_io().len(), 1);
        state.apply(&parse(&[0x05, 0x00, 0x04, 0x32, 0x00]));
        assert!(state.attached_io().is_empty());
        // 卸载不存在的端口
        state.apply(&parse(&[0x05, 0x00, 0x04, 0x77, 0x00]));
        assert!(state.attached_io().is_empty());
    }

    #[test]
    fn test_steering_encoder_only_from_port_52() {
        let mut state = HubState::new();
        assert_eq!(
            state.apply(&parse(&[0x08, 0x00, 0x45, 0x34, 0xF6, 0xFF, 0xFF, 0xFF])),
            Dispatched::SteeringEncoder(-10)
        );
        assert!(matches!(
            state.apply(&parse(&[0x08, 0x00, 0x45, 0x32, 0x05, 0x00, 0x00, 0x00])),
            Dispatched::PortValue(PortValue { port: 0x32, value: 5 })
        ));
        assert_eq!(state.steering_encoder(), Some(-10));
    }

    #[test]
    fn test_generic_error_recorded() {
        let mut state = HubState::new();
        let result = state.apply(&parse(&[0x05, 0x00, 0x05, 0x81, 0x05]));
        assert!(matches!(result, Dispatched::HubError(_)));
        assert_eq!(state.last_error().unwrap().command_type, 0x81);
    }

    #[test]
    fn test_unrecognized_mutates_nothing() {
        let mut state = HubState::new();
        state.apply(&parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A]));
        let before = format!("{:?}", state);
        assert_eq!(
            state.apply(&parse(&[0x05, 0x00, 0x7E, 0x01, 0x02])),
            Dispatched::Ignored
        );
        assert_eq!(format!("{:?}", state), before);
    }

    #[test]
    fn test_status_snapshot() {
        let mut state = HubState::new();
        state.apply(&parse(&[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A]));
        state.apply(&parse(&[0x07, 0x00, 0x04, 0x35, 0x01, 0xCD, 0xAB]));

        let status = HubStatus::from_state(&state, "AA:BB", true, MotorState::default());
        assert_eq!(status.address, "AA:BB");
        assert_eq!(status.battery, Some(90));
        assert!(status.calibrated);
        assert_eq!(
            status.attached_io,
            vec![AttachedDevice {
                port: 0x35,
                device: "UNKNOWN_0xabcd".to_string()
            }]
        );
    }
}

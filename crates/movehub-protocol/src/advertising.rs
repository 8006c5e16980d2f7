//! 广播包中的厂商数据
//!
//! BLE 栈按厂商 ID (0x0397) 拆分后，剩下的 6 字节：
//!
//! | Byte | 含义 |
//! |---|---|
//! | 0 | 按键状态 |
//! | 1 | 系统类型 (Bit 5-7) + 设备编号 (Bit 0-4) |
//! | 2 | 设备能力位 |
//! | 3 | 上次网络 ID |
//! | 4 | 状态 |
//! | 5 | 选项 |

use crate::{DecodeError, require_len};
use bilge::prelude::*;

/// LEGO 厂商 ID
pub const LEGO_MANUFACTURER_ID: u16 = 0x0397;

/// 系统类型 + 设备编号位域
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct SystemTypeByte {
    pub device_number: u5, // Bit 0-4
    pub system_type: u3,   // Bit 5-7
}

/// 设备能力位域
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default)]
pub struct DeviceCapabilities {
    pub central_role: bool,    // Bit 0
    pub peripheral_role: bool, // Bit 1
    pub lpf2_devices: bool,    // Bit 2
    pub act_as_remote: bool,   // Bit 3
    pub reserved: u4,          // Bit 4-7
}

/// 解析后的厂商数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManufacturerData {
    pub button_pressed: bool,
    pub system_type: u8,
    pub device_number: u8,
    pub capabilities: u8,
    pub last_network_id: u8,
    pub status: u8,
    pub option: u8,
}

impl ManufacturerData {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        require_len(data, 6)?;
        let system = SystemTypeByte::from(u8::new(data[1]));
        Ok(Self {
            button_pressed: data[0] != 0,
            system_type: system.system_type().value(),
            device_number: system.device_number().value(),
            capabilities: data[2],
            last_network_id: data[3],
            status: data[4],
            option: data[5],
        })
    }

    /// 能力位
    pub fn capability_flags(&self) -> DeviceCapabilities {
        DeviceCapabilities::from(u8::new(self.capabilities))
    }

    /// 完整的系统类型字节（Technic Move Hub 为 0x80 + 设备编号）
    pub fn system_type_id(&self) -> u8 {
        (self.system_type << 5) | self.device_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_manufacturer_data() {
        let data = ManufacturerData::decode(&[0x00, 0x80, 0x06, 0x00, 0x41, 0x00]).unwrap();
        assert!(!data.button_pressed);
        assert_eq!(data.system_type, 4);
        assert_eq!(data.device_number, 0);
        assert_eq!(data.system_type_id(), 0x80);
        assert_eq!(data.status, 0x41);

        let caps = data.capability_flags();
        assert!(!caps.central_role());
        assert!(caps.peripheral_role());
        assert!(caps.lpf2_devices());
        assert!(!caps.act_as_remote());
    }

    #[test]
    fn test_decode_button_pressed() {
        let data = ManufacturerData::decode(&[0x01, 0x83, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert!(data.button_pressed);
        assert_eq!(data.device_number, 3);
        assert_eq!(data.system_type_id(), 0x83);
    }

    #[test]
    fn test_decode_too_short() {
        assert_eq!(
            ManufacturerData::decode(&[0x00, 0x80]),
            Err(DecodeError::Truncated {
                expected: 6,
                actual: 2
            })
        );
    }
}

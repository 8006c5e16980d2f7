//! 外设类型表
//!
//! HUB_ATTACHED_IO 通知中 Byte 2-3（小端）给出的 IO 类型代码。

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 已知外设类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum IoDeviceType {
    Motor = 0x0001,
    SystemTrainMotor = 0x0002,
    Button = 0x0005,
    LedLight = 0x0008,
    Voltage = 0x0014,
    Current = 0x0015,
    PiezoTone = 0x0016,
    RgbLight = 0x0017,
    ExternalTiltSensor = 0x0022,
    MotionSensor = 0x0023,
    VisionSensor = 0x0025,
    ExternalMotorWithTacho = 0x0026,
    InternalMotorWithTacho = 0x0027,
    InternalTilt = 0x0028,
    DuploTrainBaseMotor = 0x0029,
    DuploTrainBaseSpeaker = 0x002A,
    DuploTrainBaseColorSensor = 0x002B,
    DuploTrainBaseSpeedometer = 0x002C,
    TechnicLargeLinearMotor = 0x002E,
    TechnicXLargeLinearMotor = 0x002F,
    TechnicMediumAngularMotor = 0x0030,
    TechnicLargeAngularMotor = 0x0031,
    TechnicHubGestureSensor = 0x0036,
    RemoteControlButton = 0x0037,
    RemoteControlRssi = 0x0038,
    TechnicHubAccelerometer = 0x0039,
    TechnicHubGyroSensor = 0x003A,
    TechnicHubTiltSensor = 0x003B,
    TechnicHubTemperatureSensor = 0x003C,
    TechnicColorSensor = 0x003D,
    TechnicDistanceSensor = 0x003E,
    TechnicForceSensor = 0x003F,
    Technic3x3ColorLightMatrix = 0x0040,
    TechnicSmallAngularMotor = 0x0041,
    TechnicMediumAngularMotorGrey = 0x004B,
    TechnicLargeAngularMotorGrey = 0x004C,
}

impl IoDeviceType {
    /// 协议文档中的大写名称
    pub fn name(self) -> &'static str {
        match self {
            IoDeviceType::Motor => "MOTOR",
            IoDeviceType::SystemTrainMotor => "SYSTEM_TRAIN_MOTOR",
            IoDeviceType::Button => "BUTTON",
            IoDeviceType::LedLight => "LED_LIGHT",
            IoDeviceType::Voltage => "VOLTAGE",
            IoDeviceType::Current => "CURRENT",
            IoDeviceType::PiezoTone => "PIEZO_TONE",
            IoDeviceType::RgbLight => "RGB_LIGHT",
            IoDeviceType::ExternalTiltSensor => "EXTERNAL_TILT_SENSOR",
            IoDeviceType::MotionSensor => "MOTION_SENSOR",
            IoDeviceType::VisionSensor => "VISION_SENSOR",
            IoDeviceType::ExternalMotorWithTacho => "EXTERNAL_MOTOR_WITH_TACHO",
            IoDeviceType::InternalMotorWithTacho => "INTERNAL_MOTOR_WITH_TACHO",
            IoDeviceType::InternalTilt => "INTERNAL_TILT",
            IoDeviceType::DuploTrainBaseMotor => "DUPLO_TRAIN_BASE_MOTOR",
            IoDeviceType::DuploTrainBaseSpeaker => "DUPLO_TRAIN_BASE_SPEAKER",
            IoDeviceType::DuploTrainBaseColorSensor => "DUPLO_TRAIN_BASE_COLOR_SENSOR",
            IoDeviceType::DuploTrainBaseSpeedometer => "DUPLO_TRAIN_BASE_SPEEDOMETER",
            IoDeviceType::TechnicLargeLinearMotor => "TECHNIC_LARGE_LINEAR_MOTOR",
            IoDeviceType::TechnicXLargeLinearMotor => "TECHNIC_XLARGE_LINEAR_MOTOR",
            IoDeviceType::TechnicMediumAngularMotor => "TECHNIC_MEDIUM_ANGULAR_MOTOR",
            IoDeviceType::TechnicLargeAngularMotor => "TECHNIC_LARGE_ANGULAR_MOTOR",
            IoDeviceType::TechnicHubGestureSensor => "TECHNIC_HUB_GESTURE_SENSOR",
            IoDeviceType::RemoteControlButton => "REMOTE_CONTROL_BUTTON",
            IoDeviceType::RemoteControlRssi => "REMOTE_CONTROL_RSSI",
            IoDeviceType::TechnicHubAccelerometer => "TECHNIC_HUB_ACCELEROMETER",
            IoDeviceType::TechnicHubGyroSensor => "TECHNIC_HUB_GYRO_SENSOR",
            IoDeviceType::TechnicHubTiltSensor => "TECHNIC_HUB_TILT_SENSOR",
            IoDeviceType::TechnicHubTemperatureSensor => "TECHNIC_HUB_TEMPERATURE_SENSOR",
            IoDeviceType::TechnicColorSensor => "TECHNIC_COLOR_SENSOR",
            IoDeviceType::TechnicDistanceSensor => "TECHNIC_DISTANCE_SENSOR",
            IoDeviceType::TechnicForceSensor => "TECHNIC_FORCE_SENSOR",
            IoDeviceType::Technic3x3ColorLightMatrix => "TECHNIC_3X3_COLOR_LIGHT_MATRIX",
            IoDeviceType::TechnicSmallAngularMotor => "TECHNIC_SMALL_ANGULAR_MOTOR",
            IoDeviceType::TechnicMediumAngularMotorGrey => "TECHNIC_MEDIUM_ANGULAR_MOTOR_GREY",
            IoDeviceType::TechnicLargeAngularMotorGrey => "TECHNIC_LARGE_ANGULAR_MOTOR_GREY",
        }
    }
}

/// 挂载外设的类型：已知枚举或原始代码
///
/// 未知代码永不报错，保留原值用于显示（`UNKNOWN_0x0056`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceType {
    Known(IoDeviceType),
    Unknown(u16),
}

impl DeviceType {
    /// 原始类型代码
    pub fn code(self) -> u16 {
        match self {
            DeviceType::Known(kind) => kind.into(),
            DeviceType::Unknown(code) => code,
        }
    }
}

impl From<u16> for DeviceType {
    fn from(code: u16) -> Self {
        match IoDeviceType::try_from(code) {
            Ok(kind) => DeviceType::Known(kind),
            Err(_) => DeviceType::Unknown(code),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Known(kind) => f.write_str(kind.name()),
            DeviceType::Unknown(code) => write!(f, "UNKNOWN_0x{:04x}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_device_type() {
        let device = DeviceType::from(0x002E);
        assert_eq!(device, DeviceType::Known(IoDeviceType::TechnicLargeLinearMotor));
        assert_eq!(device.to_string(), "TECHNIC_LARGE_LINEAR_MOTOR");
        assert_eq!(device.code(), 0x002E);
    }

    #[test]
    fn test_unknown_device_type() {
        let device = DeviceType::from(0x0056);
        assert_eq!(device, DeviceType::Unknown(0x0056));
        assert_eq!(device.to_string(), "UNKNOWN_0x0056");
        assert_eq!(device.code(), 0x0056);
    }

    #[test]
    fn test_names_are_unique() {
        let codes: Vec<u16> = (0..=0x00FF).collect();
        let mut names: Vec<&str> = codes
            .into_iter()
            .filter_map(|c| IoDeviceType::try_from(c).ok())
            .map(IoDeviceType::name)
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}

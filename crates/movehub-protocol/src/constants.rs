//! 协议常量定义
//!
//! 集中定义输出命令相关的常量，避免在代码中散落"魔法数"。

/// 输出命令启动/完成标志：立即执行 + 完成后反馈
pub const STARTUP_AND_COMPLETION: u8 = 0x11;

/// 输出子命令：WriteDirectModeData
pub const SUBCMD_WRITE_DIRECT_MODE_DATA: u8 = 0x51;

/// 单端口功率模式
pub const MODE_POWER: u8 = 0x00;

/// 组合端口的驱动/转向/灯光模式
pub const MODE_COMBINED_DRIVE: u8 = 0x03;

/// 组合端口命令头：`[0x11, 0x51, 0x00, 0x03]`
///
/// 注意 Byte 2 并非模式字节，而是组合端口固件要求的保留位；模式在 Byte 3。
pub const COMBINED_COMMAND_HEADER: [u8; 4] = [
    STARTUP_AND_COMPLETION,
    SUBCMD_WRITE_DIRECT_MODE_DATA,
    0x00,
    MODE_COMBINED_DRIVE,
];

/// 功率保留值：刹车（电机主动制动）
pub const POWER_BRAKE: u8 = 127;

/// 功率保留值：滑行（不供电，自由转动）
pub const POWER_COAST: u8 = 0;

/// 校准子命令：开始（转向机构寻找端点）
pub const CALIBRATION_START: u8 = 0x10;

/// 校准子命令：结束（回中）
pub const CALIBRATION_END: u8 = 0x08;

/// 属性操作：请求更新
pub const PROPERTY_OP_REQUEST_UPDATE: u8 = 0x05;

/// 属性操作：更新（Hub → 主机）
pub const PROPERTY_OP_UPDATE: u8 = 0x06;

/// 速度 / 转向取值范围
pub const SIGNED_RANGE: (i32, i32) = (-100, 100);

/// 灯光亮度取值范围
pub const LIGHTS_RANGE: (i32, i32) = (0, 100);

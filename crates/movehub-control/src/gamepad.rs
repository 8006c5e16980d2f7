//! 手柄轴值归一化
//!
//! 只负责把原始 HID 轴值转换成 [`InputEvent`]，不读取任何设备。
//! CLI 只接键盘；接入手柄的程序自行读取 HID 轴值，经 [`GamepadState::event`]
//! 转换后送入 [`InputSender`](crate::InputSender)。
//!
//! - 摇杆：0 ~ 65535，中心 32768 → -100 ~ 100，|v| < 15 视为 0，Y 轴取反
//! - 扳机：0 ~ 1023 → 0 ~ 100

use crate::event::InputEvent;
use std::collections::HashMap;

/// 摇杆中心值
pub const STICK_CENTER: i64 = 32768;

/// 摇杆死区
pub const STICK_DEADZONE: i32 = 15;

/// 扳机最大值
pub const TRIGGER_MAX: i64 = 1023;

/// 手柄轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

impl GamepadAxis {
    fn is_stick(self) -> bool {
        !matches!(self, GamepadAxis::LeftTrigger | GamepadAxis::RightTrigger)
    }

    fn is_y(self) -> bool {
        matches!(self, GamepadAxis::LeftStickY | GamepadAxis::RightStickY)
    }
}

/// 摇杆归一化（向零截断）
pub fn normalize_stick(raw: i64, invert: bool) -> i32 {
    let scaled = ((raw - STICK_CENTER) as f64 / STICK_CENTER as f64 * 100.0) as i32;
    let clamped = scaled.clamp(-100, 100);
    let value = if clamped.abs() < STICK_DEADZONE {
        0
    } else {
        clamped
    };
    if invert { -value } else { value }
}

/// 扳机归一化（向零截断）
pub fn normalize_trigger(raw: i64) -> i32 {
    ((raw as f64 / TRIGGER_MAX as f64 * 100.0) as i32).clamp(0, 100)
}

/// 轴值归一化，带变化检测
///
/// 同一轴归一化后的值未变化时不产生事件。默认映射：
/// - 左摇杆 X → 转向
/// - 右扳机 → 前进速度，左扳机 → 后退速度（两者同时按下时取差值）
#[derive(Debug, Clone, Default)]
pub struct GamepadState {
    last: HashMap<GamepadAxis, i32>,
}

impl GamepadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 归一化一个原始轴值；与上次相同时返回 None
    pub fn normalize(&mut self, axis: GamepadAxis, raw: i64) -> Option<i32> {
        let value = if axis.is_stick() {
            normalize_stick(raw, axis.is_y())
        } else {
            normalize_trigger(raw)
        };
        if self.last.insert(axis, value) == Some(value) {
            return None;
        }
        Some(value)
    }

    /// 轴值变化 → 输入事件
    pub fn event(&mut self, axis: GamepadAxis, raw: i64) -> Option<InputEvent> {
        let value = self.normalize(axis, raw)?;
        match axis {
            GamepadAxis::LeftStickX => Some(InputEvent::steer(value)),
            GamepadAxis::LeftTrigger | GamepadAxis::RightTrigger => {
                let forward = self.value(GamepadAxis::RightTrigger);
                let reverse = self.value(GamepadAxis::LeftTrigger);
                Some(InputEvent::drive(forward - reverse))
            },
            _ => None,
        }
    }

    /// 某轴最近一次归一化值
    pub fn value(&self, axis: GamepadAxis) -> i32 {
        self.last.get(&axis).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_center_and_extremes() {
        assert_eq!(normalize_stick(32768, false), 0);
        assert_eq!(normalize_stick(0, false), -100);
        assert_eq!(normalize_stick(65535, false), 99);
    }

    #[test]
    fn test_stick_deadzone() {
        // 14% 以内归零
        assert_eq!(normalize_stick(32768 + 4500, false), 0);
        assert_eq!(normalize_stick(32768 - 4500, false), 0);
        // 15% 保留
        assert_eq!(normalize_stick(32768 + 4916, false), 15);
    }

    #[test]
    fn test_stick_invert() {
        assert_eq!(normalize_stick(0, true), 100);
        assert_eq!(normalize_stick(65535, true), -99);
    }

    #[test]
    fn test_trigger() {
        assert_eq!(normalize_trigger(0), 0);
        assert_eq!(normalize_trigger(512), 50);
        assert_eq!(normalize_trigger(1023), 100);
        assert_eq!(normalize_trigger(5000), 100);
    }

    #[test]
    fn test_change_detection() {
        let mut pad = GamepadState::new();
        assert_eq!(pad.normalize(GamepadAxis::LeftStickX, 32768), Some(0));
        assert_eq!(pad.normalize(GamepadAxis::LeftStickX, 32768), None);
        // 死区内的不同原始值归一化后相同
        assert_eq!(pad.normalize(GamepadAxis::LeftStickX, 32868), None);
        assert_eq!(pad.normalize(GamepadAxis::LeftStickX, 0), Some(-100));
    }

    #[test]
    fn test_y_axis_inverted() {
        let mut pad = GamepadState::new();
        assert_eq!(pad.normalize(GamepadAxis::LeftStickY, 0), Some(100));
        assert_eq!(pad.event(GamepadAxis::RightStickY, 0), None);
    }

    #[test]
    fn test_events() {
        let mut pad = GamepadState::new();
        assert_eq!(pad.event(GamepadAxis::LeftStickX, 65535), Some(InputEvent::steer(99)));
        assert_eq!(pad.event(GamepadAxis::RightTrigger, 1023), Some(InputEvent::drive(100)));
        assert_eq!(pad.event(GamepadAxis::LeftTrigger, 512), Some(InputEvent::drive(50)));
        assert_eq!(pad.event(GamepadAxis::RightTrigger, 0), Some(InputEvent::drive(-50)));
    }
}

//! 抽象输入事件
//!
//! 键盘、手柄等输入源都先转换为 [`InputEvent`]，再交给控制循环。

/// 输入事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputKind {
    /// 设置速度（value: -100 ~ 100）
    Drive,
    /// 设置转向（value: -100 ~ 100）
    Steer,
    /// 滑行停车
    Stop,
    /// 刹车
    Brake,
    /// 松开刹车
    ReleaseBrake,
    /// 切换车灯（value: 打开时的亮度，≤ 0 时取 100）
    ToggleLights,
    /// 退出控制循环
    Quit,
}

/// 输入事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputEvent {
    pub kind: InputKind,
    pub value: i32,
}

impl InputEvent {
    pub fn new(kind: InputKind, value: i32) -> Self {
        Self { kind, value }
    }

    pub fn drive(speed: i32) -> Self {
        Self::new(InputKind::Drive, speed)
    }

    pub fn steer(angle: i32) -> Self {
        Self::new(InputKind::Steer, angle)
    }

    pub fn stop() -> Self {
        Self::new(InputKind::Stop, 0)
    }

    pub fn brake() -> Self {
        Self::new(InputKind::Brake, 0)
    }

    pub fn release_brake() -> Self {
        Self::new(InputKind::ReleaseBrake, 0)
    }

    pub fn toggle_lights(brightness: i32) -> Self {
        Self::new(InputKind::ToggleLights, brightness)
    }

    pub fn quit() -> Self {
        Self::new(InputKind::Quit, 0)
    }
}

//! 键盘遥控
//!
//! 把单个按键映射为 [`InputEvent`]，并维护按键累积出的目标速度 / 转向：
//!
//! | 按键 | 动作 |
//! |---|---|
//! | w / ↑ | 速度 +20（倒车中则先归零） |
//! | s / ↓ | 速度 -20（前进中则先归零） |
//! | a / ← | 转向 -15（下限 -90） |
//! | d / → | 转向 +15（上限 90） |
//! | x / 空格 | 滑行停车 |
//! | b | 刹车 |
//! | l | 切换车灯 |
//! | q | 退出 |

use crate::event::InputEvent;

/// 每次按键的速度步进
pub const SPEED_STEP: i32 = 20;

/// 每次按键的转向步进
pub const STEER_STEP: i32 = 15;

/// 键盘转向上限
pub const STEER_LIMIT: i32 = 90;

/// 车灯打开时的亮度
pub const LIGHTS_ON: i32 = 100;

/// 遥控按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleopKey {
    Forward,
    Backward,
    Left,
    Right,
    Coast,
    Brake,
    Lights,
    Quit,
}

impl TeleopKey {
    /// 字符按键映射（大小写不敏感）
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(TeleopKey::Forward),
            's' => Some(TeleopKey::Backward),
            'a' => Some(TeleopKey::Left),
            'd' => Some(TeleopKey::Right),
            'x' | ' ' => Some(TeleopKey::Coast),
            'b' => Some(TeleopKey::Brake),
            'l' => Some(TeleopKey::Lights),
            'q' => Some(TeleopKey::Quit),
            _ => None,
        }
    }
}

/// 键盘遥控状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeleopState {
    pub speed: i32,
    pub angle: i32,
    pub braking: bool,
}

impl TeleopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理一个按键，返回要发送的事件
    pub fn handle(&mut self, key: TeleopKey) -> InputEvent {
        self.braking = false;
        match key {
            TeleopKey::Forward => {
                self.speed = if self.speed >= 0 {
                    (self.speed + SPEED_STEP).min(100)
                } else {
                    0
                };
                InputEvent::drive(self.speed)
            },
            TeleopKey::Backward => {
                self.speed = if self.speed <= 0 {
                    (self.speed - SPEED_STEP).max(-100)
                } else {
                    0
                };
                InputEvent::drive(self.speed)
            },
            TeleopKey::Left => {
                self.angle = (self.angle - STEER_STEP).max(-STEER_LIMIT);
                InputEvent::steer(self.angle)
            },
            TeleopKey::Right => {
                self.angle = (self.angle + STEER_STEP).min(STEER_LIMIT);
                InputEvent::steer(self.angle)
            },
            TeleopKey::Coast => {
                self.speed = 0;
                self.angle = 0;
                InputEvent::stop()
            },
            TeleopKey::Brake => {
                self.speed = 0;
                self.angle = 0;
                self.braking = true;
                InputEvent::brake()
            },
            TeleopKey::Lights => InputEvent::toggle_lights(LIGHTS_ON),
            TeleopKey::Quit => InputEvent::quit(),
        }
    }

    /// 单行状态显示
    pub fn status_line(&self) -> String {
        let mut line = format!("Speed: {:4}  Angle: {:4}", self.speed, self.angle);
        if self.braking {
            line.push_str("  [BRAKE]");
        }
        line
    }
}

//! 命令编码
//!
//! [`CommandEncoder`] 持有当前的电机状态。每个操作先合并 + 限幅，再把
//! 完整状态序列化为帧，返回 [`CommandBatch`]；本模块不触碰传输层。

use movehub_protocol::{
    DRIVE_MOTOR_PORTS, HubFrame, PORT_LIGHTS, POWER_BRAKE, POWER_COAST, clamp_lights,
    clamp_speed, clamp_steering, combined_frame, port_power_frame,
};

/// 电机状态（组合端口的三个通道）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorState {
    /// 速度 [-100, 100]
    pub speed: i8,
    /// 转向 [-100, 100]
    pub steering: i8,
    /// 灯光亮度 [0, 100]
    pub lights: u8,
}

impl MotorState {
    /// 当前状态对应的组合端口帧
    pub fn to_frame(&self) -> HubFrame {
        combined_frame(self.speed, self.steering, self.lights)
    }
}

/// 一次操作产生的有序帧序列
///
/// 按顺序逐帧写入，前一帧写完再写下一帧。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch {
    frames: Vec<HubFrame>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(frame: HubFrame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    pub fn push(&mut self, frame: HubFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[HubFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// 序列化所有帧
    pub fn to_bytes(&self) -> Vec<Vec<u8>> {
        self.frames.iter().map(HubFrame::to_bytes).collect()
    }
}

impl IntoIterator for CommandBatch {
    type Item = HubFrame;
    type IntoIter = std::vec::IntoIter<HubFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl From<Vec<HubFrame>> for CommandBatch {
    fn from(frames: Vec<HubFrame>) -> Self {
        Self { frames }
    }
}

/// 有状态的命令编码器
#[derive(Debug, Clone, Default)]
pub struct CommandEncoder {
    state: MotorState,
}

impl CommandEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前电机状态
    pub fn state(&self) -> MotorState {
        self.state
    }

    /// 重置为全零（校准完成时调用）
    pub fn reset(&mut self) {
        self.state = MotorState::default();
    }

    /// 合并任意通道后发送一帧组合命令
    pub fn update(
        &mut self,
        speed: Option<i32>,
        steering: Option<i32>,
        lights: Option<i32>,
    ) -> CommandBatch {
        if let Some(speed) = speed {
            self.state.speed = clamp_speed(speed);
        }
        if let Some(angle) = steering {
            self.state.steering = clamp_steering(angle);
        }
        if let Some(brightness) = lights {
            self.state.lights = clamp_lights(brightness);
        }
        CommandBatch::single(self.state.to_frame())
    }

    /// 设置速度（-100 全速后退 ~ 100 全速前进）
    pub fn set_drive(&mut self, speed: i32) -> CommandBatch {
        self.update(Some(speed), None, None)
    }

    /// 设置转向（负值左转，正值右转，0 回中）
    pub fn set_steering(&mut self, angle: i32) -> CommandBatch {
        self.update(None, Some(angle), None)
    }

    /// 设置灯光
    ///
    /// 先发车灯端口的单端口帧（未校准时也生效），再发组合帧（校准后生效）。
    pub fn set_lights(&mut self, brightness: i32) -> CommandBatch {
        let lights = clamp_lights(brightness);
        let mut batch = CommandBatch::single(port_power_frame(PORT_LIGHTS, lights));
        batch.extend(self.update(None, None, Some(lights as i32)));
        batch
    }

    /// 停车（滑行）：速度与转向归零，灯光保持
    pub fn stop(&mut self) -> CommandBatch {
        self.update(Some(0), Some(0), None)
    }

    /// 刹车：向两个驱动电机端口发送制动值
    ///
    /// 不发组合帧；速度与转向状态归零，灯光保持。
    pub fn brake(&mut self) -> CommandBatch {
        let batch = drive_motor_power(POWER_BRAKE);
        self.state.speed = 0;
        self.state.steering = 0;
        batch
    }

    /// 松开刹车（两个驱动电机滑行），状态不变
    pub fn release_brake(&self) -> CommandBatch {
        drive_motor_power(POWER_COAST)
    }
}

impl Extend<HubFrame> for CommandBatch {
    fn extend<I: IntoIterator<Item = HubFrame>>(&mut self, iter: I) {
        self.frames.extend(iter);
    }
}

fn drive_motor_power(value: u8) -> CommandBatch {
    DRIVE_MOTOR_PORTS
        .iter()
        .map(|&port| port_power_frame(port, value))
        .collect::<Vec<_>>()
        .into()
}

//! 转向校准状态机
//!
//! ```text
//! Idle ──(0x10, 等 2.0s)──▶ StartSent ──(0x08, 等 0.5s)──▶ EndSent ──(复位, 等 0.3s)──▶ Done
//! ```
//!
//! 状态机只产出步骤，不做 I/O、不计时；由会话层写帧并等待。
//! 第一步的 2.0s 等待不可缩短：转向机构需要这段时间找到端点。

use crate::config::HubConfig;
use movehub_protocol::{CALIBRATION_END, CALIBRATION_START, HubFrame, calibration_frame};
use std::time::Duration;

/// 校准阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationState {
    #[default]
    Idle,
    StartSent,
    EndSent,
    Done,
}

/// 校准中的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationStep {
    /// 要写入的帧（复位步骤为 None）
    pub frame: Option<HubFrame>,
    /// 写入后需要等待的时长
    pub settle: Duration,
    /// 是否在此步复位电机状态
    pub reset_motor: bool,
}

/// 校准序列
#[derive(Debug, Clone)]
pub struct Calibration {
    state: CalibrationState,
    start_settle: Duration,
    end_settle: Duration,
    reset_settle: Duration,
}

impl Calibration {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            state: CalibrationState::Idle,
            start_settle: config.calibration_start_settle,
            end_settle: config.calibration_end_settle,
            reset_settle: config.calibration_reset_settle,
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == CalibrationState::Done
    }

    /// 从 Done 回到 Idle，允许重新校准
    pub fn restart(&mut self) {
        self.state = CalibrationState::Idle;
    }

    /// 前进一步；Done 之后返回 None
    pub fn advance(&mut self) -> Option<CalibrationStep> {
        let (next, step) = match self.state {
            CalibrationState::Idle => (
                CalibrationState::StartSent,
                CalibrationStep {
                    frame: Some(calibration_frame(CALIBRATION_START)),
                    settle: self.start_settle,
                    reset_motor: false,
                },
            ),
            CalibrationState::StartSent => (
                CalibrationState::EndSent,
                CalibrationStep {
                    frame: Some(calibration_frame(CALIBRATION_END)),
                    settle: self.end_settle,
                    reset_motor: false,
                },
            ),
            CalibrationState::EndSent => (
                CalibrationState::Done,
                CalibrationStep {
                    frame: None,
                    settle: self.reset_settle,
                    reset_motor: true,
                },
            ),
            CalibrationState::Done => return None,
        };
        self.state = next;
        Some(step)
    }
}

impl Iterator for Calibration {
    type Item = CalibrationStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movehub_protocol::decode_combined;

    #[test]
    fn test_full_sequence() {
        let mut calibration = Calibration::new(&HubConfig::default());
        assert_eq!(calibration.state(), CalibrationState::Idle);

        let first = calibration.advance().unwrap();
        assert_eq!(calibration.state(), CalibrationState::StartSent);
        assert_eq!(first.settle, Duration::from_millis(2000));
        assert_eq!(first.frame.as_ref().unwrap().to_bytes()[11], 0x10);
        assert!(!first.reset_motor);

        let second = calibration.advance().unwrap();
        assert_eq!(calibration.state(), CalibrationState::EndSent);
        assert_eq!(second.settle, Duration::from_millis(500));
        assert_eq!(second.frame.as_ref().unwrap().to_bytes()[11], 0x08);

        let third = calibration.advance().unwrap();
        assert_eq!(calibration.state(), CalibrationState::Done);
        assert_eq!(third.settle, Duration::from_millis(300));
        assert!(third.frame.is_none());
        assert!(third.reset_motor);

        assert!(calibration.advance().is_none());
        assert!(calibration.is_done());
    }

    #[test]
    fn test_exactly_two_frames() {
        let frames: Vec<_> = Calibration::new(&HubConfig::default())
            .filter_map(|step| step.frame)
            .collect();
        assert_eq!(frames.len(), 2);
        // 校准帧的速度 / 转向 / 灯光字节都为 0，子命令在转向之后
        for frame in &frames {
            let (speed, steering, _) = decode_combined(frame).unwrap();
            assert_eq!((speed, steering), (0, 0));
        }
    }

    #[test]
    fn test_restart_after_done() {
        let mut calibration = Calibration::new(&HubConfig::default());
        while calibration.advance().is_some() {}
        calibration.restart();
        assert_eq!(calibration.state(), CalibrationState::Idle);
        assert_eq!(calibration.count(), 3);
    }
}

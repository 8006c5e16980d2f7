//! 控制循环
//!
//! 多个输入源通过有界通道把 [`InputEvent`] 送给唯一的消费者
//! [`ControlLoop`]。每个 tick：
//!
//! 1. `hub.settle(tick)`：等待一个 tick，期间分派 Hub 通知
//! 2. 取出通道中已积压的全部事件并合并
//! 3. 按顺序逐条执行，每条写入完成后再执行下一条
//!
//! 写入只发生在这一个任务里。

use crate::coalesce::Coalescer;
use crate::event::{InputEvent, InputKind};
use movehub_driver::{DriverError, Hub};
use movehub_transport::Transport;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// 默认 tick 周期
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

/// 默认输入通道容量
pub const DEFAULT_INPUT_CAPACITY: usize = 32;

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 控制循环已退出，输入无法送达
    #[error("Input channel closed")]
    ChannelClosed,
}

/// 控制循环退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// 收到 Quit 事件
    Quit,
    /// 所有输入源都已关闭
    InputClosed,
}

/// 输入源持有的发送端
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::Sender<InputEvent>,
}

impl InputSender {
    /// 发送事件（通道满时等待）
    pub async fn send(&self, event: InputEvent) -> Result<(), ControlError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ControlError::ChannelClosed)
    }

    /// 发送事件（阻塞线程，供同步输入线程使用）
    pub fn blocking_send(&self, event: InputEvent) -> Result<(), ControlError> {
        self.tx
            .blocking_send(event)
            .map_err(|_| ControlError::ChannelClosed)
    }

    /// 尝试发送；通道满时丢弃事件并返回 `Ok(false)`
    pub fn try_send(&self, event: InputEvent) -> Result<bool, ControlError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Input channel full, dropping {:?}", event.kind);
                Ok(false)
            },
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ControlError::ChannelClosed),
        }
    }

    /// 控制循环是否已退出
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// 单消费者控制循环
pub struct ControlLoop {
    rx: mpsc::Receiver<InputEvent>,
    tick: Duration,
}

/// 创建输入通道与控制循环
pub fn channel(capacity: usize, tick: Duration) -> (InputSender, ControlLoop) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (InputSender { tx }, ControlLoop { rx, tick })
}

impl ControlLoop {
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// 运行直到 Quit 或所有发送端关闭
    ///
    /// 写入失败时立即返回错误；调用方负责停车与断开。
    pub async fn run<T: Transport>(mut self, hub: &mut Hub<T>) -> Result<LoopExit, ControlError> {
        info!("Control loop started (tick {:?})", self.tick);
        let mut coalescer = Coalescer::new();
        loop {
            hub.settle(self.tick).await;

            let mut closed = false;
            loop {
                match self.rx.try_recv() {
                    Ok(event) => coalescer.push(event),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    },
                }
            }

            for event in coalescer.drain() {
                if apply(hub, event).await? {
                    info!("Control loop stopped by quit");
                    return Ok(LoopExit::Quit);
                }
            }

            if closed {
                info!("Control loop stopped: all inputs closed");
                return Ok(LoopExit::InputClosed);
            }
        }
    }
}

/// 执行一条事件；返回 true 表示退出
pub async fn apply<T: Transport>(hub: &mut Hub<T>, event: InputEvent) -> Result<bool, ControlError> {
    debug!("Input {:?}", event);
    match event.kind {
        InputKind::Drive => hub.drive(event.value).await?,
        InputKind::Steer => hub.steer(event.value).await?,
        InputKind::Stop => hub.stop().await?,
        InputKind::Brake => hub.brake().await?,
        InputKind::ReleaseBrake => hub.release_brake().await?,
        InputKind::ToggleLights => {
            let brightness = if hub.motor_state().lights > 0 {
                0
            } else if event.value > 0 {
                event.value
            } else {
                100
            };
            hub.set_lights(brightness).await?;
        },
        InputKind::Quit => return Ok(true),
    }
    Ok(false)
}

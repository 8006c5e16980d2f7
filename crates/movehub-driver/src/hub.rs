//! 会话控制器
//!
//! [`Hub`] 组合传输层、状态、命令编码器与校准序列。单任务模型：
//!
//! - 所有写入经由 `send_frame(&mut self)` 串行执行
//! - 所有等待（[`Hub::settle`]）期间持续接收并分派通知
//! - 因此电机状态与外设表不需要锁
//!
//! # 生命周期
//!
//! ```text
//! Disconnected ──connect──▶ PropertiesPending ──查询 + 等待 (+ 校准)──▶ Ready
//!       ▲                                                                  │
//!       └─────────────────────────── disconnect ───────────────────────────┘
//! ```

use crate::calibration::{Calibration, CalibrationState};
use crate::command::{CommandBatch, CommandEncoder, MotorState};
use crate::config::{HubConfig, SteeringPolicy};
use crate::error::DriverError;
use crate::hooks::{HookManager, MessageCallback};
use crate::state::{Dispatched, HubState, HubStatus};
use bytes::Bytes;
use movehub_protocol::{
    DecodeError, HUB_ACTION_SWITCH_OFF, HubFrame, KNOWN_PROPERTIES, Message, hub_action_frame,
    property_request_frame,
};
use movehub_transport::{Connector, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    /// 已连接，正在查询属性 / 等待外设挂载 / 校准
    PropertiesPending,
    Ready,
}

/// 一个 Hub 会话
pub struct Hub<T: Transport> {
    transport: T,
    notifications: Option<mpsc::Receiver<Bytes>>,
    config: HubConfig,
    state: HubState,
    encoder: CommandEncoder,
    calibration: Calibration,
    hooks: HookManager,
    phase: SessionPhase,
    warned_uncalibrated: bool,
}

impl<T: Transport> Hub<T> {
    /// 连接 Hub（默认配置）
    ///
    /// 依次：建立连接 → 订阅通知 → 查询属性 → 等待外设挂载 → （可选）校准。
    pub async fn connect<C>(connector: &C, address: &str, calibrate: bool) -> Result<Self, DriverError>
    where
        C: Connector<Transport = T>,
    {
        Self::connect_with_config(connector, address, calibrate, HubConfig::default()).await
    }

    /// 连接 Hub（自定义配置）
    pub async fn connect_with_config<C>(
        connector: &C,
        address: &str,
        calibrate: bool,
        config: HubConfig,
    ) -> Result<Self, DriverError>
    where
        C: Connector<Transport = T>,
    {
        info!("Connecting to hub {}", address);
        let transport = connector.connect(address).await?;
        let mut hub = Self::new(transport, config);
        if let Err(e) = hub.start(calibrate).await {
            // 握手失败时不留下半开的链路
            hub.phase = SessionPhase::Disconnected;
            if let Err(close_err) = hub.release_link().await {
                warn!("Failed to close {} after handshake error: {}", address, close_err);
            }
            return Err(e);
        }
        Ok(hub)
    }

    /// 用已建立的连接创建会话（尚未开始握手）
    pub fn new(transport: T, config: HubConfig) -> Self {
        let calibration = Calibration::new(&config);
        Self {
            transport,
            notifications: None,
            config,
            state: HubState::new(),
            encoder: CommandEncoder::new(),
            calibration,
            hooks: HookManager::new(),
            phase: SessionPhase::Disconnected,
            warned_uncalibrated: false,
        }
    }

    /// 执行连接握手
    pub async fn start(&mut self, calibrate: bool) -> Result<(), DriverError> {
        if !self.transport.is_connected().await {
            return Err(DriverError::NotConnected(format!(
                "failed to connect to {}",
                self.transport.address()
            )));
        }

        let rx = self
            .transport
            .subscribe(self.config.notification_capacity)
            .await?;
        self.notifications = Some(rx);
        self.phase = SessionPhase::PropertiesPending;

        self.query_properties().await?;
        self.settle(self.config.attach_settle).await;

        if calibrate {
            self.calibrate().await?;
        }

        self.phase = SessionPhase::Ready;
        info!(
            "Connected to {} ({})",
            self.state.name().unwrap_or("Unknown"),
            self.transport.address()
        );
        Ok(())
    }

    async fn query_properties(&mut self) -> Result<(), DriverError> {
        for id in KNOWN_PROPERTIES {
            self.send_frame(&property_request_frame(id)).await?;
            self.settle(self.config.property_query_gap).await;
        }
        Ok(())
    }

    // ========================================================================
    // 通知处理
    // ========================================================================

    /// 解析一条入站通知并更新状态
    ///
    /// 解析成功后触发所有回调。错误不会改变任何状态。
    pub fn dispatch(&mut self, raw: &[u8]) -> Result<Dispatched, DecodeError> {
        let message = Message::parse(raw)?;
        let dispatched = self.state.apply(&message);
        self.hooks.trigger_all(&message);
        Ok(dispatched)
    }

    /// 分派通知；解析失败时记录日志并丢弃该帧
    pub fn handle_notification(&mut self, raw: &[u8]) -> Option<Dispatched> {
        match self.dispatch(raw) {
            Ok(dispatched) => Some(dispatched),
            Err(e) => {
                debug!("Dropping notification {:02X?}: {}", raw, e);
                None
            },
        }
    }

    /// 等待 `duration`，期间持续分派通知
    pub async fn settle(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        let sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(sleep);

        loop {
            let Some(rx) = self.notifications.as_mut() else {
                (&mut sleep).await;
                return;
            };

            let received = tokio::select! {
                _ = &mut sleep => return,
                data = rx.recv() => data,
            };

            match received {
                Some(data) => {
                    self.handle_notification(&data);
                },
                None => {
                    warn!("Notification stream closed by transport");
                    self.notifications = None;
                },
            }
        }
    }

    /// 分派所有已到达的通知，不等待
    pub fn poll_notifications(&mut self) -> usize {
        let mut count = 0;
        while let Some(rx) = self.notifications.as_mut() {
            match rx.try_recv() {
                Ok(data) => {
                    self.handle_notification(&data);
                    count += 1;
                },
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    warn!("Notification stream closed by transport");
                    self.notifications = None;
                },
            }
        }
        count
    }

    // ========================================================================
    // 写入
    // ========================================================================

    /// 写入一帧（等待写入完成）
    pub async fn send_frame(&mut self, frame: &HubFrame) -> Result<(), DriverError> {
        if self.phase == SessionPhase::Disconnected {
            return Err(DriverError::NotConnected(self.transport.address().to_string()));
        }
        let bytes = frame.to_bytes();
        trace!("TX {:02X?}", bytes);
        self.transport.write(&bytes).await?;
        self.hooks.trigger_all_sent(frame);
        Ok(())
    }

    /// 按顺序写入一批帧
    pub async fn send_batch(&mut self, batch: CommandBatch) -> Result<(), DriverError> {
        for frame in batch {
            self.send_frame(&frame).await?;
        }
        Ok(())
    }

    // ========================================================================
    // 命令
    // ========================================================================

    /// 前进 / 后退（-100 ~ 100）
    pub async fn drive(&mut self, speed: i32) -> Result<(), DriverError> {
        debug!("drive({})", speed);
        let batch = self.encoder.set_drive(speed);
        self.send_batch(batch).await
    }

    /// 转向（-100 左 ~ 100 右）
    pub async fn steer(&mut self, angle: i32) -> Result<(), DriverError> {
        debug!("steer({})", angle);
        if !self.calibration.is_done() {
            match self.config.steering_policy {
                SteeringPolicy::Reject => return Err(DriverError::NotCalibrated),
                SteeringPolicy::Accept => {
                    if !self.warned_uncalibrated {
                        warn!("Steering before calibration; the wheels may not center correctly");
                        self.warned_uncalibrated = true;
                    }
                },
            }
        }
        let batch = self.encoder.set_steering(angle);
        self.send_batch(batch).await
    }

    /// 车灯亮度（0 ~ 100）
    pub async fn set_lights(&mut self, brightness: i32) -> Result<(), DriverError> {
        debug!("set_lights({})", brightness);
        let batch = self.encoder.set_lights(brightness);
        self.send_batch(batch).await
    }

    /// 滑行停车（灯光保持）
    pub async fn stop(&mut self) -> Result<(), DriverError> {
        debug!("stop()");
        let batch = self.encoder.stop();
        self.send_batch(batch).await
    }

    /// 刹车
    pub async fn brake(&mut self) -> Result<(), DriverError> {
        debug!("brake()");
        let batch = self.encoder.brake();
        self.send_batch(batch).await
    }

    /// 松开刹车
    pub async fn release_brake(&mut self) -> Result<(), DriverError> {
        debug!("release_brake()");
        let batch = self.encoder.release_brake();
        self.send_batch(batch).await
    }

    /// 执行转向校准
    ///
    /// 可以重复调用。中途写入失败时状态停在当前阶段，下次调用从头开始。
    pub async fn calibrate(&mut self) -> Result<(), DriverError> {
        info!("Calibrating steering");
        self.calibration.restart();
        while let Some(step) = self.calibration.advance() {
            if let Some(frame) = &step.frame {
                self.send_frame(frame).await?;
            }
            if step.reset_motor {
                self.encoder.reset();
            }
            self.settle(step.settle).await;
        }
        info!("Steering calibrated");
        Ok(())
    }

    /// 关闭 Hub 电源
    pub async fn shutdown(&mut self) -> Result<(), DriverError> {
        info!("Switching off hub");
        self.send_frame(&hub_action_frame(HUB_ACTION_SWITCH_OFF)).await
    }

    /// 断开连接（幂等）
    pub async fn disconnect(&mut self) -> Result<(), DriverError> {
        if self.phase == SessionPhase::Disconnected {
            return Ok(());
        }
        self.phase = SessionPhase::Disconnected;
        self.release_link().await?;
        info!("Disconnected from {}", self.transport.address());
        Ok(())
    }

    /// 取消订阅并关闭链路（不检查会话阶段）
    async fn release_link(&mut self) -> Result<(), DriverError> {
        self.notifications = None;
        if self.transport.is_connected().await {
            if let Err(e) = self.transport.unsubscribe().await {
                warn!("Failed to unsubscribe: {}", e);
            }
            self.transport.close().await?;
        }
        Ok(())
    }

    // ========================================================================
    // 查询
    // ========================================================================

    pub fn add_frame_callback(&mut self, callback: Arc<dyn MessageCallback>) {
        self.hooks.add_callback(callback);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &HubState {
        &self.state
    }

    pub fn motor_state(&self) -> MotorState {
        self.encoder.state()
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_done()
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn address(&self) -> &str {
        self.transport.address()
    }

    /// 会话与链路都处于连接状态
    pub async fn is_connected(&self) -> bool {
        self.phase != SessionPhase::Disconnected && self.transport.is_connected().await
    }

    /// 状态快照
    pub fn status(&self) -> HubStatus {
        HubStatus::from_state(
            &self.state,
            self.transport.address(),
            self.calibration.is_done(),
            self.encoder.state(),
        )
    }
}

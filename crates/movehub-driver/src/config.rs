//! 会话配置
//!
//! 所有默认值取自 Hub 的实测时序。

use std::time::Duration;

/// 属性查询之间的间隔
pub const DEFAULT_PROPERTY_QUERY_GAP: Duration = Duration::from_millis(50);

/// 属性查询完成后等待外设挂载通知的时长
pub const DEFAULT_ATTACH_SETTLE: Duration = Duration::from_millis(300);

/// 校准开始后的等待（转向机构寻找端点）
pub const DEFAULT_CALIBRATION_START_SETTLE: Duration = Duration::from_millis(2000);

/// 校准结束后的等待
pub const DEFAULT_CALIBRATION_END_SETTLE: Duration = Duration::from_millis(500);

/// 复位后的等待
pub const DEFAULT_CALIBRATION_RESET_SETTLE: Duration = Duration::from_millis(300);

/// 通知通道容量
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// 未校准时收到转向命令的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SteeringPolicy {
    /// 照常发送（首次记录一条警告）
    #[default]
    Accept,
    /// 拒绝，返回 `DriverError::NotCalibrated`
    Reject,
}

/// Hub 会话配置
///
/// 启用 `serde` feature 后可序列化；缺失的字段取默认值。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HubConfig {
    pub property_query_gap: Duration,
    pub attach_settle: Duration,
    pub calibration_start_settle: Duration,
    pub calibration_end_settle: Duration,
    pub calibration_reset_settle: Duration,
    pub notification_capacity: usize,
    pub steering_policy: SteeringPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            property_query_gap: DEFAULT_PROPERTY_QUERY_GAP,
            attach_settle: DEFAULT_ATTACH_SETTLE,
            calibration_start_settle: DEFAULT_CALIBRATION_START_SETTLE,
            calibration_end_settle: DEFAULT_CALIBRATION_END_SETTLE,
            calibration_reset_settle: DEFAULT_CALIBRATION_RESET_SETTLE,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            steering_policy: SteeringPolicy::Accept,
        }
    }
}

impl HubConfig {
    pub fn builder() -> HubConfigBuilder {
        HubConfigBuilder::new()
    }
}

/// HubConfig Builder（链式构造）
///
/// # Example
///
/// ```
/// use movehub_driver::{HubConfig, SteeringPolicy};
/// use std::time::Duration;
///
/// let config = HubConfig::builder()
///     .attach_settle(Duration::from_millis(500))
///     .steering_policy(SteeringPolicy::Reject)
///     .build();
/// assert_eq!(config.steering_policy, SteeringPolicy::Reject);
/// assert_eq!(config.property_query_gap, Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HubConfigBuilder {
    config: HubConfig,
}

impl HubConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_query_gap(mut self, gap: Duration) -> Self {
        self.config.property_query_gap = gap;
        self
    }

    pub fn attach_settle(mut self, settle: Duration) -> Self {
        self.config.attach_settle = settle;
        self
    }

    /// 校准三步的等待时长
    pub fn calibration_settle(mut self, start: Duration, end: Duration, reset: Duration) -> Self {
        self.config.calibration_start_settle = start;
        self.config.calibration_end_settle = end;
        self.config.calibration_reset_settle = reset;
        self
    }

    /// 通知通道容量（最小为 1）
    pub fn notification_capacity(mut self, capacity: usize) -> Self {
        self.config.notification_capacity = capacity.max(1);
        self
    }

    pub fn steering_policy(mut self, policy: SteeringPolicy) -> Self {
        self.config.steering_policy = policy;
        self
    }

    pub fn build(self) -> HubConfig {
        self.config
    }
}

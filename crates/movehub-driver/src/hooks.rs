//! 钩子系统（Hook System）
//!
//! 在入站消息解析完成、出站帧写入成功后触发自定义回调。
//!
//! # 使用示例
//!
//! ```rust
//! use movehub_driver::hooks::{HookManager, MessageCallback};
//! use movehub_protocol::{HubProperty, Message};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl MessageCallback for Counter {
//!     fn on_message_received(&self, _message: &Message) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = Arc::new(Counter(AtomicUsize::new(0)));
//! let mut hooks = HookManager::new();
//! hooks.add_callback(counter.clone());
//!
//! hooks.trigger_all(&Message::Property(HubProperty::Battery(90)));
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use movehub_protocol::{HubFrame, Message};
use std::sync::Arc;

/// 消息回调 Trait
///
/// 回调在会话任务内同步执行，实现应当尽快返回；耗时处理请转发到 channel
/// （例如 `tokio::sync::mpsc::Sender::try_send`）。
pub trait MessageCallback: Send + Sync {
    /// 收到并成功解析一条入站消息后调用
    ///
    /// 包括 `Message::Unrecognized`。解析失败的帧不会触发。
    fn on_message_received(&self, message: &Message);

    /// 出站帧写入成功后调用（可选）
    fn on_frame_sent(&self, frame: &HubFrame) {
        let _ = frame;
    }
}

/// 钩子管理器
///
/// 由 `Hub` 独占持有，只在会话任务内访问，不需要额外同步。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn MessageCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn MessageCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有入站回调
    pub fn trigger_all(&self, message: &Message) {
        for callback in self.callbacks.iter() {
            callback.on_message_received(message);
        }
    }

    /// 触发所有出站回调（写入成功之后）
    pub fn trigger_all_sent(&self, frame: &HubFrame) {
        for callback in self.callbacks.iter() {
            callback.on_frame_sent(frame);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movehub_protocol::{HUB_ACTION_SWITCH_OFF, HubProperty, hub_action_frame};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::mpsc::{Sender, channel};

    struct TestCallback {
        tx: Sender<Message>,
        count: Arc<AtomicU64>,
        sent: Arc<AtomicU64>,
    }

    impl MessageCallback for TestCallback {
        fn on_message_received(&self, message: &Message) {
            let _ = self.tx.try_send(message.clone());
            self.count.fetch_add(1, Ordering::Relaxed);
        }

        fn on_frame_sent(&self, _frame: &HubFrame) {
            self.sent.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn callback(tx: Sender<Message>) -> (Arc<TestCallback>, Arc<AtomicU64>, Arc<AtomicU64>) {
        let count = Arc::new(AtomicU64::new(0));
        let sent = Arc::new(AtomicU64::new(0));
        let callback = Arc::new(TestCallback {
            tx,
            count: count.clone(),
            sent: sent.clone(),
        });
        (callback, count, sent)
    }

    #[test]
    fn test_hook_manager_add_callback() {
        let mut hooks = HookManager::new();
        assert!(hooks.is_empty());

        let (tx, _rx) = channel(10);
        let (cb, _, _) = callback(tx);
        hooks.add_callback(cb);
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn test_hook_manager_trigger_all() {
        let mut hooks = HookManager::new();
        let (tx, mut rx) = channel(10);
        let (cb, count, _) = callback(tx);
        hooks.add_callback(cb);

        let message = Message::Property(HubProperty::Battery(42));
        hooks.trigger_all(&message);

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(rx.try_recv().unwrap(), message);
    }

    #[test]
    fn test_hook_manager_trigger_sent() {
        let mut hooks = HookManager::new();
        let (tx, mut rx) = channel(10);
        let (cb, count, sent) = callback(tx);
        hooks.add_callback(cb);

        hooks.trigger_all_sent(&hub_action_frame(HUB_ACTION_SWITCH_OFF));

        assert_eq!(sent.load(Ordering::Relaxed), 1);
        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_hook_manager_clear() {
        let mut hooks = HookManager::new();
        let (tx, _rx) = channel(10);
        let (cb, _, _) = callback(tx);
        hooks.add_callback(cb);
        assert_eq!(hooks.len(), 1);

        hooks.clear();
        assert!(hooks.is_empty());
    }
}

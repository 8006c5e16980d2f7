//! 按 tick 合并输入
//!
//! 一个 tick 内同类事件只保留最后一个；结果按各类事件最后一次出现的
//! 顺序排列。这样按住按键产生的重复事件不会在写入队列里堆积。

use crate::event::InputEvent;

#[derive(Debug, Clone, Default)]
pub struct Coalescer {
    pending: Vec<InputEvent>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.retain(|e| e.kind != event.kind);
        self.pending.push(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 取出本 tick 的合并结果并清空
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl Extend<InputEvent> for Coalescer {
    fn extend<I: IntoIterator<Item = InputEvent>>(&mut self, iter: I) {
        for event in iter {
            self.push(event);
        }
    }
}

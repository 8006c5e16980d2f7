//! 内存 Mock 后端
//!
//! [`MockHub`] 是测试侧句柄，[`MockTransport`] 是交给 driver 的连接，两者
//! 共享同一份状态：
//!
//! - 测试通过 `MockHub::inject()` 注入通知（订阅前注入的会在订阅时补发）
//! - driver 的每次写入记录在 `written` 中，可用 `take_written()` 取出
//! - `set_responder()` 可以为写入自动生成应答，模拟 Hub 行为

use crate::{Connector, Discovery, HubAdvertisement, Transport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    connected: bool,
    refuse_connect: bool,
    report_disconnected: bool,
    fail_writes: bool,
    written: Vec<Vec<u8>>,
    pending: VecDeque<Bytes>,
    notify_tx: Option<mpsc::Sender<Bytes>>,
    responder: Option<Responder>,
    subscribe_count: usize,
    close_count: usize,
}

impl MockState {
    fn deliver(&mut self, data: Bytes) {
        match &self.notify_tx {
            Some(tx) => {
                if tx.try_send(data).is_err() {
                    tracing::warn!("Mock notification dropped (channel full or closed)");
                }
            },
            None => self.pending.push_back(data),
        }
    }
}

/// 测试侧句柄
#[derive(Clone, Default)]
pub struct MockHub {
    state: Arc<Mutex<MockState>>,
}

impl MockHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注入一条通知
    pub fn inject(&self, data: impl Into<Vec<u8>>) {
        self.state.lock().deliver(Bytes::from(data.into()));
    }

    /// 取出迄今为止的所有写入
    pub fn take_written(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.state.lock().written)
    }

    /// 查看写入（不清空）
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// 为每次写入生成应答帧
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.state.lock().responder = Some(Box::new(responder));
    }

    /// 让 `Connector::connect` 直接失败
    pub fn refuse_connect(&self, refuse: bool) {
        self.state.lock().refuse_connect = refuse;
    }

    /// 连接成功但 `is_connected()` 返回 false
    pub fn report_disconnected(&self, report: bool) {
        self.state.lock().report_disconnected = report;
    }

    /// 让后续写入返回错误
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// 模拟链路断开
    pub fn drop_link(&self) {
        let mut state = self.state.lock();
        state.connected = false;
        state.notify_tx = None;
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().notify_tx.is_some()
    }

    pub fn subscribe_count(&self) -> usize {
        self.state.lock().subscribe_count
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    fn open(&self, address: &str) -> Result<MockTransport, TransportError> {
        let mut state = self.state.lock();
        if state.refuse_connect {
            return Err(TransportError::DeviceNotFound(address.to_string()));
        }
        state.connected = !state.report_disconnected;
        Ok(MockTransport {
            hub: self.clone(),
            address: address.to_string(),
        })
    }
}

/// 交给 driver 的 Mock 连接
pub struct MockTransport {
    hub: MockHub,
    address: String,
}

impl MockTransport {
    /// 对应的测试侧句柄
    pub fn hub(&self) -> &MockHub {
        &self.hub
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.hub.state.lock();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        if state.fail_writes {
            return Err(TransportError::Backend("mock write failure".to_string()));
        }
        state.written.push(data.to_vec());

        let replies = match state.responder.as_mut() {
            Some(responder) => responder(data),
            None => Vec::new(),
        };
        for reply in replies {
            state.deliver(Bytes::from(reply));
        }
        Ok(())
    }

    async fn subscribe(&mut self, capacity: usize) -> Result<mpsc::Receiver<Bytes>, TransportError> {
        let mut state = self.hub.state.lock();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        let (tx, rx) = mpsc::channel(capacity.max(1));
        state.notify_tx = Some(tx);
        state.subscribe_count += 1;
        while let Some(data) = state.pending.pop_front() {
            state.deliver(data);
        }
        Ok(rx)
    }

    async fn unsubscribe(&mut self) -> Result<(), TransportError> {
        self.hub.state.lock().notify_tx = None;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.hub.state.lock().connected
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.hub.state.lock();
        state.connected = false;
        state.notify_tx = None;
        state.close_count += 1;
        Ok(())
    }

    fn address(&self) -> &str {
        &self.address
    }
}

/// Mock 连接工厂
#[derive(Clone, Default)]
pub struct MockConnector {
    hub: MockHub,
}

impl MockConnector {
    pub fn new(hub: MockHub) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &MockHub {
        &self.hub
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, address: &str) -> Result<MockTransport, TransportError> {
        self.hub.open(address)
    }
}

/// 返回固定列表的 Mock 扫描器
#[derive(Clone, Default)]
pub struct MockDiscovery {
    hubs: Vec<HubAdvertisement>,
}

impl MockDiscovery {
    pub fn new(hubs: Vec<HubAdvertisement>) -> Self {
        Self { hubs }
    }
}

#[async_trait]
impl Discovery for MockDiscovery {
    async fn scan(&self, timeout: Duration) -> Result<Vec<HubAdvertisement>, TransportError> {
        tokio::time::sleep(timeout).await;
        Ok(self.hubs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_recorded() {
        let hub = MockHub::new();
        let mut transport = MockConnector::new(hub.clone()).connect("mock").await.unwrap();
        assert!(transport.is_connected().await);
        assert_eq!(transport.address(), "mock");

        transport.write(&[0x04, 0x00, 0x02, 0x01]).await.unwrap();
        assert_eq!(hub.take_written(), vec![vec![0x04, 0x00, 0x02, 0x01]]);
        assert!(hub.take_written().is_empty());
    }

    #[tokio::test]
    async fn test_pending_notifications_delivered_on_subscribe() {
        let hub = MockHub::new();
        let mut transport = MockConnector::new(hub.clone()).connect("mock").await.unwrap();
        hub.inject(vec![0x05, 0x00, 0x04, 0x32, 0x00]);

        let mut rx = transport.subscribe(8).await.unwrap();
        assert!(hub.is_subscribed());
        assert_eq!(rx.recv().await.unwrap().as_ref(), &[0x05, 0x00, 0x04, 0x32, 0x00]);

        hub.inject(vec![0x03, 0x00, 0x01]);
        assert_eq!(rx.recv().await.unwrap().as_ref(), &[0x03, 0x00, 0x01]);
    }

    #[tokio::test]
    async fn test_responder_replies_to_writes() {
        let hub = MockHub::new();
        hub.set_responder(|data| {
            if data.get(2) == Some(&0x01) {
                vec![vec![0x06, 0x00, 0x01, data[3], 0x06, 0x5A]]
            } else {
                Vec::new()
            }
        });
        let mut transport = MockConnector::new(hub.clone()).connect("mock").await.unwrap();
        let mut rx = transport.subscribe(8).await.unwrap();

        transport.write(&[0x05, 0x00, 0x01, 0x06, 0x05]).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap().as_ref(),
            &[0x06, 0x00, 0x01, 0x06, 0x06, 0x5A]
        );
    }

    #[tokio::test]
    async fn test_close_ends_notification_stream() {
        let hub = MockHub::new();
        let mut transport = MockConnector::new(hub.clone()).connect("mock").await.unwrap();
        let mut rx = transport.subscribe(8).await.unwrap();

        transport.close().await.unwrap();
        assert!(rx.recv().await.is_none());
        assert!(!transport.is_connected().await);
        assert_eq!(hub.close_count(), 1);
        assert!(matches!(
            transport.write(&[0x03, 0x00, 0x02]).await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_refuse_connect() {
        let hub = MockHub::new();
        hub.refuse_connect(true);
        let result = MockConnector::new(hub).connect("AA:BB").await;
        assert!(matches!(result, Err(TransportError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let hub = MockHub::new();
        let mut transport = MockConnector::new(hub.clone()).connect("mock").await.unwrap();
        hub.fail_writes(true);
        assert!(matches!(
            transport.write(&[0x03, 0x00, 0x02]).await,
            Err(TransportError::Backend(_))
        ));
        assert!(hub.written().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_discovery_waits_for_timeout() {
        let discovery = MockDiscovery::new(vec![HubAdvertisement::new("AA:BB", None)]);
        let start = tokio::time::Instant::now();
        let hubs = discovery.scan(Duration::from_secs(5)).await.unwrap();
        assert_eq!(hubs.len(), 1);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}

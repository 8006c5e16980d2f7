//! btleplug 蓝牙后端
//!
//! 通过系统蓝牙栈扫描、连接 Hub，写命令使用 Write Without Response，
//! 通知由后台任务转发到有界通道。

use crate::{
    Connector, Discovery, HUB_CHARACTERISTIC_UUID, HUB_SERVICE_UUID, HubAdvertisement,
    LEGO_MANUFACTURER_ID, ManufacturerData, Transport, TransportError,
};
use async_trait::async_trait;
use btleplug::api::{
    Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// 连接时查找目标设备的扫描时长
const CONNECT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

impl From<btleplug::Error> for TransportError {
    fn from(e: btleplug::Error) -> Self {
        TransportError::Backend(e.to_string())
    }
}

fn hub_service() -> Result<Uuid, TransportError> {
    Uuid::parse_str(HUB_SERVICE_UUID).map_err(|e| TransportError::Backend(e.to_string()))
}

fn hub_characteristic() -> Result<Uuid, TransportError> {
    Uuid::parse_str(HUB_CHARACTERISTIC_UUID).map_err(|e| TransportError::Backend(e.to_string()))
}

/// 取系统第一个蓝牙适配器
async fn first_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await?;
    manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::DeviceNotFound("no Bluetooth adapter".to_string()))
}

/// 扫描 `timeout` 后返回所有带 LEGO 厂商数据的外设
async fn scan_hubs(
    adapter: &Adapter,
    timeout: Duration,
) -> Result<Vec<(HubAdvertisement, Peripheral)>, TransportError> {
    adapter
        .start_scan(ScanFilter {
            services: vec![hub_service()?],
        })
        .await?;
    tokio::time::sleep(timeout).await;
    adapter.stop_scan().await?;

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for peripheral in adapter.peripherals().await? {
        let Some(props) = peripheral.properties().await? else {
            continue;
        };
        let Some(data) = props.manufacturer_data.get(&LEGO_MANUFACTURER_ID) else {
            continue;
        };
        let address = props.address.to_string();
        if !seen.insert(address.clone()) {
            continue;
        }
        let manufacturer = ManufacturerData::decode(data).ok();
        trace!("Advertisement from {}: {:02X?}", address, data);
        found.push((
            HubAdvertisement {
                address,
                name: props.local_name,
                rssi: props.rssi,
                manufacturer,
            },
            peripheral,
        ));
    }
    Ok(found)
}

/// 蓝牙扫描器
pub struct BleDiscovery {
    adapter: Adapter,
}

impl BleDiscovery {
    pub async fn new() -> Result<Self, TransportError> {
        Ok(Self {
            adapter: first_adapter().await?,
        })
    }
}

#[async_trait]
impl Discovery for BleDiscovery {
    async fn scan(&self, timeout: Duration) -> Result<Vec<HubAdvertisement>, TransportError> {
        info!("Scanning for hubs ({:?})", timeout);
        let hubs = scan_hubs(&self.adapter, timeout)
            .await?
            .into_iter()
            .map(|(adv, _)| adv)
            .collect::<Vec<_>>();
        info!("Found {} hub(s)", hubs.len());
        Ok(hubs)
    }
}

/// 蓝牙连接工厂
pub struct BleConnector {
    adapter: Adapter,
    scan_timeout: Duration,
}

impl BleConnector {
    pub async fn new() -> Result<Self, TransportError> {
        Ok(Self {
            adapter: first_adapter().await?,
            scan_timeout: CONNECT_SCAN_TIMEOUT,
        })
    }

    /// 设置查找目标设备的扫描时长
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }
}

#[async_trait]
impl Connector for BleConnector {
    type Transport = BleTransport;

    async fn connect(&self, address: &str) -> Result<BleTransport, TransportError> {
        let peripheral = scan_hubs(&self.adapter, self.scan_timeout)
            .await?
            .into_iter()
            .find(|(adv, _)| adv.address.eq_ignore_ascii_case(address))
            .map(|(_, p)| p)
            .ok_or_else(|| TransportError::DeviceNotFound(address.to_string()))?;

        info!("Connecting to {}", address);
        peripheral.connect().await?;

        let characteristic = match find_hub_characteristic(&peripheral).await {
            Ok(characteristic) => characteristic,
            Err(e) => {
                if let Err(disconnect_err) = peripheral.disconnect().await {
                    warn!("Failed to disconnect {}: {}", address, disconnect_err);
                }
                return Err(e);
            },
        };

        Ok(BleTransport {
            peripheral,
            characteristic,
            address: address.to_string(),
            forwarder: None,
        })
    }
}

/// 发现服务并查找 Hub 特征
async fn find_hub_characteristic(peripheral: &Peripheral) -> Result<Characteristic, TransportError> {
    peripheral.discover_services().await?;
    let uuid = hub_characteristic()?;
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or_else(|| TransportError::Backend(format!("characteristic {} not found", uuid)))
}

/// 已连接的蓝牙 Hub
pub struct BleTransport {
    peripheral: Peripheral,
    characteristic: Characteristic,
    address: String,
    forwarder: Option<JoinHandle<()>>,
}

impl BleTransport {
    fn stop_forwarder(&mut self) {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        trace!("TX {:02X?}", data);
        self.peripheral
            .write(&self.characteristic, data, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn subscribe(&mut self, capacity: usize) -> Result<mpsc::Receiver<Bytes>, TransportError> {
        self.stop_forwarder();
        self.peripheral.subscribe(&self.characteristic).await?;
        let mut stream = self.peripheral.notifications().await?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let uuid = self.characteristic.uuid;
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid != uuid {
                    continue;
                }
                if tx.send(Bytes::from(notification.value)).await.is_err() {
                    debug!("Notification receiver dropped, stopping forwarder");
                    break;
                }
            }
        }));
        Ok(rx)
    }

    async fn unsubscribe(&mut self) -> Result<(), TransportError> {
        self.stop_forwarder();
        self.peripheral.unsubscribe(&self.characteristic).await?;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        match self.peripheral.is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!("Failed to query connection state: {}", e);
                false
            },
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stop_forwarder();
        self.peripheral.disconnect().await?;
        info!("Disconnected from {}", self.address);
        Ok(())
    }

    fn address(&self) -> &str {
        &self.address
    }
}

impl Drop for BleTransport {
    fn drop(&mut self) {
        self.stop_forwarder();
    }
}

//! 状态查询

use anyhow::Result;
use movehub_driver::{Hub, HubStatus};
use movehub_transport::Transport;

/// 打印 Hub 状态
pub async fn execute<T: Transport>(hub: &mut Hub<T>, json: bool) -> Result<()> {
    let status = hub.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render(&status));
    }
    Ok(())
}

/// 文本格式的状态
pub fn render(status: &HubStatus) -> String {
    let unknown = || "unknown".to_string();
    let mut out = String::new();

    out.push_str(&format!("\n  Hub: {}\n", status.name.clone().unwrap_or_else(unknown)));
    out.push_str(&format!("  Address: {}\n", status.address));
    out.push_str(&format!(
        "  Battery: {}\n",
        status.battery.map(|b| format!("{}%", b)).unwrap_or_else(unknown)
    ));
    out.push_str(&format!("  Firmware: {}\n", status.firmware.clone().unwrap_or_else(unknown)));
    out.push_str(&format!("  Hardware: {}\n", status.hardware.clone().unwrap_or_else(unknown)));
    if let Some(manufacturer) = &status.manufacturer {
        out.push_str(&format!("  Manufacturer: {}\n", manufacturer));
    }
    if let Some(encoder) = status.steering_encoder {
        out.push_str(&format!("  Steering encoder: {}\n", encoder));
    }

    if !status.attached_io.is_empty() {
        out.push_str("\n  Attached I/O:\n");
        for io in &status.attached_io {
            out.push_str(&format!("    Port {}: {}\n", io.port, io.device));
        }
    }
    out
}

//! 交互式驾驶
//!
//! 终端进入 raw 模式，专用线程读取按键并通过 [`InputSender`] 送入
//! [`ControlLoop`]；Hub 的所有写入都发生在控制循环中。

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use movehub_control::{
    ControlLoop, DEFAULT_INPUT_CAPACITY, DEFAULT_TICK, InputSender, LoopExit, TeleopKey,
    TeleopState, channel,
};
use movehub_driver::Hub;
use movehub_transport::Transport;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// 读取按键的轮询周期，同时也是检查控制循环是否退出的周期
const KEY_POLL: Duration = Duration::from_millis(100);

const HELP: &str = "\
Interactive mode:
  Arrow keys or w/a/s/d - drive & steer
  Space or x - stop (coast)
  b - brake (quick stop)
  l - toggle lights
  q - quit
";

/// 终端按键 → 遥控按键
pub fn map_key(key: &KeyEvent) -> Option<TeleopKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(TeleopKey::Forward),
        KeyCode::Down => Some(TeleopKey::Backward),
        KeyCode::Left => Some(TeleopKey::Left),
        KeyCode::Right => Some(TeleopKey::Right),
        KeyCode::Esc => Some(TeleopKey::Quit),
        // raw 模式下 Ctrl+C 只是一个按键
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TeleopKey::Quit)
        },
        KeyCode::Char(c) => TeleopKey::from_char(c),
        _ => None,
    }
}

/// raw 模式守卫，离开作用域时恢复终端
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("无法进入终端 raw 模式")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// 运行交互式驾驶，退出前停车
pub async fn execute<T: Transport>(hub: &mut Hub<T>) -> Result<()> {
    println!("Connected to {}!", hub.state().name().unwrap_or("hub"));
    println!("Ready!\n");
    println!("{}", HELP);

    let (input, control) = channel(DEFAULT_INPUT_CAPACITY, DEFAULT_TICK);
    let result = {
        let _raw = RawMode::enable()?;
        let reader = tokio::task::spawn_blocking(move || read_keys(input));
        let result = drive_loop(control, hub).await;
        // 控制循环退出后发送端关闭，读取线程在下一个轮询周期结束
        drop(reader);
        result
    };
    println!();

    hub.stop().await?;
    println!("Stopped.");
    result
}

async fn drive_loop<T: Transport>(control: ControlLoop, hub: &mut Hub<T>) -> Result<()> {
    match control.run(hub).await? {
        LoopExit::Quit => info!("Quit requested"),
        LoopExit::InputClosed => info!("Keyboard input closed"),
    }
    Ok(())
}

/// 按键读取线程
fn read_keys(input: InputSender) {
    let mut state = TeleopState::new();
    loop {
        if input.is_closed() {
            return;
        }
        match event::poll(KEY_POLL) {
            Ok(true) => {},
            Ok(false) => continue,
            Err(e) => {
                debug!("Terminal poll failed: {}", e);
                return;
            },
        }

        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                debug!("Terminal read failed: {}", e);
                return;
            },
        };
        let Some(key) = map_key(&key) else {
            continue;
        };

        let event = state.handle(key);
        print!("\r{}      ", state.status_line());
        let _ = std::io::stdout().flush();

        if input.blocking_send(event).is_err() || key == TeleopKey::Quit {
            return;
        }
    }
}

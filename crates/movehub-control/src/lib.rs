//! # MoveHub Control
//!
//! 输入层：把键盘 / 手柄输入转换为抽象事件，并由单一控制循环按 tick
//! 合并后写入 Hub。
//!
//! ```text
//! keyboard ─┐
//!           ├─▶ InputSender ──(bounded mpsc)──▶ ControlLoop ──▶ Hub
//! gamepad ──┘                                   (coalesce per tick)
//! ```

pub mod coalesce;
pub mod control_loop;
pub mod event;
pub mod gamepad;
pub mod teleop;

pub use coalesce::Coalescer;
pub use control_loop::{
    ControlError, ControlLoop, DEFAULT_INPUT_CAPACITY, DEFAULT_TICK, InputSender, LoopExit, apply,
    channel,
};
pub use event::{InputEvent, InputKind};
pub use gamepad::{GamepadAxis, GamepadState, normalize_stick, normalize_trigger};
pub use teleop::{TeleopKey, TeleopState};

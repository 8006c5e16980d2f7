//! # MoveHub CLI
//!
//! LEGO Technic Move Hub 命令行遥控工具。
//!
//! ```bash
//! # 扫描并保存默认 Hub
//! movehub-cli scan
//!
//! # 单次命令（内部：连接 -> 执行 -> 断开）
//! movehub-cli drive 50 --duration 2
//! movehub-cli steer -30
//! movehub-cli status --json
//!
//! # 键盘交互驾驶
//! movehub-cli run
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

// 未启用 ble 时连接类命令只在测试中使用
#[cfg_attr(not(feature = "ble"), allow(dead_code))]
mod commands;
mod config;
mod session;

use commands::{ConfigCommand, HubCommand, ScanCommand};
use config::CliConfig;

/// MoveHub CLI - LEGO Technic Move Hub 遥控工具
#[derive(Parser, Debug)]
#[command(name = "movehub-cli")]
#[command(about = "Remote control for LEGO Technic Move Hub", long_about = None)]
#[command(version)]
struct Cli {
    /// Hub 地址（覆盖已保存的默认 Hub）
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描附近的 Hub
    Scan(ScanCommand),

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    #[command(flatten)]
    Hub(HubCommand),
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "movehub_cli=debug,movehub_driver=debug,movehub_transport=debug"
    } else {
        "movehub_cli=info,movehub_driver=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = config::config_path()?;

    match cli.command {
        Commands::Scan(cmd) => session::scan(&cmd, &config_path).await,

        Commands::Config(cmd) => cmd.execute(&config_path),

        Commands::Hub(cmd) => {
            let config = CliConfig::load_from(&config_path)?;
            let address = config::resolve_address(cli.address.as_deref(), &config)?;
            session::run_hub_command(&address, cmd).await
        },
    }
}

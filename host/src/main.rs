//! 对话运行时 - Host（终端前端）
//!
//! 从终端或命令文件读取命令，逐帧驱动对话运行时。

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use host::{AppConfig, AppState, Flow, HostCommand};
use tracing::{Level, error};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "dialogue-host", about = "对话运行时终端宿主")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// 批处理模式：从文件读取命令
    #[arg(long)]
    commands: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 配置加载期间使用临时日志，之后再按配置的级别初始化
    let config = tracing::subscriber::with_default(
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(Level::INFO)
            .finish(),
        || AppConfig::load(&cli.config),
    );

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "配置无效");
        return ExitCode::FAILURE;
    }

    let mut app = match AppState::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "启动失败");
            return ExitCode::FAILURE;
        }
    };

    let reader: Box<dyn BufRead> = match &cli.commands {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "无法打开命令文件");
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    match run(&mut app, reader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "读取输入失败");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &mut AppState, reader: Box<dyn BufRead>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();

    for line in reader.lines() {
        let line = line?;
        if line.trim_start().starts_with('#') {
            continue;
        }

        let flow = match HostCommand::parse(&line) {
            Ok(command) => app.execute(command),
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                Flow::Continue
            }
        };

        for out in app.take_output() {
            writeln!(stdout, "{}", out)?;
        }
        stdout.flush()?;

        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}

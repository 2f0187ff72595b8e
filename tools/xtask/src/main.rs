//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 dialogue-runtime 覆盖率
//! - `content-check`: 检查内容包（脚本引用、标签、立绘、标记）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialogue_runtime::{ContentPack, DiagnosticResult, analyze_content};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 dialogue-runtime 覆盖率报告
    CovRuntime,
    /// 检查内容包；不带参数时检查 host/assets/ 下所有 .json 文件
    ContentCheck { path: Option<PathBuf> },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Task::CheckAll => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Task::CovRuntime => {
            if cmd!(sh, "cargo llvm-cov --version")
                .quiet()
                .ignore_stdout()
                .run()
                .is_err()
            {
                anyhow::bail!(
                    "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
                );
            }

            eprintln!("\n==> cargo llvm-cov -p dialogue-runtime --html");
            cmd!(sh, "cargo llvm-cov -p dialogue-runtime --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Task::ContentCheck { path } => content_check(path.as_deref())?,
    }

    Ok(())
}

//=============================================================================
// content-check 命令实现
//=============================================================================

/// 默认内容目录（相对于 workspace root）
const DEFAULT_CONTENT_DIR: &str = "host/assets";

/// 内容检查结果
#[derive(Default)]
struct ContentCheckResult {
    packs_checked: usize,
    parse_errors: usize,
    diagnostics: DiagnosticResult,
}

fn content_check(path: Option<&Path>) -> anyhow::Result<()> {
    let root = path.unwrap_or(Path::new(DEFAULT_CONTENT_DIR));
    if !root.exists() {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定内容包路径",
            root.display()
        );
    }

    let files = collect_content_files(root);
    if files.is_empty() {
        eprintln!("未找到内容包（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个内容包...\n", files.len());

    let mut result = ContentCheckResult::default();
    for file in &files {
        check_content_file(file, &mut result);
    }

    print_check_result(&result);

    if result.parse_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("内容检查发现错误");
    }
    Ok(())
}

fn collect_content_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_content_file(file: &Path, result: &mut ContentCheckResult) {
    let name = file.display().to_string();
    result.packs_checked += 1;

    let json = match std::fs::read_to_string(file) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", name, e);
            result.parse_errors += 1;
            return;
        }
    };

    match ContentPack::from_json(&json) {
        Ok(pack) => result.diagnostics.merge(analyze_content(&pack)),
        Err(e) => {
            eprintln!("[ERROR] {}: {}", name, e);
            result.parse_errors += 1;
        }
    }
}

fn print_check_result(result: &ContentCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个内容包", result.packs_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{}", diag);
    }

    let error_count = result.parse_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}

//! # 诊断模块
//!
//! 内容包的静态检查，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 复用运行时的标签解析，不重复解析逻辑

use std::collections::{HashMap, HashSet};

use crate::content::ContentPack;
use crate::presentation::Tag;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// 位置：`source:<id>` 或 `script:<id>`
    pub location: String,
    /// 节点索引或行号（从 0 开始的节点索引 / 从 1 开始的行号）
    pub line: Option<usize>,
    pub message: String,
    /// 详情（可选，如原始标签）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            location: location.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, location, message)
    }

    pub fn warn(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, location, message)
    }

    pub fn info(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, location, message)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.location)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按最低级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }

    /// 渲染为多行报告
    pub fn report(&self) -> String {
        self.diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 检查内容包
///
/// 检查项：
/// - 对话来源：稳定 ID 为空或重复、引用不存在的脚本、`max_plays = 0`、
///   被无条件节点遮挡的节点、没有任何节点解锁的前置标记
/// - 脚本：格式错误的标签、未识别的标签键、不存在的立绘、未被引用的脚本
pub fn analyze_content(pack: &ContentPack) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();
    analyze_sources(pack, &mut result);
    analyze_scripts(pack, &mut result);
    result
}

fn analyze_sources(pack: &ContentPack, result: &mut DiagnosticResult) {
    let script_ids: HashSet<&str> = pack.scripts.iter().map(|s| s.id.as_str()).collect();
    let unlocked: HashSet<&str> = pack
        .sources
        .iter()
        .flat_map(|s| s.slots().flatten())
        .flat_map(|n| n.unlocks_flags.iter().map(String::as_str))
        .collect();

    let mut id_counts: HashMap<&str, usize> = HashMap::new();
    for source in &pack.sources {
        if !source.stable_id.is_empty() {
            *id_counts.entry(source.stable_id.as_str()).or_insert(0) += 1;
        }
    }

    let mut reported_ids = HashSet::new();
    for source in &pack.sources {
        let location = if source.stable_id.is_empty() {
            format!("source:{}", source.display_name)
        } else {
            format!("source:{}", source.stable_id)
        };

        if source.stable_id.is_empty() {
            result.push(Diagnostic::warn(
                &location,
                "稳定 ID 为空，播放计数无法存档",
            ));
        } else if id_counts.get(source.stable_id.as_str()).copied().unwrap_or(0) > 1
            && reported_ids.insert(source.stable_id.as_str())
        {
            result.push(Diagnostic::error(&location, "稳定 ID 重复，播放计数会互相覆盖"));
        }

        if source.slots().all(|slot| slot.is_none()) {
            result.push(Diagnostic::info(&location, "没有任何对话节点"));
            continue;
        }

        let mut shadowed_by: Option<usize> = None;
        for (index, node) in source
            .slots()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|n| (i, n)))
        {
            if let Some(blocker) = shadowed_by {
                result.push(
                    Diagnostic::warn(&location, format!("节点永远不会被选中（被节点 {} 遮挡）", blocker))
                        .with_line(index),
                );
            }

            if !script_ids.contains(node.script.as_str()) {
                result.push(
                    Diagnostic::error(&location, format!("引用了不存在的脚本 '{}'", node.script))
                        .with_line(index),
                );
            }

            if node.max_plays == 0 {
                result.push(
                    Diagnostic::warn(&location, "max_plays 为 0，节点永远不会被选中")
                        .with_line(index),
                );
            }

            for flag in node.required_flags.iter().filter(|f| !f.is_empty()) {
                if !unlocked.contains(flag.as_str()) {
                    result.push(
                        Diagnostic::warn(
                            &location,
                            format!("前置标记 '{}' 没有任何节点解锁", flag),
                        )
                        .with_line(index),
                    );
                }
            }

            let unconditional = node.required_flags.iter().all(String::is_empty);
            if shadowed_by.is_none() && unconditional && node.max_plays < 0 {
                shadowed_by = Some(index);
            }
        }
    }
}

fn analyze_scripts(pack: &ContentPack, result: &mut DiagnosticResult) {
    let sprites: HashSet<&str> = pack.sprites.iter().map(String::as_str).collect();
    let referenced: HashSet<&str> = pack
        .sources
        .iter()
        .flat_map(|s| s.slots().flatten())
        .map(|n| n.script.as_str())
        .collect();

    for script in &pack.scripts {
        let location = format!("script:{}", script.id);

        if !referenced.contains(script.id.as_str()) {
            result.push(Diagnostic::info(&location, "脚本没有被任何节点引用"));
        }

        for (i, line) in script.lines.iter().enumerate() {
            let line_no = i + 1;
            for raw in &line.tags {
                match Tag::parse(raw) {
                    None => result.push(
                        Diagnostic::warn(&location, "标签格式错误，应为 key: value")
                            .with_line(line_no)
                            .with_detail(raw.as_str()),
                    ),
                    Some(Tag::Sprite(name)) | Some(Tag::ThirdSprite(name)) => {
                        if !sprites.contains(name.as_str()) {
                            result.push(
                                Diagnostic::error(&location, format!("立绘 '{}' 不存在", name))
                                    .with_line(line_no),
                            );
                        }
                    }
                    Some(Tag::Unknown { key, .. }) => result.push(
                        Diagnostic::info(&location, format!("未识别的标签键 '{}'", key))
                            .with_line(line_no),
                    ),
                    Some(Tag::Speaker(_)) => {}
                }
            }
        }
    }
}

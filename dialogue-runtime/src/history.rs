//! # History 模块
//!
//! 历史记录数据模型，用于回看已经显示过的对话。
//!
//! ## 设计原则
//!
//! - 记录已显示的对话行和被选中的对话节点
//! - 所有数据可序列化，与存档系统对齐
//! - 不记录临时状态（打字机进度、跳动动画）

use serde::{Deserialize, Serialize};

/// 默认最多记录的事件数
const DEFAULT_MAX_EVENTS: usize = 1000;

/// 历史事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 一行对话
    Line {
        /// 说话者（None 表示旁白）
        speaker: Option<String>,
        /// 对话内容
        text: String,
        /// 时间戳（Unix 秒）
        timestamp: u64,
    },

    /// 对话节点被选中
    NodePlayed {
        /// 对话来源名称
        source: String,
        /// 播放的脚本
        script: String,
        /// 时间戳
        timestamp: u64,
    },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> u64 {
        match self {
            HistoryEvent::Line { timestamp, .. } => *timestamp,
            HistoryEvent::NodePlayed { timestamp, .. } => *timestamp,
        }
    }

    /// 创建对话事件
    pub fn line(speaker: Option<String>, text: impl Into<String>) -> Self {
        HistoryEvent::Line {
            speaker,
            text: text.into(),
            timestamp: current_timestamp(),
        }
    }

    /// 创建节点选中事件
    pub fn node_played(source: impl Into<String>, script: impl Into<String>) -> Self {
        HistoryEvent::NodePlayed {
            source: source.into(),
            script: script.into(),
            timestamp: current_timestamp(),
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数
    #[serde(default = "default_max_events")]
    max_events: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self.evict();
        self
    }

    /// 添加事件，超出上限时移除最早的事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);
        self.evict();
    }

    fn evict(&mut self) {
        if self.events.len() > self.max_events {
            let overflow = self.events.len() - self.max_events;
            self.events.drain(..overflow);
        }
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 对话行数量
    pub fn line_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Line { .. }))
            .count()
    }

    /// 最近的 N 行对话（按时间顺序）
    pub fn recent_lines(&self, count: usize) -> Vec<&HistoryEvent> {
        let mut lines: Vec<_> = self
            .events
            .iter()
            .rev()
            .filter(|e| matches!(e, HistoryEvent::Line { .. }))
            .take(count)
            .collect();
        lines.reverse();
        lines
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

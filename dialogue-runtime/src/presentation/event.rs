//! 表现层输出事件
//!
//! Runtime 不直接操作 UI，而是产生事件，由 Host 每帧取走并执行。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::portrait::PortraitSlot;

/// 游戏模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// 自由行走
    #[default]
    Walk,
    /// 对话（视觉小说）
    VisualNovel,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Walk => "walk",
            Self::VisualNovel => "visual_novel",
        })
    }
}

/// 表现层事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    /// 游戏模式切换
    ModeChanged { mode: GameMode },
    /// 说话者切换
    SpeakerChanged {
        name: String,
        /// 显示用标签（可能带颜色标记）
        label: String,
    },
    /// 立绘切换（槽位同时变为可见）
    PortraitChanged { slot: PortraitSlot, sprite: String },
    /// 立绘开始跳动
    HopStarted { slot: PortraitSlot },
    /// 新的一行开始显示
    LineStarted {
        speaker: Option<String>,
        text: String,
    },
    /// 会话结束（文本、说话者清空，立绘隐藏）
    SessionEnded,
}

impl fmt::Display for PresentationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeChanged { mode } => write!(f, "mode {}", mode),
            Self::SpeakerChanged { label, .. } => write!(f, "speaker {}", label),
            Self::PortraitChanged { slot, sprite } => write!(f, "portrait {} {}", slot, sprite),
            Self::HopStarted { slot } => write!(f, "hop {}", slot),
            Self::LineStarted {
                speaker: Some(speaker),
                text,
            } => write!(f, "line {}: {}", speaker, text),
            Self::LineStarted {
                speaker: None,
                text,
            } => write!(f, "line {}", text),
            Self::SessionEnded => write!(f, "end"),
        }
    }
}

//! # Input 模块
//!
//! 输入处理：把终端输入的一行命令解析为 [`HostCommand`]，
//! 再展开为逐帧的 [`FrameInput`]。
//!
//! ## 命令
//!
//! ```text
//! interact <stable_id|name>   与对象交互
//! submit | <空行>             确认（完成打字 / 下一行）
//! skip <秒>                   按住跳过键若干秒
//! wait <秒>                   不操作，等待若干秒
//! flag set|clear <name>       设置 / 清除标记
//! flags                       列出所有标记
//! history [n]                 最近 n 行对话
//! save <slot> | load <slot>   存档 / 读档
//! saves                       列出存档
//! reset                       新游戏
//! quit                        退出
//! ```

use dialogue_runtime::FrameInput;
use thiserror::Error;

/// 默认显示的历史行数
const DEFAULT_HISTORY_LINES: usize = 10;

/// `skip` / `wait` 允许的最长时长（秒）
pub const MAX_DURATION_SECS: f32 = 600.0;

/// 单条命令展开的最大帧数
const MAX_FRAMES: usize = 1 << 20;

/// 终端命令
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Interact(String),
    Submit,
    Skip(f32),
    Wait(f32),
    SetFlag(String),
    ClearFlag(String),
    Flags,
    History(usize),
    Save(u32),
    Load(u32),
    Saves,
    Reset,
    Quit,
}

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("未知命令: {0}")]
    Unknown(String),
    #[error("命令 '{command}' 缺少参数 <{arg}>")]
    MissingArgument {
        command: &'static str,
        arg: &'static str,
    },
    #[error("参数 '{value}' 无效: {reason}")]
    InvalidArgument { value: String, reason: &'static str },
}

impl HostCommand {
    /// 解析一行输入
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Self::Submit);
        };

        match head {
            "interact" | "i" => {
                let rest: Vec<&str> = words.collect();
                if rest.is_empty() {
                    return Err(CommandParseError::MissingArgument {
                        command: "interact",
                        arg: "target",
                    });
                }
                Ok(Self::Interact(rest.join(" ")))
            }
            "submit" | "s" => Ok(Self::Submit),
            "skip" => Ok(Self::Skip(seconds(words.next(), "skip")?)),
            "wait" => Ok(Self::Wait(seconds(words.next(), "wait")?)),
            "flag" => {
                let action = words.next();
                let name = words.next().ok_or(CommandParseError::MissingArgument {
                    command: "flag",
                    arg: "name",
                })?;
                match action {
                    Some("set") => Ok(Self::SetFlag(name.to_string())),
                    Some("clear") => Ok(Self::ClearFlag(name.to_string())),
                    Some(other) => Err(CommandParseError::InvalidArgument {
                        value: other.to_string(),
                        reason: "应为 set 或 clear",
                    }),
                    None => Err(CommandParseError::MissingArgument {
                        command: "flag",
                        arg: "set|clear",
                    }),
                }
            }
            "flags" => Ok(Self::Flags),
            "history" => match words.next() {
                None => Ok(Self::History(DEFAULT_HISTORY_LINES)),
                Some(n) => n.parse().map(Self::History).map_err(|_| {
                    CommandParseError::InvalidArgument {
                        value: n.to_string(),
                        reason: "应为非负整数",
                    }
                }),
            },
            "save" => Ok(Self::Save(slot(words.next(), "save")?)),
            "load" => Ok(Self::Load(slot(words.next(), "load")?)),
            "saves" => Ok(Self::Saves),
            "reset" => Ok(Self::Reset),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }

    /// 展开为逐帧输入
    ///
    /// 不需要推进帧的命令不产生任何帧。
    pub fn frames(&self, frame_dt: f32) -> impl Iterator<Item = FrameInput> + use<> {
        let (input, count) = match self {
            Self::Submit => (FrameInput::submit(), 1),
            Self::Skip(secs) => (FrameInput::skip(), frame_count(*secs, frame_dt)),
            Self::Wait(secs) => (FrameInput::idle(), frame_count(*secs, frame_dt)),
            _ => (FrameInput::idle(), 0),
        };
        std::iter::repeat_n(input, count)
    }
}

fn frame_count(secs: f32, frame_dt: f32) -> usize {
    if frame_dt <= 0.0 || secs <= 0.0 {
        return 0;
    }
    let frames = (secs / frame_dt).ceil();
    if frames >= MAX_FRAMES as f32 {
        MAX_FRAMES
    } else {
        frames as usize
    }
}

fn seconds(word: Option<&str>, command: &'static str) -> Result<f32, CommandParseError> {
    let word = word.ok_or(CommandParseError::MissingArgument {
        command,
        arg: "seconds",
    })?;
    match word.parse::<f32>() {
        Ok(secs) if secs.is_finite() && (0.0..=MAX_DURATION_SECS).contains(&secs) => Ok(secs),
        _ => Err(CommandParseError::InvalidArgument {
            value: word.to_string(),
            reason: "应为 0 到 600 之间的秒数",
        }),
    }
}

fn slot(word: Option<&str>, command: &'static str) -> Result<u32, CommandParseError> {
    let word = word.ok_or(CommandParseError::MissingArgument {
        command,
        arg: "slot",
    })?;
    match word.parse::<u32>() {
        Ok(slot) if slot >= 1 => Ok(slot),
        _ => Err(CommandParseError::InvalidArgument {
            value: word.to_string(),
            reason: "槽位从 1 开始",
        }),
    }
}

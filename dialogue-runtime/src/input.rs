//! # Input 模块
//!
//! 定义 Host 每帧向 Runtime 传递的输入。
//!
//! ## 设计说明
//!
//! - Runtime 不直接处理鼠标/键盘事件，只处理语义化的输入
//! - `submit_pressed` 是边沿触发（本帧按下），`skip_held` 是电平触发（按住）
//! - 时间流逝由 `update(input, dt)` 的 `dt` 参数传入

use serde::{Deserialize, Serialize};

/// 单帧输入
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    /// 本帧按下了确认键
    pub submit_pressed: bool,
    /// 跳过键处于按住状态
    pub skip_held: bool,
}

impl FrameInput {
    /// 无输入
    pub fn idle() -> Self {
        Self::default()
    }

    /// 按下确认键
    pub fn submit() -> Self {
        Self {
            submit_pressed: true,
            skip_held: false,
        }
    }

    /// 按住跳过键
    pub fn skip() -> Self {
        Self {
            submit_pressed: false,
            skip_held: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_creation() {
        assert_eq!(FrameInput::idle(), FrameInput::default());
        assert!(FrameInput::submit().submit_pressed);
        assert!(!FrameInput::submit().skip_held);
        assert!(FrameInput::skip().skip_held);
    }
}

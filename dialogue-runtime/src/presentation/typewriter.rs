//! 打字机效果
//!
//! 逐字显示一行文本。时序：
//!
//! ```text
//! t = 0          显示 0 个字符
//! t = 1 间隔     显示 1 个字符
//! ...
//! t = n 间隔     显示全部 n 个字符
//! t = (n+1) 间隔 打字结束
//! ```
//!
//! 间隔在每个字符时重新取值，因此跳过模式的加速立即生效。
//! 每次 `tick` 最多推进一步。

/// 打字机状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Typewriter {
    content: String,
    total_chars: usize,
    visible_chars: usize,
    timer: f32,
    typing: bool,
}

impl Typewriter {
    /// 开始逐字显示
    pub fn start(&mut self, content: impl Into<String>, interval: f32) {
        let content = content.into();
        self.total_chars = content.chars().count();
        self.content = content;
        self.visible_chars = 0;
        self.timer = interval;
        self.typing = true;
    }

    /// 立即显示整行
    pub fn show(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.total_chars = content.chars().count();
        self.visible_chars = self.total_chars;
        self.content = content;
        self.timer = 0.0;
        self.typing = false;
    }

    /// 推进计时，返回本次是否有变化
    pub fn tick(&mut self, dt: f32, interval: f32) -> bool {
        if !self.typing {
            return false;
        }

        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }

        if self.visible_chars < self.total_chars {
            self.visible_chars += 1;
            self.timer = interval;
        } else {
            self.typing = false;
        }
        true
    }

    /// 立即完成，返回是否真的打断了打字
    pub fn complete(&mut self) -> bool {
        if !self.typing {
            return false;
        }
        self.visible_chars = self.total_chars;
        self.typing = false;
        true
    }

    /// 清空
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// 完整文本
    pub fn content(&self) -> &str {
        &self.content
    }

    /// 当前可见的部分
    pub fn visible_text(&self) -> &str {
        match self.content.char_indices().nth(self.visible_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }

    pub fn visible_chars(&self) -> usize {
        self.visible_chars
    }
}

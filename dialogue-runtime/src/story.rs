//! # Story 模块
//!
//! 故事引擎接口。
//!
//! 故事引擎对本 crate 是不透明的：只需要能回答"还能继续吗"，
//! 并在继续时给出一行文本及其标签。[`ScriptedStory`] 是基于
//! 预先编写的行列表的内存实现，由 [`ScriptLibrary`] 按脚本引用加载。

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::node::ScriptRef;

/// 故事引擎输出的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryLine {
    pub text: String,
    /// 原始标签（`key: value` 形式，未解析）
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StoryLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// 故事引擎
pub trait StoryEngine {
    /// 是否还有下一行
    fn can_continue(&self) -> bool;

    /// 取出下一行
    ///
    /// 仅在 `can_continue()` 为 true 时调用；否则返回空行。
    fn continue_line(&mut self) -> StoryLine;
}

/// 故事加载器：把脚本引用解析为可运行的故事
pub trait StoryLoader {
    /// 加载脚本，无法解析时返回 None
    fn load(&self, script: &ScriptRef) -> Option<Box<dyn StoryEngine>>;
}

/// 预编写的线性故事
#[derive(Debug, Clone, Default)]
pub struct ScriptedStory {
    lines: VecDeque<StoryLine>,
}

impl ScriptedStory {
    pub fn new(lines: impl IntoIterator<Item = StoryLine>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
        }
    }
}

impl StoryEngine for ScriptedStory {
    fn can_continue(&self) -> bool {
        !self.lines.is_empty()
    }

    fn continue_line(&mut self) -> StoryLine {
        self.lines
            .pop_front()
            .unwrap_or_else(|| StoryLine::new(String::new()))
    }
}

/// 脚本库
#[derive(Debug, Clone, Default)]
pub struct ScriptLibrary {
    scripts: HashMap<ScriptRef, Vec<StoryLine>>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册脚本（同名覆盖）
    pub fn insert(&mut self, script: ScriptRef, lines: Vec<StoryLine>) {
        self.scripts.insert(script, lines);
    }

    pub fn with_script(mut self, script: impl Into<ScriptRef>, lines: Vec<StoryLine>) -> Self {
        self.insert(script.into(), lines);
        self
    }

    pub fn contains(&self, script: &ScriptRef) -> bool {
        self.scripts.contains_key(script)
    }

    pub fn get(&self, script: &ScriptRef) -> Option<&[StoryLine]> {
        self.scripts.get(script).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl StoryLoader for ScriptLibrary {
    fn load(&self, script: &ScriptRef) -> Option<Box<dyn StoryEngine>> {
        self.scripts
            .get(script)
            .map(|lines| Box::new(ScriptedStory::new(lines.iter().cloned())) as Box<dyn StoryEngine>)
    }
}

//! # Content 模块
//!
//! 作者编写的内容包（JSON）。
//!
//! ```json
//! {
//!   "scripts": [
//!     { "id": "ava_intro", "lines": [ { "text": "Hi!", "tags": ["speaker: Ava"] } ] }
//!   ],
//!   "sources": [
//!     {
//!       "display_name": "Ava",
//!       "stable_id": "ava",
//!       "nodes": [
//!         { "script": "ava_intro", "unlocks_flags": ["met_ava"], "max_plays": 1 },
//!         null,
//!         { "script": "ava_idle" }
//!       ]
//!     }
//!   ],
//!   "sprites": ["Ava_happy", "Blake_neutral"]
//! }
//! ```
//!
//! `nodes` 为 `null` 或缺失时视为没有节点；列表中的 `null` 是空槽位。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::node::{DialogueNode, DialogueSource, UNLIMITED_PLAYS};
use crate::presentation::SpriteCatalog;
use crate::story::{ScriptLibrary, StoryLine};

/// 一段脚本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSpec {
    pub id: String,
    #[serde(default)]
    pub lines: Vec<StoryLine>,
}

/// 节点定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub script: String,
    #[serde(default)]
    pub required_flags: Vec<String>,
    #[serde(default)]
    pub unlocks_flags: Vec<String>,
    #[serde(default = "default_max_plays")]
    pub max_plays: i32,
}

impl NodeSpec {
    fn to_node(&self) -> DialogueNode {
        DialogueNode {
            script: self.script.as_str().into(),
            required_flags: self.required_flags.clone(),
            unlocks_flags: self.unlocks_flags.clone(),
            max_plays: self.max_plays,
        }
    }
}

/// 对话来源定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub display_name: String,
    #[serde(default)]
    pub stable_id: String,
    #[serde(default)]
    pub nodes: Option<Vec<Option<NodeSpec>>>,
}

impl SourceSpec {
    /// 按顺序遍历槽位（含空槽位）
    pub fn slots(&self) -> impl Iterator<Item = Option<&NodeSpec>> {
        self.nodes.iter().flatten().map(Option::as_ref)
    }

    pub fn to_source(&self) -> DialogueSource {
        let mut source = DialogueSource::new(self.display_name.as_str(), &self.stable_id);
        for slot in self.slots() {
            source.push_slot(slot.map(NodeSpec::to_node));
        }
        source
    }
}

/// 内容包
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPack {
    #[serde(default)]
    pub scripts: Vec<ScriptSpec>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub sprites: Vec<String>,
}

/// 内容包转换后的运行时对象
pub struct ContentParts {
    pub library: ScriptLibrary,
    pub sources: Vec<DialogueSource>,
    pub sprites: SpriteCatalog,
}

impl ContentPack {
    /// 从 JSON 解析
    ///
    /// 脚本 ID 重复视为错误；其余问题交给 [`crate::diagnostic::analyze_content`]。
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let pack: ContentPack =
            serde_json::from_str(json).map_err(|e| ContentError::Parse(e.to_string()))?;

        let mut seen = HashSet::new();
        for script in &pack.scripts {
            if !seen.insert(script.id.as_str()) {
                return Err(ContentError::DuplicateScript {
                    id: script.id.clone(),
                });
            }
        }

        Ok(pack)
    }

    pub fn script(&self, id: &str) -> Option<&ScriptSpec> {
        self.scripts.iter().find(|s| s.id == id)
    }

    pub fn library(&self) -> ScriptLibrary {
        let mut library = ScriptLibrary::new();
        for script in &self.scripts {
            library.insert(script.id.as_str().into(), script.lines.clone());
        }
        library
    }

    pub fn sprite_catalog(&self) -> SpriteCatalog {
        self.sprites.iter().cloned().collect()
    }

    /// 构建所有对话来源
    pub fn build_sources(&self) -> Vec<DialogueSource> {
        self.sources.iter().map(SourceSpec::to_source).collect()
    }

    pub fn into_parts(self) -> ContentParts {
        ContentParts {
            library: self.library(),
            sources: self.build_sources(),
            sprites: self.sprite_catalog(),
        }
    }
}

fn default_max_plays() -> i32 {
    UNLIMITED_PLAYS
}

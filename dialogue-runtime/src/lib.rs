//! # Dialogue Runtime
//!
//! 对话推进与表现的核心运行时库。
//!
//! ## 架构概述
//!
//! `dialogue-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **事件驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                                 Runtime
//!   │                                     │
//!   │──── interact(source) ─────────────►│ NodeSelector → StoryLoader
//!   │──── update(FrameInput, dt) ───────►│ 打字机 / 跳过 / 跳动
//!   │◄─── Vec<PresentationEvent> ────────│
//!   │                                     │
//! ```
//!
//! ## 核心类型
//!
//! - [`NodeSelector`]：根据标记与播放计数选择节点
//! - [`PresentationController`]：打字机与跳过状态机、说话者与立绘
//! - [`DialogueContext`]：交互入口，组合上面两者与故事加载器
//! - [`DialogueSnapshot`] / [`SaveData`]：可序列化的进度
//!
//! ## 使用示例
//!
//! ```ignore
//! let parts = ContentPack::from_json(json)?.into_parts();
//! let presenter = PresentationController::new(PresentationConfig::default(), parts.sprites);
//! let mut ctx = DialogueContext::new(parts.library, presenter);
//!
//! ctx.interact(&mut sources[0]);
//! loop {
//!     ctx.update(collect_input(), dt);
//!     for event in ctx.take_events() {
//!         host.apply(event);
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`flags`] / [`ledger`]：标记与播放计数
//! - [`node`]：对话节点与对话来源
//! - [`selector`]：节点选择
//! - [`presentation`]：表现层状态机
//! - [`session`]：交互入口
//! - [`story`]：故事引擎接口
//! - [`content`] / [`diagnostic`]：内容包与静态检查
//! - [`snapshot`] / [`save`] / [`history`]：持久化

pub mod config;
pub mod content;
pub mod diagnostic;
pub mod error;
pub mod flags;
pub mod history;
pub mod input;
pub mod ledger;
pub mod node;
pub mod presentation;
pub mod save;
pub mod selector;
pub mod session;
pub mod snapshot;
pub mod story;

// 重导出核心类型
pub use config::{NameColor, PresentationConfig};
pub use content::{ContentPack, ContentParts, NodeSpec, ScriptSpec, SourceSpec};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_content};
pub use error::{ColorParseError, ContentError, SaveError, SnapshotKeyError};
pub use flags::FlagStore;
pub use history::{History, HistoryEvent};
pub use input::FrameInput;
pub use ledger::{EntityId, PlayCountKey, PlayCountLedger};
pub use node::{DialogueNode, DialogueSource, NodePlayedCallback, ScriptRef, UNLIMITED_PLAYS};
pub use presentation::{
    GameMode, PortraitSlot, PresentationController, PresentationEvent, SpriteCatalog, Tag,
};
pub use save::{SaveData, SaveMetadata, SaveVersion};
pub use selector::NodeSelector;
pub use session::{DialogueContext, InteractOutcome};
pub use snapshot::DialogueSnapshot;
pub use story::{ScriptLibrary, ScriptedStory, StoryEngine, StoryLine, StoryLoader};

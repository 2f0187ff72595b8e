//! # Presentation 模块
//!
//! 对话的表现层：文本逐字显示、跳过、说话者名字、立绘槽位。
//!
//! 本模块只维护状态并产生 [`PresentationEvent`]，不做任何渲染。

mod controller;
mod event;
mod portrait;
mod speaker;
mod tag;
mod typewriter;

pub use controller::PresentationController;
pub use event::{GameMode, PresentationEvent};
pub use portrait::{Hop, Portrait, PortraitSlot, SpriteCatalog};
pub use speaker::speaker_label;
pub use tag::Tag;
pub use typewriter::Typewriter;

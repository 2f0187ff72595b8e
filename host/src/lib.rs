//! # Host 层
//!
//! 对话运行时的无界面宿主层实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置文件加载
//! - 内容包读取
//! - 存档文件管理
//! - 终端输入采集
//! - 将 Runtime 的 PresentationEvent 转换为文本输出与相机切换
//!
//! Host 层不包含对话逻辑，只负责驱动 `dialogue-runtime` 并执行它产生的事件。

pub mod app;
pub mod camera;
pub mod config;
pub mod input;
pub mod save_manager;

pub use app::{AppState, Flow, HostError};
pub use camera::{CameraDirector, HeadlessCamera, PriorityCamera};
pub use config::{AppConfig, CameraConfig, ConfigError};
pub use input::{CommandParseError, HostCommand};
pub use save_manager::{SaveInfo, SaveManager};

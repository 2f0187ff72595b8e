//! # Config 模块
//!
//! 运行时配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use dialogue_runtime::PresentationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 内容包路径（JSON）
    #[serde(default = "default_content_path")]
    pub content_path: PathBuf,

    /// 存档目录
    #[serde(default = "default_saves_dir")]
    pub saves_dir: PathBuf,

    /// 每帧时长（秒），命令被拆成若干帧推进
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 相机优先级配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 对话表现配置
    #[serde(default)]
    pub presentation: PresentationConfig,
}

/// 相机配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 当前模式对应相机的优先级
    #[serde(default = "default_active_priority")]
    pub active_priority: i32,

    /// 其他相机的优先级
    #[serde(default)]
    pub inactive_priority: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            active_priority: default_active_priority(),
            inactive_priority: 0,
        }
    }
}

// 默认值函数
fn default_content_path() -> PathBuf {
    PathBuf::from("assets/content.json")
}

fn default_saves_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_active_priority() -> i32 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_path: default_content_path(),
            saves_dir: default_saves_dir(),
            frame_dt: default_frame_dt(),
            log_level: default_log_level(),
            camera: CameraConfig::default(),
            presentation: PresentationConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.content_path.exists() {
            return Err(ConfigError::ValidationFailed(format!(
                "内容包不存在: {:?}",
                self.content_path
            )));
        }

        if self.frame_dt <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "frame_dt 必须大于 0".to_string(),
            ));
        }

        let p = &self.presentation;
        for (name, value) in [
            ("typewriter_interval", p.typewriter_interval),
            ("skip_interval", p.skip_interval),
            ("skip_typing_factor", p.skip_typing_factor),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} 必须大于 0",
                    name
                )));
            }
        }

        if p.hop_duration < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "hop_duration 不能为负数".to_string(),
            ));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "无效的日志级别: {}",
                self.log_level
            )));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config(dir: &Path) -> AppConfig {
        let content_path = dir.join("content.json");
        fs::write(&content_path, "{}").unwrap();
        AppConfig {
            content_path,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.camera.active_priority, 10);
        assert_eq!(config.camera.inactive_priority, 0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.presentation.primary_character, "Blake");
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("nope.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unparsable_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "saves_dir": "my_saves", "presentation": { "skip_interval": 0.25 } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.saves_dir, PathBuf::from("my_saves"));
        assert_eq!(config.presentation.skip_interval, 0.25);
        assert_eq!(config.presentation.typewriter_interval, 0.05);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            log_level: "debug".to_string(),
            ..AppConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path), config);
    }

    #[test]
    fn test_config_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        assert_eq!(config.validate(), Ok(()));

        config.presentation.typewriter_interval = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let mut config = valid_config(dir.path());
        config.frame_dt = -1.0;
        assert!(config.validate().is_err());

        let mut config = valid_config(dir.path());
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let config = AppConfig {
            content_path: dir.path().join("missing.json"),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

//! # SaveManager 模块
//!
//! 存档文件管理，负责存档的读写和 slot 管理。
//!
//! ## 文件布局
//!
//! ```text
//! saves/
//! ├── slot_001.json
//! ├── slot_002.json
//! └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use dialogue_runtime::{SaveData, SaveError};
use tracing::{info, warn};

/// 最大存档槽位数
pub const MAX_SAVE_SLOTS: u32 = 99;

/// 存档管理器
pub struct SaveManager {
    /// 存档目录
    saves_dir: PathBuf,
}

impl SaveManager {
    pub fn new(saves_dir: impl AsRef<Path>) -> Self {
        Self {
            saves_dir: saves_dir.as_ref().to_path_buf(),
        }
    }

    /// 确保存档目录存在
    pub fn ensure_dir(&self) -> Result<(), SaveError> {
        if !self.saves_dir.exists() {
            fs::create_dir_all(&self.saves_dir)
                .map_err(|e| SaveError::IoError(format!("无法创建存档目录: {}", e)))?;
        }
        Ok(())
    }

    /// 获取存档文件路径
    pub fn slot_path(&self, slot: u32) -> PathBuf {
        self.saves_dir.join(format!("slot_{:03}.json", slot))
    }

    /// 保存存档
    pub fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        self.ensure_dir()?;

        let path = self.slot_path(data.metadata.slot);
        let json = data.to_json()?;

        fs::write(&path, json)
            .map_err(|e| SaveError::IoError(format!("无法写入存档文件: {}", e)))?;

        info!(path = %path.display(), "存档保存成功");
        Ok(())
    }

    /// 读取存档
    pub fn load(&self, slot: u32) -> Result<SaveData, SaveError> {
        let path = self.slot_path(slot);

        if !path.exists() {
            return Err(SaveError::NotFound(path.to_string_lossy().to_string()));
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| SaveError::IoError(format!("无法读取存档文件: {}", e)))?;

        let data = SaveData::from_json(&json)?;

        info!(path = %path.display(), "存档读取成功");
        Ok(data)
    }

    /// 删除存档
    pub fn delete(&self, slot: u32) -> Result<(), SaveError> {
        let path = self.slot_path(slot);

        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| SaveError::IoError(format!("无法删除存档文件: {}", e)))?;
            info!(path = %path.display(), "存档删除成功");
        }

        Ok(())
    }

    pub fn exists(&self, slot: u32) -> bool {
        self.slot_path(slot).exists()
    }

    /// 列出所有存档（按槽位排序）
    pub fn list_saves(&self) -> Vec<(u32, PathBuf)> {
        let mut saves = Vec::new();

        let Ok(entries) = fs::read_dir(&self.saves_dir) else {
            return saves;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let slot = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| name.strip_prefix("slot_"))
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|num| num.parse::<u32>().ok());
            if let Some(slot) = slot {
                saves.push((slot, path));
            }
        }

        saves.sort_by_key(|(slot, _)| *slot);
        saves
    }

    /// 获取下一个可用的存档槽位
    pub fn next_available_slot(&self) -> Option<u32> {
        (1..=MAX_SAVE_SLOTS).find(|slot| !self.exists(*slot))
    }

    /// 获取存档信息（用于列表显示）
    pub fn get_save_info(&self, slot: u32) -> Option<SaveInfo> {
        match self.load(slot) {
            Ok(data) => Some(SaveInfo {
                slot,
                saved_at: format_timestamp(data.metadata.timestamp),
                label: data.metadata.label,
                flag_count: data.dialogue.flags.len(),
            }),
            Err(SaveError::NotFound(_)) => None,
            Err(e) => {
                warn!(slot, error = %e, "存档信息读取失败");
                None
            }
        }
    }
}

/// 存档信息（用于列表显示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub slot: u32,
    /// 本地时间，`YYYY-MM-DD HH:MM:SS`
    pub saved_at: String,
    pub label: Option<String>,
    pub flag_count: usize,
}

/// Unix 秒格式化为本地时间
fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

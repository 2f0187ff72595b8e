//! 存档系统

use dialogue_runtime::SaveData;
use tracing::warn;

use super::AppState;

/// 构建当前游戏状态的存档数据
pub fn build_save_data(app_state: &AppState, slot: u32) -> SaveData {
    app_state
        .context
        .to_save_data(slot)
        .with_play_time(app_state.play_time as u64)
}

impl AppState {
    pub(super) fn save_slot(&mut self, slot: u32) {
        let data = build_save_data(self, slot);
        match self.save_manager.save(&data) {
            Ok(()) => self.emit(format!("已保存到槽位 {}", slot)),
            Err(e) => {
                warn!(slot, error = %e, "保存失败");
                self.emit(format!("保存失败: {}", e));
            }
        }
    }

    pub(super) fn load_slot(&mut self, slot: u32) {
        match self.save_manager.load(slot) {
            Ok(data) => {
                self.context.apply_save_data(&data);
                self.play_time = data.metadata.play_time_secs as f64;
                self.drain_events();
                self.emit(format!("已读取槽位 {}", slot));
            }
            Err(e) => {
                warn!(slot, error = %e, "读档失败");
                self.emit(format!("读档失败: {}", e));
            }
        }
    }

    pub(super) fn list_saves(&mut self) {
        let infos: Vec<_> = self
            .save_manager
            .list_saves()
            .into_iter()
            .filter_map(|(slot, _)| self.save_manager.get_save_info(slot))
            .collect();

        if infos.is_empty() {
            self.emit("(无存档)");
            return;
        }
        for info in infos {
            let label = info.label.as_deref().unwrap_or("-");
            self.emit(format!(
                "#{:03} {} {} ({} 个标记)",
                info.slot, info.saved_at, label, info.flag_count
            ));
        }
    }
}

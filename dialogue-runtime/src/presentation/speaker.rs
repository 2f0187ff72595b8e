//! 说话者名字显示

use crate::config::PresentationConfig;

/// 生成说话者标签
///
/// 开启上色时输出 `<color=#RRGGBB>Name</color>`，否则原样返回。
pub fn speaker_label(name: &str, config: &PresentationConfig) -> String {
    if config.use_character_colors {
        format!("<color={}>{}</color>", config.color_for(name), name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_names() {
        let config = PresentationConfig::default();
        assert_eq!(
            speaker_label("Blake", &config),
            "<color=#FF0000>Blake</color>"
        );
        assert_eq!(
            speaker_label("JELLYFISH", &config),
            "<color=#FFEB04>JELLYFISH</color>"
        );
        assert_eq!(
            speaker_label("Shopkeeper", &config),
            "<color=#000000>Shopkeeper</color>"
        );
    }

    #[test]
    fn test_colors_disabled() {
        let config = PresentationConfig {
            use_character_colors: false,
            ..PresentationConfig::default()
        };
        assert_eq!(speaker_label("Ava", &config), "Ava");
    }
}

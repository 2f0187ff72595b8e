//! # Flags 模块
//!
//! 全局进度标记。标记只有"存在/不存在"两种状态，没有值。

use std::collections::BTreeSet;

/// 标记存储
///
/// - `set` 幂等
/// - `clear` 不存在的标记是 no-op
/// - 空字符串标记一律忽略
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagStore {
    flags: BTreeSet<String>,
}

impl FlagStore {
    /// 创建空的标记存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置标记
    pub fn set(&mut self, flag: &str) {
        if flag.is_empty() {
            return;
        }
        self.flags.insert(flag.to_string());
    }

    /// 清除标记
    pub fn clear(&mut self, flag: &str) {
        if flag.is_empty() {
            return;
        }
        self.flags.remove(flag);
    }

    /// 标记是否存在
    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// 清空所有标记
    pub fn clear_all(&mut self) {
        self.flags.clear();
    }

    /// 按字典序遍历所有标记
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FlagStore {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut store = Self::new();
        for flag in iter {
            let flag = flag.into();
            store.set(&flag);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_idempotent() {
        let mut flags = FlagStore::new();
        flags.set("met_ava");
        flags.set("met_ava");

        assert!(flags.contains("met_ava"));
        assert_eq!(flags.len(), 1);
    }

    #[test]
    fn test_clear_absent_flag_is_noop() {
        let mut flags = FlagStore::new();
        flags.set("a");
        flags.clear("b");

        assert_eq!(flags.iter().collect::<Vec<_>>(), vec!["a"]);

        flags.clear("a");
        assert!(flags.is_empty());
    }

    #[test]
    fn test_empty_flag_ignored() {
        let mut flags = FlagStore::new();
        flags.set("");
        assert!(flags.is_empty());
        assert!(!flags.contains(""));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let flags: FlagStore = ["zeta", "alpha", "", "mid"].into_iter().collect();
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec!["alpha", "mid", "zeta"]);
    }
}

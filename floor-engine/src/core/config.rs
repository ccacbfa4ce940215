use std::path::PathBuf;

use crate::catalog::{FloorLayout, TableCatalog};
use crate::utils::FloorResult;

/// 不变量被破坏时的处理策略
///
/// A table owned by two assignments is an engine bug, never a user-facing
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantPolicy {
    /// Fail loudly (development)
    Panic,
    /// Log at error level and drop the later claim (production)
    LogAndDrop,
}

impl Default for InvariantPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::LogAndDrop
        }
    }
}

/// Knobs of the allocation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Seats kept blocked for walk-in guests (cupos)
    pub walkin_min_seats: u32,
    /// Party size from which combinations are consulted
    pub combination_min_party: u32,
    pub invariant_policy: InvariantPolicy,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            walkin_min_seats: 12,
            combination_min_party: 5,
            invariant_policy: InvariantPolicy::default(),
        }
    }
}

/// 引擎配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WALKIN_MIN_SEATS | 12 | 为散客保留的最少座位数 |
/// | COMBINATION_MIN_PARTY | 5 | 开始考虑拼桌的人数 |
/// | FLOOR_LAYOUT_FILE | (unset) | 桌台布局 JSON，未设置时使用默认布局 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 日志目录，设置后按天滚动写文件 |
///
/// # 示例
///
/// ```ignore
/// WALKIN_MIN_SEATS=16 FLOOR_LAYOUT_FILE=./layout.json cargo run -- reservations.json
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: AllocationPolicy,
    pub layout_file: Option<PathBuf>,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl EngineConfig {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let defaults = AllocationPolicy::default();
        let invariant_policy = if environment == "production" {
            InvariantPolicy::LogAndDrop
        } else {
            defaults.invariant_policy
        };

        Self {
            policy: AllocationPolicy {
                walkin_min_seats: std::env::var("WALKIN_MIN_SEATS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.walkin_min_seats),
                combination_min_party: std::env::var("COMBINATION_MIN_PARTY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.combination_min_party),
                invariant_policy,
            },
            layout_file: std::env::var("FLOOR_LAYOUT_FILE").ok().map(PathBuf::from),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Load the configured layout, or the house layout when none is set
    pub fn load_catalog(&self) -> FloorResult<TableCatalog> {
        let layout = match &self.layout_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading floor layout");
                FloorLayout::from_json_file(path)?
            }
            None => FloorLayout::default(),
        };
        Ok(TableCatalog::new(layout)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_with_layout(layout_file: Option<PathBuf>) -> EngineConfig {
        EngineConfig {
            policy: AllocationPolicy::default(),
            layout_file,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = AllocationPolicy::default();
        assert_eq!(policy.walkin_min_seats, 12);
        assert_eq!(policy.combination_min_party, 5);
    }

    #[test]
    fn test_load_house_layout_without_file() {
        let catalog = config_with_layout(None).load_catalog().unwrap();
        assert_eq!(catalog.len(), 17);
    }

    #[test]
    fn test_load_layout_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "tables": [
                    {{"id": 1, "capacity": 2, "partners": [2]}},
                    {{"id": 2, "capacity": 2}},
                    {{"id": 5, "capacity": 4}}
                ],
                "tiers": [
                    {{"capacity": 2, "priority": [1, 2]}},
                    {{"capacity": 4, "priority": [5]}}
                ],
                "combinations": [{{"members": [1, 2], "combined_capacity": 4}}]
            }}"#
        )
        .unwrap();

        let catalog = config_with_layout(Some(file.path().to_path_buf()))
            .load_catalog()
            .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.partners_of(2), &[1]);
        assert!(catalog.quota_rules().is_empty());
    }

    #[test]
    fn test_load_layout_missing_file_is_error() {
        let result = config_with_layout(Some(PathBuf::from("/nonexistent/layout.json")))
            .load_catalog();
        assert!(result.is_err());
    }
}

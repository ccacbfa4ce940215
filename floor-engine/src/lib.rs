//! Floor Engine - 餐厅桌台分配引擎
//!
//! # 架构概述
//!
//! 给定某天某个营业时段 (shift) 的预订，决定每桌客人坐哪张桌子，
//! 为散客保留座位，处理拼桌与手动换桌冲突。
//!
//! - **桌台目录** (`catalog`): 桌台、容量档位、拼桌规则、散客名额规则
//! - **自动排桌** (`assignment`): 按到店时间的贪心分配
//! - **散客名额** (`quota`): 分配后重新推导保留桌
//! - **手动换桌** (`reassign`): 冲突检测与强制换桌
//! - **桌台状态** (`aggregate`): 预订 + 订单 + 保留桌 → 每桌状态
//!
//! # 模块结构
//!
//! ```text
//! floor-engine/src/
//! ├── core/          # 配置
//! ├── utils/         # 错误、日志
//! ├── catalog.rs     # 桌台目录与布局校验
//! ├── tier.rs        # 人数 → 容量档位
//! ├── combination.rs # 拼桌
//! ├── assignment/    # 自动排桌
//! ├── quota.rs       # 散客名额
//! ├── reassign.rs    # 手动换桌
//! ├── aggregate.rs   # 桌台状态
//! ├── store.rs       # 持久化接口
//! └── service.rs     # 引擎 + 存储
//! ```

pub mod aggregate;
pub mod assignment;
pub mod catalog;
pub mod combination;
pub mod core;
pub mod quota;
pub mod reassign;
pub mod service;
pub mod store;
pub mod tier;
pub mod utils;

// Re-export 公共类型
pub use aggregate::{StateView, TableStateAggregator, apply_plan};
pub use assignment::{AssignmentEngine, AssignmentOutcome, Unassigned, UnassignedReason};
pub use catalog::{FloorLayout, LayoutError, TableCatalog};
pub use core::{AllocationPolicy, EngineConfig, InvariantPolicy};
pub use quota::QuotaRedistributor;
pub use reassign::{CapacityCheck, CapacityStatus, ManualReassignmentValidator, ReassignOutcome};
pub use service::{FloorService, ShiftPlan};
pub use store::{FloorStore, MemoryFloorStore, StoreError};
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode, FloorError, FloorResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env，按配置初始化日志
///
/// Returns the loaded configuration.
pub fn setup_environment() -> anyhow::Result<EngineConfig> {
    dotenv::dotenv().ok();

    let config = EngineConfig::from_env();
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;

    tracing::debug!(
        environment = %config.environment,
        walkin_min_seats = config.policy.walkin_min_seats,
        combination_min_party = config.policy.combination_min_party,
        "Environment ready"
    );
    Ok(config)
}

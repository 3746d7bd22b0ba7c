// ==========================================
// HACCP 合规核心 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 记录存储协作接口（键 → JSON），屏蔽存储细节
// ==========================================

pub mod error;
pub mod record_store;

pub use error::{RepositoryError, RepositoryResult};
pub use record_store::{
    record_keys, MemoryRecordStore, RecordStore, RecordStoreExt, SqliteRecordStore,
};

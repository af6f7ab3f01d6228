//! Memory Layer - In-Memory State Management
//!
//! 实现 JobManager，管理提取任务的内存状态

mod job_manager;

pub use job_manager::InMemoryJobManager;

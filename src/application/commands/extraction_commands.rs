//! Extraction Commands

/// 启动提取任务命令
#[derive(Debug, Clone)]
pub struct StartExtraction {
    pub file_name: String,
    pub prompt: String,
}

/// 取消当前任务命令
#[derive(Debug, Clone, Default)]
pub struct CancelExtraction {
    /// 为空时取消当前任务
    pub job_id: Option<String>,
}

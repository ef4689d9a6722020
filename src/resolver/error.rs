//! 候选解析错误

/// 候选解析错误。
///
/// `NoCandidateFound` 属于静默分支：调用方不打开放大层，也不提示用户。
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("光标下没有可用的图片候选")]
    NoCandidateFound,

    #[error("解析配置无效：{0}")]
    InvalidConfig(String),
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCandidateFound => "no_candidate_found",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

//! 放大层错误

#[derive(Debug, thiserror::Error)]
pub enum MagnifierError {
    #[error("放大层已打开，忽略重复打开")]
    AlreadyOpen,

    #[error("放大层未打开")]
    NotOpen,

    #[error("图片地址为空")]
    EmptyUrl,

    #[error("放大层配置无效：{0}")]
    InvalidConfig(String),
}

impl MagnifierError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyOpen => "already_open",
            Self::NotOpen => "not_open",
            Self::EmptyUrl => "empty_url",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

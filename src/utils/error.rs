use thiserror::Error;

/// 錯誤分類：邊界層依此決定回應狀態碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Internal,
}

#[derive(Error, Debug)]
pub enum PortError {
    #[error("the provided input is invalid: port input is empty")]
    EmptyInput,

    #[error("the provided input is invalid: couldn't acquire first token from input: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("the provided input is invalid: invalid unloc provided")]
    InvalidUnloc,

    #[error("not found: {unloc}")]
    NotFound { unloc: String },

    #[error("internal server error: failed to acquire unloc: {reason}")]
    MalformedKey { reason: String },

    #[error("internal server error: failed to decode port {unloc}: {reason}")]
    InvalidRecord { unloc: String, reason: String },

    #[error("internal server error: port {unloc} exceeds {limit} bytes")]
    RecordTooLarge { unloc: String, limit: usize },

    #[error("internal server error: failed to read port input: {0}")]
    Read(#[from] std::io::Error),

    #[error("internal server error: unexpected error when retrieving port {unloc} from storage: {source}")]
    Lookup {
        unloc: String,
        #[source]
        source: StoreError,
    },

    #[error("internal server error: failed to create port {unloc} on storage: {source}")]
    Create {
        unloc: String,
        #[source]
        source: StoreError,
    },

    #[error("internal server error: failed to update port {unloc} on storage: {source}")]
    Update {
        unloc: String,
        #[source]
        source: StoreError,
    },

    #[error("internal server error: sync cancelled after {applied} ports")]
    Cancelled { applied: usize },
}

impl PortError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::EmptyInput | PortError::InvalidEnvelope { .. } | PortError::InvalidUnloc => {
                ErrorKind::InvalidInput
            }
            PortError::NotFound { .. } => ErrorKind::NotFound,
            PortError::MalformedKey { .. }
            | PortError::InvalidRecord { .. }
            | PortError::RecordTooLarge { .. }
            | PortError::Read(_)
            | PortError::Lookup { .. }
            | PortError::Create { .. }
            | PortError::Update { .. }
            | PortError::Cancelled { .. } => ErrorKind::Internal,
        }
    }
}

/// 儲存層自身的錯誤，由服務層轉譯為 [`PortError`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("port {unloc} not found")]
    NotFound { unloc: String },

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PortError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EquityError {
    #[error("Cannot load record set from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Block group(s) not found: {}", geoids.join(", "))]
    NotFound { geoids: Vec<String> },

    #[error("Invalid argument '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("Statistics requested over an empty record set")]
    EmptyDataset,

    #[error("Tool loop exceeded {max_turns} turns without a final answer")]
    ToolLoopExhausted { max_turns: u32 },

    #[error("Chat model error: {0}")]
    Model(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EquityError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field:  field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type EquityResult<T> = Result<T, EquityError>;

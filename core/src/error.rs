use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid event rate: count must be >= 0, got {count}")]
    InvalidRate { count: i64 },

    #[error("Scheduler has no configuration; call reconfigure() before start()")]
    NotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Simulator '{simulator}' failed at tick {tick}: {reason}")]
    SimulatorFault {
        simulator: &'static str,
        tick: u64,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

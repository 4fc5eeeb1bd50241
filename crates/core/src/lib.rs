pub mod config;
pub mod error;
pub mod operator;
pub mod wire;

pub use config::{load_dotenv, AgentConfig, Config, OperationTimes, ServerConfig};
pub use error::*;
pub use operator::Operator;
pub use wire::*;

//! Erros da camada de switch

use thiserror::Error;

pub type SwitchResult<T> = Result<T, SwitchError>;

/// Erros de construção e configuração.
///
/// Comandos rejeitados em tempo de execução não são erros: `set_pos` e
/// `set_manual_pos` apenas retornam `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwitchError {
    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fora de alcance
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Posição desconhecida
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Arquivo de configuração ilegível
    #[error("Config file error: {0}")]
    ConfigFile(String),
}

impl From<std::io::Error> for SwitchError {
    fn from(err: std::io::Error) -> Self {
        SwitchError::ConfigFile(err.to_string())
    }
}

impl From<serde_json::Error> for SwitchError {
    fn from(err: serde_json::Error) -> Self {
        SwitchError::ConfigFile(err.to_string())
    }
}

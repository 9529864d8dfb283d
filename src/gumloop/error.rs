//! Tipos de erro para o cliente da API Gumloop.
//!
//! Define [`GumloopError`] com variantes para erros HTTP da API, falhas de
//! rede, execuções de flow que terminam sem sucesso e respostas sem o campo
//! de saída esperado. Usa `thiserror` para derivar `Display` e `Error`.

use thiserror::Error;

/// Erros que podem ocorrer ao executar um flow na Gumloop.
#[derive(Debug, Error)]
pub enum GumloopError {
    /// Erro retornado pela API (ex.: 401 chave inválida, 500 erro interno).
    /// Contém o código de status HTTP e o corpo da resposta.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout do reqwest).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A execução terminou em um estado diferente de `DONE`.
    #[error("run {run_id} ended in state {state}")]
    RunFailed { run_id: String, state: String },

    /// A execução não terminou dentro do prazo configurado.
    #[error("run {run_id} did not finish within {secs}s")]
    Timeout { run_id: String, secs: u64 },

    /// A execução terminou, mas a saída esperada está ausente ou não é texto.
    #[error("flow output `{0}` is missing or not a string")]
    MissingOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = GumloopError::Api {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
    }

    #[test]
    fn run_failed_display() {
        let err = GumloopError::RunFailed {
            run_id: "abc".into(),
            state: "FAILED".into(),
        };
        assert_eq!(err.to_string(), "run abc ended in state FAILED");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GumloopError>();
    }
}

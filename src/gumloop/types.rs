//! Tipos de dados para requisições e respostas da API de pipelines da Gumloop.
//!
//! Cobrem os dois endpoints usados: `start_pipeline`, que inicia uma execução
//! do flow, e `get_pl_run`, consultado periodicamente até a execução terminar.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Corpo da requisição para `POST /start_pipeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPipelineRequest {
    /// Usuário dono do flow.
    pub user_id: String,
    /// Identificador do flow salvo a ser executado.
    pub saved_item_id: String,
    /// Entradas nomeadas passadas ao flow.
    pub pipeline_inputs: Vec<PipelineInput>,
}

/// Uma entrada nomeada do flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInput {
    pub input_name: String,
    pub value: String,
}

/// Resposta de `start_pipeline`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartPipelineResponse {
    /// Identificador da execução, usado nas consultas seguintes.
    pub run_id: String,
    /// Link para acompanhar a execução no painel da Gumloop.
    #[serde(default)]
    pub url: Option<String>,
}

/// Resposta de `GET /get_pl_run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: String,
    /// Estado da execução (ex.: "STARTED", "RUNNING", "DONE", "FAILED").
    pub state: String,
    /// Saídas nomeadas; preenchidas quando o estado é `DONE`.
    #[serde(default)]
    pub outputs: Map<String, Value>,
    /// Linhas de log emitidas pelo flow.
    #[serde(default)]
    pub log: Vec<String>,
}

/// Fase de uma execução, derivada do campo `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    InProgress,
    Done,
    Failed,
}

impl PipelineRun {
    /// Classifica o estado textual da execução.
    pub fn phase(&self) -> RunPhase {
        match self.state.as_str() {
            "DONE" => RunPhase::Done,
            "FAILED" | "TERMINATED" => RunPhase::Failed,
            _ => RunPhase::InProgress,
        }
    }

    /// Retorna a saída nomeada se ela existir e for texto.
    pub fn output_text(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_serializes_api_field_names() {
        let req = StartPipelineRequest {
            user_id: "u1".into(),
            saved_item_id: "flow1".into(),
            pipeline_inputs: vec![PipelineInput {
                input_name: "input".into(),
                value: "Assume p.".into(),
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["saved_item_id"], "flow1");
        assert_eq!(json["pipeline_inputs"][0]["input_name"], "input");
        assert_eq!(json["pipeline_inputs"][0]["value"], "Assume p.");
    }

    #[test]
    fn run_deserializes_from_api_format() {
        let api_json = r#"{
            "run_id": "run_1",
            "state": "DONE",
            "outputs": {"output": "theorem t : True := trivial"},
            "log": ["started", "finished"]
        }"#;
        let run: PipelineRun = serde_json::from_str(api_json).unwrap();
        assert_eq!(run.phase(), RunPhase::Done);
        assert_eq!(run.output_text("output"), Some("theorem t : True := trivial"));
        assert_eq!(run.log.len(), 2);
    }

    #[test]
    fn run_without_outputs_defaults_to_empty() {
        let run: PipelineRun =
            serde_json::from_str(r#"{"run_id": "r", "state": "RUNNING"}"#).unwrap();
        assert_eq!(run.phase(), RunPhase::InProgress);
        assert!(run.outputs.is_empty());
        assert_eq!(run.output_text("output"), None);
    }

    #[test]
    fn non_string_output_is_not_text() {
        let run: PipelineRun = serde_json::from_str(
            r#"{"run_id": "r", "state": "DONE", "outputs": {"output": 42}}"#,
        )
        .unwrap();
        assert_eq!(run.output_text("output"), None);
    }

    #[test]
    fn terminal_failure_states() {
        for state in ["FAILED", "TERMINATED"] {
            let run = PipelineRun {
                run_id: "r".into(),
                state: state.into(),
                outputs: Map::new(),
                log: Vec::new(),
            };
            assert_eq!(run.phase(), RunPhase::Failed);
        }
    }
}

//! Configuração do Theoremica carregada a partir de `theoremica.toml`.
//!
//! A struct [`TheoremicaConfig`] agrupa as seções `[gumloop]`, `[verifier]`,
//! `[scheduler]` e `[server]`. Valores não presentes no arquivo usam defaults
//! sensíveis. As variáveis de ambiente `GUMLOOP_API_KEY`, `GUMLOOP_USER_ID` e
//! `GUMLOOP_FLOW_ID` têm precedência sobre o arquivo.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Nome do arquivo de configuração procurado no diretório atual.
pub const DEFAULT_CONFIG_FILE: &str = "theoremica.toml";

/// Configuração de nível superior carregada de `theoremica.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TheoremicaConfig {
    #[serde(default)]
    pub gumloop: GumloopConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Credenciais e parâmetros do flow de transformação na Gumloop.
#[derive(Debug, Clone, Deserialize)]
pub struct GumloopConfig {
    /// Chave da API Gumloop.
    #[serde(default)]
    pub api_key: String,

    /// Usuário dono do flow.
    #[serde(default)]
    pub user_id: String,

    /// Identificador do flow salvo.
    #[serde(default)]
    pub flow_id: String,

    /// URL base da API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Nome da entrada do flow que recebe o texto da prova.
    #[serde(default = "default_input_name")]
    pub input_name: String,

    /// Nome da saída do flow que contém o código Lean.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Intervalo entre consultas ao estado da execução.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Tempo máximo de espera por uma execução.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

/// Como o verificador Lean é invocado.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifierConfig {
    /// Executável do verificador.
    #[serde(default = "default_program")]
    pub program: String,

    /// Argumentos passados antes do caminho do arquivo.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Diretório do projeto Lean; o arquivo temporário é criado aqui.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Limite de tempo de relógio para uma verificação.
    #[serde(default = "default_verifier_timeout_secs")]
    pub timeout_secs: u64,

    /// Extensão do arquivo temporário.
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

/// Dimensões do pool de workers.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Quantidade de pipelines executando simultaneamente.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Quantidade de jobs aguardando na fila antes de recusar novos envios.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

/// Endereço do servidor HTTP.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_base_url() -> String {
    "https://api.gumloop.com/api/v1".to_string()
}

fn default_input_name() -> String {
    "input".to_string()
}

fn default_output_name() -> String {
    "output".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_program() -> String {
    "lake".to_string()
}

fn default_args() -> Vec<String> {
    vec!["env".to_string(), "lean".to_string()]
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

// Valor padrão para o limite do verificador: 30s.
fn default_verifier_timeout_secs() -> u64 {
    30
}

fn default_file_suffix() -> String {
    ".lean".to_string()
}

// Valor padrão de workers: 2.
fn default_workers() -> usize {
    2
}

fn default_queue_depth() -> usize {
    64
}

fn default_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for GumloopConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            user_id: String::new(),
            flow_id: String::new(),
            base_url: default_base_url(),
            input_name: default_input_name(),
            output_name: default_output_name(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            workdir: default_workdir(),
            timeout_secs: default_verifier_timeout_secs(),
            file_suffix: default_file_suffix(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl TheoremicaConfig {
    /// Carrega a configuração do caminho fornecido ou de `theoremica.toml`.
    /// Usa valores padrão se o arquivo não existir e aplica as variáveis de ambiente.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<TheoremicaConfig>(&contents)?
        } else {
            Self::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Sobrescreve as credenciais da Gumloop com valores do ambiente.
    /// Variáveis vazias são ignoradas.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets = [
            ("GUMLOOP_API_KEY", &mut self.gumloop.api_key),
            ("GUMLOOP_USER_ID", &mut self.gumloop.user_id),
            ("GUMLOOP_FLOW_ID", &mut self.gumloop.flow_id),
        ];
        for (name, field) in targets {
            if let Some(value) = lookup(name)
                && !value.is_empty()
            {
                *field = value;
            }
        }
    }

    /// Rejeita dimensões que deixariam o serviço inutilizável.
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.workers == 0 {
            bail!("scheduler.workers must be at least 1");
        }
        if self.scheduler.queue_depth == 0 {
            bail!("scheduler.queue_depth must be at least 1");
        }
        if self.verifier.timeout_secs == 0 {
            bail!("verifier.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

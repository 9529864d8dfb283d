//! Interface de linha de comando do Theoremica baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, convert, check)
//! e flags globais (--config, --verbose).

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Theoremica: converte provas em linguagem natural para Lean e as verifica.
#[derive(Debug, Parser)]
#[command(name = "theoremica", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./theoremica.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inicia o servidor HTTP com o pool de workers.
    Serve {
        /// Endereço de escuta; sobrescreve `server.addr`.
        #[arg(long)]
        addr: Option<String>,

        /// Número de workers; sobrescreve `scheduler.workers`.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Converte uma prova em primeiro plano e mostra o código Lean gerado.
    Convert {
        /// Arquivo com o texto da prova, ou `-` para ler da entrada padrão.
        input: String,
    },

    /// Executa apenas a validação estrutural da prova.
    Check {
        /// Arquivo com o texto da prova, ou `-` para ler da entrada padrão.
        input: String,
    },
}

/// Lê o texto da prova de um arquivo ou da entrada padrão (`-`).
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read proof from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read proof from {input}"))
    }
}

//! Interface de terminal do Theoremica: spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`ConversionProgress`] acompanha visualmente
//! uma conversão executada pelo subcomando `convert`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ConversionError;
use crate::pipeline::ConversionResult;
use crate::validator::ValidationFailure;

/// Indicador visual de progresso para uma conversão no terminal.
///
/// Exibe um spinner durante o processamento e mensagens coloridas para
/// código verificado (verde), falha (vermelho) e código não verificado (amarelo).
pub struct ConversionProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para sucesso.
    green: Style,
    // Estilo vermelho para falha.
    red: Style,
    // Estilo amarelo para código que o Lean rejeitou.
    yellow: Style,
}

impl ConversionProgress {
    /// Inicia o spinner com a mensagem fornecida.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e exibe o resultado da conversão.
    pub fn complete(&self, outcome: &Result<ConversionResult, ConversionError>) {
        self.pb.finish_and_clear();
        match outcome {
            Ok(result) => {
                println!("{}", result.code);
                println!();
                if result.valid {
                    println!("  {} Lean accepted the generated code", self.green.apply_to("✓"));
                } else {
                    println!("  {} Lean rejected the generated code", self.yellow.apply_to("!"));
                }
            }
            Err(e) => {
                println!("  {} Conversion failed: {e}", self.red.apply_to("✗"));
            }
        }
    }
}

/// Imprime o resultado da validação estrutural.
pub fn print_check(outcome: &Result<(), ValidationFailure>) {
    match outcome {
        Ok(()) => println!("  {} Proof structure looks valid", Style::new().green().bold().apply_to("✓")),
        Err(reason) => println!("  {} {reason}", Style::new().red().bold().apply_to("✗")),
    }
}

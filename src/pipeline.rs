use serde::Serialize;
use tracing::{debug, info};

use crate::error::ConversionError;
use crate::gumloop::Transformer;
use crate::sanitizer::sanitize;
use crate::validator::validate;
use crate::verifier::Verifier;

/// Generated Lean code and whether the checker accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    #[serde(rename = "lean_code")]
    pub code: String,
    pub valid: bool,
}

/// Validate → transform → sanitize → verify, stopping at the first failing stage.
pub struct ConversionPipeline<T, V> {
    transformer: T,
    verifier: V,
}

impl<T, V> ConversionPipeline<T, V>
where
    T: Transformer + Sync,
    V: Verifier + Sync,
{
    pub fn new(transformer: T, verifier: V) -> Self {
        Self {
            transformer,
            verifier,
        }
    }

    /// Run every stage against one proof.
    ///
    /// Structural problems fail before any external call is made. A checker
    /// rejection is not an error: it comes back as `valid == false`.
    pub async fn convert(&self, proof_text: &str) -> Result<ConversionResult, ConversionError> {
        validate(proof_text)?;
        debug!("proof passed structural validation");

        self.transformer
            .check_configured()
            .map_err(ConversionError::Configuration)?;

        let raw = self.transformer.transform(proof_text).await?;
        let code = sanitize(&raw);
        debug!(raw_bytes = raw.len(), clean_bytes = code.len(), "sanitized generated code");

        let valid = self.verifier.verify(&code).await;
        info!(valid, "conversion finished");

        Ok(ConversionResult { code, valid })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gumloop::GumloopError;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const VALID_PROOF: &str = "Assume x > 0.\nTherefore x > 0.\nQED";

    /// Transformer double that counts calls and replies with a fixed answer.
    #[derive(Clone)]
    pub(crate) struct MockTransformer {
        pub calls: Arc<AtomicUsize>,
        pub reply: Result<String, u16>,
        pub configured: bool,
    }

    impl MockTransformer {
        pub(crate) fn ok(code: &str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                reply: Ok(code.to_string()),
                configured: true,
            }
        }

        pub(crate) fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                ..Self::ok("")
            }
        }

        pub(crate) fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::ok("")
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transformer for MockTransformer {
        fn check_configured(&self) -> Result<(), String> {
            if self.configured {
                Ok(())
            } else {
                Err("api key".to_string())
            }
        }

        async fn transform(&self, _proof_text: &str) -> Result<String, GumloopError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(code) => Ok(code.clone()),
                Err(status) => Err(GumloopError::Api {
                    status: *status,
                    message: "mock error".to_string(),
                }),
            }
        }
    }

    /// Verifier double that records what it was asked to check.
    #[derive(Clone)]
    pub(crate) struct MockVerifier {
        pub verdict: bool,
        pub seen: Arc<Mutex<Vec<String>>>,
    }

    impl MockVerifier {
        pub(crate) fn returning(verdict: bool) -> Self {
            Self {
                verdict,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Verifier for MockVerifier {
        async fn verify(&self, code: &str) -> bool {
            self.seen.lock().unwrap().push(code.to_string());
            self.verdict
        }
    }

    #[tokio::test]
    async fn invalid_proof_never_reaches_the_transformer() {
        let transformer = MockTransformer::ok("theorem t : True := trivial");
        let pipeline = ConversionPipeline::new(transformer.clone(), MockVerifier::returning(true));

        let err = pipeline.convert("Therefore nothing.").await.unwrap_err();
        assert!(matches!(err, ConversionError::Validation(_)));
        assert_eq!(transformer.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_configuration_fails_before_transform() {
        let transformer = MockTransformer::unconfigured();
        let pipeline = ConversionPipeline::new(transformer.clone(), MockVerifier::returning(true));

        let err = pipeline.convert(VALID_PROOF).await.unwrap_err();
        assert!(matches!(err, ConversionError::Configuration(ref m) if m == "api key"));
        assert_eq!(transformer.call_count(), 0);
    }

    #[tokio::test]
    async fn transform_failure_is_propagated() {
        let verifier = MockVerifier::returning(true);
        let pipeline = ConversionPipeline::new(MockTransformer::failing(502), verifier.clone());

        let err = pipeline.convert(VALID_PROOF).await.unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Transform(GumloopError::Api { status: 502, .. })
        ));
        assert!(verifier.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn verifier_sees_sanitized_code() {
        let verifier = MockVerifier::returning(true);
        let pipeline = ConversionPipeline::new(
            MockTransformer::ok("```lean\\ntheorem t : True := trivial\\n```"),
            verifier.clone(),
        );

        let result = pipeline.convert(VALID_PROOF).await.unwrap();
        assert_eq!(result.code, "theorem t : True := trivial");
        assert!(result.valid);
        assert_eq!(
            *verifier.seen.lock().unwrap(),
            vec!["theorem t : True := trivial".to_string()]
        );
    }

    #[tokio::test]
    async fn rejected_code_is_a_result_not_an_error() {
        let pipeline = ConversionPipeline::new(
            MockTransformer::ok("theorem t : False := sorry"),
            MockVerifier::returning(false),
        );

        let result = pipeline.convert(VALID_PROOF).await.unwrap();
        assert!(!result.valid);
        assert_eq!(result.code, "theorem t : False := sorry");
    }

    #[test]
    fn result_serializes_with_lean_code_field() {
        let result = ConversionResult {
            code: "theorem t".into(),
            valid: true,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["lean_code"], "theorem t");
        assert_eq!(json["valid"], true);
    }
}

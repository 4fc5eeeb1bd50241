//! Cross-checking a collapsed tree against an independent evaluation.

/// Outcome of checking a finished expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Confirmed,
    Mismatch { expected: f64, computed: f64 },
    /// The reference evaluator could not evaluate the source text.
    Unevaluable(String),
}

impl Verification {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Verification::Confirmed)
    }
}

/// Decides whether a computed value is the right answer for `source`.
///
/// Called with the session lock held, so implementations must not block.
pub trait ResultVerifier: Send + Sync {
    fn verify(&self, source: &str, computed: f64) -> Verification;
}

/// Re-evaluates the source text with the exact rational evaluator.
#[derive(Debug, Clone, Copy)]
pub struct OracleVerifier {
    tolerance: f64,
}

impl OracleVerifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// `|a - b| <= tol * max(1, |a|, |b|)`
    pub fn agrees(&self, expected: f64, computed: f64) -> bool {
        let scale = 1.0f64.max(expected.abs()).max(computed.abs());
        (expected - computed).abs() <= self.tolerance * scale
    }
}

impl Default for OracleVerifier {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

impl ResultVerifier for OracleVerifier {
    fn verify(&self, source: &str, computed: f64) -> Verification {
        match distcalc_eval::evaluate_f64(source) {
            Ok(expected) if self.agrees(expected, computed) => Verification::Confirmed,
            Ok(expected) => Verification::Mismatch { expected, computed },
            Err(e) => Verification::Unevaluable(e.to_string()),
        }
    }
}

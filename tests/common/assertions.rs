//! Custom test assertions

use governance_gateway::{GenerationSource, GovernedResponse};

/// Assert two values are approximately equal (for floats)
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-9_f64)
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left_val: f64 = $left as f64;
        let right_val: f64 = $right as f64;
        let diff = (left_val - right_val).abs();
        assert!(
            diff < $epsilon,
            "assertion failed: `(left ~= right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` (epsilon: `{:?}`)",
            left_val,
            right_val,
            diff,
            $epsilon
        );
    };
}

/// Assertions for pipeline responses
pub trait GovernedResponseAssertions {
    /// Assert the result came from `backend` and every billed generation did too
    fn assert_attributed_to(&self, backend: &str);

    /// Assert the result was served from a degraded source
    fn assert_degraded(&self);
}

impl GovernedResponseAssertions for GovernedResponse {
    fn assert_attributed_to(&self, backend: &str) {
        assert_eq!(
            self.source.backend(),
            backend,
            "Expected result from {}, got {:?}",
            backend,
            self.source
        );
        for billed in &self.billed {
            assert_eq!(billed.backend, backend, "Cost attributed to {}", billed.backend);
        }
    }

    fn assert_degraded(&self) {
        assert!(
            matches!(
                self.source,
                GenerationSource::Fallback { .. } | GenerationSource::LocalSynthesis
            ),
            "Expected degraded source, got {:?}",
            self.source
        );
    }
}

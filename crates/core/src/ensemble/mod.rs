//! Ensemble prediction - fan-out, fallback selection and aggregation.
//!
//! ```text
//! analyze(text)
//!     │
//!     ├── HeuristicAnalyzer (inline, never fails)
//!     ├── sentiment backend ──┐ concurrent, per-branch deadline,
//!     └── FallbackChain ──────┘ missing is not an error
//!            │ primary LLM → secondary LLM
//!            ▼
//!       Aggregator (weighted mean over responders) → Prediction
//! ```

pub mod aggregator;
pub mod fallback;
pub mod predictor;
pub mod types;

pub use aggregator::Aggregator;
pub use fallback::FallbackChain;
pub use predictor::EnsemblePredictor;
pub use types::{ModelScore, Prediction, SystemHealth, SystemStatus, Verdict};

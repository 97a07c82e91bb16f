//! Verdict Engine
//!
//! The ETSI EN 319102-1 validation processes, evaluated over an immutable
//! [`verdict_core::DiagnosticData`] snapshot:
//! - Builds and validates certificate chains (XCV)
//! - Accepts, checks freshness of and selects revocation data (RAC, RFC, CRS)
//! - Slides the validation time back to a trustworthy control time (VTS, PCV)
//! - Promotes `_NO_POE` conclusions using proofs of existence (PSV)
//!
//! ## Evaluation model
//!
//! Every process is a [`Chain`] of checks executed strictly in order. The
//! first check failing at `FAIL` level writes the conclusion and stops the
//! chain; `WARN` and `INFORM` failures only add messages. Each executed chain
//! becomes one [`Block`] of the report tree.
//!
//! ## Entry points
//!
//! - [`DocumentValidator::validate`] - validate every timestamp and signature
//! - [`DocumentValidator::extract_poe`] - validate timestamps and gather proofs of existence
//! - [`DocumentValidator::validate_signature`] - validate one signature against a POE set

pub mod basic;
pub mod chain;
pub mod checks;
pub mod context;
pub mod crs;
pub mod pcv;
pub mod poe;
pub mod psv;
pub mod rac;
pub mod rfc;
pub mod validator;
pub mod vts;
pub mod xcv;

pub use chain::{Block, BlockKind, Chain, ChainItem, Check, CheckResult, CheckStatus};
pub use context::ProcessContext;
pub use poe::PoeSet;
pub use validator::{DocumentValidator, TokenReport, ValidationReport, ValidatorConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

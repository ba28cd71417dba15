pub mod builder;
pub mod config;
pub mod errors;
pub mod gas;
pub mod lens_carbon;
pub mod operation;
pub mod registry;
pub mod submit;
pub mod verify;

pub use crate::builder::CallBuilder;
pub use crate::config::{Identity, LensCarbonConfiguration};
pub use crate::errors::{BuildError, LensCarbonError, ReadError, SubmissionError};
pub use crate::gas::{GasOverrides, GasPolicy};
pub use crate::lens_carbon::LensCarbon;
pub use crate::operation::{
    OperationKind, OperationParams, OperationReport, OperationRequest, OperationState,
    SubmissionResult, VerificationOutcome,
};
pub use crate::registry::ContractRegistry;
pub use crate::submit::Submitter;
pub use crate::verify::{Assertion, Verifier};

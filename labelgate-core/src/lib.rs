//! Labelgate core - label validation for Kubernetes admission requests

pub mod config;
pub mod error;
pub mod labels;
pub mod policy;
pub mod request;
pub mod response;
pub mod settings;
pub mod validator;

pub use error::{PolicyError, Result};
pub use labels::LabelSet;
pub use settings::{Criterion, Settings};
pub use validator::{evaluate, Verdict};

//! # manifest-lint
//!
//! Static validation of infrastructure-as-code artifacts before they are
//! deployed: Kubernetes manifests, Helm chart metadata and values, and
//! Dockerfiles.
//!
//! ## Features
//!
//! - **Resource rules**: naming, label and annotation limits, required
//!   fields, kind-specific structure (Deployment, Service)
//! - **Chart rules**: version format, dependency shape, resource limits in values
//! - **Dockerfile rules**: instruction order, root user, ADD/pip pitfalls, image tags
//! - **Security heuristics**: hardcoded secret scan and permissive RBAC rules
//! - **Quota totals**: CPU/memory requests summed across a manifest set
//!
//! Validators are pure functions returning [`Finding`]s. Only parsing, file
//! reading and configuration loading return errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use manifest_lint::{LintConfig, lint_manifests, format_report, OutputFormat};
//!
//! # fn main() -> manifest_lint::Result<()> {
//! let manifest = std::fs::read_to_string("deploy.yaml")?;
//! let report = lint_manifests(&manifest, "deploy.yaml", &LintConfig::default())?;
//! println!("{}", format_report(&report, OutputFormat::Text));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod formatter;
pub mod lint;
pub mod report;
pub mod rules;
pub mod types;

pub use aggregate::{ResourceQuantity, aggregate};
pub use config::{LintConfig, load_config};
pub use document::{DocPath, Document, Scalar, parse, parse_stream};
pub use error::{LintError, Result};
pub use formatter::{OutputFormat, format_report};
pub use lint::{
    lint_chart, lint_documents, lint_dockerfile, lint_manifests, lint_quota, lint_release_quota,
};
pub use report::{ExternalLintResult, Report};
pub use rules::ResourceDescriptor;
pub use types::{Finding, RuleCategory, RuleCode, Severity, Subject};

/// The current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

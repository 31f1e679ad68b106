//! Expense reimbursement backend.
//!
//! Employees submit reimbursement tickets and managers approve or reject
//! them. The crate follows a hexagonal layout: [`domain`] owns entities,
//! workflows and ports; [`inbound`] and [`outbound`] hold the adapters;
//! [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

//! Development environment supervisor.
//!
//! Services are listed in `services.yml` at the monorepo root:
//!
//! ```yaml
//! services:
//!   - name: ams
//!     directory: account-service
//!     internal: true
//!   - name: api
//!     directory: api
//!   - name: gw
//!     directory: gateway
//!     skip: true
//! ```
//!
//! Each managed service is built with `go build` inside its directory and
//! started in the background; stopping sends `kill` to its PID.
//!
//! ```bash
//! devenv status
//! devenv start ams api --cover
//! devenv stop
//! ```

pub mod error;
pub mod exit_status;
pub mod paths;
pub mod service;
pub mod services_config;
pub mod state;

pub use error::{DevenvError, Result};
pub use exit_status::is_exit_status;
pub use service::Service;
pub use services_config::{filter_managed_services, filter_services, services_to_map, ServicesConfiguration};
pub use state::ServiceState;

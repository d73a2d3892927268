//! HTTP middleware.
//!
//! ```text
//! Request → Trace → AuthGateLayer ──allow──→ Handler → Response
//!                        │
//!                        └──deny──→ 400/401 {"code", "message"}
//! ```

pub mod gate;

pub use gate::{AuthGateLayer, AuthGateService};

mod api;

pub use api::{DenialBody, HealthResponse, LoginRequest, LoginResponse, WhoAmIResponse};

/// Router Module Index
///
/// Splits the routing table into three security tiers so that access control
/// is applied at the module level (via Axum layers) rather than per handler.
/// A route placed in the wrong module fails loudly in tests instead of
/// silently skipping a check.

/// Routes open to anonymous clients. Read handlers here still run the
/// visibility filter, so unpublished articles never leak through them.
pub mod public;

/// Routes behind the authentication layer. Every handler receives a
/// validated `Identity`; role checks happen inside the handlers because the
/// required role differs per endpoint.
pub mod authenticated;

/// Routes restricted to the admin role.
pub mod admin;

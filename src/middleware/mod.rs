/// Middleware module
///
/// Cookie-based access-token gate for protected routes.

mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;

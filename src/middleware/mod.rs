pub mod request_id;

pub use request_id::{CORRELATION_ID_HEADER, RequestIdMiddleware, RequestIdMiddlewareService};

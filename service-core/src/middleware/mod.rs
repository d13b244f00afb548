pub mod cors;
pub mod error_detail;
pub mod request_id;
pub mod security_headers;

pub use cors::{OriginPolicy, build_cors_layer, origin_guard_middleware};
pub use error_detail::{ErrorDetailPolicy, error_detail_middleware};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;

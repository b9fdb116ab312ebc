pub mod method_not_allowed;
pub mod request_id;

pub use method_not_allowed::method_not_allowed_detail;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};

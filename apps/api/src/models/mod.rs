use serde::Serialize;

pub mod apply;
pub mod post;

/// `{"success": true, "data": ...}` wrapper used by the write endpoints.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data,
        }
    }
}

pub mod http;

#[cfg(test)]
pub mod test_helpers;

pub use http::{create_router, AppState};

//! Upload orchestration and HTTP surface for the Vermeer media service.
//!
//! The HTTP layer is a thin adapter over the core crates: it parses paths
//! with the variant key codec, calls into the derivative pipeline, and maps
//! errors onto the response set the route schema declares (200/400/403 for
//! uploads, 200/404 for reads).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod routes;
mod upload;

pub use config::ServerConfig;
pub use routes::{AppState, create_router};
pub use upload::Uploader;

pub mod downloads;
pub mod handlers;
pub mod media;
pub mod routes;

pub use routes::create_router;

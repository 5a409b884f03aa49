pub mod handler;
pub mod templates;

pub use handler::create_pages_router;
pub use templates::PageRenderer;

//! PDF processing layer
//!
//! Page-spec parsing and document assembly. The qpdf FFI handles page
//! copying between documents; printpdf builds image-backed documents.

pub mod assemble;
pub mod images;
pub mod pages;

pub use images::ImageUpload;
pub use pages::{parse_page_spec, SpecMode};

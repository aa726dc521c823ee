pub mod context;
pub mod dates;
pub mod dei;
pub mod doctype;
pub mod document;
pub mod facts;
pub mod filing;
pub mod heal;
pub mod units;

// Re-exports
pub use doctype::DocumentType;
pub use document::InstanceDocument;
pub use facts::{ConceptValue, Precision};
pub use filing::Filing;
pub use units::NOT_SPECIFIED;

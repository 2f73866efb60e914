mod backend;
mod backends;
mod result;

pub use backend::{DetectorBackend, PERSON_CLASS_ID};
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{BoundingBox, Detection};

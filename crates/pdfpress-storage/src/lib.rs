//! Filesystem artifact store for PdfPress.
//!
//! All job artifacts live under one storage root:
//!
//! - `uploads/{id}.pdf` - the original upload
//! - `tmp/{id}.pdf` - optimizer scratch output, never served
//! - `outputs/{id}_web.pdf` - the published result
//!
//! Scratch and outputs share the root so publishing is a single
//! atomic rename on the same filesystem.

pub mod artifact;
pub mod stream;

pub use artifact::{ArtifactStore, UploadSink};
pub use stream::ByteStream;

//! Streaming types for artifact reads.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

/// A stream of bytes for reading artifacts without buffering them.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

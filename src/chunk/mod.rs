//! Length-prefixed chunk framing for corpus streams.
//!
//! A corpus is zero or more `[u32 LE length][payload]` chunks with no file
//! header, footer, or checksum. Each payload is one encoded match.
//!
//! ## Overview
//!
//! - **ChunkWriter**: appends chunks to a sink, eliding empty payloads
//! - **ChunkReader**: push-driven parser (`feed` bytes, get complete chunks)
//! - **ChunkStream**: iterator over the chunks of any `Read`
//!
//! A stream that ends inside a chunk is not an error. The complete chunks
//! before it stand, and the tail is reported as a [`FramingWarning`].

pub mod reader;
pub mod stream;
pub mod writer;

pub use reader::{ChunkReader, FramingWarning, ReadState};
pub use stream::ChunkStream;
pub use writer::{ChunkWriter, LENGTH_PREFIX};

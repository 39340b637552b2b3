//! Runtime support for render functions generated by `jade`.
//!
//! A generated function renders on two threads. A producer, spawned in a
//! [`std::thread::scope`], walks the template and writes fragments into a
//! [`PipeWriter`]; the calling thread reads them from the [`PipeReader`] and
//! forwards them to the destination through [`copy`] or [`format`]. The pipe
//! has no buffer, so the producer never runs ahead of the consumer.
//!
//! ```
//! use jadec_runtime::{Closed, finish, copy, pipe, write_esc};
//!
//! fn greet(name: &str, wr: &mut dyn std::io::Write) -> std::io::Result<()> {
//!     let (mut w, r) = pipe();
//!     std::thread::scope(|s| {
//!         let producer = s.spawn(move || -> Result<(), Closed> {
//!             let buffer = &mut w;
//!             buffer.write_str("<p>Hello ")?;
//!             write_esc(name, buffer)?;
//!             buffer.write_str("</p>")?;
//!             w.close();
//!             Ok(())
//!         });
//!         let consumed = copy(r, wr);
//!         finish(producer, consumed)
//!     })
//! }
//!
//! let mut out = Vec::new();
//! greet("<you>", &mut out).unwrap();
//! assert_eq!(out, b"<p>Hello &lt;you&gt;</p>");
//! ```

mod escape;
mod format;
mod pool;
mod stream;

pub use escape::{Integer, escape_html, write_esc, write_int, write_raw};
pub use format::{copy, format};
pub use pool::PooledBuffer;
pub use stream::{Chunk, Closed, PipeReader, PipeWriter, finish, pipe};

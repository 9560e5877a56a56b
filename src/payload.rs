use bytes::Bytes;

use crate::config::Config;

pub const TEMPLATE: &str =
    "This is the first part before we finish. A string te repeated soo man times\n";
pub const TRAILER: &str = "This is the finish line of the response.\n";

/// Concatenates `template` with itself `count` times.
///
/// The output is allocated once with its final size, so building the
/// multi-megabyte payloads stays linear in the output length.
pub fn repeat(template: &str, count: usize) -> String {
    template.repeat(count)
}

/// The response material shared by both servers. Built once at startup and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Payloads {
    /// The template repeated `repeat_count` times.
    pub chunk: Bytes,
    /// The template repeated `repeat_count * write_count` times.
    pub bulk: Bytes,
    pub trailer: Bytes,
    /// How often the chunked server writes `chunk` per response.
    pub write_count: usize,
}

impl Payloads {
    pub fn build(template: &str, trailer: &str, repeat_count: usize, write_count: usize) -> Self {
        Self {
            chunk: Bytes::from(repeat(template, repeat_count)),
            bulk: Bytes::from(repeat(template, repeat_count * write_count)),
            trailer: Bytes::copy_from_slice(trailer.as_bytes()),
            write_count,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(TEMPLATE, TRAILER, config.repeat_count, config.write_count)
    }

    /// Length of every response body, whichever strategy sends it.
    pub fn body_len(&self) -> usize {
        self.write_count * self.chunk.len() + self.trailer.len()
    }
}

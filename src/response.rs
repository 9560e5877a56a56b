use std::{convert::Infallible, fmt, sync::Arc};

use bytes::{Bytes, BytesMut};
use http_body_util::{combinators::BoxBody, BodyExt, Full, StreamBody};
use hyper::{
    body::Frame,
    header::{HeaderValue, CONTENT_LENGTH},
    Request, Response,
};

use crate::payload::Payloads;

pub type Body = BoxBody<Bytes, Infallible>;

/// How a response body is handed to the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// `write_count` frames of the chunk unit, then a frame with the trailer.
    Chunked,
    /// Bulk payload and trailer copied into one buffer, sent as a single frame.
    Bulk,
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStrategy::Chunked => f.write_str("chunked"),
            WriteStrategy::Bulk => f.write_str("bulk"),
        }
    }
}

/// Answers every request with the same body, ignoring method, path, headers
/// and request body.
#[derive(Debug, Clone)]
pub struct Responder {
    strategy: WriteStrategy,
    payloads: Arc<Payloads>,
    declare_content_length: bool,
}

impl Responder {
    pub fn new(strategy: WriteStrategy, payloads: Arc<Payloads>) -> Self {
        Self {
            strategy,
            payloads,
            declare_content_length: false,
        }
    }

    pub fn declare_content_length(mut self, declare: bool) -> Self {
        self.declare_content_length = declare;
        self
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    pub fn respond<B>(&self, _request: Request<B>) -> Response<Body> {
        let body = match self.strategy {
            WriteStrategy::Chunked => self.chunked_body(),
            WriteStrategy::Bulk => self.bulk_body(),
        };
        let mut response = Response::new(body);
        if self.declare_content_length {
            response.headers_mut().insert(
                CONTENT_LENGTH,
                HeaderValue::from(self.payloads.body_len()),
            );
        }
        response
    }

    fn chunked_body(&self) -> Body {
        let frames = std::iter::repeat(self.payloads.chunk.clone())
            .take(self.payloads.write_count)
            .chain(std::iter::once(self.payloads.trailer.clone()))
            // An empty data frame would end the chunked encoding early.
            .filter(|data| !data.is_empty())
            .map(|data| Ok::<_, Infallible>(Frame::data(data)));
        StreamBody::new(futures::stream::iter(frames)).boxed()
    }

    fn bulk_body(&self) -> Body {
        let Payloads { bulk, trailer, .. } = &*self.payloads;
        let mut body = BytesMut::with_capacity(bulk.len() + trailer.len());
        body.extend_from_slice(bulk);
        body.extend_from_slice(trailer);
        Full::new(body.freeze()).boxed()
    }
}

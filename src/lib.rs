//! # Bucket Thumbnails
//!
//! An event-driven thumbnail pipeline. An image lands in a storage bucket,
//! a small function relays its location to a pub/sub topic, and a second
//! function fetches the image, shrinks it to fit a bounding box, and writes
//! a PNG thumbnail to a destination bucket.
//!
//! # Architecture: Two Decoupled Stages
//!
//! ```text
//! 1. Notifier     storage event  →  {"Bucket","Key"} on the topic
//! 2. Thumbnailer  topic message  →  <prefix>/<name>.png in the destination bucket
//! ```
//!
//! The topic is the only thing the stages share. The notifier never reads
//! the object, so upload bursts cost one publish each; the thumbnailer
//! scales independently and sees nothing but the two-field message.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`message`] | The `{"Bucket","Key"}` contract between the stages |
//! | [`naming`] | Destination key derivation: `prefix + "/" + filename + ".png"` |
//! | [`events`] | Serde models of inbound storage events and bus deliveries |
//! | [`notifier`] | Stage 1: filter records and publish one message each |
//! | [`thumbnailer`] | Stage 2: fetch, fit, encode, store |
//! | [`imaging`] | Pure-Rust fit-within resize and PNG encoding |
//! | [`storage`] | `ObjectStore` trait and the S3 implementation |
//! | [`bus`] | `Publisher` trait and the SNS implementation |
//! | [`error`] | `PipelineError` and the six outcome codes |
//! | [`config`] | Layered configuration: env over TOML file over defaults |
//! | [`lambda`] | Runtime wiring, tracing, AWS clients |
//!
//! # Design Decisions
//!
//! ## Deterministic Destination Keys
//!
//! The thumbnail key depends only on the source key and the configured
//! prefix. Redelivered messages therefore overwrite the same object, which
//! makes at-least-once delivery safe without any bookkeeping. Two sources
//! with the same base name in different directories collide; the last
//! write wins.
//!
//! ## Never Upscale
//!
//! Thumbnails fit inside the box with the aspect ratio kept. Images already
//! inside the box are re-encoded at their own size, never enlarged. The fit
//! math lives in [`imaging::calculate_fit_dimensions`] and is a pure
//! function, tested without decoding anything.
//!
//! ## Bounded Decoding
//!
//! Source objects are untrusted. The format is sniffed from magic bytes
//! rather than the key's extension, and the decoder runs under an
//! allocation ceiling so a decompression bomb fails as
//! `UNSUPPORTED_FORMAT` instead of exhausting memory.
//!
//! ## No In-Process Retries
//!
//! Every failure is terminal for its invocation and goes back to the
//! runtime, which owns redelivery. The components hold no state between
//! invocations beyond their immutable settings and clients.
//!
//! ## Traits at the I/O Seams
//!
//! [`storage::ObjectStore`], [`bus::Publisher`] and
//! [`imaging::ImageBackend`] separate the pipeline logic from AWS and from
//! pixel work, so every failure path is covered by in-memory tests.

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod imaging;
pub mod lambda;
pub mod message;
pub mod naming;
pub mod notifier;
pub mod storage;
pub mod thumbnailer;

#[cfg(test)]
pub(crate) mod test_helpers;

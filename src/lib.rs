//! Production schedule transcoder.
//!
//! Converts stripe schedules (days of labelled activity blocks, some
//! continuing from the previous day) to merge-coded day-line text and back,
//! and recovers schedules from text-service replies that arrived as JSON.

pub mod calendar;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod merge_codes;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod recovery;
pub mod state;
pub mod types;

pub use decoder::decode_schedule;
pub use encoder::{encode_schedule, encode_schedule_with, EncodeOptions};
pub use error::{CodecError, ModelError, PipelineError};
pub use merge_codes::{assign_merge_codes, MergeCodeStrategy};
pub use pipeline::Transcoder;
pub use recovery::{GateOutcome, RecoveryGate};
pub use types::{RawScheduleDay, ScheduleDay, Stripe, TranscoderConfig};

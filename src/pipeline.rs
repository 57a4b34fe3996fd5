//! Transcoding pipeline around the external model.
//!
//! recognition: images → model → RecoveryGate → day-line text
//! decode:      day-line text → local decoder, or model → JSON → schedule
//! generation:  free text → model → JSON → schedule
//!
//! Codec calls are pure; only the model call awaits.

use std::path::PathBuf;

use crate::decoder::decode_schedule;
use crate::encoder::{schedule_from_raw, EncodeOptions};
use crate::error::{CodecError, PipelineError};
use crate::model::{ModelRequest, ScheduleModel};
use crate::prompts::{build_decode_prompt, build_generation_prompt, build_recognition_prompt};
use crate::recovery::{parse_raw_schedule, RecoveryGate};
use crate::types::{ScheduleDay, TranscoderConfig};

impl TranscoderConfig {
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            merge_codes: self.merge_codes,
            require_full_month: self.require_full_month,
        }
    }
}

pub struct Transcoder<M: ScheduleModel> {
    model: M,
    config: TranscoderConfig,
    gate: RecoveryGate,
}

impl<M: ScheduleModel> Transcoder<M> {
    pub fn new(model: M, config: TranscoderConfig) -> Self {
        let gate = RecoveryGate::new(config.encode_options());
        Self {
            model,
            config,
            gate,
        }
    }

    /// Transcribe calendar images into day-line text.
    pub async fn recognize_calendar(
        &self,
        images: &[PathBuf],
        year: i32,
        month: u32,
    ) -> Result<String, PipelineError> {
        let prompt = build_recognition_prompt(year, month)?;
        let reply = self
            .model
            .complete(ModelRequest::with_images(prompt, images.to_vec()))
            .await?;
        let outcome = self.gate.apply(&reply)?;
        if outcome.was_recovered() {
            log::info!("Recognition reply for {}-{:02} was JSON; re-rendered as text", year, month);
        }
        Ok(outcome.into_text().trim().to_string())
    }

    /// Day-line text → schedule. Tries the local decoder first when enabled.
    pub async fn text_to_schedule(
        &self,
        text: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ScheduleDay>, PipelineError> {
        if self.config.local_decode_first {
            match decode_schedule(text, year, month) {
                Ok(days) => return Ok(days),
                Err(e) if e.is_decode_error() => {
                    log::info!("Local decode failed ({}); asking the model", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let prompt = build_decode_prompt(text, year, month)?;
        let reply = self.model.complete(ModelRequest::text(prompt)).await?;
        schedule_from_reply(&reply)
    }

    /// Free-text description → schedule.
    pub async fn describe_to_schedule(
        &self,
        description: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ScheduleDay>, PipelineError> {
        let prompt = build_generation_prompt(description, year, month)?;
        let reply = self.model.complete(ModelRequest::text(prompt)).await?;
        schedule_from_reply(&reply)
    }
}

fn schedule_from_reply(reply: &str) -> Result<Vec<ScheduleDay>, PipelineError> {
    let raw = parse_raw_schedule(reply).map_err(|e| match e {
        CodecError::RecoveryFailed(msg) => PipelineError::InvalidModelOutput(msg),
        other => PipelineError::Codec(other),
    })?;
    Ok(schedule_from_raw(raw)?)
}

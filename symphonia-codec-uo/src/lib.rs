// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Symphonia crates. Please see clippy.toml for their
// justification.
#![allow(clippy::comparison_chain)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! A pure Rust decoder for the UO narrowband CELP speech codec.
//!
//! The synthesis pipeline itself lives in [`core`] as [`core::UoCore`], a container-agnostic
//! state machine anyone can drive directly. [`UoDecoder`] is the thin adapter that plugs
//! `UoCore` into Symphonia's [`AudioDecoder`] trait.

use symphonia_core::audio::{AsGenericAudioBufferRef, Audio, AudioBuffer, AudioMut, AudioSpec,
    Channels, GenericAudioBufferRef};
use symphonia_core::codecs::audio::well_known::CODEC_ID_UO;
use symphonia_core::codecs::audio::{AudioCodecParameters, AudioDecoder, AudioDecoderOptions,
    FinalizeResult};
use symphonia_core::codecs::registry::{RegisterableAudioDecoder, SupportedAudioCodec};
use symphonia_core::codecs::CodecInfo;
use symphonia_core::errors::{decode_error, Result};
use symphonia_core::formats::Packet;
use symphonia_core::support_audio_codec;

mod bitreader;
mod gain;
mod lsf;
mod tables;

pub mod core;

use self::core::{UoCore, FRAME_SIZE, SAMPLES_PER_FRAME};

/// Sample rate of the UO narrowband codec, in Hz.
pub const SAMPLE_RATE: u32 = 8_000;

/// Decodes a single 48-byte UO frame with a fresh, freshly-reset core. A convenience for callers
/// that only need one-off decoding and don't want to manage a [`UoCore`] themselves.
pub fn decode_block(frame: &[u8; FRAME_SIZE]) -> [f32; SAMPLES_PER_FRAME] {
    let mut core = UoCore::new();
    core.decode_frame(frame, 0)
}

/// UO narrowband CELP speech decoder.
pub struct UoDecoder {
    params: AudioCodecParameters,
    core: UoCore,
    buf: AudioBuffer<f32>,
}

impl UoDecoder {
    pub fn try_new(params: &AudioCodecParameters, _opts: &AudioDecoderOptions) -> Result<Self> {
        let spec = AudioSpec::new(SAMPLE_RATE, Channels::CHANNEL_LAYOUT_MONO);

        Ok(UoDecoder {
            params: params.clone(),
            core: UoCore::new(),
            buf: AudioBuffer::new(spec, SAMPLES_PER_FRAME),
        })
    }

    /// Decodes `packet`'s payload, which symphonia-format-uo prefixes with a single reset marker
    /// byte ahead of the 48-byte frame: `[reset: u8, frame: [u8; 48]]`. A non-zero marker means
    /// the container observed a block boundary and the decoder state must be cleared before this
    /// frame is decoded.
    ///
    /// Unlike `UoCore::decode_frame`, this is the one place the UO decoder can fail: a payload
    /// whose length (once the marker byte is stripped) isn't exactly one 48-byte frame is a
    /// contract violation by the format reader, not a truncated-stream condition the core is
    /// meant to tolerate silently.
    fn decode_inner(&mut self, packet: &Packet) -> Result<()> {
        let data = &packet.data;

        if data.len() != 1 + FRAME_SIZE {
            return decode_error("uo: packet payload is not one reset byte plus one 48-byte frame");
        }

        let reset = data[0] != 0;
        if reset {
            self.core.reset();
        }

        let frame: &[u8; FRAME_SIZE] = data[1..].try_into().unwrap();
        let samples = self.core.decode_frame(frame, 0);

        self.buf.clear();
        self.buf.render_uninit(Some(SAMPLES_PER_FRAME));

        let plane = self.buf.plane_mut(0).unwrap();
        plane.copy_from_slice(&samples);

        Ok(())
    }
}

impl AudioDecoder for UoDecoder {
    fn reset(&mut self) {
        self.core.reset();
    }

    fn codec_info(&self) -> &CodecInfo {
        &Self::supported_codecs()[0].info
    }

    fn codec_params(&self) -> &AudioCodecParameters {
        &self.params
    }

    fn decode(&mut self, packet: &Packet) -> Result<GenericAudioBufferRef<'_>> {
        if let Err(e) = self.decode_inner(packet) {
            self.buf.clear();
            Err(e)
        }
        else {
            Ok(self.buf.as_generic_audio_buffer_ref())
        }
    }

    fn finalize(&mut self) -> FinalizeResult {
        Default::default()
    }

    fn last_decoded(&self) -> GenericAudioBufferRef<'_> {
        self.buf.as_generic_audio_buffer_ref()
    }
}

impl RegisterableAudioDecoder for UoDecoder {
    fn try_registry_new(
        params: &AudioCodecParameters,
        opts: &AudioDecoderOptions,
    ) -> Result<Box<dyn AudioDecoder>>
    where
        Self: Sized,
    {
        Ok(Box::new(UoDecoder::try_new(params, opts)?))
    }

    fn supported_codecs() -> &'static [SupportedAudioCodec] {
        &[support_audio_codec!(CODEC_ID_UO, "uo", "UO Narrowband CELP")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_block_produces_192_finite_samples() {
        let frame = [0u8; FRAME_SIZE];
        let out = decode_block(&frame);
        assert_eq!(out.len(), SAMPLES_PER_FRAME);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn decode_block_is_deterministic() {
        let frame = [0x42u8; FRAME_SIZE];
        assert_eq!(decode_block(&frame), decode_block(&frame));
    }

    fn new_decoder() -> UoDecoder {
        let params = AudioCodecParameters::new();
        let opts = AudioDecoderOptions::default();
        UoDecoder::try_new(&params, &opts).unwrap()
    }

    #[test]
    fn decode_rejects_a_packet_that_is_not_one_frame() {
        use symphonia_core::formats::prelude::{Duration, Timestamp};

        let mut decoder = new_decoder();
        let short = Packet::new(0, Timestamp::new(0), Duration::new(SAMPLES_PER_FRAME as u64), vec![0u8; 10]);
        assert!(decoder.decode(&short).is_err());
    }

    #[test]
    fn decode_accepts_a_well_formed_packet() {
        use symphonia_core::formats::prelude::{Duration, Timestamp};

        let mut decoder = new_decoder();
        let mut data = vec![0u8];
        data.extend_from_slice(&[0u8; FRAME_SIZE]);
        let packet = Packet::new(0, Timestamp::new(0), Duration::new(SAMPLES_PER_FRAME as u64), data);
        assert!(decoder.decode(&packet).is_ok());
    }
}

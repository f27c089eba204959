//! Decoding of the inline audio payload into a playable waveform.
//!
//! The generation service returns signed 16-bit little-endian mono PCM at
//! 24 000 Hz. The layout is a contract of the service, not negotiated per
//! payload; the decoded buffer still carries its declared rate so playback
//! never has to guess.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::{BufMut, BytesMut};

use crate::errors::{ForgeError, Result};

pub const FORGE_SAMPLE_RATE: u32 = 24_000;
pub const FORGE_CHANNELS: u16 = 1;

const BYTES_PER_SAMPLE: usize = 2;
const WAV_HEADER_LEN: usize = 44;

/// Normalized mono waveform, samples in `[-1.0, 1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    /// Re-quantizes the samples into a RIFF/WAVE container so the buffer can
    /// be persisted as a playable file.
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let data_len = self.samples.len() * BYTES_PER_SAMPLE;
        let byte_rate = self.sample_rate * self.channels as u32 * BYTES_PER_SAMPLE as u32;
        let block_align = self.channels * BYTES_PER_SAMPLE as u16;

        let mut buf = BytesMut::with_capacity(WAV_HEADER_LEN + data_len);
        buf.put_slice(b"RIFF");
        buf.put_u32_le(36 + data_len as u32);
        buf.put_slice(b"WAVE");
        buf.put_slice(b"fmt ");
        buf.put_u32_le(16);
        buf.put_u16_le(1); // linear PCM
        buf.put_u16_le(self.channels);
        buf.put_u32_le(self.sample_rate);
        buf.put_u32_le(byte_rate);
        buf.put_u16_le(block_align);
        buf.put_u16_le(16); // bits per sample
        buf.put_slice(b"data");
        buf.put_u32_le(data_len as u32);

        for sample in &self.samples {
            let quantized = (sample * 32768.0).clamp(-32768.0, 32767.0) as i16;
            buf.put_i16_le(quantized);
        }

        buf.to_vec()
    }
}

/// Decodes a base64 payload, then the raw PCM. The presenter-facing entry
/// point for "decode and play".
pub fn decode_pcm16_base64(payload: &str) -> Result<PcmBuffer> {
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| ForgeError::decode(format!("invalid base64 audio payload: {e}")))?;
    decode_pcm16(&bytes)
}

/// Reinterprets raw bytes as little-endian PCM16 and normalizes to `f32`.
pub fn decode_pcm16(bytes: &[u8]) -> Result<PcmBuffer> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(ForgeError::decode(format!(
            "PCM payload length {} is not a multiple of {BYTES_PER_SAMPLE}",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(PcmBuffer {
        samples,
        sample_rate: FORGE_SAMPLE_RATE,
        channels: FORGE_CHANNELS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_samples(samples: &[i16]) -> String {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        BASE64_STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_and_normalizes_samples() {
        let payload = encode_samples(&[0, 16384, -16384, i16::MIN, i16::MAX]);
        let buffer = decode_pcm16_base64(&payload).expect("payload should decode");

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.sample_rate, FORGE_SAMPLE_RATE);
        assert_eq!(buffer.channels, FORGE_CHANNELS);
        assert_eq!(buffer.samples[0], 0.0);
        assert_eq!(buffer.samples[1], 0.5);
        assert_eq!(buffer.samples[2], -0.5);
        assert_eq!(buffer.samples[3], -1.0);
        assert_eq!(buffer.samples[4], 32767.0 / 32768.0);
        assert!(buffer.samples.iter().all(|s| (-1.0..1.0).contains(s)));
    }

    #[test]
    fn odd_length_payload_fails_cleanly() {
        let payload = BASE64_STANDARD.encode([0u8, 1, 2]);
        let err = decode_pcm16_base64(&payload).expect_err("odd length must fail");
        assert!(matches!(err, ForgeError::Decode(_)));
    }

    #[test]
    fn malformed_base64_fails_cleanly() {
        let err = decode_pcm16_base64("not base64 !!!").expect_err("bad base64 must fail");
        assert!(matches!(err, ForgeError::Decode(_)));
    }

    #[test]
    fn empty_payload_decodes_to_empty_buffer() {
        let buffer = decode_pcm16_base64("").expect("empty payload is valid");
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_secs(), 0.0);
    }

    #[test]
    fn wav_container_round_trips_header_fields() {
        let payload = encode_samples(&[0, 1000, -1000, 32000]);
        let buffer = decode_pcm16_base64(&payload).expect("payload should decode");
        let wav = buffer.to_wav_bytes();

        assert_eq!(wav.len(), 44 + 4 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        // Sample rate field at offset 24, little endian.
        let rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(rate, FORGE_SAMPLE_RATE);
        // First re-quantized sample survives unchanged.
        let first = i16::from_le_bytes([wav[44], wav[45]]);
        assert_eq!(first, 0);
        let second = i16::from_le_bytes([wav[46], wav[47]]);
        assert_eq!(second, 1000);
    }

    #[test]
    fn duration_reflects_sample_rate() {
        let buffer = PcmBuffer {
            samples: vec![0.0; FORGE_SAMPLE_RATE as usize],
            sample_rate: FORGE_SAMPLE_RATE,
            channels: FORGE_CHANNELS,
        };
        assert_eq!(buffer.duration_secs(), 1.0);
    }
}

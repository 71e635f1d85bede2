//! Audio transcription extraction
//!
//! The input is decoded to mono f32 PCM with symphonia, resampled to the
//! transcription rate with rubato, written to a transient WAV, and sent to
//! the speech-to-text client. The transient file is backed by a
//! `NamedTempFile`, so it is removed on every exit path (success, failed
//! transcription, or decode failure) when the handle drops.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{ExtractError, TextExtractor, Transcriber};

/// Sample rate expected by the transcription provider
const TRANSCRIBE_SAMPLE_RATE: u32 = 16_000;

pub struct AudioExtractor {
    transcriber: Arc<Transcriber>,
}

impl AudioExtractor {
    pub fn new(transcriber: Arc<Transcriber>) -> Self {
        Self { transcriber }
    }
}

#[async_trait::async_trait]
impl TextExtractor for AudioExtractor {
    fn name(&self) -> &'static str {
        "audio"
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        // Decode + resample + WAV write are CPU-bound
        let source = path.to_owned();
        let wav: NamedTempFile = tokio::task::spawn_blocking(move || {
            let samples = decode_to_mono(&source)?;
            write_transient_wav(&samples)
        })
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task failed: {e}")))??;

        let transcript = self.transcriber.transcribe_wav(wav.path()).await?;

        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(ExtractError::UnintelligibleAudio(
                "transcription produced no text".to_string(),
            ));
        }

        Ok(transcript)
        // `wav` drops here; the transient file is unlinked
    }
}

/// Decode any supported audio container to mono f32 at the transcribe rate
fn decode_to_mono(path: &Path) -> Result<Vec<f32>, ExtractError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| ExtractError::DecodeFailure(format!("unrecognized audio format: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ExtractError::DecodeFailure("no audio track found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ExtractError::DecodeFailure("sample rate unknown".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ExtractError::DecodeFailure(format!("decoder init failed: {e}")))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(ExtractError::DecodeFailure(format!("packet read failed: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| ExtractError::DecodeFailure(format!("packet decode failed: {e}")))?;

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);

        if sample_buf.is_none() {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        let buf = sample_buf.as_mut().unwrap();
        buf.copy_interleaved_ref(decoded);

        // Average channels to mono
        for frame in buf.samples().chunks_exact(channels) {
            mono.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    if mono.is_empty() {
        return Err(ExtractError::DecodeFailure(
            "no audio samples decoded".to_string(),
        ));
    }

    debug!(
        samples = mono.len(),
        source_rate = sample_rate,
        "Audio decoded to mono"
    );

    if sample_rate != TRANSCRIBE_SAMPLE_RATE {
        resample_mono(mono, sample_rate)
    } else {
        Ok(mono)
    }
}

/// Resample mono PCM to the transcribe rate using sinc interpolation
///
/// Single-pass: chunk size equals input length.
fn resample_mono(samples: Vec<f32>, source_rate: u32) -> Result<Vec<f32>, ExtractError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = TRANSCRIBE_SAMPLE_RATE as f64 / source_rate as f64;
    let num_frames = samples.len();

    let mut resampler = SincFixedIn::<f32>::new(ratio, 4.0, params, num_frames, 1)
        .map_err(|e| ExtractError::DecodeFailure(format!("resampler init failed: {e}")))?;

    let output = resampler
        .process(&[samples], None)
        .map_err(|e| ExtractError::DecodeFailure(format!("resampling failed: {e}")))?;

    let resampled = output.into_iter().next().unwrap_or_default();
    debug!(
        frames = resampled.len(),
        source_rate,
        target_rate = TRANSCRIBE_SAMPLE_RATE,
        "Audio resampled"
    );

    Ok(resampled)
}

/// Write mono samples as a 16-bit PCM WAV into a transient file
fn write_transient_wav(samples: &[f32]) -> Result<NamedTempFile, ExtractError> {
    let wav = tempfile::Builder::new()
        .prefix("lectern-transcribe-")
        .suffix(".wav")
        .tempfile()?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TRANSCRIBE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(wav.path(), spec)
        .map_err(|e| ExtractError::Internal(format!("WAV create failed: {e}")))?;
    for &sample in samples {
        let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(clamped)
            .map_err(|e| ExtractError::Internal(format!("WAV write failed: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| ExtractError::Internal(format!("WAV finalize failed: {e}")))?;

    Ok(wav)
}

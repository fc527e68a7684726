// Still-frame decoding: images via the image crate, video posters via ffmpeg-next
use std::path::Path;
use anyhow::Result;

use crate::error::MediaError;

extern crate ffmpeg_next as ffmpeg;

/// Longest edge of a decoded still
pub const MAX_STILL_EDGE: u32 = 1280;

/// RGBA pixels ready to upload as a texture
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode an image file, downscaling anything larger than `MAX_STILL_EDGE`
pub fn decode_image(path: &Path) -> Result<DecodedImage, MediaError> {
    if !path.exists() {
        return Err(MediaError::NotFound(path.to_path_buf()));
    }

    let img = image::open(path).map_err(|e| MediaError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let img = if img.width() > MAX_STILL_EDGE || img.height() > MAX_STILL_EDGE {
        img.thumbnail(MAX_STILL_EDGE, MAX_STILL_EDGE)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

/// Decode the first frame of a video as its poster
pub fn decode_poster(path: &Path) -> Result<DecodedImage, MediaError> {
    if !path.exists() {
        return Err(MediaError::NotFound(path.to_path_buf()));
    }

    let failed = |reason: String| MediaError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let mut decoder = VideoDecoder::open(path).map_err(|e| failed(e.to_string()))?;
    let (width, height) = decoder.preview_size();
    let rgba = decoder
        .seek_and_decode(0.0)
        .ok_or_else(|| failed("no decodable frame".to_string()))?;

    Ok(DecodedImage { rgba, width, height })
}

/// Video decoder for extracting frames at specific positions
pub struct VideoDecoder {
    format_ctx: ffmpeg::format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    pub duration: f64,
    preview_width: u32,
    preview_height: u32,
}

impl VideoDecoder {
    /// Open a video file for decoding
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg::init()?;

        let format_ctx = ffmpeg::format::input(path)?;

        let stream = format_ctx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("No video stream found"))?;

        let video_stream_index = stream.index();

        let context_decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context_decoder.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            anyhow::bail!("Video has no dimensions");
        }

        // Posters keep the aspect ratio, capped at the still size
        let preview_width = width.min(MAX_STILL_EDGE);
        let preview_height = ((height as f32 * (preview_width as f32 / width as f32)) as u32).max(1);

        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg::format::Pixel::RGBA,
            preview_width,
            preview_height,
            ffmpeg::software::scaling::Flags::BILINEAR,
        )?;

        let duration = if format_ctx.duration() > 0 {
            format_ctx.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            let time_base = stream.time_base();
            if stream.duration() > 0 {
                stream.duration() as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
            } else {
                0.0
            }
        };

        Ok(Self {
            format_ctx,
            video_stream_index,
            decoder,
            scaler,
            duration,
            preview_width,
            preview_height,
        })
    }

    /// Get preview dimensions
    pub fn preview_size(&self) -> (u32, u32) {
        (self.preview_width, self.preview_height)
    }

    /// Seek to a position (0.0 to 1.0) and decode a frame
    /// Returns RGBA pixel data
    pub fn seek_and_decode(&mut self, position: f32) -> Option<Vec<u8>> {
        let position = position.clamp(0.0, 1.0);
        let target_time = self.duration * position as f64;

        let timestamp = (target_time * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;

        if self.format_ctx.seek(timestamp, ..timestamp).is_err() {
            let _ = self.format_ctx.seek(0, ..timestamp);
        }

        self.decoder.flush();
        self.decode_next_frame()
    }

    /// Decode the next frame from the current position
    fn decode_next_frame(&mut self) -> Option<Vec<u8>> {
        let mut decoded_frame = ffmpeg::frame::Video::empty();
        let mut scaled_frame = ffmpeg::frame::Video::empty();

        for (stream, packet) in self.format_ctx.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                if self.scaler.run(&decoded_frame, &mut scaled_frame).is_ok() {
                    let data = scaled_frame.data(0);
                    let stride = scaled_frame.stride(0);
                    let height = self.preview_height as usize;
                    let width = self.preview_width as usize;

                    // Copy data accounting for stride
                    let mut rgba_data = Vec::with_capacity(width * height * 4);
                    for y in 0..height {
                        let row_start = y * stride;
                        let row_end = row_start + width * 4;
                        rgba_data.extend_from_slice(&data[row_start..row_end]);
                    }

                    return Some(rgba_data);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gema.jpg");
        assert_eq!(decode_image(&path).unwrap_err(), MediaError::NotFound(path.clone()));
        assert!(matches!(decode_poster(&path), Err(MediaError::NotFound(_))));
    }

    #[test]
    fn corrupt_images_fail_to_decode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("write");
        assert!(matches!(decode_image(&path), Err(MediaError::Decode { .. })));
    }

    #[test]
    fn large_images_are_downscaled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wide.png");
        image::RgbaImage::new(2560, 100).save(&path).expect("save");

        let decoded = decode_image(&path).expect("decode");
        assert_eq!(decoded.width, MAX_STILL_EDGE);
        assert_eq!(decoded.rgba.len(), (decoded.width * decoded.height * 4) as usize);
    }
}

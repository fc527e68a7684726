// ffmpeg playback for tile and modal video surfaces
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use anyhow::Result;

extern crate ffmpeg_next as ffmpeg;

/// Largest frame width handed to the UI
const MAX_DISPLAY_WIDTH: u32 = 1280;
/// Pace of frame delivery while playing
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// Poll interval of a paused decoder
const IDLE_INTERVAL: Duration = Duration::from_millis(16);

/// Video frame data
#[derive(Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Playback state shared with the decode thread
#[derive(Default)]
struct PlayerState {
    playing: bool,
    /// Set when the stream ran out; cleared by play or seek
    ended: bool,
    /// The decode thread exited on an error. Terminal.
    failed: bool,
    current_time: f64,
    duration: f64,
}

enum PlayerCommand {
    Play,
    Pause,
    Seek(f64),
    Stop,
}

/// One open video file decoded on its own thread
pub struct VideoPlayer {
    state: Arc<Mutex<PlayerState>>,
    frame_receiver: Receiver<VideoFrame>,
    command_sender: Sender<PlayerCommand>,
    decoder_thread: Option<JoinHandle<()>>,
}

impl VideoPlayer {
    /// Open the file and start a paused decoder thread
    pub fn new(path: &Path) -> Result<Self> {
        ffmpeg::init()?;

        let format_ctx = ffmpeg::format::input(path)?;
        let stream = format_ctx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("No video stream in {}", path.display()))?;

        // Fail here rather than on the decode thread if the codec is unusable
        let context_decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        context_decoder.decoder().video()?;

        let duration = if format_ctx.duration() > 0 {
            format_ctx.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            0.0
        };

        let state = Arc::new(Mutex::new(PlayerState {
            duration,
            ..PlayerState::default()
        }));

        let (frame_sender, frame_receiver) = mpsc::channel();
        let (command_sender, command_receiver) = mpsc::channel();

        let thread_path = path.to_path_buf();
        let thread_state = Arc::clone(&state);
        let decoder_thread = thread::spawn(move || {
            decoder_thread_main(thread_path, thread_state, frame_sender, command_receiver);
        });

        tracing::debug!("Opened player for {}", path.display());

        Ok(Self {
            state,
            frame_receiver,
            command_sender,
            decoder_thread: Some(decoder_thread),
        })
    }

    fn state(&self) -> MutexGuard<'_, PlayerState> {
        lock(&self.state)
    }

    /// Start or resume. A finished stream restarts from zero.
    pub fn play(&mut self) -> Result<()> {
        let restart = {
            let mut state = self.state();
            if state.failed {
                anyhow::bail!("decoder stopped");
            }
            let restart = state.ended;
            if restart {
                state.current_time = 0.0;
            }
            state.ended = false;
            state.playing = true;
            restart
        };
        if restart {
            self.command_sender.send(PlayerCommand::Seek(0.0))?;
        }
        if let Err(e) = self.command_sender.send(PlayerCommand::Play) {
            self.state().playing = false;
            return Err(e.into());
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        self.state().playing = false;
        let _ = self.command_sender.send(PlayerCommand::Pause);
    }

    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    pub fn has_ended(&self) -> bool {
        self.state().ended
    }

    pub fn has_failed(&self) -> bool {
        self.state().failed
    }

    /// Seek to a position (0.0 to 1.0)
    pub fn seek(&mut self, position: f64) {
        let target_time = position.clamp(0.0, 1.0) * self.duration();
        {
            let mut state = self.state();
            state.ended = false;
            state.current_time = target_time;
        }
        let _ = self.command_sender.send(PlayerCommand::Seek(target_time));
    }

    /// Current position as a fraction (0.0 to 1.0)
    pub fn current_position(&self) -> f64 {
        let state = self.state();
        if state.duration > 0.0 {
            state.current_time / state.duration
        } else {
            0.0
        }
    }

    pub fn current_time(&self) -> f64 {
        self.state().current_time
    }

    pub fn duration(&self) -> f64 {
        self.state().duration
    }

    /// Newest decoded frame, if any arrived since the last call (non-blocking)
    pub fn latest_frame(&mut self) -> Option<VideoFrame> {
        let mut latest = None;
        while let Ok(frame) = self.frame_receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        let _ = self.command_sender.send(PlayerCommand::Stop);
        if let Some(handle) = self.decoder_thread.take() {
            let _ = handle.join();
        }
    }
}

fn lock(state: &Mutex<PlayerState>) -> MutexGuard<'_, PlayerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs the decoder; any error leaves the player stopped and failed so the
/// coordinator never keeps pointing at it
fn decoder_thread_main(
    path: PathBuf,
    state: Arc<Mutex<PlayerState>>,
    frame_sender: Sender<VideoFrame>,
    command_receiver: Receiver<PlayerCommand>,
) {
    if let Err(e) = run_decoder(&path, &state, &frame_sender, &command_receiver) {
        tracing::warn!("Decoder for {} stopped: {}", path.display(), e);
        mark_failed(&state);
    }
}

fn mark_failed(state: &Mutex<PlayerState>) {
    let mut s = lock(state);
    s.playing = false;
    s.failed = true;
}

fn run_decoder(
    path: &Path,
    state: &Mutex<PlayerState>,
    frame_sender: &Sender<VideoFrame>,
    command_receiver: &Receiver<PlayerCommand>,
) -> Result<()> {
    let mut format_ctx = ffmpeg::format::input(path)?;

    let stream = format_ctx
        .streams()
        .best(ffmpeg::media::Type::Video)
        .ok_or_else(|| anyhow::anyhow!("No video stream"))?;

    let video_stream_index = stream.index();
    let time_base = stream.time_base();
    let seconds_per_tick = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

    let context_decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
    let mut decoder = context_decoder.decoder().video()?;

    let width = decoder.width();
    let height = decoder.height();
    let display_width = width.min(MAX_DISPLAY_WIDTH);
    let display_height = (height as f32 * (display_width as f32 / width as f32)) as u32;

    let mut scaler = ffmpeg::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        ffmpeg::format::Pixel::RGBA,
        display_width,
        display_height,
        ffmpeg::software::scaling::Flags::BILINEAR,
    )?;

    let mut playing = false;
    let mut last_frame_time = Instant::now();
    let mut decoded_frame = ffmpeg::frame::Video::empty();
    let mut scaled_frame = ffmpeg::frame::Video::empty();

    loop {
        while let Ok(cmd) = command_receiver.try_recv() {
            match cmd {
                PlayerCommand::Play => playing = true,
                PlayerCommand::Pause => playing = false,
                PlayerCommand::Stop => return Ok(()),
                PlayerCommand::Seek(target_time) => {
                    let timestamp = (target_time * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
                    let _ = format_ctx.seek(timestamp, ..timestamp);
                    decoder.flush();
                    lock(state).current_time = target_time;
                }
            }
        }

        if !playing {
            thread::sleep(IDLE_INTERVAL);
            continue;
        }

        let elapsed = last_frame_time.elapsed();
        if elapsed < FRAME_INTERVAL {
            thread::sleep(FRAME_INTERVAL - elapsed);
        }
        last_frame_time = Instant::now();

        let mut delivered = false;
        for (stream, packet) in format_ctx.packets() {
            if stream.index() != video_stream_index || decoder.send_packet(&packet).is_err() {
                continue;
            }

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if scaler.run(&decoded_frame, &mut scaled_frame).is_err() {
                    continue;
                }

                let pts = decoded_frame.pts().unwrap_or(0);
                lock(state).current_time = pts as f64 * seconds_per_tick;

                let frame = VideoFrame {
                    data: packed_rgba(&scaled_frame, display_width, display_height),
                    width: display_width,
                    height: display_height,
                };
                if frame_sender.send(frame).is_err() {
                    // Player dropped
                    return Ok(());
                }
                delivered = true;
                break;
            }

            if delivered {
                break;
            }
        }

        // End of stream: report it, the coordinator rewinds
        if !delivered {
            let mut s = lock(state);
            s.playing = false;
            s.ended = true;
            playing = false;
        }
    }
}

/// Copy the visible rows of an RGBA frame, dropping the stride padding
fn packed_rgba(frame: &ffmpeg::frame::Video, width: u32, height: u32) -> Vec<u8> {
    let data = frame.data(0);
    let stride = frame.stride(0);
    let row_len = (width * 4) as usize;

    let mut rgba = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let row_start = y * stride;
        rgba.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    rgba
}

//! Interactive Clicks Example
//!
//! Reads click commands from stdin and rewrites the overlay after every
//! change, the way a click-to-segment UI would.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example interactive_clicks -- -m <MODEL> -e <NPY> -i <IMAGE> -o <OUTPUT>
//! ```
//!
//! # Commands
//!
//! * `x y [pos|neg]` - add a click (positive by default)
//! * `box x0 y0 x1 y1` - set the box prompt
//! * `nobox` - remove the box prompt
//! * `undo` - remove the last click
//! * `clear` - remove every prompt
//! * `quit` - exit

use clap::Parser;
use image::RgbImage;
use sam_prompt::core::config::{OrtExecutionProvider, OrtSessionConfig};
use sam_prompt::prelude::*;
use sam_prompt::utils::{draw_prompts, init_tracing, save_image};
use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Command-line arguments for the interactive clicks example
#[derive(Parser)]
#[command(name = "interactive_clicks")]
#[command(about = "Interactive Clicks Example - segments from clicks typed on stdin")]
struct Args {
    /// Path to the ONNX decoder model
    #[arg(short, long)]
    model_path: PathBuf,

    /// Path to the `.npy` image embedding
    #[arg(short, long)]
    embedding: PathBuf,

    /// Path to the image the embedding was computed from
    #[arg(short, long)]
    image: PathBuf,

    /// Where to write the overlay after each change
    #[arg(short, long, default_value = "overlay.png")]
    output: PathBuf,

    /// JSON segmenter configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Feed the previous mask back into the decoder
    #[arg(long)]
    refine: bool,

    /// Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
    #[arg(long, default_value = "cpu")]
    device: String,
}

enum Command {
    Click(Click),
    Box(BoxPrompt),
    NoBox,
    Undo,
    Clear,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, SamError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["quit"] | ["exit"] => Ok(Command::Quit),
        ["undo"] => Ok(Command::Undo),
        ["clear"] => Ok(Command::Clear),
        ["nobox"] => Ok(Command::NoBox),
        ["box", coords @ ..] if coords.len() == 4 => {
            Ok(Command::Box(coords.join(",").parse::<BoxPrompt>()?))
        }
        [x, y] => Ok(Command::Click(format!("{},{}", x, y).parse()?)),
        [x, y, kind] => Ok(Command::Click(Click::new(
            parse_number(x)?,
            parse_number(y)?,
            kind.parse()?,
        ))),
        _ => Err(SamError::invalid_input(format!(
            "unrecognized command '{}'",
            line.trim()
        ))),
    }
}

fn parse_number(s: &str) -> Result<f32, SamError> {
    s.parse()
        .map_err(|_| SamError::invalid_input(format!("'{}' is not a number", s)))
}

/// Where and how the overlay is written after each change.
struct OverlayTarget<'a> {
    image: &'a RgbImage,
    color: [u8; 4],
    alpha: f32,
    output: &'a Path,
}

fn write_overlay<D: PromptDecoder>(
    session: &ClickSession<D>,
    target: &OverlayTarget<'_>,
    result: Option<&Segmentation>,
) -> SamResult<()> {
    let mut canvas = match result {
        Some(seg) => seg.composite(target.image, target.color, target.alpha)?,
        None => target.image.clone(),
    };
    draw_prompts(&mut canvas, &session.prompts()?);
    save_image(&canvas, target.output)
}

/// Puts `provider` ahead of CPU while keeping the rest of the loaded ORT
/// settings.
fn apply_device(mut config: SegmenterConfig, provider: OrtExecutionProvider) -> SegmenterConfig {
    if provider == OrtExecutionProvider::CPU {
        return config;
    }
    let ort_config = config
        .ort_session
        .take()
        .unwrap_or_else(OrtSessionConfig::new)
        .add_execution_provider(provider)
        .add_execution_provider(OrtExecutionProvider::CPU);
    config.ort_session(ort_config)
}

/// Applies one command. Failures are logged and never end the loop; only
/// `quit` does.
fn apply_command<D: PromptDecoder>(
    session: &ClickSession<D>,
    target: &OverlayTarget<'_>,
    command: Command,
) -> ControlFlow<()> {
    let outcome = match command {
        Command::Quit => return ControlFlow::Break(()),
        Command::Click(click) => session.add_click(click),
        Command::Box(b) => session.set_box(Some(b)),
        Command::NoBox => session.set_box(None),
        Command::Undo => session.undo(),
        Command::Clear => session.clear().map(|_| None),
    };

    match outcome {
        Ok(result) => {
            if let Some(seg) = &result {
                info!(
                    "{} foreground pixels in {:.2?}",
                    seg.mask.foreground_area(),
                    seg.elapsed
                );
            }
            if let Err(e) = write_overlay(session, target, result.as_ref()) {
                error!("Failed to write overlay {:?}: {}", target.output, e);
            }
        }
        Err(e) => error!("Segmentation failed: {}", e),
    }
    ControlFlow::Continue(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SegmenterConfig::from_json_file(path)?,
        None => SegmenterConfig::default(),
    };
    let config = apply_device(config, OrtExecutionProvider::parse_device(&args.device)?);

    let image = load_image(&args.image)?;
    let segmenter = PointSegmenter::builder()
        .model_path(&args.model_path)
        .embedding_path(&args.embedding)
        .image(&image)
        .config(config)
        .build()?;
    let session = ClickSession::new(segmenter).with_refinement(args.refine);
    let cfg = session.decoder().config();
    let target = OverlayTarget {
        image: &image,
        color: cfg.mask_color,
        alpha: cfg.overlay_alpha,
        output: &args.output,
    };

    info!(
        "Ready: {}x{} image, type `x y [pos|neg]`, `box x0 y0 x1 y1`, `undo`, `clear` or `quit`",
        image.width(),
        image.height()
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };
        if apply_command(&session, &target, command).is_break() {
            break;
        }
        io::stdout().flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array4, ArrayView4};
    use sam_prompt::processors::MaskPrediction;
    use std::time::Duration;

    /// Marks the top-left pixel whenever there is at least one click.
    struct CornerDecoder;

    impl PromptDecoder for CornerDecoder {
        fn decode(
            &self,
            prompts: &PromptSet,
            _previous: Option<ArrayView4<'_, f32>>,
        ) -> SamResult<Option<Segmentation>> {
            let mut logits = Array4::from_elem((1, 1, 4, 4), -1.0f32);
            if !prompts.clicks.is_empty() {
                logits[[0, 0, 0, 0]] = 1.0;
            }
            let prediction = MaskPrediction::from_output(logits.view(), None, None, 0)?;
            Ok(Some(Segmentation {
                mask: prediction.to_binary(),
                prediction,
                elapsed: Duration::ZERO,
            }))
        }
    }

    #[test]
    fn test_device_keeps_loaded_ort_settings() {
        let config = SegmenterConfig::default()
            .ort_session(OrtSessionConfig::new().with_intra_threads(3));
        let config = apply_device(config, OrtExecutionProvider::CUDA { device_id: Some(1) });

        let ort = config.ort_session.unwrap();
        assert_eq!(ort.intra_threads, Some(3));
        assert_eq!(
            ort.execution_providers,
            Some(vec![
                OrtExecutionProvider::CUDA { device_id: Some(1) },
                OrtExecutionProvider::CPU
            ])
        );
    }

    #[test]
    fn test_cpu_device_leaves_config_alone() {
        let config = SegmenterConfig::default()
            .ort_session(OrtSessionConfig::new().with_intra_threads(2));
        let config = apply_device(config, OrtExecutionProvider::CPU);
        assert_eq!(config.ort_session.unwrap().intra_threads, Some(2));
    }

    #[test]
    fn test_save_failure_keeps_loop_running() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("overlay.unknownext");
        let image = RgbImage::new(4, 4);
        let target = OverlayTarget {
            image: &image,
            color: [30, 144, 255, 255],
            alpha: 0.5,
            output: &output,
        };
        let session = ClickSession::new(CornerDecoder);

        let click = parse_command("1 1").unwrap();
        assert!(apply_command(&session, &target, click).is_continue());
        assert!(!output.exists());

        let undo = parse_command("undo").unwrap();
        assert!(apply_command(&session, &target, undo).is_continue());
        assert!(session.prompts().unwrap().is_empty());

        let quit = parse_command("quit").unwrap();
        assert!(apply_command(&session, &target, quit).is_break());
    }

    #[test]
    fn test_overlay_written_after_click() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("overlay.png");
        let image = RgbImage::new(4, 4);
        let target = OverlayTarget {
            image: &image,
            color: [30, 144, 255, 255],
            alpha: 0.5,
            output: &output,
        };
        let session = ClickSession::new(CornerDecoder);

        let click = parse_command("1 1 pos").unwrap();
        assert!(apply_command(&session, &target, click).is_continue());
        assert!(output.exists());
    }
}

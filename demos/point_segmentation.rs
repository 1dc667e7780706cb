//! Point Segmentation Example
//!
//! Decodes a mask for a set of clicks (and an optional box) on one image,
//! using a precomputed image embedding and the ONNX prompt decoder.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example point_segmentation -- [OPTIONS] --model-path <MODEL> --embedding <NPY> --image <IMAGE>
//! ```
//!
//! # Arguments
//!
//! * `-m, --model-path` - Path to the ONNX decoder model
//! * `-e, --embedding` - Path to the `.npy` image embedding
//! * `-i, --image` - Path to the image the embedding was computed from
//! * `-p, --point` - Click as `x,y` or `x,y,label` (repeatable; label 1 = positive, 0 = negative)
//! * `--box` - Box prompt as `x0,y0,x1,y1`
//! * `-o, --output` - Where to write the composited overlay
//! * `--mask-output` - Where to write the binary mask
//! * `--config` - JSON segmenter configuration
//! * `--threshold` - Mask logit threshold (overrides the configuration)
//! * `--device` - Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
//! * `--inspect` - Print the model's declared inputs and outputs and exit
//!
//! # Example
//!
//! ```bash
//! cargo run --example point_segmentation -- \
//!     -m models/sam_onnx_quantized_example.onnx \
//!     -e data/dogs_embedding.npy -i data/dogs.jpg \
//!     -p 420,310 -p 600,300,0 -o output/dogs_overlay.png
//! ```

use clap::Parser;
use sam_prompt::core::config::{OrtExecutionProvider, OrtSessionConfig};
use sam_prompt::core::inference::load_session;
use sam_prompt::prelude::*;
use sam_prompt::utils::{draw_prompts, init_tracing, save_image};
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command-line arguments for the point segmentation example
#[derive(Parser)]
#[command(name = "point_segmentation")]
#[command(about = "Point Segmentation Example - decodes a mask from clicks on an image")]
struct Args {
    /// Path to the ONNX decoder model
    #[arg(short, long)]
    model_path: PathBuf,

    /// Path to the `.npy` image embedding
    #[arg(short, long)]
    embedding: Option<PathBuf>,

    /// Path to the image the embedding was computed from
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Click as `x,y` or `x,y,label`
    #[arg(short, long = "point")]
    points: Vec<Click>,

    /// Box prompt as `x0,y0,x1,y1`
    #[arg(long = "box")]
    box_prompt: Option<BoxPrompt>,

    /// Where to write the composited overlay
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the binary mask
    #[arg(long)]
    mask_output: Option<PathBuf>,

    /// JSON segmenter configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mask logit threshold
    #[arg(long)]
    threshold: Option<f32>,

    /// Number of pooled ONNX sessions
    #[arg(long)]
    session_pool_size: Option<usize>,

    /// Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Draw the clicks and box on the overlay
    #[arg(long)]
    draw_prompts: bool,

    /// Dump the result summary as JSON to stdout
    #[arg(long)]
    dump_json: bool,

    /// Print the model's declared inputs and outputs and exit
    #[arg(long)]
    inspect: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if args.inspect {
        let session = load_session(&args.model_path)?;
        for input in &session.inputs {
            println!("input  {}: {:?}", input.name, input.input_type);
        }
        for output in &session.outputs {
            println!("output {}: {:?}", output.name, output.output_type);
        }
        return Ok(());
    }

    let embedding_path = args
        .embedding
        .as_ref()
        .ok_or("--embedding is required unless --inspect is given")?;
    let image_path = args
        .image
        .as_ref()
        .ok_or("--image is required unless --inspect is given")?;

    let mut config = match &args.config {
        Some(path) => SegmenterConfig::from_json_file(path)?,
        None => SegmenterConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config = config.mask_threshold(threshold);
    }
    if let Some(size) = args.session_pool_size {
        config = config.session_pool_size(size);
    }

    info!("Using device: {}", args.device);
    let provider = OrtExecutionProvider::parse_device(&args.device)?;
    if provider != OrtExecutionProvider::CPU {
        let ort_config = config
            .ort_session
            .take()
            .unwrap_or_else(OrtSessionConfig::new)
            .add_execution_provider(provider)
            .add_execution_provider(OrtExecutionProvider::CPU);
        config = config.ort_session(ort_config);
    }

    let image = load_image(image_path)?;
    info!("Image size: {}x{}", image.width(), image.height());

    let segmenter = PointSegmenter::builder()
        .model_path(&args.model_path)
        .embedding_path(embedding_path)
        .image(&image)
        .config(config)
        .build()?;

    let mut prompts = PromptSet::from_clicks(args.points.iter().copied());
    prompts.box_prompt = args.box_prompt;
    if prompts.is_empty() {
        warn!("No clicks or box given, nothing to segment");
        return Ok(());
    }

    let result = match segmenter.predict(&prompts) {
        Ok(Some(result)) => result,
        Ok(None) => {
            warn!("Decoder produced no mask");
            return Ok(());
        }
        Err(e) => {
            error!("Segmentation failed: {}", e);
            return Err(e.into());
        }
    };

    let area = result.mask.foreground_area();
    info!(
        "Mask: {} foreground pixels, bbox {:?}, iou {:?}, {:.2?}",
        area,
        result.mask.bounding_box(),
        result.prediction.iou_score,
        result.elapsed
    );

    if args.dump_json {
        let payload = json!({
            "image": image_path,
            "width": image.width(),
            "height": image.height(),
            "prompts": &prompts,
            "foreground_area": area,
            "bbox": result.mask.bounding_box().map(|(x0, y0, x1, y1)| [x0, y0, x1, y1]),
            "iou_score": result.prediction.iou_score,
            "elapsed_ms": result.elapsed.as_secs_f64() * 1000.0,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    if let Some(path) = &args.mask_output {
        save_image(result.mask.as_gray(), path)?;
        info!("Mask saved to {:?}", path);
    }

    if let Some(path) = &args.output {
        let cfg = segmenter.config();
        let mut composite = result.composite(&image, cfg.mask_color, cfg.overlay_alpha)?;
        if args.draw_prompts {
            draw_prompts(&mut composite, &prompts);
        }
        save_image(&composite, path)?;
        info!("Overlay saved to {:?}", path);
    }

    Ok(())
}

use super::ort_infer_execution::{select_mask_output, should_feed_orig_im_size, to_array4};
use super::*;
use crate::core::config::{OrtExecutionProvider, OrtSessionConfig};
use crate::core::errors::SamError;

#[test]
fn test_missing_model_is_a_load_error() {
    match OrtInfer::new("dummy_path.onnx") {
        Err(SamError::ModelLoad { model_path, .. }) => assert_eq!(model_path, "dummy_path.onnx"),
        Err(SamError::Session(_)) => {}
        other => panic!("expected a load failure, got {other:?}"),
    }
}

#[test]
fn test_from_config_respects_pool_size_and_fails_on_missing_model() {
    let config = OrtSessionConfig::new()
        .with_intra_threads(1)
        .add_execution_provider(OrtExecutionProvider::CPU);
    let result = OrtInfer::from_config("dummy_path.onnx", Some(&config), 3);
    assert!(result.is_err());
}

#[cfg(not(feature = "cuda"))]
#[test]
fn test_disabled_provider_is_rejected() {
    let providers = OrtInfer::build_execution_providers(&[OrtExecutionProvider::CUDA {
        device_id: None,
    }]);
    assert!(providers.is_err());
}

#[test]
fn test_load_session_missing_file() {
    assert!(crate::core::inference::load_session("missing.onnx").is_err());
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_orig_im_size_fed_only_when_declared() {
    let declared = names(&["image_embeddings", "point_coords", "orig_im_size"]);
    assert!(should_feed_orig_im_size(None, &declared, "orig_im_size"));

    let static_export = names(&["image_embeddings", "point_coords"]);
    assert!(!should_feed_orig_im_size(None, &static_export, "orig_im_size"));
}

#[test]
fn test_orig_im_size_switch_overrides_model() {
    let declared = names(&["orig_im_size"]);
    assert!(!should_feed_orig_im_size(Some(false), &declared, "orig_im_size"));
    assert!(should_feed_orig_im_size(Some(true), &[], "orig_im_size"));
}

#[test]
fn test_mask_output_selection() {
    let declared = names(&["masks", "iou_predictions", "low_res_masks"]);
    assert_eq!(select_mask_output(None, &declared).as_deref(), Some("masks"));
    assert_eq!(
        select_mask_output(Some("low_res_masks"), &declared).as_deref(),
        Some("low_res_masks")
    );
    assert_eq!(select_mask_output(None, &[]), None);
}

#[test]
fn test_to_array4_accepts_matching_shape() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let array = to_array4(&[1, 2, 2, 3], &data).unwrap();
    assert_eq!(array.shape(), &[1, 2, 2, 3]);
    assert_eq!(array[[0, 1, 1, 2]], 11.0);
}

#[test]
fn test_to_array4_rejects_bad_shapes() {
    let data = vec![0.0f32; 12];
    assert!(to_array4(&[1, 12, 1], &data).is_none());
    assert!(to_array4(&[1, -1, 2, 6], &data).is_none());
    assert!(to_array4(&[1, 1, 2, 3], &data).is_none());
    assert!(to_array4(&[1, 2, 2, 4], &data).is_none());
}

use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{s, Array3};
use patch_tool::{
    config::Config,
    dataset::{Dataset, FrameSet},
    io,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::Path};

/// Writes an RGB image holding `(col, row, 50)` and a label map holding `col`.
fn write_frame(dir: &Path, index: usize, height: u32, width: u32) {
    RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 50]))
        .save(dir.join(format!("image_{}.png", index)))
        .unwrap();
    GrayImage::from_fn(width, height, |x, _| Luma([x as u8]))
        .save(dir.join(format!("annotation_{}.png", index)))
        .unwrap();
}

fn write_config(root: &Path, extra: &str) -> Config {
    let text = format!(
        r#"{{
    // frames live in the 'frames' directory
    dataset: {{
        dir: "{dataset}",
        image_ext: "png",
    }},
    patch: {{
        patch_size: [8, 8, 4],
        step_size: [8, 8],
        input_image_channel: [0, 1, 2],
        input_label_channel: [3],
    }},
    sampling: {{
        batch_size: 4,
        seed: 7,
        {extra}
    }},
    output: {{
        dir: "{output}",
    }},
}}"#,
        dataset = root.join("frames").display(),
        output = root.join("output").display(),
        extra = extra,
    );
    let path = root.join("config.json5");
    fs::write(&path, text).unwrap();
    Config::open(&path).unwrap()
}

fn setup(extra: &str) -> (tempfile::TempDir, Config) {
    let root = tempfile::tempdir().unwrap();
    let frames = root.path().join("frames");
    fs::create_dir_all(&frames).unwrap();
    write_frame(&frames, 0, 20, 20);
    write_frame(&frames, 1, 16, 12);
    write_frame(&frames, 2, 5, 5);
    let config = write_config(root.path(), extra);
    (root, config)
}

#[test]
fn discover_frames_in_index_order() {
    let (root, config) = setup("");
    fs::write(root.path().join("frames").join("image_x.png"), b"").unwrap();

    let files = io::discover_frames(&config.dataset).unwrap();
    let indices: Vec<_> = files.iter().map(|files| files.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let frames = io::load_frames(&config.dataset).unwrap();
    assert_eq!(frames[1].height(), 16);
    assert_eq!(frames[1].width(), 12);
    assert_eq!(frames[1].image_channels(), 3);
    assert_eq!(frames[1].annotation_channels(), 1);
}

#[test]
fn missing_annotation_is_reported() {
    let (root, config) = setup("");
    fs::remove_file(root.path().join("frames").join("annotation_1.png")).unwrap();

    let error = io::discover_frames(&config.dataset).unwrap_err();
    assert!(format!("{}", error).contains("annotation_1.png"));
}

#[test]
fn summaries_count_sequential_patches() {
    let (_root, config) = setup("");
    let mut rng = StdRng::seed_from_u64(1);
    let dataset = Dataset::open(config, &mut rng).unwrap();

    let summaries = dataset.summaries();
    let training = &summaries[0];
    assert_eq!(training.set, FrameSet::Training);
    assert_eq!(training.num_frames, 3);
    // 2 x 2 patches, then one patch each for the small frames
    assert_eq!(training.num_patches, 6);
    assert_eq!(training.steps_per_epoch, 1);
    assert!(summaries[1..].iter().all(|summary| summary.num_frames == 0));
}

#[test]
fn extract_writes_paired_patches() {
    let (root, config) = setup("");
    let mut rng = StdRng::seed_from_u64(1);
    let dataset = Dataset::open(config, &mut rng).unwrap();

    let counts = patch_tool::extract(&dataset, &mut rng).unwrap();
    assert_eq!(counts, vec![(FrameSet::Training, 6)]);

    let dir = root.path().join("output").join("training");
    (0..6).for_each(|index| {
        let image = io::load_raster(dir.join(format!("image_{}.bin", index))).unwrap();
        let annotation = io::load_raster(dir.join(format!("annotation_{}.bin", index))).unwrap();
        assert_eq!(image.dim(), (8, 8, 3));
        assert_eq!(annotation.dim(), (8, 8, 1));
        assert_eq!(annotation.slice(s![.., .., 0]), image.slice(s![.., .., 0]));
    });

    // the second patch starts at column 8 of the first frame
    let image = io::load_raster(dir.join("image_1.bin")).unwrap();
    assert_eq!(image[[0, 0, 0]], 8.0);

    // the last patch comes from the 5x5 frame and is zero-padded
    let image: Array3<f32> = io::load_raster(dir.join("image_5.bin")).unwrap();
    assert!(image.slice(s![5.., .., ..]).iter().all(|&value| value == 0.0));
    assert!(image.slice(s![.., 5.., ..]).iter().all(|&value| value == 0.0));
    assert_eq!(image[[4, 4, 2]], 50.0);
}

#[test]
fn sample_writes_batches() {
    let (root, config) = setup(r#"augmenter: "geometric", frame_weights: [0.5, 0.25, 0.25],"#);
    let mut rng = StdRng::seed_from_u64(1);
    let dataset = Dataset::open(config, &mut rng).unwrap();

    let paths = patch_tool::sample(&dataset, 3, rng).unwrap();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[2], root.path().join("output").join("batches").join("batch_2.bin"));

    paths.iter().for_each(|path| {
        let batch = io::load_batch(path).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.input.dim(), (4, 8, 8, 3));
        assert_eq!(batch.label.dim(), (4, 8, 8, 1));
        assert_eq!(
            batch.label.slice(s![.., .., .., 0]),
            batch.input.slice(s![.., .., .., 0])
        );
    });
}

#[test]
fn held_out_frames_use_uniform_weights() {
    let (_root, config) = setup(
        r#"validation_ratio: 0.34, frame_weights: [0.5, 0.25, 0.25],"#,
    );
    let mut rng = StdRng::seed_from_u64(3);
    let dataset = Dataset::open(config, &mut rng).unwrap();

    assert_eq!(dataset.split().training.len(), 2);
    assert_eq!(dataset.split().validation.len(), 1);
    assert!(dataset.generator(FrameSet::Training).unwrap().is_some());
    assert!(dataset.generator(FrameSet::Validation).unwrap().is_some());
    assert!(dataset.generator(FrameSet::Testing).unwrap().is_none());
}

#[test]
fn reject_mismatched_frame_weights() {
    let (_root, config) = setup(r#"frame_weights: [0.5, 0.5],"#);
    let mut rng = StdRng::seed_from_u64(3);
    assert!(Dataset::open(config, &mut rng).is_err());
}

#[test]
fn reject_unnormalized_frame_weights() {
    let mut rng = StdRng::seed_from_u64(3);

    let (_root, config) = setup(r#"frame_weights: [0.5, 0.5, 0.5],"#);
    assert!(Dataset::open(config, &mut rng).is_err());

    let (_root, config) = setup(r#"frame_weights: [1.25, -0.5, 0.25],"#);
    assert!(Dataset::open(config, &mut rng).is_err());

    let (_root, config) = setup(r#"frame_weights: [0.2, 0.3, 0.5],"#);
    assert!(Dataset::open(config, &mut rng).is_ok());
}

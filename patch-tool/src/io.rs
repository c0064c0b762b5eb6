//! Frame discovery, raster decoding and patch persistence.

use crate::{common::*, config::DatasetConfig};
use image::{ImageBuffer, Pixel};

/// The file pair of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFiles {
    pub index: usize,
    pub image: PathBuf,
    pub annotation: PathBuf,
}

/// Lists frame files under the dataset directory, sorted by frame index.
///
/// Every image must come with its annotation. Files not following the
/// `<prefix>_<index>.<ext>` pattern are skipped.
pub fn discover_frames(config: &DatasetConfig) -> Result<Vec<FrameFiles>> {
    let DatasetConfig {
        dir,
        image_prefix,
        annotation_prefix,
        image_ext,
        annotation_ext,
    } = config;

    let pattern = {
        let dir = dir
            .to_str()
            .ok_or_else(|| format_err!("non-UTF-8 path '{}'", dir.display()))?;
        format!(
            "{}/{}_*.{}",
            glob::Pattern::escape(dir),
            glob::Pattern::escape(image_prefix),
            glob::Pattern::escape(image_ext)
        )
    };
    let stem_prefix = format!("{}_", image_prefix);

    let mut files: Vec<_> = glob::glob(&pattern)?
        .map(|path| -> Result<_> {
            let image = path?;
            let index = image
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(&stem_prefix))
                .and_then(|suffix| suffix.parse::<usize>().ok());
            let index = match index {
                Some(index) => index,
                None => {
                    warn!("skip unrecognized file '{}'", image.display());
                    return Ok(None);
                }
            };

            let annotation = dir.join(format!("{}_{}.{}", annotation_prefix, index, annotation_ext));
            ensure!(
                annotation.is_file(),
                "annotation file '{}' is missing for image '{}'",
                annotation.display(),
                image.display()
            );

            Ok(Some(FrameFiles {
                index,
                image,
                annotation,
            }))
        })
        .flatten_ok()
        .try_collect()?;

    files.sort_by_key(|files| files.index);
    Ok(files)
}

/// Loads all frames of the dataset in frame index order.
pub fn load_frames(config: &DatasetConfig) -> Result<Vec<Frame>> {
    let files = discover_frames(config)?;
    ensure!(
        !files.is_empty(),
        "no frame is found in '{}'",
        config.dir.display()
    );

    let frames: Vec<_> = files.iter().map(load_frame).try_collect()?;
    info!(
        "loaded {} frames from '{}'",
        frames.len(),
        config.dir.display()
    );
    Ok(frames)
}

pub fn load_frame(files: &FrameFiles) -> Result<Frame> {
    let FrameFiles {
        image, annotation, ..
    } = files;
    let frame = Frame::new(load_raster(image)?, load_raster(annotation)?).with_context(|| {
        format!(
            "'{}' and '{}' do not form a frame",
            image.display(),
            annotation.display()
        )
    })?;
    Ok(frame)
}

/// Reads a raster file into a `(height, width, channels)` array.
///
/// `.bin` files are decoded as serialized arrays. Other files are decoded as
/// images: gray images give one channel, others give three RGB channels.
pub fn load_raster<P>(path: P) -> Result<Array3<f32>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("bin") => read_bincode(path),
        _ => {
            let image = image::open(path)
                .with_context(|| format!("failed to decode image '{}'", path.display()))?;
            image_to_array(&image)
        }
    }
}

pub fn image_to_array(image: &DynamicImage) -> Result<Array3<f32>> {
    match image.color() {
        ColorType::L16 | ColorType::La16 => buffer_to_array(image.to_luma16()),
        ColorType::L8 | ColorType::La8 => buffer_to_array(image.to_luma8()),
        _ => buffer_to_array(image.to_rgb8()),
    }
}

fn buffer_to_array<P>(buffer: ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Array3<f32>>
where
    P: Pixel + 'static,
    P::Subpixel: Into<f32> + 'static,
{
    let (width, height) = buffer.dimensions();
    let shape = (
        height as usize,
        width as usize,
        P::CHANNEL_COUNT as usize,
    );
    let values: Vec<f32> = buffer.into_raw().into_iter().map(Into::into).collect();
    let array = Array3::from_shape_vec(shape, values)?;
    Ok(array)
}

/// Writes every sample of a batch as an `image_<n>.bin` and
/// `annotation_<n>.bin` pair, numbered from `start`.
pub fn save_patches<P>(dir: P, batch: &Batch, start: usize) -> Result<usize>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    for (offset, (input, label)) in batch
        .input
        .outer_iter()
        .zip(batch.label.outer_iter())
        .enumerate()
    {
        let index = start + offset;
        write_bincode(dir.join(format!("image_{}.bin", index)), &input)?;
        write_bincode(dir.join(format!("annotation_{}.bin", index)), &label)?;
    }

    Ok(batch.len())
}

/// Writes a whole batch to `batch_<step>.bin`.
pub fn save_batch<P>(dir: P, step: usize, batch: &Batch) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("batch_{}.bin", step));
    write_bincode(&path, batch)?;
    Ok(path)
}

pub fn load_batch<P>(path: P) -> Result<Batch>
where
    P: AsRef<Path>,
{
    read_bincode(path.as_ref())
}

fn write_bincode<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();
    let writer = BufWriter::new(
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?,
    );
    bincode::serialize_into(writer, value)?;
    Ok(())
}

fn read_bincode<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?,
    );
    let value = bincode::deserialize_from(reader)
        .with_context(|| format!("failed to decode '{}'", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn gray_image_gives_one_channel() {
        let image = GrayImage::from_fn(4, 3, |x, y| Luma([(y * 10 + x) as u8]));
        let array = image_to_array(&DynamicImage::ImageLuma8(image)).unwrap();
        assert_eq!(array.dim(), (3, 4, 1));
        assert_eq!(array[[2, 1, 0]], 21.0);
    }

    #[test]
    fn color_image_gives_three_channels() {
        let image = RgbImage::from_fn(2, 5, |x, y| Rgb([x as u8, y as u8, 7]));
        let array = image_to_array(&DynamicImage::ImageRgb8(image)).unwrap();
        assert_eq!(array.dim(), (5, 2, 3));
        assert_eq!(array.slice(ndarray::s![4, 1, ..]).to_vec(), vec![1.0, 4.0, 7.0]);
    }
}

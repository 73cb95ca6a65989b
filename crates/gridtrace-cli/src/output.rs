//! Writing frames to image files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gridtrace_raytrace::Frame;
use image::{ImageFormat, RgbImage};

/// Image format chosen from the output extension.
pub fn format_for(path: &Path) -> Result<ImageFormat> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext.to_lowercase().as_str() {
        "png" => Ok(ImageFormat::Png),
        "ppm" | "pnm" => Ok(ImageFormat::Pnm),
        _ => bail!("unknown output format '{}', use .png or .ppm", ext),
    }
}

/// `dir/stem.ext` for a still, `dir/stem_00007.ext` for frame 7 of an animation.
pub fn frame_path(output: &Path, index: usize, animated: bool) -> PathBuf {
    if !animated {
        return output.to_path_buf();
    }
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let name = match output.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{index:05}.{ext}"),
        None => format!("{stem}_{index:05}"),
    };
    output.with_file_name(name)
}

/// Save `frame` to `path` as 8-bit RGB, in the format its extension names.
pub fn write_frame(frame: &Frame, path: &Path) -> Result<()> {
    let format = format_for(path)?;
    let (Ok(width), Ok(height)) = (u32::try_from(frame.width), u32::try_from(frame.height)) else {
        bail!("frame of {}x{} is too large to save", frame.width, frame.height);
    };
    let Some(img) = RgbImage::from_raw(width, height, frame.to_rgb8()) else {
        bail!("frame buffer does not match {}x{}", width, height);
    };
    img.save_with_format(path, format)
        .with_context(|| format!("writing {}", path.display()))
}

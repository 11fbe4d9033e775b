//! アップロード前の写真の縮小と JPEG 再エンコード

use common::error::Error;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView};

/// これより幅の広い写真は縮小する
pub const MAX_PHOTO_WIDTH: u32 = 1600;
pub const JPEG_QUALITY: u8 = 80;

/// 幅 MAX_PHOTO_WIDTH に収まる (幅, 高さ)。縦横比は保ち、拡大はしない。
pub fn fit_width(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_PHOTO_WIDTH {
        return (width, height);
    }
    let h = (u64::from(height) * u64::from(MAX_PHOTO_WIDTH) / u64::from(width)).max(1);
    (MAX_PHOTO_WIDTH, h as u32)
}

fn resized(img: DynamicImage) -> DynamicImage {
    let (w, h) = fit_width(img.width(), img.height());
    if (w, h) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    }
}

/// 画像として読めない入力は Validation。返すのは常に JPEG。
pub fn prepare_photo(name: &str, bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::validation(format!("{} is not a readable image: {}", name, e)))?;
    let rgb = resized(img).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| Error::system(format!("jpeg encode failed: {}", e)))?;
    Ok(out)
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    buf.into_inner()
}

//! 上传图片归一化：任意可解码格式 → JPEG → base64 data URL。

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder};

use crate::error::AppError;

/// JPEG 编码质量
const JPEG_QUALITY: u8 = 90;

/// data URL 前缀（与编码格式一致）
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// 解码任意受支持格式的图片，并重新编码为 8-bit RGB JPEG。
///
/// 格式通过内容嗅探确定，与上传时声明的文件名无关；透明通道直接丢弃。
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Decode("上传内容为空".to_string()));
    }

    let img = image::load_from_memory(bytes)?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .write_image(&rgb, w, h, ColorType::Rgb8.into())
        .map_err(|e| AppError::Internal(format!("JPEG 编码失败: {e}")))?;
    Ok(out)
}

/// 将 JPEG 字节包装为 data URL
pub fn to_data_url(jpeg: &[u8]) -> String {
    format!(
        "{DATA_URL_PREFIX}{}",
        base64::prelude::BASE64_STANDARD.encode(jpeg)
    )
}

/// 解码 → JPEG → data URL
pub fn build_data_url(bytes: &[u8]) -> Result<String, AppError> {
    normalize_to_jpeg(bytes).map(|jpeg| to_data_url(&jpeg))
}

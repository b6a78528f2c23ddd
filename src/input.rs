// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input.rs - 图像输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::RgbImage;

/// 可上传到检测服务的图像
pub trait AsUpload {
  fn file_name(&self) -> &str;
  fn upload_bytes(&self) -> &[u8];
}

/// 待上传且需要展示的图像
///
/// 展示尺寸默认等于图像原始尺寸，可以覆盖为页面上实际渲染的尺寸，
/// 叠加层的画布始终按展示尺寸创建。
#[derive(Debug, Clone)]
pub struct DisplayImage {
  file_name: String,
  bytes: Vec<u8>,
  image: RgbImage,
  display_size: Option<(u32, u32)>,
}

impl DisplayImage {
  pub fn from_bytes(
    file_name: impl Into<String>,
    bytes: Vec<u8>,
  ) -> Result<Self, image::ImageError> {
    let image = image::load_from_memory(&bytes)?.to_rgb8();
    Ok(Self {
      file_name: file_name.into(),
      bytes,
      image,
      display_size: None,
    })
  }

  pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
    self.display_size = Some((width, height));
    self
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn display_width(&self) -> u32 {
    self.display_size.map_or(self.image.width(), |(w, _)| w)
  }

  pub fn display_height(&self) -> u32 {
    self.display_size.map_or(self.image.height(), |(_, h)| h)
  }
}

impl AsUpload for DisplayImage {
  fn file_name(&self) -> &str {
    &self.file_name
  }

  fn upload_bytes(&self) -> &[u8] {
    &self.bytes
  }
}

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, input::DisplayImage};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

pub struct ImageFileInput {
  image: Option<DisplayImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = Path::new(url.path());
    let bytes = std::fs::read(path)?;
    let file_name = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "image".to_string());
    let image = DisplayImage::from_bytes(file_name, bytes)?;
    info!(
      "读取图像 {}: {}x{}",
      path.display(),
      image.display_width(),
      image.display_height()
    );

    Ok(ImageFileInput { image: Some(image) })
  }
}

impl ImageFileInput {
  /// 设置页面上的渲染尺寸
  pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
    self.image = self
      .image
      .take()
      .map(|image| image.with_display_size(width, height));
    self
  }
}

impl Iterator for ImageFileInput {
  type Item = DisplayImage;

  fn next(&mut self) -> Option<Self::Item> {
    self.image.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbImage;

  #[test]
  fn reads_image_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cat.png");
    RgbImage::new(4, 3).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap().with_display_size(40, 30);

    let image = input.next().unwrap();
    assert_eq!(image.image().dimensions(), (4, 3));
    assert_eq!((image.display_width(), image.display_height()), (40, 30));
    assert_eq!(crate::input::AsUpload::file_name(&image), "cat.png");
    assert!(input.next().is_none());
  }

  #[test]
  fn rejects_wrong_scheme() {
    let url = Url::parse("file:///tmp/cat.png").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    let url = Url::parse("image:///nonexistent/cat.png").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::IoError(_))
    ));
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/save_image_file.rs - 保存叠加后的图像文件
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

use ab_glyph::FontArc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::DisplayImage,
  model::DetectResult,
  output::{Render, ensure_parent_dir, paint_overlay},
  overlay::{OverlayRenderer, OverlayStyle},
  session::Notice,
  surface::{FontError, RasterSurface, load_font},
};

const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
const FONT_QUERY_KEY: &str = "font";

pub struct SaveImageFileOutput {
  path: String,
  font: Option<FontArc>,
  style: OverlayStyle,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("字体错误: {0}")]
  FontError(#[from] FontError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    // 显式指定的字体必须可用，默认字体缺失时只画框不画字
    let font = match uri
      .query_pairs()
      .find(|(key, _)| key == FONT_QUERY_KEY)
    {
      Some((_, path)) => Some(load_font(Path::new(&*path))?),
      None => match load_font(Path::new(DEFAULT_FONT_PATH)) {
        Ok(font) => Some(font),
        Err(e) => {
          warn!("默认字体不可用, 标签文字将被跳过: {}", e);
          None
        }
      },
    };

    Ok(SaveImageFileOutput {
      path: uri.path().to_string(),
      font,
      style: OverlayStyle::default(),
    })
  }
}

impl SaveImageFileOutput {
  pub fn new(path: impl Into<String>, font: Option<FontArc>) -> Self {
    Self {
      path: path.into(),
      font,
      style: OverlayStyle::default(),
    }
  }

  pub fn with_style(mut self, style: OverlayStyle) -> Self {
    self.style = style;
    self
  }

  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    ensure_parent_dir(Path::new(&self.path))?;
    image.save(&self.path)?;
    info!("保存图像到文件: {}", self.path);
    Ok(())
  }
}

impl Render<DisplayImage, DetectResult> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(
    &self,
    frame: &DisplayImage,
    result: &DetectResult,
  ) -> Result<Notice, Self::Error> {
    let surface = RasterSurface::new(
      frame.image().clone(),
      self.font.clone(),
      self.style.font_size,
    );
    let renderer = OverlayRenderer::with_style(surface, self.style.clone());
    let (renderer, notice) = paint_overlay(renderer, frame, result);
    self.save_image(renderer.into_surface().into_image())?;
    Ok(notice)
  }
}

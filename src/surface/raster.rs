// 该文件是 Shanan （山南西风） 项目的一部分。
// src/surface/raster.rs - 基于 RGB 图像的绘图表面
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

use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage, imageops::FilterType};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::debug;

use super::{Color, PixelRect, Surface};

const FALLBACK_CHAR_WIDTH_RATIO: f32 = 0.55; // 无字体时按字号估算字符宽度

#[derive(Error, Debug)]
pub enum FontError {
  #[error("无法读取字体文件 {0}: {1}")]
  Io(PathBuf, std::io::Error),
  #[error("字体文件无效: {0}")]
  Invalid(#[from] ab_glyph::InvalidFont),
}

pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
  let data = std::fs::read(path).map_err(|e| FontError::Io(path.to_path_buf(), e))?;
  Ok(FontArc::try_from_vec(data)?)
}

/// 把叠加层画在展示图像上
///
/// `base` 是原始图像，`resize` 时缩放到表面尺寸；`clear` 把画布恢复为缩放后的图像，
/// 相当于浏览器中透明画布盖在图片上。
pub struct RasterSurface {
  base: RgbImage,
  scaled: RgbImage,
  canvas: RgbImage,
  font: Option<FontArc>,
  scale: PxScale,
}

impl RasterSurface {
  pub fn new(base: RgbImage, font: Option<FontArc>, font_size: f32) -> Self {
    let scaled = base.clone();
    let canvas = base.clone();
    Self {
      base,
      scaled,
      canvas,
      font,
      scale: PxScale::from(font_size),
    }
  }

  pub fn image(&self) -> &RgbImage {
    &self.canvas
  }

  pub fn into_image(self) -> RgbImage {
    self.canvas
  }

  fn fill_pixels(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
    if width <= 0 || height <= 0 || self.canvas.width() == 0 || self.canvas.height() == 0 {
      return;
    }
    let rect = Rect::at(x, y).of_size(width as u32, height as u32);
    draw_filled_rect_mut(&mut self.canvas, rect, Rgb(color));
  }
}

// 画布外的坐标收拢到画布四周 `margin` 像素内，换算成整数后再相减不会溢出
fn edge(value: f32, limit: u32, margin: f32) -> i32 {
  value.round().clamp(-margin, limit as f32 + margin) as i32
}

impl Surface for RasterSurface {
  fn resize(&mut self, width: u32, height: u32) {
    self.scaled = if self.base.dimensions() == (width, height) {
      self.base.clone()
    } else if width == 0 || height == 0 || self.base.width() == 0 || self.base.height() == 0 {
      RgbImage::new(width, height)
    } else {
      debug!(
        "缩放展示图像: {:?} -> {}x{}",
        self.base.dimensions(),
        width,
        height
      );
      image::imageops::resize(&self.base, width, height, FilterType::Triangle)
    };
    self.canvas = self.scaled.clone();
  }

  fn size(&self) -> (u32, u32) {
    self.canvas.dimensions()
  }

  fn clear(&mut self) {
    self.canvas.copy_from_slice(&self.scaled);
  }

  fn stroke_rect(&mut self, rect: PixelRect, line_width: f32, color: Color) {
    let rect = rect.normalized();
    let (canvas_width, canvas_height) = self.canvas.dimensions();
    let half = line_width / 2.0;
    let thickness = line_width
      .round()
      .max(1.0)
      .min(canvas_width.max(canvas_height) as f32 + 1.0);
    let margin = thickness + 1.0;
    let left = edge(rect.x - half, canvas_width, margin);
    let top = edge(rect.y - half, canvas_height, margin);
    let right = edge(rect.x + rect.width + half, canvas_width, margin);
    let bottom = edge(rect.y + rect.height + half, canvas_height, margin);
    let thickness = thickness as i32;
    let (width, height) = (right - left, bottom - top);

    self.fill_pixels(left, top, width, thickness, color);
    self.fill_pixels(left, bottom - thickness, width, thickness, color);
    self.fill_pixels(left, top, thickness, height, color);
    self.fill_pixels(right - thickness, top, thickness, height, color);
  }

  fn fill_rect(&mut self, rect: PixelRect, color: Color) {
    let rect = rect.normalized();
    let (canvas_width, canvas_height) = self.canvas.dimensions();
    let left = edge(rect.x, canvas_width, 1.0);
    let top = edge(rect.y, canvas_height, 1.0);
    let right = edge(rect.x + rect.width, canvas_width, 1.0);
    let bottom = edge(rect.y + rect.height, canvas_height, 1.0);
    self.fill_pixels(left, top, right - left, bottom - top, color);
  }

  fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
    if self.canvas.width() == 0 || self.canvas.height() == 0 {
      return;
    }
    let Some(font) = self.font.as_ref() else {
      debug!("未加载字体，跳过文字: {}", text);
      return;
    };
    // 完全落在画布外的文字不画，否则起点坐标在字形偏移上会溢出
    let (text_width, text_height) = text_size(self.scale, font, text);
    let on_canvas = x + (text_width as f32) >= 0.0
      && y + (text_height as f32) >= 0.0
      && x < self.canvas.width() as f32
      && y < self.canvas.height() as f32;
    if !on_canvas {
      return;
    }
    draw_text_mut(
      &mut self.canvas,
      Rgb(color),
      x.round() as i32,
      y.round() as i32,
      self.scale,
      font,
      text,
    );
  }

  fn measure_text(&self, text: &str) -> f32 {
    match self.font.as_ref() {
      Some(font) => text_size(self.scale, font, text).0 as f32,
      None => text.chars().count() as f32 * self.scale.x * FALLBACK_CHAR_WIDTH_RATIO,
    }
  }
}

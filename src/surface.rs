// 该文件是 Shanan （山南西风） 项目的一部分。
// src/surface.rs - 二维绘图表面
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

use serde::Serialize;

pub type Color = [u8; 3];

/// 像素坐标下的矩形，宽高允许为负
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

impl PixelRect {
  pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// 把负宽高翻转为左上角加正宽高
  pub fn normalized(&self) -> Self {
    let (x, width) = if self.width < 0.0 {
      (self.x + self.width, -self.width)
    } else {
      (self.x, self.width)
    };
    let (y, height) = if self.height < 0.0 {
      (self.y + self.height, -self.height)
    } else {
      (self.y, self.height)
    };
    Self {
      x,
      y,
      width,
      height,
    }
  }
}

/// 叠加层使用的绘图能力，语义与浏览器 2D 画布一致
///
/// 所有操作都不会失败，越界部分由实现自行裁剪。
pub trait Surface {
  /// 以新的像素尺寸重建表面
  fn resize(&mut self, width: u32, height: u32);
  fn size(&self) -> (u32, u32);
  /// 清空整个表面
  fn clear(&mut self);
  /// 沿矩形路径描边，线宽以路径为中心
  fn stroke_rect(&mut self, rect: PixelRect, line_width: f32, color: Color);
  fn fill_rect(&mut self, rect: PixelRect, color: Color);
  /// 以 (x, y) 为文字左上角绘制
  fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color);
  fn measure_text(&self, text: &str) -> f32;
}

mod recording;
pub use self::recording::{DrawCommand, RecordingSurface};

#[cfg(feature = "raster")]
mod raster;
#[cfg(feature = "raster")]
pub use self::raster::{FontError, RasterSurface, load_font};

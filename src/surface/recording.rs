// 该文件是 Shanan （山南西风） 项目的一部分。
// src/surface/recording.rs - 记录绘图指令的表面
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

use super::{Color, PixelRect, Surface};

const DEFAULT_CHAR_WIDTH: f32 = 9.0; // 16px 字体每字符平均宽度（粗略估计）

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
  Clear {
    width: u32,
    height: u32,
  },
  StrokeRect {
    rect: PixelRect,
    line_width: f32,
    color: Color,
  },
  FillRect {
    rect: PixelRect,
    color: Color,
  },
  FillText {
    text: String,
    x: f32,
    y: f32,
    color: Color,
  },
}

/// 不绘制像素，只记录当前画面由哪些指令组成
///
/// `clear` 会丢弃之前的指令，所以 `commands()` 总是最近一次清空之后的内容。
#[derive(Debug, Clone)]
pub struct RecordingSurface {
  width: u32,
  height: u32,
  char_width: f32,
  commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
  fn default() -> Self {
    Self::with_char_width(DEFAULT_CHAR_WIDTH)
  }
}

impl RecordingSurface {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_char_width(char_width: f32) -> Self {
    Self {
      width: 0,
      height: 0,
      char_width,
      commands: Vec::new(),
    }
  }

  pub fn commands(&self) -> &[DrawCommand] {
    &self.commands
  }

  pub fn into_commands(self) -> Vec<DrawCommand> {
    self.commands
  }
}

impl Surface for RecordingSurface {
  fn resize(&mut self, width: u32, height: u32) {
    self.width = width;
    self.height = height;
    self.commands.clear();
  }

  fn size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn clear(&mut self) {
    self.commands.clear();
    self.commands.push(DrawCommand::Clear {
      width: self.width,
      height: self.height,
    });
  }

  fn stroke_rect(&mut self, rect: PixelRect, line_width: f32, color: Color) {
    self.commands.push(DrawCommand::StrokeRect {
      rect,
      line_width,
      color,
    });
  }

  fn fill_rect(&mut self, rect: PixelRect, color: Color) {
    self.commands.push(DrawCommand::FillRect { rect, color });
  }

  fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
    self.commands.push(DrawCommand::FillText {
      text: text.to_string(),
      x,
      y,
      color,
    });
  }

  fn measure_text(&self, text: &str) -> f32 {
    text.chars().count() as f32 * self.char_width
  }
}

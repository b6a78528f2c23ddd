// 该文件是 Shanan （山南西风） 项目的一部分。
// src/overlay.rs - 目标检测结果叠加渲染
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

use tracing::debug;

use crate::{
  model::Prediction,
  surface::{Color, PixelRect, Surface},
};

// 渲染常量
const BOX_LINE_WIDTH: f32 = 3.0;
const BOX_COLOR: Color = [0, 255, 0]; // 绿色
const TEXT_COLOR: Color = [0, 0, 0]; // 黑色
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_LINE_HEIGHT: f32 = 1.4;
const LABEL_PADDING: f32 = 3.0;
const LABEL_TEXT_INSET: f32 = 1.0;

pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
  pub line_width: f32,
  pub box_color: Color,
  pub text_color: Color,
  pub font_size: f32,
  pub line_height: f32,
  pub label_padding: f32,
  pub text_inset: f32,
}

impl Default for OverlayStyle {
  fn default() -> Self {
    Self {
      line_width: BOX_LINE_WIDTH,
      box_color: BOX_COLOR,
      text_color: TEXT_COLOR,
      font_size: LABEL_FONT_SIZE,
      line_height: LABEL_LINE_HEIGHT,
      label_padding: LABEL_PADDING,
      text_inset: LABEL_TEXT_INSET,
    }
  }
}

impl OverlayStyle {
  pub fn label_height(&self) -> f32 {
    self.font_size * self.line_height
  }
}

/// 检测框叠加渲染器
///
/// 持有预测列表、阈值以及绘图表面。每次 `redraw` 先清空表面，
/// 然后画出所有可见的框，最后再画所有标签，保证标签始终位于任意框的描边之上。
pub struct OverlayRenderer<S> {
  surface: S,
  style: OverlayStyle,
  predictions: Vec<Prediction>,
  threshold: f32,
}

impl<S: Surface> OverlayRenderer<S> {
  pub fn new(surface: S) -> Self {
    Self::with_style(surface, OverlayStyle::default())
  }

  pub fn with_style(surface: S, style: OverlayStyle) -> Self {
    Self {
      surface,
      style,
      predictions: Vec::new(),
      threshold: DEFAULT_THRESHOLD,
    }
  }

  /// 按展示尺寸重建并清空表面
  pub fn initialize(&mut self, width: u32, height: u32) {
    debug!("初始化绘图表面: {}x{}", width, height);
    self.surface.resize(width, height);
    self.surface.clear();
  }

  pub fn set_predictions(&mut self, predictions: Vec<Prediction>) {
    self.predictions = predictions;
  }

  pub fn set_threshold(&mut self, threshold: f32) {
    self.threshold = threshold;
  }

  pub fn threshold(&self) -> f32 {
    self.threshold
  }

  pub fn style(&self) -> &OverlayStyle {
    &self.style
  }

  pub fn predictions(&self) -> &[Prediction] {
    &self.predictions
  }

  /// 当前阈值下会被绘制的预测
  pub fn visible(&self) -> impl Iterator<Item = &Prediction> {
    filter_visible(&self.predictions, self.threshold)
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn into_surface(self) -> S {
    self.surface
  }

  pub fn redraw(&mut self) {
    let Self {
      surface,
      style,
      predictions,
      threshold,
    } = self;
    let (width, height) = surface.size();
    let (width, height) = (width as f32, height as f32);
    let threshold = *threshold;

    surface.clear();

    for prediction in filter_visible(predictions, threshold) {
      let rect = prediction.pixel_rect(width, height);
      surface.stroke_rect(rect, style.line_width, style.box_color);
    }

    for prediction in filter_visible(predictions, threshold) {
      let rect = prediction.pixel_rect(width, height);
      draw_label(surface, style, prediction, rect);
    }

    debug!(
      "重绘完成: {} / {} 个对象可见",
      filter_visible(predictions, threshold).count(),
      predictions.len()
    );
  }
}

fn filter_visible(
  predictions: &[Prediction],
  threshold: f32,
) -> impl Iterator<Item = &Prediction> {
  predictions.iter().filter(move |p| p.is_visible(threshold))
}

// 带概率的标签放不下时只保留类别名
fn fit_label<S: Surface>(surface: &S, prediction: &Prediction, box_width: f32) -> (String, f32) {
  let caption = prediction.caption();
  let width = surface.measure_text(&caption);
  if width > box_width {
    let width = surface.measure_text(&prediction.label);
    (prediction.label.clone(), width)
  } else {
    (caption, width)
  }
}

fn draw_label<S: Surface>(
  surface: &mut S,
  style: &OverlayStyle,
  prediction: &Prediction,
  rect: PixelRect,
) {
  let (text, text_width) = fit_label(surface, prediction, rect.width);
  let background = PixelRect::new(
    rect.x,
    rect.y,
    text_width + style.label_padding,
    style.label_height(),
  );
  surface.fill_rect(background, style.box_color);
  surface.fill_text(&text, rect.x + style.text_inset, rect.y, style.text_color);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::surface::{DrawCommand, RecordingSurface};

  #[test]
  fn default_style_matches_canvas_settings() {
    let style = OverlayStyle::default();
    assert_eq!(style.line_width, 3.0);
    assert_eq!(style.box_color, [0, 255, 0]);
    assert_eq!(style.text_color, [0, 0, 0]);
    assert!((style.label_height() - 22.4).abs() < 1e-4);
  }

  #[test]
  fn fallback_to_bare_label() {
    let surface = RecordingSurface::with_char_width(9.0);
    let prediction = Prediction::new("cat", 0.92, [0.0; 4]);
    let (text, width) = fit_label(&surface, &prediction, 50.0);
    assert_eq!(text, "cat");
    assert_eq!(width, 27.0);
  }

  #[test]
  fn keeps_caption_when_it_fits() {
    let surface = RecordingSurface::with_char_width(1.0);
    let prediction = Prediction::new("cat", 0.92, [0.0; 4]);
    let (text, width) = fit_label(&surface, &prediction, 11.0);
    assert_eq!(text, "cat : 92.0%");
    assert_eq!(width, 11.0);
  }

  #[test]
  fn background_uses_padding_and_line_height() {
    let mut surface = RecordingSurface::with_char_width(2.0);
    surface.resize(100, 100);
    let style = OverlayStyle::default();
    let prediction = Prediction::new("cat", 0.92, [0.0; 4]);
    draw_label(
      &mut surface,
      &style,
      &prediction,
      PixelRect::new(4.0, 5.0, 60.0, 60.0),
    );
    assert_eq!(
      surface.commands()[0],
      DrawCommand::FillRect {
        rect: PixelRect::new(4.0, 5.0, 25.0, style.label_height()),
        color: [0, 255, 0],
      }
    );
    assert_eq!(
      surface.commands()[1],
      DrawCommand::FillText {
        text: "cat : 92.0%".into(),
        x: 5.0,
        y: 5.0,
        color: [0, 0, 0],
      }
    );
  }

  #[test]
  fn new_renderer_has_default_threshold() {
    let renderer = OverlayRenderer::new(RecordingSurface::new());
    assert_eq!(renderer.threshold(), DEFAULT_THRESHOLD);
    assert!(renderer.predictions().is_empty());
  }
}

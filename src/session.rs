// 该文件是 Shanan （山南西风） 项目的一部分。
// src/session.rs - 上传结果与阈值控制的衔接
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

use std::fmt;

use tracing::{debug, info, warn};

use crate::{model::Prediction, overlay::OverlayRenderer, surface::Surface};

const SLIDER_MAX: f32 = 100.0;

/// 滑块取值 0..=100 线性映射到阈值 0.0..=1.0
pub fn threshold_from_slider(value: u32) -> f32 {
  value as f32 / SLIDER_MAX
}

/// 一次上传之后给用户的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Detected(usize),
  NoObjects,
  Failed(String),
}

impl Notice {
  pub fn failed(error: impl fmt::Display) -> Self {
    Notice::Failed(error.to_string())
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, Notice::Failed(_))
  }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Notice::Detected(count) => write!(f, "Detected {} Objects", count),
      Notice::NoObjects => write!(f, "No Objects Detected"),
      Notice::Failed(error) => write!(f, "Object Detection Failed: {}", error),
    }
  }
}

/// 单张图像的交互会话
///
/// 上传结果到达后按展示尺寸建立表面并重绘；阈值变化只在已有表面时重绘，
/// 不会重新请求预测。
pub struct OverlaySession<S> {
  renderer: OverlayRenderer<S>,
  has_surface: bool,
}

impl<S: Surface> OverlaySession<S> {
  pub fn new(renderer: OverlayRenderer<S>) -> Self {
    Self {
      renderer,
      has_surface: false,
    }
  }

  /// 处理一次上传结果
  ///
  /// 失败时新图像已经替换了旧画面，因此之前的表面作废，预测列表保持不变。
  pub fn show<E: fmt::Display>(
    &mut self,
    outcome: Result<Vec<Prediction>, E>,
    display_width: u32,
    display_height: u32,
  ) -> Notice {
    match outcome {
      Ok(predictions) => {
        let count = predictions.len();
        self.renderer.set_predictions(predictions);
        self.renderer.initialize(display_width, display_height);
        self.renderer.redraw();
        self.has_surface = true;

        if count == 0 {
          info!("未检测到对象");
          Notice::NoObjects
        } else {
          info!("检测到 {} 个对象", count);
          Notice::Detected(count)
        }
      }
      Err(e) => {
        warn!("检测失败: {}", e);
        self.has_surface = false;
        Notice::failed(e)
      }
    }
  }

  /// 滑块移动
  pub fn slide(&mut self, value: u32) {
    self.set_threshold(threshold_from_slider(value));
  }

  pub fn set_threshold(&mut self, threshold: f32) {
    self.renderer.set_threshold(threshold);
    if self.has_surface {
      debug!("阈值变更为 {}, 重绘", threshold);
      self.renderer.redraw();
    }
  }

  pub fn has_surface(&self) -> bool {
    self.has_surface
  }

  pub fn renderer(&self) -> &OverlayRenderer<S> {
    &self.renderer
  }

  pub fn into_renderer(self) -> OverlayRenderer<S> {
    self.renderer
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 预测数据与模型接口
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

use serde::{Deserialize, Serialize};

use crate::surface::PixelRect;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 单个检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label_id: Option<String>,
  pub label: String,
  pub probability: f32,
  pub detection_box: [f32; 4], // [y_min, x_min, y_max, x_max]，归一化坐标
}

impl Prediction {
  pub fn new(label: impl Into<String>, probability: f32, detection_box: [f32; 4]) -> Self {
    Self {
      label_id: None,
      label: label.into(),
      probability,
      detection_box,
    }
  }

  /// 严格大于阈值才可见，阈值本身不可见
  pub fn is_visible(&self, threshold: f32) -> bool {
    self.probability > threshold
  }

  /// 按画布尺寸换算为像素矩形，不做合法性检查
  pub fn pixel_rect(&self, width: f32, height: f32) -> PixelRect {
    let [y_min, x_min, y_max, x_max] = self.detection_box;
    PixelRect {
      x: x_min * width,
      y: y_min * height,
      width: (x_max - x_min) * width,
      height: (y_max - y_min) * height,
    }
  }

  /// 带概率的完整标签，例如 `cat : 92.0%`
  pub fn caption(&self) -> String {
    format!("{} : {:.1}%", self.label, self.probability * 100.0)
  }
}

/// 传给输出端的检测结果
#[derive(Debug, Clone)]
pub struct DetectResult {
  pub predictions: Vec<Prediction>,
  pub threshold: f32,
}

/// 预测接口的响应
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
  pub status: String,
  #[serde(default)]
  pub predictions: Vec<Prediction>,
}

impl PredictResponse {
  pub const STATUS_OK: &'static str = "ok";

  pub fn is_ok(&self) -> bool {
    self.status == Self::STATUS_OK
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLabel {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelsResponse {
  pub count: usize,
  pub labels: Vec<ModelLabel>,
}

mod remote;
pub use self::remote::{ClientError, RemoteDetector, RemoteDetectorBuilder};

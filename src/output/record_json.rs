// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/record_json.rs - 记录绘图指令
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

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::json;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::DisplayImage,
  model::{DetectResult, Prediction},
  output::{Render, ensure_parent_dir, paint_overlay},
  overlay::OverlayRenderer,
  session::Notice,
  surface::{RecordingSurface, Surface},
};

#[derive(Error, Debug)]
pub enum RecordJsonError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 不落像素，把可见的预测和绘图指令写成 JSON
pub struct RecordJsonOutput {
  path: String,
}

impl FromUrlWithScheme for RecordJsonOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for RecordJsonOutput {
  type Error = RecordJsonError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RecordJsonError::SchemeMismatch);
    }
    Ok(RecordJsonOutput {
      path: url.path().to_string(),
    })
  }
}

impl Render<DisplayImage, DetectResult> for RecordJsonOutput {
  type Error = RecordJsonError;

  fn render_result(
    &self,
    frame: &DisplayImage,
    result: &DetectResult,
  ) -> Result<Notice, Self::Error> {
    let renderer = OverlayRenderer::new(RecordingSurface::new());
    let (renderer, notice) = paint_overlay(renderer, frame, result);

    let visible: Vec<&Prediction> = renderer.visible().collect();
    let (width, height) = renderer.surface().size();
    let record = json!({
      "width": width,
      "height": height,
      "threshold": result.threshold,
      "notice": notice.to_string(),
      "predictions": visible,
      "commands": renderer.surface().commands(),
    });

    let path = Path::new(&self.path);
    ensure_parent_dir(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &record)?;
    info!("保存绘图指令到文件: {}", self.path);

    Ok(notice)
  }
}

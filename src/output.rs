// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output.rs - 输出定义
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

use std::convert::Infallible;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::FromUrl;
use crate::FromUrlWithScheme;
use crate::input::DisplayImage;
use crate::model::DetectResult;
use crate::overlay::OverlayRenderer;
use crate::session::{Notice, OverlaySession};
use crate::surface::Surface;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<Notice, Self::Error>;
}

#[cfg(feature = "raster")]
mod save_image_file;
#[cfg(feature = "raster")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

mod record_json;
pub use self::record_json::{RecordJsonError, RecordJsonOutput};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "raster")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[error("记录绘图指令错误: {0}")]
  RecordJsonError(#[from] RecordJsonError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "raster")]
  SaveImageFileOutput(SaveImageFileOutput),
  RecordJsonOutput(RecordJsonOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "raster")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      RecordJsonOutput::SCHEME => {
        let output = RecordJsonOutput::from_url(url)?;
        Ok(OutputWrapper::RecordJsonOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render<DisplayImage, DetectResult> for OutputWrapper {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &DisplayImage,
    result: &DetectResult,
  ) -> Result<Notice, Self::Error> {
    match self {
      #[cfg(feature = "raster")]
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::RecordJsonOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}

/// 按展示尺寸建立表面并绘制一次结果
pub(crate) fn paint_overlay<S: Surface>(
  renderer: OverlayRenderer<S>,
  frame: &DisplayImage,
  result: &DetectResult,
) -> (OverlayRenderer<S>, Notice) {
  let mut session = OverlaySession::new(renderer);
  session.set_threshold(result.threshold);
  let notice = session.show(
    Ok::<_, Infallible>(result.predictions.clone()),
    frame.display_width(),
    frame.display_height(),
  );
  (session.into_renderer(), notice)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  Ok(())
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/task.rs - 上传、检测与渲染任务
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

use tracing::{error, info};

use crate::{
  model::{DetectResult, Model, Prediction},
  output::Render,
  overlay::DEFAULT_THRESHOLD,
  session::Notice,
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Notice, Self::Error>;
}

/// 取一张图像，请求一次检测，渲染一次
///
/// 请求失败时记录提示并返回错误，不重试，也不会调用输出。
#[derive(Debug, Clone, Copy)]
pub struct OneShotTask {
  threshold: f32,
}

impl Default for OneShotTask {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_THRESHOLD,
    }
  }
}

impl OneShotTask {
  pub fn with_threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }
}

impl<
  F,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = Vec<Prediction>, Error = ME>,
  O: Render<F, DetectResult, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Notice, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始检测...");
    let now = std::time::Instant::now();
    let predictions = match model.infer(&frame) {
      Ok(predictions) => predictions,
      Err(e) => {
        error!("{}", Notice::failed(&e));
        return Err(e.into());
      }
    };
    info!(
      "检测完成，耗时: {:.2?}，共 {} 个对象",
      now.elapsed(),
      predictions.len()
    );

    let result = DetectResult {
      predictions,
      threshold: self.threshold,
    };
    let notice = output.render_result(&frame, &result)?;
    info!("渲染完成: {}", notice);

    Ok(notice)
  }
}

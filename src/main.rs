// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;

use shanan_overlay::{
  FromUrl,
  input::{DisplayImage, ImageFileInput},
  model::{RemoteDetector, RemoteDetectorBuilder},
  output::OutputWrapper,
  session::threshold_from_slider,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("检测服务地址: {}", args.endpoint);
  let model: RemoteDetector<DisplayImage> = RemoteDetectorBuilder::from_url(&args.endpoint)?
    .timeout(Duration::from_secs(args.timeout))
    .build()?;

  if args.list_labels {
    let labels = model.labels()?;
    info!("模型共支持 {} 个类别", labels.len());
    for label in labels {
      println!("{}\t{}", label.id, label.name);
    }
    return Ok(());
  }

  let input_url = args.input.as_ref().ok_or_else(|| anyhow!("缺少输入来源"))?;
  let output_url = args.output.as_ref().ok_or_else(|| anyhow!("缺少输出路径"))?;
  let threshold = args
    .slider
    .map(threshold_from_slider)
    .unwrap_or(args.threshold);

  info!("输入来源: {}", input_url);
  info!("输出路径: {}", output_url);
  info!("置信度阈值: {}", threshold);

  let mut input = ImageFileInput::from_url(input_url)?;
  if let (Some(width), Some(height)) = (args.display_width, args.display_height) {
    input = input.with_display_size(width, height);
  }
  let output = OutputWrapper::from_url(output_url)?;

  let notice = OneShotTask::default()
    .with_threshold(threshold)
    .run_task(input, model, output)?;
  println!("{}", notice);

  Ok(())
}

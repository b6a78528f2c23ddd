// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;
use url::Url;

/// Shanan 检测叠加参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测服务地址，例如 http://localhost:5000
  #[arg(long, value_name = "ENDPOINT")]
  pub endpoint: Url,

  /// 输入图像，例如 image:///path/to/cat.jpg
  #[arg(long, value_name = "SOURCE", required_unless_present = "list_labels")]
  pub input: Option<Url>,

  /// 输出路径
  /// 支持格式:
  /// - 图像: image:///path/to/out.png[?font=/path/to/font.ttf]
  /// - 绘图指令: json:///path/to/out.json
  #[arg(long, value_name = "OUTPUT", required_unless_present = "list_labels")]
  pub output: Option<Url>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub threshold: f32,

  /// 以滑块取值 (0 - 100) 指定阈值，优先于 --threshold
  #[arg(long, value_name = "VALUE", conflicts_with = "threshold")]
  pub slider: Option<u32>,

  /// 页面上图像的渲染宽度（默认为图像原始宽度）
  #[arg(long, value_name = "PIXELS", requires = "display_height")]
  pub display_width: Option<u32>,

  /// 页面上图像的渲染高度（默认为图像原始高度）
  #[arg(long, value_name = "PIXELS", requires = "display_width")]
  pub display_height: Option<u32>,

  /// 请求超时（秒）
  #[arg(long, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,

  /// 只列出模型支持的类别
  #[arg(long)]
  pub list_labels: bool,
}

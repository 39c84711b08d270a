// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/yolo11_benchmark.rs - 重复推理测速
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use shanan_yolo11::{
  FromUrl,
  input::ImageFileInput,
  model::{CocoLabel, TensorFileSession, Yolo11, Yolo11Config},
  output::OutputWrapper,
  postprocess::PostprocessConfig,
  task::{RepeatShotTask, Task},
};
use tracing::info;

/// YOLO11 重复推理测速
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理会话
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径（仅渲染最后一次结果）；
  /// 图像输出默认只画框，加 ?font=/path/font.ttf 才绘制标签
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 重复次数
  #[arg(long, default_value = "1000", value_name = "COUNT")]
  pub times: usize,
  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub conf: f32,
  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub nms: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("推理会话: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = Yolo11Config {
    postprocess: PostprocessConfig::default()
      .with_conf_thres(args.conf)
      .with_nms_thres(args.nms),
    ..Yolo11Config::default()
  };

  let input_image = ImageFileInput::from_url(&args.input)?;
  let mut session = TensorFileSession::from_url(&args.model)?;
  let model: Yolo11<_, CocoLabel> = Yolo11::new(&mut session, config)?;
  let output = OutputWrapper::from_url(&args.output)?;

  RepeatShotTask::default()
    .with_times(args.times)
    .run_task(input_image, model, output)?;

  Ok(())
}

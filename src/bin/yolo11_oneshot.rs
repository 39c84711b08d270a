// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/yolo11_oneshot.rs - 单张图像推理
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
  postprocess::{MAX_STRIDE, PadMode, PostprocessConfig},
  task::{OneShotTask, Task},
};
use tracing::info;

/// YOLO11 单张图像检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 推理会话，例如 tensor:///path/out.bin?channels=84
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入来源，例如 image:///path/in.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，可重复，例如 image:///out.jpg 或 json:///out.json；
  /// 图像输出默认只画框，加 ?font=/path/font.ttf 才绘制 "名称 置信度%" 标签
  #[arg(long, value_name = "OUTPUT", required = true)]
  pub output: Vec<Url>,
  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub conf: f32,
  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.45", value_name = "THRESHOLD")]
  pub nms: f32,
  /// 跨类别 NMS
  #[arg(long)]
  pub agnostic: bool,
  /// 模型输入边长
  #[arg(long, default_value = "480", value_name = "SIZE")]
  pub target_size: u32,
  /// 按步长最小填充，而非填充为正方形
  #[arg(long)]
  pub minimal_pad: bool,
}

impl Args {
  fn yolo11_config(&self) -> Yolo11Config {
    Yolo11Config {
      target_size: self.target_size,
      stride: MAX_STRIDE,
      pad_mode: if self.minimal_pad {
        PadMode::Minimal
      } else {
        PadMode::Square
      },
      postprocess: PostprocessConfig::default()
        .with_conf_thres(self.conf)
        .with_nms_thres(self.nms)
        .with_class_agnostic(self.agnostic),
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("推理会话: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("输出路径: {:?}", args.output);

  let input_image = ImageFileInput::from_url(&args.input)?;
  let mut session = TensorFileSession::from_url(&args.model)?;
  let model: Yolo11<_, CocoLabel> = Yolo11::new(&mut session, args.yolo11_config())?;
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  OneShotTask.run_task(input_image, model, output)?;

  Ok(())
}

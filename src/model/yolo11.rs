// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/yolo11.rs - YOLO11 检测模型
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

use std::time::Instant;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  frame::LetterboxFrame,
  model::{DetectResult, InferenceSession, Model, WithLabel},
  postprocess::{MAX_STRIDE, PadMode, PostprocessConfig, PostprocessError, postprocess},
};

const YOLO11_TARGET_SIZE: u32 = 480;

#[derive(Error, Debug)]
pub enum Yolo11Error<E> {
  #[error("推理会话错误: {0}")]
  Session(#[source] E),
  #[error("后处理错误: {0}")]
  Postprocess(#[from] PostprocessError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yolo11Config {
  /// 模型输入边长（长边缩放到该值）
  pub target_size: u32,
  pub stride: u32,
  pub pad_mode: PadMode,
  pub postprocess: PostprocessConfig,
}

impl Default for Yolo11Config {
  fn default() -> Self {
    Self {
      target_size: YOLO11_TARGET_SIZE,
      stride: MAX_STRIDE,
      pad_mode: PadMode::default(),
      postprocess: PostprocessConfig::default(),
    }
  }
}

/// YOLO11 检测器
///
/// 只借用推理会话，会话的创建与生命周期由调用方负责。
pub struct Yolo11<'s, S, T> {
  session: &'s mut S,
  config: Yolo11Config,
  _phantom: std::marker::PhantomData<T>,
}

impl<'s, S: InferenceSession, T: WithLabel> Yolo11<'s, S, T> {
  pub fn new(session: &'s mut S, config: Yolo11Config) -> Result<Self, PostprocessError> {
    config.postprocess.validate()?;
    info!(
      "[CONFIG] target={} conf={:.2} nms={:.2} agnostic={}",
      config.target_size,
      config.postprocess.conf_thres,
      config.postprocess.nms_thres,
      config.postprocess.class_agnostic
    );

    Ok(Self {
      session,
      config,
      _phantom: std::marker::PhantomData,
    })
  }

  pub fn config(&self) -> &Yolo11Config {
    &self.config
  }
}

impl<S: InferenceSession, T: WithLabel> Model for Yolo11<'_, S, T> {
  type Input = RgbImage;
  type Output = DetectResult<T>;
  type Error = Yolo11Error<S::Error>;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let frame = LetterboxFrame::from_image(
      input,
      self.config.target_size,
      self.config.stride,
      self.config.pad_mode,
    )?;

    let t0 = Instant::now();
    let output = self.session.run(&frame).map_err(Yolo11Error::Session)?;
    let t1 = Instant::now();
    debug!(
      "输出形状: anchors={}, channels={}, layout={:?}",
      output.num_anchors(),
      output.num_channels(),
      output.layout()
    );

    let detections = postprocess(&output, frame.letterbox(), &self.config.postprocess)?;
    let t2 = Instant::now();

    info!(
      "[TIME] 推理: {:.2?} | 后处理: {:.2?}",
      t1 - t0,
      t2 - t1
    );
    debug!("检测到 {} 个物体", detections.len());

    Ok(DetectResult::from_detections(detections))
  }
}

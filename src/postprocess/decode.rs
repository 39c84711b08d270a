// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess/decode.rs - 原始输出张量解码
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

use super::{BBox, Detection, PostprocessError};

/// 框坐标占用的通道数 (cx, cy, w, h)
pub const BOX_CHANNELS: usize = 4;

/// 输出张量的物理存储顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorLayout {
  /// `[num_anchors, num_channels]`，每行一个锚点
  AnchorMajor,
  /// `[num_channels, num_anchors]`，YOLO11 导出模型的默认输出
  #[default]
  ChannelMajor,
}

/// 推理引擎的原始输出，构造时即校验形状
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutput {
  data: Vec<f32>,
  num_anchors: usize,
  num_channels: usize,
  layout: TensorLayout,
}

impl RawOutput {
  pub fn new(
    data: Vec<f32>,
    num_anchors: usize,
    num_channels: usize,
    layout: TensorLayout,
  ) -> Result<Self, PostprocessError> {
    if num_channels <= BOX_CHANNELS {
      return Err(PostprocessError::InvalidShape { num_channels });
    }

    let expected = num_anchors
      .checked_mul(num_channels)
      .ok_or(PostprocessError::ShapeOverflow {
        num_anchors,
        num_channels,
      })?;
    if data.len() != expected {
      return Err(PostprocessError::BufferSizeMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data,
      num_anchors,
      num_channels,
      layout,
    })
  }

  pub fn num_anchors(&self) -> usize {
    self.num_anchors
  }

  pub fn num_channels(&self) -> usize {
    self.num_channels
  }

  pub fn num_labels(&self) -> usize {
    self.num_channels - BOX_CHANNELS
  }

  pub fn layout(&self) -> TensorLayout {
    self.layout
  }

  #[inline]
  fn value(&self, anchor: usize, channel: usize) -> f32 {
    match self.layout {
      TensorLayout::AnchorMajor => self.data[anchor * self.num_channels + channel],
      TensorLayout::ChannelMajor => self.data[channel * self.num_anchors + anchor],
    }
  }

  /// 最大类别分数及其索引，分数相同取最小索引
  fn best_label(&self, anchor: usize) -> (usize, f32) {
    let mut label = 0;
    let mut score = self.value(anchor, BOX_CHANNELS);
    for c in 1..self.num_labels() {
      let s = self.value(anchor, BOX_CHANNELS + c);
      if s > score {
        score = s;
        label = c;
      }
    }
    (label, score)
  }
}

/// 解码出所有分数高于 `conf_thres` 的候选框，坐标位于 `img_w × img_h` 的填充图中
pub fn decode(output: &RawOutput, conf_thres: f32, img_w: f32, img_h: f32) -> Vec<Detection> {
  let mut detections = Vec::new();

  for anchor in 0..output.num_anchors() {
    let (label, score) = output.best_label(anchor);
    if score <= conf_thres || score.is_nan() {
      continue;
    }

    let cx = output.value(anchor, 0);
    let cy = output.value(anchor, 1);
    let w = output.value(anchor, 2);
    let h = output.value(anchor, 3);

    let x0 = (cx - 0.5 * w).clamp(0.0, img_w);
    let y0 = (cy - 0.5 * h).clamp(0.0, img_h);
    let x1 = (cx + 0.5 * w).clamp(0.0, img_w);
    let y1 = (cy + 0.5 * h).clamp(0.0, img_h);

    detections.push(Detection {
      bbox: BBox::from_corners(x0, y0, x1, y1),
      label,
      confidence: score,
    });
  }

  detections
}

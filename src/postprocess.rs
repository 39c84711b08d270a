// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess.rs - YOLO11 输出后处理
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

//! 后处理流水线：解码 → 排序 → NMS → 坐标映射。
//!
//! 整个流水线是同步、无状态的纯函数，输入为一次推理的原始输出张量与
//! letterbox 参数，输出为原图坐标系下的检测框列表。

use thiserror::Error;
use tracing::debug;

pub mod decode;
pub mod letterbox;
pub mod mapping;
pub mod nms;
pub mod sort;

pub use self::decode::{RawOutput, TensorLayout, decode};
pub use self::letterbox::{Letterbox, MAX_STRIDE, PAD_VALUE, PadMode};
pub use self::mapping::map_to_original;
pub use self::nms::{iou, nms_sorted};
pub use self::sort::sort_by_confidence;

pub const DEFAULT_CONF_THRES: f32 = 0.25;
pub const DEFAULT_NMS_THRES: f32 = 0.45;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostprocessError {
  #[error("输出通道数无效: {num_channels}，至少需要 5 个通道（4 个框坐标 + 1 个类别）")]
  InvalidShape { num_channels: usize },
  #[error("输出缓冲区大小不匹配: 期望 {expected}, 实际 {actual}")]
  BufferSizeMismatch { expected: usize, actual: usize },
  #[error("输出形状溢出: {num_anchors} x {num_channels}")]
  ShapeOverflow { num_anchors: usize, num_channels: usize },
  #[error("阈值 {name} 超出 [0, 1] 范围: {value}")]
  InvalidThreshold { name: &'static str, value: f32 },
  #[error("letterbox 参数无效: {0}")]
  InvalidLetterbox(String),
}

/// 轴对齐矩形框，(x, y) 为左上角
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

impl BBox {
  pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// 由角点坐标构造
  pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
    Self::new(x0, y0, x1 - x0, y1 - y0)
  }

  pub fn right(&self) -> f32 {
    self.x + self.width
  }

  pub fn bottom(&self) -> f32 {
    self.y + self.height
  }

  pub fn area(&self) -> f32 {
    self.width * self.height
  }

  /// 两个框的交集面积，不相交时为 0
  pub fn intersection_area(&self, other: &BBox) -> f32 {
    let x0 = self.x.max(other.x);
    let y0 = self.y.max(other.y);
    let x1 = self.right().min(other.right());
    let y1 = self.bottom().min(other.bottom());

    if x1 <= x0 || y1 <= y0 {
      0.0
    } else {
      (x1 - x0) * (y1 - y0)
    }
  }
}

/// 单个检测结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
  /// 检测框，解码后为填充图坐标，映射后为原图坐标
  pub bbox: BBox,
  /// 类别索引，从 0 开始
  pub label: usize,
  /// 置信度（最大类别分数）
  pub confidence: f32,
}

/// 后处理参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostprocessConfig {
  /// 置信度阈值，分数严格大于该值的锚点才会保留
  pub conf_thres: f32,
  /// NMS IoU 阈值
  pub nms_thres: f32,
  /// 是否跨类别做 NMS
  pub class_agnostic: bool,
}

impl Default for PostprocessConfig {
  fn default() -> Self {
    Self {
      conf_thres: DEFAULT_CONF_THRES,
      nms_thres: DEFAULT_NMS_THRES,
      class_agnostic: false,
    }
  }
}

impl PostprocessConfig {
  pub fn with_conf_thres(mut self, conf_thres: f32) -> Self {
    self.conf_thres = conf_thres;
    self
  }

  pub fn with_nms_thres(mut self, nms_thres: f32) -> Self {
    self.nms_thres = nms_thres;
    self
  }

  pub fn with_class_agnostic(mut self, class_agnostic: bool) -> Self {
    self.class_agnostic = class_agnostic;
    self
  }

  /// 阈值越界（含 NaN）直接拒绝，不做截断
  pub fn validate(&self) -> Result<(), PostprocessError> {
    check_threshold("conf_thres", self.conf_thres)?;
    check_threshold("nms_thres", self.nms_thres)?;
    Ok(())
  }
}

fn check_threshold(name: &'static str, value: f32) -> Result<(), PostprocessError> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(PostprocessError::InvalidThreshold { name, value })
  }
}

/// 完整后处理：返回按置信度降序排列、原图坐标系下的检测结果
pub fn postprocess(
  output: &RawOutput,
  letterbox: &Letterbox,
  config: &PostprocessConfig,
) -> Result<Vec<Detection>, PostprocessError> {
  config.validate()?;

  let mut proposals = decode(
    output,
    config.conf_thres,
    letterbox.padded_width() as f32,
    letterbox.padded_height() as f32,
  );
  debug!(
    "解码得到 {} 个候选框（共 {} 个锚点）",
    proposals.len(),
    output.num_anchors()
  );

  sort_by_confidence(&mut proposals);
  let picked = nms_sorted(&proposals, config.nms_thres, config.class_agnostic);
  debug!("NMS 后保留 {} 个检测框", picked.len());

  Ok(
    picked
      .into_iter()
      .map(|idx| map_to_original(&proposals[idx], letterbox))
      .collect(),
  )
}

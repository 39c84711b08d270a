// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess/letterbox.rs - letterbox 缩放与填充参数
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

use super::{BBox, PostprocessError};

/// 模型最大下采样步长，填充后尺寸须为其整数倍
pub const MAX_STRIDE: u32 = 32;
/// 填充像素值
pub const PAD_VALUE: u8 = 114;

/// 填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
  /// 填充为 `target_size` 向上取整到步长的正方形，适用于固定输入尺寸的模型
  #[default]
  Square,
  /// 每个维度填充到不小于缩放后尺寸的最小步长倍数
  Minimal,
}

/// 原图缩放、填充到模型输入的参数
///
/// 缩放在两个方向上一致；填充总量 `pad_x`/`pad_y` 前后对半分，
/// 前半部分为 `pad / 2`（整数除法），余数落在后侧。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
  scale: f32,
  scaled_width: u32,
  scaled_height: u32,
  pad_x: u32,
  pad_y: u32,
  orig_width: u32,
  orig_height: u32,
}

impl Letterbox {
  /// 由外部预处理结果直接构造
  pub fn new(
    scale: f32,
    scaled_width: u32,
    scaled_height: u32,
    pad_x: u32,
    pad_y: u32,
    orig_width: u32,
    orig_height: u32,
  ) -> Result<Self, PostprocessError> {
    if scale.is_nan() || scale <= 0.0 || scale.is_infinite() {
      return Err(PostprocessError::InvalidLetterbox(format!(
        "缩放比例必须为正数: {}",
        scale
      )));
    }
    if orig_width == 0 || orig_height == 0 {
      return Err(PostprocessError::InvalidLetterbox(format!(
        "原图尺寸不能为 0: {}x{}",
        orig_width, orig_height
      )));
    }
    if scaled_width.checked_add(pad_x).is_none() || scaled_height.checked_add(pad_y).is_none() {
      return Err(PostprocessError::InvalidLetterbox(format!(
        "填充后尺寸溢出: {}+{} x {}+{}",
        scaled_width, pad_x, scaled_height, pad_y
      )));
    }

    Ok(Self {
      scale,
      scaled_width,
      scaled_height,
      pad_x,
      pad_y,
      orig_width,
      orig_height,
    })
  }

  /// 计算把 `orig_width × orig_height` 的图像放入 `target_size` 输入所需的参数
  pub fn compute(
    orig_width: u32,
    orig_height: u32,
    target_size: u32,
    stride: u32,
    mode: PadMode,
  ) -> Result<Self, PostprocessError> {
    if target_size == 0 || stride == 0 {
      return Err(PostprocessError::InvalidLetterbox(format!(
        "目标尺寸与步长不能为 0: target_size={}, stride={}",
        target_size, stride
      )));
    }
    if orig_width == 0 || orig_height == 0 {
      return Err(PostprocessError::InvalidLetterbox(format!(
        "原图尺寸不能为 0: {}x{}",
        orig_width, orig_height
      )));
    }

    let scale = if orig_width > orig_height {
      target_size as f32 / orig_width as f32
    } else {
      target_size as f32 / orig_height as f32
    };

    let mut scaled_width = ((orig_width as f32 * scale) as u32).max(1);
    let mut scaled_height = ((orig_height as f32 * scale) as u32).max(1);
    if scaled_width > scaled_height {
      scaled_width = target_size;
    } else {
      scaled_height = target_size;
    }

    let round_up = |v: u32| {
      v.div_ceil(stride).checked_mul(stride).ok_or_else(|| {
        PostprocessError::InvalidLetterbox(format!("填充后尺寸溢出: {} (步长 {})", v, stride))
      })
    };
    let (padded_width, padded_height) = match mode {
      PadMode::Square => {
        let side = round_up(target_size)?;
        (side, side)
      }
      PadMode::Minimal => (round_up(scaled_width)?, round_up(scaled_height)?),
    };

    Self::new(
      scale,
      scaled_width,
      scaled_height,
      padded_width - scaled_width,
      padded_height - scaled_height,
      orig_width,
      orig_height,
    )
  }

  pub fn scale(&self) -> f32 {
    self.scale
  }

  pub fn scaled_width(&self) -> u32 {
    self.scaled_width
  }

  pub fn scaled_height(&self) -> u32 {
    self.scaled_height
  }

  /// 水平方向填充总量
  pub fn pad_x(&self) -> u32 {
    self.pad_x
  }

  /// 竖直方向填充总量
  pub fn pad_y(&self) -> u32 {
    self.pad_y
  }

  pub fn pad_left(&self) -> u32 {
    self.pad_x / 2
  }

  pub fn pad_top(&self) -> u32 {
    self.pad_y / 2
  }

  pub fn padded_width(&self) -> u32 {
    self.scaled_width + self.pad_x
  }

  pub fn padded_height(&self) -> u32 {
    self.scaled_height + self.pad_y
  }

  pub fn orig_width(&self) -> u32 {
    self.orig_width
  }

  pub fn orig_height(&self) -> u32 {
    self.orig_height
  }

  /// 原图坐标 → 填充图坐标
  pub fn forward_box(&self, bbox: &BBox) -> BBox {
    BBox::new(
      bbox.x * self.scale + self.pad_left() as f32,
      bbox.y * self.scale + self.pad_top() as f32,
      bbox.width * self.scale,
      bbox.height * self.scale,
    )
  }
}

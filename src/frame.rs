// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - letterbox 输入帧定义
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

use image::{Rgb, RgbImage, imageops};
use tracing::debug;

use crate::postprocess::{Letterbox, PAD_VALUE, PadMode, PostprocessError};

const RGB_CHANNELS: usize = 3;

pub trait AsNhwcFrame {
  fn as_nhwc(&self) -> &[u8];
}

pub trait AsNchwFrame {
  /// 归一化到 [0, 1] 的 CHW 浮点张量
  fn to_nchw_f32(&self) -> Vec<f32>;
}

/// 缩放并填充后的模型输入帧
#[derive(Debug, Clone)]
pub struct LetterboxFrame {
  image: RgbImage,
  letterbox: Letterbox,
}

impl LetterboxFrame {
  pub fn from_image(
    image: &RgbImage,
    target_size: u32,
    stride: u32,
    mode: PadMode,
  ) -> Result<Self, PostprocessError> {
    let (width, height) = image.dimensions();
    let letterbox = Letterbox::compute(width, height, target_size, stride, mode)?;

    let resized = imageops::resize(
      image,
      letterbox.scaled_width(),
      letterbox.scaled_height(),
      imageops::FilterType::Triangle,
    );

    let mut padded = RgbImage::from_pixel(
      letterbox.padded_width(),
      letterbox.padded_height(),
      Rgb([PAD_VALUE; RGB_CHANNELS]),
    );
    imageops::replace(
      &mut padded,
      &resized,
      letterbox.pad_left() as i64,
      letterbox.pad_top() as i64,
    );

    debug!(
      "letterbox: {}x{} -> {}x{}, 填充后 {}x{}, 缩放 {:.4}",
      width,
      height,
      letterbox.scaled_width(),
      letterbox.scaled_height(),
      letterbox.padded_width(),
      letterbox.padded_height(),
      letterbox.scale()
    );

    Ok(Self {
      image: padded,
      letterbox,
    })
  }

  pub fn letterbox(&self) -> &Letterbox {
    &self.letterbox
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn width(&self) -> usize {
    self.image.width() as usize
  }

  pub fn height(&self) -> usize {
    self.image.height() as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }
}

impl AsNhwcFrame for LetterboxFrame {
  fn as_nhwc(&self) -> &[u8] {
    self.image.as_raw()
  }
}

impl AsNchwFrame for LetterboxFrame {
  fn to_nchw_f32(&self) -> Vec<f32> {
    let plane = self.width() * self.height();
    let mut tensor = vec![0.0f32; plane * RGB_CHANNELS];

    for (idx, pixel) in self.image.pixels().enumerate() {
      for c in 0..RGB_CHANNELS {
        tensor[c * plane + idx] = pixel[c] as f32 / 255.0;
      }
    }
    tensor
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_hollow_rect_mut, draw_text_mut},
  rect::Rect,
};

use crate::{
  model::{DetectItem, DetectResult, WithLabel},
  postprocess::BBox,
};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_OFFSET: i32 = 5; // 标签底部距框顶的距离
const BOX_THICKNESS: u32 = 2;
const BOX_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const TEXT_COLOR: [u8; 3] = [0, 0, 0];

pub struct Draw {
  font_size: f32,
  box_color: [u8; 3],
  text_color: [u8; 3],
  font: Option<FontVec>,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font_size: LABEL_FONT_SIZE,
      box_color: BOX_COLOR,
      text_color: TEXT_COLOR,
      font: None,
    }
  }
}

impl Draw {
  /// 带字体的绘制器，会在框上方写 `名称 置信度%`
  pub fn with_font(font: FontVec) -> Self {
    Self {
      font: Some(font),
      ..Self::default()
    }
  }

  pub(crate) fn has_font(&self) -> bool {
    self.font.is_some()
  }

  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BBox) -> Option<(i32, i32)> {
    let x = bbox.x.round() as i32;
    let y = bbox.y.round() as i32;
    let w = bbox.width.round() as u32;
    let h = bbox.height.round() as u32;

    for t in 0..BOX_THICKNESS {
      // Rect 不接受 0 宽高
      if w <= 2 * t || h <= 2 * t {
        break;
      }
      let rect = Rect::at(x + t as i32, y + t as i32).of_size(w - 2 * t, h - 2 * t);
      draw_hollow_rect_mut(image, rect, Rgb(self.box_color));
    }

    if w == 0 || h == 0 { None } else { Some((x, y)) }
  }

  fn draw_label<T: WithLabel>(&self, image: &mut RgbImage, item: &DetectItem<T>, at: (i32, i32)) {
    let Some(font) = &self.font else {
      return;
    };

    let label = format!("{} {:.1}%", item.kind.to_label_str(), item.score * 100.0);
    let (x, y) = at;
    let text_y = (y - LABEL_OFFSET - self.font_size as i32).max(0);

    draw_text_mut(
      image,
      Rgb(self.text_color),
      x.max(0),
      text_y,
      PxScale::from(self.font_size),
      font,
      &label,
    );
  }

  pub fn draw_detections_on_image<T: WithLabel>(
    &self,
    image: &mut RgbImage,
    result: &DetectResult<T>,
  ) {
    for item in result.iter() {
      if let Some(at) = self.draw_bbox(image, &item.bbox) {
        self.draw_label(image, item, at);
      }
    }
  }

  pub fn draw_detection<T: WithLabel>(&self, image: &RgbImage, result: &DetectResult<T>) -> RgbImage {
    let mut image = image.clone();
    self.draw_detections_on_image(&mut image, result);
    image
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{model::CocoLabel, postprocess::Detection};

  fn result(bbox: BBox) -> DetectResult<CocoLabel> {
    DetectResult::from_detections(vec![Detection {
      bbox,
      label: 0,
      confidence: 0.9,
    }])
  }

  #[test]
  fn draws_box_outline() {
    let image = RgbImage::new(20, 20);
    let drawn = Draw::default().draw_detection(&image, &result(BBox::new(2.0, 3.0, 10.0, 8.0)));

    let green = Rgb(BOX_COLOR);
    assert_eq!(*drawn.get_pixel(2, 3), green);
    assert_eq!(*drawn.get_pixel(11, 10), green);
    // 第二圈
    assert_eq!(*drawn.get_pixel(3, 4), green);
    // 内部不变
    assert_eq!(*drawn.get_pixel(6, 7), Rgb([0, 0, 0]));
    // 原图不被修改
    assert_eq!(*image.get_pixel(2, 3), Rgb([0, 0, 0]));
  }

  #[test]
  fn degenerate_box_is_skipped() {
    let image = RgbImage::new(10, 10);
    let drawn = Draw::default().draw_detection(&image, &result(BBox::new(2.0, 2.0, 0.0, 5.0)));
    assert_eq!(drawn, image);
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess/mapping.rs - 填充图坐标映射回原图
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

use super::{BBox, Detection, Letterbox};

/// 把填充图坐标系下的检测框映射回原图
///
/// 角点先减去前侧填充再除以缩放比例，然后截断到 `[0, width - 1]` /
/// `[0, height - 1]`（注意不是 `width`/`height`）。宽高不会为负。
pub fn map_to_original(detection: &Detection, letterbox: &Letterbox) -> Detection {
  let bbox = &detection.bbox;
  let scale = letterbox.scale();
  let pad_left = letterbox.pad_left() as f32;
  let pad_top = letterbox.pad_top() as f32;
  let max_x = (letterbox.orig_width() - 1) as f32;
  let max_y = (letterbox.orig_height() - 1) as f32;

  let x0 = ((bbox.x - pad_left) / scale).clamp(0.0, max_x);
  let y0 = ((bbox.y - pad_top) / scale).clamp(0.0, max_y);
  let x1 = ((bbox.right() - pad_left) / scale).clamp(0.0, max_x);
  let y1 = ((bbox.bottom() - pad_top) / scale).clamp(0.0, max_y);

  Detection {
    bbox: BBox::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0)),
    ..*detection
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::postprocess::{MAX_STRIDE, PadMode};

  fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
  }

  fn detection(bbox: BBox) -> Detection {
    Detection {
      bbox,
      label: 3,
      confidence: 0.6,
    }
  }

  #[test]
  fn clamps_one_pixel_inside() {
    let lb = Letterbox::compute(640, 480, 480, MAX_STRIDE, PadMode::Square).unwrap();
    let mapped = map_to_original(&detection(BBox::new(0.0, 0.0, 480.0, 480.0)), &lb);

    assert_eq!(mapped.bbox, BBox::new(0.0, 0.0, 639.0, 479.0));
    assert_eq!(mapped.label, 3);
    assert_eq!(mapped.confidence, 0.6);
  }

  #[test]
  fn box_entirely_in_padding_collapses() {
    let lb = Letterbox::compute(640, 480, 480, MAX_STRIDE, PadMode::Square).unwrap();
    // 完全落在上方填充区
    let mapped = map_to_original(&detection(BBox::new(10.0, 0.0, 20.0, 30.0)), &lb);
    assert_eq!(mapped.bbox.y, 0.0);
    assert_eq!(mapped.bbox.height, 0.0);
    assert!(mapped.bbox.width >= 0.0);
  }

  #[test]
  fn negative_extent_is_clamped_to_zero() {
    let lb = Letterbox::new(1.0, 100, 100, 0, 0, 100, 100).unwrap();
    let mapped = map_to_original(&detection(BBox::new(50.0, 50.0, -10.0, -10.0)), &lb);
    assert_eq!(mapped.bbox.width, 0.0);
    assert_eq!(mapped.bbox.height, 0.0);
  }

  #[test]
  fn round_trip_through_forward_transform() {
    let cases = [
      (640, 480, PadMode::Square, BBox::new(100.0, 50.0, 200.0, 100.0)),
      (480, 640, PadMode::Square, BBox::new(0.0, 10.0, 479.0, 300.0)),
      (1280, 720, PadMode::Minimal, BBox::new(320.5, 100.25, 64.0, 600.0)),
      (333, 777, PadMode::Minimal, BBox::new(12.0, 700.0, 300.0, 76.0)),
    ];

    for (w, h, mode, original) in cases {
      let lb = Letterbox::compute(w, h, 480, MAX_STRIDE, mode).unwrap();
      let padded = lb.forward_box(&original);
      let mapped = map_to_original(&detection(padded), &lb);

      assert!(approx_eq(mapped.bbox.x, original.x), "{:?}", mapped);
      assert!(approx_eq(mapped.bbox.y, original.y), "{:?}", mapped);
      assert!(approx_eq(mapped.bbox.width, original.width), "{:?}", mapped);
      assert!(approx_eq(mapped.bbox.height, original.height), "{:?}", mapped);
    }
  }

  #[test]
  fn mapped_coordinates_stay_in_bounds() {
    let lb = Letterbox::compute(300, 200, 480, MAX_STRIDE, PadMode::Square).unwrap();
    for bbox in [
      BBox::new(-50.0, -50.0, 700.0, 700.0),
      BBox::new(470.0, 470.0, 100.0, 100.0),
      BBox::new(0.0, 0.0, 0.0, 0.0),
    ] {
      let mapped = map_to_original(&detection(bbox), &lb).bbox;
      assert!(mapped.x >= 0.0 && mapped.x <= 299.0);
      assert!(mapped.y >= 0.0 && mapped.y <= 199.0);
      assert!(mapped.right() <= 299.0);
      assert!(mapped.bottom() <= 199.0);
      assert!(mapped.width >= 0.0 && mapped.height >= 0.0);
    }
  }
}

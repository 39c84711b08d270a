// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess/nms.rs - 非极大值抑制
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

use super::{BBox, Detection};

/// 两个框的 IoU，并集面积为 0 时返回 0
pub fn iou(a: &BBox, b: &BBox) -> f32 {
  let inter = a.intersection_area(b);
  let union = a.area() + b.area() - inter;
  if union > 0.0 { inter / union } else { 0.0 }
}

/// 对已按置信度降序排好的候选框做贪心 NMS
///
/// 返回保留下来的下标（指向 `detections`），顺序即接受顺序。
/// 非 `class_agnostic` 模式下不同类别的框互不抑制。
pub fn nms_sorted(detections: &[Detection], nms_thres: f32, class_agnostic: bool) -> Vec<usize> {
  let areas: Vec<f32> = detections.iter().map(|d| d.bbox.area()).collect();
  let mut picked: Vec<usize> = Vec::new();

  for (i, a) in detections.iter().enumerate() {
    let suppressed = picked.iter().any(|&j| {
      let b = &detections[j];
      if !class_agnostic && a.label != b.label {
        return false;
      }
      let inter = a.bbox.intersection_area(&b.bbox);
      let union = areas[i] + areas[j] - inter;
      union > 0.0 && inter / union > nms_thres
    });

    if !suppressed {
      picked.push(i);
    }
  }

  picked
}

#[cfg(test)]
mod tests {
  use super::*;

  fn det(x: f32, y: f32, w: f32, h: f32, label: usize, confidence: f32) -> Detection {
    Detection {
      bbox: BBox::new(x, y, w, h),
      label,
      confidence,
    }
  }

  #[test]
  fn iou_identical_is_one() {
    let a = BBox::new(3.0, 4.0, 10.0, 20.0);
    assert_eq!(iou(&a, &a), 1.0);
  }

  #[test]
  fn iou_disjoint_is_zero() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(100.0, 100.0, 500.0, 500.0);
    assert_eq!(iou(&a, &b), 0.0);
    assert_eq!(iou(&b, &a), 0.0);
  }

  #[test]
  fn iou_partial_overlap() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(5.0, 5.0, 10.0, 10.0);
    assert_eq!(iou(&a, &b), 25.0 / 175.0);
  }

  #[test]
  fn iou_zero_area_boxes() {
    let a = BBox::new(5.0, 5.0, 0.0, 0.0);
    assert_eq!(iou(&a, &a), 0.0);
  }

  #[test]
  fn identical_boxes_keep_highest() {
    let sorted = vec![
      det(8.0, 8.0, 4.0, 4.0, 0, 0.95),
      det(8.0, 8.0, 4.0, 4.0, 0, 0.9),
    ];
    assert_eq!(nms_sorted(&sorted, 0.45, false), vec![0]);
  }

  #[test]
  fn cross_class_overlap_is_kept_unless_agnostic() {
    let sorted = vec![
      det(0.0, 0.0, 10.0, 10.0, 1, 0.8),
      det(0.0, 0.0, 10.0, 10.0, 2, 0.7),
    ];
    assert_eq!(nms_sorted(&sorted, 0.45, false), vec![0, 1]);
    assert_eq!(nms_sorted(&sorted, 0.45, true), vec![0]);
  }

  #[test]
  fn overlap_below_threshold_survives() {
    // IoU = 25 / 175 ≈ 0.143
    let sorted = vec![
      det(0.0, 0.0, 10.0, 10.0, 0, 0.9),
      det(5.0, 5.0, 10.0, 10.0, 0, 0.8),
    ];
    assert_eq!(nms_sorted(&sorted, 0.45, false), vec![0, 1]);
    assert_eq!(nms_sorted(&sorted, 0.1, false), vec![0]);
  }

  #[test]
  fn suppressed_box_does_not_suppress_others() {
    // b 被 a 抑制，c 与 b 重叠但与 a 不重叠，c 应保留
    let sorted = vec![
      det(0.0, 0.0, 10.0, 10.0, 0, 0.9),
      det(2.0, 0.0, 10.0, 10.0, 0, 0.8),
      det(9.0, 0.0, 10.0, 10.0, 0, 0.7),
    ];
    assert_eq!(nms_sorted(&sorted, 0.45, false), vec![0, 2]);
  }

  #[test]
  fn zero_area_boxes_never_suppress() {
    let sorted = vec![
      det(5.0, 5.0, 0.0, 0.0, 0, 0.9),
      det(5.0, 5.0, 0.0, 0.0, 0, 0.8),
    ];
    assert_eq!(nms_sorted(&sorted, 0.0, true), vec![0, 1]);
  }

  #[test]
  fn nms_is_idempotent() {
    let sorted = vec![
      det(0.0, 0.0, 10.0, 10.0, 0, 0.9),
      det(1.0, 1.0, 10.0, 10.0, 0, 0.85),
      det(50.0, 50.0, 10.0, 10.0, 0, 0.8),
      det(0.0, 0.0, 10.0, 10.0, 1, 0.75),
      det(51.0, 50.0, 10.0, 10.0, 0, 0.6),
      det(200.0, 10.0, 30.0, 30.0, 3, 0.3),
    ];
    let first: Vec<Detection> = nms_sorted(&sorted, 0.45, false)
      .into_iter()
      .map(|i| sorted[i])
      .collect();
    assert_eq!(first.len(), 4);

    let second: Vec<Detection> = nms_sorted(&first, 0.45, false)
      .into_iter()
      .map(|i| first[i])
      .collect();
    assert_eq!(first, second);
  }

  #[test]
  fn empty_input() {
    assert!(nms_sorted(&[], 0.45, false).is_empty());
  }
}

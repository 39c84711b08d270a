// 该文件是 Shanan （山南西风） 项目的一部分。
// src/postprocess/sort.rs - 候选框排序
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

use std::cmp::Ordering;

use super::Detection;

#[inline]
fn descending(a: &Detection, b: &Detection) -> Ordering {
  b.confidence.total_cmp(&a.confidence)
}

/// 按置信度降序原地排序，同分顺序不作保证
#[cfg(not(feature = "parallel"))]
pub fn sort_by_confidence(detections: &mut [Detection]) {
  detections.sort_unstable_by(descending);
}

/// 按置信度降序原地排序，同分顺序不作保证
#[cfg(feature = "parallel")]
pub fn sort_by_confidence(detections: &mut [Detection]) {
  use rayon::slice::ParallelSliceMut;

  detections.par_sort_unstable_by(descending);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::postprocess::BBox;

  fn detection(id: usize, confidence: f32) -> Detection {
    Detection {
      bbox: BBox::new(id as f32, 0.0, 1.0, 1.0),
      label: id % 3,
      confidence,
    }
  }

  #[test]
  fn sorted_descending() {
    let scores = [0.3, 0.9, 0.1, 0.5, 0.5, 0.7, 0.95, 0.2];
    let mut detections: Vec<_> = scores
      .iter()
      .enumerate()
      .map(|(i, &s)| detection(i, s))
      .collect();

    sort_by_confidence(&mut detections);

    assert!(
      detections
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence)
    );
    assert_eq!(detections[0].confidence, 0.95);
    assert_eq!(detections[7].confidence, 0.1);
  }

  #[test]
  fn sort_is_a_permutation() {
    let mut detections: Vec<_> = (0..64)
      .map(|i| detection(i, ((i * 37) % 17) as f32 / 17.0))
      .collect();
    let original = detections.clone();

    sort_by_confidence(&mut detections);

    assert_eq!(detections.len(), original.len());
    let mut ids: Vec<usize> = detections.iter().map(|d| d.bbox.x as usize).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..64).collect::<Vec<_>>());
    for d in &detections {
      assert!(original.contains(d));
    }
  }

  #[test]
  fn empty_and_single() {
    let mut empty: Vec<Detection> = Vec::new();
    sort_by_confidence(&mut empty);
    assert!(empty.is_empty());

    let mut single = vec![detection(0, 0.4)];
    sort_by_confidence(&mut single);
    assert_eq!(single, vec![detection(0, 0.4)]);
  }
}

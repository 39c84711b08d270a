// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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

use crate::postprocess::{BBox, Detection};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&mut self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct DetectItem<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: BBox, // 原图像素坐标 [x, y, width, height]
}

#[derive(Debug, Clone)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

impl<T: WithLabel> DetectResult<T> {
  pub fn from_detections(detections: Vec<Detection>) -> Self {
    let items = detections
      .into_iter()
      .map(|d| DetectItem {
        kind: T::from_label_id(d.label),
        score: d.confidence,
        bbox: d.bbox,
      })
      .collect();
    Self { items }
  }
}

impl<T> DetectResult<T> {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &DetectItem<T>> {
    self.items.iter()
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn from_label_id(id: usize) -> Self;
  fn label_id(&self) -> usize;
}

mod coco;
pub use self::coco::{COCO_NAMES, CocoLabel};

mod session;
pub use self::session::InferenceSession;

mod tensor_file;
pub use self::tensor_file::{TensorFileSession, TensorFileSessionError};

mod yolo11;
pub use self::yolo11::{Yolo11, Yolo11Config, Yolo11Error};

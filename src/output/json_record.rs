// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/json_record.rs - JSON 检测结果记录
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

use std::{fs::File, io::BufWriter, path::PathBuf};

use chrono::Utc;
use image::RgbImage;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DetectResult, WithLabel},
  output::Render,
};

#[derive(Error, Debug)]
pub enum JsonRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Serialize, Debug)]
struct RecordItem {
  label: usize,
  name: String,
  confidence: f32,
  x: f32,
  y: f32,
  width: f32,
  height: f32,
}

#[derive(Serialize, Debug)]
struct Record {
  timestamp: String,
  image_width: u32,
  image_height: u32,
  count: usize,
  detections: Vec<RecordItem>,
}

impl Record {
  fn new<T: WithLabel>(frame: &RgbImage, result: &DetectResult<T>) -> Self {
    let detections: Vec<RecordItem> = result
      .iter()
      .map(|item| RecordItem {
        label: item.kind.label_id(),
        name: item.kind.to_label_str(),
        confidence: item.score,
        x: item.bbox.x,
        y: item.bbox.y,
        width: item.bbox.width,
        height: item.bbox.height,
      })
      .collect();

    Record {
      timestamp: Utc::now().to_rfc3339(),
      image_width: frame.width(),
      image_height: frame.height(),
      count: detections.len(),
      detections,
    }
  }
}

/// 将检测结果写为 JSON 文件：`json:///out/result.json`
pub struct JsonRecordOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for JsonRecordOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonRecordOutputError::SchemeMismatch);
    }

    Ok(JsonRecordOutput {
      path: PathBuf::from(uri.path()),
    })
  }
}

impl<T: WithLabel> Render<RgbImage, DetectResult<T>> for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn render_result(&self, frame: &RgbImage, result: &DetectResult<T>) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let record = Record::new(frame, result);
    let writer = BufWriter::new(File::create(&self.path)?);
    serde_json::to_writer_pretty(writer, &record)?;

    warn!("保存检测记录到文件: {}", self.path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    model::CocoLabel,
    postprocess::{BBox, Detection},
  };

  #[test]
  fn writes_detections_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("result.json");
    let url = Url::parse(&format!("json://{}", path.display())).unwrap();
    let output = JsonRecordOutput::from_url(&url).unwrap();

    let frame = RgbImage::new(640, 480);
    let result: DetectResult<CocoLabel> = DetectResult::from_detections(vec![
      Detection {
        bbox: BBox::new(10.0, 20.0, 30.0, 40.0),
        label: 16,
        confidence: 0.5,
      },
      Detection {
        bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
        label: 0,
        confidence: 0.25,
      },
    ]);
    output.render_result(&frame, &result).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["count"], 2);
    assert_eq!(value["image_width"], 640);
    assert_eq!(value["detections"][0]["name"], "dog");
    assert_eq!(value["detections"][0]["label"], 16);
    assert_eq!(value["detections"][0]["width"], 30.0);
    assert_eq!(value["detections"][1]["confidence"], 0.25);
    assert!(value["timestamp"].is_string());
  }

  #[test]
  fn empty_result_is_still_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");
    let url = Url::parse(&format!("json://{}", path.display())).unwrap();
    let output = JsonRecordOutput::from_url(&url).unwrap();

    let result: DetectResult<CocoLabel> = DetectResult::from_detections(Vec::new());
    output.render_result(&RgbImage::new(4, 4), &result).unwrap();

    let value: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["count"], 0);
    assert_eq!(value["detections"].as_array().map(Vec::len), Some(0));
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/tensor_file.rs - 原始输出张量回放会话
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

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{AsNhwcFrame, LetterboxFrame},
  model::InferenceSession,
  postprocess::{PostprocessError, RawOutput, TensorLayout},
};

const TENSOR_FILE_DEFAULT_CHANNELS: usize = 84; // 4 + COCO 80 类
const F32_BYTES: usize = std::mem::size_of::<f32>();

#[derive(Error, Debug)]
pub enum TensorFileSessionError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("张量文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("张量文件大小 {0} 字节不是 4 的整数倍")]
  TruncatedFile(usize),
  #[error("查询参数 {key} 无效: {value}")]
  InvalidQuery { key: String, value: String },
  #[error("张量形状错误: {0}")]
  ShapeMismatch(#[from] PostprocessError),
}

/// 从文件读取一次推理的原始输出（小端 f32），每次 `run` 都返回同一份数据
///
/// URL 形如 `tensor:///path/out.bin?channels=84&anchors=4725&layout=channel_major`，
/// 省略 `anchors` 时由文件长度推出。
#[derive(Debug)]
pub struct TensorFileSession {
  path: String,
  output: RawOutput,
}

impl FromUrlWithScheme for TensorFileSession {
  const SCHEME: &'static str = "tensor";
}

impl FromUrl for TensorFileSession {
  type Error = TensorFileSessionError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(TensorFileSessionError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let query: HashMap<String, String> = url
      .query_pairs()
      .map(|(k, v)| (String::from(k), String::from(v)))
      .collect();

    let channels = match query.get("channels") {
      Some(v) => parse_usize("channels", v)?,
      None => TENSOR_FILE_DEFAULT_CHANNELS,
    };
    let anchors = match query.get("anchors") {
      Some(v) => Some(parse_usize("anchors", v)?),
      None => None,
    };
    let layout = match query.get("layout").map(String::as_str) {
      None | Some("channel_major") => TensorLayout::ChannelMajor,
      Some("anchor_major") => TensorLayout::AnchorMajor,
      Some(other) => {
        return Err(TensorFileSessionError::InvalidQuery {
          key: "layout".to_string(),
          value: other.to_string(),
        });
      }
    };

    Self::open(url.path(), channels, anchors, layout)
  }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, TensorFileSessionError> {
  value
    .parse()
    .map_err(|_| TensorFileSessionError::InvalidQuery {
      key: key.to_string(),
      value: value.to_string(),
    })
}

impl TensorFileSession {
  pub fn open(
    path: &str,
    num_channels: usize,
    num_anchors: Option<usize>,
    layout: TensorLayout,
  ) -> Result<Self, TensorFileSessionError> {
    info!("加载张量文件: {}", path);
    let bytes = std::fs::read(path)?;
    if bytes.len() % F32_BYTES != 0 {
      return Err(TensorFileSessionError::TruncatedFile(bytes.len()));
    }

    let data: Vec<f32> = bytes
      .chunks_exact(F32_BYTES)
      .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect();

    // 通道数为 0 时交给 RawOutput 报告形状错误
    let num_anchors = num_anchors.unwrap_or(data.len().checked_div(num_channels).unwrap_or(0));
    debug!(
      "张量文件: {} 个浮点数, anchors={}, channels={}, layout={:?}",
      data.len(),
      num_anchors,
      num_channels,
      layout
    );

    let output = RawOutput::new(data, num_anchors, num_channels, layout)?;
    Ok(Self {
      path: path.to_string(),
      output,
    })
  }

  pub fn path(&self) -> &str {
    &self.path
  }
}

impl InferenceSession for TensorFileSession {
  type Error = TensorFileSessionError;

  fn run(&mut self, input: &LetterboxFrame) -> Result<RawOutput, Self::Error> {
    debug!(
      "回放张量文件 {} (输入 {}x{}, {} 字节)",
      self.path,
      input.width(),
      input.height(),
      input.as_nhwc().len()
    );
    Ok(self.output.clone())
  }
}

// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/session.rs - 推理会话接口
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

use crate::{frame::LetterboxFrame, postprocess::RawOutput};

/// 推理引擎会话
///
/// 会话由调用方创建并持有，检测器只借用它。`run` 需要 `&mut self`，
/// 同一个会话不能被多个帧同时调用；跨线程共享时需调用方自行加锁。
///
/// 输入帧已完成 letterbox。NHWC `u8` 输入的引擎用 [`AsNhwcFrame::as_nhwc`]，
/// NCHW `f32` 输入的引擎用 [`AsNchwFrame::to_nchw_f32`]。
///
/// [`AsNhwcFrame::as_nhwc`]: crate::frame::AsNhwcFrame::as_nhwc
/// [`AsNchwFrame::to_nchw_f32`]: crate::frame::AsNchwFrame::to_nchw_f32
pub trait InferenceSession {
  type Error;

  fn run(&mut self, input: &LetterboxFrame) -> Result<RawOutput, Self::Error>;
}

// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/input.rs - 手部检测器接口
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

use thiserror::Error;

use crate::frame::LandmarkFrame;

/// 手部关键点检测器
///
/// 输入一张图像（或等价物），输出 0 到 `max_hands` 只手。
pub trait Detector {
  type Input;
  type Error;

  fn detect(&self, input: &Self::Input) -> Result<Vec<LandmarkFrame>, Self::Error>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorConfigError {
  #[error("检测置信度超出 [0, 1]: {0}")]
  DetectionConfidence(f32),
  #[error("跟踪置信度超出 [0, 1]: {0}")]
  TrackingConfidence(f32),
  #[error("最大手数必须大于 0")]
  NoHands,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
  pub detection_confidence: f32,
  pub tracking_confidence: f32,
  pub max_hands: usize,
  pub static_image_mode: bool,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    // 提高检测置信度以减少闪烁
    Self {
      detection_confidence: 0.7,
      tracking_confidence: 0.5,
      max_hands: 1,
      static_image_mode: false,
    }
  }
}

impl DetectorConfig {
  pub fn validate(&self) -> Result<(), DetectorConfigError> {
    if !(0.0..=1.0).contains(&self.detection_confidence) {
      return Err(DetectorConfigError::DetectionConfidence(
        self.detection_confidence,
      ));
    }
    if !(0.0..=1.0).contains(&self.tracking_confidence) {
      return Err(DetectorConfigError::TrackingConfidence(
        self.tracking_confidence,
      ));
    }
    if self.max_hands == 0 {
      return Err(DetectorConfigError::NoHands);
    }
    Ok(())
  }
}

#[cfg(feature = "replay_input")]
mod replay;
#[cfg(feature = "replay_input")]
pub use self::replay::{DetectionRecord, HandRecord, ReplayDetector, ReplayError, ReplayInput};

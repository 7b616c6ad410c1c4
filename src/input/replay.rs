// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/input/replay.rs - 回放录制的检测结果
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

//! # 检测结果回放
//!
//! 每行一个 JSON 对象，坐标为相对图像宽高的比例：
//!
//! ```text
//! {"width":640,"height":480,"timestamp_ms":33,"hands":[{"score":0.92,"handedness":"Right","landmarks":[[0.31,0.82],...]}]}
//! ```
//!
//! 用 `replay:///path/to/record.jsonl` 打开。

use std::{
  cell::Cell,
  fs::File,
  io::{BufRead, BufReader},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{Handedness, Landmark, LandmarkFrame},
  input::{Detector, DetectorConfig, DetectorConfigError},
};

#[derive(Error, Debug)]
pub enum ReplayError {
  #[error("URI 方案不匹配: 期望 '{0}', 实际 '{1}'")]
  SchemeMismatch(&'static str, String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("关键点 {0} 坐标不足两个分量")]
  MalformedPoint(usize),
  #[error("检测器配置错误: {0}")]
  Config(#[from] DetectorConfigError),
}

fn full_score() -> f32 {
  1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
  #[serde(default = "full_score")]
  pub score: f32,
  #[serde(default)]
  pub handedness: Option<Handedness>,
  /// 每个关键点为 [x, y] 或 [x, y, z]，z 被忽略
  pub landmarks: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
  pub width: u32,
  pub height: u32,
  #[serde(default)]
  pub timestamp_ms: u64,
  #[serde(default)]
  pub sequence: Option<u64>,
  #[serde(default)]
  pub hands: Vec<HandRecord>,
}

impl HandRecord {
  fn to_frame(&self, width: u32, height: u32) -> Result<LandmarkFrame, ReplayError> {
    let landmarks = self
      .landmarks
      .iter()
      .enumerate()
      .map(|(id, point)| match point.as_slice() {
        [x, y, ..] => Ok(Landmark::from_normalized(id as u32, *x, *y, width, height)),
        _ => Err(ReplayError::MalformedPoint(id)),
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(
      LandmarkFrame::from(landmarks)
        .with_score(self.score)
        .with_handedness(self.handedness),
    )
  }
}

pub struct ReplayInput<R> {
  reader: R,
  line_number: usize,
}

impl FromUrlWithScheme for ReplayInput<BufReader<File>> {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayInput<BufReader<File>> {
  type Error = ReplayError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayError::SchemeMismatch(
        Self::SCHEME,
        url.scheme().to_string(),
      ));
    }

    let path = url.path();
    info!("打开回放文件: {}", path);
    let file = File::open(path)?;
    Ok(Self::from_reader(BufReader::new(file)))
  }
}

impl<R: BufRead> ReplayInput<R> {
  pub fn from_reader(reader: R) -> Self {
    Self {
      reader,
      line_number: 0,
    }
  }
}

impl<R: BufRead> Iterator for ReplayInput<R> {
  type Item = DetectionRecord;

  fn next(&mut self) -> Option<Self::Item> {
    let mut line = String::new();
    loop {
      line.clear();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(e) => {
          error!("读取回放文件失败: {}", e);
          return None;
        }
      }
      self.line_number += 1;

      let text = line.trim();
      if text.is_empty() {
        continue;
      }
      match serde_json::from_str(text) {
        Ok(record) => return Some(record),
        Err(e) => warn!("第 {} 行解析失败，已跳过: {}", self.line_number, e),
      }
    }
  }
}

/// 把录制结果当作检测器输出，按 [`DetectorConfig`] 过滤
pub struct ReplayDetector {
  config: DetectorConfig,
  next_sequence: Cell<u64>,
  tracking: Cell<bool>,
}

impl ReplayDetector {
  pub fn new(config: DetectorConfig) -> Result<Self, ReplayError> {
    config.validate()?;
    Ok(Self {
      config,
      next_sequence: Cell::new(0),
      tracking: Cell::new(false),
    })
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  // 上一帧有手时按跟踪置信度筛选，否则按检测置信度
  fn threshold(&self) -> f32 {
    if !self.config.static_image_mode && self.tracking.get() {
      self.config.tracking_confidence
    } else {
      self.config.detection_confidence
    }
  }
}

impl Detector for ReplayDetector {
  type Input = DetectionRecord;
  type Error = ReplayError;

  fn detect(&self, input: &Self::Input) -> Result<Vec<LandmarkFrame>, Self::Error> {
    let sequence = input.sequence.unwrap_or_else(|| self.next_sequence.get());
    self.next_sequence.set(sequence.wrapping_add(1));

    let threshold = self.threshold();
    let hands = input
      .hands
      .iter()
      .filter(|hand| hand.score >= threshold)
      .take(self.config.max_hands)
      .map(|hand| {
        hand.to_frame(input.width, input.height).map(|frame| {
          frame
            .with_sequence(sequence)
            .with_timestamp_ms(input.timestamp_ms)
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    self.tracking.set(!hands.is_empty());
    Ok(hands)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  const RECORDS: &str = r#"
{"width":640,"height":480,"timestamp_ms":0,"hands":[{"score":0.9,"handedness":"Right","landmarks":[[0.5,0.5],[0.25,0.75,0.01]]}]}

not json
{"width":640,"height":480,"timestamp_ms":33,"hands":[]}
"#;

  #[test]
  fn reads_records_and_skips_bad_lines() {
    let records: Vec<_> = ReplayInput::from_reader(Cursor::new(RECORDS)).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hands.len(), 1);
    assert_eq!(records[0].hands[0].handedness, Some(Handedness::Right));
    assert_eq!(records[1].timestamp_ms, 33);
    assert!(records[1].hands.is_empty());
  }

  #[test]
  fn detection_converts_to_pixels() {
    let record = ReplayInput::from_reader(Cursor::new(RECORDS)).next().unwrap();
    let detector = ReplayDetector::new(DetectorConfig::default()).unwrap();
    let hands = detector.detect(&record).unwrap();
    assert_eq!(hands.len(), 1);
    assert_eq!(
      hands[0].landmarks(),
      &[Landmark::new(0, 320, 240), Landmark::new(1, 160, 360)]
    );
    assert_eq!(hands[0].handedness, Some(Handedness::Right));
    assert_eq!(hands[0].sequence, 0);
  }

  fn record(scores: &[f32]) -> DetectionRecord {
    DetectionRecord {
      width: 100,
      height: 100,
      timestamp_ms: 0,
      sequence: None,
      hands: scores
        .iter()
        .map(|&score| HandRecord {
          score,
          handedness: None,
          landmarks: vec![vec![0.1, 0.1]],
        })
        .collect(),
    }
  }

  #[test]
  fn confidence_and_hand_limit_apply() {
    let detector = ReplayDetector::new(DetectorConfig::default()).unwrap();
    // 未跟踪时使用 0.7 的检测阈值
    assert!(detector.detect(&record(&[0.6])).unwrap().is_empty());
    let hands = detector.detect(&record(&[0.8, 0.95])).unwrap();
    assert_eq!(hands.len(), 1);
    assert_eq!(hands[0].score, 0.8);
    // 跟踪中改用 0.5 的跟踪阈值
    assert_eq!(detector.detect(&record(&[0.6])).unwrap().len(), 1);
    assert_eq!(detector.detect(&record(&[0.6])).unwrap()[0].sequence, 3);
  }

  #[test]
  fn static_mode_always_uses_detection_threshold() {
    let config = DetectorConfig {
      static_image_mode: true,
      ..Default::default()
    };
    let detector = ReplayDetector::new(config).unwrap();
    assert_eq!(detector.detect(&record(&[0.8])).unwrap().len(), 1);
    assert!(detector.detect(&record(&[0.6])).unwrap().is_empty());
  }

  #[test]
  fn sequence_counter_wraps_at_the_end() {
    let detector = ReplayDetector::new(DetectorConfig::default()).unwrap();
    let mut last = record(&[0.9]);
    last.sequence = Some(u64::MAX);
    assert_eq!(detector.detect(&last).unwrap()[0].sequence, u64::MAX);
    assert_eq!(detector.detect(&record(&[0.9])).unwrap()[0].sequence, 0);
  }

  #[test]
  fn out_of_range_ratios_saturate_to_pixel_limits() {
    let mut far = record(&[0.9]);
    far.hands[0].landmarks = vec![vec![-1e10, -1e10], vec![1e10, 1e10]];
    let detector = ReplayDetector::new(DetectorConfig::default()).unwrap();
    let hands = detector.detect(&far).unwrap();
    assert_eq!(
      hands[0].landmarks(),
      &[
        Landmark::new(0, i32::MIN, i32::MIN),
        Landmark::new(1, i32::MAX, i32::MAX)
      ]
    );
    let bbox = crate::geometry::bounding_box(&hands[0], 0).unwrap();
    assert_eq!(crate::geometry::bounding_box_area(&bbox), i64::MAX);
  }

  #[test]
  fn malformed_point_is_an_error() {
    let mut bad = record(&[0.9]);
    bad.hands[0].landmarks = vec![vec![0.5]];
    let detector = ReplayDetector::new(DetectorConfig::default()).unwrap();
    assert!(matches!(
      detector.detect(&bad),
      Err(ReplayError::MalformedPoint(0))
    ));
  }
}

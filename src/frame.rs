// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/frame.rs - 手部关键点帧定义
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

use serde::{Deserialize, Serialize};

/// 手部关键点数量（MediaPipe 拓扑）
pub const HAND_LANDMARK_COUNT: usize = 21;

pub const WRIST: u32 = 0;
pub const THUMB_TIP: u32 = 4;
pub const INDEX_TIP: u32 = 8;
pub const MIDDLE_TIP: u32 = 12;
pub const RING_TIP: u32 = 16;
pub const PINKY_TIP: u32 = 20;

/// 五根手指的指尖编号，拇指在前
pub const TIP_IDS: [u32; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
  Left,
  Right,
}

/// 像素坐标系下的单个关键点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
  pub id: u32,
  pub x: i32,
  pub y: i32,
}

impl Landmark {
  pub fn new(id: u32, x: i32, y: i32) -> Self {
    Self { id, x, y }
  }

  /// 检测器输出的是相对图像宽高的比例，这里换算为像素坐标（向零取整）
  pub fn from_normalized(id: u32, nx: f32, ny: f32, width: u32, height: u32) -> Self {
    Self {
      id,
      x: (nx * width as f32) as i32,
      y: (ny * height as f32) as i32,
    }
  }
}

/// 包含边界的像素矩形 [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
  pub min_x: i32,
  pub min_y: i32,
  pub max_x: i32,
  pub max_y: i32,
}

impl BoundingBox {
  pub fn width(&self) -> i64 {
    self.max_x as i64 - self.min_x as i64
  }

  pub fn height(&self) -> i64 {
    self.max_y as i64 - self.min_y as i64
  }

  /// 每条边向外扩 `margin` 像素，负值按 0 处理，超出 i32 时停在边界
  pub fn padded(&self, margin: i32) -> Self {
    let margin = margin.max(0);
    Self {
      min_x: self.min_x.saturating_sub(margin),
      min_y: self.min_y.saturating_sub(margin),
      max_x: self.max_x.saturating_add(margin),
      max_y: self.max_y.saturating_add(margin),
    }
  }
}

/// 一只手在一帧中的检测结果
///
/// 关键点数量为零的帧视为“没有手”，而不是面积为零的手。
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
  landmarks: Box<[Landmark]>,
  pub sequence: u64,
  pub timestamp_ms: u64,
  pub score: f32,
  pub handedness: Option<Handedness>,
}

impl From<Vec<Landmark>> for LandmarkFrame {
  fn from(landmarks: Vec<Landmark>) -> Self {
    Self {
      landmarks: landmarks.into_boxed_slice(),
      sequence: 0,
      timestamp_ms: 0,
      score: 1.0,
      handedness: None,
    }
  }
}

impl LandmarkFrame {
  /// 按 (x, y) 列表构造，编号取列表下标
  pub fn from_points(points: &[(i32, i32)]) -> Self {
    points
      .iter()
      .enumerate()
      .map(|(id, &(x, y))| Landmark::new(id as u32, x, y))
      .collect::<Vec<_>>()
      .into()
  }

  pub fn with_sequence(mut self, sequence: u64) -> Self {
    self.sequence = sequence;
    self
  }

  pub fn with_timestamp_ms(mut self, timestamp_ms: u64) -> Self {
    self.timestamp_ms = timestamp_ms;
    self
  }

  pub fn with_score(mut self, score: f32) -> Self {
    self.score = score;
    self
  }

  pub fn with_handedness(mut self, handedness: Option<Handedness>) -> Self {
    self.handedness = handedness;
    self
  }

  pub fn landmarks(&self) -> &[Landmark] {
    &self.landmarks
  }

  pub fn len(&self) -> usize {
    self.landmarks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.landmarks.is_empty()
  }

  pub fn get(&self, id: u32) -> Option<&Landmark> {
    // 检测器输出通常按编号排列，先尝试直接下标
    match self.landmarks.get(id as usize) {
      Some(landmark) if landmark.id == id => Some(landmark),
      _ => self.landmarks.iter().find(|l| l.id == id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_coordinates_truncate_to_pixels() {
    let landmark = Landmark::from_normalized(8, 0.5, 0.2501, 640, 480);
    assert_eq!(landmark, Landmark::new(8, 320, 120));
  }

  #[test]
  fn lookup_falls_back_when_ids_are_sparse() {
    let frame: LandmarkFrame = vec![Landmark::new(4, 1, 2), Landmark::new(8, 3, 4)].into();
    assert_eq!(frame.get(8), Some(&Landmark::new(8, 3, 4)));
    assert_eq!(frame.get(0), None);
    assert_eq!(frame.len(), 2);
  }

  #[test]
  fn padding_grows_every_edge() {
    let bbox = BoundingBox {
      min_x: 10,
      min_y: 20,
      max_x: 30,
      max_y: 50,
    };
    let padded = bbox.padded(20);
    assert_eq!((padded.min_x, padded.min_y), (-10, 0));
    assert_eq!((padded.max_x, padded.max_y), (50, 70));
    assert_eq!(bbox.padded(-5), bbox);
    assert_eq!((bbox.width(), bbox.height()), (20, 30));
  }

  #[test]
  fn extreme_box_does_not_overflow() {
    let bbox = BoundingBox {
      min_x: i32::MIN,
      min_y: i32::MIN,
      max_x: i32::MAX,
      max_y: i32::MAX,
    };
    assert_eq!(bbox.width(), u32::MAX as i64);
    assert_eq!(bbox.padded(10), bbox);

    // 超出 [0, 1] 的比例换算后落在 i32 边界
    let far = Landmark::from_normalized(0, 1e10, -1e10, 640, 480);
    assert_eq!((far.x, far.y), (i32::MAX, i32::MIN));
  }
}

// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/geometry.rs - 关键点几何计算
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

//! # 几何计算
//!
//! 所有函数都是纯函数，输入为一帧 [`LandmarkFrame`]，不保留任何状态。
//!
//! ## 手指伸直判定
//!
//! - 拇指：指尖 x 大于前一个关节 x 即视为伸直。该规则不区分左右手，
//!   手掌旋转或镜像时结果会出错，保留原有行为。需要区分左右手时使用
//!   [`fingers_up_handed`]。
//! - 其余四指：指尖 y 小于向下数第二个关节的 y（图像坐标中更靠上）即视为伸直。

use thiserror::Error;

use crate::frame::{BoundingBox, Handedness, Landmark, LandmarkFrame, TIP_IDS};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
  #[error("帧中没有关键点")]
  EmptyFrame,
  #[error("关键点编号无效: {0}")]
  InvalidLandmarkId(u32),
  #[error("手指编号无效: {0} (应为 0..=4)")]
  InvalidFinger(usize),
}

fn landmark(frame: &LandmarkFrame, id: u32) -> Result<&Landmark, GeometryError> {
  if frame.is_empty() {
    return Err(GeometryError::EmptyFrame);
  }
  frame.get(id).ok_or(GeometryError::InvalidLandmarkId(id))
}

pub fn distance(frame: &LandmarkFrame, id_a: u32, id_b: u32) -> Result<f32, GeometryError> {
  let a = landmark(frame, id_a)?;
  let b = landmark(frame, id_b)?;
  Ok(span(a, b))
}

fn span(a: &Landmark, b: &Landmark) -> f32 {
  let dx = b.x as i64 - a.x as i64;
  let dy = b.y as i64 - a.y as i64;
  (dx as f32).hypot(dy as f32)
}

pub fn bounding_box(frame: &LandmarkFrame, margin: i32) -> Result<BoundingBox, GeometryError> {
  let mut points = frame.landmarks().iter();
  let first = points.next().ok_or(GeometryError::EmptyFrame)?;

  let bbox = points.fold(
    BoundingBox {
      min_x: first.x,
      min_y: first.y,
      max_x: first.x,
      max_y: first.y,
    },
    |bbox, l| BoundingBox {
      min_x: bbox.min_x.min(l.x),
      min_y: bbox.min_y.min(l.y),
      max_x: bbox.max_x.max(l.x),
      max_y: bbox.max_y.max(l.y),
    },
  );

  Ok(bbox.padded(margin))
}

pub fn bounding_box_area(bbox: &BoundingBox) -> i64 {
  bbox.width().saturating_mul(bbox.height())
}

/// 两个关键点之间的连线，用于界面上画线和中点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMeasure {
  pub a: (i32, i32),
  pub b: (i32, i32),
  pub center: (i32, i32),
  pub length: f32,
}

pub fn measure_pair(frame: &LandmarkFrame, id_a: u32, id_b: u32) -> Result<PairMeasure, GeometryError> {
  let a = landmark(frame, id_a)?;
  let b = landmark(frame, id_b)?;
  Ok(PairMeasure {
    a: (a.x, a.y),
    b: (b.x, b.y),
    center: (midpoint(a.x, b.x), midpoint(a.y, b.y)),
    length: span(a, b),
  })
}

// 两个 i32 的中点仍在 i32 范围内
fn midpoint(a: i32, b: i32) -> i32 {
  (a as i64 + b as i64).div_euclid(2) as i32
}

fn tip_of(finger: usize) -> Result<u32, GeometryError> {
  TIP_IDS
    .get(finger)
    .copied()
    .ok_or(GeometryError::InvalidFinger(finger))
}

pub fn is_finger_extended(frame: &LandmarkFrame, finger: usize) -> Result<bool, GeometryError> {
  let tip_id = tip_of(finger)?;
  let tip = landmark(frame, tip_id)?;
  if finger == 0 {
    let joint = landmark(frame, tip_id - 1)?;
    Ok(tip.x > joint.x)
  } else {
    let joint = landmark(frame, tip_id - 2)?;
    Ok(tip.y < joint.y)
  }
}

pub fn fingers_up(frame: &LandmarkFrame) -> Result<[bool; 5], GeometryError> {
  let mut fingers = [false; 5];
  for (finger, up) in fingers.iter_mut().enumerate() {
    *up = is_finger_extended(frame, finger)?;
  }
  Ok(fingers)
}

/// 与 [`fingers_up`] 相同，但拇指方向按左右手翻转
pub fn fingers_up_handed(
  frame: &LandmarkFrame,
  handedness: Handedness,
) -> Result<[bool; 5], GeometryError> {
  let mut fingers = fingers_up(frame)?;
  if handedness == Handedness::Left {
    let tip = landmark(frame, TIP_IDS[0])?;
    let joint = landmark(frame, TIP_IDS[0] - 1)?;
    fingers[0] = tip.x < joint.x;
  }
  Ok(fingers)
}

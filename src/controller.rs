// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/controller.rs - 手势控制状态机
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

//! # 手势控制器
//!
//! 每帧调用一次 [`GestureController::process`]：
//!
//! 1. 没有手 → [`ControllerState::Idle`]，保持上一次的输出值；
//! 2. 手的包围盒面积不在区间内 → [`ControllerState::TrackingInvalidSize`]，保持输出值；
//! 3. 否则 → [`ControllerState::TrackingActive`]，按两指距离计算输出值并写入控制端。

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  frame::{INDEX_TIP, LandmarkFrame, THUMB_TIP},
  geometry::{self, GeometryError},
  mapper::{self, MapperError},
  output::ControlSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
  Idle,
  TrackingInvalidSize,
  TrackingActive,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("面积区间无效: [{0}, {1}]")]
  InvalidAreaBand(f32, f32),
  #[error("面积缩放系数必须为正数: {0}")]
  InvalidAreaScale(f32),
  #[error("距离区间无效: [{0}, {1}]")]
  InvalidDistanceBand(f32, f32),
  #[error("距离区间宽度为零: [{0}, {0}]")]
  DegenerateDistanceBand(f32),
  #[error("初始输出值无效: {0}")]
  InvalidNeutralValue(f32),
}

#[derive(Error, Debug, Clone, PartialEq)]
enum MeasureError {
  #[error(transparent)]
  Geometry(#[from] GeometryError),
  #[error(transparent)]
  Mapper(#[from] MapperError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
  /// 参与测距的两个关键点
  pub pair: (u32, u32),
  /// 允许改变输出的面积区间（含端点，按 `area_scale` 缩放后比较）
  pub area_band: (f32, f32),
  pub area_scale: f32,
  /// 两指距离的输入区间，映射到控制端的取值范围
  pub distance_band: (f32, f32),
  /// 初始输出值，缺省为控制端下限
  pub neutral_value: Option<f32>,
}

impl Default for ControllerConfig {
  fn default() -> Self {
    Self {
      pair: (THUMB_TIP, INDEX_TIP),
      area_band: (250.0, 1000.0),
      area_scale: 100.0,
      distance_band: (50.0, 300.0),
      neutral_value: None,
    }
  }
}

impl ControllerConfig {
  pub fn with_pair(mut self, id_a: u32, id_b: u32) -> Self {
    self.pair = (id_a, id_b);
    self
  }

  pub fn with_area_band(mut self, min: f32, max: f32) -> Self {
    self.area_band = (min, max);
    self
  }

  pub fn with_area_scale(mut self, scale: f32) -> Self {
    self.area_scale = scale;
    self
  }

  pub fn with_distance_band(mut self, min: f32, max: f32) -> Self {
    self.distance_band = (min, max);
    self
  }

  pub fn with_neutral_value(mut self, value: Option<f32>) -> Self {
    self.neutral_value = value;
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let (area_min, area_max) = self.area_band;
    if !(area_min.is_finite() && area_max.is_finite() && area_min <= area_max) {
      return Err(ConfigError::InvalidAreaBand(area_min, area_max));
    }
    if !(self.area_scale.is_finite() && self.area_scale > 0.0) {
      return Err(ConfigError::InvalidAreaScale(self.area_scale));
    }
    let (distance_min, distance_max) = self.distance_band;
    if !(distance_min.is_finite() && distance_max.is_finite()) {
      return Err(ConfigError::InvalidDistanceBand(distance_min, distance_max));
    }
    if distance_min == distance_max {
      return Err(ConfigError::DegenerateDistanceBand(distance_min));
    }
    if let Some(value) = self.neutral_value.filter(|v| !v.is_finite()) {
      return Err(ConfigError::InvalidNeutralValue(value));
    }
    Ok(())
  }
}

pub struct GestureController<S> {
  config: ControllerConfig,
  sink: S,
  state: ControllerState,
  last_frame: Option<LandmarkFrame>,
  last_control_value: f32,
  last_timestamp_ms: Option<u64>,
  last_sequence: Option<u64>,
  last_fingers: Option<[bool; 5]>,
  last_distance: Option<f32>,
}

impl<S: ControlSink> GestureController<S>
where
  S::Error: std::fmt::Display,
{
  pub fn new(config: ControllerConfig, sink: S) -> Result<Self, ConfigError> {
    config.validate()?;
    let (low, high) = sink.get_range();
    let neutral = config
      .neutral_value
      .map(|v| v.clamp(low.min(high), low.max(high)))
      .unwrap_or(low);

    Ok(Self {
      config,
      sink,
      state: ControllerState::Idle,
      last_frame: None,
      last_control_value: neutral,
      last_timestamp_ms: None,
      last_sequence: None,
      last_fingers: None,
      last_distance: None,
    })
  }

  /// 处理检测器一次输出的所有手，只跟踪第一只
  pub fn process_hands(&mut self, hands: Vec<LandmarkFrame>) -> Option<f32> {
    self.process(hands.into_iter().next())
  }

  /// 处理一帧，返回本帧写入控制端的值
  pub fn process(&mut self, frame: Option<LandmarkFrame>) -> Option<f32> {
    let frame = match frame {
      Some(frame) if !frame.is_empty() => frame,
      _ => {
        self.enter_idle();
        return None;
      }
    };

    if self
      .last_sequence
      .is_some_and(|last| frame.sequence < last)
    {
      debug!(
        "丢弃过期帧: 序号 {} 早于 {:?}",
        frame.sequence, self.last_sequence
      );
      return None;
    }
    self.last_sequence = Some(frame.sequence);
    self.last_timestamp_ms = Some(frame.timestamp_ms);
    self.last_fingers = geometry::fingers_up(&frame).ok();

    let area = match geometry::bounding_box(&frame, 0) {
      Ok(bbox) => geometry::bounding_box_area(&bbox) as f32 / self.config.area_scale,
      Err(e) => {
        debug!("包围盒计算失败: {}", e);
        self.enter_idle();
        return None;
      }
    };

    let (area_min, area_max) = self.config.area_band;
    if area < area_min || area > area_max {
      debug!(
        "手部面积 {:.1} 超出区间 [{}, {}]，保持输出",
        area, area_min, area_max
      );
      self.state = ControllerState::TrackingInvalidSize;
      self.last_distance = None;
      self.last_frame = Some(frame);
      return None;
    }

    let (distance, value) = match self.measure(&frame) {
      Ok(measured) => measured,
      Err(e) => {
        debug!("本帧跳过: {}", e);
        self.enter_idle();
        return None;
      }
    };

    self.state = ControllerState::TrackingActive;
    self.last_distance = Some(distance);
    self.last_frame = Some(frame);

    match self.sink.set_level(value) {
      Ok(()) => {
        debug!("距离 {:.1} -> 输出 {:.3}", distance, value);
        self.last_control_value = value;
        Some(value)
      }
      Err(e) => {
        warn!("写入控制端失败: {}", e);
        None
      }
    }
  }

  fn measure(&self, frame: &LandmarkFrame) -> Result<(f32, f32), MeasureError> {
    let (id_a, id_b) = self.config.pair;
    let distance = geometry::distance(frame, id_a, id_b)?;
    let (low, high) = self.sink.get_range();
    let (distance_min, distance_max) = self.config.distance_band;
    let value = mapper::interpolate_clamped(distance, distance_min, distance_max, low, high)?;
    Ok((distance, value))
  }

  fn enter_idle(&mut self) {
    self.state = ControllerState::Idle;
    self.last_frame = None;
    self.last_distance = None;
    self.last_fingers = None;
  }

  pub fn config(&self) -> &ControllerConfig {
    &self.config
  }

  pub fn state(&self) -> ControllerState {
    self.state
  }

  pub fn last_control_value(&self) -> f32 {
    self.last_control_value
  }

  pub fn last_frame(&self) -> Option<&LandmarkFrame> {
    self.last_frame.as_ref()
  }

  pub fn last_timestamp_ms(&self) -> Option<u64> {
    self.last_timestamp_ms
  }

  pub fn last_fingers(&self) -> Option<[bool; 5]> {
    self.last_fingers
  }

  pub fn last_distance(&self) -> Option<f32> {
    self.last_distance
  }

  /// 当前输出值在控制端范围内的百分比
  pub fn percentage(&self) -> f32 {
    let (low, high) = self.sink.get_range();
    mapper::interpolate_clamped(self.last_control_value, low, high, 0.0, 100.0).unwrap_or(0.0)
  }

  /// 两指距离低于输入区间下限，即捏合
  pub fn is_pinched(&self) -> bool {
    self.state == ControllerState::TrackingActive
      && self
        .last_distance
        .is_some_and(|d| d < self.config.distance_band.0)
  }

  pub fn sink(&self) -> &S {
    &self.sink
  }

  pub fn into_sink(self) -> S {
    self.sink
  }
}

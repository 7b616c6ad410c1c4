// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/mapper.rs - 区间线性映射
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

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
  #[error("源区间宽度为零: [{0}, {0}]")]
  DegenerateInterval(f32),
}

/// 线性插值，结果不做截断
pub fn interpolate(
  value: f32,
  source_low: f32,
  source_high: f32,
  target_low: f32,
  target_high: f32,
) -> Result<f32, MapperError> {
  if source_low == source_high {
    return Err(MapperError::DegenerateInterval(source_low));
  }
  // 端点直接返回，避免浮点误差
  if value == source_high {
    return Ok(target_high);
  }
  Ok(target_low + (value - source_low) * (target_high - target_low) / (source_high - source_low))
}

/// 线性插值并截断到目标区间内
pub fn interpolate_clamped(
  value: f32,
  source_low: f32,
  source_high: f32,
  target_low: f32,
  target_high: f32,
) -> Result<f32, MapperError> {
  let mapped = interpolate(value, source_low, source_high, target_low, target_high)?;
  Ok(mapped.clamp(target_low.min(target_high), target_low.max(target_high)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMapper {
  pub source: (f32, f32),
  pub target: (f32, f32),
}

impl RangeMapper {
  pub fn new(source: (f32, f32), target: (f32, f32)) -> Self {
    Self { source, target }
  }

  pub fn map(&self, value: f32) -> Result<f32, MapperError> {
    interpolate(value, self.source.0, self.source.1, self.target.0, self.target.1)
  }

  pub fn map_clamped(&self, value: f32) -> Result<f32, MapperError> {
    interpolate_clamped(value, self.source.0, self.source.1, self.target.0, self.target.1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn boundaries_are_exact() {
    for (lo, hi, t_lo, t_hi) in [(50.0, 300.0, 0.0, 100.0), (0.1, 0.7, -65.25, 0.0), (3.0, 1.0, 0.0, 1.0)] {
      assert_eq!(interpolate(lo, lo, hi, t_lo, t_hi), Ok(t_lo));
      assert_eq!(interpolate(hi, lo, hi, t_lo, t_hi), Ok(t_hi));
    }
  }

  #[test]
  fn distance_to_percentage() {
    let mapper = RangeMapper::new((50.0, 300.0), (0.0, 100.0));
    assert_eq!(mapper.map(50.0), Ok(0.0));
    assert_eq!(mapper.map(300.0), Ok(100.0));
    assert_eq!(mapper.map(175.0), Ok(50.0));
  }

  #[test]
  fn unclamped_extrapolates() {
    assert_eq!(interpolate(0.0, 50.0, 300.0, 0.0, 100.0), Ok(-20.0));
    assert_eq!(interpolate(350.0, 50.0, 300.0, 0.0, 100.0), Ok(120.0));
    assert_eq!(interpolate_clamped(0.0, 50.0, 300.0, 0.0, 100.0), Ok(0.0));
    assert_eq!(interpolate_clamped(350.0, 50.0, 300.0, 0.0, 100.0), Ok(100.0));
    // 反向目标区间（音量条高度 400 -> 150）
    assert_eq!(interpolate_clamped(10.0, 50.0, 300.0, 400.0, 150.0), Ok(400.0));
  }

  #[test]
  fn monotonic_in_value() {
    let mut last = f32::MIN;
    for step in 0..=100 {
      let value = step as f32 * 4.0;
      let mapped = interpolate(value, 50.0, 300.0, 0.0, 100.0).unwrap();
      assert!(mapped >= last);
      last = mapped;
    }
  }

  #[test]
  fn zero_width_source_is_rejected() {
    assert_eq!(
      interpolate(1.0, 2.0, 2.0, 0.0, 1.0),
      Err(MapperError::DegenerateInterval(2.0))
    );
  }
}

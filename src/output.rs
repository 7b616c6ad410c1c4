// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/output.rs - 控制输出定义
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

use crate::FromUrl;
#[cfg(any(feature = "log_output", feature = "directory_record", feature = "pactl_output"))]
use crate::FromUrlWithScheme;
use thiserror::Error;
use url::Url;

/// 控制端，例如系统音量
///
/// `set_level` 收到的值已经截断到 `get_range` 范围内。
pub trait ControlSink {
  type Error;
  fn get_range(&self) -> (f32, f32);
  fn set_level(&mut self, value: f32) -> Result<(), Self::Error>;
}

/// 从 URL 查询参数 `low`、`high` 读取取值范围
pub(crate) fn range_from_query(url: &Url, default: (f32, f32)) -> Result<(f32, f32), String> {
  let (mut low, mut high) = default;
  for (k, v) in url.query_pairs() {
    match k.as_ref() {
      "low" => low = v.parse().map_err(|_| format!("low 不是数字: {}", v))?,
      "high" => high = v.parse().map_err(|_| format!("high 不是数字: {}", v))?,
      _ => {}
    }
  }
  if !(low < high) {
    return Err(format!("取值范围无效: [{}, {}]", low, high));
  }
  Ok((low, high))
}

#[cfg(feature = "log_output")]
mod log_sink;
#[cfg(feature = "log_output")]
pub use self::log_sink::{LogSink, LogSinkError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordSink, DirectoryRecordSinkError};

#[cfg(feature = "pactl_output")]
mod pactl;
#[cfg(feature = "pactl_output")]
pub use self::pactl::{PactlSink, PactlSinkError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "log_output")]
  #[error("日志输出错误: {0}")]
  LogSinkError(#[from] LogSinkError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordSinkError(#[from] DirectoryRecordSinkError),
  #[cfg(feature = "pactl_output")]
  #[error("pactl 输出错误: {0}")]
  PactlSinkError(#[from] PactlSinkError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "log_output")]
  LogSink(LogSink),
  #[cfg(feature = "directory_record")]
  DirectoryRecordSink(DirectoryRecordSink),
  #[cfg(feature = "pactl_output")]
  PactlSink(PactlSink),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      #[cfg(feature = "log_output")]
      LogSink::SCHEME => Ok(OutputWrapper::LogSink(LogSink::from_url(url)?)),
      #[cfg(feature = "directory_record")]
      DirectoryRecordSink::SCHEME => Ok(OutputWrapper::DirectoryRecordSink(
        DirectoryRecordSink::from_url(url)?,
      )),
      #[cfg(feature = "pactl_output")]
      PactlSink::SCHEME => Ok(OutputWrapper::PactlSink(PactlSink::from_url(url)?)),
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl ControlSink for OutputWrapper {
  type Error = OutputError;

  fn get_range(&self) -> (f32, f32) {
    match self {
      #[cfg(feature = "log_output")]
      OutputWrapper::LogSink(sink) => sink.get_range(),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordSink(sink) => sink.get_range(),
      #[cfg(feature = "pactl_output")]
      OutputWrapper::PactlSink(sink) => sink.get_range(),
    }
  }

  fn set_level(&mut self, value: f32) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "log_output")]
      OutputWrapper::LogSink(sink) => sink.set_level(value).map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordSink(sink) => sink.set_level(value).map_err(OutputError::from),
      #[cfg(feature = "pactl_output")]
      OutputWrapper::PactlSink(sink) => sink.set_level(value).map_err(OutputError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn range_query_overrides_default() {
    let url = Url::parse("log://?low=0&high=100").unwrap();
    assert_eq!(range_from_query(&url, (0.0, 1.0)), Ok((0.0, 100.0)));
    let url = Url::parse("log://").unwrap();
    assert_eq!(range_from_query(&url, (0.0, 1.0)), Ok((0.0, 1.0)));
  }

  #[test]
  fn bad_range_query_is_rejected() {
    let url = Url::parse("log://?low=5&high=5").unwrap();
    assert!(range_from_query(&url, (0.0, 1.0)).is_err());
    let url = Url::parse("log://?high=loud").unwrap();
    assert!(range_from_query(&url, (0.0, 1.0)).is_err());
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("mqtt://broker/volume").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch)
    ));
  }

  #[cfg(feature = "log_output")]
  #[test]
  fn wrapper_dispatches_by_scheme() {
    let url = Url::parse("log://?high=100").unwrap();
    let mut sink = OutputWrapper::from_url(&url).unwrap();
    assert_eq!(sink.get_range(), (0.0, 100.0));
    assert!(sink.set_level(42.0).is_ok());
  }
}

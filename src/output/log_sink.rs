// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/output/log_sink.rs - 日志输出
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
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{ControlSink, range_from_query},
};

#[derive(Error, Debug)]
pub enum LogSinkError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("{0}")]
  InvalidRange(String),
}

/// 只把输出值写进日志，用于调试和没有音频设备的环境
pub struct LogSink {
  range: (f32, f32),
  updates: u64,
}

impl FromUrlWithScheme for LogSink {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogSink {
  type Error = LogSinkError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(LogSinkError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }
    let range = range_from_query(uri, (0.0, 1.0)).map_err(LogSinkError::InvalidRange)?;
    Ok(LogSink { range, updates: 0 })
  }
}

impl LogSink {
  pub fn updates(&self) -> u64 {
    self.updates
  }
}

impl ControlSink for LogSink {
  type Error = LogSinkError;

  fn get_range(&self) -> (f32, f32) {
    self.range
  }

  fn set_level(&mut self, value: f32) -> Result<(), Self::Error> {
    self.updates += 1;
    info!("输出值: {:.3} (第 {} 次更新)", value, self.updates);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_updates() {
    let mut sink = LogSink::from_url(&Url::parse("log://").unwrap()).unwrap();
    sink.set_level(0.1).unwrap();
    sink.set_level(0.2).unwrap();
    assert_eq!(sink.updates(), 2);
    assert_eq!(sink.get_range(), (0.0, 1.0));
  }

  #[test]
  fn rejects_other_schemes() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      LogSink::from_url(&url),
      Err(LogSinkError::SchemeMismatch(_))
    ));
  }
}

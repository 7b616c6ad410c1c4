// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::{
  fs::OpenOptions,
  io::Write,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{ControlSink, range_from_query},
};

#[derive(Error, Debug)]
pub enum DirectoryRecordSinkError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("{0}")]
  InvalidRange(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct LevelRecord {
  time: String,
  index: u64,
  level: f32,
}

/// 把每次输出追加到 `<目录>/<年>/<月>/<日>/levels.jsonl`
pub struct DirectoryRecordSink {
  directory: PathBuf,
  range: (f32, f32),
  counter: u64,
}

impl FromUrlWithScheme for DirectoryRecordSink {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordSink {
  type Error = DirectoryRecordSinkError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordSinkError::SchemeMismatch);
    }
    let range =
      range_from_query(uri, (0.0, 1.0)).map_err(DirectoryRecordSinkError::InvalidRange)?;

    Ok(DirectoryRecordSink {
      directory: PathBuf::from(uri.path()),
      range,
      counter: 0,
    })
  }
}

impl DirectoryRecordSink {
  pub fn new<P: AsRef<Path>>(directory: P, range: (f32, f32)) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      range,
      counter: 0,
    }
  }

  fn record_path(&self, now: &DateTime<Utc>) -> Result<PathBuf, std::io::Error> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }
    Ok(directory.join("levels.jsonl"))
  }
}

impl ControlSink for DirectoryRecordSink {
  type Error = DirectoryRecordSinkError;

  fn get_range(&self) -> (f32, f32) {
    self.range
  }

  fn set_level(&mut self, value: f32) -> Result<(), Self::Error> {
    let now = Utc::now();
    let path = self.record_path(&now)?;
    self.counter += 1;

    let record = LevelRecord {
      time: now.to_rfc3339(),
      index: self.counter,
      level: value,
    };
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", serde_json::to_string(&record)?)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn appends_one_line_per_level() {
    let directory = std::env::temp_dir().join(format!("shoushi-record-{}", std::process::id()));
    let mut sink = DirectoryRecordSink::new(&directory, (0.0, 1.0));
    sink.set_level(0.25).unwrap();
    sink.set_level(0.5).unwrap();

    let path = sink.record_path(&Utc::now()).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
      .lines()
      .map(|line| serde_json::from_str(line).unwrap())
      .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"], 1);
    assert_eq!(lines[1]["level"], 0.5);

    std::fs::remove_dir_all(&directory).unwrap();
  }

  #[test]
  fn parses_directory_from_url() {
    let sink = DirectoryRecordSink::from_url(&Url::parse("folder:///var/log/shoushi?high=100").unwrap())
      .unwrap();
    assert_eq!(sink.directory, PathBuf::from("/var/log/shoushi"));
    assert_eq!(sink.get_range(), (0.0, 100.0));
  }
}

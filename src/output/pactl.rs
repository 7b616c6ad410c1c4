// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/output/pactl.rs - PulseAudio / PipeWire 音量输出
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

//! 通过 `pactl set-sink-volume` 设置系统音量。
//!
//! ```text
//! pactl://                       默认输出设备
//! pactl://?sink=alsa_output.usb  指定输出设备
//! pactl://?program=/usr/bin/pactl  指定 pactl 可执行文件
//! ```

use std::process::Command;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, output::ControlSink};

const DEFAULT_SINK: &str = "@DEFAULT_SINK@";
const PACTL_PROGRAM: &str = "pactl";

#[derive(Error, Debug)]
pub enum PactlSinkError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("无法启动 {0}: {1}")]
  Spawn(String, std::io::Error),
  #[error("pactl 执行失败 ({0}): {1}")]
  Failed(i32, String),
}

pub struct PactlSink {
  program: String,
  sink: String,
}

impl FromUrlWithScheme for PactlSink {
  const SCHEME: &'static str = "pactl";
}

impl FromUrl for PactlSink {
  type Error = PactlSinkError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(PactlSinkError::SchemeMismatch);
    }

    let mut sink = PactlSink {
      program: PACTL_PROGRAM.to_string(),
      sink: DEFAULT_SINK.to_string(),
    };
    for (k, v) in uri.query_pairs() {
      match k.as_ref() {
        "sink" => sink.sink = v.into_owned(),
        "program" => sink.program = v.into_owned(),
        _ => {}
      }
    }
    Ok(sink)
  }
}

impl PactlSink {
  fn volume_args(&self, value: f32) -> Vec<String> {
    let percent = (value * 100.0).round() as u32;
    vec![
      "set-sink-volume".to_string(),
      self.sink.clone(),
      format!("{}%", percent),
    ]
  }
}

impl ControlSink for PactlSink {
  type Error = PactlSinkError;

  fn get_range(&self) -> (f32, f32) {
    (0.0, 1.0)
  }

  fn set_level(&mut self, value: f32) -> Result<(), Self::Error> {
    let args = self.volume_args(value);
    debug!("执行: {} {}", self.program, args.join(" "));
    let output = Command::new(&self.program)
      .args(&args)
      .output()
      .map_err(|e| PactlSinkError::Spawn(self.program.clone(), e))?;

    if !output.status.success() {
      return Err(PactlSinkError::Failed(
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
      ));
    }
    Ok(())
  }
}

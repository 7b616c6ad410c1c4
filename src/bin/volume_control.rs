// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/bin/volume_control.rs - 手势音量控制
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use shoushi::{
  FromUrl,
  controller::{ControllerConfig, GestureController},
  frame::{INDEX_TIP, THUMB_TIP},
  input::{DetectorConfig, ReplayDetector, ReplayInput},
  output::OutputWrapper,
  task::{ContinuousTask, Task},
};
use tracing::info;

/// Shoushi 手势音量控制参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测结果来源，例如 replay:///path/to/record.jsonl
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 控制输出，例如 log://、pactl://、folder:///path
  #[arg(long, value_name = "OUTPUT", default_value = "log://")]
  pub output: Url,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,

  /// 检测置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.7", value_name = "THRESHOLD")]
  pub detection_confidence: f32,
  /// 跟踪置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub tracking_confidence: f32,
  #[arg(long, default_value = "1")]
  pub max_hands: usize,
  #[arg(long)]
  pub static_image_mode: bool,

  /// 测距的两个关键点编号
  #[arg(long, default_value_t = THUMB_TIP)]
  pub point_a: u32,
  #[arg(long, default_value_t = INDEX_TIP)]
  pub point_b: u32,
  /// 允许调节的手部面积（包围盒面积 / area-scale）
  #[arg(long, default_value = "250")]
  pub area_min: f32,
  #[arg(long, default_value = "1000")]
  pub area_max: f32,
  #[arg(long, default_value = "100")]
  pub area_scale: f32,
  /// 两指距离输入区间（像素）
  #[arg(long, default_value = "50")]
  pub distance_min: f32,
  #[arg(long, default_value = "300")]
  pub distance_max: f32,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = ReplayInput::from_url(&args.input)?;
  let detector = ReplayDetector::new(DetectorConfig {
    detection_confidence: args.detection_confidence,
    tracking_confidence: args.tracking_confidence,
    max_hands: args.max_hands,
    static_image_mode: args.static_image_mode,
  })?;
  let output = OutputWrapper::from_url(&args.output)?;

  let config = ControllerConfig::default()
    .with_pair(args.point_a, args.point_b)
    .with_area_band(args.area_min, args.area_max)
    .with_area_scale(args.area_scale)
    .with_distance_band(args.distance_min, args.distance_max);
  let mut controller = GestureController::new(config, output)?;

  ContinuousTask::default()
    .with_frame_number(args.frame_number)
    .run_task(input, detector, &mut controller)?;

  info!(
    "最终输出: {:.3} ({:.0}%)",
    controller.last_control_value(),
    controller.percentage()
  );

  Ok(())
}

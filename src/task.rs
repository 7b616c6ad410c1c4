// 该文件是 Shoushi （手势音量） 项目的一部分。
// src/task.rs - 逐帧驱动循环
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

use std::{thread, time::Duration};
use tracing::{info, warn};

use crate::{
  controller::GestureController,
  input::Detector,
  output::ControlSink,
};

pub trait Task<I, D, S>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    detector: D,
    controller: &mut GestureController<S>,
  ) -> Result<TaskSummary, Self::Error>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
  pub frames: usize,
  pub frames_with_hand: usize,
  pub updates: usize,
}

fn run_cycle<F, D, S>(
  detector: &D,
  controller: &mut GestureController<S>,
  input: &F,
  summary: &mut TaskSummary,
) -> anyhow::Result<()>
where
  D: Detector<Input = F>,
  D::Error: std::error::Error + Sync + Send + 'static,
  S: ControlSink,
  S::Error: std::fmt::Display,
{
  let hands = detector.detect(input)?;
  summary.frames += 1;
  if !hands.is_empty() {
    summary.frames_with_hand += 1;
  }
  if controller.process_hands(hands).is_some() {
    summary.updates += 1;
  }
  Ok(())
}

pub struct OneShotTask;

impl<F, D, S, I> Task<I, D, S> for OneShotTask
where
  I: Iterator<Item = F>,
  D: Detector<Input = F>,
  D::Error: std::error::Error + Sync + Send + 'static,
  S: ControlSink,
  S::Error: std::fmt::Display,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    detector: D,
    controller: &mut GestureController<S>,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    let mut summary = TaskSummary::default();
    let now = std::time::Instant::now();
    run_cycle(&detector, controller, &frame, &mut summary)?;
    info!(
      "处理完成，耗时: {:.2?}，状态: {:?}，输出: {:.3}",
      now.elapsed(),
      controller.state(),
      controller.last_control_value()
    );
    Ok(summary)
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<F, D, S, I> Task<I, D, S> for ContinuousTask
where
  I: Iterator<Item = F>,
  D: Detector<Input = F>,
  D::Error: std::error::Error + Sync + Send + 'static,
  S: ControlSink,
  S::Error: std::fmt::Display,
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    detector: D,
    controller: &mut GestureController<S>,
  ) -> Result<TaskSummary, Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    // 同一进程只能注册一次，失败时不响应中断
    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    }) {
      warn!("无法注册 Ctrl-C 处理: {}", e);
    }

    let mut summary = TaskSummary::default();
    let mut now = std::time::Instant::now();
    for frame in input {
      run_cycle(&detector, controller, &frame, &mut summary)?;
      info!(
        "第 {} 帧: {:?}, 输出 {:.3} ({:.0}%), 耗时 {:.2?}",
        summary.frames,
        controller.state(),
        controller.last_control_value(),
        controller.percentage(),
        now.elapsed()
      );
      now = std::time::Instant::now();

      if self.frame_number.is_some_and(|n| summary.frames >= n) {
        info!("达到指定帧数 {}, 退出任务循环", summary.frames);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!(
      "任务完成，共 {} 帧，检测到手 {} 帧，输出更新 {} 次",
      summary.frames, summary.frames_with_hand, summary.updates
    );
    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    controller::{ControllerConfig, ControllerState},
    frame::{HAND_LANDMARK_COUNT, INDEX_TIP, LandmarkFrame, THUMB_TIP},
  };

  // 输入即为“检测结果”：Some(拇指与食指距离) 或 None
  struct FakeDetector;

  impl Detector for FakeDetector {
    type Input = Option<i32>;
    type Error = std::io::Error;

    fn detect(&self, input: &Self::Input) -> Result<Vec<LandmarkFrame>, Self::Error> {
      Ok(
        input
          .map(|pinch| {
            let mut points = vec![(10, 10); HAND_LANDMARK_COUNT];
            points[0] = (310, 210);
            points[THUMB_TIP as usize] = (10, 50);
            points[INDEX_TIP as usize] = (10 + pinch, 50);
            LandmarkFrame::from_points(&points)
          })
          .into_iter()
          .collect(),
      )
    }
  }

  struct FailingDetector;

  impl Detector for FailingDetector {
    type Input = ();
    type Error = std::io::Error;

    fn detect(&self, _: &Self::Input) -> Result<Vec<LandmarkFrame>, Self::Error> {
      Err(std::io::Error::other("推理失败"))
    }
  }

  #[derive(Default)]
  struct CountingSink(Vec<f32>);

  impl ControlSink for CountingSink {
    type Error = String;

    fn get_range(&self) -> (f32, f32) {
      (0.0, 100.0)
    }

    fn set_level(&mut self, value: f32) -> Result<(), Self::Error> {
      self.0.push(value);
      Ok(())
    }
  }

  fn controller() -> GestureController<CountingSink> {
    GestureController::new(ControllerConfig::default(), CountingSink::default()).unwrap()
  }

  #[test]
  fn continuous_task_drives_every_frame() {
    let mut ctrl = controller();
    let input = vec![Some(175), None, None, None, Some(300)];
    let summary = ContinuousTask::default()
      .run_task(input.into_iter(), FakeDetector, &mut ctrl)
      .unwrap();
    assert_eq!(
      summary,
      TaskSummary {
        frames: 5,
        frames_with_hand: 2,
        updates: 2,
      }
    );
    assert_eq!(ctrl.sink().0, vec![50.0, 100.0]);
    assert_eq!(ctrl.state(), ControllerState::TrackingActive);
  }

  #[test]
  fn frame_limit_stops_the_loop() {
    let mut ctrl = controller();
    let input = vec![Some(175); 10];
    let summary = ContinuousTask::default()
      .with_frame_number(Some(3))
      .run_task(input.into_iter(), FakeDetector, &mut ctrl)
      .unwrap();
    assert_eq!(summary.frames, 3);
  }

  #[test]
  fn one_shot_needs_a_frame() {
    let mut ctrl = controller();
    let empty: Vec<Option<i32>> = Vec::new();
    assert!(OneShotTask.run_task(empty.into_iter(), FakeDetector, &mut ctrl).is_err());

    let summary = OneShotTask
      .run_task(vec![Some(50)].into_iter(), FakeDetector, &mut ctrl)
      .unwrap();
    assert_eq!(summary.updates, 1);
    assert_eq!(ctrl.last_control_value(), 0.0);
  }

  #[test]
  fn detector_errors_propagate() {
    let mut ctrl = controller();
    let result = OneShotTask.run_task(vec![()].into_iter(), FailingDetector, &mut ctrl);
    assert!(result.is_err());
    assert_eq!(ctrl.state(), ControllerState::Idle);
  }
}

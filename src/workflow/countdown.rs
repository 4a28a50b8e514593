//! 考试倒计时
//!
//! 后台 tokio 任务按固定周期发送 tick，句柄被丢弃时任务随之终止

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// 倒计时句柄
///
/// 只在答题阶段存在；交卷、超时、退出或出错时随句柄一起停止
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// 启动倒计时，第一个 tick 在一个周期之后到达
    ///
    /// 接收端关闭时任务自行结束
    pub fn start(period: Duration, ticks: mpsc::Sender<()>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if ticks.send(()).await.is_err() {
                    break;
                }
            }
        });

        debug!("⏱️ 倒计时已启动，周期 {:?}", period);
        Self { handle }
    }

    /// 停止倒计时
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("⏱️ 倒计时已停止");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::channel(4);
        let started = Instant::now();
        let _countdown = Countdown::start(Duration::from_secs(1), tx);

        for n in 1..=3u64 {
            rx.recv().await.unwrap();
            assert_eq!(started.elapsed().as_secs(), n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_ticks() {
        let (tx, mut rx) = mpsc::channel(4);
        let countdown = Countdown::start(Duration::from_secs(1), tx);

        rx.recv().await.unwrap();
        countdown.stop();

        // 任务被终止后发送端随之释放，通道关闭
        assert_eq!(rx.recv().await, None);
    }
}

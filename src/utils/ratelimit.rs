/// Sliding-window request throttle for the exchange rate API
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RequestThrottle {
    /// Queue of request timestamps inside the current window
    request_times: VecDeque<Instant>,
    /// Max requests per window
    max_requests: usize,
    window: Duration,
}

impl RequestThrottle {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests: max_requests.max(1),
            window,
        }
    }

    pub fn per_second(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Record a request if the window has room, otherwise return how long to wait
    fn check_and_record(&mut self, now: Instant) -> Duration {
        // Remove old timestamps outside the window
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                return self.window - now.duration_since(oldest);
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

/// Wait until `throttle` admits one more request
pub async fn acquire(throttle: &Mutex<RequestThrottle>) {
    loop {
        let wait_duration = {
            let mut throttle = throttle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            throttle.check_and_record(Instant::now())
        };

        if wait_duration.is_zero() {
            return;
        }

        tracing::debug!("API rate limit: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

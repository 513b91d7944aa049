use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::world::PhysicsEngine;

/// Runs the simulation on its own thread, as fast as the clock grants whole
/// milliseconds.
///
/// Each iteration reads the monotonic clock, locks the engine, ticks it with
/// the elapsed milliseconds, then yields so other threads on the core get a
/// turn. Pausing is the engine's run flag; paused time is consumed, not
/// replayed. Hosts that want to drive the simulation themselves skip the
/// driver and call [`PhysicsEngine::tick`] directly.
pub struct EngineDriver {
    engine: Arc<Mutex<PhysicsEngine>>,
    terminate: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EngineDriver {
    /// Spawn the driver thread over a shared engine.
    pub fn spawn(engine: Arc<Mutex<PhysicsEngine>>) -> Self {
        let terminate = Arc::new(AtomicBool::new(false));
        let loop_engine = Arc::clone(&engine);
        let loop_terminate = Arc::clone(&terminate);
        let handle = thread::spawn(move || {
            debug!("engine driver started");
            let mut last = Instant::now();
            while !loop_terminate.load(Ordering::Relaxed) {
                let now = Instant::now();
                let dt_millis = now.duration_since(last).as_millis() as i64;
                if dt_millis > 0 {
                    {
                        let Ok(mut engine) = loop_engine.lock() else {
                            break;
                        };
                        engine.tick(dt_millis);
                    }
                    // Whole milliseconds are consumed; the sub-millisecond
                    // remainder stays on the clock for the next iteration.
                    last += Duration::from_millis(dt_millis as u64);
                }
                thread::yield_now();
            }
            debug!("engine driver stopped");
        });
        Self {
            engine,
            terminate,
            handle: Some(handle),
        }
    }

    /// Shared engine handle, for host reads and configuration between ticks.
    pub fn engine(&self) -> Arc<Mutex<PhysicsEngine>> {
        Arc::clone(&self.engine)
    }

    /// Ask the loop to exit before its next tick. In-flight tick work is
    /// never interrupted.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Relaxed);
    }

    /// Terminate and wait for the thread to finish.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.terminate();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EngineDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

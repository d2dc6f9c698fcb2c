//! CPU/GPU synchronization.
//!
//! The renderer runs single-buffered: after every submission the CPU signals
//! a monotonically increasing value on a timeline semaphore and waits for the
//! GPU to reach it. [`FenceCounter`] owns the value sequence, [`SyncFence`]
//! ties it to the semaphore.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// Monotonic fence value sequence.
///
/// The first signaled value is 1; value 0 is the semaphore's initial state
/// and means "nothing has completed yet".
#[derive(Debug, Clone, Copy)]
pub struct FenceCounter {
    next_value: u64,
}

impl FenceCounter {
    pub fn new() -> Self {
        Self { next_value: 1 }
    }

    /// Returns the value to signal next and steps the sequence.
    pub fn advance(&mut self) -> u64 {
        let value = self.next_value;
        self.next_value += 1;
        value
    }

    /// The value the next `advance` call will return.
    pub fn next_value(&self) -> u64 {
        self.next_value
    }
}

impl Default for FenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Timeline semaphore driven by a [`FenceCounter`].
pub struct SyncFence {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
    counter: FenceCounter,
}

impl SyncFence {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let mut type_info = vk::SemaphoreTypeCreateInfo::default()
            .semaphore_type(vk::SemaphoreType::TIMELINE)
            .initial_value(0);
        let create_info = vk::SemaphoreCreateInfo::default().push_next(&mut type_info);

        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        debug!("Timeline fence created");

        Ok(Self {
            device,
            semaphore,
            counter: FenceCounter::new(),
        })
    }

    /// Enqueues a signal of the next fence value on the graphics queue.
    ///
    /// Queue order guarantees the signal fires only after all previously
    /// submitted work on that queue has completed. Returns the signaled value.
    pub fn signal_and_advance(&mut self) -> RhiResult<u64> {
        let value = self.counter.advance();

        let values = [value];
        let semaphores = [self.semaphore];
        let mut timeline_info =
            vk::TimelineSemaphoreSubmitInfo::default().signal_semaphore_values(&values);
        let submit = vk::SubmitInfo::default()
            .signal_semaphores(&semaphores)
            .push_next(&mut timeline_info);

        unsafe { self.device.submit_graphics(&[submit], vk::Fence::null())? };

        Ok(value)
    }

    /// Blocks until the GPU has signaled at least `value`.
    pub fn wait_until(&self, value: u64) -> RhiResult<()> {
        if self.completed_value()? >= value {
            return Ok(());
        }

        let semaphores = [self.semaphore];
        let values = [value];
        let wait_info = vk::SemaphoreWaitInfo::default()
            .semaphores(&semaphores)
            .values(&values);

        unsafe { self.device.handle().wait_semaphores(&wait_info, u64::MAX)? };
        Ok(())
    }

    /// The highest value the GPU has signaled so far.
    pub fn completed_value(&self) -> RhiResult<u64> {
        let value = unsafe {
            self.device
                .handle()
                .get_semaphore_counter_value(self.semaphore)?
        };
        Ok(value)
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for SyncFence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
        debug!("Timeline fence destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_counter_starts_at_one() {
        let mut counter = FenceCounter::new();
        assert_eq!(counter.advance(), 1);
    }

    #[test]
    fn test_counter_is_strictly_increasing() {
        let mut counter = FenceCounter::new();
        let mut previous = 0;
        for _ in 0..100 {
            let value = counter.advance();
            assert!(value > previous);
            previous = value;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_next_value_does_not_step() {
        let mut counter = FenceCounter::new();
        assert_eq!(counter.next_value(), 1);
        assert_eq!(counter.next_value(), 1);
        counter.advance();
        assert_eq!(counter.next_value(), 2);
    }

    #[test]
    fn test_sync_fence_is_send_sync() {
        assert_send_sync::<SyncFence>();
    }
}

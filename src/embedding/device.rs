use candle_core::Device;
use tracing::{debug, info, warn};

/// Picks the first usable compiled-in GPU backend, otherwise the CPU.
///
/// GPU failures are logged and never fatal; the encoder is small enough to run on CPU.
pub fn select_device() -> Device {
    let mut failures: Vec<String> = Vec::new();

    for (name, open) in gpu_backends() {
        match open() {
            Ok(device) => {
                info!(backend = name, "Using GPU for sentence embeddings");
                return device;
            }
            Err(e) => {
                warn!(backend = name, error = %e, "GPU backend unavailable");
                failures.push(format!("{name}: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, using CPU");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }
    Device::Cpu
}

type DeviceOpener = fn() -> candle_core::Result<Device>;

fn gpu_backends() -> Vec<(&'static str, DeviceOpener)> {
    #[allow(unused_mut)]
    let mut backends: Vec<(&'static str, DeviceOpener)> = Vec::new();

    #[cfg(feature = "metal")]
    backends.push(("metal", || Device::new_metal(0)));

    #[cfg(feature = "cuda")]
    backends.push(("cuda", || Device::new_cuda(0)));

    backends
}

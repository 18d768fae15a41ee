//! Device configuration for local inference.

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution (default).
    #[default]
    Cpu,

    /// CUDA GPU execution.
    #[cfg(feature = "cuda")]
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    /// Create CPU device.
    pub fn cpu() -> Self {
        Self::Cpu
    }

    /// Create CUDA device with the given device ID.
    #[cfg(feature = "cuda")]
    pub fn cuda(device_id: u32) -> Self {
        Self::Cuda { device_id }
    }

    /// Parse a device name from configuration (`"cpu"`, `"cuda"`, `"cuda:1"`).
    ///
    /// CUDA names fall back to CPU with a warning when the `cuda` feature is off.
    pub fn from_name(name: &str) -> crate::Result<Self> {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "cpu" => Ok(Self::Cpu),
            cuda if cuda == "cuda" || cuda.starts_with("cuda:") => {
                #[cfg(feature = "cuda")]
                {
                    let device_id = match cuda.strip_prefix("cuda:") {
                        Some(id) => id.parse().map_err(|_| {
                            crate::MimirError::Configuration(format!("Invalid CUDA device: {cuda}"))
                        })?,
                        None => 0,
                    };
                    Ok(Self::Cuda { device_id })
                }
                #[cfg(not(feature = "cuda"))]
                {
                    tracing::warn!(device = cuda, "built without CUDA support, using CPU");
                    Ok(Self::Cpu)
                }
            }
            other => Err(crate::MimirError::Configuration(format!(
                "Unknown device: {other}"
            ))),
        }
    }

    /// Get the device name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => "CUDA",
        }
    }
}

use std::fmt;

/// Reasons the drawing surface could not be acquired
#[derive(Debug)]
pub enum GpuError {
    SurfaceCreation(wgpu::CreateSurfaceError),
    NoAdapter,
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter can't present to this window
    SurfaceUnsupported,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create surface: {}", e),
            GpuError::NoAdapter => write!(f, "No adapter compatible with the window surface"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create device: {}", e),
            GpuError::SurfaceUnsupported => {
                write!(f, "Surface is not supported by the selected adapter")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

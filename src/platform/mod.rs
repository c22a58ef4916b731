#[cfg(windows)]
pub mod win32;

/// OS-level "reduce motion" preference, if the platform exposes one.
#[cfg(windows)]
pub fn prefers_reduced_motion() -> Option<bool> {
    win32::prefers_reduced_motion()
}

#[cfg(not(windows))]
pub fn prefers_reduced_motion() -> Option<bool> {
    None
}

use anyhow::Result;

/// Inference backend trait.
///
/// A backend receives a preprocessed RGB frame and returns the raw model
/// output buffer in the layout documented in [`crate::detect::decoder`], or
/// an error. The pipeline treats every failure reason the same way: it falls
/// back to the synthetic detector and keeps going.
pub trait InferenceBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run inference on a frame and return the raw output buffer.
    ///
    /// Implementations must treat the pixel slice as read-only.
    fn infer(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<f32>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

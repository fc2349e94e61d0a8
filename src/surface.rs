use crate::colors::Rgb;
use glam::Vec2;

/// Drawing target for one frame of the simulation
pub trait Surface {
    /// Drawable area in dots
    fn size(&self) -> Vec2;

    /// Wipe everything and fill with `background`
    fn clear(&mut self, background: Rgb);

    /// Color and width (in dots) for subsequent lines
    fn set_stroke(&mut self, color: Rgb, width: f32);

    fn line(&mut self, from: Vec2, to: Vec2);
}

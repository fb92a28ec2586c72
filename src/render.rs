// render.rs - Drawing contract between fields and host surfaces
//
// A surface only has to clear itself, take a fill color and paint
// alpha-blended rectangles. On the web that is a 2D canvas context; the
// DrawList below records the same calls for one frame instead.

/// Minimal drawing capability consumed by `ParticleField::draw`
pub trait Surface {
    /// Wipe the `width` x `height` area before a new frame
    fn clear(&mut self, width: f32, height: f32);
    fn set_fill_color(&mut self, color: &str);
    /// Fill an axis-aligned rectangle at the given opacity (source-over)
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32);
    /// Back to full opacity
    fn reset_alpha(&mut self);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn clear(&mut self, width: f32, height: f32) {
        (**self).clear(width, height)
    }

    fn set_fill_color(&mut self, color: &str) {
        (**self).set_fill_color(color)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        (**self).fill_rect(x, y, w, h, alpha)
    }

    fn reset_alpha(&mut self) {
        (**self).reset_alpha()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear { width: f32, height: f32 },
    FillColor(String),
    Rect { x: f32, y: f32, w: f32, h: f32, alpha: f32 },
    ResetAlpha,
}

/// Recording surface: keeps the commands of the current frame
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
    fill: String,
    frames: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn rect_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }

    /// Current fill color
    pub fn fill(&self) -> &str {
        &self.fill
    }

    /// Number of clears seen so far, i.e. frames drawn
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for DrawList {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn set_fill_color(&mut self, color: &str) {
        if self.fill != color {
            self.fill = color.to_string();
        }
        self.commands.push(DrawCommand::FillColor(color.to_string()));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, alpha });
    }

    fn reset_alpha(&mut self) {
        self.commands.push(DrawCommand::ResetAlpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut list = DrawList::new();
        list.clear(10.0, 5.0);
        list.set_fill_color("red");
        list.fill_rect(1.0, 2.0, 3.0, 4.0, 0.5);
        list.reset_alpha();
        assert_eq!(list.rect_count(), 1);
        assert_eq!(list.commands().len(), 4);

        list.clear(10.0, 5.0);
        assert_eq!(list.commands(), &[DrawCommand::Clear { width: 10.0, height: 5.0 }]);
        assert_eq!(list.rect_count(), 0);
        assert_eq!(list.fill(), "red");
        assert_eq!(list.frames(), 2);
    }

    #[test]
    fn forwards_through_mut_ref() {
        fn paint<S: Surface>(mut s: S) {
            s.fill_rect(0.0, 0.0, 1.0, 1.0, 1.0);
        }
        let mut list = DrawList::new();
        paint(&mut list);
        assert_eq!(list.rect_count(), 1);
    }
}

use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive data via props (struct fields), may hold persistent
/// state borrowed from `TuiState`, and render into a `Rect`. `render` takes
/// `&mut self` so a component can update layout caches or scroll offsets
/// during the render pass, matching Ratatui's `StatefulWidget` shape.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events and emits high-level ones.
pub trait EventHandler {
    type Event;

    /// Handle a low-level `TuiEvent`, optionally emitting a component event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}

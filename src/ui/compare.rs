/// Before/after comparison widget.
///
/// Three stacked layers: the original image, the processed image clipped
/// to the current split width, and a canvas drawing the divider plus
/// handle. The canvas owns the pointer interaction and reports it as
/// `CompareEvent`s; the authoritative split lives in `CompareState`, so
/// the clipped panel and the handle can never disagree.
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Program};
use iced::widget::{container, image, stack};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Theme};

use crate::state::compare::{CompareState, COMPARE_HEIGHT, COMPARE_WIDTH};
use crate::tools::ToolId;
use crate::Message;

/// Pointer interaction on one tool's comparison widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareEvent {
    /// Pointer-down on the drag handle.
    Pressed,
    /// Pointer-move while dragging, x relative to the widget's left edge.
    Moved(f32),
    /// Pointer-up, or the pointer left the widget.
    Released,
}

/// Radius of the drag handle; also the grab tolerance around the divider.
const HANDLE_RADIUS: f32 = 12.0;

/// The stacked before/after view for a tool's current artifact.
pub fn view(
    tool: ToolId,
    before: Vec<u8>,
    after: Vec<u8>,
    state: &CompareState,
) -> Element<'static, Message> {
    let before_img = image(image::Handle::from_bytes(before))
        .width(Length::Fixed(COMPARE_WIDTH))
        .height(Length::Fixed(COMPARE_HEIGHT));
    let after_img = image(image::Handle::from_bytes(after))
        .width(Length::Fixed(COMPARE_WIDTH))
        .height(Length::Fixed(COMPARE_HEIGHT));

    let split = state.split_px();
    let overlay = canvas::Canvas::new(CompareSlider { tool, split })
        .width(Length::Fixed(COMPARE_WIDTH))
        .height(Length::Fixed(COMPARE_HEIGHT));

    stack![
        before_img,
        container(after_img)
            .width(Length::Fixed(split))
            .height(Length::Fixed(COMPARE_HEIGHT))
            .clip(true),
        overlay,
    ]
    .width(Length::Fixed(COMPARE_WIDTH))
    .height(Length::Fixed(COMPARE_HEIGHT))
    .into()
}

/// Canvas program drawing the divider and translating pointer events.
struct CompareSlider {
    tool: ToolId,
    split: f32,
}

/// Per-widget drag flag, owned by the canvas so a remounted widget
/// always starts idle.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    is_dragging: bool,
}

impl Program<Message> for CompareSlider {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let x = self.split.clamp(0.0, bounds.width);

        let divider = canvas::Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
        frame.stroke(
            &divider,
            canvas::Stroke::default()
                .with_width(3.0)
                .with_color(Color::WHITE),
        );

        let handle = canvas::Path::circle(Point::new(x, bounds.height / 2.0), HANDLE_RADIUS);
        frame.fill(&handle, Color::WHITE);
        frame.stroke(
            &handle,
            canvas::Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb(0.3, 0.3, 0.3)),
        );

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                // Only the handle starts a drag; pressing elsewhere on
                // the image does nothing and never moves the split.
                if let Some(pos) = cursor.position_in(bounds) {
                    if (pos.x - self.split).abs() <= HANDLE_RADIUS {
                        state.is_dragging = true;
                        return (
                            canvas::event::Status::Captured,
                            Some(Message::Compare(self.tool, CompareEvent::Pressed)),
                        );
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    // Leaving the widget ends the drag exactly like a
                    // button release.
                    return match cursor.position_in(bounds) {
                        Some(pos) => (
                            canvas::event::Status::Captured,
                            Some(Message::Compare(self.tool, CompareEvent::Moved(pos.x))),
                        ),
                        None => {
                            state.is_dragging = false;
                            (
                                canvas::event::Status::Captured,
                                Some(Message::Compare(self.tool, CompareEvent::Released)),
                            )
                        }
                    };
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.is_dragging = false;
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Compare(self.tool, CompareEvent::Released)),
                    );
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}

//! macOS CoreGraphics input synthesis.
//!
//! Uses `CGEventCreateMouseEvent`, `CGEventCreateScrollWheelEvent`, and
//! `CGEventPost` to inject events at the `kCGHIDEventTap` level.  Media keys
//! have no CoreGraphics constructor and are built as AppKit system-defined
//! events instead.
//!
//! # What is CoreGraphics event injection? (for beginners)
//!
//! `CGEventPost` injects a synthesized event directly into the hardware input
//! stream at the HID (Human Interface Device) level, the same level as
//! physical keyboard and mouse input.  Applications cannot distinguish these
//! synthesized events from real hardware events.
//!
//! The typical sequence for a click is:
//!
//! 1. `CGEventSourceCreate(kCGEventSourceStateHIDSystemState)`: obtain an
//!    event source that mimics hardware state.
//! 2. `CGEventCreateMouseEvent(source, kCGEventLeftMouseDown, point, button)`.
//! 3. `CGEventSetIntegerValueField(event, kCGMouseEventClickState, n)` so
//!    applications recognise double and triple clicks.
//! 4. `CGEventPost(kCGHIDEventTap, event)`.
//!
//! # Coordinates
//!
//! CoreGraphics *event* coordinates are global display coordinates with the
//! origin at the top-left of the primary display and Y increasing downward,
//! the same convention used by the engine, so no flipping is needed.
//!
//! # Scroll sign
//!
//! The engine speaks in screen terms (positive `dy` = content moves toward the
//! bottom of the document).  A positive wheel value in CoreGraphics scrolls
//! up, so both axes are negated here.
//!
//! # Media keys
//!
//! Media keys are `NSSystemDefined` events with subtype 8.  `data1` packs the
//! `NX_KEYTYPE_*` code in bits 16..32 and the key state in bits 8..16
//! (`0xA` down, `0xB` up).  The AppKit event is converted to a `CGEvent` and
//! posted the same way as pointer events.

#![cfg(target_os = "macos")]

use core_graphics::event::{
    CGEvent, CGEventTapLocation, CGEventType, CGMouseButton, EventField, ScrollEventUnit,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use keymouse_core::{MediaKey, MouseButton, Point};
use objc2_app_kit::{NSEvent, NSEventModifierFlags, NSEventType};
use objc2_foundation::NSPoint;

use crate::application::emulate_input::{InputSynthesizer, SynthesisError};

/// `NSEventSubtype` used by the system for auxiliary control buttons.
const MEDIA_KEY_SUBTYPE: i16 = 8;
const KEY_STATE_DOWN: isize = 0xA;
const KEY_STATE_UP: isize = 0xB;

/// macOS implementation of [`InputSynthesizer`] via CoreGraphics.
///
/// An event source is created per event: `CGEventSource` is not thread-safe
/// and the synthesizer is shared between the tap thread and tick tasks.
#[derive(Debug, Default)]
pub struct MacosInputSynthesizer;

impl MacosInputSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

fn source() -> Result<CGEventSource, SynthesisError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|()| SynthesisError::EventCreation("event source"))
}

fn cg_point(p: Point) -> CGPoint {
    CGPoint::new(p.x, p.y)
}

/// Event types and CoreGraphics button for `button`.
///
/// Returns `(down, up, dragged, cg_button)`.
fn button_event_types(button: MouseButton) -> (CGEventType, CGEventType, CGEventType, CGMouseButton) {
    match button {
        MouseButton::Left => (
            CGEventType::LeftMouseDown,
            CGEventType::LeftMouseUp,
            CGEventType::LeftMouseDragged,
            CGMouseButton::Left,
        ),
        MouseButton::Right => (
            CGEventType::RightMouseDown,
            CGEventType::RightMouseUp,
            CGEventType::RightMouseDragged,
            CGMouseButton::Right,
        ),
        MouseButton::Middle => (
            CGEventType::OtherMouseDown,
            CGEventType::OtherMouseUp,
            CGEventType::OtherMouseDragged,
            CGMouseButton::Center,
        ),
    }
}

impl InputSynthesizer for MacosInputSynthesizer {
    fn cursor_location(&self) -> Result<Point, SynthesisError> {
        let event = CGEvent::new(source()?).map_err(|()| SynthesisError::CursorUnavailable)?;
        let p = event.location();
        Ok(Point::new(p.x, p.y))
    }

    fn post_mouse_move(&self, to: Point, drag: Option<MouseButton>) -> Result<(), SynthesisError> {
        let (event_type, cg_button) = match drag {
            Some(button) => {
                let (_, _, dragged, cg_button) = button_event_types(button);
                (dragged, cg_button)
            }
            None => (CGEventType::MouseMoved, CGMouseButton::Left),
        };
        let event = CGEvent::new_mouse_event(source()?, event_type, cg_point(to), cg_button)
            .map_err(|()| SynthesisError::EventCreation("mouse move"))?;
        if drag == Some(MouseButton::Middle) {
            event.set_integer_value_field(EventField::MOUSE_EVENT_BUTTON_NUMBER, 2);
        }
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_mouse_button(
        &self,
        button: MouseButton,
        pressed: bool,
        at: Point,
        click_count: u32,
    ) -> Result<(), SynthesisError> {
        let (down, up, _, cg_button) = button_event_types(button);
        let event_type = if pressed { down } else { up };
        let event = CGEvent::new_mouse_event(source()?, event_type, cg_point(at), cg_button)
            .map_err(|()| SynthesisError::EventCreation("mouse button"))?;
        event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, i64::from(click_count));
        if button == MouseButton::Middle {
            event.set_integer_value_field(EventField::MOUSE_EVENT_BUTTON_NUMBER, 2);
        }
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_scroll(&self, dx: f64, dy: f64) -> Result<(), SynthesisError> {
        let event = CGEvent::new_scroll_event(
            source()?,
            ScrollEventUnit::PIXEL,
            2,
            (-dy).round() as i32,
            (-dx).round() as i32,
            0,
        )
        .map_err(|()| SynthesisError::EventCreation("scroll"))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn post_media_key(&self, key: MediaKey) -> Result<(), SynthesisError> {
        post_system_defined(key, KEY_STATE_DOWN)?;
        post_system_defined(key, KEY_STATE_UP)
    }
}

fn post_system_defined(key: MediaKey, state: isize) -> Result<(), SynthesisError> {
    let data1 = ((key.nx_key_type() as isize) << 16) | (state << 8);
    let modifier_bits = (state as usize) << 8;

    // SAFETY: all arguments are plain values; a null graphics context and
    // window number 0 are documented as valid for system-defined events.
    let event = unsafe {
        NSEvent::otherEventWithType_location_modifierFlags_timestamp_windowNumber_context_subtype_data1_data2(
            NSEventType::SystemDefined,
            NSPoint::new(0.0, 0.0),
            NSEventModifierFlags::from_bits_retain(modifier_bits),
            0.0,
            0,
            None,
            MEDIA_KEY_SUBTYPE,
            data1,
            -1,
        )
    }
    .ok_or(SynthesisError::EventCreation("media key"))?;

    let cg_event = event
        .CGEvent()
        .ok_or(SynthesisError::EventCreation("media key"))?;
    objc2_core_graphics::CGEvent::post(
        objc2_core_graphics::CGEventTapLocation::HIDEventTap,
        Some(&cg_event),
    );
    Ok(())
}

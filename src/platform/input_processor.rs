//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit window events into runtime InputEvents.
//
// Architecture:
//   WindowEvent → InputProcessor::process() → Option<InputEvent>
//                                               ↓
//                                          InputState::push
//
// Stateful modifier tracking: ModifiersChanged is absorbed here and its
// state applied to every subsequent key/button event. Unmapped keys
// (F-keys, numpad, media keys) and OS key repeats produce no event.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use winit::{
    event::{ElementState, MouseButton as WinitMouseButton, WindowEvent},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== InputProcessor ======================================================

/// Converts winit events to runtime input with stateful modifier tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Event Processing -------------------------------------------------

    /// Translates one window event. Returns `None` for events that carry
    /// no input (or only update the modifier cache).
    pub(crate) fn process(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.update_modifiers(state.state());
                None
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let translated = self.translate_key(event.physical_key, event.state, event.repeat);
                if translated.is_none() {
                    trace!(target: "platform::input", "Key ignored: {:?}", event.physical_key);
                }
                translated
            }

            WindowEvent::MouseInput { state, button, .. } => {
                Some(self.translate_mouse_button(*button, *state))
            }

            WindowEvent::CursorMoved { position, .. } => {
                Some(self.translate_mouse_move(position.x as f32, position.y as f32))
            }

            _ => None,
        }
    }

    //--- Translation ------------------------------------------------------

    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    #[cfg(test)]
    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    fn translate_key(
        &self,
        physical_key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) -> Option<InputEvent> {
        if repeat {
            return None;
        }

        let key = match physical_key {
            PhysicalKey::Code(code) => map_key_code(code)?,
            PhysicalKey::Unidentified(_) => return None,
        };

        let modifiers = self.current_modifiers;
        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
            ElementState::Released => InputEvent::KeyUp { key, modifiers },
        })
    }

    fn translate_mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        let button = MouseButton::from(button);
        let modifiers = self.current_modifiers;

        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown { button, modifiers },
            ElementState::Released => InputEvent::MouseButtonUp { button, modifiers },
        }
    }

    fn translate_mouse_move(&self, x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Maps winit physical key codes to runtime key codes.
///
/// Covers A-Z, 0-9, arrows and common editing keys; anything else is
/// `None`.
pub(crate) fn map_key_code(code: WinitKeyCode) -> Option<KeyCode> {
    use WinitKeyCode as W;

    let key = match code {
        //--- Digits -------------------------------------------------------
        W::Digit0 => KeyCode::Digit0,
        W::Digit1 => KeyCode::Digit1,
        W::Digit2 => KeyCode::Digit2,
        W::Digit3 => KeyCode::Digit3,
        W::Digit4 => KeyCode::Digit4,
        W::Digit5 => KeyCode::Digit5,
        W::Digit6 => KeyCode::Digit6,
        W::Digit7 => KeyCode::Digit7,
        W::Digit8 => KeyCode::Digit8,
        W::Digit9 => KeyCode::Digit9,

        //--- Letters ------------------------------------------------------
        W::KeyA => KeyCode::KeyA,
        W::KeyB => KeyCode::KeyB,
        W::KeyC => KeyCode::KeyC,
        W::KeyD => KeyCode::KeyD,
        W::KeyE => KeyCode::KeyE,
        W::KeyF => KeyCode::KeyF,
        W::KeyG => KeyCode::KeyG,
        W::KeyH => KeyCode::KeyH,
        W::KeyI => KeyCode::KeyI,
        W::KeyJ => KeyCode::KeyJ,
        W::KeyK => KeyCode::KeyK,
        W::KeyL => KeyCode::KeyL,
        W::KeyM => KeyCode::KeyM,
        W::KeyN => KeyCode::KeyN,
        W::KeyO => KeyCode::KeyO,
        W::KeyP => KeyCode::KeyP,
        W::KeyQ => KeyCode::KeyQ,
        W::KeyR => KeyCode::KeyR,
        W::KeyS => KeyCode::KeyS,
        W::KeyT => KeyCode::KeyT,
        W::KeyU => KeyCode::KeyU,
        W::KeyV => KeyCode::KeyV,
        W::KeyW => KeyCode::KeyW,
        W::KeyX => KeyCode::KeyX,
        W::KeyY => KeyCode::KeyY,
        W::KeyZ => KeyCode::KeyZ,

        //--- Arrows -------------------------------------------------------
        W::ArrowUp => KeyCode::ArrowUp,
        W::ArrowDown => KeyCode::ArrowDown,
        W::ArrowLeft => KeyCode::ArrowLeft,
        W::ArrowRight => KeyCode::ArrowRight,

        //--- Special ------------------------------------------------------
        W::Space => KeyCode::Space,
        W::Enter => KeyCode::Enter,
        W::Escape => KeyCode::Escape,
        W::Tab => KeyCode::Tab,
        W::Backspace => KeyCode::Backspace,
        W::Delete => KeyCode::Delete,

        _ => return None,
    };
    Some(key)
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift {
            state.insert(ModifiersState::SHIFT);
        }
        if ctrl {
            state.insert(ModifiersState::CONTROL);
        }
        if alt {
            state.insert(ModifiersState::ALT);
        }
        state
    }

    //=====================================================================
    // Keys
    //=====================================================================

    #[test]
    fn key_press_carries_cached_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, true, false));

        let event = processor.translate_key(
            PhysicalKey::Code(WinitKeyCode::KeyS),
            ElementState::Pressed,
            false,
        );

        match event {
            Some(InputEvent::KeyDown { key, modifiers }) => {
                assert_eq!(key, KeyCode::KeyS);
                assert!(modifiers.ctrl);
                assert!(!modifiers.shift);
            }
            other => panic!("Expected KeyDown, got {:?}", other),
        }
    }

    #[test]
    fn key_release_maps_to_key_up() {
        let processor = InputProcessor::new();
        let event = processor.translate_key(
            PhysicalKey::Code(WinitKeyCode::Escape),
            ElementState::Released,
            false,
        );
        assert_eq!(event, Some(InputEvent::key_up(KeyCode::Escape)));
    }

    #[test]
    fn os_key_repeat_is_dropped() {
        let processor = InputProcessor::new();
        let event = processor.translate_key(
            PhysicalKey::Code(WinitKeyCode::KeyW),
            ElementState::Pressed,
            true,
        );
        assert!(event.is_none(), "Held keys are tracked by InputState");
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        assert!(map_key_code(WinitKeyCode::F13).is_none());
        assert_eq!(map_key_code(WinitKeyCode::KeyA), Some(KeyCode::KeyA));
        assert_eq!(map_key_code(WinitKeyCode::Space), Some(KeyCode::Space));

        let processor = InputProcessor::new();
        let event = processor.translate_key(
            PhysicalKey::Code(WinitKeyCode::NumpadAdd),
            ElementState::Pressed,
            false,
        );
        assert!(event.is_none());
    }

    //=====================================================================
    // Mouse
    //=====================================================================

    #[test]
    fn mouse_button_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, false, true));

        let event = processor.translate_mouse_button(WinitMouseButton::Left, ElementState::Pressed);

        match event {
            InputEvent::MouseButtonDown { button, modifiers } => {
                assert_eq!(button, MouseButton::Left);
                assert!(modifiers.alt);
            }
            other => panic!("Expected MouseButtonDown, got {:?}", other),
        }
    }

    #[test]
    fn mouse_move_keeps_coordinates() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.translate_mouse_move(123.5, 456.75),
            InputEvent::MouseMoved { x: 123.5, y: 456.75 }
        );
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(MouseButton::from(WinitMouseButton::Right), MouseButton::Right);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }

    //=====================================================================
    // Modifiers
    //=====================================================================

    #[test]
    fn modifiers_persist_until_changed() {
        let mut processor = InputProcessor::new();
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);

        processor.update_modifiers(make_modifiers(true, false, false));
        let press = processor.translate_mouse_button(WinitMouseButton::Right, ElementState::Pressed);
        let release = processor.translate_mouse_button(WinitMouseButton::Right, ElementState::Released);

        for event in [press, release] {
            match event {
                InputEvent::MouseButtonDown { modifiers, .. }
                | InputEvent::MouseButtonUp { modifiers, .. } => assert!(modifiers.shift),
                other => panic!("Unexpected {:?}", other),
            }
        }

        processor.update_modifiers(ModifiersState::empty());
        assert_eq!(processor.current_modifiers(), Modifiers::NONE);
    }
}

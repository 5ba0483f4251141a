// Devcap Capability Classifier
// Bitmap-driven input device type detection

use std::fmt;

use crate::bits::BitArray;
use crate::codes::{
    ABS_CNT, ABS_MT_SLOT, ABS_PRESSURE, ABS_X, ABS_Y, BTN_JOYSTICK, BTN_LEFT, BTN_MIDDLE,
    BTN_MISC, BTN_STYLUS, BTN_STYLUS2, BTN_TOOL_FINGER, BTN_TOOL_PEN, BTN_TOUCH, REL_CNT, REL_X,
    REL_Y,
};
use crate::device::Device;

/// Input device taxonomy produced by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Keyboard,
    Mouse,
    Touchpad,
    Touchscreen,
    Joystick,
    Tablet,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Keyboard => "keyboard",
            DeviceClass::Mouse => "mouse",
            DeviceClass::Touchpad => "touchpad",
            DeviceClass::Touchscreen => "touchscreen",
            DeviceClass::Joystick => "joystick",
            DeviceClass::Tablet => "tablet",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key, relative-axis and absolute-axis capability bitmaps for one
/// device, captured once per classification call.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    keys: BitArray,
    rel: BitArray,
    abs: BitArray,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the capability bitmaps of an open evdev device.
    pub fn from_evdev(device: &evdev::Device) -> Self {
        let mut caps = Self::new();
        if let Some(keys) = device.supported_keys() {
            for key in keys.iter() {
                caps.keys.set(key.code());
            }
        }
        if let Some(axes) = device.supported_relative_axes() {
            for axis in axes.iter() {
                caps.rel.set(axis.0);
            }
        }
        if let Some(axes) = device.supported_absolute_axes() {
            for axis in axes.iter() {
                caps.abs.set(axis.0);
            }
        }
        caps
    }

    pub fn with_key_codes(mut self, codes: &[u16]) -> Self {
        for &code in codes {
            self.keys.set(code);
        }
        self
    }

    pub fn with_rel_codes(mut self, codes: &[u16]) -> Self {
        for &code in codes {
            self.rel.set(code);
        }
        self
    }

    pub fn with_abs_codes(mut self, codes: &[u16]) -> Self {
        for &code in codes {
            self.abs.set(code);
        }
        self
    }

    pub fn keys(&self) -> &BitArray {
        &self.keys
    }

    pub fn rel(&self) -> &BitArray {
        &self.rel
    }

    pub fn abs(&self) -> &BitArray {
        &self.abs
    }
}

/// Classify a device from its capability bitmaps.
///
/// The probing order follows the heuristics long established by the
/// X.org evdev driver: absolute-axis devices are split into
/// joystick, tablet, touchpad and touchscreen before the generic
/// keyboard and mouse fallbacks run. Returns `None` when the bitmaps
/// describe no recognizable input device.
pub fn classify(caps: &Capabilities) -> Option<DeviceClass> {
    let has_keys = caps.keys.any_in(0..BTN_MISC);
    let mut has_buttons = caps.keys.any_in(BTN_MISC..BTN_JOYSTICK);
    let has_lmr = caps.keys.any_in(BTN_LEFT..BTN_MIDDLE + 1);
    let has_rel_axes = caps.rel.any_in(0..REL_CNT);
    let has_abs_axes = caps.abs.any_in(0..ABS_CNT);
    let has_mt = caps.abs.any_in(ABS_MT_SLOT..ABS_CNT);

    if has_abs_axes {
        if has_mt && !has_buttons {
            // TODO: joystick detection only checks BTN_JOYSTICK;
            // gamepads reporting BTN_GAMEPAD fall through to the
            // touch branches below.
            if caps.keys.is_set(BTN_JOYSTICK) {
                return Some(DeviceClass::Joystick);
            }
            has_buttons = true;
        }

        if caps.abs.is_set(ABS_X) && caps.abs.is_set(ABS_Y) {
            if caps.keys.is_set(BTN_TOOL_PEN)
                || caps.keys.is_set(BTN_STYLUS)
                || caps.keys.is_set(BTN_STYLUS2)
            {
                return Some(DeviceClass::Tablet);
            } else if caps.abs.is_set(ABS_PRESSURE) || caps.keys.is_set(BTN_TOUCH) {
                if has_lmr || caps.keys.is_set(BTN_TOOL_FINGER) {
                    return Some(DeviceClass::Touchpad);
                }
                return Some(DeviceClass::Touchscreen);
            } else if !(caps.rel.is_set(REL_X) && caps.rel.is_set(REL_Y)) && has_lmr {
                // some touchscreens report BTN_LEFT rather than BTN_TOUCH
                return Some(DeviceClass::Touchscreen);
            }
        }
    }

    if has_keys {
        Some(DeviceClass::Keyboard)
    } else if has_rel_axes || has_abs_axes || has_buttons {
        Some(DeviceClass::Mouse)
    } else {
        None
    }
}

/// Attach the ID_INPUT marker set for a classification to a device's
/// property list.
pub fn set_input_type_markers(device: &mut Device, class: DeviceClass) {
    let props = device.properties_mut();
    props.insert("ID_INPUT", "1");
    match class {
        DeviceClass::Keyboard => {
            props.insert("ID_INPUT_KEY", "1");
            props.insert("ID_INPUT_KEYBOARD", "1");
        }
        DeviceClass::Mouse => {
            props.insert("ID_INPUT_MOUSE", "1");
        }
        DeviceClass::Touchpad => {
            props.insert("ID_INPUT_MOUSE", "1");
            props.insert("ID_INPUT_TOUCHPAD", "1");
        }
        DeviceClass::Touchscreen => {
            props.insert("ID_INPUT_TOUCHSCREEN", "1");
        }
        DeviceClass::Joystick => {
            props.insert("ID_INPUT_JOYSTICK", "1");
        }
        DeviceClass::Tablet => {
            props.insert("ID_INPUT_TABLET", "1");
        }
    }
}
